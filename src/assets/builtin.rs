//! Builtin skin data, pre-sliced from the 70x120 Ryu sheet scaled by 2.5

use std::collections::HashMap;

use super::manifest::{ActiveFrameDef, SkinManifest};
use super::{AnimationSet, AssetError, AssetProvider, FrameSize};
use crate::game::geometry::Rect;
use crate::game::FighterState;

/// Name of the only builtin skin
pub const DEFAULT_SKIN: &str = "ryu";

/// Provider backed by compiled-in frame tables
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAssets;

impl AssetProvider for BuiltinAssets {
    fn load_skin(&self, skin: &str) -> Result<AnimationSet, AssetError> {
        match skin {
            DEFAULT_SKIN => AnimationSet::from_manifest(ryu_manifest()),
            other => Err(AssetError::UnknownSkin(other.to_string())),
        }
    }
}

fn frames(widths: &[f32], height: f32) -> Vec<FrameSize> {
    widths.iter().map(|&w| FrameSize::new(w, height)).collect()
}

/// Manifest for the builtin skin
pub fn ryu_manifest() -> SkinManifest {
    let mut sequences = HashMap::new();
    sequences.insert("idle".to_string(), frames(&[175.0; 5], 300.0));
    sequences.insert("move".to_string(), frames(&[175.0; 6], 300.0));
    sequences.insert(
        "attack".to_string(),
        frames(
            &[
                175.0, 175.0, 190.0, 190.0, 210.0, 210.0, 230.0, 240.0, 250.0, 250.0, 210.0,
                175.0,
            ],
            300.0,
        ),
    );
    sequences.insert(
        "kick".to_string(),
        frames(
            &[
                175.0, 180.0, 200.0, 220.0, 260.0, 260.0, 240.0, 200.0, 180.0, 175.0,
            ],
            300.0,
        ),
    );
    sequences.insert("guard".to_string(), frames(&[175.0; 4], 300.0));
    sequences.insert(
        "jump".to_string(),
        vec![
            FrameSize::new(175.0, 300.0),
            FrameSize::new(175.0, 280.0),
            FrameSize::new(175.0, 250.0),
            FrameSize::new(175.0, 230.0),
            FrameSize::new(175.0, 250.0),
            FrameSize::new(175.0, 280.0),
            FrameSize::new(175.0, 300.0),
        ],
    );
    sequences.insert(
        "shoot_projectile".to_string(),
        frames(
            &[175.0, 190.0, 210.0, 230.0, 250.0, 250.0, 230.0, 175.0],
            300.0,
        ),
    );

    let active_frames = vec![
        // Straight punch: fist, forearm, shoulder
        ActiveFrameDef {
            state: FighterState::Attack,
            frame: 9,
            damage: 20,
            boxes: vec![
                Rect::new(190.0, 60.0, 60.0, 40.0),
                Rect::new(160.0, 70.0, 40.0, 35.0),
                Rect::new(130.0, 75.0, 40.0, 30.0),
            ],
        },
        ActiveFrameDef {
            state: FighterState::Kick,
            frame: 4,
            damage: 30,
            boxes: vec![Rect::new(190.0, 120.0, 70.0, 50.0)],
        },
        ActiveFrameDef {
            state: FighterState::Kick,
            frame: 5,
            damage: 35,
            boxes: vec![
                Rect::new(200.0, 100.0, 60.0, 50.0),
                Rect::new(160.0, 130.0, 50.0, 40.0),
            ],
        },
    ];

    SkinManifest {
        skin: DEFAULT_SKIN.to_string(),
        sequences,
        projectile: frames(&[100.0; 4], 70.0),
        active_frames,
    }
}
