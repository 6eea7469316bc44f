//! Asset layer - animation sequences and hit tables per skin
//!
//! The simulation only cares about frame counts, per-frame sprite bounds and the
//! active-hit-frame table. Pixel content belongs to whatever renders the match.

pub mod builtin;
pub mod manifest;

pub use builtin::BuiltinAssets;
pub use manifest::{ManifestAssets, SkinManifest};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::geometry::Rect;
use crate::game::FighterState;

/// Sprite bounds of a single animation frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

impl FrameSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A pre-sliced, named animation sequence
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSequence {
    pub name: String,
    pub frames: Vec<FrameSize>,
}

impl AnimationSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame bounds, index taken modulo the sequence length
    pub fn frame(&self, index: usize) -> FrameSize {
        self.frames[index % self.frames.len()]
    }
}

/// Hit boxes and damage carried by one (state, frame) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFrame {
    pub damage: i32,
    /// Authored for a right-facing sprite, sprite-local coordinates
    pub boxes: Vec<Rect>,
}

/// Active-hit-frame table for one skin
#[derive(Debug, Clone, Default)]
pub struct HitTable {
    entries: HashMap<(FighterState, usize), ActiveFrame>,
}

impl HitTable {
    pub fn get(&self, state: FighterState, frame: usize) -> Option<&ActiveFrame> {
        self.entries.get(&(state, frame))
    }

    /// Frames of `state` that carry hit boxes, ascending
    pub fn active_frames(&self, state: FighterState) -> Vec<usize> {
        let mut frames: Vec<usize> = self
            .entries
            .keys()
            .filter(|(s, _)| *s == state)
            .map(|(_, f)| *f)
            .collect();
        frames.sort_unstable();
        frames
    }
}

/// Complete animation set for one combatant skin
///
/// Only constructible through validation, so every lookup on it is total.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    skin: String,
    sequences: [Arc<AnimationSequence>; 7],
    projectile: Arc<AnimationSequence>,
    hit_table: HitTable,
}

impl AnimationSet {
    /// Validate a manifest and build the shared animation set
    pub fn from_manifest(manifest: SkinManifest) -> Result<Self, AssetError> {
        let SkinManifest {
            skin,
            mut sequences,
            projectile,
            active_frames,
        } = manifest;

        let mut take = |state: FighterState| -> Result<Arc<AnimationSequence>, AssetError> {
            let name = state.sequence_name();
            let frames = sequences
                .remove(name)
                .ok_or_else(|| AssetError::MissingSequence {
                    skin: skin.clone(),
                    sequence: name.to_string(),
                })?;
            build_sequence(&skin, name, frames)
        };

        let sequences = [
            take(FighterState::Idle)?,
            take(FighterState::Move)?,
            take(FighterState::Attack)?,
            take(FighterState::Kick)?,
            take(FighterState::Guard)?,
            take(FighterState::Jump)?,
            take(FighterState::ShootProjectile)?,
        ];
        let projectile = build_sequence(&skin, "projectile", projectile)?;

        let mut hit_table = HitTable::default();
        for entry in active_frames {
            let len = sequences[state_slot(entry.state)].len();
            if entry.frame >= len {
                return Err(AssetError::HitFrameOutOfRange {
                    skin,
                    state: entry.state,
                    frame: entry.frame,
                    len,
                });
            }
            if entry.boxes.is_empty() || entry.damage <= 0 {
                return Err(AssetError::InvalidHitFrame {
                    skin,
                    state: entry.state,
                    frame: entry.frame,
                    reason: "needs at least one box and positive damage",
                });
            }
            if hit_table.entries.contains_key(&(entry.state, entry.frame)) {
                // One damage value per (state, frame), whatever the facing
                return Err(AssetError::InvalidHitFrame {
                    skin,
                    state: entry.state,
                    frame: entry.frame,
                    reason: "declared more than once",
                });
            }
            hit_table.entries.insert(
                (entry.state, entry.frame),
                ActiveFrame {
                    damage: entry.damage,
                    boxes: entry.boxes,
                },
            );
        }

        Ok(Self {
            skin,
            sequences,
            projectile,
            hit_table,
        })
    }

    pub fn skin(&self) -> &str {
        &self.skin
    }

    pub fn sequence(&self, state: FighterState) -> &Arc<AnimationSequence> {
        &self.sequences[state_slot(state)]
    }

    pub fn projectile(&self) -> &Arc<AnimationSequence> {
        &self.projectile
    }

    pub fn hit_table(&self) -> &HitTable {
        &self.hit_table
    }

    /// Width of the resting silhouette (first idle frame)
    pub fn idle_width(&self) -> f32 {
        self.sequence(FighterState::Idle).frame(0).width
    }

    /// Ticks needed to play `state` once at the given frame hold
    pub fn duration_ticks(&self, state: FighterState, frame_hold: u32) -> u32 {
        self.sequence(state).len() as u32 * frame_hold.max(1)
    }
}

fn state_slot(state: FighterState) -> usize {
    match state {
        FighterState::Idle => 0,
        FighterState::Move => 1,
        FighterState::Attack => 2,
        FighterState::Kick => 3,
        FighterState::Guard => 4,
        FighterState::Jump => 5,
        FighterState::ShootProjectile => 6,
    }
}

fn build_sequence(
    skin: &str,
    name: &str,
    frames: Vec<FrameSize>,
) -> Result<Arc<AnimationSequence>, AssetError> {
    if frames.is_empty() || frames.iter().any(|f| f.width <= 0.0 || f.height <= 0.0) {
        return Err(AssetError::EmptySequence {
            skin: skin.to_string(),
            sequence: name.to_string(),
        });
    }
    Ok(Arc::new(AnimationSequence {
        name: name.to_string(),
        frames,
    }))
}

/// Supplies animation sets per combatant skin
pub trait AssetProvider {
    fn load_skin(&self, skin: &str) -> Result<AnimationSet, AssetError>;
}

/// Fatal asset configuration errors, reported before a match starts
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Unknown skin: {0}")]
    UnknownSkin(String),

    #[error("Skin {skin} is missing the {sequence} sequence")]
    MissingSequence { skin: String, sequence: String },

    #[error("Skin {skin} has an empty or degenerate {sequence} sequence")]
    EmptySequence { skin: String, sequence: String },

    #[error("Skin {skin}: hit frame {frame} of {state:?} is outside a {len}-frame sequence")]
    HitFrameOutOfRange {
        skin: String,
        state: FighterState,
        frame: usize,
        len: usize,
    },

    #[error("Skin {skin}: hit frame {frame} of {state:?} {reason}")]
    InvalidHitFrame {
        skin: String,
        state: FighterState,
        frame: usize,
        reason: &'static str,
    },

    #[error("Failed to read skin manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse skin manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
