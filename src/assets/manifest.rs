//! JSON skin manifests loaded from a configured directory

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnimationSet, AssetError, AssetProvider, FrameSize};
use crate::game::geometry::Rect;
use crate::game::FighterState;

/// On-disk description of a skin: frame bounds per sequence plus the hit table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinManifest {
    pub skin: String,
    /// Keyed by sequence name (`idle`, `move`, `attack`, ...)
    pub sequences: HashMap<String, Vec<FrameSize>>,
    pub projectile: Vec<FrameSize>,
    #[serde(default)]
    pub active_frames: Vec<ActiveFrameDef>,
}

/// One row of the active-hit-frame table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveFrameDef {
    pub state: FighterState,
    pub frame: usize,
    pub damage: i32,
    pub boxes: Vec<Rect>,
}

/// Loads `<dir>/<skin>.json`
#[derive(Debug, Clone)]
pub struct ManifestAssets {
    dir: PathBuf,
}

impl ManifestAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn manifest_path(&self, skin: &str) -> PathBuf {
        self.dir.join(format!("{skin}.json"))
    }
}

impl AssetProvider for ManifestAssets {
    fn load_skin(&self, skin: &str) -> Result<AnimationSet, AssetError> {
        let path = self.manifest_path(skin);
        if !path.exists() {
            return Err(AssetError::UnknownSkin(skin.to_string()));
        }

        let text = fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: SkinManifest =
            serde_json::from_str(&text).map_err(|source| AssetError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(skin, path = %path.display(), "Loaded skin manifest");
        AnimationSet::from_manifest(manifest)
    }
}
