//! Scripted input: tick ranges mapped to held intents, loaded from JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{InputIntent, InputSource};

/// Intent held for ticks in `[from_tick, to_tick)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    pub from_tick: u64,
    pub to_tick: u64,
    pub intent: InputIntent,
}

/// Replays a fixed script; ticks not covered by any step are idle
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
}

impl ScriptedInput {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.from_tick);
        Self { steps }
    }

    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let steps: Vec<ScriptStep> =
            serde_json::from_str(&text).map_err(|source| InputError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(steps))
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> InputIntent {
        self.steps
            .iter()
            .find(|s| s.from_tick <= tick && tick < s.to_tick)
            .map(|s| s.intent)
            .unwrap_or_default()
    }
}

/// Input script errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read input script {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse input script {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
