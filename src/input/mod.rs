//! Decoded per-tick input intents and the sources that produce them

pub mod script;

pub use script::{InputError, ScriptedInput};

use serde::{Deserialize, Serialize};

/// What the human side wants this tick
///
/// Every flag means "held during this tick"; edge detection, where needed, is
/// the combatant's business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub modifier_held: bool,
    pub attack: bool,
    pub kick: bool,
    pub guard: bool,
    pub jump: bool,
    pub shoot_projectile: bool,
    pub quit: bool,
}

impl InputIntent {
    /// Net horizontal direction: -1, 0 or 1
    pub fn direction(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Produces one intent per tick
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> InputIntent;
}

/// Never presses anything
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll(&mut self, _tick: u64) -> InputIntent {
        InputIntent::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_directions_cancel() {
        let intent = InputIntent {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        assert_eq!(intent.direction(), 0.0);
        assert!(!intent.is_idle());
    }

    #[test]
    fn missing_fields_deserialize_as_released() {
        let intent: InputIntent = serde_json::from_str(r#"{"attack": true}"#).unwrap();
        assert!(intent.attack);
        assert!(!intent.guard);
    }
}
