//! Game simulation modules

pub mod ai;
pub mod animation;
pub mod combat;
pub mod fighter;
pub mod geometry;
pub mod r#match;
pub mod physics;
pub mod projectile;
pub mod snapshot;

pub use ai::{AiCommand, AiPolicy};
pub use fighter::Combatant;
pub use r#match::{MatchController, MatchPhase, Winner};
pub use snapshot::{CombatEvent, FrameOutcome};

use serde::{Deserialize, Serialize};

/// Which of the two combatants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => f.write_str("a"),
            Side::B => f.write_str("b"),
        }
    }
}

/// Horizontal facing of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Unit sign along the x axis
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Combatant state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    Idle,
    Move,
    Attack,
    Kick,
    Guard,
    Jump,
    ShootProjectile,
}

impl FighterState {
    /// Looping states replay until interrupted; everything else plays once
    pub fn is_looping(self) -> bool {
        matches!(self, FighterState::Idle | FighterState::Guard)
    }

    /// States that carry active hit frames
    pub fn is_offensive(self) -> bool {
        matches!(self, FighterState::Attack | FighterState::Kick)
    }

    /// Name used for the animation sequence in skin manifests
    pub fn sequence_name(self) -> &'static str {
        match self {
            FighterState::Idle => "idle",
            FighterState::Move => "move",
            FighterState::Attack => "attack",
            FighterState::Kick => "kick",
            FighterState::Guard => "guard",
            FighterState::Jump => "jump",
            FighterState::ShootProjectile => "shoot_projectile",
        }
    }
}
