//! Per-tick outcome building for the rendering layer

use serde::{Deserialize, Serialize};

use super::fighter::Combatant;
use super::projectile::Projectile;
use super::r#match::{MatchPhase, Winner};
use super::{Facing, FighterState, Side};

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    /// Unguarded melee hit
    Hit {
        attacker: Side,
        defender: Side,
        state: FighterState,
        frame: usize,
        damage: i32,
    },
    /// Melee hit absorbed by a guard
    Guarded {
        attacker: Side,
        defender: Side,
        state: FighterState,
        frame: usize,
        damage: i32,
    },
    ProjectileSpawned {
        owner: Side,
        id: u32,
    },
    ProjectileHit {
        owner: Side,
        target: Side,
        id: u32,
        damage: i32,
    },
    /// Two projectiles cancelled each other
    ProjectileClash {
        owner: Side,
        id: u32,
        other_owner: Side,
        other_id: u32,
    },
    /// Left the arena
    ProjectileExpired {
        owner: Side,
        id: u32,
    },
    KnockOut {
        side: Side,
    },
    RoundOver {
        winner: Winner,
    },
}

/// Render-facing view of a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    pub side: Side,
    pub x: f32,
    /// Top edge of the current frame in arena space
    pub y: f32,
    pub ground_offset: f32,
    pub facing: Facing,
    pub state: FighterState,
    pub previous_state: FighterState,
    pub frame: usize,
    pub frame_width: f32,
    pub frame_height: f32,
    pub health: i32,
    pub meter: i32,
}

/// Render-facing view of a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub owner: Side,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub frame: usize,
}

/// Everything a renderer needs after one `advance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub tick: u64,
    pub round: u32,
    pub phase: MatchPhase,
    pub timer: f32,
    pub winner: Option<Winner>,
    pub human: Option<Side>,
    pub fighters: Vec<FighterView>,
    pub projectiles: Vec<ProjectileView>,
    pub events: Vec<CombatEvent>,
    pub quit: bool,
}

impl FrameOutcome {
    pub fn fighter(&self, side: Side) -> &FighterView {
        &self.fighters[side.index()]
    }
}

/// Builds outcomes and paces how often they are published
pub struct SnapshotBuilder {
    /// Tick counter since last published snapshot
    ticks_since_snapshot: u32,
    /// Publish interval in ticks, 0 disables publishing
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval,
        }
    }

    /// Check if it's time to publish; ticks with events always publish
    pub fn should_send(&mut self, outcome: &FrameOutcome) -> bool {
        if self.snapshot_interval == 0 {
            return false;
        }
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval || !outcome.events.is_empty() {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    pub fn fighter_view(fighter: &Combatant, ground_line: f32) -> FighterView {
        let size = fighter.frame_size();
        let (_, y) = fighter.sprite_origin(ground_line);
        FighterView {
            side: fighter.side(),
            x: fighter.x(),
            y,
            ground_offset: fighter.ground_offset(),
            facing: fighter.facing(),
            state: fighter.state(),
            previous_state: fighter.previous_state(),
            frame: fighter.frame(),
            frame_width: size.width,
            frame_height: size.height,
            health: fighter.health(),
            meter: fighter.meter(),
        }
    }

    pub fn projectile_view(projectile: &Projectile) -> ProjectileView {
        ProjectileView {
            id: projectile.id,
            owner: projectile.owner,
            x: projectile.x,
            y: projectile.y,
            facing: projectile.facing,
            frame: projectile.frame(),
        }
    }

    /// Build an outcome from the current state of both fighters
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        tick: u64,
        round: u32,
        phase: MatchPhase,
        timer: f32,
        winner: Option<Winner>,
        human: Option<Side>,
        fighters: &[Combatant; 2],
        ground_line: f32,
        events: Vec<CombatEvent>,
        quit: bool,
    ) -> FrameOutcome {
        FrameOutcome {
            tick,
            round,
            phase,
            timer,
            winner,
            human,
            fighters: fighters
                .iter()
                .map(|f| Self::fighter_view(f, ground_line))
                .collect(),
            projectiles: fighters
                .iter()
                .flat_map(|f| f.projectiles().iter())
                .map(Self::projectile_view)
                .collect(),
            events,
            quit,
        }
    }
}
