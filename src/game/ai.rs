//! Opponent policy for the non-human side
//!
//! The policy closes distance while far away and, once in melee range, rolls a
//! uniform number each tick; a rare low roll commits it to an attack, or to a
//! guard when the opponent is already swinging. A commitment holds a lock
//! counter for the full animation length during which no new decision is made.

use tracing::debug;

use crate::config::RulesConfig;
use crate::util::rng::RandomSource;

use super::fighter::Combatant;
use super::physics::PhysicsSystem;
use super::FighterState;

/// What the policy wants done with its combatant this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiCommand {
    /// Leave the combatant alone
    Wait,
    /// Walk to `to_x` without leaving Idle
    Advance { to_x: f32 },
    /// Commit to `Attack` or `Guard`
    Commit(FighterState),
    /// Lock expired, force Idle
    Release,
}

pub struct AiPolicy {
    lock_ticks: u32,
    rng: Box<dyn RandomSource>,
}

impl AiPolicy {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { lock_ticks: 0, rng }
    }

    pub fn lock_ticks(&self) -> u32 {
        self.lock_ticks
    }

    pub fn reset(&mut self) {
        self.lock_ticks = 0;
    }

    /// Pick this tick's command
    pub fn decide(
        &mut self,
        me: &Combatant,
        opponent: &Combatant,
        rules: &RulesConfig,
        dt: f32,
    ) -> AiCommand {
        if self.lock_ticks > 0 {
            self.lock_ticks -= 1;
            return if self.lock_ticks == 0 {
                AiCommand::Release
            } else {
                AiCommand::Wait
            };
        }

        if me.state() != FighterState::Idle {
            return AiCommand::Wait;
        }

        let tuning = &rules.ai;
        let distance = (opponent.x() - me.x()).abs();
        if distance > tuning.closing_distance {
            let step = rules.walk_speed * dt;
            return AiCommand::Advance {
                to_x: PhysicsSystem::approach(me.x(), opponent.x(), step),
            };
        }

        if distance <= tuning.melee_range {
            let roll = self.rng.roll(tuning.roll_range);
            if roll < tuning.act_threshold {
                let choice = if opponent.state() == FighterState::Attack {
                    FighterState::Guard
                } else {
                    FighterState::Attack
                };
                self.lock_ticks = me.assets().duration_ticks(choice, rules.frame_hold);
                debug!(side = %me.side(), ?choice, lock_ticks = self.lock_ticks, "AI committed");
                return AiCommand::Commit(choice);
            }
        }

        AiCommand::Wait
    }

    /// Carry out a command on the AI's own combatant
    pub fn apply(command: AiCommand, me: &mut Combatant, opponent_x: f32, rules: &RulesConfig) {
        match command {
            AiCommand::Wait => {}
            AiCommand::Advance { to_x } => {
                me.face_toward(opponent_x);
                me.place_at(to_x, rules);
            }
            AiCommand::Commit(state) => {
                me.face_toward(opponent_x);
                me.enter(state, rules);
            }
            AiCommand::Release => {
                me.enter(FighterState::Idle, rules);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use super::*;
    use crate::assets::{AssetProvider, BuiltinAssets};
    use crate::game::Side;

    /// Replays fixed rolls, then keeps answering the last one
    struct FixedRolls(VecDeque<u32>, u32);

    impl RandomSource for FixedRolls {
        fn roll(&mut self, _upper: u32) -> u32 {
            if let Some(next) = self.0.pop_front() {
                self.1 = next;
            }
            self.1
        }
    }

    fn policy(rolls: &[u32]) -> AiPolicy {
        AiPolicy::new(Box::new(FixedRolls(rolls.iter().copied().collect(), 999)))
    }

    fn fighters() -> (Combatant, Combatant, RulesConfig) {
        let rules = RulesConfig::default();
        let assets = Arc::new(BuiltinAssets.load_skin("ryu").unwrap());
        let human = Combatant::new(Side::A, assets.clone(), &rules);
        let ai = Combatant::new(Side::B, assets, &rules);
        (human, ai, rules)
    }

    #[test]
    fn far_away_walks_toward_opponent_and_stays_idle() {
        let (human, mut ai, rules) = fighters();
        let mut policy = policy(&[]);
        let dt = 1.0 / 144.0;

        let command = policy.decide(&ai, &human, &rules, dt);
        let expected = ai.x() - rules.walk_speed * dt;
        assert_eq!(command, AiCommand::Advance { to_x: expected });

        AiPolicy::apply(command, &mut ai, human.x(), &rules);
        assert_eq!(ai.x(), expected);
        assert_eq!(ai.state(), FighterState::Idle);
    }

    #[test]
    fn advance_is_capped_at_opponent_position() {
        let (mut human, mut ai, rules) = fighters();
        human.place_at(500.0, &rules);
        ai.place_at(650.0, &rules);
        let mut policy = policy(&[]);

        let command = policy.decide(&ai, &human, &rules, 10.0);
        assert_eq!(command, AiCommand::Advance { to_x: 500.0 });
    }

    #[test]
    fn low_roll_in_range_commits_to_attack_with_lock() {
        let (mut human, mut ai, rules) = fighters();
        human.place_at(500.0, &rules);
        ai.place_at(580.0, &rules);
        let mut policy = policy(&[0]);

        let command = policy.decide(&ai, &human, &rules, 1.0 / 144.0);
        assert_eq!(command, AiCommand::Commit(FighterState::Attack));
        assert_eq!(policy.lock_ticks(), 12 * rules.frame_hold);

        AiPolicy::apply(command, &mut ai, human.x(), &rules);
        assert_eq!(ai.state(), FighterState::Attack);
        assert_eq!(ai.facing(), crate::game::Facing::Left);
    }

    #[test]
    fn guards_against_an_attacking_opponent() {
        let (mut human, mut ai, rules) = fighters();
        human.place_at(500.0, &rules);
        ai.place_at(580.0, &rules);
        human.enter(FighterState::Attack, &rules);
        let mut policy = policy(&[0]);

        let command = policy.decide(&ai, &human, &rules, 1.0 / 144.0);
        assert_eq!(command, AiCommand::Commit(FighterState::Guard));
        assert_eq!(policy.lock_ticks(), 4 * rules.frame_hold);
    }

    #[test]
    fn high_roll_waits() {
        let (mut human, mut ai, rules) = fighters();
        human.place_at(500.0, &rules);
        ai.place_at(580.0, &rules);
        let mut policy = policy(&[500]);
        assert_eq!(policy.decide(&ai, &human, &rules, 0.01), AiCommand::Wait);
    }

    #[test]
    fn lock_counts_down_then_releases() {
        let (mut human, mut ai, rules) = fighters();
        human.place_at(500.0, &rules);
        ai.place_at(580.0, &rules);
        human.enter(FighterState::Attack, &rules);
        let mut policy = policy(&[0]);

        let command = policy.decide(&ai, &human, &rules, 0.01);
        AiPolicy::apply(command, &mut ai, human.x(), &rules);
        let lock = policy.lock_ticks();
        for _ in 0..lock - 1 {
            assert_eq!(policy.decide(&ai, &human, &rules, 0.01), AiCommand::Wait);
        }
        let release = policy.decide(&ai, &human, &rules, 0.01);
        assert_eq!(release, AiCommand::Release);
        AiPolicy::apply(release, &mut ai, human.x(), &rules);
        assert_eq!(ai.state(), FighterState::Idle);
    }
}
