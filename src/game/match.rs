//! Match state and the per-tick simulation pipeline

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assets::{AssetError, AssetProvider};
use crate::config::RulesConfig;
use crate::input::InputIntent;
use crate::util::rng::RandomSource;

use super::ai::AiPolicy;
use super::combat::CombatResolver;
use super::fighter::Combatant;
use super::snapshot::{CombatEvent, FrameOutcome, SnapshotBuilder};
use super::Side;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Waiting for the human side to be chosen
    Menu,
    /// Round in progress
    Playing,
    /// Round decided, waiting for a reset
    RoundOver,
}

/// Round result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    A,
    B,
    Draw,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::A => Winner::A,
            Side::B => Winner::B,
        }
    }
}

/// Owns both fighters, the AI, the round timer and the phase
pub struct MatchController {
    id: Uuid,
    rules: RulesConfig,
    fighters: [Combatant; 2],
    ai: AiPolicy,
    phase: MatchPhase,
    timer: f32,
    winner: Option<Winner>,
    human: Option<Side>,
    tick: u64,
    round: u32,
    quit: bool,
}

impl MatchController {
    /// Load both skins and set up a match in the menu phase
    ///
    /// Fails before anything runs if either skin is incomplete.
    pub fn new(
        id: Uuid,
        rules: RulesConfig,
        assets: &dyn AssetProvider,
        skins: [&str; 2],
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, AssetError> {
        let set_a = Arc::new(assets.load_skin(skins[0])?);
        let set_b = if skins[1] == skins[0] {
            set_a.clone()
        } else {
            Arc::new(assets.load_skin(skins[1])?)
        };

        let fighters = [
            Combatant::new(Side::A, set_a, &rules),
            Combatant::new(Side::B, set_b, &rules),
        ];

        info!(match_id = %id, skin_a = skins[0], skin_b = skins[1], "Match created");

        Ok(Self {
            id,
            timer: rules.round_seconds,
            rules,
            fighters,
            ai: AiPolicy::new(rng),
            phase: MatchPhase::Menu,
            winner: None,
            human: None,
            tick: 0,
            round: 1,
            quit: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn human(&self) -> Option<Side> {
        self.human
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn fighter(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.fighters[side.index()]
    }

    /// Override the remaining round time
    pub fn set_timer(&mut self, seconds: f32) {
        self.timer = seconds;
    }

    /// Leave the menu with `side` under human control
    pub fn select_human(&mut self, side: Side) -> bool {
        if self.phase != MatchPhase::Menu {
            warn!(match_id = %self.id, phase = ?self.phase, "Side selection outside the menu ignored");
            return false;
        }
        self.human = Some(side);
        self.phase = MatchPhase::Playing;
        info!(match_id = %self.id, human = %side, round = self.round, "Round started");
        true
    }

    /// Reinitialize fighters and timer, then enter `next`
    ///
    /// Going back to the menu forgets the side selection.
    pub fn reset(&mut self, next: MatchPhase) {
        for fighter in self.fighters.iter_mut() {
            fighter.reset(&self.rules);
        }
        self.ai.reset();
        self.timer = self.rules.round_seconds;
        self.winner = None;
        self.quit = false;
        self.round += 1;

        self.phase = match next {
            MatchPhase::Playing if self.human.is_some() => MatchPhase::Playing,
            _ => {
                self.human = None;
                MatchPhase::Menu
            }
        };
        info!(match_id = %self.id, phase = ?self.phase, round = self.round, "Match reset");
    }

    /// Run one tick and report what happened
    pub fn advance(&mut self, intent: &InputIntent, dt: f32) -> FrameOutcome {
        self.tick += 1;
        let mut events = Vec::new();

        if intent.quit && !self.quit {
            self.quit = true;
            info!(match_id = %self.id, tick = self.tick, "Quit requested");
        }

        if self.phase == MatchPhase::Playing {
            self.run_tick(intent, dt, &mut events);
        }

        SnapshotBuilder::build(
            self.tick,
            self.round,
            self.phase,
            self.timer,
            self.winner,
            self.human,
            &self.fighters,
            self.rules.ground_line,
            events,
            self.quit,
        )
    }

    /// Input, AI, melee, animation, projectiles, win check - in that order
    fn run_tick(&mut self, intent: &InputIntent, dt: f32, events: &mut Vec<CombatEvent>) {
        let human = self.human.unwrap_or(Side::A);
        let rules = &self.rules;

        self.fighters[human.index()].apply_input(intent, rules);

        {
            let [a, b] = &mut self.fighters;
            let (me, opponent) = match human.opponent() {
                Side::A => (a, b),
                Side::B => (b, a),
            };
            let command = self.ai.decide(me, opponent, rules, dt);
            AiPolicy::apply(command, me, opponent.x(), rules);
        }

        CombatResolver::resolve_melee(&mut self.fighters, rules, events);

        for fighter in self.fighters.iter_mut() {
            fighter.advance(rules, dt, events);
        }

        CombatResolver::resolve_projectiles(&mut self.fighters, rules, dt, events);

        self.timer -= dt;
        self.check_win_condition(events);
    }

    /// KO beats the clock; a double KO or time-out with both standing is a draw
    fn check_win_condition(&mut self, events: &mut Vec<CombatEvent>) {
        let a_down = self.fighters[0].health() <= 0;
        let b_down = self.fighters[1].health() <= 0;

        let winner = match (a_down, b_down) {
            (true, true) => Some(Winner::Draw),
            (true, false) => Some(Winner::B),
            (false, true) => Some(Winner::A),
            (false, false) if self.timer <= 0.0 => Some(Winner::Draw),
            (false, false) => None,
        };

        let Some(winner) = winner else {
            return;
        };

        for (side, down) in [(Side::A, a_down), (Side::B, b_down)] {
            if down {
                events.push(CombatEvent::KnockOut { side });
                debug!(match_id = %self.id, side = %side, "Knock out");
            }
        }

        self.timer = self.timer.max(0.0);
        self.winner = Some(winner);
        self.phase = MatchPhase::RoundOver;
        events.push(CombatEvent::RoundOver { winner });
        info!(
            match_id = %self.id,
            tick = self.tick,
            ?winner,
            health_a = self.fighters[0].health(),
            health_b = self.fighters[1].health(),
            "Round over"
        );
    }
}
