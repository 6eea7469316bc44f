//! Combatant state machine - input, animation, movement and damage intake

use std::sync::Arc;

use tracing::trace;

use crate::assets::{AnimationSequence, AnimationSet, FrameSize};
use crate::config::RulesConfig;
use crate::input::InputIntent;

use super::animation::{AnimationClock, ClockStep, Playback};
use super::geometry::{HitBox, HitGeometry, Rect};
use super::physics::{JumpArc, PhysicsSystem};
use super::projectile::Projectile;
use super::snapshot::CombatEvent;
use super::{Facing, FighterState, Side};

/// Identifies one displayed active frame of one attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeKey {
    pub serial: u32,
    pub state: FighterState,
    pub frame: usize,
}

/// One of the two fighters (authoritative)
#[derive(Debug, Clone)]
pub struct Combatant {
    side: Side,
    assets: Arc<AnimationSet>,

    // Position and movement
    x: f32,
    facing: Facing,
    jump: Option<JumpArc>,
    /// Horizontal input applied during this tick's advance
    heading: f32,
    /// Set while a turn-around combo is held so it flips only once
    turn_latched: bool,

    // State machine
    state: FighterState,
    previous_state: FighterState,
    clock: AnimationClock,
    /// Bumped on every offensive entry so repeated attacks debounce separately
    action_serial: u32,
    last_strike: Option<StrikeKey>,

    // Combat
    health: i32,
    meter: i32,

    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
}

impl Combatant {
    pub fn new(side: Side, assets: Arc<AnimationSet>, rules: &RulesConfig) -> Self {
        let mut fighter = Self {
            side,
            assets,
            x: 0.0,
            facing: Facing::Right,
            jump: None,
            heading: 0.0,
            turn_latched: false,
            state: FighterState::Idle,
            previous_state: FighterState::Idle,
            clock: AnimationClock::new(rules.frame_hold),
            action_serial: 0,
            last_strike: None,
            health: rules.starting_health,
            meter: 0,
            projectiles: Vec::new(),
            next_projectile_id: 1,
        };
        fighter.reset(rules);
        fighter
    }

    /// Back to the round-start pose, health and meter
    pub fn reset(&mut self, rules: &RulesConfig) {
        let idle_width = self.assets.idle_width();
        let (x, facing) = match self.side {
            Side::A => (rules.start_x_a, Facing::Right),
            Side::B => (rules.start_right_b - idle_width, Facing::Left),
        };
        self.x = PhysicsSystem::clamp_x(x, idle_width, rules.arena_width);
        self.facing = facing;
        self.jump = None;
        self.heading = 0.0;
        self.turn_latched = false;
        self.state = FighterState::Idle;
        self.previous_state = FighterState::Idle;
        self.clock = AnimationClock::new(rules.frame_hold);
        self.last_strike = None;
        self.health = rules.starting_health;
        self.meter = 0;
        self.projectiles.clear();
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn assets(&self) -> &Arc<AnimationSet> {
        &self.assets
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn ground_offset(&self) -> f32 {
        self.jump.map(|arc| arc.ground_offset).unwrap_or(0.0)
    }

    pub fn is_airborne(&self) -> bool {
        self.jump.is_some()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn previous_state(&self) -> FighterState {
        self.previous_state
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn meter(&self) -> i32 {
        self.meter
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut Vec<Projectile> {
        &mut self.projectiles
    }

    /// Sequence for the current state
    pub fn sequence(&self) -> &Arc<AnimationSequence> {
        self.assets.sequence(self.state)
    }

    /// Current frame index, always inside the current sequence
    pub fn frame(&self) -> usize {
        self.clock.frame(self.sequence().len())
    }

    pub fn frame_size(&self) -> FrameSize {
        self.sequence().frame(self.frame())
    }

    /// Top-left of the current frame in arena space
    pub fn sprite_origin(&self, ground_line: f32) -> (f32, f32) {
        let size = self.frame_size();
        (self.x, ground_line - size.height - self.ground_offset())
    }

    /// Vulnerable area for the current frame, arena space
    pub fn hurt_box(&self, rules: &RulesConfig) -> Rect {
        let local = HitGeometry::hurt_region(
            self.frame_size(),
            self.assets.idle_width(),
            &rules.hurt_margins,
            self.facing,
        );
        let (ox, oy) = self.sprite_origin(rules.ground_line);
        HitGeometry::to_arena(local, ox, oy)
    }

    /// Active hit regions for the current frame, arena space
    pub fn hit_boxes(&self, rules: &RulesConfig) -> Vec<HitBox> {
        let (ox, oy) = self.sprite_origin(rules.ground_line);
        HitGeometry::active_hit_regions(
            self.assets.hit_table(),
            self.state,
            self.frame(),
            self.facing,
            self.frame_size().width,
        )
        .into_iter()
        .map(|hit| HitBox {
            rect: HitGeometry::to_arena(hit.rect, ox, oy),
            damage: hit.damage,
        })
        .collect()
    }

    /// Key of the active frame currently displayed, if any
    pub fn strike_key(&self) -> Option<StrikeKey> {
        self.state.is_offensive().then(|| StrikeKey {
            serial: self.action_serial,
            state: self.state,
            frame: self.frame(),
        })
    }

    pub fn already_struck(&self, key: StrikeKey) -> bool {
        self.last_strike == Some(key)
    }

    pub fn mark_strike(&mut self, key: StrikeKey) {
        self.last_strike = Some(key);
    }

    /// Switch state, restarting the animation when the sequence changes
    ///
    /// Re-entering the current state is a no-op so held inputs keep playing.
    pub fn enter(&mut self, state: FighterState, rules: &RulesConfig) -> bool {
        if state == self.state {
            return false;
        }
        trace!(side = %self.side, from = ?self.state, to = ?state, "State transition");

        self.previous_state = self.state;
        self.state = state;
        self.clock.reset();
        if state.is_offensive() {
            self.action_serial = self.action_serial.wrapping_add(1);
        }
        self.jump = match state {
            FighterState::Jump => Some(JumpArc::launch(rules.jump_apex)),
            _ => None,
        };
        if state != FighterState::Move && state != FighterState::Jump {
            self.heading = 0.0;
        }
        true
    }

    /// Apply one tick of decoded input
    pub fn apply_input(&mut self, intent: &InputIntent, rules: &RulesConfig) {
        let direction = intent.direction();
        let turning = intent.modifier_held && direction != 0.0;
        if !turning {
            self.turn_latched = false;
        }

        match self.state {
            FighterState::Attack | FighterState::Kick | FighterState::ShootProjectile => return,
            FighterState::Jump => {
                self.heading = direction;
                return;
            }
            FighterState::Idle | FighterState::Move | FighterState::Guard => {}
        }

        if turning {
            if !self.turn_latched {
                self.facing = self.facing.flipped();
                self.turn_latched = true;
            }
            self.enter(FighterState::Idle, rules);
            return;
        }

        if intent.shoot_projectile {
            if self.meter >= rules.shoot_cost {
                self.meter -= rules.shoot_cost;
                self.enter(FighterState::ShootProjectile, rules);
                return;
            }
            trace!(side = %self.side, meter = self.meter, "Projectile rejected, not enough meter");
        }

        if intent.attack {
            self.enter(FighterState::Attack, rules);
        } else if intent.kick {
            self.enter(FighterState::Kick, rules);
        } else if intent.jump {
            self.enter(FighterState::Jump, rules);
            self.heading = direction;
        } else if direction != 0.0 {
            self.enter(FighterState::Move, rules);
            self.heading = direction;
        } else if intent.guard {
            self.enter(FighterState::Guard, rules);
        } else {
            self.enter(FighterState::Idle, rules);
        }
    }

    /// Advance animation, movement and jump arc by one tick
    ///
    /// One-shot states fall back to `Idle` on the tick their sequence completes,
    /// except `Jump`: its sequence parks on the last frame and the state only
    /// ends when the arc lands, so a fighter never drops out of the air.
    pub fn advance(&mut self, rules: &RulesConfig, dt: f32, events: &mut Vec<CombatEvent>) {
        if matches!(self.state, FighterState::Move | FighterState::Jump) {
            self.x += PhysicsSystem::walk_step(self.heading, rules.walk_speed, dt);
        }

        let len = self.sequence().len();
        let playback = if self.state.is_looping() {
            Playback::Looping
        } else {
            Playback::OneShot
        };
        if self.clock.tick(len, playback) == ClockStep::Completed {
            match self.state {
                // The arc, not the sequence, decides when a jump ends
                FighterState::Jump => self.clock.hold_last(len),
                FighterState::ShootProjectile => {
                    self.spawn_projectile(rules, events);
                    self.enter(FighterState::Idle, rules);
                }
                _ => {
                    self.enter(FighterState::Idle, rules);
                }
            }
        }

        if let Some(arc) = self.jump {
            match PhysicsSystem::step_jump(arc, rules.jump_apex, rules.gravity) {
                Some(next) => self.jump = Some(next),
                None => {
                    self.enter(FighterState::Idle, rules);
                }
            }
        }

        self.clamp(rules);
    }

    fn spawn_projectile(&mut self, rules: &RulesConfig, events: &mut Vec<CombatEvent>) {
        let sequence = self.assets.projectile().clone();
        let width = sequence.frame(0).width;
        let reach = self.sequence().frames.last().map(|f| f.width).unwrap_or(0.0);
        let x = match self.facing {
            Facing::Right => self.x + reach,
            Facing::Left => self.x - width,
        };
        let y = rules.ground_line - self.ground_offset() - rules.projectile_height;

        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile::new(
            id,
            self.side,
            self.facing,
            x,
            y,
            rules.projectile_speed,
            rules.projectile_damage,
            sequence,
            rules.frame_hold,
        ));
        events.push(CombatEvent::ProjectileSpawned {
            owner: self.side,
            id,
        });
    }

    /// Subtract health (never floored) and apply knockback
    pub fn take_hit(&mut self, damage: i32, attacker_facing: Facing, rules: &RulesConfig) {
        self.health -= damage;
        self.x = PhysicsSystem::knockback(
            self.x,
            attacker_facing,
            rules.knockback,
            self.frame_size().width,
            rules.arena_width,
        );
    }

    /// Subtract health without moving, as projectiles do
    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    pub fn gain_meter(&mut self, amount: i32, rules: &RulesConfig) {
        self.meter = (self.meter + amount).clamp(0, rules.meter_max);
    }

    pub fn set_meter(&mut self, meter: i32, rules: &RulesConfig) {
        self.meter = meter.clamp(0, rules.meter_max);
    }

    /// Move horizontally to `x`, keeping the sprite inside the arena
    pub fn place_at(&mut self, x: f32, rules: &RulesConfig) {
        self.x = x;
        self.clamp(rules);
    }

    pub fn face_toward(&mut self, target_x: f32) {
        if target_x > self.x {
            self.facing = Facing::Right;
        } else if target_x < self.x {
            self.facing = Facing::Left;
        }
    }

    /// Jump to a frame of the current sequence
    pub fn seek_frame(&mut self, frame: usize) {
        let len = self.sequence().len();
        self.clock.seek(frame % len);
    }

    fn clamp(&mut self, rules: &RulesConfig) {
        self.x = PhysicsSystem::clamp_x(self.x, self.frame_size().width, rules.arena_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetProvider, BuiltinAssets};

    fn fighter(side: Side) -> (Combatant, RulesConfig) {
        let rules = RulesConfig::default();
        let assets = Arc::new(BuiltinAssets.load_skin("ryu").unwrap());
        (Combatant::new(side, assets, &rules), rules)
    }

    fn press(f: impl FnOnce(&mut InputIntent)) -> InputIntent {
        let mut intent = InputIntent::default();
        f(&mut intent);
        intent
    }

    #[test]
    fn starts_at_round_positions() {
        let (a, _) = fighter(Side::A);
        let (b, _) = fighter(Side::B);
        assert_eq!(a.x(), 50.0);
        assert_eq!(a.facing(), Facing::Right);
        assert_eq!(b.x(), 1055.0);
        assert_eq!(b.facing(), Facing::Left);
        assert_eq!(a.health(), 500);
    }

    #[test]
    fn attack_returns_to_idle_on_completion_tick() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.apply_input(&press(|i| i.attack = true), &rules);
        assert_eq!(a.state(), FighterState::Attack);

        let total = a.assets().duration_ticks(FighterState::Attack, rules.frame_hold);
        for _ in 0..total - 1 {
            a.advance(&rules, 1.0 / 144.0, &mut events);
            assert_eq!(a.state(), FighterState::Attack);
        }
        a.advance(&rules, 1.0 / 144.0, &mut events);
        assert_eq!(a.state(), FighterState::Idle);
        assert_eq!(a.previous_state(), FighterState::Attack);
        assert_eq!(a.frame(), 0);
    }

    #[test]
    fn input_is_ignored_mid_attack() {
        let (mut a, rules) = fighter(Side::A);
        a.apply_input(&press(|i| i.attack = true), &rules);
        a.apply_input(&press(|i| i.kick = true), &rules);
        assert_eq!(a.state(), FighterState::Attack);
    }

    #[test]
    fn shoot_needs_meter() {
        let (mut a, rules) = fighter(Side::A);
        a.set_meter(40, &rules);
        a.apply_input(&press(|i| i.shoot_projectile = true), &rules);
        assert_eq!(a.state(), FighterState::Idle);
        assert_eq!(a.meter(), 40);

        a.set_meter(60, &rules);
        a.apply_input(&press(|i| i.shoot_projectile = true), &rules);
        assert_eq!(a.state(), FighterState::ShootProjectile);
        assert_eq!(a.meter(), 10);
    }

    #[test]
    fn shoot_spawns_projectile_at_last_frame() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.set_meter(50, &rules);
        a.apply_input(&press(|i| i.shoot_projectile = true), &rules);
        let total = a.assets().duration_ticks(FighterState::ShootProjectile, rules.frame_hold);
        for _ in 0..total {
            assert!(a.projectiles().is_empty());
            a.advance(&rules, 1.0 / 144.0, &mut events);
        }
        assert_eq!(a.projectiles().len(), 1);
        assert_eq!(a.state(), FighterState::Idle);
        assert_eq!(a.projectiles()[0].x, a.x() + 175.0);
        assert!(matches!(events[0], CombatEvent::ProjectileSpawned { owner: Side::A, id: 1 }));
    }

    #[test]
    fn move_walks_and_stops_when_released() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.apply_input(&press(|i| i.move_right = true), &rules);
        a.advance(&rules, 0.1, &mut events);
        assert_eq!(a.state(), FighterState::Move);
        assert!((a.x() - 80.0).abs() < 1e-3);

        a.apply_input(&InputIntent::default(), &rules);
        assert_eq!(a.state(), FighterState::Idle);
    }

    #[test]
    fn guard_loops_while_held_and_breaks_on_movement() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        let guard = press(|i| i.guard = true);
        for _ in 0..200 {
            a.apply_input(&guard, &rules);
            a.advance(&rules, 1.0 / 144.0, &mut events);
            assert_eq!(a.state(), FighterState::Guard);
        }
        a.apply_input(
            &press(|i| {
                i.guard = true;
                i.move_left = true;
            }),
            &rules,
        );
        assert_eq!(a.state(), FighterState::Move);
    }

    #[test]
    fn turn_around_flips_once_per_press() {
        let (mut a, rules) = fighter(Side::A);
        let turn = press(|i| {
            i.modifier_held = true;
            i.move_left = true;
        });
        a.apply_input(&turn, &rules);
        a.apply_input(&turn, &rules);
        assert_eq!(a.facing(), Facing::Left);
        assert_eq!(a.state(), FighterState::Idle);
        assert_eq!(a.x(), 50.0);

        a.apply_input(&InputIntent::default(), &rules);
        a.apply_input(&turn, &rules);
        assert_eq!(a.facing(), Facing::Right);
    }

    #[test]
    fn jump_arc_lands_back_on_ground() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.apply_input(&press(|i| i.jump = true), &rules);
        assert_eq!(a.state(), FighterState::Jump);

        let mut peak: f32 = 0.0;
        let mut ticks = 0;
        while a.state() == FighterState::Jump {
            a.apply_input(&press(|i| i.move_right = true), &rules);
            a.advance(&rules, 1.0 / 144.0, &mut events);
            peak = peak.max(a.ground_offset());
            ticks += 1;
            assert!(a.frame() < a.sequence().len());
            assert!(ticks < 1000);
        }
        assert!(peak > 0.0);
        assert_eq!(a.ground_offset(), 0.0);
        assert_eq!(a.state(), FighterState::Idle);
        assert!(a.x() > 50.0);
    }

    #[test]
    fn jump_outlasts_its_sequence_until_landing() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.apply_input(&press(|i| i.jump = true), &rules);

        let sequence_ticks = a.assets().duration_ticks(FighterState::Jump, rules.frame_hold);
        for _ in 0..sequence_ticks {
            a.advance(&rules, 1.0 / 144.0, &mut events);
        }
        assert_eq!(a.state(), FighterState::Jump);
        assert!(a.is_airborne());
        assert_eq!(a.frame(), a.sequence().len() - 1);
    }

    #[test]
    fn interrupted_guard_restarts_new_sequence_from_zero() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        let guard = press(|i| i.guard = true);
        for _ in 0..13 {
            a.apply_input(&guard, &rules);
            a.advance(&rules, 1.0 / 144.0, &mut events);
        }
        assert_eq!(a.frame(), 1);
        assert_eq!(a.clock().hold(), 5);

        a.apply_input(&press(|i| i.move_right = true), &rules);
        assert_eq!(a.state(), FighterState::Move);
        assert_eq!(a.previous_state(), FighterState::Guard);
        assert_eq!(a.frame(), 0);
        assert_eq!(a.clock().hold(), 0);
    }

    #[test]
    fn forced_idle_mid_attack_resets_clock() {
        let (mut a, rules) = fighter(Side::A);
        let mut events = Vec::new();
        a.enter(FighterState::Attack, &rules);
        a.seek_frame(5);
        for _ in 0..3 {
            a.advance(&rules, 1.0 / 144.0, &mut events);
        }
        assert_eq!(a.frame(), 5);
        assert_eq!(a.clock().hold(), 3);

        assert!(a.enter(FighterState::Idle, &rules));
        assert_eq!(a.frame(), 0);
        assert_eq!(a.clock().hold(), 0);
        // Same-state re-entry keeps playback going
        a.advance(&rules, 1.0 / 144.0, &mut events);
        assert!(!a.enter(FighterState::Idle, &rules));
        assert_eq!(a.clock().hold(), 1);
    }

    #[test]
    fn hit_never_floors_health_and_knockback_clamps() {
        let (mut b, rules) = fighter(Side::B);
        b.take_hit(600, Facing::Right, &rules);
        assert_eq!(b.health(), -100);
        assert_eq!(b.x(), 1085.0);
        b.take_hit(10, Facing::Right, &rules);
        assert_eq!(b.x(), 1105.0);
    }

    #[test]
    fn meter_is_capped() {
        let (mut a, rules) = fighter(Side::A);
        a.gain_meter(95, &rules);
        a.gain_meter(10, &rules);
        assert_eq!(a.meter(), 100);
    }
}
