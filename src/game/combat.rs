//! Combat system - melee hit resolution, guard mitigation, projectile collisions

use tracing::debug;

use crate::config::{DebounceMode, RulesConfig};

use super::fighter::{Combatant, StrikeKey};
use super::snapshot::CombatEvent;
use super::{FighterState, Side};

/// Damage and meter arithmetic
pub struct CombatSystem;

impl CombatSystem {
    /// Damage that gets through a guard
    pub fn guarded_damage(base_damage: i32, factor: f32) -> i32 {
        (base_damage as f32 * factor).round() as i32
    }

    /// Damage dealt for a hit against a defender in `defender_state`
    pub fn calculate_damage(base_damage: i32, defender_state: FighterState, rules: &RulesConfig) -> i32 {
        if defender_state == FighterState::Guard {
            Self::guarded_damage(base_damage, rules.guard_damage_factor)
        } else {
            base_damage
        }
    }
}

/// Hit result from melee resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: Side,
    pub defender: Side,
    pub key: StrikeKey,
    pub base_damage: i32,
    pub damage: i32,
    pub guarded: bool,
}

/// Stateless resolver for both melee and projectile contact
pub struct CombatResolver;

impl CombatResolver {
    /// Find the first active region of `attacker` touching `defender`
    ///
    /// Both ordered pairs are detected against the same pre-hit state, so a
    /// trade lands on both sides.
    pub fn detect(attacker: &Combatant, defender: &Combatant, rules: &RulesConfig) -> Option<HitResult> {
        let key = attacker.strike_key()?;
        let allowed = match rules.debounce {
            DebounceMode::ActiveFrame => !attacker.already_struck(key),
            DebounceMode::DefenderHold => defender.clock().at_frame_start(),
        };
        if !allowed {
            return None;
        }

        let hurt = defender.hurt_box(rules);
        let hit = attacker
            .hit_boxes(rules)
            .into_iter()
            .find(|hit| hit.rect.intersects(&hurt))?;

        let guarded = defender.state() == FighterState::Guard;
        Some(HitResult {
            attacker: attacker.side(),
            defender: defender.side(),
            key,
            base_damage: hit.damage,
            damage: CombatSystem::calculate_damage(hit.damage, defender.state(), rules),
            guarded,
        })
    }

    /// Apply damage, meter and knockback for a detected hit
    pub fn apply(
        hit: &HitResult,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        rules: &RulesConfig,
    ) -> CombatEvent {
        defender.take_hit(hit.damage, attacker.facing(), rules);
        if hit.guarded {
            defender.gain_meter(rules.guard_meter_gain, rules);
        } else {
            attacker.gain_meter(rules.hit_meter_gain, rules);
        }
        attacker.mark_strike(hit.key);

        debug!(
            attacker = %hit.attacker,
            defender = %hit.defender,
            state = ?hit.key.state,
            frame = hit.key.frame,
            damage = hit.damage,
            guarded = hit.guarded,
            defender_health = defender.health(),
            "Melee hit"
        );

        if hit.guarded {
            CombatEvent::Guarded {
                attacker: hit.attacker,
                defender: hit.defender,
                state: hit.key.state,
                frame: hit.key.frame,
                damage: hit.damage,
            }
        } else {
            CombatEvent::Hit {
                attacker: hit.attacker,
                defender: hit.defender,
                state: hit.key.state,
                frame: hit.key.frame,
                damage: hit.damage,
            }
        }
    }

    /// Resolve melee for both ordered pairs; at most one hit each
    pub fn resolve_melee(
        fighters: &mut [Combatant; 2],
        rules: &RulesConfig,
        events: &mut Vec<CombatEvent>,
    ) -> Vec<HitResult> {
        let [a, b] = fighters;
        let a_on_b = Self::detect(a, b, rules);
        let b_on_a = Self::detect(b, a, rules);

        let mut hits = Vec::new();
        if let Some(hit) = a_on_b {
            events.push(Self::apply(&hit, a, b, rules));
            hits.push(hit);
        }
        if let Some(hit) = b_on_a {
            events.push(Self::apply(&hit, b, a, rules));
            hits.push(hit);
        }
        hits
    }

    /// Move every live projectile, then remove the ones that left the arena,
    /// clashed, or struck the opposing fighter
    pub fn resolve_projectiles(
        fighters: &mut [Combatant; 2],
        rules: &RulesConfig,
        dt: f32,
        events: &mut Vec<CombatEvent>,
    ) {
        for fighter in fighters.iter_mut() {
            for projectile in fighter.projectiles_mut() {
                projectile.update(dt);
            }
        }

        // (owner slot, index) of everything still in flight
        let mut live: Vec<(usize, usize)> = Vec::new();
        let mut doomed: [Vec<usize>; 2] = [Vec::new(), Vec::new()];

        for (slot, fighter) in fighters.iter().enumerate() {
            for (idx, projectile) in fighter.projectiles().iter().enumerate() {
                if projectile.out_of_bounds(rules.arena_width) {
                    events.push(CombatEvent::ProjectileExpired {
                        owner: projectile.owner,
                        id: projectile.id,
                    });
                    doomed[slot].push(idx);
                } else {
                    live.push((slot, idx));
                }
            }
        }

        let mut consumed = vec![false; live.len()];
        for i in 0..live.len() {
            for j in (i + 1)..live.len() {
                if consumed[i] || consumed[j] {
                    continue;
                }
                let (si, ii) = live[i];
                let (sj, ij) = live[j];
                let first = &fighters[si].projectiles()[ii];
                let second = &fighters[sj].projectiles()[ij];
                if first.rect().intersects(&second.rect()) {
                    events.push(CombatEvent::ProjectileClash {
                        owner: first.owner,
                        id: first.id,
                        other_owner: second.owner,
                        other_id: second.id,
                    });
                    consumed[i] = true;
                    consumed[j] = true;
                    doomed[si].push(ii);
                    doomed[sj].push(ij);
                }
            }
        }

        let mut strikes: Vec<(usize, i32)> = Vec::new();
        for (n, &(slot, idx)) in live.iter().enumerate() {
            if consumed[n] {
                continue;
            }
            let target_slot = 1 - slot;
            let projectile = &fighters[slot].projectiles()[idx];
            let hurt = fighters[target_slot].hurt_box(rules);
            if projectile.rect().intersects(&hurt) {
                events.push(CombatEvent::ProjectileHit {
                    owner: projectile.owner,
                    target: fighters[target_slot].side(),
                    id: projectile.id,
                    damage: projectile.damage,
                });
                strikes.push((target_slot, projectile.damage));
                doomed[slot].push(idx);
            }
        }

        for (target_slot, damage) in strikes {
            fighters[target_slot].take_damage(damage);
            debug!(
                target = %fighters[target_slot].side(),
                damage,
                health = fighters[target_slot].health(),
                "Projectile hit"
            );
        }

        for (slot, mut indices) in doomed.into_iter().enumerate() {
            indices.sort_unstable();
            indices.dedup();
            let projectiles = fighters[slot].projectiles_mut();
            for idx in indices.into_iter().rev() {
                if idx < projectiles.len() {
                    projectiles.remove(idx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assets::{AssetProvider, BuiltinAssets};
    use crate::game::projectile::Projectile;
    use crate::game::Facing;

    fn setup() -> ([Combatant; 2], RulesConfig) {
        let rules = RulesConfig::default();
        let assets = Arc::new(BuiltinAssets.load_skin("ryu").unwrap());
        let mut a = Combatant::new(Side::A, assets.clone(), &rules);
        let mut b = Combatant::new(Side::B, assets, &rules);
        a.place_at(500.0, &rules);
        b.place_at(650.0, &rules);
        ([a, b], rules)
    }

    fn punch_frame_nine(fighter: &mut Combatant, rules: &RulesConfig) {
        fighter.enter(FighterState::Attack, rules);
        fighter.seek_frame(9);
    }

    fn projectile(owner: Side, facing: Facing, x: f32, fighter: &Combatant) -> Projectile {
        Projectile::new(
            7,
            owner,
            facing,
            x,
            400.0,
            600.0,
            40,
            fighter.assets().projectile().clone(),
            8,
        )
    }

    #[test]
    fn guard_cuts_damage_to_a_fifth() {
        assert_eq!(CombatSystem::guarded_damage(20, 0.2), 4);
        assert_eq!(CombatSystem::guarded_damage(35, 0.2), 7);
        assert_eq!(CombatSystem::guarded_damage(30, 0.2), 6);
    }

    #[test]
    fn unguarded_hit_deals_full_damage_and_feeds_attacker() {
        let (mut fighters, rules) = setup();
        punch_frame_nine(&mut fighters[0], &rules);
        let mut events = Vec::new();

        let hits = CombatResolver::resolve_melee(&mut fighters, &rules, &mut events);
        assert_eq!(hits.len(), 1);
        assert_eq!(fighters[1].health(), 480);
        assert_eq!(fighters[0].meter(), 10);
        assert_eq!(fighters[1].meter(), 0);
        assert_eq!(fighters[1].x(), 680.0);
        assert!(matches!(events[0], CombatEvent::Hit { damage: 20, frame: 9, .. }));
    }

    #[test]
    fn guarded_hit_feeds_defender() {
        let (mut fighters, rules) = setup();
        punch_frame_nine(&mut fighters[0], &rules);
        fighters[1].enter(FighterState::Guard, &rules);
        let mut events = Vec::new();

        CombatResolver::resolve_melee(&mut fighters, &rules, &mut events);
        assert_eq!(fighters[1].health(), 496);
        assert_eq!(fighters[1].meter(), 7);
        assert_eq!(fighters[0].meter(), 0);
        assert!(matches!(events[0], CombatEvent::Guarded { damage: 4, .. }));
    }

    #[test]
    fn same_active_frame_hits_once() {
        let (mut fighters, rules) = setup();
        punch_frame_nine(&mut fighters[0], &rules);
        let mut events = Vec::new();
        for _ in 0..5 {
            CombatResolver::resolve_melee(&mut fighters, &rules, &mut events);
        }
        assert_eq!(fighters[1].health(), 480);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn simultaneous_strikes_both_land() {
        let (mut fighters, rules) = setup();
        fighters[1].place_at(600.0, &rules);
        punch_frame_nine(&mut fighters[0], &rules);
        punch_frame_nine(&mut fighters[1], &rules);
        let mut events = Vec::new();

        let hits = CombatResolver::resolve_melee(&mut fighters, &rules, &mut events);
        assert_eq!(hits.len(), 2);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CombatEvent::Hit { attacker: Side::A, damage: 20, .. }));
        assert!(matches!(events[1], CombatEvent::Hit { attacker: Side::B, damage: 20, .. }));
        assert_eq!(fighters[0].health(), 480);
        assert_eq!(fighters[1].health(), 480);
        assert_eq!(fighters[0].meter(), 10);
        assert_eq!(fighters[1].meter(), 10);
        // Each pushed in the other's facing direction
        assert_eq!(fighters[0].x(), 470.0);
        assert_eq!(fighters[1].x(), 630.0);
    }

    #[test]
    fn defender_hold_mode_waits_for_frame_start() {
        let (mut fighters, mut rules) = setup();
        rules.debounce = DebounceMode::DefenderHold;
        punch_frame_nine(&mut fighters[0], &rules);
        let mut events = Vec::new();
        fighters[1].advance(&rules, 0.0, &mut events);
        assert!(CombatResolver::detect(&fighters[0], &fighters[1], &rules).is_none());
    }

    #[test]
    fn out_of_reach_does_not_hit() {
        let (mut fighters, rules) = setup();
        fighters[1].place_at(1000.0, &rules);
        punch_frame_nine(&mut fighters[0], &rules);
        let mut events = Vec::new();
        assert!(CombatResolver::resolve_melee(&mut fighters, &rules, &mut events).is_empty());
        assert_eq!(fighters[1].health(), 500);
    }

    #[test]
    fn projectile_leaving_arena_is_removed_without_hitting() {
        let (mut fighters, rules) = setup();
        // Target standing right at the left wall
        fighters[1].place_at(0.0, &rules);
        let p = projectile(Side::A, Facing::Left, 1.0, &fighters[0]);
        fighters[0].projectiles_mut().push(p);
        let mut events = Vec::new();

        CombatResolver::resolve_projectiles(&mut fighters, &rules, 0.1, &mut events);
        assert!(fighters[0].projectiles().is_empty());
        assert_eq!(fighters[1].health(), 500);
        assert_eq!(events, vec![CombatEvent::ProjectileExpired { owner: Side::A, id: 7 }]);
    }

    #[test]
    fn projectiles_cancel_each_other() {
        let (mut fighters, rules) = setup();
        fighters[1].place_at(1100.0, &rules);
        fighters[0].place_at(0.0, &rules);
        let pa = projectile(Side::A, Facing::Right, 600.0, &fighters[0]);
        let pb = projectile(Side::B, Facing::Left, 650.0, &fighters[1]);
        fighters[0].projectiles_mut().push(pa);
        fighters[1].projectiles_mut().push(pb);
        let mut events = Vec::new();

        CombatResolver::resolve_projectiles(&mut fighters, &rules, 0.0, &mut events);
        assert!(fighters[0].projectiles().is_empty());
        assert!(fighters[1].projectiles().is_empty());
        assert!(matches!(events[0], CombatEvent::ProjectileClash { .. }));
    }

    #[test]
    fn projectile_hit_ignores_guard() {
        let (mut fighters, rules) = setup();
        fighters[1].enter(FighterState::Guard, &rules);
        let p = projectile(Side::A, Facing::Right, 680.0, &fighters[0]);
        fighters[0].projectiles_mut().push(p);
        let mut events = Vec::new();

        CombatResolver::resolve_projectiles(&mut fighters, &rules, 0.0, &mut events);
        assert_eq!(fighters[1].health(), 460);
        assert!(fighters[0].projectiles().is_empty());
        assert!(matches!(
            events[0],
            CombatEvent::ProjectileHit { target: Side::B, damage: 40, .. }
        ));
    }
}
