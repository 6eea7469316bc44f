//! Fighter movement constraints and jump kinematics

use super::Facing;

/// Vertical state of a jump arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpArc {
    /// Height above the ground line
    pub ground_offset: f32,
    /// Upward velocity, pixels per tick
    pub velocity_y: f32,
}

impl JumpArc {
    pub fn launch(jump_apex: f32) -> Self {
        Self {
            ground_offset: 0.0,
            velocity_y: jump_apex,
        }
    }
}

/// Physics helpers for fighters on a flat, bounded stage
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Clamp the left edge so the whole sprite stays inside the arena
    pub fn clamp_x(x: f32, sprite_width: f32, arena_width: f32) -> f32 {
        let max_x = (arena_width - sprite_width).max(0.0);
        x.clamp(0.0, max_x)
    }

    /// Horizontal displacement for one tick of walking
    pub fn walk_step(direction: f32, walk_speed: f32, dt: f32) -> f32 {
        direction.clamp(-1.0, 1.0) * walk_speed * dt
    }

    /// Push a defender away along the attacker's facing, then re-clamp
    pub fn knockback(
        x: f32,
        attacker_facing: Facing,
        offset: f32,
        sprite_width: f32,
        arena_width: f32,
    ) -> f32 {
        Self::clamp_x(x + attacker_facing.sign() * offset, sprite_width, arena_width)
    }

    /// Step from `x` toward `target` by at most `step`, never past it
    pub fn approach(x: f32, target: f32, step: f32) -> f32 {
        if target > x {
            (x + step).min(target)
        } else {
            (x - step).max(target)
        }
    }

    /// Advance a jump arc by one tick
    ///
    /// Returns `None` once the velocity has dropped below `-jump_apex`, at which
    /// point the fighter is back on the ground.
    pub fn step_jump(arc: JumpArc, jump_apex: f32, gravity: f32) -> Option<JumpArc> {
        let ground_offset = (arc.ground_offset + arc.velocity_y).max(0.0);
        let velocity_y = arc.velocity_y - gravity;
        if velocity_y < -jump_apex {
            None
        } else {
            Some(JumpArc {
                ground_offset,
                velocity_y,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_sprite_inside_arena() {
        assert_eq!(PhysicsSystem::clamp_x(-20.0, 175.0, 1280.0), 0.0);
        assert_eq!(PhysicsSystem::clamp_x(1200.0, 175.0, 1280.0), 1105.0);
        assert_eq!(PhysicsSystem::clamp_x(300.0, 175.0, 1280.0), 300.0);
    }

    #[test]
    fn knockback_follows_attacker_facing() {
        assert_eq!(PhysicsSystem::knockback(650.0, Facing::Right, 30.0, 175.0, 1280.0), 680.0);
        assert_eq!(PhysicsSystem::knockback(650.0, Facing::Left, 30.0, 175.0, 1280.0), 620.0);
        assert_eq!(PhysicsSystem::knockback(10.0, Facing::Left, 30.0, 175.0, 1280.0), 0.0);
    }

    #[test]
    fn approach_never_overshoots() {
        assert_eq!(PhysicsSystem::approach(100.0, 102.0, 5.0), 102.0);
        assert_eq!(PhysicsSystem::approach(100.0, 50.0, 5.0), 95.0);
    }

    #[test]
    fn jump_arc_rises_then_lands() {
        let mut arc = JumpArc::launch(12.0);
        let mut peak: f32 = 0.0;
        let mut ticks = 0;
        while let Some(next) = PhysicsSystem::step_jump(arc, 12.0, 0.25) {
            arc = next;
            peak = peak.max(arc.ground_offset);
            ticks += 1;
        }
        assert!(peak > 250.0);
        assert!(ticks > 90 && ticks < 100);
    }
}
