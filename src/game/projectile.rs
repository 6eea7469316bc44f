//! Projectiles - independent moving entities spawned by a fighter

use std::sync::Arc;

use crate::assets::AnimationSequence;

use super::animation::{AnimationClock, Playback};
use super::geometry::Rect;
use super::{Facing, Side};

/// Live projectile in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub owner: Side,
    pub facing: Facing,
    /// Left edge in arena space
    pub x: f32,
    /// Top edge in arena space
    pub y: f32,
    /// Horizontal speed, pixels per second, signed
    pub vel_x: f32,
    pub damage: i32,
    clock: AnimationClock,
    /// Shared with the owner's animation set, never mutated
    sequence: Arc<AnimationSequence>,
}

impl Projectile {
    /// Create a new projectile
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        owner: Side,
        facing: Facing,
        x: f32,
        y: f32,
        speed: f32,
        damage: i32,
        sequence: Arc<AnimationSequence>,
        frame_hold: u32,
    ) -> Self {
        Self {
            id,
            owner,
            facing,
            x,
            y,
            vel_x: facing.sign() * speed,
            damage,
            clock: AnimationClock::new(frame_hold),
            sequence,
        }
    }

    /// Move and animate for one tick
    pub fn update(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
        self.clock.tick(self.sequence.len(), Playback::Looping);
    }

    /// Current animation frame index
    pub fn frame(&self) -> usize {
        self.clock.frame(self.sequence.len())
    }

    /// Bounds of the current frame in arena space
    pub fn rect(&self) -> Rect {
        let size = self.sequence.frame(self.frame());
        Rect::new(self.x, self.y, size.width, size.height)
    }

    /// Left of the arena or past its right edge
    pub fn out_of_bounds(&self, arena_width: f32) -> bool {
        self.x < 0.0 || self.x > arena_width
    }
}
