//! Hit and hurt geometry keyed to animation frames

use serde::{Deserialize, Serialize};

use crate::assets::{FrameSize, HitTable};

use super::{Facing, FighterState};

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Reflect about the vertical axis of a sprite `sprite_width` wide
    pub fn mirrored(&self, sprite_width: f32) -> Rect {
        Rect::new(sprite_width - self.x - self.w, self.y, self.w, self.h)
    }

    fn faced(&self, facing: Facing, sprite_width: f32) -> Rect {
        match facing {
            Facing::Right => *self,
            Facing::Left => self.mirrored(sprite_width),
        }
    }
}

/// An active hit rectangle and the damage it deals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub rect: Rect,
    pub damage: i32,
}

/// Amount shaved off each edge of a frame to get the hurt region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurtMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for HurtMargins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 40.0,
            top: 20.0,
            bottom: 10.0,
        }
    }
}

/// Pure lookups from (state, frame, facing) to rectangles
pub struct HitGeometry;

impl HitGeometry {
    /// Active hit regions in sprite-local space; empty for frames without an entry
    pub fn active_hit_regions(
        table: &HitTable,
        state: FighterState,
        frame: usize,
        facing: Facing,
        sprite_width: f32,
    ) -> Vec<HitBox> {
        match table.get(state, frame) {
            Some(active) => active
                .boxes
                .iter()
                .map(|rect| HitBox {
                    rect: rect.faced(facing, sprite_width),
                    damage: active.damage,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Hurt region in sprite-local space
    ///
    /// Frames wider than the idle silhouette extend toward the facing direction,
    /// so the excess is trimmed from the leading edge before mirroring.
    pub fn hurt_region(frame: FrameSize, idle_width: f32, margins: &HurtMargins, facing: Facing) -> Rect {
        let extra = (frame.width - idle_width).max(0.0);
        let w = (frame.width - margins.left - margins.right - extra).max(0.0);
        let h = (frame.height - margins.top - margins.bottom).max(0.0);
        Rect::new(margins.left, margins.top, w, h).faced(facing, frame.width)
    }

    /// Move a sprite-local rectangle into arena space
    pub fn to_arena(rect: Rect, origin_x: f32, origin_y: f32) -> Rect {
        rect.translated(origin_x, origin_y)
    }
}
