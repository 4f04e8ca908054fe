//! Surface and sprite extents supplied by the shell

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Container and sprite dimensions (px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub sprite_width: f32,
    pub sprite_height: f32,
}

impl Bounds {
    /// Build bounds, replacing non-finite or negative extents with zero
    pub fn new(width: f32, height: f32, sprite_width: f32, sprite_height: f32) -> Self {
        Self {
            width: extent(width),
            height: extent(height),
            sprite_width: extent(sprite_width),
            sprite_height: extent(sprite_height),
        }
    }

    /// Same values, re-sanitized (fields are public and may have been edited)
    pub fn normalized(&self) -> Self {
        Self::new(self.width, self.height, self.sprite_width, self.sprite_height)
    }

    /// Right-most valid sprite x (never negative)
    pub fn max_x(&self) -> f32 {
        let b = self.normalized();
        (b.width - b.sprite_width).max(0.0)
    }

    /// Resting sprite y (never negative)
    pub fn floor_y(&self) -> f32 {
        let b = self.normalized();
        (b.height - b.sprite_height).max(0.0)
    }

    /// Clamp a sprite position into the valid range on both axes
    pub fn clamp_sprite(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            clamp_axis(pos.x, self.max_x()),
            clamp_axis(pos.y, self.floor_y()),
        )
    }

    /// True until the container has been laid out
    pub fn is_empty(&self) -> bool {
        let b = self.normalized();
        b.width <= 0.0 || b.height <= 0.0
    }
}

fn extent(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn clamp_axis(v: f32, max: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, max) }
}
