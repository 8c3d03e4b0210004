//! 2D placement of visual clips inside the frame.

use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

/// 2D vector.
pub type Vec2 = GlamVec2;

/// Position, scale, rotation, anchor and skew of a visual clip.
///
/// Purely descriptive; the renderer that consumes it lives outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipTransform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Normalized anchor point (0.5, 0.5 = centre).
    pub anchor: Vec2,
    pub skew: Vec2,
}

impl ClipTransform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
        anchor: Vec2::new(0.5, 0.5),
        skew: Vec2::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Translate by `delta`.
    pub fn translated(mut self, delta: Vec2) -> Self {
        self.position += delta;
        self
    }

    /// Uniformly scale by `factor`.
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

impl Default for ClipTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
