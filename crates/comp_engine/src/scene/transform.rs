//! 2D transform of a scene node
//!
//! Relative position and rotation are edited directly. Absolute values are
//! cached and recomputed only on request (`update_absolute`, or
//! `Scene::refresh_transform` for a whole ancestor chain), so callers that
//! move a node and need fresh absolute coordinates must refresh first.

use crate::foundation::math::{rotate, Vec2};

/// Parent-relative transform with cached absolute values
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec2,

    /// Rotation relative to the parent (radians)
    pub rotation: f32,

    /// Pivot of the rotation, relative to the position
    pub rotation_offset: Vec2,

    abs_position: Vec2,
    abs_rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            rotation_offset: Vec2::zeros(),
            abs_position: Vec2::zeros(),
            abs_rotation: 0.0,
        }
    }
}

impl Transform {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(x: f32, y: f32) -> Self {
        Self::default().with_position(x, y)
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation pivot
    pub fn with_rotation_offset(mut self, x: f32, y: f32) -> Self {
        self.rotation_offset = Vec2::new(x, y);
        self
    }

    /// Set position
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Move by the given offset
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    /// Rotate by the given angle
    pub fn rotate_by(&mut self, angle: f32) {
        self.rotation += angle;
    }

    /// Cached absolute position
    pub fn absolute_position(&self) -> Vec2 {
        self.abs_position
    }

    /// Cached absolute rotation
    pub fn absolute_rotation(&self) -> f32 {
        self.abs_rotation
    }

    /// Recompute the absolute values by composing with the parent's absolute transform
    ///
    /// With no parent the node is its own root and absolute equals relative.
    pub fn update_absolute(&mut self, parent: Option<&Transform>) {
        match parent {
            Some(parent) => {
                self.abs_rotation = parent.abs_rotation + self.rotation;
                self.abs_position = parent.abs_position + rotate(self.position, parent.abs_rotation);
            }
            None => {
                self.abs_rotation = self.rotation;
                self.abs_position = self.position;
            }
        }
    }
}
