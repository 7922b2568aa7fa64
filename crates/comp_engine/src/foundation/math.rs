//! Math utilities and types
//!
//! Provides the 2D math types used by the scene graph.

pub use nalgebra::{Vector2, Rotation2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D rotation type
pub type Rot2 = Rotation2<f32>;

/// Convert radians to degrees
pub fn rad_to_deg(angle: f32) -> f32 {
    angle.to_degrees()
}

/// Convert degrees to radians
pub fn deg_to_rad(angle: f32) -> f32 {
    angle.to_radians()
}

/// Rotate a vector around the origin by `angle` radians
pub fn rotate(vector: Vec2, angle: f32) -> Vec2 {
    if angle == 0.0 {
        return vector;
    }
    Rot2::new(angle) * vector
}

/// Linear interpolation between two values
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
