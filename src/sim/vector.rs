//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam already gives us add/sub/scale/length; the engine additionally needs
//! rotation by an angle (emitter local frames), a unit vector that tolerates
//! zero length, and the angle of a vector measured from the origin.

use glam::Vec2;

/// Rotate `v` counter-clockwise by `angle` radians
#[inline]
pub fn rotated(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Unit vector in the direction of `v` (zero stays zero)
#[inline]
pub fn unit(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Angle of `v` from the positive x axis, in (-π, π]
#[inline]
pub fn angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
