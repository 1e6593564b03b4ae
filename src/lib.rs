//! Warehouse Duel - simulation core for a small side-scrolling combat game
//!
//! Core modules:
//! - `sim`: Time-stepped simulation (boxes, emitters/particles, health, combat)
//! - `config`: Data-driven tuning loaded from JSON
//!
//! Rendering, dialogue, asset loading and input capture belong to the host.

pub mod config;
pub mod sim;

pub use config::{ConfigError, Settings};

/// Game configuration constants
pub mod consts {
    /// Real-time gaps above this many seconds are dropped, not simulated
    pub const MAX_ELAPSED_TIME: f64 = 0.5;
    /// Fixed step used by the demo runner (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;

    /// Walkway extents (world px, walker centre)
    pub const WALKWAY_MIN_X: f32 = -300.0;
    pub const WALKWAY_MAX_X: f32 = 300.0;
    /// Walker speed, px/s
    pub const WALK_SPEED: f32 = 40.0;
    pub const WALKER_WIDTH: f32 = 16.0;
    pub const WALKER_HEIGHT: f32 = 24.0;
    /// Walk animation: frames per cycle and pixels covered by one cycle
    pub const FRAMES_PER_WALK_CYCLE: u32 = 6;
    pub const PX_PER_WALK_CYCLE: f32 = 18.0;
    /// Seconds for an interaction prompt to fully fade in or out
    pub const PROMPT_FADE_TIME: f32 = 0.2;
    pub const WARNING_SIGN_WIDTH: f32 = 20.0;

    /// Arena entrance
    pub const COMBAT_ZONE_X: f32 = 200.0;
    pub const COMBAT_ZONE_WIDTH: f32 = 30.0;

    /// Emitter defaults
    pub const DEFAULT_COOLDOWN: f32 = 1.0;
    pub const DEFAULT_MAX_AGE: f32 = 10.0;
    pub const DEFAULT_DAMAGE: f32 = 10.0;
    /// Cooldown for combat emitters created by a session
    pub const COMBAT_COOLDOWN: f32 = 0.25;
    pub const PARTICLE_SPEED: f32 = 200.0;
    /// Particles further than this outside the walkway are culled
    pub const PARTICLE_BOUNDS_MARGIN: f32 = 200.0;

    /// Combat tuning
    pub const MAX_HEALTH: f32 = 100.0;
    pub const AIM_HALF_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
    /// Opacity lost per second by a resolving combatant
    pub const FADE_RATE: f32 = 1.0;
    /// Opponent aim sweep, radians per second of phase
    pub const OPPONENT_SWEEP_FREQUENCY: f32 = 2.0;

    /// Rendering hints consumed by the draw cull
    pub const PARTICLE_SIZE: f32 = 2.0;
    pub const DRAW_MARGIN: f32 = 10.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_angle(-PI), -PI);
        assert!((normalize_angle(-3.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }
}
