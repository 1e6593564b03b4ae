//! Engine settings
//!
//! Everything tunable lives in one serde struct so a host can ship a JSON
//! file next to the binary. Missing fields fall back to the defaults in
//! [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{DuelConfig, SimulatorConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON")]
    Parse(#[from] serde_json::Error),
}

/// Walkway geometry and walker movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkwayConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub start_x: f32,
    /// Pixels per second
    pub walk_speed: f32,
    pub walker_width: f32,
    pub walker_height: f32,
}

impl Default for WalkwayConfig {
    fn default() -> Self {
        Self {
            min_x: WALKWAY_MIN_X,
            max_x: WALKWAY_MAX_X,
            start_x: WALKWAY_MIN_X + 50.0,
            walk_speed: WALK_SPEED,
            walker_width: WALKER_WIDTH,
            walker_height: WALKER_HEIGHT,
        }
    }
}

/// Defaults for every emitter the session creates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterDefaults {
    pub cooldown: f32,
    pub max_age: f32,
    pub damage: f32,
    /// Particle speed in pixels per second
    pub speed: f32,
    pub spread: f32,
}

impl Default for EmitterDefaults {
    fn default() -> Self {
        Self {
            cooldown: COMBAT_COOLDOWN,
            max_age: DEFAULT_MAX_AGE,
            damage: DEFAULT_DAMAGE,
            speed: PARTICLE_SPEED,
            spread: 0.0,
        }
    }
}

/// Combat arena layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub duel: DuelConfig,
    pub max_health: f32,
    /// Where walking into the arena triggers the fight
    pub zone_x: f32,
    pub zone_width: f32,
    /// Opponent emitter anchor
    pub opponent_x: f32,
    pub opponent_y: f32,
    pub opponent_frequency: f32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            duel: DuelConfig::default(),
            max_health: MAX_HEALTH,
            zone_x: COMBAT_ZONE_X,
            zone_width: COMBAT_ZONE_WIDTH,
            opponent_x: WALKWAY_MAX_X,
            opponent_y: -WALKER_HEIGHT / 2.0,
            opponent_frequency: OPPONENT_SWEEP_FREQUENCY,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulator: SimulatorConfig,
    pub walkway: WalkwayConfig,
    pub emitter: EmitterDefaults,
    pub combat: CombatSettings,
    /// Seed for emitter spread
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            walkway: WalkwayConfig::default(),
            emitter: EmitterDefaults::default(),
            combat: CombatSettings::default(),
            seed: 0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; unknown fields are ignored, missing ones defaulted
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.validate();
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace values that would break the simulation with defaults
    pub fn validate(&mut self) {
        if matches!(self.simulator.step_time, Some(step) if step <= 0.0) {
            log::warn!("Non-positive step_time; using variable step");
            self.simulator.step_time = None;
        }
        if self.simulator.max_elapsed <= 0.0 {
            log::warn!("Non-positive max_elapsed; using {MAX_ELAPSED_TIME}");
            self.simulator.max_elapsed = MAX_ELAPSED_TIME;
        }
        if self.walkway.min_x > self.walkway.max_x {
            log::warn!("Walkway bounds reversed; swapping");
            std::mem::swap(&mut self.walkway.min_x, &mut self.walkway.max_x);
        }
        self.walkway.start_x = self.walkway.start_x.clamp(self.walkway.min_x, self.walkway.max_x);
        if self.combat.duel.fade_rate <= 0.0 {
            log::warn!("Non-positive fade_rate; using {FADE_RATE}");
            self.combat.duel.fade_rate = FADE_RATE;
        }
        if self.emitter.cooldown < 0.0 {
            self.emitter.cooldown = 0.0;
        }
    }
}
