//! Deterministic simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, reads the
//! clock (except `Simulator::simulate_now`) or touches platform input:
//! - Steps are driven by [`Simulator`]
//! - Hosts feed an [`Input`] snapshot and read positions/health/phases back
//! - Emitter spread uses a seeded RNG only

pub mod aabb;
pub mod combat;
pub mod health;
pub mod input;
pub mod particles;
pub mod session;
pub mod simulator;
pub mod vector;

pub use aabb::Aabb;
pub use combat::{
    CombatEvent, CombatPhase, Combatant, CombatantSetup, Control, Duel, DuelConfig, Side,
    aim_angle, clamp_aim,
};
pub use health::HealthBar;
pub use input::{Input, KeyLatch, Pointer, keys};
pub use particles::{
    Camera, Emitter, EmitterConfig, EmitterId, Particle, ParticleManager, ParticleSink,
};
pub use session::{Facing, Session, SessionEvent, Zone, ZoneKind, default_zones};
pub use simulator::{Simulate, Simulator, SimulatorConfig};
