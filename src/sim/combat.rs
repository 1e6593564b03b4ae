//! Two-sided combat state machine
//!
//! Each combatant moves through `Idle -> CombatActive -> Resolving -> Dead`.
//! The duel wires the combatants' emitters, hit boxes and health bars
//! together and resolves deaths exactly once per tick.

use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::health::HealthBar;
use super::input::{Input, keys};
use super::particles::{EmitterConfig, EmitterId, ParticleManager};
use super::vector::angle;
use crate::consts::*;
use crate::normalize_angle;

/// Which combatant; also the payload of every combat hit box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Player, Side::Opponent];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Per-combatant phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatPhase {
    /// Not fighting (before the duel, or survived it)
    Idle,
    /// Aiming, firing and taking hits
    CombatActive,
    /// Health ran out; fading out
    Resolving { opacity: f32 },
    /// Gone for good
    Dead,
}

/// How a combatant's emitter is aimed and triggered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Control {
    /// Aim at the pointer, fire while the pointer or fire key is held
    Pointer,
    /// Sweep `base ± half-angle` sinusoidally and fire continuously
    Scripted { frequency: f32, phase: f32 },
}

/// Tuning shared by both sides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Max deviation of an emitter from its base angle (radians)
    pub aim_half_angle: f32,
    /// Opacity lost per second while resolving
    pub fade_rate: f32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            aim_half_angle: AIM_HALF_ANGLE,
            fade_rate: FADE_RATE,
        }
    }
}

/// Description of one side, consumed by [`Duel::new`]
#[derive(Debug, Clone)]
pub struct CombatantSetup {
    pub name: String,
    pub max_health: f32,
    /// Emitter anchor and hit box centre
    pub anchor: Vec2,
    /// Half extents of the hit box
    pub hit_extent: Vec2,
    pub base_angle: f32,
    pub control: Control,
    /// Position, angle and targets are overwritten by the duel
    pub emitter: EmitterConfig<Side>,
}

/// Things the host may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEvent {
    /// Health hit zero; the side started fading out
    Down(Side),
    /// Fade finished
    Dead(Side),
    /// Nobody is fading any more; survivors are back to idle
    Over,
}

#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub side: Side,
    pub health: HealthBar,
    pub emitter: EmitterId,
    pub control: Control,
    pub base_angle: f32,
    phase: CombatPhase,
    hitbox: Aabb<Side>,
    hit_extent: Vec2,
}

impl Combatant {
    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn hitbox(&self) -> &Aabb<Side> {
        &self.hitbox
    }

    /// Render opacity: fades while resolving, 0 once dead
    pub fn opacity(&self) -> f32 {
        match self.phase {
            CombatPhase::Resolving { opacity } => opacity,
            CombatPhase::Dead => 0.0,
            _ => 1.0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.phase == CombatPhase::Dead
    }
}

/// Angle that turns an emitter's local `speed` toward `target`; `None` when
/// either direction is undefined
pub fn aim_angle(anchor: Vec2, speed: Vec2, target: Vec2) -> Option<f32> {
    let to_target = target - anchor;
    if to_target.length_squared() < f32::EPSILON || speed.length_squared() < f32::EPSILON {
        return None;
    }
    Some(angle(to_target) - angle(speed))
}

/// Clamp `angle` to within `half_angle` of `base`, taking the short way round
pub fn clamp_aim(angle: f32, base: f32, half_angle: f32) -> f32 {
    base + normalize_angle(angle - base).clamp(-half_angle, half_angle)
}

/// Player vs. opponent
#[derive(Debug, Clone)]
pub struct Duel {
    pub config: DuelConfig,
    combatants: [Combatant; 2],
    engaged: bool,
    /// Set at the first death; emitters stay off from then on
    ceasefire: bool,
}

impl Duel {
    /// Create both combatants and their (inactive) emitters
    pub fn new(
        config: DuelConfig,
        player: CombatantSetup,
        opponent: CombatantSetup,
        particles: &mut ParticleManager<Side>,
    ) -> Self {
        let player = Self::build(Side::Player, player, particles);
        let opponent = Self::build(Side::Opponent, opponent, particles);
        Self {
            config,
            combatants: [player, opponent],
            engaged: false,
            ceasefire: false,
        }
    }

    fn build(side: Side, setup: CombatantSetup, particles: &mut ParticleManager<Side>) -> Combatant {
        let emitter = particles.create_emitter(EmitterConfig {
            position: setup.anchor,
            angle: setup.base_angle,
            targets: Vec::new(),
            ..setup.emitter
        });
        Combatant {
            name: setup.name,
            side,
            health: HealthBar::new(setup.max_health),
            emitter,
            control: setup.control,
            base_angle: setup.base_angle,
            phase: CombatPhase::Idle,
            hitbox: Aabb::from_radius_with(setup.anchor, setup.hit_extent, Rc::new(side)),
            hit_extent: setup.hit_extent,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.index()]
    }

    pub fn player(&self) -> &Combatant {
        self.combatant(Side::Player)
    }

    pub fn opponent(&self) -> &Combatant {
        self.combatant(Side::Opponent)
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// A fight took place and has fully resolved
    pub fn is_over(&self) -> bool {
        self.ceasefire && !self.engaged
    }

    /// Move a side's anchor (emitter and hit box follow)
    pub fn place(&mut self, side: Side, anchor: Vec2, particles: &mut ParticleManager<Side>) {
        let c = &mut self.combatants[side.index()];
        if c.is_dead() {
            return;
        }
        c.hitbox = Aabb::from_radius_with(anchor, c.hit_extent, Rc::new(side));
        if let Some(emitter) = particles.emitter_mut(c.emitter) {
            emitter.position = anchor;
        }
        if self.engaged {
            self.retarget(particles);
        }
    }

    /// Idle -> CombatActive for both sides. Arms the opponent. Returns false
    /// if a fight is already running or has already been fought.
    pub fn engage(&mut self, particles: &mut ParticleManager<Side>) -> bool {
        if self.engaged || self.ceasefire || self.combatants.iter().any(|c| c.is_dead()) {
            return false;
        }
        for c in &mut self.combatants {
            c.phase = CombatPhase::CombatActive;
        }
        self.engaged = true;
        self.retarget(particles);
        let opponent = self.combatants[Side::Opponent.index()].emitter;
        if let Some(emitter) = particles.emitter_mut(opponent) {
            emitter.active = true;
        }
        log::info!(
            "Combat started: {} vs {}",
            self.combatants[0].name,
            self.combatants[1].name
        );
        true
    }

    /// Point each living side's emitter at the other side's hit box
    fn retarget(&self, particles: &mut ParticleManager<Side>) {
        for c in &self.combatants {
            let other = &self.combatants[c.side.other().index()];
            if let Some(emitter) = particles.emitter_mut(c.emitter) {
                emitter.targets.clear();
                if !other.is_dead() {
                    emitter.targets.push(other.hitbox.clone());
                }
            }
        }
    }

    fn set_active(&self, side: Side, active: bool, particles: &mut ParticleManager<Side>) {
        if let Some(emitter) = particles.emitter_mut(self.combatants[side.index()].emitter) {
            emitter.active = active;
        }
    }

    /// One combat tick: aim, fire, resolve hits, then update phases
    pub fn step(
        &mut self,
        particles: &mut ParticleManager<Side>,
        input: &Input,
        step: f32,
        total: f32,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if !self.engaged {
            return events;
        }

        if !self.ceasefire {
            self.aim(particles, input, total);
        }

        let combatants = &mut self.combatants;
        particles.simulate_combat(step, total, |side: &Side, damage| {
            let target = &mut combatants[side.index()];
            if !target.is_dead() {
                target.health.damage(damage);
            }
        });

        // Fade first so a side that goes down this tick starts at full opacity
        for side in Side::ALL {
            let c = &mut self.combatants[side.index()];
            if let CombatPhase::Resolving { opacity } = c.phase {
                let opacity = opacity - self.config.fade_rate * step;
                if opacity <= 0.0 {
                    c.phase = CombatPhase::Dead;
                    log::info!("{} is dead", c.name);
                    events.push(CombatEvent::Dead(side));
                    self.set_active(side, false, particles);
                    self.retarget(particles);
                } else {
                    c.phase = CombatPhase::Resolving { opacity };
                }
            }
        }

        let downed: Vec<Side> = Side::ALL
            .into_iter()
            .filter(|s| {
                let c = &self.combatants[s.index()];
                c.phase == CombatPhase::CombatActive && c.health.is_dead()
            })
            .collect();
        if !downed.is_empty() {
            self.ceasefire = true;
            for side in Side::ALL {
                self.set_active(side, false, particles);
            }
            for side in downed {
                let c = &mut self.combatants[side.index()];
                c.phase = CombatPhase::Resolving { opacity: 1.0 };
                log::info!("{} is down", c.name);
                events.push(CombatEvent::Down(side));
            }
        }

        let fading = self
            .combatants
            .iter()
            .any(|c| matches!(c.phase, CombatPhase::Resolving { .. }));
        if self.ceasefire && !fading {
            for c in &mut self.combatants {
                if c.phase == CombatPhase::CombatActive {
                    c.phase = CombatPhase::Idle;
                }
            }
            self.engaged = false;
            events.push(CombatEvent::Over);
        }
        events
    }

    fn aim(&self, particles: &mut ParticleManager<Side>, input: &Input, total: f32) {
        let half = self.config.aim_half_angle;
        for c in &self.combatants {
            if c.phase != CombatPhase::CombatActive {
                continue;
            }
            let Some(emitter) = particles.emitter_mut(c.emitter) else {
                continue;
            };
            match c.control {
                Control::Pointer => {
                    if let Some(a) = aim_angle(emitter.position, emitter.speed, input.pointer.position) {
                        emitter.angle = clamp_aim(a, c.base_angle, half);
                    }
                    emitter.active = input.pointer.down || input.key_held(keys::FIRE);
                }
                Control::Scripted { frequency, phase } => {
                    let sweep = half * (total * frequency + phase).sin();
                    emitter.angle = clamp_aim(c.base_angle + sweep, c.base_angle, half);
                    emitter.active = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn setup(name: &str, anchor: Vec2, speed: Vec2, control: Control) -> CombatantSetup {
        CombatantSetup {
            name: name.to_string(),
            max_health: 20.0,
            anchor,
            hit_extent: Vec2::splat(5.0),
            base_angle: 0.0,
            control,
            emitter: EmitterConfig {
                speed,
                cooldown: 0.05,
                damage: 10.0,
                ..Default::default()
            },
        }
    }

    fn scripted() -> Control {
        Control::Scripted {
            frequency: 0.0,
            phase: 0.0,
        }
    }

    fn duel(player: Control) -> (Duel, ParticleManager<Side>) {
        let mut particles = ParticleManager::default();
        let duel = Duel::new(
            DuelConfig::default(),
            setup("sheep", Vec2::new(-20.0, 0.0), Vec2::new(100.0, 0.0), player),
            setup("robot", Vec2::new(20.0, 0.0), Vec2::new(-100.0, 0.0), scripted()),
            &mut particles,
        );
        (duel, particles)
    }

    #[test]
    fn test_clamp_aim_wraps() {
        assert!((clamp_aim(0.1, 0.0, FRAC_PI_4) - 0.1).abs() < 1e-6);
        // Straight behind normalizes to -π, so it clamps to the negative edge
        assert!((clamp_aim(PI, 0.0, FRAC_PI_4) + FRAC_PI_4).abs() < 1e-6);
        assert!((clamp_aim(-PI + 0.1, 0.0, FRAC_PI_4) + FRAC_PI_4).abs() < 1e-6);
        assert!((clamp_aim(PI - 0.1, 0.0, FRAC_PI_4) - FRAC_PI_4).abs() < 1e-6);
        // Just past ±π from a base of π stays near π, not at π - half
        let a = clamp_aim(-PI + 0.05, PI, FRAC_PI_4);
        assert!((a - (PI + 0.05)).abs() < 1e-5);
    }

    #[test]
    fn test_aim_angle_inverts_speed_rotation() {
        let a = aim_angle(Vec2::ZERO, Vec2::new(0.0, 1.0), Vec2::new(5.0, 0.0)).unwrap();
        assert!((a + FRAC_PI_2).abs() < 1e-6);
        assert!(aim_angle(Vec2::ONE, Vec2::X, Vec2::ONE).is_none());
    }

    #[test]
    fn test_engage_arms_opponent_only() {
        let (mut duel, mut particles) = duel(Control::Pointer);
        assert_eq!(duel.player().phase(), CombatPhase::Idle);
        assert!(duel.engage(&mut particles));
        assert!(!duel.engage(&mut particles));
        assert_eq!(duel.player().phase(), CombatPhase::CombatActive);
        assert_eq!(duel.opponent().phase(), CombatPhase::CombatActive);
        assert!(particles.emitter(duel.opponent().emitter).unwrap().active);
        assert!(!particles.emitter(duel.player().emitter).unwrap().active);
        let targets = &particles.emitter(duel.player().emitter).unwrap().targets;
        assert_eq!(targets.len(), 1);
        assert_eq!(*targets[0].data(), Side::Opponent);
    }

    #[test]
    fn test_pointer_controls_player_aim_and_trigger() {
        let (mut duel, mut particles) = duel(Control::Pointer);
        duel.engage(&mut particles);
        let mut input = Input::new();
        input.pointer.position = Vec2::new(-20.0, 10.0); // straight up from the anchor
        input.pointer.down = true;
        duel.step(&mut particles, &input, 0.01, 0.01);
        let emitter = particles.emitter(duel.player().emitter).unwrap();
        assert!(emitter.active);
        // Clamped to the half-angle
        assert!((emitter.angle - AIM_HALF_ANGLE).abs() < 1e-5);

        input.pointer.down = false;
        duel.step(&mut particles, &input, 0.01, 0.02);
        assert!(!particles.emitter(duel.player().emitter).unwrap().active);
    }

    #[test]
    fn test_scripted_sweep_stays_within_half_angle() {
        let mut particles = ParticleManager::default();
        let mut duel = Duel::new(
            DuelConfig::default(),
            setup("a", Vec2::new(-500.0, 0.0), Vec2::X, scripted()),
            setup(
                "b",
                Vec2::new(500.0, 0.0),
                Vec2::NEG_X,
                Control::Scripted {
                    frequency: 3.0,
                    phase: 0.5,
                },
            ),
            &mut particles,
        );
        duel.engage(&mut particles);
        let input = Input::new();
        let mut seen = Vec::new();
        for i in 1..200 {
            duel.step(&mut particles, &input, 0.01, i as f32 * 0.01);
            seen.push(particles.emitter(duel.opponent().emitter).unwrap().angle);
        }
        assert!(seen.iter().all(|a| a.abs() <= AIM_HALF_ANGLE + 1e-5));
        assert!(seen.iter().any(|a| *a > 0.5) && seen.iter().any(|a| *a < -0.5));
    }

    #[test]
    fn test_kill_resolves_then_dies() {
        let (mut duel, mut particles) = duel(scripted());
        duel.engage(&mut particles);
        // Only the opponent shoots
        duel.combatant_mut(Side::Player).control = Control::Pointer;
        let input = Input::new();

        let mut events = Vec::new();
        let mut t = 0.0;
        while !duel.player().is_dead() && t < 10.0 {
            t += 0.01;
            events.extend(duel.step(&mut particles, &input, 0.01, t));
        }
        assert!(duel.player().is_dead());
        assert_eq!(duel.opponent().phase(), CombatPhase::Idle);
        assert_eq!(
            events,
            vec![
                CombatEvent::Down(Side::Player),
                CombatEvent::Dead(Side::Player),
                CombatEvent::Over
            ]
        );
        assert!(duel.is_over());
        assert!(!duel.engage(&mut particles));
        // Emitters are off and nobody targets the dead side any more
        for c in duel.combatants() {
            assert!(!particles.emitter(c.emitter).unwrap().active);
        }
        assert!(particles.emitter(duel.opponent().emitter).unwrap().targets.is_empty());
    }

    #[test]
    fn test_resolving_opacity_decays_linearly() {
        let (mut duel, mut particles) = duel(scripted());
        duel.engage(&mut particles);
        duel.combatant_mut(Side::Opponent).health.damage(1000.0);
        let input = Input::new();
        duel.step(&mut particles, &input, 0.1, 0.1);
        assert_eq!(duel.opponent().phase(), CombatPhase::Resolving { opacity: 1.0 });
        duel.step(&mut particles, &input, 0.1, 0.2);
        let expected = 1.0 - FADE_RATE * 0.1;
        assert!((duel.opponent().opacity() - expected).abs() < 1e-6);
    }
}
