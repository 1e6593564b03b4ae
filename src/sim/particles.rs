//! Emitters ("propellers") and the particles they fire
//!
//! The manager owns both collections. Particles refer back to their emitter
//! by [`EmitterId`], which is how they look up `max_age`, `damage` and the
//! target set during a step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::aabb::Aabb;
use super::simulator::Simulate;
use super::vector::rotated;
use crate::consts::*;

/// Slack on the cooldown gate; tick times summed in f32 land a few ulps short
const COOLDOWN_EPSILON: f32 = 1e-4;

/// Index of an emitter inside its [`ParticleManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterId(usize);

impl EmitterId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A live particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds since spawn
    pub age: f32,
    pub emitter: EmitterId,
}

/// Everything needed to build an [`Emitter`]
///
/// `offset`, `source` and `speed` are expressed in the emitter's unrotated
/// local frame and rotated by `angle` when used.
#[derive(Debug, Clone)]
pub struct EmitterConfig<T> {
    /// Anchor position in world space
    pub position: Vec2,
    /// Top-left of the emitter sprite relative to the anchor (render hint)
    pub offset: Vec2,
    pub angle: f32,
    /// Spawn point relative to the anchor
    pub source: Vec2,
    /// Particle velocity at angle 0
    pub speed: Vec2,
    /// Random aim jitter per shot, radians either side (0 = none)
    pub spread: f32,
    pub max_age: f32,
    pub cooldown: f32,
    /// Fire on every tick while active
    pub auto_fire: bool,
    pub damage: f32,
    pub targets: Vec<Aabb<T>>,
}

impl<T> Default for EmitterConfig<T> {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            angle: 0.0,
            source: Vec2::ZERO,
            speed: Vec2::Y,
            spread: 0.0,
            max_age: DEFAULT_MAX_AGE,
            cooldown: DEFAULT_COOLDOWN,
            auto_fire: true,
            damage: DEFAULT_DAMAGE,
            targets: Vec::new(),
        }
    }
}

/// Periodic particle source attached to a moving anchor
#[derive(Debug, Clone)]
pub struct Emitter<T> {
    pub position: Vec2,
    pub offset: Vec2,
    pub angle: f32,
    pub source: Vec2,
    pub speed: Vec2,
    pub spread: f32,
    pub max_age: f32,
    pub cooldown: f32,
    pub auto_fire: bool,
    pub damage: f32,
    pub targets: Vec<Aabb<T>>,
    /// Driven by the host every tick; inactive emitters never auto-fire
    pub active: bool,
    last_fire: Option<f32>,
}

impl<T> Emitter<T> {
    fn from_config(config: EmitterConfig<T>) -> Self {
        Self {
            position: config.position,
            offset: config.offset,
            angle: config.angle,
            source: config.source,
            speed: config.speed,
            spread: config.spread,
            max_age: config.max_age,
            cooldown: config.cooldown,
            auto_fire: config.auto_fire,
            damage: config.damage,
            targets: config.targets,
            active: false,
            last_fire: None,
        }
    }

    /// Whether a shot at `time` would pass the cooldown gate
    pub fn ready(&self, time: f32) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => time - last + COOLDOWN_EPSILON >= self.cooldown,
        }
    }

    pub fn last_fire(&self) -> Option<f32> {
        self.last_fire
    }

    /// World-space point particles currently spawn from
    pub fn muzzle(&self) -> Vec2 {
        self.position + rotated(self.source, self.angle)
    }

    fn spawn(&mut self, id: EmitterId, time: f32, jitter: f32) -> Particle {
        let angle = self.angle + jitter;
        self.last_fire = Some(time);
        Particle {
            position: self.position + rotated(self.source, angle),
            velocity: rotated(self.speed, angle),
            age: 0.0,
            emitter: id,
        }
    }
}

/// Screen mapping used by [`ParticleManager::draw`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Canvas size in pixels
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    /// Added after scaling
    pub offset: Vec2,
    /// Pixels around the canvas that still count as visible
    pub margin: f32,
    /// Length of the trailing streak in seconds of travel (0 = dot)
    pub streak: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            scale: 1.0,
            offset: Vec2::ZERO,
            margin: DRAW_MARGIN,
            streak: 0.0,
        }
    }
}

impl Camera {
    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    /// Inverse of [`Camera::to_screen`]; a zero scale maps everything to the origin
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        if self.scale == 0.0 {
            return Vec2::ZERO;
        }
        (screen - self.offset) / self.scale
    }

    /// Canvas bounds grown by the margin
    pub fn visible_region(&self) -> Aabb {
        Aabb::from_dimensions(Vec2::ZERO, Vec2::new(self.width, self.height)).expanded(self.margin)
    }
}

/// Rendering collaborator fed by [`ParticleManager::draw`]
pub trait ParticleSink {
    /// `head` is the particle, `tail` the end of its streak (equal when no
    /// streak), both in screen pixels
    fn draw_particle(&mut self, head: Vec2, tail: Vec2, size: f32);
}

impl<F: FnMut(Vec2, Vec2, f32)> ParticleSink for F {
    fn draw_particle(&mut self, head: Vec2, tail: Vec2, size: f32) {
        self(head, tail, size)
    }
}

/// Owns emitters and live particles; culls and resolves hits each step
#[derive(Debug, Clone)]
pub struct ParticleManager<T = ()> {
    /// Particles leaving this box are removed
    pub bounds: Aabb,
    emitters: Vec<Emitter<T>>,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl<T> Default for ParticleManager<T> {
    fn default() -> Self {
        Self::new(Aabb::universe())
    }
}

impl<T> ParticleManager<T> {
    pub fn new(bounds: Aabb) -> Self {
        Self::with_seed(bounds, 0)
    }

    /// Seed only matters for emitters with a non-zero spread
    pub fn with_seed(bounds: Aabb, seed: u64) -> Self {
        Self {
            bounds,
            emitters: Vec::new(),
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn create_emitter(&mut self, config: EmitterConfig<T>) -> EmitterId {
        let id = EmitterId(self.emitters.len());
        log::debug!(
            "Emitter {} created (cooldown {:.3}s, max age {:.1}s)",
            id.0,
            config.cooldown,
            config.max_age
        );
        self.emitters.push(Emitter::from_config(config));
        id
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter<T>> {
        self.emitters.get(id.0)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter<T>> {
        self.emitters.get_mut(id.0)
    }

    pub fn emitters(&self) -> impl Iterator<Item = (EmitterId, &Emitter<T>)> {
        self.emitters.iter().enumerate().map(|(i, e)| (EmitterId(i), e))
    }

    pub fn add_particle(&mut self, particle: Particle) -> &mut Self {
        self.particles.push(particle);
        self
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every live particle (emitters are kept)
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Fire `id` at `time` if its cooldown allows. Returns whether a particle
    /// was spawned.
    pub fn attempt_fire(&mut self, id: EmitterId, time: f32) -> bool {
        let Some(emitter) = self.emitters.get_mut(id.0) else {
            return false;
        };
        if !emitter.ready(time) {
            return false;
        }
        let jitter = if emitter.spread > 0.0 {
            self.rng.random_range(-emitter.spread..=emitter.spread)
        } else {
            0.0
        };
        let particle = emitter.spawn(id, time, jitter);
        self.particles.push(particle);
        true
    }

    /// Step with target-hit resolution. `on_hit` receives the payload of the
    /// box that was hit and the firing emitter's damage; the particle is
    /// removed after its first hit.
    pub fn simulate_combat<F>(&mut self, step: f32, total: f32, on_hit: F)
    where
        F: FnMut(&T, f32),
    {
        self.advance(step, total, Some(on_hit));
    }

    /// Hand every particle overlapping the camera's visible region to `sink`.
    /// Returns how many were drawn.
    pub fn draw(&self, camera: &Camera, sink: &mut impl ParticleSink) -> usize {
        let visible = camera.visible_region();
        let size = PARTICLE_SIZE * camera.scale;
        let mut drawn = 0;
        for particle in &self.particles {
            let head = camera.to_screen(particle.position);
            let tail = if camera.streak > 0.0 {
                camera.to_screen(particle.position - particle.velocity * camera.streak)
            } else {
                head
            };
            let shape: Aabb = Aabb::from_diagonal(head, tail).expanded(size / 2.0);
            if visible.intersects(&shape) {
                sink.draw_particle(head, tail, size);
                drawn += 1;
            }
        }
        drawn
    }

    fn fire_emitters(&mut self, total: f32) {
        for i in 0..self.emitters.len() {
            let emitter = &self.emitters[i];
            if emitter.active && emitter.auto_fire {
                self.attempt_fire(EmitterId(i), total);
            }
        }
    }

    fn advance<F>(&mut self, step: f32, total: f32, mut on_hit: Option<F>)
    where
        F: FnMut(&T, f32),
    {
        debug_assert!(step >= 0.0, "negative step {step}");

        // Emitters first so this tick's shots use this tick's aim
        self.fire_emitters(total);

        let emitters = &self.emitters;
        let bounds = &self.bounds;
        self.particles.retain_mut(|p| {
            p.position += p.velocity * step;
            p.age += step;

            let Some(emitter) = emitters.get(p.emitter.0) else {
                return false;
            };
            if p.age > emitter.max_age || !bounds.contains(p.position) {
                return false;
            }

            if let Some(on_hit) = on_hit.as_mut() {
                let here: Aabb = Aabb::point(p.position);
                if let Some(target) = emitter.targets.iter().find(|t| t.intersects(&here)) {
                    log::trace!("Particle hit target for {:.1}", emitter.damage);
                    on_hit(target.data(), emitter.damage);
                    return false;
                }
            }
            true
        });
    }
}

impl<T> Simulate for ParticleManager<T> {
    /// Plain step: motion, ageing and culling, no hit tests
    fn simulate(&mut self, step: f32, total: f32) {
        self.advance(step, total, None::<fn(&T, f32)>);
    }
}
