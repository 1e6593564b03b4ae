//! Game state for one play session
//!
//! Everything the host loop used to keep in loose variables (walker position,
//! walking flag, facing, prompt fades, combat flag) lives here and is advanced
//! by one [`Simulate::simulate`] call per step.

use std::rc::Rc;

use glam::Vec2;

use super::aabb::Aabb;
use super::combat::{CombatEvent, CombatantSetup, Control, Duel, Side};
use super::input::{Input, KeyLatch, keys};
use super::particles::{EmitterConfig, ParticleManager};
use super::simulator::Simulate;
use crate::config::Settings;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// Something to read; the host shows its text
    Sign,
    /// Walking in and pressing Enter starts the duel
    Combat,
}

/// Payload of an interaction zone box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub label: String,
    pub kind: ZoneKind,
}

impl Zone {
    pub fn new(label: impl Into<String>, kind: ZoneKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// Host-facing notifications, drained with [`Session::drain_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Interacted { label: String },
    CombatStarted,
    CombatantDown(Side),
    CombatantDead(Side),
    CombatOver,
    /// The player's combatant is gone; further ticks do nothing
    SessionEnded,
}

pub struct Session {
    /// Copied in by the host before each frame
    pub input: Input,
    pub particles: ParticleManager<Side>,
    pub duel: Duel,
    settings: Settings,
    x: f32,
    walking: bool,
    facing: Facing,
    walk_origin: f32,
    /// Walker box at x = 0, feet on the floor line
    walker: Aabb,
    zones: Vec<Aabb<Zone>>,
    /// Interaction prompt opacity per zone
    prompts: Vec<f32>,
    enter: KeyLatch,
    events: Vec<SessionEvent>,
    ended: bool,
}

impl Session {
    /// Session with the default warehouse layout
    pub fn new(settings: &Settings) -> Self {
        let zones = default_zones(settings);
        Self::with_zones(settings, zones)
    }

    pub fn with_zones(settings: &Settings, zones: Vec<Aabb<Zone>>) -> Self {
        let walkway = &settings.walkway;
        let bounds = Aabb::from_diagonal(
            Vec2::new(walkway.min_x - PARTICLE_BOUNDS_MARGIN, -PARTICLE_BOUNDS_MARGIN),
            Vec2::new(walkway.max_x + PARTICLE_BOUNDS_MARGIN, PARTICLE_BOUNDS_MARGIN),
        );
        let mut particles = ParticleManager::with_seed(bounds, settings.seed);

        let emitter = |speed: f32| -> EmitterConfig<Side> {
            EmitterConfig {
                speed: Vec2::new(speed, 0.0),
                cooldown: settings.emitter.cooldown,
                max_age: settings.emitter.max_age,
                damage: settings.emitter.damage,
                spread: settings.emitter.spread,
                ..Default::default()
            }
        };
        let extent = Vec2::new(walkway.walker_width, walkway.walker_height) / 2.0;
        let combat = &settings.combat;
        let duel = Duel::new(
            combat.duel,
            CombatantSetup {
                name: "sheep".to_string(),
                max_health: combat.max_health,
                anchor: Vec2::new(walkway.start_x, -walkway.walker_height / 2.0),
                hit_extent: extent,
                base_angle: 0.0,
                control: Control::Pointer,
                emitter: emitter(settings.emitter.speed),
            },
            CombatantSetup {
                name: "guard".to_string(),
                max_health: combat.max_health,
                anchor: Vec2::new(combat.opponent_x, combat.opponent_y),
                hit_extent: extent,
                base_angle: 0.0,
                control: Control::Scripted {
                    frequency: combat.opponent_frequency,
                    phase: 0.0,
                },
                emitter: emitter(-settings.emitter.speed),
            },
            &mut particles,
        );

        let prompts = vec![0.0; zones.len()];
        Self {
            input: Input::new(),
            particles,
            duel,
            settings: settings.clone(),
            x: walkway.start_x,
            walking: false,
            facing: Facing::Right,
            walk_origin: walkway.start_x,
            walker: Aabb::from_dimensions(
                Vec2::new(-walkway.walker_width / 2.0, 0.0),
                Vec2::new(walkway.walker_width, -walkway.walker_height),
            ),
            zones,
            prompts,
            enter: KeyLatch::default(),
            events: Vec::new(),
            ended: false,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Walker box at its current position
    pub fn walker_box(&self) -> Aabb {
        self.walker.translated(Vec2::new(self.x, 0.0))
    }

    pub fn zones(&self) -> &[Aabb<Zone>] {
        &self.zones
    }

    /// Visible interaction prompts as (x, opacity)
    pub fn prompts(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.zones
            .iter()
            .zip(&self.prompts)
            .filter(|(_, opacity)| **opacity > 0.0)
            .map(|(zone, opacity)| (zone.middle().x, *opacity))
    }

    /// 1-based walk animation frame, advancing every few pixels walked
    pub fn walk_cycle_frame(&self) -> u32 {
        let walked = (self.x - self.walk_origin).abs();
        let frame = (walked / PX_PER_WALK_CYCLE * FRAMES_PER_WALK_CYCLE as f32).floor() as u32;
        frame % FRAMES_PER_WALK_CYCLE + 1
    }

    /// Walker x snapped to whole walk cycles so the sprite doesn't slide
    pub fn visual_x(&self) -> f32 {
        let delta = self.x - self.walk_origin;
        let cycles = (delta.abs() / PX_PER_WALK_CYCLE).floor();
        self.walk_origin + cycles * PX_PER_WALK_CYCLE * delta.signum()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn player_anchor(&self) -> Vec2 {
        Vec2::new(self.x, -self.settings.walkway.walker_height / 2.0)
    }

    fn interact(&mut self, step: f32) {
        let walker = self.walker_box();
        let fade = step / PROMPT_FADE_TIME;
        let mut selected = None;
        for (i, zone) in self.zones.iter().enumerate() {
            let opacity = &mut self.prompts[i];
            if zone.intersects(&walker) {
                selected = Some(i);
                *opacity = (*opacity + fade).min(1.0);
            } else {
                *opacity = (*opacity - fade).max(0.0);
            }
        }

        let pressed = self.enter.pressed(self.input.key_held(keys::ENTER));
        let Some(i) = selected.filter(|_| pressed) else {
            return;
        };
        let zone = Rc::clone(self.zones[i].data_rc());
        self.events.push(SessionEvent::Interacted {
            label: zone.label.clone(),
        });
        if zone.kind == ZoneKind::Combat {
            let anchor = self.player_anchor();
            self.duel.place(Side::Player, anchor, &mut self.particles);
            if self.duel.engage(&mut self.particles) {
                self.walking = false;
                self.events.push(SessionEvent::CombatStarted);
            }
        }
    }

    fn walk(&mut self, step: f32) {
        let left = self.input.key_held(keys::LEFT);
        let right = self.input.key_held(keys::RIGHT);
        if left == right {
            self.walking = false;
            return;
        }
        if !self.walking {
            self.walking = true;
            self.walk_origin = self.x;
        }
        let walkway = &self.settings.walkway;
        if left {
            self.x -= walkway.walk_speed * step;
            self.facing = Facing::Left;
        } else {
            self.x += walkway.walk_speed * step;
            self.facing = Facing::Right;
        }
        self.x = self.x.clamp(walkway.min_x, walkway.max_x);
    }

    fn fight(&mut self, step: f32, total: f32) {
        for event in self.duel.step(&mut self.particles, &self.input, step, total) {
            self.events.push(match event {
                CombatEvent::Down(side) => SessionEvent::CombatantDown(side),
                CombatEvent::Dead(side) => SessionEvent::CombatantDead(side),
                CombatEvent::Over => SessionEvent::CombatOver,
            });
            if event == CombatEvent::Dead(Side::Player) {
                log::info!("Player combatant is gone; session over");
                self.ended = true;
            }
        }
        if self.ended {
            self.events.push(SessionEvent::SessionEnded);
        }
    }
}

impl Simulate for Session {
    fn simulate(&mut self, step: f32, total: f32) {
        if self.ended {
            return;
        }
        if self.duel.is_engaged() {
            self.fight(step, total);
            return;
        }
        self.interact(step);
        if self.duel.is_engaged() {
            return;
        }
        self.walk(step);
        if !self.duel.player().is_dead() {
            let anchor = self.player_anchor();
            self.duel.place(Side::Player, anchor, &mut self.particles);
        }
        self.particles.simulate(step, total);
    }
}

/// Door at the far left, a warning sign, and the arena entrance
pub fn default_zones(settings: &Settings) -> Vec<Aabb<Zone>> {
    let walkway = &settings.walkway;
    let combat = &settings.combat;
    vec![
        Aabb::from_dimensions_with(
            Vec2::new(walkway.min_x - walkway.walker_width / 2.0, 0.0),
            Vec2::new(30.0, 0.0),
            Rc::new(Zone::new("start_door", ZoneKind::Sign)),
        ),
        Aabb::from_dimensions_with(
            Vec2::new(40.0, 0.0),
            Vec2::new(WARNING_SIGN_WIDTH, 0.0),
            Rc::new(Zone::new("warning_sign", ZoneKind::Sign)),
        ),
        Aabb::from_dimensions_with(
            Vec2::new(combat.zone_x, 0.0),
            Vec2::new(combat.zone_width, 0.0),
            Rc::new(Zone::new("arena", ZoneKind::Combat)),
        ),
    ]
}
