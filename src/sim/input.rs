//! Input snapshot consumed by the simulation
//!
//! The host captures keyboard/pointer events however it likes and copies the
//! result in here before each frame. The simulation only ever asks "is this
//! key held" and "where is the pointer / is it down".

use std::collections::HashSet;

use glam::Vec2;

/// Key names, matching the DOM `KeyboardEvent.key` values hosts usually have
pub mod keys {
    pub const LEFT: &str = "ArrowLeft";
    pub const RIGHT: &str = "ArrowRight";
    pub const ENTER: &str = "Enter";
    pub const FIRE: &str = " ";
}

/// Single pointer (mouse or primary touch)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    /// World-space position (the host maps screen coordinates through its camera)
    pub position: Vec2,
    pub down: bool,
}

/// Held keys plus pointer state for one frame
#[derive(Debug, Clone, Default)]
pub struct Input {
    keys: HashSet<String>,
    pub pointer: Pointer,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_held(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn press(&mut self, key: impl Into<String>) -> &mut Self {
        self.keys.insert(key.into());
        self
    }

    pub fn release(&mut self, key: &str) -> &mut Self {
        self.keys.remove(key);
        self
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
        self.pointer.down = false;
    }
}

/// Turns a held key into a single "pressed" edge
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLatch {
    was_held: bool,
}

impl KeyLatch {
    /// True only on the first tick the key is seen held
    pub fn pressed(&mut self, held: bool) -> bool {
        let edge = held && !self.was_held;
        self.was_held = held;
        edge
    }
}
