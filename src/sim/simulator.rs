//! Real-time to simulation-time accumulator
//!
//! The host calls [`Simulator::simulate`] once per rendered frame with the
//! current wall-clock time. The simulator converts the elapsed real time into
//! zero or more steps and runs every registered collaborator once per step,
//! in registration order.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_ELAPSED_TIME;

/// Slack used when comparing accumulated times, so 0.1 + 0.1 + 0.1 still
/// counts as three steps of 0.1
const TIME_EPSILON: f64 = 1e-9;

/// Anything that advances with simulation time
pub trait Simulate {
    /// Advance by `step` seconds; `total` is the simulated time after this step
    fn simulate(&mut self, step: f32, total: f32);
}

impl<S: Simulate + ?Sized> Simulate for Box<S> {
    fn simulate(&mut self, step: f32, total: f32) {
        (**self).simulate(step, total);
    }
}

impl<S: Simulate + ?Sized> Simulate for &mut S {
    fn simulate(&mut self, step: f32, total: f32) {
        (**self).simulate(step, total);
    }
}

/// Simulator timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Real-time gaps longer than this (seconds) are dropped, not simulated
    pub max_elapsed: f64,
    /// Fixed step in seconds; `None` steps by the real elapsed time
    pub step_time: Option<f64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_elapsed: MAX_ELAPSED_TIME,
            step_time: None,
        }
    }
}

/// Fixed/variable step driver for an ordered list of collaborators
pub struct Simulator<S> {
    config: SimulatorConfig,
    simulations: Vec<S>,
    /// Real time accepted so far (seconds)
    total_time: f64,
    /// Simulated time so far (seconds), never ahead of `total_time`
    simulated_time: f64,
    last_time: Option<f64>,
    steps: u64,
    epoch: Instant,
}

impl<S: Simulate> Simulator<S> {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            simulations: Vec::new(),
            total_time: 0.0,
            simulated_time: 0.0,
            last_time: None,
            steps: 0,
            epoch: Instant::now(),
        }
    }

    /// Append a collaborator; it runs after every one registered before it
    pub fn register(&mut self, simulation: S) -> &mut Self {
        self.simulations.push(simulation);
        self
    }

    pub fn simulations(&self) -> &[S] {
        &self.simulations
    }

    pub fn simulations_mut(&mut self) -> &mut [S] {
        &mut self.simulations
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Simulated seconds so far
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Steps run since construction
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance using the wall clock (seconds since this simulator was built)
    pub fn simulate_now(&mut self) -> u32 {
        let now = self.epoch.elapsed().as_secs_f64();
        self.simulate(now)
    }

    /// Advance to real time `now` (seconds, monotonic). Returns the number of
    /// steps run. The first call only establishes the time base.
    pub fn simulate(&mut self, now: f64) -> u32 {
        let Some(last) = self.last_time.replace(now) else {
            return 0;
        };
        let elapsed = now - last;

        if elapsed > self.config.max_elapsed {
            log::debug!(
                "Dropping {:.3}s real-time gap (ceiling {:.3}s)",
                elapsed,
                self.config.max_elapsed
            );
            return 0;
        }
        if elapsed <= 0.0 {
            return 0;
        }

        self.total_time += elapsed;
        let step = match self.config.step_time {
            Some(step) if step > 0.0 => step,
            _ => elapsed,
        };

        let mut count = 0;
        while self.simulated_time + step <= self.total_time + TIME_EPSILON {
            self.simulated_time += step;
            self.steps += 1;
            count += 1;
            let total = self.simulated_time as f32;
            for simulation in &mut self.simulations {
                simulation.simulate(step as f32, total);
            }
        }
        count
    }
}

impl<S: Simulate> Default for Simulator<S> {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}
