//! Warehouse Duel headless runner
//!
//! Drives a scripted play-through of the default layout at a simulated 60 Hz
//! display rate: walk to the arena, start the fight, aim at the guard and
//! hold fire until one side is gone. Optionally takes a settings JSON path.

use warehouse_duel::Settings;
use warehouse_duel::consts::SIM_DT;
use warehouse_duel::sim::{Session, SessionEvent, Side, Simulator, keys};

/// Display refresh the runner pretends to have
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Give up after this many frames (10 minutes)
const MAX_FRAMES: u32 = 60 * 600;

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings {
            simulator: warehouse_duel::sim::SimulatorConfig {
                step_time: Some(SIM_DT),
                ..Default::default()
            },
            ..Default::default()
        };
    };
    match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{path}: {e}; using defaults");
            Settings::default()
        }
    }
}

/// Scripted "player": walk right until the arena, then fight
fn drive(session: &mut Session) {
    let engaged = session.duel.is_engaged();
    let over = session.duel.is_over();
    let target = session.duel.opponent().hitbox().middle();
    let arena = session
        .zones()
        .iter()
        .find(|z| z.data().label == "arena")
        .map(|z| z.middle().x)
        .unwrap_or(f32::MAX);
    let x = session.x();

    let input = &mut session.input;
    if engaged {
        input.release(keys::RIGHT).release(keys::ENTER);
        input.pointer.position = target;
        input.pointer.down = true;
    } else if over {
        input.release_all();
    } else if x < arena {
        input.press(keys::RIGHT);
    } else {
        input.release(keys::RIGHT);
        // Alternate so the Enter latch sees a fresh press
        if input.key_held(keys::ENTER) {
            input.release(keys::ENTER);
        } else {
            input.press(keys::ENTER);
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Warehouse Duel (headless) starting...");

    let settings = load_settings();
    let mut simulator = Simulator::new(settings.simulator);
    simulator.register(Session::new(&settings));

    let mut now = 0.0;
    let mut finished = false;
    for frame in 0..MAX_FRAMES {
        if let Some(session) = simulator.simulations_mut().first_mut() {
            drive(session);
        }
        simulator.simulate(now);
        now += FRAME_TIME;

        let Some(session) = simulator.simulations_mut().first_mut() else {
            break;
        };
        for event in session.drain_events() {
            log::info!("[frame {frame}] {event:?}");
            if matches!(event, SessionEvent::SessionEnded | SessionEvent::CombatOver) {
                finished = true;
            }
        }
        if finished {
            break;
        }
    }

    if let Some(session) = simulator.simulations().first() {
        for side in Side::ALL {
            let c = session.duel.combatant(side);
            println!(
                "{:>6}: health {:>5.1}/{:<5.1} phase {:?}",
                c.name,
                c.health.current(),
                c.health.max(),
                c.phase()
            );
        }
        println!(
            "simulated {:.2}s in {} steps, {} particles live",
            simulator.simulated_time(),
            simulator.steps(),
            session.particles.len()
        );
    }
}
