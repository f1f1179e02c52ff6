//! Moon Lander headless demo
//!
//! Stands in for the host engine: integrates a point-mass craft under the
//! gravity and thrust the simulation core hands back, feeds the steering
//! adapter seeded sensor noise, and logs the HUD readout once a second.
//!
//! Usage: `moon-lander [settings.json] [--seed N]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use moon_lander::consts::FRAME_DT;
use moon_lander::normalize_angle;
use moon_lander::sim::{FrameInput, InputSample, SampleKind, Session, tick};
use moon_lander::{ConfigError, Settings, SimError};

/// Ten minutes of frames
const MAX_FRAMES: u64 = 60 * 60 * 10;
/// Touchdown faster than this breaks the legs (m/s)
const SAFE_TOUCHDOWN_SPEED: f32 = 5.0;
const DEFAULT_SEED: u64 = 42;

/// Demo command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "moon-lander", about = "Headless Moon Lander flight")]
struct Cli {
    /// Settings file (JSON). Without one, defaults fly the hover scenario.
    settings: Option<PathBuf>,

    /// Seed for the simulated sensor noise.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

impl Cli {
    fn settings(&self) -> Result<Settings, ConfigError> {
        match &self.settings {
            Some(path) => Settings::load(path),
            None => {
                log::info!("No settings file given, using defaults with the hover scenario");
                let mut settings = Settings::default();
                settings.scenario.name = "hover".to_string();
                Ok(settings)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sim(#[from] SimError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Landed { speed: f32, frame: u64 },
    Crashed { speed: f32, frame: u64 },
    TimedOut,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::init();
    log::info!("Moon Lander (headless) starting...");

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&settings, cli.seed) {
        Ok(Outcome::Landed { speed, frame }) => {
            println!("Landed at {speed:.2} m/s after {frame} frames");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Crashed { speed, frame }) => {
            println!("Crashed at {speed:.2} m/s after {frame} frames");
            ExitCode::SUCCESS
        }
        Ok(Outcome::TimedOut) => {
            println!("Still flying after {MAX_FRAMES} frames");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Fly one session until touchdown or timeout
fn run(settings: &Settings, seed: u64) -> Result<Outcome, DemoError> {
    let mut session = Session::new(settings)?;
    let mass = session.craft_spec.total_mass();
    let max_thrust = session.craft_spec.max_thrust;
    let mut rng = Pcg32::seed_from_u64(seed);

    let (mut craft, impulse) = session.start();
    craft.velocity += session.units.to_display(impulse / mass);

    // Integrate in f64 meters: at lunar distances an f32 display position
    // cannot resolve a slow final descent.
    let scale = f64::from(session.units.scale());
    let mut position_m = craft.position.as_dvec2() / scale;
    let mut velocity_m = craft.velocity.as_dvec2() / scale;

    for _ in 0..MAX_FRAMES {
        let sample = sensor_sample(session.steering().accepts(), &mut rng, session.frame);
        let input = FrameInput {
            craft,
            camera_position: craft.position,
            sample: Some(sample),
        };
        let out = tick(&mut session, &input)?;

        if session.frame % 60 == 1 {
            for line in out.hud_lines(&craft) {
                log::info!("{line}");
            }
        }

        let telemetry = out.telemetry;
        if telemetry.altitude <= 0.0 {
            let frame = session.frame;
            return Ok(if telemetry.speed <= SAFE_TOUCHDOWN_SPEED {
                Outcome::Landed {
                    speed: telemetry.speed,
                    frame,
                }
            } else {
                Outcome::Crashed {
                    speed: telemetry.speed,
                    frame,
                }
            });
        }

        // Host physics: semi-implicit Euler on a point mass
        let accel = (out.gravity + out.thrust / mass).as_dvec2();
        velocity_m += accel * f64::from(FRAME_DT);
        position_m += velocity_m * f64::from(FRAME_DT);
        craft.position = (position_m * scale).as_vec2();
        craft.velocity = (velocity_m * scale).as_vec2();
        craft.orientation = normalize_angle(craft.orientation + out.rotation_delta);

        // Autopilot: hold a descent rate that shrinks with altitude
        let target_rate = -(telemetry.altitude / 20.0).clamp(1.5, 50.0);
        let wanted = session.world.surface_gravity().abs() + (target_rate - telemetry.vertical_speed);
        craft.set_throttle(wanted * mass / max_thrust)?;
        craft.engine_on = craft.throttle > 0.0;
    }

    Ok(Outcome::TimedOut)
}

/// Noise standing in for a real sensor or finger
fn sensor_sample(kind: SampleKind, rng: &mut Pcg32, frame: u64) -> InputSample {
    match kind {
        SampleKind::Yaw => InputSample::Yaw(rng.random_range(-0.05..0.05)),
        SampleKind::Rate => InputSample::Rate {
            rate: rng.random_range(-0.02..0.02),
            timestamp: frame as f64 * f64::from(FRAME_DT),
        },
        SampleKind::TouchDelta => InputSample::TouchDelta {
            dx: 0.0,
            dy: rng.random_range(-0.005..0.005),
        },
    }
}
