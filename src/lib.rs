//! Moon Lander - radial-gravity landing simulation core
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (gravity, scrolling, steering)
//! - `settings`: Session configuration loaded from JSON
//! - `units`: Meters <-> display unit conversion
//! - `error`: Typed configuration and simulation errors
//!
//! Rigid-body integration, rendering and input acquisition belong to the host
//! engine. This crate only computes what the host applies each frame.

pub mod error;
pub mod settings;
pub mod sim;
pub mod units;

pub use error::{ConfigError, SimError, SteeringError};
pub use settings::Settings;
pub use units::Units;

use glam::Vec2;

/// Physical constants and tuning defaults
pub mod consts {
    /// Fixed frame timestep used by the demo host (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Meters per kilometer
    pub const KM: f32 = 1000.0;

    /// Moon radius (km)
    pub const MOON_RADIUS_KM: f32 = 1737.0;
    /// Lunar surface gravity (m/s², negative = toward center)
    pub const MOON_SURFACE_GRAVITY: f32 = -1.62;

    /// Display units per meter
    pub const METERS_TO_DISPLAY: f32 = 1.5;

    /// Lander engine
    pub const LANDER_MAX_THRUST: f32 = 90_000.0; // N
    pub const LANDER_DEFAULT_THROTTLE: f32 = 0.5;

    /// Touch drag distance (display units) per radian of rotation
    pub const TOUCH_ROTATION_SCALAR: f32 = 125.0;

    /// Scenario impulse used by the orbit preset (N·s). Escapes the Moon
    /// at true scale; see `Scenario::orbit`.
    pub const ORBIT_IMPULSE: f32 = 1_920_000.0;
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

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
