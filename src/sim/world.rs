//! Celestial body model: radial gravity and orbital telemetry
//!
//! Gravity has uniform magnitude and always points at the world center,
//! regardless of altitude. This is deliberately not inverse-square: the
//! game only ever flies within a few hundred kilometers of the surface.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MOON_RADIUS_KM, MOON_SURFACE_GRAVITY};
use crate::error::{ConfigError, SimError};
use crate::units::km_to_meters;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// A celestial body. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Radius (km)
    radius_km: f32,
    /// Surface gravity (m/s², negative = attraction)
    surface_gravity: f32,
}

/// Orbital state derived from the craft's position and velocity (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Height above the surface (m)
    pub altitude: f32,
    /// Distance from the world center (m)
    pub radial_distance: f32,
    /// Angle around the world, counterclockwise from +x (radians, [-π, π])
    pub orbital_angle: f32,
    /// Magnitude of velocity (m/s)
    pub speed: f32,
    /// Velocity along local up (m/s, positive = climbing)
    pub vertical_speed: f32,
    /// Velocity along the counterclockwise tangent (m/s)
    pub horizontal_speed: f32,
}

/// Where the ground segment under the craft belongs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAnchor {
    /// Surface point directly beneath the craft (m)
    pub point: Vec2,
    /// Ground rotation so its top faces away from the center (radians)
    pub rotation: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::moon()
    }
}

impl World {
    pub fn new(radius_km: f32, surface_gravity: f32) -> Result<Self, ConfigError> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(radius_km));
        }
        if !surface_gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity(surface_gravity));
        }
        Ok(Self {
            radius_km,
            surface_gravity,
        })
    }

    /// The Moon at true scale
    pub fn moon() -> Self {
        Self {
            radius_km: MOON_RADIUS_KM,
            surface_gravity: MOON_SURFACE_GRAVITY,
        }
    }

    #[inline]
    pub fn radius_km(&self) -> f32 {
        self.radius_km
    }

    #[inline]
    pub fn radius_m(&self) -> f32 {
        km_to_meters(self.radius_km)
    }

    #[inline]
    pub fn surface_gravity(&self) -> f32 {
        self.surface_gravity
    }

    /// Gravity vector (m/s²) at `position` (m, relative to the world center).
    ///
    /// The craft must never sit exactly at the center: the direction is
    /// undefined there and the call fails with [`SimError::AtWorldCenter`].
    pub fn gravity_at(&self, position: Vec2) -> Result<Vec2, SimError> {
        let (_, theta) = checked_polar(position)?;
        Ok(polar_to_cartesian(self.surface_gravity, theta))
    }

    /// Altitude, radial distance, orbital angle and speeds.
    pub fn telemetry(&self, position: Vec2, velocity: Vec2) -> Result<Telemetry, SimError> {
        let (radial_distance, theta) = checked_polar(position)?;
        check_finite("velocity", velocity)?;

        let up = Vec2::new(theta.cos(), theta.sin());
        let tangent = up.perp();

        Ok(Telemetry {
            altitude: radial_distance - self.radius_m(),
            radial_distance,
            orbital_angle: theta,
            speed: velocity.length(),
            vertical_speed: velocity.dot(up),
            horizontal_speed: velocity.dot(tangent),
        })
    }

    /// Surface point beneath `position` and the ground rotation there.
    pub fn surface_anchor(&self, position: Vec2) -> Result<SurfaceAnchor, SimError> {
        let (_, theta) = checked_polar(position)?;
        Ok(SurfaceAnchor {
            point: polar_to_cartesian(self.radius_m(), theta),
            rotation: theta - FRAC_PI_2,
        })
    }

    /// Camera roll that keeps the local horizon level at `position`.
    pub fn local_up_rotation(&self, position: Vec2) -> Result<f32, SimError> {
        let (_, theta) = checked_polar(position)?;
        Ok(theta - FRAC_PI_2)
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alt {:.1} m, r {:.1} m, θ {:+.4} rad, v {:.2} m/s (vert {:+.2}, horiz {:+.2})",
            self.altitude,
            self.radial_distance,
            self.orbital_angle,
            self.speed,
            self.vertical_speed,
            self.horizontal_speed
        )
    }
}

pub(crate) fn check_finite(quantity: &'static str, v: Vec2) -> Result<(), SimError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonFinite {
            quantity,
            x: v.x,
            y: v.y,
        })
    }
}

fn checked_polar(position: Vec2) -> Result<(f32, f32), SimError> {
    check_finite("position", position)?;
    if position == Vec2::ZERO {
        return Err(SimError::AtWorldCenter);
    }
    Ok(cartesian_to_polar(position))
}
