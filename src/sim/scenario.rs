//! Named starting conditions
//!
//! A scenario places the craft above the surface and optionally gives it a
//! one-off impulse so it starts in orbit rather than falling straight down.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::craft::CraftTelemetry;
use super::world::World;
use crate::consts::{LANDER_DEFAULT_THROTTLE, ORBIT_IMPULSE};
use crate::error::ConfigError;
use crate::units::{Units, km_to_meters};

/// Initial condition for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Height above the surface (km)
    pub altitude_km: f32,
    /// Craft orientation at start (radians)
    pub initial_rotation: f32,
    /// Momentum applied once along +x at start (N·s)
    pub initial_impulse: f32,
}

impl Scenario {
    /// 400 km up, craft lying on its side, with a large sideways impulse.
    ///
    /// The impulse is a gameplay tuning value, not derived from the default
    /// lander mass: on the 142.79 kg lander it gives about 13.4 km/s, well
    /// past lunar escape speed (about 2.4 km/s), so at true scale the craft
    /// leaves instead of orbiting. Use
    /// [`Scenario::with_impulse`] (or `initial_impulse_override` in settings)
    /// to fly a bound orbit.
    pub fn orbit() -> Self {
        Self {
            name: "orbit".to_string(),
            altitude_km: 400.0,
            initial_rotation: FRAC_PI_2,
            initial_impulse: ORBIT_IMPULSE,
        }
    }

    /// 350 m above the surface, upright, at rest
    pub fn hover() -> Self {
        Self {
            name: "hover".to_string(),
            altitude_km: 0.35,
            initial_rotation: 0.0,
            initial_impulse: 0.0,
        }
    }

    pub fn catalog() -> Vec<Scenario> {
        vec![Self::orbit(), Self::hover()]
    }

    pub fn by_name(name: &str) -> Result<Scenario, ConfigError> {
        Self::catalog()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownScenario(name.to_string()))
    }

    /// Replace the impulse (the launch screen lets the player tune it)
    pub fn with_impulse(mut self, impulse: f32) -> Self {
        self.initial_impulse = impulse;
        self
    }

    /// Craft at rest on the +y axis, `altitude_km` above the surface.
    /// Position is in display units.
    pub fn initial_state(&self, world: &World, units: &Units) -> CraftTelemetry {
        let r = world.radius_m() + km_to_meters(self.altitude_km);
        CraftTelemetry {
            position: units.to_display(Vec2::new(0.0, r)),
            velocity: Vec2::ZERO,
            orientation: self.initial_rotation,
            angular_velocity: 0.0,
            throttle: LANDER_DEFAULT_THROTTLE,
            engine_on: false,
        }
    }

    /// Speed the starting impulse gives a craft of `mass` kg (m/s)
    pub fn initial_speed(&self, mass: f32) -> f32 {
        self.initial_impulse / mass
    }

    /// Impulse to apply once, along the fixed +x axis
    pub fn initial_impulse_vector(&self) -> Vec2 {
        Vec2::new(self.initial_impulse, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(Scenario::by_name("orbit").unwrap(), Scenario::orbit());
        assert_eq!(Scenario::by_name("HOVER").unwrap().altitude_km, 0.35);
        assert!(matches!(
            Scenario::by_name("mars"),
            Err(ConfigError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_initial_state_altitude() {
        let world = World::new(100.0, -1.62).unwrap();
        let units = Units::new(2.0).unwrap();
        let craft = Scenario::orbit().initial_state(&world, &units);
        // (100 km + 400 km) * 2 display units per meter
        assert_eq!(craft.position, Vec2::new(0.0, 1_000_000.0));
        assert_eq!(craft.orientation, FRAC_PI_2);
        assert!(!craft.engine_on);
    }

    #[test]
    fn test_orbit_impulse_exceeds_escape_speed() {
        use crate::sim::craft::CraftSpec;

        let world = World::moon();
        let mass = CraftSpec::moon_lander().total_mass();
        let speed = Scenario::orbit().initial_speed(mass);
        assert!((speed - 13_446.0).abs() < 5.0, "{speed}");

        let r = world.radius_m() + km_to_meters(400.0);
        let escape = (2.0 * world.surface_gravity().abs() * world.radius_m()).sqrt();
        let circular = (world.surface_gravity().abs() * r).sqrt();
        assert!(speed > escape);

        // The documented override flies a bound orbit
        let bound = Scenario::orbit().with_impulse(circular * mass);
        assert!(bound.initial_speed(mass) < escape);
    }

    #[test]
    fn test_impulse_along_x() {
        assert_eq!(
            Scenario::orbit().initial_impulse_vector(),
            Vec2::new(ORBIT_IMPULSE, 0.0)
        );
        assert_eq!(Scenario::hover().initial_impulse_vector(), Vec2::ZERO);
        assert_eq!(
            Scenario::hover().with_impulse(5.0).initial_impulse_vector(),
            Vec2::new(5.0, 0.0)
        );
    }
}
