//! Session state owned across frames
//!
//! Everything here is built once from [`Settings`] and then mutated only by
//! [`tick`](super::tick::tick): the steering filter, the background tiles
//! and the last camera position.

use glam::Vec2;

use super::craft::{CraftSpec, CraftTelemetry};
use super::scenario::Scenario;
use super::scroll::ParallaxBackground;
use super::steering::{SteeringAdapter, build_adapter};
use super::world::World;
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::units::Units;

/// Frame-to-frame camera displacement
#[derive(Debug, Clone, Default)]
pub struct CameraTracker {
    last_position: Option<Vec2>,
}

impl CameraTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking from a known position
    pub fn at(position: Vec2) -> Self {
        Self {
            last_position: Some(position),
        }
    }

    /// Movement since the previous call (zero on the first call)
    pub fn displacement(&mut self, position: Vec2) -> Vec2 {
        let delta = self.peek_displacement(position);
        self.record(position);
        delta
    }

    /// Movement since the last recorded position, without recording this one
    pub fn peek_displacement(&self, position: Vec2) -> Vec2 {
        self.last_position
            .map(|last| position - last)
            .unwrap_or(Vec2::ZERO)
    }

    #[inline]
    pub fn record(&mut self, position: Vec2) {
        self.last_position = Some(position);
    }

    #[inline]
    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }
}

/// One simulation session (one level attempt)
#[derive(Debug)]
pub struct Session {
    pub world: World,
    pub units: Units,
    pub craft_spec: CraftSpec,
    pub scenario: Scenario,
    pub background: ParallaxBackground,
    pub camera: CameraTracker,
    pub(crate) steering: Box<dyn SteeringAdapter>,
    /// Frames stepped so far
    pub frame: u64,
}

impl Session {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        settings.craft.validate()?;
        let session = Self {
            world: settings.world()?,
            units: settings.units()?,
            craft_spec: settings.craft.clone(),
            scenario: settings.scenario()?,
            background: settings.background()?,
            camera: CameraTracker::new(),
            steering: build_adapter(&settings.steering)?,
            frame: 0,
        };
        log::info!(
            "Session ready: scenario '{}', world radius {} km, gravity {} m/s²",
            session.scenario.name,
            session.world.radius_km(),
            session.world.surface_gravity()
        );
        Ok(session)
    }

    /// Initial craft snapshot (display units) and the one-off impulse to
    /// apply to it
    pub fn start(&self) -> (CraftTelemetry, Vec2) {
        (
            self.scenario.initial_state(&self.world, &self.units),
            self.scenario.initial_impulse_vector(),
        )
    }

    pub fn steering(&self) -> &dyn SteeringAdapter {
        self.steering.as_ref()
    }

    /// Clear steering filter state (e.g. after recalibrating the gyro)
    pub fn reset_steering(&mut self) {
        log::debug!("Resetting {} steering", self.steering.name());
        self.steering.reset();
    }
}
