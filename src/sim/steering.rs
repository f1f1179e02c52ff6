//! Steering input adapters
//!
//! Turns one frame's raw input sample into a rotation delta (radians) that
//! the host adds to the craft's orientation. The game never needs to know
//! whether the player is tilting the device or dragging a finger: it picks
//! an adapter at configuration time and feeds it samples.
//!
//! Samples are a tagged union. Handing an adapter a sample it does not
//! consume is an integration bug and fails loudly instead of steering by 0.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SteeringError};
use crate::settings::SteeringSettings;

/// Discriminant of [`InputSample`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    Yaw,
    Rate,
    TouchDelta,
}

/// One frame of raw steering input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputSample {
    /// Device yaw (radians, or rad/s when the host feeds a yaw rate)
    Yaw(f32),
    /// Gyroscope z rotation rate (rad/s) with its sensor timestamp (s)
    Rate { rate: f32, timestamp: f64 },
    /// Touch movement since the previous move, normalized to the touch zone
    /// (1.0 = full zone width/height)
    TouchDelta { dx: f32, dy: f32 },
}

impl InputSample {
    pub fn kind(&self) -> SampleKind {
        match self {
            InputSample::Yaw(_) => SampleKind::Yaw,
            InputSample::Rate { .. } => SampleKind::Rate,
            InputSample::TouchDelta { .. } => SampleKind::TouchDelta,
        }
    }
}

/// Which adapter a session steers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteeringMode {
    Yaw,
    #[default]
    Rate,
    Touch,
}

impl SteeringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SteeringMode::Yaw => "yaw",
            SteeringMode::Rate => "rate",
            SteeringMode::Touch => "touch",
        }
    }
}

impl fmt::Display for SteeringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts input samples into rotation deltas
pub trait SteeringAdapter: fmt::Debug {
    fn name(&self) -> &'static str;

    /// The one sample kind this adapter consumes
    fn accepts(&self) -> SampleKind;

    /// Rotation delta (radians) for this frame's sample
    fn handle(&mut self, sample: InputSample) -> Result<f32, SteeringError>;

    /// Clear any filter state. Never called automatically.
    fn reset(&mut self) {}
}

/// Dead zone, sensitivity and per-frame bound shared by all adapters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shaping {
    /// Inputs with magnitude below this are ignored
    pub dead_zone: f32,
    pub sensitivity: f32,
    /// Largest rotation returned for one frame (radians)
    pub max_delta: f32,
}

impl Shaping {
    pub fn new(dead_zone: f32, sensitivity: f32, max_delta: f32) -> Result<Self, ConfigError> {
        if !dead_zone.is_finite() || dead_zone < 0.0 {
            return Err(ConfigError::InvalidSteering {
                name: "dead_zone",
                value: dead_zone,
            });
        }
        if !sensitivity.is_finite() {
            return Err(ConfigError::InvalidSteering {
                name: "sensitivity",
                value: sensitivity,
            });
        }
        if max_delta.is_nan() || max_delta <= 0.0 {
            return Err(ConfigError::InvalidSteering {
                name: "max_rotation_per_frame",
                value: max_delta,
            });
        }
        Ok(Self {
            dead_zone,
            sensitivity,
            max_delta,
        })
    }

    /// Suppress the dead zone, subtract it from what remains so output
    /// starts at 0 on its edge, scale, then bound.
    pub fn apply(&self, value: f32) -> f32 {
        if value.abs() < self.dead_zone {
            return 0.0;
        }
        let compensated = value - value.signum() * self.dead_zone;
        (compensated * self.sensitivity).clamp(-self.max_delta, self.max_delta)
    }
}

fn mismatch(adapter: &'static str, expected: SampleKind, got: InputSample) -> SteeringError {
    log::warn!("{adapter} steering received a {:?} sample", got.kind());
    SteeringError::UnsupportedSample {
        adapter,
        expected,
        got: got.kind(),
    }
}

fn finite(kind: SampleKind, value: f32) -> Result<f32, SteeringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SteeringError::NonFiniteSample(kind))
    }
}

/// Steers from device yaw
#[derive(Debug, Clone)]
pub struct YawSteering {
    shaping: Shaping,
}

impl YawSteering {
    pub fn new(shaping: Shaping) -> Self {
        Self { shaping }
    }
}

impl SteeringAdapter for YawSteering {
    fn name(&self) -> &'static str {
        "yaw"
    }

    fn accepts(&self) -> SampleKind {
        SampleKind::Yaw
    }

    fn handle(&mut self, sample: InputSample) -> Result<f32, SteeringError> {
        let InputSample::Yaw(yaw) = sample else {
            return Err(mismatch(self.name(), self.accepts(), sample));
        };
        let yaw = finite(SampleKind::Yaw, yaw)?;
        Ok(self.shaping.apply(yaw))
    }
}

/// Exponential-moving-average high-pass filter.
///
/// Removes slow sensor drift: the low-pass estimate tracks the bias and is
/// subtracted from each raw value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighPass {
    factor: f32,
    low_pass: f32,
}

impl HighPass {
    /// `factor` in (0, 1]: weight of the newest sample in the low-pass average
    pub fn new(factor: f32) -> Result<Self, ConfigError> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::InvalidSteering {
                name: "filtering_factor",
                value: factor,
            });
        }
        Ok(Self {
            factor,
            low_pass: 0.0,
        })
    }

    pub fn filter(&mut self, raw: f32) -> f32 {
        self.low_pass = raw * self.factor + self.low_pass * (1.0 - self.factor);
        raw - self.low_pass
    }

    #[inline]
    pub fn low_pass(&self) -> f32 {
        self.low_pass
    }

    pub fn reset(&mut self) {
        self.low_pass = 0.0;
    }
}

/// Steers from gyroscope rotation rate
#[derive(Debug, Clone)]
pub struct RateSteering {
    shaping: Shaping,
    /// Added to every raw rate to cancel a known sensor bias (rad/s)
    gyro_offset: f32,
    high_pass: Option<HighPass>,
    last_timestamp: Option<f64>,
}

impl RateSteering {
    pub fn new(shaping: Shaping, gyro_offset: f32) -> Result<Self, ConfigError> {
        if !gyro_offset.is_finite() {
            return Err(ConfigError::InvalidSteering {
                name: "gyro_offset",
                value: gyro_offset,
            });
        }
        Ok(Self {
            shaping,
            gyro_offset,
            high_pass: None,
            last_timestamp: None,
        })
    }

    pub fn with_high_pass(mut self, filter: HighPass) -> Self {
        self.high_pass = Some(filter);
        self
    }

    pub fn high_pass(&self) -> Option<&HighPass> {
        self.high_pass.as_ref()
    }

    /// Timestamp of the last accepted sample
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}

impl SteeringAdapter for RateSteering {
    fn name(&self) -> &'static str {
        "rate"
    }

    fn accepts(&self) -> SampleKind {
        SampleKind::Rate
    }

    fn handle(&mut self, sample: InputSample) -> Result<f32, SteeringError> {
        let InputSample::Rate { rate, timestamp } = sample else {
            return Err(mismatch(self.name(), self.accepts(), sample));
        };
        let rate = finite(SampleKind::Rate, rate)?;

        if let Some(prev) = self.last_timestamp
            && timestamp < prev
        {
            log::debug!("Rate sample went back in time ({timestamp} < {prev})");
        }
        self.last_timestamp = Some(timestamp);

        let adjusted = rate + self.gyro_offset;
        let filtered = match self.high_pass.as_mut() {
            Some(hp) => hp.filter(adjusted),
            None => adjusted,
        };
        Ok(self.shaping.apply(filtered))
    }

    fn reset(&mut self) {
        if let Some(hp) = self.high_pass.as_mut() {
            hp.reset();
        }
        self.last_timestamp = None;
    }
}

/// Steers from vertical finger drag
#[derive(Debug, Clone)]
pub struct TouchSteering {
    shaping: Shaping,
}

impl TouchSteering {
    pub fn new(shaping: Shaping) -> Self {
        Self { shaping }
    }
}

impl SteeringAdapter for TouchSteering {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn accepts(&self) -> SampleKind {
        SampleKind::TouchDelta
    }

    fn handle(&mut self, sample: InputSample) -> Result<f32, SteeringError> {
        let InputSample::TouchDelta { dx, dy } = sample else {
            return Err(mismatch(self.name(), self.accepts(), sample));
        };
        finite(SampleKind::TouchDelta, dx)?;
        let dy = finite(SampleKind::TouchDelta, dy)?;
        Ok(self.shaping.apply(dy))
    }
}

/// Build the adapter selected in settings
pub fn build_adapter(settings: &SteeringSettings) -> Result<Box<dyn SteeringAdapter>, ConfigError> {
    let adapter: Box<dyn SteeringAdapter> = match settings.mode {
        SteeringMode::Yaw => {
            let shaping = Shaping::new(
                settings.dead_zone,
                settings.sensitivity,
                settings.max_rotation_per_frame,
            )?;
            Box::new(YawSteering::new(shaping))
        }
        SteeringMode::Rate => {
            let shaping = Shaping::new(
                settings.dead_zone,
                settings.sensitivity,
                settings.max_rotation_per_frame,
            )?;
            let mut rate = RateSteering::new(shaping, settings.gyro_offset)?;
            if settings.high_pass {
                rate = rate.with_high_pass(HighPass::new(settings.filtering_factor)?);
            }
            Box::new(rate)
        }
        SteeringMode::Touch => {
            let shaping = Shaping::new(
                settings.touch_dead_zone,
                settings.touch_sensitivity,
                settings.max_rotation_per_frame,
            )?;
            Box::new(TouchSteering::new(shaping))
        }
    };
    log::info!("Steering with {} adapter", adapter.name());
    Ok(adapter)
}

/// Screen region that turns finger movement into normalized deltas.
///
/// While a finger is down the engine burns; each move reports the distance
/// travelled since the previous move as a fraction of the zone size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchZone {
    size: Vec2,
    last_touch: Option<Vec2>,
}

impl TouchZone {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        Ok(Self {
            size: Vec2::new(width, height),
            last_touch: None,
        })
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.last_touch.is_some()
    }

    pub fn touch_began(&mut self, at: Vec2) {
        self.last_touch = Some(at);
    }

    /// Normalized movement since the previous touch, if a finger is down
    pub fn touch_moved(&mut self, to: Vec2) -> Option<InputSample> {
        let last = self.last_touch.replace(to)?;
        let delta = (to - last) / self.size;
        Some(InputSample::TouchDelta {
            dx: delta.x,
            dy: delta.y,
        })
    }

    /// Finger lifted or the touch was cancelled
    pub fn touch_ended(&mut self) {
        self.last_touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaping(dead_zone: f32, sensitivity: f32) -> Shaping {
        Shaping::new(dead_zone, sensitivity, f32::INFINITY).unwrap()
    }

    #[test]
    fn test_yaw_dead_zone() {
        let mut yaw = YawSteering::new(shaping(0.1, 0.5));
        assert_eq!(yaw.handle(InputSample::Yaw(0.05)).unwrap(), 0.0);
        assert_eq!(yaw.handle(InputSample::Yaw(-0.099)).unwrap(), 0.0);
        assert!((yaw.handle(InputSample::Yaw(0.3)).unwrap() - 0.1).abs() < 1e-6);
        assert!((yaw.handle(InputSample::Yaw(-0.3)).unwrap() + 0.1).abs() < 1e-6);
        // Output is continuous at the dead-zone edge
        assert!(yaw.handle(InputSample::Yaw(0.1)).unwrap().abs() < 1e-7);
    }

    #[test]
    fn test_zero_dead_zone_passes_through() {
        let mut yaw = YawSteering::new(shaping(0.0, 0.1));
        assert_eq!(yaw.handle(InputSample::Yaw(0.0)).unwrap(), 0.0);
        assert!((yaw.handle(InputSample::Yaw(2.0)).unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_output_is_bounded() {
        let mut yaw = YawSteering::new(Shaping::new(0.0, 1.0, 0.25).unwrap());
        assert_eq!(yaw.handle(InputSample::Yaw(10.0)).unwrap(), 0.25);
        assert_eq!(yaw.handle(InputSample::Yaw(-10.0)).unwrap(), -0.25);
    }

    #[test]
    fn test_wrong_sample_fails() {
        let mut yaw = YawSteering::new(shaping(0.1, 0.5));
        let err = yaw
            .handle(InputSample::Rate {
                rate: 1.0,
                timestamp: 0.0,
            })
            .unwrap_err();
        assert_eq!(
            err,
            SteeringError::UnsupportedSample {
                adapter: "yaw",
                expected: SampleKind::Yaw,
                got: SampleKind::Rate,
            }
        );

        let mut rate = RateSteering::new(shaping(0.0, 1.0), 0.0).unwrap();
        assert!(rate.handle(InputSample::Yaw(1.0)).is_err());
        let mut touch = TouchSteering::new(shaping(0.0, 1.0));
        assert!(touch.handle(InputSample::Yaw(1.0)).is_err());
    }

    #[test]
    fn test_non_finite_sample_fails() {
        let mut yaw = YawSteering::new(shaping(0.1, 0.5));
        assert_eq!(
            yaw.handle(InputSample::Yaw(f32::NAN)),
            Err(SteeringError::NonFiniteSample(SampleKind::Yaw))
        );
    }

    #[test]
    fn test_rate_applies_offset() {
        let mut rate = RateSteering::new(shaping(0.01, 0.1), 0.5).unwrap();
        let delta = rate
            .handle(InputSample::Rate {
                rate: -0.5,
                timestamp: 1.0,
            })
            .unwrap();
        assert_eq!(delta, 0.0);
        let delta = rate
            .handle(InputSample::Rate {
                rate: 0.51,
                timestamp: 1.1,
            })
            .unwrap();
        assert!((delta - 0.1).abs() < 1e-5);
        assert_eq!(rate.last_timestamp(), Some(1.1));
    }

    #[test]
    fn test_high_pass_removes_constant_bias() {
        let mut rate = RateSteering::new(shaping(0.01, 1.0), 0.0)
            .unwrap()
            .with_high_pass(HighPass::new(0.1).unwrap());

        // First sample: low-pass = 0.1 * 1.0, output = 1.0 - 0.1
        let first = rate
            .handle(InputSample::Rate {
                rate: 1.0,
                timestamp: 0.0,
            })
            .unwrap();
        assert!((first - (0.9 - 0.01)).abs() < 1e-6);

        // A steady rate decays into the dead zone
        let mut last = first;
        for i in 1..200 {
            last = rate
                .handle(InputSample::Rate {
                    rate: 1.0,
                    timestamp: i as f64 * 0.01,
                })
                .unwrap();
        }
        assert_eq!(last, 0.0);

        rate.reset();
        assert_eq!(rate.high_pass().map(HighPass::low_pass), Some(0.0));
        assert_eq!(rate.last_timestamp(), None);
    }

    #[test]
    fn test_high_pass_factor_validated() {
        assert!(HighPass::new(0.0).is_err());
        assert!(HighPass::new(1.5).is_err());
        assert!(HighPass::new(f32::NAN).is_err());
        assert!(HighPass::new(1.0).is_ok());
    }

    #[test]
    fn test_touch_steering_uses_vertical_drag() {
        let mut touch = TouchSteering::new(shaping(0.0, 6.0));
        let delta = touch
            .handle(InputSample::TouchDelta { dx: 0.9, dy: 0.05 })
            .unwrap();
        assert!((delta - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_touch_dead_zone_from_settings() {
        let settings = SteeringSettings {
            mode: SteeringMode::Touch,
            touch_dead_zone: 0.05,
            touch_sensitivity: 6.0,
            ..SteeringSettings::default()
        };
        let mut touch = build_adapter(&settings).unwrap();
        let drag = |dx, dy| InputSample::TouchDelta { dx, dy };

        // Small drags are ignored regardless of horizontal movement
        assert_eq!(touch.handle(drag(0.8, 0.03)).unwrap(), 0.0);
        assert_eq!(touch.handle(drag(0.0, -0.049)).unwrap(), 0.0);
        // Past the edge the dead zone is subtracted, so output starts at zero
        assert!((touch.handle(drag(0.0, 0.1)).unwrap() - 0.3).abs() < 1e-5);
        assert!((touch.handle(drag(0.0, -0.1)).unwrap() + 0.3).abs() < 1e-5);
        assert!(touch.handle(drag(0.0, 0.051)).unwrap().abs() < 0.01);
        // Large drags are capped at the per-frame limit
        assert_eq!(
            touch.handle(drag(0.0, 0.5)).unwrap(),
            settings.max_rotation_per_frame
        );
    }

    #[test]
    fn test_touch_zone_normalizes() {
        let mut zone = TouchZone::new(200.0, 100.0).unwrap();
        assert_eq!(zone.touch_moved(Vec2::new(10.0, 10.0)), None);

        zone.touch_began(Vec2::new(50.0, 50.0));
        assert!(zone.is_pressed());
        assert_eq!(
            zone.touch_moved(Vec2::new(70.0, 40.0)),
            Some(InputSample::TouchDelta { dx: 0.1, dy: -0.1 })
        );
        // Deltas are relative to the previous move, not the first touch
        assert_eq!(
            zone.touch_moved(Vec2::new(70.0, 50.0)),
            Some(InputSample::TouchDelta { dx: 0.0, dy: 0.1 })
        );

        zone.touch_ended();
        assert!(!zone.is_pressed());
        assert!(TouchZone::new(0.0, 10.0).is_err());
    }

    #[test]
    fn test_build_adapter_by_mode() {
        let mut settings = SteeringSettings::default();
        for (mode, kind) in [
            (SteeringMode::Yaw, SampleKind::Yaw),
            (SteeringMode::Rate, SampleKind::Rate),
            (SteeringMode::Touch, SampleKind::TouchDelta),
        ] {
            settings.mode = mode;
            let adapter = build_adapter(&settings).unwrap();
            assert_eq!(adapter.accepts(), kind);
            assert_eq!(adapter.name(), mode.as_str());
        }

        settings.dead_zone = -1.0;
        settings.mode = SteeringMode::Yaw;
        assert!(build_adapter(&settings).is_err());
    }
}
