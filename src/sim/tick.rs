//! Per-frame update
//!
//! Called once per rendered frame by the host. Reads the craft snapshot the
//! physics engine produced, and returns what the engine should apply next:
//! global gravity, a rotation delta, engine thrust, and where to draw the
//! ground and background tiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::craft::{CraftTelemetry, thrust_force};
use super::scroll::ParallaxWraps;
use super::state::Session;
use super::steering::InputSample;
use super::world::{SurfaceAnchor, Telemetry, check_finite};
use crate::error::SimError;

/// Host-provided inputs for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Craft snapshot from the physics engine (display units)
    pub craft: CraftTelemetry,
    /// Camera position this frame (display units)
    pub camera_position: Vec2,
    /// Steering sample, if the sensor or touch zone produced one
    pub sample: Option<InputSample>,
}

/// What the host applies after this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutput {
    /// Global gravity (m/s²)
    pub gravity: Vec2,
    /// Add to the craft's orientation (radians)
    pub rotation_delta: f32,
    /// Force on the engine nozzle (N)
    pub thrust: Vec2,
    pub telemetry: Telemetry,
    /// Ground placement beneath the craft (display units)
    pub surface: SurfaceAnchor,
    /// Camera roll keeping the horizon level (radians)
    pub camera_rotation: f32,
    /// Background wraps this frame
    pub wraps: ParallaxWraps,
}

impl FrameOutput {
    /// On-screen debug readout
    pub fn hud_lines(&self, craft: &CraftTelemetry) -> [String; 4] {
        [
            format!("pos: ({:+06.0}, {:+06.0})", craft.position.x, craft.position.y),
            format!("dx: {:+06.2}, dy: {:+06.2}", craft.velocity.x, craft.velocity.y),
            format!(
                "ω: {:+06.2}   gdx: {:+06.2}, gdy:{:+06.2}",
                craft.angular_velocity, self.gravity.x, self.gravity.y
            ),
            format!(
                "alt: {:.0} m   v: {:.1} m/s   vs: {:+.1} m/s",
                self.telemetry.altitude, self.telemetry.speed, self.telemetry.vertical_speed
            ),
        ]
    }
}

/// Step one frame.
///
/// Fails without touching the background or camera state if the craft is at
/// the world center, any input or the camera's displacement is non-finite,
/// or the steering adapter rejects the sample.
pub fn tick(session: &mut Session, input: &FrameInput) -> Result<FrameOutput, SimError> {
    let craft = &input.craft;
    check_finite("camera position", input.camera_position)?;

    let position_m = session.units.to_meters(craft.position);
    let velocity_m = session.units.to_meters(craft.velocity);

    let gravity = session.world.gravity_at(position_m)?;
    let telemetry = session.world.telemetry(position_m, velocity_m)?;
    let anchor = session.world.surface_anchor(position_m)?;
    let camera_rotation = session.world.local_up_rotation(position_m)?;

    let delta = session.camera.peek_displacement(input.camera_position);
    session.background.check_advance(delta)?;

    let rotation_delta = match input.sample {
        Some(sample) => session.steering.handle(sample)?,
        None => 0.0,
    };

    let thrust = thrust_force(craft, &session.craft_spec);

    let wraps = session.background.advance(delta)?;
    session.camera.record(input.camera_position);

    session.frame += 1;
    log::trace!("frame {}: {}", session.frame, telemetry);

    Ok(FrameOutput {
        gravity,
        rotation_delta,
        thrust,
        telemetry,
        surface: SurfaceAnchor {
            point: session.units.to_display(anchor.point),
            rotation: anchor.rotation,
        },
        camera_rotation,
        wraps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SteeringError;
    use crate::settings::Settings;
    use crate::sim::steering::SteeringMode;

    fn yaw_session() -> Session {
        let mut settings = Settings::default();
        settings.steering.mode = SteeringMode::Yaw;
        settings.steering.dead_zone = 0.1;
        settings.steering.sensitivity = 0.5;
        settings.display.viewport_width = 300.0;
        settings.display.viewport_height = 300.0;
        settings.scroll.tile_size = Some(100.0);
        settings.scroll.ratio_mid = 1.0;
        settings.scroll.ratio_close = 1.0;
        Session::new(&settings).unwrap()
    }

    fn frame(craft: CraftTelemetry, camera: Vec2, sample: Option<InputSample>) -> FrameInput {
        FrameInput {
            craft,
            camera_position: camera,
            sample,
        }
    }

    #[test]
    fn test_tick_composes_outputs() {
        let mut session = yaw_session();
        let (mut craft, _) = session.start();
        craft.engine_on = true;

        let out = tick(
            &mut session,
            &frame(craft, craft.position, Some(InputSample::Yaw(0.3))),
        )
        .unwrap();

        assert!((out.rotation_delta - 0.1).abs() < 1e-6);
        // Craft sits on +y: gravity straight down
        assert!((out.gravity.y + 1.62).abs() < 1e-5);
        assert!((out.telemetry.altitude - 400_000.0).abs() < 1.0);
        // Orbit scenario starts lying on its side: thrust toward -x
        assert!(out.thrust.x < -44_000.0);
        assert!(out.camera_rotation.abs() < 1e-6);
        assert!((out.surface.point.y - 1_737_000.0 * 1.5).abs() < 2.0);
        assert!(!out.wraps.mid.any());
        assert_eq!(session.frame, 1);
    }

    #[test]
    fn test_tick_scrolls_background_with_camera() {
        let mut session = yaw_session();
        let (craft, _) = session.start();
        let camera = craft.position;

        tick(&mut session, &frame(craft, camera, None)).unwrap();
        let out = tick(
            &mut session,
            &frame(craft, camera + Vec2::new(400.0, 0.0), None),
        )
        .unwrap();
        assert!(out.wraps.mid.left && out.wraps.close.left);
        assert_eq!(out.wraps.mid.count(), 1);
    }

    #[test]
    fn test_tick_rejects_center_without_side_effects() {
        let mut session = yaw_session();
        let craft = CraftTelemetry::default();
        let before = session.background.mid.positions();

        let err = tick(&mut session, &frame(craft, Vec2::new(999.0, 0.0), None)).unwrap_err();
        assert!(matches!(err, SimError::AtWorldCenter));
        assert_eq!(session.background.mid.positions(), before);
        assert_eq!(session.camera.last_position(), None);
        assert_eq!(session.frame, 0);
    }

    #[test]
    fn test_tick_rejects_overflowing_camera_jump() {
        let mut session = yaw_session();
        let (craft, _) = session.start();
        let far = Vec2::new(f32::MAX, 0.0);

        tick(&mut session, &frame(craft, far, None)).unwrap();
        let mid = session.background.mid.positions();
        let close = session.background.close.positions();

        // Both positions are finite, their difference is not
        let err = tick(&mut session, &frame(craft, -far, None)).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { .. }));
        assert_eq!(session.background.mid.positions(), mid);
        assert_eq!(session.background.close.positions(), close);
        assert_eq!(session.camera.last_position(), Some(far));
        assert_eq!(session.frame, 1);

        // Stepping resumes from the last good camera position
        let out = tick(&mut session, &frame(craft, far, None)).unwrap();
        assert!(!out.wraps.close.any());
        assert_eq!(session.background.close.positions(), close);
        assert_eq!(session.frame, 2);
    }

    #[test]
    fn test_tick_rejects_wrong_sample() {
        let mut session = yaw_session();
        let (craft, _) = session.start();
        let err = tick(
            &mut session,
            &frame(
                craft,
                craft.position,
                Some(InputSample::TouchDelta { dx: 0.0, dy: 0.2 }),
            ),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SimError::Steering(SteeringError::UnsupportedSample { .. })
        ));
    }

    #[test]
    fn test_hud_lines() {
        let mut session = yaw_session();
        let (craft, _) = session.start();
        let out = tick(&mut session, &frame(craft, craft.position, None)).unwrap();
        let hud = out.hud_lines(&craft);
        assert_eq!(hud[0], "pos: (+00000, +3205500)");
        assert_eq!(hud[1], "dx: +00.00, dy: +00.00");
        assert!(hud[3].starts_with("alt: 400000 m"));
    }
}
