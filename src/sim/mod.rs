//! Deterministic simulation core
//!
//! Everything the host engine cannot do for us lives here. This module must
//! stay pure and deterministic:
//! - One call per frame, driven by the host's clock
//! - No rendering, physics solver or platform dependencies
//! - Same inputs in, same outputs out

pub mod craft;
pub mod scenario;
pub mod scroll;
pub mod state;
pub mod steering;
pub mod tick;
pub mod world;

pub use craft::{CraftComponent, CraftSpec, CraftTelemetry, thrust_force};
pub use scenario::Scenario;
pub use scroll::{ParallaxBackground, ParallaxWraps, ScrollGrid, Tile, TileId, Viewport, WrapReport};
pub use state::{CameraTracker, Session};
pub use steering::{
    HighPass, InputSample, RateSteering, SampleKind, Shaping, SteeringAdapter, SteeringMode,
    TouchSteering, TouchZone, YawSteering, build_adapter,
};
pub use tick::{FrameInput, FrameOutput, tick};
pub use world::{SurfaceAnchor, Telemetry, World};
