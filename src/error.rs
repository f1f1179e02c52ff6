//! Error types for configuration and per-frame simulation

use crate::sim::steering::SampleKind;

/// Rejected configuration. Raised when a component is constructed, never
/// deferred to the first frame.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// World radius must be positive and finite.
    #[error("world radius must be positive, got {0} km")]
    NonPositiveRadius(f32),

    /// Surface gravity must be finite.
    #[error("surface gravity must be finite, got {0}")]
    NonFiniteGravity(f32),

    /// Meters-to-display scale must be positive and finite.
    #[error("meters-to-display scale must be positive, got {0}")]
    InvalidScale(f32),

    /// Tile side length must be positive and finite.
    #[error("tile side length must be positive, got {0}")]
    NonPositiveTileSize(f32),

    /// Viewport dimensions must be positive and finite.
    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    /// Scroll grid has no rows or no columns.
    #[error("scroll grid must have at least one row and one column")]
    EmptyGrid,

    /// Scroll grid rows have differing lengths.
    #[error("scroll grid is not rectangular: row {row} has {found} columns, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A tile position handed to the grid was NaN or infinite.
    #[error("tile [{row}][{col}] has a non-finite position")]
    NonFiniteTilePosition { row: usize, col: usize },

    /// A tile already lies past the wrap threshold, so the grid would
    /// rotate without the camera moving.
    #[error("tile [{row}][{col}] at ({x}, {y}) lies outside the wrap threshold for a {width}x{height} viewport")]
    UnstableGrid {
        row: usize,
        col: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    /// Parallax ratio must be finite and non-negative.
    #[error("scroll ratio must be finite and non-negative, got {0}")]
    InvalidScrollRatio(f32),

    /// A steering parameter was out of range.
    #[error("invalid steering parameter `{name}`: {value}")]
    InvalidSteering { name: &'static str, value: f32 },

    /// A craft parameter was out of range.
    #[error("invalid craft parameter `{name}`: {value}")]
    InvalidCraft { name: &'static str, value: f32 },

    /// Scenario name not in the catalog.
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    /// Failed to read the settings file.
    #[error("failed to read settings: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to parse JSON settings.
    #[error("failed to parse settings: {0}")]
    ParseError(#[source] serde_json::Error),

    /// Failed to write settings as JSON.
    #[error("failed to serialize settings: {0}")]
    SerializeError(#[source] serde_json::Error),
}

/// Precondition violations detected while stepping a frame.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The craft sits exactly at the world center, where "down" is undefined.
    #[error("craft is at the world center; gravity direction is undefined")]
    AtWorldCenter,

    /// A position or velocity handed in by the host was NaN or infinite.
    #[error("non-finite {quantity}: ({x}, {y})")]
    NonFinite {
        quantity: &'static str,
        x: f32,
        y: f32,
    },

    /// The steering adapter rejected the frame's input sample.
    #[error(transparent)]
    Steering(#[from] SteeringError),
}

/// Steering adapter misuse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SteeringError {
    /// The adapter was handed a sample type it does not consume.
    #[error("{adapter} steering expects {expected:?} samples, got {got:?}")]
    UnsupportedSample {
        adapter: &'static str,
        expected: SampleKind,
        got: SampleKind,
    },

    /// The sample value was NaN or infinite.
    #[error("non-finite {0:?} sample")]
    NonFiniteSample(SampleKind),
}
