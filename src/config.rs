use bevy::prelude::*;
use thiserror::Error;

/// Fixed timestep for the token spring-back
pub const PHYSICS_HZ: f64 = 120.0;

/// Layout assumed until the real window size is known
pub const DEFAULT_WINDOW_SIZE: Vec2 = Vec2::new(1280.0, 720.0);

/// Anchor placement as a fraction of the window (screen space, origin top-left)
pub const ANCHOR_X_FRACTION: f32 = 0.3;
pub const ANCHOR_Y_FRACTION: f32 = 0.7;

/// How close to the anchor a press must land to start a drag
pub const START_TOLERANCE: f32 = 25.0;
/// Max pull distance as a fraction of min(window width, window height)
pub const MAX_PULL_FRACTION: f32 = 0.33;
/// Launch magnitude reported for a full-length pull
pub const MAX_MAGNITUDE: u32 = 100;

/// Token / indicator look
pub const TOKEN_RADIUS: f32 = 10.0;
pub const INDICATOR_WIDTH: f32 = 5.0;
pub const TOKEN_COLOR: Color = Color::srgb(0.0, 0.5, 0.0);
pub const INDICATOR_COLOR: Color = Color::srgb(0.0, 0.5, 0.0);
pub const LIMIT_COLOR: Color = Color::srgba(0.0, 0.5, 0.0, 0.15);
pub const BACKGROUND_COLOR: Color = Color::WHITE;

/// Arrowhead size for the vector-arrow indicator
pub const ARROWHEAD_LENGTH: f32 = 18.0;
pub const ARROWHEAD_SPREAD_DEGREES: f32 = 28.0;

/// Spring-back (per second); the token settles on the anchor after release
pub const SPRING_STIFFNESS: f32 = 220.0;
pub const DAMPING_PER_SECOND: f32 = 0.02;
/// Below this distance and speed the token snaps onto the anchor
pub const REST_EPSILON: f32 = 0.05;

/// Log the would-be launch on every pointer move (trace level)
pub const LOG_CANDIDATES: bool = true;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("anchor must be finite, got ({0}, {1})")]
    NonFiniteAnchor(f32, f32),
    #[error("start tolerance must be finite and >= 0, got {0}")]
    InvalidStartTolerance(f32),
    #[error("max pull radius must be finite and > 0, got {0}")]
    InvalidPullRadius(f32),
    #[error("max magnitude must be > 0")]
    ZeroMagnitude,
}

/// Validated drag/launch parameters. Fixed for the lifetime of a drag session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaunchConfig {
    /// Rest/launch position in screen space (+y down).
    pub anchor: Vec2,
    pub start_tolerance: f32,
    pub max_pull_radius: f32,
    pub max_magnitude: u32,
}

impl LaunchConfig {
    pub fn new(
        anchor: Vec2,
        start_tolerance: f32,
        max_pull_radius: f32,
        max_magnitude: u32,
    ) -> Result<Self, ConfigError> {
        if !anchor.is_finite() {
            return Err(ConfigError::NonFiniteAnchor(anchor.x, anchor.y));
        }
        if !start_tolerance.is_finite() || start_tolerance < 0.0 {
            return Err(ConfigError::InvalidStartTolerance(start_tolerance));
        }
        if !max_pull_radius.is_finite() || max_pull_radius <= 0.0 {
            return Err(ConfigError::InvalidPullRadius(max_pull_radius));
        }
        if max_magnitude == 0 {
            return Err(ConfigError::ZeroMagnitude);
        }
        Ok(Self {
            anchor,
            start_tolerance,
            max_pull_radius,
            max_magnitude,
        })
    }

    /// Layout used by the app: anchor at (0.3 w, 0.7 h), pull radius a third
    /// of the short side of the window.
    pub fn from_window(size: Vec2) -> Result<Self, ConfigError> {
        let anchor = Vec2::new(ANCHOR_X_FRACTION * size.x, ANCHOR_Y_FRACTION * size.y);
        let max_pull = MAX_PULL_FRACTION * size.x.min(size.y);
        Self::new(anchor, START_TOLERANCE, max_pull, MAX_MAGNITUDE)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let size = DEFAULT_WINDOW_SIZE;
        Self {
            anchor: Vec2::new(ANCHOR_X_FRACTION * size.x, ANCHOR_Y_FRACTION * size.y),
            start_tolerance: START_TOLERANCE,
            max_pull_radius: MAX_PULL_FRACTION * size.x.min(size.y),
            max_magnitude: MAX_MAGNITUDE,
        }
    }
}
