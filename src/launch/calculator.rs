//! Converts a clamped pull offset into a launch command.
//!
//! Pointer coordinates come in screen space (origin top-left, +x right,
//! +y down). The reported angle is in a right-handed frame (+y up) and points
//! in the launch direction, i.e. opposite the pull.

use bevy::prelude::*;

/// Outcome of one completed drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaunchResult {
    /// 0..=max_magnitude, proportional to the pull distance.
    pub magnitude: u32,
    /// -180..=180, 0 = launch to the right, 90 = straight up.
    pub angle_degrees: i32,
}

/// Magnitude for a pull of `dist` when `max_pull_radius` maps to `max_magnitude`.
pub fn launch_magnitude(dist: f32, max_pull_radius: f32, max_magnitude: u32) -> u32 {
    let scaled = (max_magnitude as f32 * dist / max_pull_radius).round();
    // dist <= max_pull_radius upstream; clamp anyway so float drift can't overshoot
    (scaled.max(0.0) as u32).min(max_magnitude)
}

/// Launch angle in degrees for a pull offset given in screen space.
///
/// `acos` alone loses the sign of `dy`, so the two half-planes are handled
/// separately and shifted by 180° to face away from the pull.
///
/// Computed in f64 so angles sitting on a half degree round the same way as
/// the double-precision reference.
pub fn launch_angle_degrees(offset: Vec2) -> f64 {
    let offset = offset.as_dvec2();
    let dist = offset.length();
    if dist == 0.0 {
        return 0.0;
    }
    let cos_arg = (offset.x / dist).clamp(-1.0, 1.0);
    let theta = cos_arg.acos().to_degrees();
    if offset.y >= 0.0 {
        // pulled below (or level with) the anchor
        180.0 - theta
    } else {
        theta - 180.0
    }
}

/// Pure launch computation from the effective (clamped) token position.
pub fn compute_launch(
    effective: Vec2,
    anchor: Vec2,
    max_pull_radius: f32,
    max_magnitude: u32,
) -> LaunchResult {
    let offset = effective - anchor;
    LaunchResult {
        magnitude: launch_magnitude(offset.length(), max_pull_radius, max_magnitude),
        angle_degrees: launch_angle_degrees(offset).round() as i32,
    }
}
