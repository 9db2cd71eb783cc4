//! Engine-agnostic core: the clamped drag session and the launch math.

pub mod calculator;
pub mod drag;

pub use calculator::{LaunchResult, compute_launch, launch_angle_degrees, launch_magnitude};
pub use drag::{DragClamp, DragPhase, clamp_to_radius};
