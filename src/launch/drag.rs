use bevy::prelude::*;
use tracing::{debug, trace, warn};

use super::calculator::{LaunchResult, compute_launch};
use crate::config::LaunchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Project `sample` onto the circle of `radius` around `anchor` if it lies outside.
#[inline]
pub fn clamp_to_radius(sample: Vec2, anchor: Vec2, radius: f32) -> Vec2 {
    // f64 so offsets near f32::MAX don't overflow the distance to inf
    let offset = sample.as_dvec2() - anchor.as_dvec2();
    let d = offset.length();
    if d <= radius as f64 {
        return sample;
    }
    let ratio = radius as f64 / d;
    (anchor.as_dvec2() + ratio * offset).as_vec2()
}

/// Clamped-drag state machine for one draggable token.
///
/// Pointer events must arrive in order (down, moves, up or cancel). Calls that
/// don't fit the current phase are ignored rather than treated as errors, since
/// host input can drop or substitute events.
#[derive(Resource, Debug, Clone)]
pub struct DragClamp {
    config: LaunchConfig,
    phase: DragPhase,
    effective: Vec2,
    /// Last raw pointer sample of the active session (not clamped).
    pointer: Vec2,
}

impl DragClamp {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            phase: DragPhase::Idle,
            effective: config.anchor,
            pointer: config.anchor,
        }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn anchor(&self) -> Vec2 {
        self.config.anchor
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Token position for rendering; equals the anchor while idle.
    pub fn effective(&self) -> Vec2 {
        self.effective
    }

    /// Raw pointer position while dragging (may lie beyond the pull limit).
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Swap in a new configuration. Only allowed while idle so an in-flight
    /// session keeps the parameters it started with; returns whether it applied.
    pub fn reconfigure(&mut self, config: LaunchConfig) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = Self::new(config);
        true
    }

    pub fn on_pointer_down(&mut self, sample: Vec2) {
        if self.is_dragging() || !accept(sample) {
            return;
        }
        let dist = sample.distance(self.config.anchor);
        if dist > self.config.start_tolerance {
            trace!(?sample, dist, "press outside start tolerance ignored");
            return;
        }
        self.phase = DragPhase::Dragging;
        self.track(sample);
        debug!(?sample, effective = ?self.effective, "drag started");
    }

    pub fn on_pointer_move(&mut self, sample: Vec2) {
        if !self.is_dragging() || !accept(sample) {
            return;
        }
        self.track(sample);
    }

    /// Finish the session and return its launch. `None` when no drag was active.
    pub fn on_pointer_up(&mut self) -> Option<LaunchResult> {
        if !self.is_dragging() {
            return None;
        }
        let result = self.candidate();
        debug!(final_position = ?self.effective, ?result, "drag released");
        self.reset();
        Some(result)
    }

    /// Like [`Self::on_pointer_up`] but hands the launch to `on_launch`.
    pub fn on_pointer_up_with(&mut self, on_launch: impl FnOnce(LaunchResult)) {
        if let Some(result) = self.on_pointer_up() {
            on_launch(result);
        }
    }

    /// Abort the session without launching.
    pub fn on_cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
        }
        self.reset();
    }

    /// The launch that releasing right now would produce.
    pub fn candidate(&self) -> LaunchResult {
        compute_launch(
            self.effective,
            self.config.anchor,
            self.config.max_pull_radius,
            self.config.max_magnitude,
        )
    }

    fn track(&mut self, sample: Vec2) {
        let anchor = self.config.anchor;
        let radius = self.config.max_pull_radius;
        self.pointer = sample;
        self.effective = clamp_to_radius(sample, anchor, radius);
        if self.effective != sample {
            trace!(?sample, clamped = ?self.effective, "pull clamped to limit");
        }
    }

    fn reset(&mut self) {
        self.phase = DragPhase::Idle;
        self.effective = self.config.anchor;
        self.pointer = self.config.anchor;
    }
}

impl Default for DragClamp {
    fn default() -> Self {
        Self::new(LaunchConfig::default())
    }
}

fn accept(sample: Vec2) -> bool {
    if sample.is_finite() {
        return true;
    }
    warn!(?sample, "non-finite pointer sample ignored");
    false
}
