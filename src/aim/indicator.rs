use bevy::prelude::*;

use crate::config::{
    ARROWHEAD_LENGTH, ARROWHEAD_SPREAD_DEGREES, INDICATOR_COLOR, INDICATOR_WIDTH, LIMIT_COLOR,
};
use crate::launch::DragClamp;

/// Which pull indicator to draw. All three read the same drag state.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorStyle {
    /// Single segment from the token to the anchor.
    Line,
    /// Path from the token to the anchor, plus a faint lead to the finger when clamped.
    Path,
    /// Launch vector from the anchor, pointing away from the pull.
    #[default]
    Arrow,
}

/// The two barb endpoints of an arrowhead at `end` for a shaft from `start`.
/// Degenerate shafts collapse both barbs onto `end`.
pub fn arrowhead(start: Vec2, end: Vec2, length: f32, spread_degrees: f32) -> [Vec2; 2] {
    let dir = (end - start).normalize_or_zero();
    if dir == Vec2::ZERO {
        return [end, end];
    }
    let back = -dir * length;
    let spread = spread_degrees.to_radians();
    [
        end + Vec2::from_angle(spread).rotate(back),
        end + Vec2::from_angle(-spread).rotate(back),
    ]
}

/// Gizmo line width for the indicator stroke.
pub fn configure_gizmos(mut store: ResMut<GizmoConfigStore>) {
    let (config, _) = store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = INDICATOR_WIDTH;
}

/// Draw the anchor marker and, while dragging, the pull limit and the indicator.
pub fn draw_indicator(
    mut gizmos: Gizmos,
    style: Res<IndicatorStyle>,
    clamp: Res<DragClamp>,
    q_cam: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) {
    let Ok((camera, cam_xform)) = q_cam.single() else {
        return;
    };
    // drag state lives in screen space; gizmos draw in world space
    let to_world = |p: Vec2| camera.viewport_to_world_2d(cam_xform, p).ok();
    let Some(anchor) = to_world(clamp.anchor()) else {
        return;
    };
    gizmos.circle_2d(anchor, 3.0, LIMIT_COLOR);

    if !clamp.is_dragging() {
        return;
    }
    let Some(effective) = to_world(clamp.effective()) else {
        return;
    };
    gizmos.circle_2d(anchor, clamp.config().max_pull_radius, LIMIT_COLOR);

    match *style {
        IndicatorStyle::Line => {
            gizmos.line_2d(effective, anchor, INDICATOR_COLOR);
        }
        IndicatorStyle::Path => {
            gizmos.linestrip_2d([effective, anchor], INDICATOR_COLOR);
            if clamp.pointer() != clamp.effective() {
                if let Some(pointer) = to_world(clamp.pointer()) {
                    gizmos.line_2d(effective, pointer, LIMIT_COLOR);
                }
            }
        }
        IndicatorStyle::Arrow => {
            let tip = anchor + (anchor - effective);
            if tip == anchor {
                return;
            }
            gizmos.line_2d(anchor, tip, INDICATOR_COLOR);
            for barb in arrowhead(anchor, tip, ARROWHEAD_LENGTH, ARROWHEAD_SPREAD_DEGREES) {
                gizmos.line_2d(tip, barb, INDICATOR_COLOR);
            }
        }
    }
}
