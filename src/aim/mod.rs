use bevy::prelude::*;

pub mod indicator;
pub mod systems;
pub mod token;

pub use indicator::IndicatorStyle;
pub use systems::{LastLaunch, LaunchFired};

use crate::launch::DragClamp;
use systems::{ActivePointer, WindowLayout};

/// Plug this into your App with `.add_plugins(AimPlugin)`.
pub struct AimPlugin;

impl Plugin for AimPlugin {
    fn build(&self, app: &mut App) {
        app
            // Drag session starts with the default window layout; the first
            // frame re-derives it from the real window size
            .init_resource::<DragClamp>()
            .init_resource::<WindowLayout>()
            .init_resource::<ActivePointer>()
            .init_resource::<IndicatorStyle>()
            .init_resource::<LastLaunch>()
            .add_message::<LaunchFired>()
            .add_systems(
                Startup,
                (systems::spawn_scene, indicator::configure_gizmos),
            )
            // Layout before input so a press never sees a stale anchor;
            // rendering reads the post-input state of the same frame
            .add_systems(
                Update,
                (
                    systems::update_window_layout,
                    systems::drive_drag_session,
                    systems::log_launches,
                    systems::sync_token_transform,
                    indicator::draw_indicator,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    systems::select_indicator_style,
                    systems::exit_on_esc_or_q_if_native,
                ),
            )
            // Spring-back at a fixed timestep (set rate in main via Time::<Fixed>)
            .add_systems(FixedUpdate, systems::spring_token_home);
    }
}
