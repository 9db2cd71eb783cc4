use bevy::log::LogPlugin;
use bevy::prelude::*;

use slingshot_aim::AimPlugin;
use slingshot_aim::config::{BACKGROUND_COLOR, PHYSICS_HZ};

fn main() {
    App::new()
        .insert_resource(ClearColor(BACKGROUND_COLOR))
        // Configure the fixed timestep clock (used in FixedUpdate)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
        // Bevy's core engine features
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "slingshot-aim".into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn,slingshot_aim=debug".into(),
                    ..default()
                }),
        )
        // Drag-to-launch interaction
        .add_plugins(AimPlugin)
        .run();
}
