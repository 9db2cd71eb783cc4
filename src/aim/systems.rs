use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use tracing::{debug, info, trace, warn};

use crate::aim::indicator::IndicatorStyle;
use crate::aim::token::Token;
use crate::config::{
    DAMPING_PER_SECOND, LOG_CANDIDATES, LaunchConfig, REST_EPSILON, SPRING_STIFFNESS,
    TOKEN_COLOR, TOKEN_RADIUS,
};
use crate::launch::{DragClamp, LaunchResult};

/// Published once per completed drag.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchFired(pub LaunchResult);

/// Most recent launch, if any.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct LastLaunch(pub Option<LaunchResult>);

/// Window size the current launch layout was computed for.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct WindowLayout {
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch(u64),
}

/// The pointer that owns the current gesture; other pointers are ignored until it lifts.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct ActivePointer(pub Option<PointerSource>);

/// Pointer input for one frame, in screen space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    pub pressed: Option<Vec2>,
    pub position: Option<Vec2>,
    pub released: bool,
    pub cancelled: bool,
}

/// How a session ended this frame, and where the token was let go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEnd {
    Launched { from: Vec2, result: LaunchResult },
    Cancelled { from: Vec2 },
}

/// Feed one frame of pointer input through the drag session, in event order:
/// press, move, then cancel or release.
pub fn apply_pointer_frame(clamp: &mut DragClamp, frame: &PointerFrame) -> Option<SessionEnd> {
    if let Some(pos) = frame.pressed {
        clamp.on_pointer_down(pos);
    }
    if let Some(pos) = frame.position {
        clamp.on_pointer_move(pos);
    }
    if !clamp.is_dragging() {
        return None;
    }
    let from = clamp.effective();
    if frame.cancelled {
        clamp.on_cancel();
        return Some(SessionEnd::Cancelled { from });
    }
    if frame.released {
        return clamp
            .on_pointer_up()
            .map(|result| SessionEnd::Launched { from, result });
    }
    None
}

/// Collapse mouse and touch state into a single-pointer frame.
pub fn read_pointer_frame(
    window: &Window,
    buttons: &ButtonInput<MouseButton>,
    touches: &Touches,
    active: &mut ActivePointer,
) -> PointerFrame {
    let mut frame = PointerFrame::default();

    match active.0 {
        None => {
            if buttons.just_pressed(MouseButton::Left) {
                if let Some(pos) = window.cursor_position() {
                    active.0 = Some(PointerSource::Mouse);
                    frame.pressed = Some(pos);
                    frame.position = Some(pos);
                }
            } else if let Some(touch) = touches.iter_just_pressed().next() {
                let id = touch.id();
                active.0 = Some(PointerSource::Touch(id));
                frame.pressed = Some(touch.position());
                // iter_just_pressed holds the Started snapshot; moves in the
                // same frame only land in the live entry
                frame.position = touch_position(touches, id).or(Some(touch.position()));
            }
        }
        // cursor outside the window keeps the last sample
        Some(PointerSource::Mouse) => frame.position = window.cursor_position(),
        Some(PointerSource::Touch(id)) => frame.position = touch_position(touches, id),
    }

    match active.0 {
        Some(PointerSource::Mouse)
            if buttons.just_released(MouseButton::Left) || !buttons.pressed(MouseButton::Left) =>
        {
            frame.released = true;
            active.0 = None;
        }
        Some(PointerSource::Touch(id)) if touches.just_canceled(id) => {
            frame.cancelled = true;
            active.0 = None;
        }
        Some(PointerSource::Touch(id))
            if touches.just_released(id) || touches.get_pressed(id).is_none() =>
        {
            frame.released = true;
            active.0 = None;
        }
        _ => {}
    }
    frame
}

/// Latest known position of touch `id`. A finger lifted this frame has left
/// `pressed` but its final sample survives in the released set.
fn touch_position(touches: &Touches, id: u64) -> Option<Vec2> {
    touches
        .get_released(id)
        .or_else(|| touches.get_pressed(id))
        .map(|t| t.position())
}

/// The launch to report after this frame's input, only when the held token
/// actually moved.
pub fn moved_candidate(before: Vec2, clamp: &DragClamp) -> Option<LaunchResult> {
    (clamp.is_dragging() && clamp.effective() != before).then(|| clamp.candidate())
}

/// Spawn the 2D camera and the token at the anchor.
pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    clamp: Res<DragClamp>,
) {
    commands.spawn(Camera2d);
    commands.spawn((
        Mesh2d(meshes.add(Circle::new(TOKEN_RADIUS))),
        MeshMaterial2d(materials.add(TOKEN_COLOR)),
        Transform::from_xyz(0.0, 0.0, 1.0),
        Token::at_rest(clamp.anchor(), TOKEN_RADIUS),
    ));
}

/// Recompute the anchor and pull radius when the window size changes.
/// Deferred while a drag is in flight.
pub fn update_window_layout(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut layout: ResMut<WindowLayout>,
    mut clamp: ResMut<DragClamp>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = window.size();
    if size == layout.size {
        return;
    }
    let config = match LaunchConfig::from_window(size) {
        Ok(config) => config,
        Err(err) => {
            warn!(%err, ?size, "window too small for a launch layout, keeping previous");
            layout.size = size;
            return;
        }
    };
    if !clamp.reconfigure(config) {
        return;
    }
    layout.size = size;
    info!(
        anchor = ?config.anchor,
        max_pull_radius = config.max_pull_radius,
        "launch layout updated"
    );
}

/// Route pointer input into the drag session and keep the token in hand.
pub fn drive_drag_session(
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    mut active: ResMut<ActivePointer>,
    mut clamp: ResMut<DragClamp>,
    mut tokens: Query<&mut Token>,
    mut launches: MessageWriter<LaunchFired>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let mut frame = read_pointer_frame(window, &buttons, &touches, &mut active);
    if keys.just_pressed(KeyCode::Space) && clamp.is_dragging() {
        frame.cancelled = true;
        active.0 = None;
    }

    let before = clamp.effective();
    let end = apply_pointer_frame(&mut clamp, &frame);

    if clamp.is_dragging() {
        let effective = clamp.effective();
        for mut token in &mut tokens {
            token.hold_at(effective);
        }
        if let Some(candidate) = moved_candidate(before, &clamp).filter(|_| LOG_CANDIDATES) {
            trace!(
                magnitude = candidate.magnitude,
                angle_degrees = candidate.angle_degrees,
                "candidate launch"
            );
        }
    }

    match end {
        Some(SessionEnd::Launched { from, result }) => {
            for mut token in &mut tokens {
                token.hold_at(from);
                token.release();
            }
            launches.write(LaunchFired(result));
        }
        Some(SessionEnd::Cancelled { from }) => {
            debug!(?from, "returning token after cancel");
            for mut token in &mut tokens {
                token.hold_at(from);
                token.release();
            }
        }
        None => {}
    }
}

pub fn log_launches(mut reader: MessageReader<LaunchFired>, mut last: ResMut<LastLaunch>) {
    for LaunchFired(result) in reader.read() {
        info!(
            magnitude = result.magnitude,
            angle_degrees = result.angle_degrees,
            "launch"
        );
        last.0 = Some(*result);
    }
}

/// Spring released tokens back to the anchor (FixedUpdate).
pub fn spring_token_home(
    time: Res<Time>, // fixed clock in FixedUpdate
    clamp: Res<DragClamp>,
    mut tokens: Query<&mut Token>,
) {
    if clamp.is_dragging() {
        return;
    }
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    // per-second damping -> per-tick factor
    let damping = DAMPING_PER_SECOND.powf(dt);
    let anchor = clamp.anchor();
    for mut token in &mut tokens {
        token.spring_step(anchor, SPRING_STIFFNESS, damping, dt, REST_EPSILON);
    }
}

/// Place token meshes from their screen-space positions.
pub fn sync_token_transform(
    q_cam: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut q_tokens: Query<(&Token, &mut Transform)>,
) {
    let Ok((camera, cam_xform)) = q_cam.single() else {
        return;
    };
    for (token, mut xform) in &mut q_tokens {
        if let Ok(world) = camera.viewport_to_world_2d(cam_xform, token.position) {
            xform.translation = world.extend(xform.translation.z);
        }
    }
}

/// Keys 1/2/3 pick the line, path or arrow indicator.
pub fn select_indicator_style(keys: Res<ButtonInput<KeyCode>>, mut style: ResMut<IndicatorStyle>) {
    let picked = if keys.just_pressed(KeyCode::Digit1) {
        IndicatorStyle::Line
    } else if keys.just_pressed(KeyCode::Digit2) {
        IndicatorStyle::Path
    } else if keys.just_pressed(KeyCode::Digit3) {
        IndicatorStyle::Arrow
    } else {
        return;
    };
    if *style != picked {
        info!(?picked, "indicator style");
        *style = picked;
    }
}

/// Native-only quit: press Esc or Q to exit the app.
/// (No-op on wasm32.)
pub fn exit_on_esc_or_q_if_native(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: MessageWriter<AppExit>,
) {
    if cfg!(not(target_arch = "wasm32")) && keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyQ])
    {
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> DragClamp {
        DragClamp::new(LaunchConfig::new(Vec2::new(100.0, 100.0), 25.0, 50.0, 100).unwrap())
    }

    fn press(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            pressed: Some(Vec2::new(x, y)),
            position: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    fn drag(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            position: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    #[test]
    fn press_drag_release_launches_from_clamped_point() {
        let mut m = machine();
        assert_eq!(apply_pointer_frame(&mut m, &press(105.0, 100.0)), None);
        assert_eq!(apply_pointer_frame(&mut m, &drag(0.0, 100.0)), None);
        let end = apply_pointer_frame(
            &mut m,
            &PointerFrame {
                released: true,
                ..default()
            },
        );
        assert_eq!(
            end,
            Some(SessionEnd::Launched {
                from: Vec2::new(50.0, 100.0),
                result: LaunchResult {
                    magnitude: 100,
                    angle_degrees: 0
                }
            })
        );
        assert!(!m.is_dragging());
    }

    #[test]
    fn release_in_the_press_frame_still_launches() {
        let mut m = machine();
        let mut frame = press(100.0, 110.0);
        frame.released = true;
        let Some(SessionEnd::Launched { result, .. }) = apply_pointer_frame(&mut m, &frame) else {
            panic!("expected a launch");
        };
        assert_eq!(result.magnitude, 20);
        assert_eq!(result.angle_degrees, 90);
    }

    #[test]
    fn cancel_wins_over_release() {
        let mut m = machine();
        apply_pointer_frame(&mut m, &press(100.0, 100.0));
        let end = apply_pointer_frame(
            &mut m,
            &PointerFrame {
                position: Some(Vec2::new(120.0, 100.0)),
                released: true,
                cancelled: true,
                ..default()
            },
        );
        assert_eq!(
            end,
            Some(SessionEnd::Cancelled {
                from: Vec2::new(120.0, 100.0)
            })
        );
    }

    #[test]
    fn release_without_session_is_ignored() {
        let mut m = machine();
        apply_pointer_frame(&mut m, &press(300.0, 300.0));
        let end = apply_pointer_frame(
            &mut m,
            &PointerFrame {
                released: true,
                ..default()
            },
        );
        assert_eq!(end, None);
        assert_eq!(m.effective(), m.anchor());
    }

    #[test]
    fn candidate_only_reported_when_token_moves() {
        let mut m = machine();
        apply_pointer_frame(&mut m, &press(100.0, 100.0));
        let before = m.effective();
        apply_pointer_frame(&mut m, &drag(100.0, 100.0));
        assert_eq!(moved_candidate(before, &m), None);

        apply_pointer_frame(&mut m, &drag(100.0, 125.0));
        assert_eq!(
            moved_candidate(before, &m),
            Some(LaunchResult {
                magnitude: 50,
                angle_degrees: 90
            })
        );
    }

    #[test]
    fn idle_session_reports_no_candidate() {
        let m = machine();
        assert_eq!(moved_candidate(Vec2::ZERO, &m), None);
    }

    mod pointer_input {
        use super::*;
        use bevy::input::touch::{TouchInput, TouchPhase, touch_screen_input_system};

        /// Drives a real `Touches` resource one frame per `frame` call.
        struct TouchScreen(App);

        impl TouchScreen {
            fn new() -> Self {
                let mut app = App::new();
                app.add_message::<TouchInput>()
                    .init_resource::<Touches>()
                    .add_systems(Update, touch_screen_input_system);
                Self(app)
            }

            fn frame(&mut self, events: &[(TouchPhase, u64, f32, f32)]) -> &Touches {
                for &(phase, id, x, y) in events {
                    self.0.world_mut().write_message(TouchInput {
                        phase,
                        position: Vec2::new(x, y),
                        window: Entity::PLACEHOLDER,
                        force: None,
                        id,
                    });
                }
                self.0.update();
                self.0.world().resource::<Touches>()
            }
        }

        fn window_with_cursor(cursor: Option<Vec2>) -> Window {
            let mut window = Window::default();
            window.set_cursor_position(cursor);
            window
        }

        fn held_button() -> ButtonInput<MouseButton> {
            let mut buttons = ButtonInput::default();
            buttons.press(MouseButton::Left);
            buttons.clear();
            buttons
        }

        #[test]
        fn touch_moved_and_lifted_in_one_frame_keeps_final_sample() {
            let window = Window::default();
            let buttons = ButtonInput::default();
            let mut active = ActivePointer::default();
            let mut screen = TouchScreen::new();
            let mut m = machine();

            let touches = screen.frame(&[(TouchPhase::Started, 7, 100.0, 100.0)]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            assert_eq!(frame.pressed, Some(Vec2::new(100.0, 100.0)));
            assert_eq!(active.0, Some(PointerSource::Touch(7)));
            apply_pointer_frame(&mut m, &frame);

            let touches = screen.frame(&[
                (TouchPhase::Moved, 7, 60.0, 100.0),
                (TouchPhase::Ended, 7, 60.0, 100.0),
            ]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            assert_eq!(frame.position, Some(Vec2::new(60.0, 100.0)));
            assert!(frame.released);
            assert_eq!(active.0, None);

            let Some(SessionEnd::Launched { result, .. }) = apply_pointer_frame(&mut m, &frame)
            else {
                panic!("expected a launch");
            };
            assert_eq!(
                result,
                LaunchResult {
                    magnitude: 80,
                    angle_degrees: 0
                }
            );
        }

        #[test]
        fn touch_press_frame_uses_latest_move() {
            let window = Window::default();
            let buttons = ButtonInput::default();
            let mut active = ActivePointer::default();
            let mut screen = TouchScreen::new();

            let touches = screen.frame(&[
                (TouchPhase::Started, 3, 100.0, 100.0),
                (TouchPhase::Moved, 3, 90.0, 100.0),
            ]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            assert_eq!(frame.pressed, Some(Vec2::new(100.0, 100.0)));
            assert_eq!(frame.position, Some(Vec2::new(90.0, 100.0)));
            assert!(!frame.released);
        }

        #[test]
        fn first_pointer_owns_the_gesture() {
            let window = window_with_cursor(Some(Vec2::new(10.0, 10.0)));
            let mut buttons = ButtonInput::default();
            let mut active = ActivePointer::default();
            let mut screen = TouchScreen::new();

            let touches = screen.frame(&[(TouchPhase::Started, 1, 100.0, 100.0)]);
            read_pointer_frame(&window, &buttons, touches, &mut active);
            assert_eq!(active.0, Some(PointerSource::Touch(1)));

            // second finger and a mouse click while the first finger is down
            buttons.press(MouseButton::Left);
            let touches = screen.frame(&[(TouchPhase::Started, 2, 5.0, 5.0)]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            assert_eq!(frame.pressed, None);
            assert_eq!(frame.position, Some(Vec2::new(100.0, 100.0)));
            assert_eq!(active.0, Some(PointerSource::Touch(1)));
        }

        #[test]
        fn touch_cancel_becomes_cancel() {
            let window = Window::default();
            let buttons = ButtonInput::default();
            let mut active = ActivePointer::default();
            let mut screen = TouchScreen::new();
            let mut m = machine();

            let touches = screen.frame(&[(TouchPhase::Started, 4, 100.0, 100.0)]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            apply_pointer_frame(&mut m, &frame);

            let touches = screen.frame(&[(TouchPhase::Canceled, 4, 100.0, 100.0)]);
            let frame = read_pointer_frame(&window, &buttons, touches, &mut active);
            assert!(frame.cancelled);
            assert!(!frame.released);
            assert_eq!(active.0, None);
            assert!(matches!(
                apply_pointer_frame(&mut m, &frame),
                Some(SessionEnd::Cancelled { .. })
            ));
        }

        #[test]
        fn mouse_press_claims_the_pointer() {
            let window = window_with_cursor(Some(Vec2::new(100.0, 100.0)));
            let mut buttons = ButtonInput::default();
            buttons.press(MouseButton::Left);
            let mut active = ActivePointer::default();

            let frame = read_pointer_frame(&window, &buttons, &Touches::default(), &mut active);
            assert_eq!(frame.pressed, Some(Vec2::new(100.0, 100.0)));
            assert_eq!(frame.position, Some(Vec2::new(100.0, 100.0)));
            assert_eq!(active.0, Some(PointerSource::Mouse));
        }

        #[test]
        fn mouse_release_counts_without_just_released() {
            // release was missed (e.g. focus loss): button simply no longer held
            let window = window_with_cursor(Some(Vec2::new(100.0, 100.0)));
            let buttons = ButtonInput::default();
            let mut active = ActivePointer(Some(PointerSource::Mouse));

            let frame = read_pointer_frame(&window, &buttons, &Touches::default(), &mut active);
            assert!(frame.released);
            assert_eq!(active.0, None);
        }

        #[test]
        fn cursor_leaving_window_keeps_last_sample() {
            let mut active = ActivePointer(Some(PointerSource::Mouse));
            let buttons = held_button();
            let mut m = machine();
            apply_pointer_frame(&mut m, &press(100.0, 100.0));
            apply_pointer_frame(&mut m, &drag(120.0, 100.0));

            let window = window_with_cursor(None);
            let frame = read_pointer_frame(&window, &buttons, &Touches::default(), &mut active);
            assert_eq!(frame.position, None);
            assert!(!frame.released);
            assert_eq!(active.0, Some(PointerSource::Mouse));

            apply_pointer_frame(&mut m, &frame);
            assert_eq!(m.effective(), Vec2::new(120.0, 100.0));
        }
    }
}
