use bevy::input::touch::TouchPhase;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::events::AimInput;
use crate::config::tuning::InputMode;

/// Device-agnostic pointer phase for the single tracked pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Held,
    Ended,
}

/// One pointer reading in screen (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub screen: Option<Vec2>,
}

/// A touch as seen this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
    pub phase: TouchPhase,
}

/// Raw device state for one frame.
pub struct PointerDevices<'a> {
    pub mouse_buttons: &'a ButtonInput<MouseButton>,
    pub cursor: Option<Vec2>,
    pub touches: &'a [TouchPoint],
}

/// Turns one device's raw state into pointer samples.
pub trait InputSource: Send + Sync {
    fn poll(&mut self, devices: &PointerDevices<'_>) -> Option<PointerSample>;
}

/// Left mouse button.
#[derive(Debug, Default)]
pub struct MouseSource {
    /// Press and release landed in the same frame; the release is sent next poll.
    pending_release: bool,
    /// A press arrived while a release was still owed; it is sent next poll.
    pending_press: bool,
}

impl InputSource for MouseSource {
    fn poll(&mut self, devices: &PointerDevices<'_>) -> Option<PointerSample> {
        let buttons = devices.mouse_buttons;
        let phase = if self.pending_release {
            self.pending_release = false;
            self.pending_press = buttons.just_pressed(MouseButton::Left);
            PointerPhase::Ended
        } else if self.pending_press || buttons.just_pressed(MouseButton::Left) {
            self.pending_press = false;
            self.pending_release = !buttons.pressed(MouseButton::Left);
            PointerPhase::Began
        } else if buttons.just_released(MouseButton::Left) {
            PointerPhase::Ended
        } else if buttons.pressed(MouseButton::Left) {
            PointerPhase::Held
        } else {
            return None;
        };
        Some(PointerSample {
            phase,
            screen: devices.cursor,
        })
    }
}

/// First finger down; other fingers are ignored until it lifts.
#[derive(Debug, Default)]
pub struct TouchSource {
    tracked: Option<u64>,
}

impl InputSource for TouchSource {
    fn poll(&mut self, devices: &PointerDevices<'_>) -> Option<PointerSample> {
        let touch = match self.tracked {
            Some(id) => match devices.touches.iter().find(|t| t.id == id) {
                Some(touch) => touch,
                // Lifted between two polls without an Ended reading.
                None => {
                    self.tracked = None;
                    return Some(PointerSample {
                        phase: PointerPhase::Ended,
                        screen: None,
                    });
                }
            },
            None => devices
                .touches
                .iter()
                .find(|t| t.phase == TouchPhase::Started)?,
        };

        let phase = match touch.phase {
            TouchPhase::Started => {
                self.tracked = Some(touch.id);
                PointerPhase::Began
            }
            TouchPhase::Moved => PointerPhase::Held,
            // A cancelled touch still ends the cycle, or aiming would never finish.
            TouchPhase::Ended | TouchPhase::Canceled => {
                self.tracked = None;
                PointerPhase::Ended
            }
        };
        Some(PointerSample {
            phase,
            screen: Some(touch.position),
        })
    }
}

/// Mouse first, touch when the mouse has nothing to say.
#[derive(Debug, Default)]
pub struct AutoSource {
    mouse: MouseSource,
    touch: TouchSource,
}

impl InputSource for AutoSource {
    fn poll(&mut self, devices: &PointerDevices<'_>) -> Option<PointerSample> {
        self.mouse
            .poll(devices)
            .or_else(|| self.touch.poll(devices))
    }
}

pub fn source_for(mode: InputMode) -> Box<dyn InputSource> {
    match mode {
        InputMode::Auto => Box::new(AutoSource::default()),
        InputMode::Mouse => Box::new(MouseSource::default()),
        InputMode::Touch => Box::new(TouchSource::default()),
    }
}

/// Projects samples into world space and emits aim events.
#[derive(Resource)]
pub struct PointerInput {
    mode: InputMode,
    source: Box<dyn InputSource>,
    last_world: Option<Vec2>,
}

impl PointerInput {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            source: source_for(mode),
            last_world: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Swap the device source. Returns the last projected point so the caller
    /// can close a cycle the old source would otherwise never finish.
    pub fn switch_mode(&mut self, mode: InputMode) -> Option<Vec2> {
        self.mode = mode;
        self.source = source_for(mode);
        self.last_world.take()
    }

    /// Poll the source once. `project` maps screen to world and may fail
    /// (cursor outside the window); a release then reuses the last point.
    pub fn poll<F>(&mut self, devices: &PointerDevices<'_>, project: F) -> Option<AimInput>
    where
        F: Fn(Vec2) -> Option<Vec2>,
    {
        let sample = self.source.poll(devices)?;
        let world = sample.screen.and_then(&project);
        if let Some(point) = world {
            self.last_world = Some(point);
        }
        match sample.phase {
            PointerPhase::Began => world.map(AimInput::Press),
            PointerPhase::Held => world.map(AimInput::Drag),
            PointerPhase::Ended => world.or(self.last_world).map(AimInput::Release),
        }
    }
}

fn collect_touches(touches: &Touches) -> Vec<TouchPoint> {
    let point = |touch: &bevy::input::touch::Touch, phase| TouchPoint {
        id: touch.id(),
        position: touch.position(),
        phase,
    };
    let mut points: Vec<TouchPoint> = touches
        .iter_just_pressed()
        .map(|t| point(t, TouchPhase::Started))
        .collect();
    points.extend(
        touches
            .iter()
            .filter(|t| !touches.just_pressed(t.id()))
            .map(|t| point(t, TouchPhase::Moved)),
    );
    points.extend(touches.iter_just_released().map(|t| point(t, TouchPhase::Ended)));
    points.extend(touches.iter_just_canceled().map(|t| point(t, TouchPhase::Canceled)));
    points
}

/// InputSet: poll the pointer and project it through the 2D camera.
pub fn read_pointer_input(
    mut pointer: ResMut<PointerInput>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut aim_events: MessageWriter<AimInput>,
) {
    let Some((camera, camera_tf)) = cameras.iter().next() else {
        return;
    };
    let cursor = windows.iter().next().and_then(Window::cursor_position);
    let touch_points = collect_touches(&touches);
    let devices = PointerDevices {
        mouse_buttons: &mouse_buttons,
        cursor,
        touches: &touch_points,
    };

    let project = |screen: Vec2| camera.viewport_to_world_2d(camera_tf, screen).ok();
    if let Some(input) = pointer.poll(&devices, project) {
        aim_events.write(input);
    }
}
