//! Keyboard and mouse bindings.
//!
//! Raw winit events are translated into [`Action`]s here so the mapping can
//! be tested without a window. `flow` applies the actions to the camera,
//! the lights and the window.

use winit::{event::MouseScrollDelta, keyboard::KeyCode, keyboard::ModifiersState};

use crate::camera::Axis;

pub const USAGE: &str = "\
Use:
  WASD or arrow keys to navigate
  QE or PgUp/Dn to move the camera up and down
  Shift to speed up your movement
  Drag the mouse to look around
  Mouse wheel to zoom, middle button to reset the zoom
  1 and 2 to switch the lamps on and off
  F11 for fullscreen, Alt+F4 to quit
";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Accelerate along a camera axis; `direction` is +1 or -1.
    Move { axis: Axis, direction: f32 },
    /// Stop moving along a camera axis.
    Stop(Axis),
    Boost(bool),
    /// Switch point light `n` (zero based) on or off.
    ToggleLight(usize),
    ToggleFullscreen,
    Quit,
}

fn movement(code: KeyCode) -> Option<(Axis, f32)> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some((Axis::Z, 1.0)),
        KeyCode::KeyS | KeyCode::ArrowDown => Some((Axis::Z, -1.0)),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some((Axis::X, 1.0)),
        KeyCode::KeyD | KeyCode::ArrowRight => Some((Axis::X, -1.0)),
        KeyCode::KeyE | KeyCode::PageDown => Some((Axis::Y, 1.0)),
        KeyCode::KeyQ | KeyCode::PageUp => Some((Axis::Y, -1.0)),
        _ => None,
    }
}

/// Map a physical key transition to an action.
///
/// Toggles only fire on the initial press, auto-repeat is ignored for them.
pub fn key_action(
    code: KeyCode,
    pressed: bool,
    repeat: bool,
    modifiers: ModifiersState,
) -> Option<Action> {
    if let Some((axis, direction)) = movement(code) {
        return Some(if pressed {
            Action::Move { axis, direction }
        } else {
            Action::Stop(axis)
        });
    }
    match code {
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Action::Boost(pressed)),
        _ if !pressed || repeat => None,
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(Action::ToggleLight(0)),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(Action::ToggleLight(1)),
        KeyCode::F11 => Some(Action::ToggleFullscreen),
        KeyCode::F4 if modifiers.alt_key() => Some(Action::Quit),
        _ => None,
    }
}

/// Wheel notches of a scroll event, one per event regardless of the
/// platform's line or pixel units. Positive zooms in.
pub fn wheel_steps(delta: MouseScrollDelta) -> f32 {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32,
    };
    if y == 0.0 { 0.0 } else { y.signum() }
}
