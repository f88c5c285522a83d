// Copyright 2025 the Perigee authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Translation from `winit` window events to engine [`Event`]s.
//!
//! This is the platform-callback boundary: raw windowing events become
//! immutable engine payloads here and nowhere else. Events with no engine
//! counterpart translate to `None` and are dropped.

use perigee_core::event::{Event, InputAction, MouseButton};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Translates a `winit::event::WindowEvent` into an engine [`Event`].
///
/// Returns `None` for events the engine does not model (focus changes,
/// IME, key repeats, zero-delta scrolls). `CloseRequested` is deliberately
/// included so the application shell can route shutdown through the same
/// queue as everything else.
pub fn translate_window_event(event: &WindowEvent) -> Option<Event> {
    match event {
        WindowEvent::Resized(size) => Some(Event::WindowResize {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CloseRequested => Some(Event::WindowClose),
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            if let PhysicalKey::Code(keycode) = key_event.physical_key {
                let keycode = keycode_for(keycode);
                match key_event.state {
                    ElementState::Pressed if !key_event.repeat => Some(Event::KeyPress {
                        keycode,
                        action: InputAction::Press,
                    }),
                    ElementState::Released => Some(Event::KeyPress {
                        keycode,
                        action: InputAction::Release,
                    }),
                    _ => None,
                }
            } else {
                None
            }
        }
        WindowEvent::MouseInput { state, button, .. } => Some(Event::MouseButtonPress {
            button: mouse_button_for(*button),
            action: match state {
                ElementState::Pressed => InputAction::Press,
                ElementState::Released => InputAction::Release,
            },
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy): (f64, f64) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                MouseScrollDelta::PixelDelta(pos) => (pos.x, pos.y),
            };
            if dx != 0.0 || dy != 0.0 {
                Some(Event::MouseScroll {
                    x_offset: dx,
                    y_offset: dy,
                })
            } else {
                None
            }
        }
        WindowEvent::CursorMoved { position, .. } => Some(Event::MouseMove {
            x: position.x,
            y: position.y,
        }),
        _ => None,
    }
}

/// Maps a physical key to the engine's numeric keycode.
///
/// Printable keys use their ASCII uppercase value; control and navigation
/// keys use values from 256 up. Keys outside the table report -1.
fn keycode_for(keycode: KeyCode) -> i32 {
    match keycode {
        KeyCode::Space => 32,
        KeyCode::Quote => 39,
        KeyCode::Comma => 44,
        KeyCode::Minus => 45,
        KeyCode::Period => 46,
        KeyCode::Slash => 47,
        KeyCode::Digit0 => 48,
        KeyCode::Digit1 => 49,
        KeyCode::Digit2 => 50,
        KeyCode::Digit3 => 51,
        KeyCode::Digit4 => 52,
        KeyCode::Digit5 => 53,
        KeyCode::Digit6 => 54,
        KeyCode::Digit7 => 55,
        KeyCode::Digit8 => 56,
        KeyCode::Digit9 => 57,
        KeyCode::Semicolon => 59,
        KeyCode::Equal => 61,
        KeyCode::KeyA => 65,
        KeyCode::KeyB => 66,
        KeyCode::KeyC => 67,
        KeyCode::KeyD => 68,
        KeyCode::KeyE => 69,
        KeyCode::KeyF => 70,
        KeyCode::KeyG => 71,
        KeyCode::KeyH => 72,
        KeyCode::KeyI => 73,
        KeyCode::KeyJ => 74,
        KeyCode::KeyK => 75,
        KeyCode::KeyL => 76,
        KeyCode::KeyM => 77,
        KeyCode::KeyN => 78,
        KeyCode::KeyO => 79,
        KeyCode::KeyP => 80,
        KeyCode::KeyQ => 81,
        KeyCode::KeyR => 82,
        KeyCode::KeyS => 83,
        KeyCode::KeyT => 84,
        KeyCode::KeyU => 85,
        KeyCode::KeyV => 86,
        KeyCode::KeyW => 87,
        KeyCode::KeyX => 88,
        KeyCode::KeyY => 89,
        KeyCode::KeyZ => 90,
        KeyCode::BracketLeft => 91,
        KeyCode::Backslash => 92,
        KeyCode::BracketRight => 93,
        KeyCode::Backquote => 96,
        KeyCode::Escape => 256,
        KeyCode::Enter => 257,
        KeyCode::Tab => 258,
        KeyCode::Backspace => 259,
        KeyCode::Insert => 260,
        KeyCode::Delete => 261,
        KeyCode::ArrowRight => 262,
        KeyCode::ArrowLeft => 263,
        KeyCode::ArrowDown => 264,
        KeyCode::ArrowUp => 265,
        KeyCode::PageUp => 266,
        KeyCode::PageDown => 267,
        KeyCode::Home => 268,
        KeyCode::End => 269,
        KeyCode::F1 => 290,
        KeyCode::F2 => 291,
        KeyCode::F3 => 292,
        KeyCode::F4 => 293,
        KeyCode::F5 => 294,
        KeyCode::F6 => 295,
        KeyCode::F7 => 296,
        KeyCode::F8 => 297,
        KeyCode::F9 => 298,
        KeyCode::F10 => 299,
        KeyCode::F11 => 300,
        KeyCode::F12 => 301,
        KeyCode::ShiftLeft => 340,
        KeyCode::ControlLeft => 341,
        KeyCode::AltLeft => 342,
        KeyCode::ShiftRight => 344,
        KeyCode::ControlRight => 345,
        KeyCode::AltRight => 346,
        other => {
            log::trace!("unmapped key {other:?}");
            -1
        }
    }
}

/// Maps a `winit` mouse button to the engine's representation.
fn mouse_button_for(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn resize_carries_physical_dimensions() {
        let event = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            translate_window_event(&event),
            Some(Event::WindowResize {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn close_requested_becomes_window_close() {
        assert_eq!(
            translate_window_event(&WindowEvent::CloseRequested),
            Some(Event::WindowClose)
        );
    }

    #[test]
    fn mouse_press_and_release_translate() {
        let pressed = WindowEvent::MouseInput {
            device_id: winit::event::DeviceId::dummy(),
            state: ElementState::Pressed,
            button: WinitMouseButton::Left,
        };
        assert_eq!(
            translate_window_event(&pressed),
            Some(Event::MouseButtonPress {
                button: MouseButton::Left,
                action: InputAction::Press,
            })
        );

        let released = WindowEvent::MouseInput {
            device_id: winit::event::DeviceId::dummy(),
            state: ElementState::Released,
            button: WinitMouseButton::Right,
        };
        assert_eq!(
            translate_window_event(&released),
            Some(Event::MouseButtonPress {
                button: MouseButton::Right,
                action: InputAction::Release,
            })
        );
    }

    #[test]
    fn cursor_movement_translates() {
        let event = WindowEvent::CursorMoved {
            device_id: winit::event::DeviceId::dummy(),
            position: PhysicalPosition::new(100.5, 200.75),
        };
        assert_eq!(
            translate_window_event(&event),
            Some(Event::MouseMove { x: 100.5, y: 200.75 })
        );
    }

    #[test]
    fn scroll_deltas_translate_in_lines_and_pixels() {
        let lines = WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(-1.0, 2.0),
            phase: winit::event::TouchPhase::Moved,
        };
        assert_eq!(
            translate_window_event(&lines),
            Some(Event::MouseScroll {
                x_offset: -1.0,
                y_offset: 2.0,
            })
        );

        let pixels = WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(5.5, -10.0)),
            phase: winit::event::TouchPhase::Moved,
        };
        assert_eq!(
            translate_window_event(&pixels),
            Some(Event::MouseScroll {
                x_offset: 5.5,
                y_offset: -10.0,
            })
        );
    }

    #[test]
    fn zero_scroll_is_dropped() {
        let event = WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 0.0),
            phase: winit::event::TouchPhase::Moved,
        };
        assert_eq!(translate_window_event(&event), None);
    }

    #[test]
    fn printable_keys_use_ascii_codes() {
        assert_eq!(keycode_for(KeyCode::KeyA), 65);
        assert_eq!(keycode_for(KeyCode::Space), 32);
        assert_eq!(keycode_for(KeyCode::Digit1), 49);
        assert_eq!(keycode_for(KeyCode::Escape), 256);
    }

    #[test]
    fn unmapped_keys_report_negative_one() {
        assert_eq!(keycode_for(KeyCode::NumLock), -1);
    }

    #[test]
    fn focus_changes_are_not_events() {
        assert_eq!(translate_window_event(&WindowEvent::Focused(true)), None);
    }
}
