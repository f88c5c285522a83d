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

//! Event system built on the observer pattern.
//!
//! Immutable [`Event`] payloads are produced at the platform boundary,
//! buffered in an [`EventQueue`], and fanned out synchronously by an
//! [`EventDispatcher`] keyed on [`EventKind`]. A second, explicit-lifecycle
//! protocol ([`EventManager`]/[`EventListener`]) exists for code that needs
//! precise control over a single in-flight event rather than global fan-out.

mod dispatcher;
mod listener;
mod queue;

pub use dispatcher::{EventCallback, EventDispatcher};
pub use listener::{EventListener, EventManager, EventSink, ListenerId};
pub use queue::{EventQueue, EventSender};

/// Stable discriminant identifying an event's type.
///
/// This is the dispatch key: subscriptions are registered against a kind,
/// never against a name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The engine finished starting up.
    AppStartup,
    /// The window's inner size changed.
    WindowResize,
    /// The user requested the window to close.
    WindowClose,
    /// A keyboard key changed state.
    KeyPress,
    /// A mouse button changed state.
    MouseButtonPress,
    /// The mouse wheel was scrolled.
    MouseScroll,
    /// The mouse cursor moved.
    MouseMove,
}

/// The press/release state carried by key and mouse button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// The key or button went down.
    Press,
    /// The key or button went up.
    Release,
}

/// A mouse button, backend-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// An immutable record of something that happened.
///
/// Events are constructed at the platform-callback boundary, read-only
/// afterwards, and dropped once dispatch completes. Every variant maps to
/// exactly one [`EventKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The engine finished starting up.
    AppStartup,
    /// The window's inner size changed.
    WindowResize {
        /// New inner width in physical pixels.
        width: u32,
        /// New inner height in physical pixels.
        height: u32,
    },
    /// The user requested the window to close.
    WindowClose,
    /// A keyboard key changed state.
    KeyPress {
        /// Platform scancode of the key.
        keycode: i32,
        /// Whether the key went down or up.
        action: InputAction,
    },
    /// A mouse button changed state.
    MouseButtonPress {
        /// The button that changed state.
        button: MouseButton,
        /// Whether the button went down or up.
        action: InputAction,
    },
    /// The mouse wheel was scrolled.
    MouseScroll {
        /// Horizontal scroll offset.
        x_offset: f64,
        /// Vertical scroll offset.
        y_offset: f64,
    },
    /// The mouse cursor moved.
    MouseMove {
        /// New cursor x position.
        x: f64,
        /// New cursor y position.
        y: f64,
    },
}

impl Event {
    /// Returns the stable discriminant used as the dispatch key.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AppStartup => EventKind::AppStartup,
            Event::WindowResize { .. } => EventKind::WindowResize,
            Event::WindowClose => EventKind::WindowClose,
            Event::KeyPress { .. } => EventKind::KeyPress,
            Event::MouseButtonPress { .. } => EventKind::MouseButtonPress,
            Event::MouseScroll { .. } => EventKind::MouseScroll,
            Event::MouseMove { .. } => EventKind::MouseMove,
        }
    }
}
