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

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;

/// Combines the raw-window-handle traits a graphics backend needs into one
/// object-safe trait.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// A shareable handle a backend can create a presentation surface from.
pub type PlatformWindowHandle = Arc<dyn WindowHandle + Send + Sync>;

/// Behavior of a native window, independent of the windowing library.
///
/// Any windowing backend (winit, SDL, ...) can implement this to host the
/// engine.
pub trait PlatformWindow: HasWindowHandle + HasDisplayHandle + Send + Sync {
    /// Physical dimensions (width, height) of the window's inner area.
    fn inner_size(&self) -> (u32, u32);

    /// The window's scale factor.
    fn scale_factor(&self) -> f64;

    /// Requests that the window be redrawn.
    fn request_redraw(&self);

    /// Clones a shareable handle so the renderer can create a surface.
    fn clone_handle_arc(&self) -> PlatformWindowHandle;

    /// Unique identifier for the window.
    fn id(&self) -> u64;
}
