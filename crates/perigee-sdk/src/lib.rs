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

//! The public-facing SDK for the Perigee engine: a stable API for
//! applications to stack layers, subscribe to events, and run the main
//! loop against the selected graphics backend.

#![warn(missing_docs)]

mod engine;

pub use engine::{Engine, UiFrameHooks};

/// Commonly used types, re-exported for application code.
pub mod prelude {
    pub use perigee_core::event::{
        Event, EventDispatcher, EventKind, EventQueue, EventSender, InputAction, MouseButton,
    };
    pub use perigee_core::layer::{Layer, LayerHandle, LayerStack};
    pub use perigee_core::math::{LinearRgba, Mat4, Vec3};
    pub use perigee_core::renderer::{GraphicsBackendKind, RenderContext};
    pub use perigee_core::EngineContext;

    pub use crate::engine::{Engine, UiFrameHooks};
}

use anyhow::Result;
use perigee_core::event::{Event, EventKind};
use perigee_core::platform::PlatformWindow;
use perigee_core::renderer::{GraphicsBackendKind, RenderApi, RenderContext, RenderError};
use perigee_infra::graphics::WgpuRenderApi;
use perigee_infra::platform::{translate_window_event, WinitWindow, WinitWindowBuilder};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

/// Startup configuration for [`run`].
pub struct EngineConfig {
    /// Window title.
    pub title: String,
    /// Initial inner window width.
    pub width: u32,
    /// Initial inner window height.
    pub height: u32,
    /// Which graphics backend to boot. Selecting
    /// [`GraphicsBackendKind::None`] is a fatal configuration error.
    pub backend: GraphicsBackendKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Perigee".to_string(),
            width: 1280,
            height: 720,
            backend: GraphicsBackendKind::Wgpu,
        }
    }
}

/// Instantiates the configured backend against `window`.
fn create_backend(
    kind: GraphicsBackendKind,
    window: &WinitWindow,
) -> Result<Arc<dyn RenderApi>, RenderError> {
    match kind {
        GraphicsBackendKind::None => Err(RenderError::NoBackendSelected),
        GraphicsBackendKind::Wgpu => {
            let api = WgpuRenderApi::new(window.clone_handle_arc(), window.inner_size())?;
            Ok(Arc::new(api))
        }
    }
}

/// The winit-driven application state: owns the window and the engine and
/// feeds translated platform events into the engine's queue.
struct AppShell {
    config: EngineConfig,
    setup: Option<Box<dyn FnOnce(&mut Engine)>>,
    window: Option<WinitWindow>,
    engine: Option<Engine>,
}

impl ApplicationHandler for AppShell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return; // Already initialized; a resume cycle must not rebuild.
        }

        log::info!("Application resumed. Initializing window and engine...");

        let window = match WinitWindowBuilder::new()
            .with_title(self.config.title.clone())
            .with_dimensions(self.config.width, self.config.height)
            .build(event_loop)
        {
            Ok(window) => window,
            Err(err) => {
                log::error!("window creation failed: {err}");
                event_loop.exit();
                return;
            }
        };

        let api = match create_backend(self.config.backend, &window) {
            Ok(api) => api,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };

        let mut engine = Engine::new(RenderContext::new(api));

        // The surface follows the window size through the same queue every
        // other consumer uses.
        let resize_gfx = engine.gfx().clone();
        engine.dispatcher_mut().subscribe(
            EventKind::WindowResize,
            Box::new(move |event| {
                if let Event::WindowResize { width, height } = *event {
                    resize_gfx.set_viewport(width, height);
                }
            }),
        );

        if let Some(setup) = self.setup.take() {
            setup(&mut engine);
        }
        engine.send_event(Event::AppStartup);

        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let (Some(window), Some(engine)) = (self.window.as_ref(), self.engine.as_mut()) else {
            return;
        };

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        if window.id() != hasher.finish() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                if let Some(close) = translate_window_event(&event) {
                    engine.send_event(close);
                    engine.frame(); // One last drain so layers observe the close.
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                engine.frame();
            }
            other => {
                if let Some(translated) = translate_window_event(&other) {
                    engine.send_event(translated);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Boots the engine and blocks until the window closes.
///
/// `setup` runs once after the backend is live, with the engine ready for
/// layer pushes and event subscriptions.
pub fn run(config: EngineConfig, setup: impl FnOnce(&mut Engine) + 'static) -> Result<()> {
    let _ = env_logger::Builder::from_default_env().try_init();
    log::info!("Perigee SDK: starting...");

    // Catch the misconfiguration before any platform resources exist.
    if config.backend == GraphicsBackendKind::None {
        return Err(RenderError::NoBackendSelected.into());
    }

    let event_loop = EventLoop::new()?;
    let mut shell = AppShell {
        config,
        setup: Some(Box::new(setup)),
        window: None,
        engine: None,
    };
    event_loop.run_app(&mut shell)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_no_backend_fails_before_the_event_loop() {
        let config = EngineConfig {
            backend: GraphicsBackendKind::None,
            ..Default::default()
        };
        let err = run(config, |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "no graphics backend selected");
    }
}
