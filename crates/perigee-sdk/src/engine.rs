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

use perigee_core::event::{Event, EventDispatcher, EventQueue, EventSender};
use perigee_core::layer::{LayerHandle, LayerStack};
use perigee_core::renderer::RenderContext;
use perigee_core::EngineContext;

/// Hooks around the UI render pass, for an immediate-mode UI backend to
/// open and close its per-frame recording.
pub trait UiFrameHooks {
    /// Called before any layer's UI hook runs.
    fn begin_frame(&mut self, _ctx: &EngineContext) {}
    /// Called after every layer's UI hook has run.
    fn end_frame(&mut self, _ctx: &EngineContext) {}
}

/// The running engine: layer stack, event queue, and render context,
/// advanced one [`Engine::frame`] at a time by the application shell.
pub struct Engine {
    layers: LayerStack,
    queue: EventQueue,
    context: EngineContext,
    ui: Option<Box<dyn UiFrameHooks>>,
}

impl Engine {
    /// Builds an engine around the selected render backend.
    pub fn new(gfx: RenderContext) -> Self {
        let queue = EventQueue::new(EventDispatcher::new());
        let context = EngineContext::new(gfx, queue.sender());
        Self {
            layers: LayerStack::new(),
            queue,
            context,
            ui: None,
        }
    }

    /// The engine services handed to layer hooks.
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// The render command façade.
    pub fn gfx(&self) -> &RenderContext {
        self.context.gfx()
    }

    /// A clonable producer handle into the event queue.
    pub fn events(&self) -> EventSender {
        self.queue.sender()
    }

    /// The dispatcher the queue drains into, for subscriptions.
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        self.queue.dispatcher_mut()
    }

    /// Installs the UI frame hooks wrapping the UI render pass.
    pub fn set_ui_hooks(&mut self, hooks: Box<dyn UiFrameHooks>) {
        self.ui = Some(hooks);
    }

    /// Pushes `layer` into the layer region.
    pub fn push_layer(&mut self, layer: LayerHandle) {
        self.layers.push_layer(layer);
    }

    /// Removes `layer` from the layer region.
    pub fn pop_layer(&mut self, layer: &LayerHandle) {
        self.layers.pop_layer(layer);
    }

    /// Pushes `overlay` above every layer.
    pub fn push_overlay(&mut self, overlay: LayerHandle) {
        self.layers.push_overlay(overlay);
    }

    /// Removes `overlay` from the overlay region.
    pub fn pop_overlay(&mut self, overlay: &LayerHandle) {
        self.layers.pop_overlay(overlay);
    }

    /// Runs one frame: drain and dispatch queued events, update every
    /// layer bottom-to-top, run the UI pass, present.
    pub fn frame(&mut self) {
        let Engine {
            layers,
            queue,
            context,
            ui,
        } = self;

        queue.process_with(|event| {
            for layer in layers.iter() {
                layer.borrow_mut().on_event(event);
            }
        });

        context.gfx().clear();
        for layer in layers.iter() {
            layer.borrow_mut().on_update(context);
        }

        // The UI pass runs every frame; hooks only bracket it when an
        // immediate-mode backend installed them.
        if let Some(hooks) = ui.as_deref_mut() {
            hooks.begin_frame(context);
        }
        for layer in layers.iter() {
            layer.borrow_mut().on_ui_render(context);
        }
        if let Some(hooks) = ui.as_deref_mut() {
            hooks.end_frame(context);
        }

        context.gfx().present();
    }

    /// Queues `event` for the next frame's drain.
    pub fn send_event(&self, event: Event) {
        self.context.send_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perigee_core::layer::Layer;
    use perigee_core::math::{LinearRgba, Mat4, Vec3};
    use perigee_core::renderer::{
        BoolFlag, BufferId, DrawMode, FramebufferId, FramebufferTarget, GraphicsBackendKind,
        NumericType, PolygonMode, ProgramId, RenderApi, ShaderId, TextureFormat, TextureId,
        TextureParameter, TextureParameterName, TextureTarget, TextureUnit, VertexArrayId,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts frame-boundary calls, everything else is a no-op.
    #[derive(Debug, Default)]
    struct NullRenderApi {
        clears: AtomicUsize,
        presents: AtomicUsize,
    }

    impl RenderApi for NullRenderApi {
        fn backend_kind(&self) -> GraphicsBackendKind {
            GraphicsBackendKind::None
        }
        fn set_viewport(&self, _: u32, _: u32) {}
        fn set_clear_color(&self, _: LinearRgba) {}
        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::Relaxed);
        }
        fn present(&self) {
            self.presents.fetch_add(1, Ordering::Relaxed);
        }
        fn compile_vertex_shader(&self, _: &str) -> ShaderId {
            ShaderId(0)
        }
        fn compile_fragment_shader(&self, _: &str) -> ShaderId {
            ShaderId(0)
        }
        fn link_program(&self, _: ShaderId, _: ShaderId) -> ProgramId {
            ProgramId(0)
        }
        fn use_program(&self, _: ProgramId) {}
        fn create_vertex_array(&self) -> VertexArrayId {
            VertexArrayId(0)
        }
        fn bind_vertex_array(&self, _: VertexArrayId) {}
        fn create_vertex_buffer(&self, _: &[f32]) -> BufferId {
            BufferId(0)
        }
        fn bind_vertex_buffer(&self, _: BufferId) {}
        fn create_element_buffer(&self, _: &[u32]) -> BufferId {
            BufferId(0)
        }
        fn set_vertex_attribute(
            &self,
            _: u32,
            _: i32,
            _: NumericType,
            _: BoolFlag,
            _: usize,
            _: usize,
        ) {
        }
        fn set_uniform_bool(&self, _: ProgramId, _: &str, _: bool) {}
        fn set_uniform_int(&self, _: ProgramId, _: &str, _: i32) {}
        fn set_uniform_float(&self, _: ProgramId, _: &str, _: f32) {}
        fn set_uniform_vec3(&self, _: ProgramId, _: &str, _: Vec3) {}
        fn set_uniform_mat4(&self, _: ProgramId, _: &str, _: Mat4) {}
        fn draw_indexed(&self, _: ProgramId, _: VertexArrayId, _: usize) {}
        fn draw_arrays(&self, _: DrawMode, _: i32, _: i32) {}
        fn create_texture(&self) -> TextureId {
            TextureId(0)
        }
        fn bind_texture(&self, _: TextureUnit, _: TextureTarget, _: TextureId) {}
        fn set_texture_parameter(
            &self,
            _: TextureTarget,
            _: TextureParameterName,
            _: TextureParameter,
        ) {
        }
        #[allow(clippy::too_many_arguments)]
        fn upload_texture(
            &self,
            _: TextureTarget,
            _: u32,
            _: TextureFormat,
            _: u32,
            _: u32,
            _: TextureFormat,
            _: NumericType,
            _: &[u8],
        ) {
        }
        fn enable_blending(&self) {}
        fn disable_blending(&self) {}
        fn enable_depth_testing(&self) {}
        fn enable_depth_mask(&self) {}
        fn disable_depth_mask(&self) {}
        fn enable_face_culling(&self) {}
        fn disable_face_culling(&self) {}
        fn set_polygon_mode(&self, _: PolygonMode) {}
        fn create_framebuffer(&self, _: u32, _: u32) -> FramebufferTarget {
            FramebufferTarget {
                framebuffer: FramebufferId(0),
                color_texture: TextureId(0),
                depth_texture: TextureId(0),
                quad_vertex_array: VertexArrayId(0),
                quad_vertex_buffer: BufferId(0),
            }
        }
        fn bind_framebuffer(&self, _: Option<FramebufferId>) {}
        fn rescale_framebuffer(&self, _: FramebufferId, _: u32, _: u32) {}
        fn draw_framebuffer(&self, _: ProgramId, _: VertexArrayId, _: TextureId) {}
        fn cleanup(&self, _: VertexArrayId, _: BufferId, _: ProgramId) {}
    }

    #[derive(Default)]
    struct CountingLayer {
        updates: usize,
        ui_renders: usize,
        events: Vec<Event>,
    }

    impl Layer for CountingLayer {
        fn name(&self) -> &str {
            "counting"
        }
        fn on_update(&mut self, _ctx: &EngineContext) {
            self.updates += 1;
        }
        fn on_ui_render(&mut self, _ctx: &EngineContext) {
            self.ui_renders += 1;
        }
        fn on_event(&mut self, event: &Event) {
            self.events.push(event.clone());
        }
    }

    fn engine_with_null_backend() -> (Engine, Arc<NullRenderApi>) {
        let api = Arc::new(NullRenderApi::default());
        let engine = Engine::new(RenderContext::new(api.clone()));
        (engine, api)
    }

    #[test]
    fn frame_clears_updates_and_presents() {
        let (mut engine, api) = engine_with_null_backend();
        let layer = Rc::new(RefCell::new(CountingLayer::default()));
        engine.push_layer(layer.clone());

        engine.frame();
        engine.frame();

        assert_eq!(layer.borrow().updates, 2);
        // The UI pass runs even when no hooks are installed.
        assert_eq!(layer.borrow().ui_renders, 2);
        assert_eq!(api.clears.load(Ordering::Relaxed), 2);
        assert_eq!(api.presents.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn queued_events_reach_every_layer_next_frame() {
        let (mut engine, _api) = engine_with_null_backend();
        let bottom = Rc::new(RefCell::new(CountingLayer::default()));
        let top = Rc::new(RefCell::new(CountingLayer::default()));
        engine.push_layer(bottom.clone());
        engine.push_overlay(top.clone());

        engine.send_event(Event::WindowResize {
            width: 640,
            height: 480,
        });
        assert!(bottom.borrow().events.is_empty());

        engine.frame();

        assert_eq!(bottom.borrow().events.len(), 1);
        assert_eq!(top.borrow().events.len(), 1);
        assert_eq!(
            bottom.borrow().events[0],
            Event::WindowResize {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn dispatcher_subscriptions_fire_during_frame() {
        let (mut engine, _api) = engine_with_null_backend();
        let seen = Rc::new(RefCell::new(0u32));
        let seen_clone = seen.clone();
        engine.dispatcher_mut().subscribe(
            perigee_core::event::EventKind::AppStartup,
            Box::new(move |_| *seen_clone.borrow_mut() += 1),
        );

        engine.send_event(Event::AppStartup);
        engine.frame();

        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn ui_hooks_wrap_the_ui_pass() {
        struct OrderedHooks {
            log: Rc<RefCell<Vec<&'static str>>>,
        }
        impl UiFrameHooks for OrderedHooks {
            fn begin_frame(&mut self, _ctx: &EngineContext) {
                self.log.borrow_mut().push("begin");
            }
            fn end_frame(&mut self, _ctx: &EngineContext) {
                self.log.borrow_mut().push("end");
            }
        }

        struct LoggingLayer {
            log: Rc<RefCell<Vec<&'static str>>>,
        }
        impl Layer for LoggingLayer {
            fn name(&self) -> &str {
                "logging"
            }
            fn on_ui_render(&mut self, _ctx: &EngineContext) {
                self.log.borrow_mut().push("ui");
            }
        }

        let (mut engine, _api) = engine_with_null_backend();
        let log = Rc::new(RefCell::new(Vec::new()));
        engine.set_ui_hooks(Box::new(OrderedHooks { log: log.clone() }));
        engine.push_layer(Rc::new(RefCell::new(LoggingLayer { log: log.clone() })));

        engine.frame();

        assert_eq!(*log.borrow(), vec!["begin", "ui", "end"]);
    }

    #[test]
    fn popped_layer_no_longer_updates() {
        let (mut engine, _api) = engine_with_null_backend();
        let layer = Rc::new(RefCell::new(CountingLayer::default()));
        let handle: LayerHandle = layer.clone();
        engine.push_layer(handle.clone());

        engine.frame();
        engine.pop_layer(&handle);
        engine.frame();

        assert_eq!(layer.borrow().updates, 1);
    }
}
