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

//! Layers: polymorphic units of per-frame behavior, and the stack that
//! orders them.

mod stack;

pub use stack::LayerStack;

use crate::context::EngineContext;
use crate::event::Event;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared-ownership handle to a layer.
///
/// The stack holds one reference; external code that needs to configure a
/// layer after insertion holds another to the same underlying object. Handle
/// identity (`Rc::ptr_eq`) is what the stack's pop operations match on.
pub type LayerHandle = Rc<RefCell<dyn Layer>>;

/// A unit of per-frame behavior with a defined lifecycle.
///
/// Hooks fire in a fixed order: `on_attach` once when pushed, then per frame
/// `on_update` for every resident layer followed by `on_ui_render` for every
/// resident layer (the UI pass is bracketed by the frame loop's UI begin/end),
/// then `on_detach` once when popped. All hooks default to no-ops.
pub trait Layer {
    /// Human-readable name, for diagnostics only.
    fn name(&self) -> &str;

    /// Called once when the layer is pushed onto the stack.
    fn on_attach(&mut self) {}

    /// Called once when the layer is popped from the stack.
    fn on_detach(&mut self) {}

    /// Per-frame update pass.
    fn on_update(&mut self, _ctx: &EngineContext) {}

    /// Per-frame UI render pass, after every layer has updated.
    fn on_ui_render(&mut self, _ctx: &EngineContext) {}

    /// Optional raw-event hook, fed each event the frame loop drains.
    fn on_event(&mut self, _event: &Event) {}
}
