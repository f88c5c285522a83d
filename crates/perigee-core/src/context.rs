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

//! The per-frame context handed to layers.

use crate::event::{Event, EventSender};
use crate::renderer::RenderContext;

/// Engine services a layer may use during its update and UI hooks.
///
/// Explicitly threaded through every hook instead of living in globals, so
/// each layer's dependencies are visible at its signature.
#[derive(Clone)]
pub struct EngineContext {
    gfx: RenderContext,
    events: EventSender,
}

impl EngineContext {
    /// Bundles the live render context and an event producer handle.
    pub fn new(gfx: RenderContext, events: EventSender) -> Self {
        Self { gfx, events }
    }

    /// The render command façade over the selected backend.
    pub fn gfx(&self) -> &RenderContext {
        &self.gfx
    }

    /// Queues `event` for dispatch on the next frame's drain.
    pub fn send_event(&self, event: Event) {
        self.events.send(event);
    }
}
