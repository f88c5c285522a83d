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

use super::{Event, EventKind};
use std::collections::HashMap;

/// A callback invoked for every dispatched event of a subscribed kind.
pub type EventCallback = Box<dyn FnMut(&Event)>;

/// Registry mapping an [`EventKind`] to an ordered list of callbacks.
///
/// Delivery order equals subscription order; this is a contract, not an
/// implementation detail. The dispatcher is single-threaded: `dispatch`
/// runs every matching callback synchronously on the calling thread before
/// returning. Panics raised by a callback are not caught here.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: HashMap<EventKind, Vec<EventCallback>>,
}

impl EventDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` under `kind`.
    ///
    /// Never fails. Subscribing the same closure twice retains both entries
    /// and both are invoked per dispatch.
    pub fn subscribe(&mut self, kind: EventKind, callback: EventCallback) {
        self.subscribers.entry(kind).or_default().push(callback);
    }

    /// Removes the entire callback list for `kind`.
    ///
    /// Unsubscription is coarse-grained: there is no per-callback removal.
    /// Unsubscribing a kind with no entry is a no-op.
    pub fn unsubscribe(&mut self, kind: EventKind) {
        self.subscribers.remove(&kind);
    }

    /// Delivers `event` to every callback subscribed to its kind, in
    /// subscription order, passing each the same shared instance.
    ///
    /// A kind with no subscribers drops the event silently; unhandled event
    /// kinds are not errors.
    pub fn dispatch(&mut self, event: &Event) {
        match self.subscribers.get_mut(&event.kind()) {
            Some(callbacks) => {
                for callback in callbacks.iter_mut() {
                    callback(event);
                }
            }
            None => log::trace!("no subscribers for {:?}, event dropped", event.kind()),
        }
    }

    /// Number of callbacks currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}
