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

//! The attach/detach event protocol.
//!
//! Unlike the dispatcher's global fan-out, this variant gives editor-side
//! code explicit lifecycle control over one in-flight event: a listener
//! attaches to a manager, receives deliveries while attached, and detaches
//! when done. Lifecycle: Created → Attached → (0..n deliveries) → Detached.

use super::Event;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identity of an attached listener, handed out by [`EventManager::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Receiver side of the attach/detach protocol.
pub trait EventSink {
    /// Called once per [`EventManager::dispatch`] while attached.
    fn on_event(&self, event: &Event);
}

/// Fans a single held event out to all attached listeners, in attach order.
#[derive(Default)]
pub struct EventManager {
    listeners: Vec<(ListenerId, Rc<dyn EventSink>)>,
    next_id: u64,
}

impl EventManager {
    /// Creates a manager with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sink` and returns its identity.
    pub fn attach(&mut self, sink: Rc<dyn EventSink>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, sink));
        id
    }

    /// Removes the listener registered under `id`.
    ///
    /// Detaching an id that is no longer present logs a warning and no-ops;
    /// it never fails.
    pub fn detach(&mut self, id: ListenerId) {
        let before = self.listeners.len();
        self.listeners.retain(|(entry, _)| *entry != id);
        if self.listeners.len() == before {
            log::warn!("detach of unknown listener {id:?} ignored");
        }
    }

    /// Delivers `event` to every attached listener, in attach order.
    ///
    /// Dispatching with zero listeners is a safe no-op; the count is
    /// reported either way.
    pub fn dispatch(&self, event: &Event) {
        log::info!("dispatcher reported {} listeners", self.listeners.len());
        for (_, listener) in &self.listeners {
            listener.on_event(event);
        }
    }

    /// Number of currently attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// A concrete [`EventSink`] that records the last delivered event.
///
/// Constructed attached; [`EventListener::detach`] clears the held event and
/// removes the listener from the manager.
pub struct EventListener {
    id: Cell<Option<ListenerId>>,
    last_event: RefCell<Option<Event>>,
}

impl EventListener {
    /// Creates a listener and attaches it to `manager`.
    pub fn attach(manager: &mut EventManager) -> Rc<Self> {
        let listener = Rc::new(Self {
            id: Cell::new(None),
            last_event: RefCell::new(None),
        });
        let id = manager.attach(listener.clone());
        listener.id.set(Some(id));
        listener
    }

    /// Clears the held event and removes this listener from `manager`.
    ///
    /// Detaching twice logs and no-ops.
    pub fn detach(&self, manager: &mut EventManager) {
        match self.id.take() {
            Some(id) => {
                self.last_event.borrow_mut().take();
                manager.detach(id);
            }
            None => log::warn!("listener already detached"),
        }
    }

    /// Whether the listener is currently attached.
    pub fn is_attached(&self) -> bool {
        self.id.get().is_some()
    }

    /// The most recently delivered event, if any.
    pub fn last_event(&self) -> Option<Event> {
        self.last_event.borrow().clone()
    }
}

impl EventSink for EventListener {
    fn on_event(&self, event: &Event) {
        log::info!("event triggered: {:?}", event.kind());
        *self.last_event.borrow_mut() = Some(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_dispatch_detach_cycle() {
        let mut manager = EventManager::new();
        let listener = EventListener::attach(&mut manager);
        assert!(listener.is_attached());
        assert_eq!(manager.listener_count(), 1);

        manager.dispatch(&Event::AppStartup);
        assert_eq!(listener.last_event(), Some(Event::AppStartup));

        listener.detach(&mut manager);
        assert!(!listener.is_attached());
        assert_eq!(manager.listener_count(), 0);
        assert_eq!(listener.last_event(), None);
    }

    #[test]
    fn detaching_twice_is_a_safe_no_op() {
        let mut manager = EventManager::new();
        let listener = EventListener::attach(&mut manager);
        listener.detach(&mut manager);
        listener.detach(&mut manager);
        assert_eq!(manager.listener_count(), 0);
    }

    #[test]
    fn dispatch_with_zero_listeners_does_not_fail() {
        let manager = EventManager::new();
        manager.dispatch(&Event::WindowClose);
    }

    #[test]
    fn detached_listeners_receive_no_further_deliveries() {
        let mut manager = EventManager::new();
        let staying = EventListener::attach(&mut manager);
        let leaving = EventListener::attach(&mut manager);

        leaving.detach(&mut manager);
        manager.dispatch(&Event::WindowClose);

        assert_eq!(staying.last_event(), Some(Event::WindowClose));
        assert_eq!(leaving.last_event(), None);
    }

    #[test]
    fn deliveries_follow_attach_order() {
        use std::cell::RefCell;

        struct Recorder {
            tag: u32,
            order: Rc<RefCell<Vec<u32>>>,
        }
        impl EventSink for Recorder {
            fn on_event(&self, _event: &Event) {
                self.order.borrow_mut().push(self.tag);
            }
        }

        let mut manager = EventManager::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            manager.attach(Rc::new(Recorder {
                tag,
                order: order.clone(),
            }));
        }

        manager.dispatch(&Event::AppStartup);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
