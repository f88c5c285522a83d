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

use super::{Event, EventDispatcher};

/// A cheap, clonable producer handle to an [`EventQueue`].
///
/// Platform callbacks hold one of these and enqueue from wherever they run
/// (typically inside a blocking poll call) without touching the consumer side.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: flume::Sender<Event>,
}

impl EventSender {
    /// Appends `event` at the tail of the queue.
    ///
    /// A send failure means the queue itself is gone; that is logged at
    /// error level and otherwise ignored.
    pub fn send(&self, event: Event) {
        log::trace!("enqueueing {:?}", event.kind());
        if let Err(e) = self.inner.send(event) {
            log::error!("failed to enqueue event: {e}. Queue likely dropped.");
        }
    }
}

/// FIFO buffer decoupling event producers from the frame loop.
///
/// Producers enqueue at arbitrary times through [`EventSender`] handles; the
/// frame loop drains the queue at one controlled point per frame via
/// [`EventQueue::process`]. The queue owns the [`EventDispatcher`] that fans
/// each drained event out to subscribers.
pub struct EventQueue {
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
    dispatcher: EventDispatcher,
}

impl EventQueue {
    /// Creates an empty queue wired to `dispatcher`.
    pub fn new(dispatcher: EventDispatcher) -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!("EventQueue initialized.");
        Self {
            sender,
            receiver,
            dispatcher,
        }
    }

    /// Returns a new producer handle.
    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: self.sender.clone(),
        }
    }

    /// Appends `event` at the tail.
    pub fn enqueue(&self, event: Event) {
        self.sender().send(event);
    }

    /// Pops and dispatches events until the queue is empty.
    ///
    /// The drain is re-entrant: events enqueued *during* processing (by a
    /// callback holding an [`EventSender`]) are drained within the same
    /// call, so no event is ever deferred past this processing point. There
    /// is no cycle detection; a handler that enqueues unboundedly is a
    /// caller bug, not a defended-against condition.
    pub fn process(&mut self) {
        self.process_with(|_| {});
    }

    /// Like [`EventQueue::process`], additionally handing each drained event
    /// to `each` after its dispatch completes.
    ///
    /// The frame loop uses this to forward raw events to layers that opted
    /// into the raw-event hook.
    pub fn process_with<F>(&mut self, mut each: F)
    where
        F: FnMut(&Event),
    {
        while let Ok(event) = self.receiver.try_recv() {
            self.dispatcher.dispatch(&event);
            each(&event);
        }
    }

    /// Returns `true` when no events are pending.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Shared access to the owned dispatcher.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Mutable access to the owned dispatcher, for subscribing.
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(EventDispatcher::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn process_drains_in_fifo_order() {
        let mut queue = EventQueue::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        queue.dispatcher_mut().subscribe(
            EventKind::MouseMove,
            Box::new(move |event| {
                if let Event::MouseMove { x, .. } = *event {
                    sink.borrow_mut().push(x);
                }
            }),
        );

        queue.enqueue(Event::MouseMove { x: 1.0, y: 0.0 });
        queue.enqueue(Event::MouseMove { x: 2.0, y: 0.0 });
        queue.enqueue(Event::MouseMove { x: 3.0, y: 0.0 });
        queue.process();

        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 3.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn events_enqueued_during_processing_are_drained_in_the_same_call() {
        let mut queue = EventQueue::default();
        let hits = Rc::new(RefCell::new(0));

        let sender = queue.sender();
        let sink = hits.clone();
        queue.dispatcher_mut().subscribe(
            EventKind::WindowClose,
            Box::new(move |_| {
                let mut hits = sink.borrow_mut();
                *hits += 1;
                // First delivery re-enqueues once; the drain must pick it up.
                if *hits == 1 {
                    sender.send(Event::WindowClose);
                }
            }),
        );

        queue.enqueue(Event::WindowClose);
        queue.process();

        assert_eq!(*hits.borrow(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn process_on_an_empty_queue_is_a_no_op() {
        let mut queue = EventQueue::default();
        queue.process();
        assert!(queue.is_empty());
    }

    #[test]
    fn process_with_hands_each_event_over_after_dispatch() {
        let mut queue = EventQueue::default();
        let forwarded = Rc::new(RefCell::new(Vec::new()));

        queue.enqueue(Event::AppStartup);
        queue.enqueue(Event::WindowClose);

        let sink = forwarded.clone();
        queue.process_with(|event| sink.borrow_mut().push(event.kind()));

        assert_eq!(
            *forwarded.borrow(),
            vec![EventKind::AppStartup, EventKind::WindowClose]
        );
    }
}
