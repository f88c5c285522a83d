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

use super::LayerHandle;
use std::rc::Rc;

/// Ordered container of layer handles split into two sub-regions.
///
/// Elements `[0, boundary)` are ordinary layers, inserted at the moving
/// boundary and traversed first; elements `[boundary, len)` are overlays,
/// appended at the end and traversed last (typically diagnostic or UI
/// panels). The frame loop walks the full sequence front-to-back, once for
/// the update pass and once for the UI pass.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<LayerHandle>,
    boundary: usize,
}

impl LayerStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `layer` at the layer/overlay boundary and fires `on_attach`.
    pub fn push_layer(&mut self, layer: LayerHandle) {
        log::debug!("pushing layer '{}'", layer.borrow().name());
        self.layers.insert(self.boundary, layer.clone());
        self.boundary += 1;
        layer.borrow_mut().on_attach();
    }

    /// Removes `layer` from the layer sub-region, firing `on_detach`.
    ///
    /// Only `[0, boundary)` is searched; a handle not present there leaves
    /// the stack unchanged.
    pub fn pop_layer(&mut self, layer: &LayerHandle) {
        let found = self.layers[..self.boundary]
            .iter()
            .position(|entry| Rc::ptr_eq(entry, layer));
        match found {
            Some(index) => {
                log::debug!("popping layer '{}'", layer.borrow().name());
                let removed = self.layers.remove(index);
                self.boundary -= 1;
                removed.borrow_mut().on_detach();
            }
            None => log::trace!("pop of layer not in stack ignored"),
        }
    }

    /// Appends `overlay` after all layers and fires `on_attach`.
    ///
    /// The boundary does not move: overlays never displace layers.
    pub fn push_overlay(&mut self, overlay: LayerHandle) {
        log::debug!("pushing overlay '{}'", overlay.borrow().name());
        self.layers.push(overlay.clone());
        overlay.borrow_mut().on_attach();
    }

    /// Removes `overlay` from the overlay sub-region, firing `on_detach`.
    ///
    /// Only `[boundary, len)` is searched; a handle not present there
    /// leaves the stack unchanged.
    pub fn pop_overlay(&mut self, overlay: &LayerHandle) {
        let found = self.layers[self.boundary..]
            .iter()
            .position(|entry| Rc::ptr_eq(entry, overlay));
        match found {
            Some(offset) => {
                log::debug!("popping overlay '{}'", overlay.borrow().name());
                let removed = self.layers.remove(self.boundary + offset);
                removed.borrow_mut().on_detach();
            }
            None => log::trace!("pop of overlay not in stack ignored"),
        }
    }

    /// Full sequence front-to-back: layers first, then overlays.
    pub fn iter(&self) -> impl Iterator<Item = &LayerHandle> {
        self.layers.iter()
    }

    /// Total number of resident layers and overlays.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack holds no layers at all.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct TestLayer {
        name: String,
        attached: bool,
        detach_count: u32,
    }

    impl TestLayer {
        fn handle(name: &str) -> Rc<RefCell<TestLayer>> {
            Rc::new(RefCell::new(TestLayer {
                name: name.to_string(),
                attached: false,
                detach_count: 0,
            }))
        }
    }

    impl Layer for TestLayer {
        fn name(&self) -> &str {
            &self.name
        }
        fn on_attach(&mut self) {
            self.attached = true;
        }
        fn on_detach(&mut self) {
            self.attached = false;
            self.detach_count += 1;
        }
    }

    fn names(stack: &LayerStack) -> Vec<String> {
        stack
            .iter()
            .map(|layer| layer.borrow().name().to_string())
            .collect()
    }

    #[test]
    fn layers_traverse_before_overlays() {
        let mut stack = LayerStack::new();
        let overlay = TestLayer::handle("overlay");
        let layer = TestLayer::handle("layer");

        stack.push_overlay(overlay);
        stack.push_layer(layer);

        assert_eq!(names(&stack), vec!["layer", "overlay"]);
    }

    #[test]
    fn layers_keep_push_order_within_their_region() {
        let mut stack = LayerStack::new();
        let a = TestLayer::handle("a");
        let b = TestLayer::handle("b");
        let overlay = TestLayer::handle("overlay");

        stack.push_layer(a);
        stack.push_overlay(overlay);
        stack.push_layer(b);

        assert_eq!(names(&stack), vec!["a", "b", "overlay"]);
    }

    #[test]
    fn push_fires_attach_and_pop_fires_detach() {
        let mut stack = LayerStack::new();
        let layer = TestLayer::handle("a");
        let handle: LayerHandle = layer.clone();

        stack.push_layer(handle.clone());
        assert!(layer.borrow().attached);

        stack.pop_layer(&handle);
        assert!(!layer.borrow().attached);
        assert_eq!(layer.borrow().detach_count, 1);
    }

    #[test]
    fn popping_an_absent_layer_leaves_the_stack_unchanged() {
        let mut stack = LayerStack::new();
        let resident = TestLayer::handle("resident");
        let stranger: LayerHandle = TestLayer::handle("stranger");

        stack.push_layer(resident);
        stack.pop_layer(&stranger);

        assert_eq!(names(&stack), vec!["resident"]);
    }

    #[test]
    fn pop_layer_then_traversal_shows_the_remainder() {
        let mut stack = LayerStack::new();
        let a: LayerHandle = TestLayer::handle("a");
        let b = TestLayer::handle("b");

        stack.push_layer(a.clone());
        stack.push_overlay(b);
        assert_eq!(names(&stack), vec!["a", "b"]);

        stack.pop_layer(&a);
        assert_eq!(names(&stack), vec!["b"]);
    }

    #[test]
    fn pop_overlay_finds_overlays() {
        let mut stack = LayerStack::new();
        let layer = TestLayer::handle("layer");
        let overlay = TestLayer::handle("overlay");
        let overlay_handle: LayerHandle = overlay.clone();

        stack.push_layer(layer);
        stack.push_overlay(overlay_handle.clone());
        stack.pop_overlay(&overlay_handle);

        assert_eq!(names(&stack), vec!["layer"]);
        assert_eq!(overlay.borrow().detach_count, 1);
    }

    #[test]
    fn pop_overlay_never_removes_from_the_layer_region() {
        let mut stack = LayerStack::new();
        let layer: LayerHandle = TestLayer::handle("layer");

        stack.push_layer(layer.clone());
        stack.pop_overlay(&layer);

        assert_eq!(names(&stack), vec!["layer"]);
    }

    #[test]
    fn pop_layer_never_removes_from_the_overlay_region() {
        let mut stack = LayerStack::new();
        let overlay: LayerHandle = TestLayer::handle("overlay");

        stack.push_overlay(overlay.clone());
        stack.pop_layer(&overlay);

        assert_eq!(names(&stack), vec!["overlay"]);
    }

    #[test]
    fn boundary_survives_interleaved_pushes_and_pops() {
        let mut stack = LayerStack::new();
        let a: LayerHandle = TestLayer::handle("a");
        let b: LayerHandle = TestLayer::handle("b");
        let o1: LayerHandle = TestLayer::handle("o1");
        let o2: LayerHandle = TestLayer::handle("o2");

        stack.push_layer(a.clone());
        stack.push_overlay(o1);
        stack.push_layer(b);
        stack.push_overlay(o2);
        assert_eq!(names(&stack), vec!["a", "b", "o1", "o2"]);

        stack.pop_layer(&a);
        let c: LayerHandle = TestLayer::handle("c");
        stack.push_layer(c);
        assert_eq!(names(&stack), vec!["b", "c", "o1", "o2"]);
    }
}
