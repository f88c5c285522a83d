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

//! Opaque resource handles crossing the render command boundary.
//!
//! Handles are owned by whichever call site created them; the command layer
//! does not track their lifetime. Callers must pass every handle back
//! unchanged to the matching cleanup operation.

macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// The raw integer value of this handle.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_handle!(
    /// A compiled shader stage.
    ShaderId
);
define_handle!(
    /// A linked shader program.
    ProgramId
);
define_handle!(
    /// A vertex or element buffer.
    BufferId
);
define_handle!(
    /// A vertex array: buffer bindings plus attribute layout.
    VertexArrayId
);
define_handle!(
    /// A texture object.
    TextureId
);
define_handle!(
    /// An off-screen framebuffer object.
    FramebufferId
);

/// The resources making up one off-screen render target.
///
/// Created as a unit at a fixed size and rescaled in place on resize: the
/// handles stay stable, only the underlying storage changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferTarget {
    /// The framebuffer object itself.
    pub framebuffer: FramebufferId,
    /// Color attachment, sampleable when compositing.
    pub color_texture: TextureId,
    /// Depth attachment.
    pub depth_texture: TextureId,
    /// Fullscreen-quad vertex array for the composite pass.
    pub quad_vertex_array: VertexArrayId,
    /// Backing buffer of the fullscreen quad.
    pub quad_vertex_buffer: BufferId,
}
