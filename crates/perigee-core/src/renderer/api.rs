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

use crate::math::{LinearRgba, Mat4, Vec3};
use crate::renderer::enums::{
    BoolFlag, DrawMode, GraphicsBackendKind, NumericType, PolygonMode, TextureFormat,
    TextureParameter, TextureParameterName, TextureTarget, TextureUnit,
};
use crate::renderer::handle::{
    BufferId, FramebufferId, FramebufferTarget, ProgramId, TextureId, VertexArrayId,
};
use crate::renderer::ShaderId;

/// The complete set of graphics operations the engine needs, one per
/// primitive, parameterized by engine enums and opaque handles.
///
/// Exactly one concrete implementation is live per process. A new backend
/// must implement the full set; a partial implementation compiles but
/// silently no-ops on missing operations.
///
/// Resource failures (shader compilation, linking, framebuffer
/// completeness) are logged by the backend and the allocated — possibly
/// non-functional — handle is returned anyway; later operations against
/// such a handle must degrade to no-ops rather than crash. No error values
/// cross this trait.
///
/// Several operations follow a bind-then-modify model: vertex attributes
/// apply to the currently bound vertex array, texture parameters and
/// uploads to the most recently bound texture, and `draw_arrays` to the
/// current program and vertex array state.
pub trait RenderApi: std::fmt::Debug {
    /// Which graphics API this backend targets.
    fn backend_kind(&self) -> GraphicsBackendKind;

    // --- Frame state ---

    /// Resizes the presentation viewport. Zero dimensions are ignored.
    fn set_viewport(&self, width: u32, height: u32);

    /// Sets the color used by [`RenderApi::clear`].
    fn set_clear_color(&self, color: LinearRgba);

    /// Clears the bound target's color and depth, opening the frame.
    fn clear(&self);

    /// Submits the frame's recorded work and presents it.
    fn present(&self);

    // --- Shaders and programs ---

    /// Compiles `source` as a vertex shader.
    ///
    /// A compile failure is logged and the allocated id returned regardless.
    fn compile_vertex_shader(&self, source: &str) -> ShaderId;

    /// Compiles `source` as a fragment shader.
    ///
    /// A compile failure is logged and the allocated id returned regardless.
    fn compile_fragment_shader(&self, source: &str) -> ShaderId;

    /// Links a program from a vertex and a fragment stage.
    ///
    /// A link failure is logged and the allocated id returned regardless;
    /// draws against a non-functional program silently no-op.
    fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> ProgramId;

    /// Makes `program` current for subsequent state-based draws.
    fn use_program(&self, program: ProgramId);

    // --- Geometry ---

    /// Creates a vertex array and binds it.
    fn create_vertex_array(&self) -> VertexArrayId;

    /// Makes `vertex_array` current.
    fn bind_vertex_array(&self, vertex_array: VertexArrayId);

    /// Creates a vertex buffer from `vertices`, binds it, and attaches it
    /// to the bound vertex array.
    fn create_vertex_buffer(&self, vertices: &[f32]) -> BufferId;

    /// Makes `buffer` the current vertex buffer.
    fn bind_vertex_buffer(&self, buffer: BufferId);

    /// Creates an element buffer from `indices` and attaches it to the
    /// bound vertex array.
    fn create_element_buffer(&self, indices: &[u32]) -> BufferId;

    /// Describes one attribute of the bound vertex array: shader location
    /// `index`, `size` components of `ty`, with `stride` and `offset` in
    /// bytes.
    fn set_vertex_attribute(
        &self,
        index: u32,
        size: i32,
        ty: NumericType,
        normalized: BoolFlag,
        stride: usize,
        offset: usize,
    );

    // --- Uniforms ---

    /// Stages a boolean uniform on `program` under `name`.
    fn set_uniform_bool(&self, program: ProgramId, name: &str, value: bool);

    /// Stages an integer uniform on `program` under `name`.
    fn set_uniform_int(&self, program: ProgramId, name: &str, value: i32);

    /// Stages a float uniform on `program` under `name`.
    fn set_uniform_float(&self, program: ProgramId, name: &str, value: f32);

    /// Stages a vec3 uniform on `program` under `name`.
    fn set_uniform_vec3(&self, program: ProgramId, name: &str, value: Vec3);

    /// Stages a mat4 uniform on `program` under `name`.
    fn set_uniform_mat4(&self, program: ProgramId, name: &str, value: Mat4);

    // --- Draw submission ---

    /// Draws `index_count` indices from `vertex_array`'s element buffer
    /// with `program`.
    fn draw_indexed(&self, program: ProgramId, vertex_array: VertexArrayId, index_count: usize);

    /// Draws `count` vertices starting at `first` using the current
    /// program and vertex array.
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);

    // --- Textures ---

    /// Creates a texture object and binds it.
    ///
    /// Storage is allocated by the first [`RenderApi::upload_texture`].
    fn create_texture(&self) -> TextureId;

    /// Binds `texture` to `unit` and makes it the target of subsequent
    /// parameter and upload calls.
    ///
    /// Draw submission samples the texture bound to [`TextureUnit::UNIT0`];
    /// bindings on other units still receive parameters and uploads but are
    /// not sampled.
    fn bind_texture(&self, unit: TextureUnit, target: TextureTarget, texture: TextureId);

    /// Sets one sampling parameter on the most recently bound texture.
    fn set_texture_parameter(
        &self,
        target: TextureTarget,
        name: TextureParameterName,
        value: TextureParameter,
    );

    /// Uploads texel `data` to the most recently bound texture, allocating
    /// `width` by `height` storage at `mip_level`.
    ///
    /// A decode or size mismatch is logged and the upload skipped;
    /// execution continues.
    #[allow(clippy::too_many_arguments)]
    fn upload_texture(
        &self,
        target: TextureTarget,
        mip_level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        data_format: TextureFormat,
        data_type: NumericType,
        data: &[u8],
    );

    // --- Pipeline toggles ---

    /// Enables alpha blending for subsequent draws.
    fn enable_blending(&self);

    /// Disables blending for subsequent draws.
    fn disable_blending(&self);

    /// Enables depth testing for subsequent draws.
    fn enable_depth_testing(&self);

    /// Enables depth writes for subsequent draws.
    fn enable_depth_mask(&self);

    /// Disables depth writes for subsequent draws.
    fn disable_depth_mask(&self);

    /// Enables back-face culling for subsequent draws.
    fn enable_face_culling(&self);

    /// Disables face culling for subsequent draws.
    fn disable_face_culling(&self);

    /// Sets the rasterization fill mode for subsequent draws.
    fn set_polygon_mode(&self, mode: PolygonMode);

    // --- Framebuffers ---

    /// Creates an off-screen target at `width` by `height`: color and depth
    /// attachments, the framebuffer object, and a fullscreen-quad vertex
    /// state for compositing.
    ///
    /// Completeness is checked and logged; the call itself never fails.
    fn create_framebuffer(&self, width: u32, height: u32) -> FramebufferTarget;

    /// Routes subsequent draws to `framebuffer`, or to the default surface
    /// target when `None`.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);

    /// Resizes `framebuffer`'s attachments in place; all handles stay
    /// stable.
    fn rescale_framebuffer(&self, framebuffer: FramebufferId, width: u32, height: u32);

    /// Composites `color_texture` to the bound target by drawing the
    /// fullscreen quad in `quad_vertex_array` with `program`.
    fn draw_framebuffer(
        &self,
        program: ProgramId,
        quad_vertex_array: VertexArrayId,
        color_texture: TextureId,
    );

    // --- Cleanup ---

    /// Releases a vertex array, buffer, and program. Handles unknown to
    /// the backend are ignored.
    fn cleanup(&self, vertex_array: VertexArrayId, buffer: BufferId, program: ProgramId);
}
