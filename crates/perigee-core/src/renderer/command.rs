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
use crate::renderer::api::RenderApi;
use crate::renderer::enums::{
    BoolFlag, DrawMode, GraphicsBackendKind, NumericType, PolygonMode, TextureFormat,
    TextureParameter, TextureParameterName, TextureTarget, TextureUnit,
};
use crate::renderer::handle::{
    BufferId, FramebufferId, FramebufferTarget, ProgramId, ShaderId, TextureId, VertexArrayId,
};
use std::sync::Arc;

/// Backend-oblivious façade over the one live [`RenderApi`] instance.
///
/// Constructed once at startup from the selected backend and passed by
/// handle (cheap clone) to everything that draws. Call sites issue every
/// graphics operation through this type and never name a backend; the
/// backend is never swapped at runtime.
#[derive(Debug, Clone)]
pub struct RenderContext {
    api: Arc<dyn RenderApi>,
}

impl RenderContext {
    /// Wraps the selected backend instance.
    pub fn new(api: Arc<dyn RenderApi>) -> Self {
        log::info!("render context ready ({:?} backend)", api.backend_kind());
        Self { api }
    }

    /// Which graphics API the live backend targets.
    pub fn backend_kind(&self) -> GraphicsBackendKind {
        self.api.backend_kind()
    }

    /// See [`RenderApi::set_viewport`].
    #[inline]
    pub fn set_viewport(&self, width: u32, height: u32) {
        self.api.set_viewport(width, height);
    }

    /// See [`RenderApi::set_clear_color`].
    #[inline]
    pub fn set_clear_color(&self, color: LinearRgba) {
        self.api.set_clear_color(color);
    }

    /// See [`RenderApi::clear`].
    #[inline]
    pub fn clear(&self) {
        self.api.clear();
    }

    /// See [`RenderApi::present`].
    #[inline]
    pub fn present(&self) {
        self.api.present();
    }

    /// See [`RenderApi::compile_vertex_shader`].
    #[inline]
    pub fn compile_vertex_shader(&self, source: &str) -> ShaderId {
        self.api.compile_vertex_shader(source)
    }

    /// See [`RenderApi::compile_fragment_shader`].
    #[inline]
    pub fn compile_fragment_shader(&self, source: &str) -> ShaderId {
        self.api.compile_fragment_shader(source)
    }

    /// See [`RenderApi::link_program`].
    #[inline]
    pub fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> ProgramId {
        self.api.link_program(vertex, fragment)
    }

    /// See [`RenderApi::use_program`].
    #[inline]
    pub fn use_program(&self, program: ProgramId) {
        self.api.use_program(program);
    }

    /// See [`RenderApi::create_vertex_array`].
    #[inline]
    pub fn create_vertex_array(&self) -> VertexArrayId {
        self.api.create_vertex_array()
    }

    /// See [`RenderApi::bind_vertex_array`].
    #[inline]
    pub fn bind_vertex_array(&self, vertex_array: VertexArrayId) {
        self.api.bind_vertex_array(vertex_array);
    }

    /// See [`RenderApi::create_vertex_buffer`].
    #[inline]
    pub fn create_vertex_buffer(&self, vertices: &[f32]) -> BufferId {
        self.api.create_vertex_buffer(vertices)
    }

    /// See [`RenderApi::bind_vertex_buffer`].
    #[inline]
    pub fn bind_vertex_buffer(&self, buffer: BufferId) {
        self.api.bind_vertex_buffer(buffer);
    }

    /// See [`RenderApi::create_element_buffer`].
    #[inline]
    pub fn create_element_buffer(&self, indices: &[u32]) -> BufferId {
        self.api.create_element_buffer(indices)
    }

    /// See [`RenderApi::set_vertex_attribute`].
    #[inline]
    pub fn set_vertex_attribute(
        &self,
        index: u32,
        size: i32,
        ty: NumericType,
        normalized: BoolFlag,
        stride: usize,
        offset: usize,
    ) {
        self.api
            .set_vertex_attribute(index, size, ty, normalized, stride, offset);
    }

    /// See [`RenderApi::set_uniform_bool`].
    #[inline]
    pub fn set_uniform_bool(&self, program: ProgramId, name: &str, value: bool) {
        self.api.set_uniform_bool(program, name, value);
    }

    /// See [`RenderApi::set_uniform_int`].
    #[inline]
    pub fn set_uniform_int(&self, program: ProgramId, name: &str, value: i32) {
        self.api.set_uniform_int(program, name, value);
    }

    /// See [`RenderApi::set_uniform_float`].
    #[inline]
    pub fn set_uniform_float(&self, program: ProgramId, name: &str, value: f32) {
        self.api.set_uniform_float(program, name, value);
    }

    /// See [`RenderApi::set_uniform_vec3`].
    #[inline]
    pub fn set_uniform_vec3(&self, program: ProgramId, name: &str, value: Vec3) {
        self.api.set_uniform_vec3(program, name, value);
    }

    /// See [`RenderApi::set_uniform_mat4`].
    #[inline]
    pub fn set_uniform_mat4(&self, program: ProgramId, name: &str, value: Mat4) {
        self.api.set_uniform_mat4(program, name, value);
    }

    /// See [`RenderApi::draw_indexed`].
    #[inline]
    pub fn draw_indexed(
        &self,
        program: ProgramId,
        vertex_array: VertexArrayId,
        index_count: usize,
    ) {
        self.api.draw_indexed(program, vertex_array, index_count);
    }

    /// See [`RenderApi::draw_arrays`].
    #[inline]
    pub fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.api.draw_arrays(mode, first, count);
    }

    /// See [`RenderApi::create_texture`].
    #[inline]
    pub fn create_texture(&self) -> TextureId {
        self.api.create_texture()
    }

    /// See [`RenderApi::bind_texture`].
    #[inline]
    pub fn bind_texture(&self, unit: TextureUnit, target: TextureTarget, texture: TextureId) {
        self.api.bind_texture(unit, target, texture);
    }

    /// See [`RenderApi::set_texture_parameter`].
    #[inline]
    pub fn set_texture_parameter(
        &self,
        target: TextureTarget,
        name: TextureParameterName,
        value: TextureParameter,
    ) {
        self.api.set_texture_parameter(target, name, value);
    }

    /// See [`RenderApi::upload_texture`].
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn upload_texture(
        &self,
        target: TextureTarget,
        mip_level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        data_format: TextureFormat,
        data_type: NumericType,
        data: &[u8],
    ) {
        self.api.upload_texture(
            target,
            mip_level,
            format,
            width,
            height,
            data_format,
            data_type,
            data,
        );
    }

    /// See [`RenderApi::enable_blending`].
    #[inline]
    pub fn enable_blending(&self) {
        self.api.enable_blending();
    }

    /// See [`RenderApi::disable_blending`].
    #[inline]
    pub fn disable_blending(&self) {
        self.api.disable_blending();
    }

    /// See [`RenderApi::enable_depth_testing`].
    #[inline]
    pub fn enable_depth_testing(&self) {
        self.api.enable_depth_testing();
    }

    /// See [`RenderApi::enable_depth_mask`].
    #[inline]
    pub fn enable_depth_mask(&self) {
        self.api.enable_depth_mask();
    }

    /// See [`RenderApi::disable_depth_mask`].
    #[inline]
    pub fn disable_depth_mask(&self) {
        self.api.disable_depth_mask();
    }

    /// See [`RenderApi::enable_face_culling`].
    #[inline]
    pub fn enable_face_culling(&self) {
        self.api.enable_face_culling();
    }

    /// See [`RenderApi::disable_face_culling`].
    #[inline]
    pub fn disable_face_culling(&self) {
        self.api.disable_face_culling();
    }

    /// See [`RenderApi::set_polygon_mode`].
    #[inline]
    pub fn set_polygon_mode(&self, mode: PolygonMode) {
        self.api.set_polygon_mode(mode);
    }

    /// See [`RenderApi::create_framebuffer`].
    #[inline]
    pub fn create_framebuffer(&self, width: u32, height: u32) -> FramebufferTarget {
        self.api.create_framebuffer(width, height)
    }

    /// See [`RenderApi::bind_framebuffer`].
    #[inline]
    pub fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        self.api.bind_framebuffer(framebuffer);
    }

    /// See [`RenderApi::rescale_framebuffer`].
    #[inline]
    pub fn rescale_framebuffer(&self, framebuffer: FramebufferId, width: u32, height: u32) {
        self.api.rescale_framebuffer(framebuffer, width, height);
    }

    /// See [`RenderApi::draw_framebuffer`].
    #[inline]
    pub fn draw_framebuffer(
        &self,
        program: ProgramId,
        quad_vertex_array: VertexArrayId,
        color_texture: TextureId,
    ) {
        self.api
            .draw_framebuffer(program, quad_vertex_array, color_texture);
    }

    /// See [`RenderApi::cleanup`].
    #[inline]
    pub fn cleanup(&self, vertex_array: VertexArrayId, buffer: BufferId, program: ProgramId) {
        self.api.cleanup(vertex_array, buffer, program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every operation name so pass-through can be asserted.
    #[derive(Debug, Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingApi {
        fn record(&self, op: &str) {
            self.calls.lock().unwrap().push(op.to_string());
        }
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RenderApi for RecordingApi {
        fn backend_kind(&self) -> GraphicsBackendKind {
            GraphicsBackendKind::None
        }
        fn set_viewport(&self, _width: u32, _height: u32) {
            self.record("set_viewport");
        }
        fn set_clear_color(&self, _color: LinearRgba) {
            self.record("set_clear_color");
        }
        fn clear(&self) {
            self.record("clear");
        }
        fn present(&self) {
            self.record("present");
        }
        fn compile_vertex_shader(&self, _source: &str) -> ShaderId {
            self.record("compile_vertex_shader");
            ShaderId(1)
        }
        fn compile_fragment_shader(&self, _source: &str) -> ShaderId {
            self.record("compile_fragment_shader");
            ShaderId(2)
        }
        fn link_program(&self, _vertex: ShaderId, _fragment: ShaderId) -> ProgramId {
            self.record("link_program");
            ProgramId(3)
        }
        fn use_program(&self, _program: ProgramId) {
            self.record("use_program");
        }
        fn create_vertex_array(&self) -> VertexArrayId {
            self.record("create_vertex_array");
            VertexArrayId(4)
        }
        fn bind_vertex_array(&self, _vertex_array: VertexArrayId) {
            self.record("bind_vertex_array");
        }
        fn create_vertex_buffer(&self, _vertices: &[f32]) -> BufferId {
            self.record("create_vertex_buffer");
            BufferId(5)
        }
        fn bind_vertex_buffer(&self, _buffer: BufferId) {
            self.record("bind_vertex_buffer");
        }
        fn create_element_buffer(&self, _indices: &[u32]) -> BufferId {
            self.record("create_element_buffer");
            BufferId(6)
        }
        fn set_vertex_attribute(
            &self,
            _index: u32,
            _size: i32,
            _ty: NumericType,
            _normalized: BoolFlag,
            _stride: usize,
            _offset: usize,
        ) {
            self.record("set_vertex_attribute");
        }
        fn set_uniform_bool(&self, _program: ProgramId, _name: &str, _value: bool) {
            self.record("set_uniform_bool");
        }
        fn set_uniform_int(&self, _program: ProgramId, _name: &str, _value: i32) {
            self.record("set_uniform_int");
        }
        fn set_uniform_float(&self, _program: ProgramId, _name: &str, _value: f32) {
            self.record("set_uniform_float");
        }
        fn set_uniform_vec3(&self, _program: ProgramId, _name: &str, _value: Vec3) {
            self.record("set_uniform_vec3");
        }
        fn set_uniform_mat4(&self, _program: ProgramId, _name: &str, _value: Mat4) {
            self.record("set_uniform_mat4");
        }
        fn draw_indexed(
            &self,
            _program: ProgramId,
            _vertex_array: VertexArrayId,
            _index_count: usize,
        ) {
            self.record("draw_indexed");
        }
        fn draw_arrays(&self, _mode: DrawMode, _first: i32, _count: i32) {
            self.record("draw_arrays");
        }
        fn create_texture(&self) -> TextureId {
            self.record("create_texture");
            TextureId(7)
        }
        fn bind_texture(&self, _unit: TextureUnit, _target: TextureTarget, _texture: TextureId) {
            self.record("bind_texture");
        }
        fn set_texture_parameter(
            &self,
            _target: TextureTarget,
            _name: TextureParameterName,
            _value: TextureParameter,
        ) {
            self.record("set_texture_parameter");
        }
        fn upload_texture(
            &self,
            _target: TextureTarget,
            _mip_level: u32,
            _format: TextureFormat,
            _width: u32,
            _height: u32,
            _data_format: TextureFormat,
            _data_type: NumericType,
            _data: &[u8],
        ) {
            self.record("upload_texture");
        }
        fn enable_blending(&self) {
            self.record("enable_blending");
        }
        fn disable_blending(&self) {
            self.record("disable_blending");
        }
        fn enable_depth_testing(&self) {
            self.record("enable_depth_testing");
        }
        fn enable_depth_mask(&self) {
            self.record("enable_depth_mask");
        }
        fn disable_depth_mask(&self) {
            self.record("disable_depth_mask");
        }
        fn enable_face_culling(&self) {
            self.record("enable_face_culling");
        }
        fn disable_face_culling(&self) {
            self.record("disable_face_culling");
        }
        fn set_polygon_mode(&self, _mode: PolygonMode) {
            self.record("set_polygon_mode");
        }
        fn create_framebuffer(&self, _width: u32, _height: u32) -> FramebufferTarget {
            self.record("create_framebuffer");
            FramebufferTarget {
                framebuffer: FramebufferId(8),
                color_texture: TextureId(9),
                depth_texture: TextureId(10),
                quad_vertex_array: VertexArrayId(11),
                quad_vertex_buffer: BufferId(12),
            }
        }
        fn bind_framebuffer(&self, _framebuffer: Option<FramebufferId>) {
            self.record("bind_framebuffer");
        }
        fn rescale_framebuffer(&self, _framebuffer: FramebufferId, _width: u32, _height: u32) {
            self.record("rescale_framebuffer");
        }
        fn draw_framebuffer(
            &self,
            _program: ProgramId,
            _quad_vertex_array: VertexArrayId,
            _color_texture: TextureId,
        ) {
            self.record("draw_framebuffer");
        }
        fn cleanup(&self, _vertex_array: VertexArrayId, _buffer: BufferId, _program: ProgramId) {
            self.record("cleanup");
        }
    }

    #[test]
    fn operations_pass_through_to_the_one_backend() {
        let api = Arc::new(RecordingApi::default());
        let context = RenderContext::new(api.clone());

        context.set_clear_color(LinearRgba::BLACK);
        context.clear();
        let vs = context.compile_vertex_shader("vs");
        let fs = context.compile_fragment_shader("fs");
        let program = context.link_program(vs, fs);
        let vao = context.create_vertex_array();
        context.draw_indexed(program, vao, 6);
        context.present();

        assert_eq!(
            api.calls(),
            vec![
                "set_clear_color",
                "clear",
                "compile_vertex_shader",
                "compile_fragment_shader",
                "link_program",
                "create_vertex_array",
                "draw_indexed",
                "present",
            ]
        );
    }

    #[test]
    fn cloned_contexts_share_the_same_backend_instance() {
        let api = Arc::new(RecordingApi::default());
        let context = RenderContext::new(api.clone());
        let clone = context.clone();

        context.clear();
        clone.clear();

        assert_eq!(api.calls(), vec!["clear", "clear"]);
    }

    #[test]
    fn handles_returned_by_the_backend_are_passed_back_unchanged() {
        let api = Arc::new(RecordingApi::default());
        let context = RenderContext::new(api);

        let target = context.create_framebuffer(800, 600);
        assert_eq!(target.framebuffer, FramebufferId(8));
        assert_eq!(target.color_texture, TextureId(9));

        context.rescale_framebuffer(target.framebuffer, 1024, 768);
        context.draw_framebuffer(ProgramId(3), target.quad_vertex_array, target.color_texture);
    }
}
