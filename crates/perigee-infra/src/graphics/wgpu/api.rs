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

use perigee_core::math::{LinearRgba, Mat4, Vec3};
use perigee_core::platform::PlatformWindowHandle;
use perigee_core::renderer::{
    BoolFlag, BufferId, DrawMode, FramebufferId, FramebufferTarget, GraphicsBackendKind,
    NumericType, PolygonMode, ProgramId, RenderApi, RenderError, ShaderError, ShaderId,
    ShaderStage, TextureFormat, TextureId, TextureParameter, TextureParameterName, TextureTarget,
    TextureUnit, VertexArrayId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use wgpu::util::DeviceExt;

use super::context::WgpuGraphicsContext;
use super::conversions::{
    address_mode_for, filter_mode_for, polygon_mode_for, source_bytes_per_texel,
    stored_bytes_per_texel, texture_format_for, topology_for, vertex_format_for, IntoWgpu,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Registry lock acquisition that survives poisoning.
///
/// The command contract cannot surface errors, so a lock poisoned by a
/// panicked caller is logged and its contents reused; every registry
/// mutation is a single insert or remove, which keeps the recovered
/// state consistent.
trait LockExt<T> {
    fn locked(&self) -> MutexGuard<'_, T>;
}

impl<T> LockExt<T> for Mutex<T> {
    fn locked(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|poisoned| {
            log::error!("render backend lock poisoned; continuing with recovered state");
            poisoned.into_inner()
        })
    }
}

/// Fullscreen quad (two triangles), position xy + uv per vertex.
const QUAD_VERTICES: [f32; 24] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, 1.0, //
    1.0, 1.0, 1.0, 0.0, //
    -1.0, 1.0, 0.0, 0.0,
];

/// A uniform value staged on a program between draws.
#[derive(Debug, Clone, Copy, PartialEq)]
enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Packs staged uniforms into a std140-style byte blob.
///
/// Values are laid out sorted by name, one 16-byte slot per scalar or
/// vector, four slots per matrix. Shaders see the same layout as long as
/// they declare their uniform struct fields in name order.
fn pack_uniforms(uniforms: &BTreeMap<String, UniformValue>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(uniforms.len() * 16);
    for value in uniforms.values() {
        match value {
            UniformValue::Bool(b) => {
                bytes.extend_from_slice(bytemuck::bytes_of(&(*b as u32)));
                bytes.extend_from_slice(&[0u8; 12]);
            }
            UniformValue::Int(i) => {
                bytes.extend_from_slice(bytemuck::bytes_of(i));
                bytes.extend_from_slice(&[0u8; 12]);
            }
            UniformValue::Float(f) => {
                bytes.extend_from_slice(bytemuck::bytes_of(f));
                bytes.extend_from_slice(&[0u8; 12]);
            }
            UniformValue::Vec3(v) => {
                bytes.extend_from_slice(bytemuck::bytes_of(v));
                bytes.extend_from_slice(&[0u8; 4]);
            }
            UniformValue::Mat4(m) => {
                bytes.extend_from_slice(bytemuck::bytes_of(m));
            }
        }
    }
    bytes
}

/// Base-level extent implied by a `(width, height)` upload at `mip`.
fn base_extent_for_mip(width: u32, height: u32, mip: u32) -> (u32, u32) {
    ((width << mip).max(1), (height << mip).max(1))
}

/// Number of levels in a full mip chain over a base extent.
fn mip_chain_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[derive(Debug)]
struct ShaderEntry {
    module: Option<wgpu::ShaderModule>,
    stage: ShaderStage,
}

#[derive(Debug)]
struct ProgramEntry {
    vertex: ShaderId,
    fragment: ShaderId,
    uniforms: BTreeMap<String, UniformValue>,
    valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug)]
struct BufferEntry {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

#[derive(Debug, Clone, Copy)]
struct AttributeDesc {
    location: u32,
    format: wgpu::VertexFormat,
    offset: u64,
}

#[derive(Debug, Default)]
struct VertexArrayEntry {
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    attributes: Vec<AttributeDesc>,
    stride: u64,
}

#[derive(Debug)]
struct TextureEntry {
    /// Storage with a full mip chain, kept so later uploads write into
    /// the existing chain instead of replacing it.
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    base_size: (u32, u32),
    format: wgpu::TextureFormat,
    wrap_s: wgpu::AddressMode,
    wrap_t: wgpu::AddressMode,
    min_filter: wgpu::FilterMode,
    mag_filter: wgpu::FilterMode,
}

impl Default for TextureEntry {
    fn default() -> Self {
        Self {
            texture: None,
            view: None,
            base_size: (0, 0),
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            wrap_s: wgpu::AddressMode::ClampToEdge,
            wrap_t: wgpu::AddressMode::ClampToEdge,
            min_filter: wgpu::FilterMode::Nearest,
            mag_filter: wgpu::FilterMode::Nearest,
        }
    }
}

#[derive(Debug)]
struct FramebufferEntry {
    color: TextureId,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Mutable bind state between command-layer calls.
#[derive(Debug)]
struct RenderState {
    clear_color: LinearRgba,
    program: Option<ProgramId>,
    vertex_array: Option<VertexArrayId>,
    texture_unit0: Option<TextureId>,
    last_texture: Option<TextureId>,
    framebuffer: Option<FramebufferId>,
    blending: bool,
    depth_test: bool,
    depth_mask: bool,
    face_culling: bool,
    polygon_mode: PolygonMode,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            clear_color: LinearRgba::BLACK,
            program: None,
            vertex_array: None,
            texture_unit0: None,
            last_texture: None,
            framebuffer: None,
            blending: false,
            depth_test: false,
            depth_mask: true,
            face_culling: false,
            polygon_mode: PolygonMode::Fill,
        }
    }
}

/// Everything a pipeline's shape depends on. Two draws with equal keys
/// share a cached pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramId,
    vertex_array: VertexArrayId,
    topology: wgpu::PrimitiveTopology,
    polygon_mode: wgpu::PolygonMode,
    blending: bool,
    depth_test: bool,
    depth_mask: bool,
    face_culling: bool,
    target_format: wgpu::TextureFormat,
}

#[derive(Debug, Clone, Copy)]
enum DrawKind {
    Indexed { count: u32 },
    Arrays { mode: DrawMode, first: i32, count: i32 },
}

#[derive(Debug)]
struct RecordedDraw {
    program: ProgramId,
    vertex_array: VertexArrayId,
    kind: DrawKind,
    uniform_bytes: Vec<u8>,
    texture: Option<TextureId>,
    target: Option<FramebufferId>,
    blending: bool,
    depth_test: bool,
    depth_mask: bool,
    face_culling: bool,
    polygon_mode: PolygonMode,
}

#[derive(Debug)]
enum RenderOp {
    Clear {
        target: Option<FramebufferId>,
        color: LinearRgba,
    },
    Draw(Box<RecordedDraw>),
}

impl RenderOp {
    fn target(&self) -> Option<FramebufferId> {
        match self {
            RenderOp::Clear { target, .. } => *target,
            RenderOp::Draw(draw) => draw.target,
        }
    }
}

/// The wgpu implementation of the render command contract.
///
/// The command layer's immediate, GL-shaped vocabulary is bridged to wgpu
/// by recording every operation issued between [`RenderApi::clear`] and
/// [`RenderApi::present`] and replaying the recording into render passes
/// when the frame is presented. Pipelines are cached by the state that
/// shaped them; a pipeline whose creation failed validation is cached as
/// absent so the draws that need it degrade to no-ops instead of
/// re-triggering the error every frame.
///
/// Shader sources handed to the compile operations are WGSL, with
/// `vs_main` / `fs_main` entry points and one uniform struct at group 0
/// binding 0 (fields in name order), texture at binding 1, sampler at
/// binding 2.
#[derive(Debug)]
pub struct WgpuRenderApi {
    context: Mutex<WgpuGraphicsContext>,

    shaders: Mutex<HashMap<ShaderId, ShaderEntry>>,
    programs: Mutex<HashMap<ProgramId, ProgramEntry>>,
    buffers: Mutex<HashMap<BufferId, BufferEntry>>,
    vertex_arrays: Mutex<HashMap<VertexArrayId, VertexArrayEntry>>,
    textures: Mutex<HashMap<TextureId, TextureEntry>>,
    framebuffers: Mutex<HashMap<FramebufferId, FramebufferEntry>>,
    pipelines: Mutex<HashMap<PipelineKey, Option<Arc<wgpu::RenderPipeline>>>>,

    next_shader_id: AtomicU32,
    next_program_id: AtomicU32,
    next_buffer_id: AtomicU32,
    next_vertex_array_id: AtomicU32,
    next_texture_id: AtomicU32,
    next_framebuffer_id: AtomicU32,

    state: Mutex<RenderState>,
    frame: Mutex<Vec<RenderOp>>,

    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    default_texture_view: wgpu::TextureView,
    // Depth attachment for the surface target, recreated on resize.
    surface_depth: Mutex<wgpu::TextureView>,
}

impl WgpuRenderApi {
    /// Initializes the backend against a window surface.
    ///
    /// This is the one place configuration errors are fatal: no adapter,
    /// no device, or no usable surface all propagate as
    /// [`RenderError::InitializationFailed`].
    pub fn new(
        window_handle: PlatformWindowHandle,
        window_size: (u32, u32),
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| RenderError::InitializationFailed(format!("no suitable adapter: {e}")))?;

        let context = pollster::block_on(WgpuGraphicsContext::new(
            &instance,
            window_handle,
            adapter,
            window_size,
        ))
        .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        let device = &context.device;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Perigee Draw Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Perigee Draw Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Draws with no texture bound sample this instead.
        let default_texture = device.create_texture_with_data(
            &context.queue,
            &wgpu::TextureDescriptor {
                label: Some("Perigee Default Texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &[255, 255, 255, 255],
        );
        let default_texture_view =
            default_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let surface_depth = Self::create_depth_view(device, context.size());

        log::info!("wgpu render backend initialized");

        Ok(Self {
            context: Mutex::new(context),
            shaders: Mutex::new(HashMap::new()),
            programs: Mutex::new(HashMap::new()),
            buffers: Mutex::new(HashMap::new()),
            vertex_arrays: Mutex::new(HashMap::new()),
            textures: Mutex::new(HashMap::new()),
            framebuffers: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(HashMap::new()),
            next_shader_id: AtomicU32::new(1),
            next_program_id: AtomicU32::new(1),
            next_buffer_id: AtomicU32::new(1),
            next_vertex_array_id: AtomicU32::new(1),
            next_texture_id: AtomicU32::new(1),
            next_framebuffer_id: AtomicU32::new(1),
            state: Mutex::new(RenderState::default()),
            frame: Mutex::new(Vec::new()),
            bind_group_layout,
            pipeline_layout,
            default_texture_view,
            surface_depth: Mutex::new(surface_depth),
        })
    }

    fn create_depth_view(device: &wgpu::Device, size: (u32, u32)) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Perigee Surface Depth"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn compile_shader(&self, source: &str, stage: ShaderStage) -> ShaderId {
        let id = ShaderId(self.next_shader_id.fetch_add(1, Ordering::Relaxed));

        let module = {
            let context = self.context.locked();
            let device = &context.device;
            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{stage} shader {}", id.raw())),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            match pollster::block_on(device.pop_error_scope()) {
                Some(error) => {
                    let err = ShaderError::CompilationFailed {
                        stage,
                        details: error.to_string(),
                    };
                    log::error!("{err}");
                    None
                }
                None => Some(module),
            }
        };

        self.shaders
            .locked()
            .insert(id, ShaderEntry { module, stage });
        id
    }

    /// Records `op` into the current frame.
    fn record(&self, op: RenderOp) {
        self.frame.locked().push(op);
    }

    fn record_draw(&self, program: ProgramId, vertex_array: VertexArrayId, kind: DrawKind) {
        let state = self.state.locked();
        let uniform_bytes = self
            .programs
            .locked()
            .get(&program)
            .map(|entry| pack_uniforms(&entry.uniforms))
            .unwrap_or_default();
        self.record(RenderOp::Draw(Box::new(RecordedDraw {
            program,
            vertex_array,
            kind,
            uniform_bytes,
            texture: state.texture_unit0,
            target: state.framebuffer,
            blending: state.blending,
            depth_test: state.depth_test,
            depth_mask: state.depth_mask,
            face_culling: state.face_culling,
            polygon_mode: state.polygon_mode,
        })));
    }

    /// Looks up or builds the pipeline for `key`. Failed builds are cached
    /// as absent so later frames skip the work and the log noise.
    fn pipeline_for(
        &self,
        key: PipelineKey,
        draw: &RecordedDraw,
    ) -> Option<Arc<wgpu::RenderPipeline>> {
        if let Some(cached) = self.pipelines.locked().get(&key) {
            return cached.clone();
        }

        let built = self.build_pipeline(&key, draw);
        if built.is_none() {
            log::error!(
                "pipeline for program {:?} could not be built; draws using it will be skipped",
                draw.program
            );
        }
        self.pipelines.locked().insert(key, built.clone());
        built
    }

    fn build_pipeline(
        &self,
        key: &PipelineKey,
        draw: &RecordedDraw,
    ) -> Option<Arc<wgpu::RenderPipeline>> {
        let programs = self.programs.locked();
        let program = programs.get(&draw.program)?;
        if !program.valid {
            return None;
        }

        let shaders = self.shaders.locked();
        let vertex_module = shaders.get(&program.vertex)?.module.as_ref()?;
        let fragment_module = shaders.get(&program.fragment)?.module.as_ref()?;

        let vertex_arrays = self.vertex_arrays.locked();
        let vao = vertex_arrays.get(&draw.vertex_array)?;
        let attributes: Vec<wgpu::VertexAttribute> = vao
            .attributes
            .iter()
            .map(|attr| wgpu::VertexAttribute {
                format: attr.format,
                offset: attr.offset,
                shader_location: attr.location,
            })
            .collect();
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: vao.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let context = self.context.locked();
        let device = &context.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Perigee Pipeline (program {:?})", draw.program)),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex_module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.target_format,
                    blend: if key.blending {
                        Some(wgpu::BlendState::ALPHA_BLENDING)
                    } else {
                        Some(wgpu::BlendState::REPLACE)
                    },
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: key.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: if key.face_culling {
                    Some(wgpu::Face::Back)
                } else {
                    None
                },
                unclipped_depth: false,
                polygon_mode: key.polygon_mode,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth_mask,
                depth_compare: if key.depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => {
                log::error!("pipeline validation failed: {error}");
                None
            }
            None => Some(Arc::new(pipeline)),
        }
    }

    /// Creates the per-draw bind group: uniforms, texture, sampler.
    fn bind_group_for(
        &self,
        device: &wgpu::Device,
        draw: &RecordedDraw,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let uniform_bytes: &[u8] = if draw.uniform_bytes.is_empty() {
            &[0u8; 16]
        } else {
            &draw.uniform_bytes
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Perigee Draw Uniforms"),
            contents: uniform_bytes,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let textures = self.textures.locked();
        let entry = draw.texture.and_then(|id| textures.get(&id));
        let view = entry
            .and_then(|e| e.view.as_ref())
            .unwrap_or(&self.default_texture_view);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Perigee Draw Sampler"),
            address_mode_u: entry.map(|e| e.wrap_s).unwrap_or(wgpu::AddressMode::ClampToEdge),
            address_mode_v: entry.map(|e| e.wrap_t).unwrap_or(wgpu::AddressMode::ClampToEdge),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: entry.map(|e| e.mag_filter).unwrap_or(wgpu::FilterMode::Nearest),
            min_filter: entry.map(|e| e.min_filter).unwrap_or(wgpu::FilterMode::Nearest),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Perigee Draw Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        (uniform_buffer, bind_group)
    }

    /// Creates color and depth storage for an off-screen target and
    /// installs the color view into `color`'s texture entry.
    fn allocate_framebuffer_storage(
        &self,
        color: TextureId,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let context = self.context.locked();
        let device = &context.device;

        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Perigee Framebuffer Color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut textures = self.textures.locked();
        if let Some(entry) = textures.get_mut(&color) {
            entry.view = Some(color_view);
            entry.min_filter = wgpu::FilterMode::Linear;
            entry.mag_filter = wgpu::FilterMode::Linear;
        }

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Perigee Framebuffer Depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn replay_frame(&self, ops: Vec<RenderOp>) {
        let context = self.context.locked();

        let surface_texture = match context.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                log::error!("{}", RenderError::SurfaceAcquisitionFailed(err.to_string()));
                if matches!(err, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    context
                        .surface
                        .configure(&context.device, &context.surface_config);
                }
                return;
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let surface_format = context.surface_format();
        let device = context.device.clone();
        let queue = context.queue.clone();
        drop(context);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Perigee Frame Encoder"),
        });

        // Keep per-draw uniform buffers alive until submission.
        let mut frame_resources: Vec<wgpu::Buffer> = Vec::new();

        // Consecutive ops against the same target share one render pass.
        let mut index = 0;
        while index < ops.len() {
            let target = ops[index].target();
            let mut end = index;
            while end < ops.len() && ops[end].target() == target {
                end += 1;
            }
            self.replay_pass(
                &device,
                &mut encoder,
                &ops[index..end],
                target,
                &surface_view,
                surface_format,
                &mut frame_resources,
            );
            index = end;
        }

        queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    #[allow(clippy::too_many_arguments)]
    fn replay_pass(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        ops: &[RenderOp],
        target: Option<FramebufferId>,
        surface_view: &wgpu::TextureView,
        surface_format: wgpu::TextureFormat,
        frame_resources: &mut Vec<wgpu::Buffer>,
    ) {
        // Clone the target views out so no registry lock is held while
        // pipelines and bind groups are resolved below.
        let (color_view, depth_view, format) = match target {
            Some(id) => {
                let framebuffers = self.framebuffers.locked();
                let textures = self.textures.locked();
                match framebuffers.get(&id) {
                    Some(fb) => match textures.get(&fb.color).and_then(|t| t.view.clone()) {
                        Some(color_view) => (
                            color_view,
                            fb.depth_view.clone(),
                            wgpu::TextureFormat::Rgba8UnormSrgb,
                        ),
                        None => {
                            log::error!("framebuffer {id:?} has no color storage; pass skipped");
                            return;
                        }
                    },
                    None => {
                        log::warn!("draw against unknown framebuffer {id:?}; pass skipped");
                        return;
                    }
                }
            }
            None => (
                surface_view.clone(),
                self.surface_depth.locked().clone(),
                surface_format,
            ),
        };

        // A Clear op opening the group clears the pass, otherwise load.
        let color_load = match ops.first() {
            Some(RenderOp::Clear { color, .. }) => wgpu::LoadOp::Clear((*color).into_wgpu()),
            _ => wgpu::LoadOp::Load,
        };
        let depth_load = match ops.first() {
            Some(RenderOp::Clear { .. }) => wgpu::LoadOp::Clear(1.0),
            _ => wgpu::LoadOp::Load,
        };

        // Resolve pipelines and bind groups before the pass borrows the
        // encoder.
        let mut prepared = Vec::new();
        for op in ops {
            if let RenderOp::Draw(draw) = op {
                let key = PipelineKey {
                    program: draw.program,
                    vertex_array: draw.vertex_array,
                    topology: match draw.kind {
                        DrawKind::Indexed { .. } => wgpu::PrimitiveTopology::TriangleList,
                        DrawKind::Arrays { mode, .. } => topology_for(mode),
                    },
                    polygon_mode: polygon_mode_for(draw.polygon_mode),
                    blending: draw.blending,
                    depth_test: draw.depth_test,
                    depth_mask: draw.depth_mask,
                    face_culling: draw.face_culling,
                    target_format: format,
                };
                let Some(pipeline) = self.pipeline_for(key, draw) else {
                    continue;
                };
                let (uniform_buffer, bind_group) = self.bind_group_for(device, draw);
                frame_resources.push(uniform_buffer);
                prepared.push((draw, pipeline, bind_group));
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Perigee Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let buffers = self.buffers.locked();
        let vertex_arrays = self.vertex_arrays.locked();

        for (draw, pipeline, bind_group) in &prepared {
            let Some(vao) = vertex_arrays.get(&draw.vertex_array) else {
                continue;
            };
            let Some(vertex_buffer) = vao.vertex_buffer.and_then(|id| buffers.get(&id)) else {
                log::trace!("vertex array {:?} has no vertex buffer; draw skipped", draw.vertex_array);
                continue;
            };

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.buffer.slice(..));

            match draw.kind {
                DrawKind::Indexed { count } => {
                    let Some(index_buffer) = vao.index_buffer.and_then(|id| buffers.get(&id))
                    else {
                        log::trace!(
                            "vertex array {:?} has no element buffer; indexed draw skipped",
                            draw.vertex_array
                        );
                        continue;
                    };
                    pass.set_index_buffer(index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..count, 0, 0..1);
                }
                DrawKind::Arrays { first, count, .. } => {
                    let first = first.max(0) as u32;
                    let count = count.max(0) as u32;
                    pass.draw(first..first + count, 0..1);
                }
            }
        }
    }
}

impl RenderApi for WgpuRenderApi {
    fn backend_kind(&self) -> GraphicsBackendKind {
        GraphicsBackendKind::Wgpu
    }

    fn set_viewport(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("ignoring viewport resize to zero dimensions: {width}x{height}");
            return;
        }
        let mut context = self.context.locked();
        context.resize(width, height);
        let depth = Self::create_depth_view(&context.device, (width, height));
        *self.surface_depth.locked() = depth;
    }

    fn set_clear_color(&self, color: LinearRgba) {
        self.state.locked().clear_color = color;
    }

    fn clear(&self) {
        let state = self.state.locked();
        self.record(RenderOp::Clear {
            target: state.framebuffer,
            color: state.clear_color,
        });
    }

    fn present(&self) {
        let ops = std::mem::take(&mut *self.frame.locked());
        if ops.is_empty() {
            log::trace!("present with no recorded work; skipping frame");
            return;
        }
        self.replay_frame(ops);
    }

    fn compile_vertex_shader(&self, source: &str) -> ShaderId {
        self.compile_shader(source, ShaderStage::Vertex)
    }

    fn compile_fragment_shader(&self, source: &str) -> ShaderId {
        self.compile_shader(source, ShaderStage::Fragment)
    }

    fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> ProgramId {
        let id = ProgramId(self.next_program_id.fetch_add(1, Ordering::Relaxed));

        let valid = {
            let shaders = self.shaders.locked();
            let stage_ok = |id: ShaderId, want: ShaderStage| match shaders.get(&id) {
                Some(entry) if entry.stage == want => entry.module.is_some(),
                Some(_) | None => {
                    log::error!("{}", ShaderError::InvalidStage { id });
                    false
                }
            };
            let vertex_ok = stage_ok(vertex, ShaderStage::Vertex);
            let fragment_ok = stage_ok(fragment, ShaderStage::Fragment);
            if !(vertex_ok && fragment_ok) {
                log::error!(
                    "{}",
                    ShaderError::LinkFailed {
                        details: "one or more stages failed to compile".to_string(),
                    }
                );
            }
            vertex_ok && fragment_ok
        };

        self.programs.locked().insert(
            id,
            ProgramEntry {
                vertex,
                fragment,
                uniforms: BTreeMap::new(),
                valid,
            },
        );
        id
    }

    fn use_program(&self, program: ProgramId) {
        self.state.locked().program = Some(program);
    }

    fn create_vertex_array(&self) -> VertexArrayId {
        let id = VertexArrayId(self.next_vertex_array_id.fetch_add(1, Ordering::Relaxed));
        self.vertex_arrays
            .locked()
            .insert(id, VertexArrayEntry::default());
        self.state.locked().vertex_array = Some(id);
        id
    }

    fn bind_vertex_array(&self, vertex_array: VertexArrayId) {
        self.state.locked().vertex_array = Some(vertex_array);
    }

    fn create_vertex_buffer(&self, vertices: &[f32]) -> BufferId {
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let buffer = {
            let context = self.context.locked();
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Perigee Vertex Buffer {}", id.raw())),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        };
        self.buffers.locked().insert(
            id,
            BufferEntry {
                buffer,
                kind: BufferKind::Vertex,
            },
        );

        let state = self.state.locked();
        if let Some(vao) = state.vertex_array {
            if let Some(entry) = self.vertex_arrays.locked().get_mut(&vao) {
                entry.vertex_buffer = Some(id);
            }
        }
        id
    }

    fn bind_vertex_buffer(&self, buffer: BufferId) {
        let state = self.state.locked();
        if let Some(vao) = state.vertex_array {
            if let Some(entry) = self.vertex_arrays.locked().get_mut(&vao) {
                entry.vertex_buffer = Some(buffer);
            }
        }
    }

    fn create_element_buffer(&self, indices: &[u32]) -> BufferId {
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let buffer = {
            let context = self.context.locked();
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Perigee Element Buffer {}", id.raw())),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        };
        self.buffers.locked().insert(
            id,
            BufferEntry {
                buffer,
                kind: BufferKind::Index,
            },
        );

        let state = self.state.locked();
        if let Some(vao) = state.vertex_array {
            if let Some(entry) = self.vertex_arrays.locked().get_mut(&vao) {
                entry.index_buffer = Some(id);
            }
        }
        id
    }

    fn set_vertex_attribute(
        &self,
        index: u32,
        size: i32,
        ty: NumericType,
        _normalized: BoolFlag,
        stride: usize,
        offset: usize,
    ) {
        let state = self.state.locked();
        let Some(vao) = state.vertex_array else {
            log::warn!("set_vertex_attribute with no bound vertex array; ignored");
            return;
        };
        if let Some(entry) = self.vertex_arrays.locked().get_mut(&vao) {
            entry.attributes.push(AttributeDesc {
                location: index,
                format: vertex_format_for(ty, size),
                offset: offset as u64,
            });
            entry.stride = stride as u64;
        }
    }

    fn set_uniform_bool(&self, program: ProgramId, name: &str, value: bool) {
        if let Some(entry) = self.programs.locked().get_mut(&program) {
            entry
                .uniforms
                .insert(name.to_string(), UniformValue::Bool(value));
        }
    }

    fn set_uniform_int(&self, program: ProgramId, name: &str, value: i32) {
        if let Some(entry) = self.programs.locked().get_mut(&program) {
            entry
                .uniforms
                .insert(name.to_string(), UniformValue::Int(value));
        }
    }

    fn set_uniform_float(&self, program: ProgramId, name: &str, value: f32) {
        if let Some(entry) = self.programs.locked().get_mut(&program) {
            entry
                .uniforms
                .insert(name.to_string(), UniformValue::Float(value));
        }
    }

    fn set_uniform_vec3(&self, program: ProgramId, name: &str, value: Vec3) {
        if let Some(entry) = self.programs.locked().get_mut(&program) {
            entry
                .uniforms
                .insert(name.to_string(), UniformValue::Vec3(value));
        }
    }

    fn set_uniform_mat4(&self, program: ProgramId, name: &str, value: Mat4) {
        if let Some(entry) = self.programs.locked().get_mut(&program) {
            entry
                .uniforms
                .insert(name.to_string(), UniformValue::Mat4(value));
        }
    }

    fn draw_indexed(&self, program: ProgramId, vertex_array: VertexArrayId, index_count: usize) {
        self.record_draw(
            program,
            vertex_array,
            DrawKind::Indexed {
                count: index_count as u32,
            },
        );
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let (program, vertex_array) = {
            let state = self.state.locked();
            (state.program, state.vertex_array)
        };
        let (Some(program), Some(vertex_array)) = (program, vertex_array) else {
            log::warn!("draw_arrays with no current program or vertex array; ignored");
            return;
        };
        self.record_draw(program, vertex_array, DrawKind::Arrays { mode, first, count });
    }

    fn create_texture(&self) -> TextureId {
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.textures
            .locked()
            .insert(id, TextureEntry::default());
        let mut state = self.state.locked();
        state.last_texture = Some(id);
        id
    }

    fn bind_texture(&self, unit: TextureUnit, _target: TextureTarget, texture: TextureId) {
        let mut state = self.state.locked();
        state.last_texture = Some(texture);
        if unit == TextureUnit::UNIT0 {
            state.texture_unit0 = Some(texture);
        } else {
            // Draws sample unit 0 only; the binding still targets
            // parameter and upload calls.
            log::debug!("texture {texture:?} bound to non-sampled {unit:?}");
        }
    }

    fn set_texture_parameter(
        &self,
        _target: TextureTarget,
        name: TextureParameterName,
        value: TextureParameter,
    ) {
        let state = self.state.locked();
        let Some(texture) = state.last_texture else {
            log::warn!("set_texture_parameter with no bound texture; ignored");
            return;
        };
        if let Some(entry) = self.textures.locked().get_mut(&texture) {
            match name {
                TextureParameterName::WrapS => entry.wrap_s = address_mode_for(value),
                TextureParameterName::WrapT => entry.wrap_t = address_mode_for(value),
                TextureParameterName::MinFilter => entry.min_filter = filter_mode_for(value),
                TextureParameterName::MagFilter => entry.mag_filter = filter_mode_for(value),
            }
        }
    }

    fn upload_texture(
        &self,
        _target: TextureTarget,
        mip_level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        data_format: TextureFormat,
        _data_type: NumericType,
        data: &[u8],
    ) {
        let state = self.state.locked();
        let Some(texture_id) = state.last_texture else {
            log::warn!("upload_texture with no bound texture; ignored");
            return;
        };
        drop(state);

        let src_bpp = source_bytes_per_texel(data_format);
        let expected = (width as usize) * (height as usize) * (src_bpp as usize);
        if data.len() < expected {
            log::error!(
                "texture upload skipped: {} bytes provided, {expected} required for {width}x{height}",
                data.len()
            );
            return;
        }

        // Pad three-channel data to the four-channel stored format.
        let stored_bpp = stored_bytes_per_texel(data_format);
        let texels: std::borrow::Cow<'_, [u8]> = if src_bpp == 3 {
            let mut padded = Vec::with_capacity((width * height * 4) as usize);
            for texel in data[..expected].chunks_exact(3) {
                padded.extend_from_slice(texel);
                padded.push(255);
            }
            padded.into()
        } else {
            data[..expected].into()
        };

        // The copy extent must equal the mip's physical extent, so the
        // storage is sized from the base level the upload implies. A full
        // chain is allocated once and reused by later mip uploads.
        let (base_width, base_height) = base_extent_for_mip(width, height, mip_level);
        let stored_format = texture_format_for(format);

        let existing = {
            let textures = self.textures.locked();
            let Some(entry) = textures.get(&texture_id) else {
                log::warn!("upload to unknown texture {texture_id:?}; ignored");
                return;
            };
            entry
                .texture
                .clone()
                .filter(|_| entry.base_size == (base_width, base_height))
                .filter(|_| entry.format == stored_format)
        };

        let context = self.context.locked();
        let (texture, created) = match existing {
            Some(texture) => (texture, false),
            None => {
                let texture = context.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("Perigee Texture {}", texture_id.raw())),
                    size: wgpu::Extent3d {
                        width: base_width,
                        height: base_height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: mip_chain_count(base_width, base_height),
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: stored_format,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                });
                (texture, true)
            }
        };
        context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * stored_bpp),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        drop(context);

        if created {
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            if let Some(entry) = self.textures.locked().get_mut(&texture_id) {
                entry.view = Some(view);
                entry.base_size = (base_width, base_height);
                entry.format = stored_format;
                entry.texture = Some(texture);
            }
        }
    }

    fn enable_blending(&self) {
        self.state.locked().blending = true;
    }

    fn disable_blending(&self) {
        self.state.locked().blending = false;
    }

    fn enable_depth_testing(&self) {
        self.state.locked().depth_test = true;
    }

    fn enable_depth_mask(&self) {
        self.state.locked().depth_mask = true;
    }

    fn disable_depth_mask(&self) {
        self.state.locked().depth_mask = false;
    }

    fn enable_face_culling(&self) {
        self.state.locked().face_culling = true;
    }

    fn disable_face_culling(&self) {
        self.state.locked().face_culling = false;
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        self.state.locked().polygon_mode = mode;
    }

    fn create_framebuffer(&self, width: u32, height: u32) -> FramebufferTarget {
        let framebuffer = FramebufferId(self.next_framebuffer_id.fetch_add(1, Ordering::Relaxed));
        let color_texture = self.create_texture();
        let depth_texture = self.create_texture();

        let depth_view = self.allocate_framebuffer_storage(color_texture, width, height);

        let quad_vertex_array = self.create_vertex_array();
        let quad_vertex_buffer = self.create_vertex_buffer(&QUAD_VERTICES);
        self.set_vertex_attribute(0, 2, NumericType::Float, BoolFlag::False, 16, 0);
        self.set_vertex_attribute(1, 2, NumericType::Float, BoolFlag::False, 16, 8);

        self.framebuffers.locked().insert(
            framebuffer,
            FramebufferEntry {
                color: color_texture,
                depth_view,
                width,
                height,
            },
        );
        log::debug!("framebuffer {framebuffer:?} created at {width}x{height}");

        FramebufferTarget {
            framebuffer,
            color_texture,
            depth_texture,
            quad_vertex_array,
            quad_vertex_buffer,
        }
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        self.state.locked().framebuffer = framebuffer;
    }

    fn rescale_framebuffer(&self, framebuffer: FramebufferId, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("ignoring framebuffer rescale to zero dimensions: {width}x{height}");
            return;
        }
        let color = {
            let framebuffers = self.framebuffers.locked();
            match framebuffers.get(&framebuffer) {
                Some(entry) if (entry.width, entry.height) == (width, height) => return,
                Some(entry) => entry.color,
                None => {
                    log::warn!("rescale of unknown framebuffer {framebuffer:?}; ignored");
                    return;
                }
            }
        };

        let depth_view = self.allocate_framebuffer_storage(color, width, height);
        if let Some(entry) = self.framebuffers.locked().get_mut(&framebuffer) {
            entry.depth_view = depth_view;
            entry.width = width;
            entry.height = height;
        }
    }

    fn draw_framebuffer(
        &self,
        program: ProgramId,
        quad_vertex_array: VertexArrayId,
        color_texture: TextureId,
    ) {
        let uniform_bytes = self
            .programs
            .locked()
            .get(&program)
            .map(|entry| pack_uniforms(&entry.uniforms))
            .unwrap_or_default();
        let state = self.state.locked();
        // The composite ignores depth so the quad always lands on top.
        self.record(RenderOp::Draw(Box::new(RecordedDraw {
            program,
            vertex_array: quad_vertex_array,
            kind: DrawKind::Arrays {
                mode: DrawMode::Triangles,
                first: 0,
                count: 6,
            },
            uniform_bytes,
            texture: Some(color_texture),
            target: state.framebuffer,
            blending: state.blending,
            depth_test: false,
            depth_mask: false,
            face_culling: false,
            polygon_mode: PolygonMode::Fill,
        })));
    }

    fn cleanup(&self, vertex_array: VertexArrayId, buffer: BufferId, program: ProgramId) {
        self.vertex_arrays.locked().remove(&vertex_array);
        self.buffers.locked().remove(&buffer);
        self.programs.locked().remove(&program);
        self.pipelines
            .locked()
            .retain(|key, _| key.program != program && key.vertex_array != vertex_array);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_pack_sorted_by_name_in_16_byte_slots() {
        let mut uniforms = BTreeMap::new();
        uniforms.insert("b_intensity".to_string(), UniformValue::Float(0.5));
        uniforms.insert("a_flag".to_string(), UniformValue::Bool(true));
        let bytes = pack_uniforms(&uniforms);

        assert_eq!(bytes.len(), 32);
        // a_flag comes first.
        assert_eq!(&bytes[0..4], bytemuck::bytes_of(&1u32));
        assert_eq!(&bytes[16..20], bytemuck::bytes_of(&0.5f32));
    }

    #[test]
    fn vec3_occupies_one_slot_and_mat4_four() {
        let mut uniforms = BTreeMap::new();
        uniforms.insert(
            "color".to_string(),
            UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)),
        );
        uniforms.insert("transform".to_string(), UniformValue::Mat4(Mat4::IDENTITY));
        let bytes = pack_uniforms(&uniforms);

        assert_eq!(bytes.len(), 16 + 64);
        assert_eq!(&bytes[0..4], bytemuck::bytes_of(&1.0f32));
        // Identity diagonal starts right after the vec3 slot.
        assert_eq!(&bytes[16..20], bytemuck::bytes_of(&1.0f32));
    }

    #[test]
    fn empty_uniform_set_packs_to_nothing() {
        assert!(pack_uniforms(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn mip_uploads_size_storage_from_the_base_level() {
        // A 16x16 upload at mip 2 implies 64x64 base storage, whose mip 2
        // physical extent is exactly 16x16.
        assert_eq!(base_extent_for_mip(16, 16, 2), (64, 64));
        assert_eq!(base_extent_for_mip(640, 480, 0), (640, 480));
        // Degenerate extents clamp to one texel.
        assert_eq!(base_extent_for_mip(0, 0, 0), (1, 1));
    }

    #[test]
    fn full_mip_chain_covers_every_level_of_the_base() {
        assert_eq!(mip_chain_count(1, 1), 1);
        assert_eq!(mip_chain_count(64, 64), 7);
        assert_eq!(mip_chain_count(64, 16), 7);
        // Any upload at mip `m` fits inside the chain of its implied base.
        for mip in 0..4 {
            let (w, h) = base_extent_for_mip(16, 16, mip);
            assert!(mip_chain_count(w, h) > mip);
        }
    }

    #[test]
    fn poisoned_lock_yields_its_contents() {
        let lock = Arc::new(Mutex::new(7u32));
        let poisoner = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(lock.is_poisoned());
        assert_eq!(*lock.locked(), 7);
    }

    #[test]
    fn pipeline_keys_distinguish_state_that_shapes_the_pipeline() {
        let base = PipelineKey {
            program: ProgramId(1),
            vertex_array: VertexArrayId(1),
            topology: wgpu::PrimitiveTopology::TriangleList,
            polygon_mode: wgpu::PolygonMode::Fill,
            blending: false,
            depth_test: true,
            depth_mask: true,
            face_culling: false,
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let blended = PipelineKey {
            blending: true,
            ..base
        };
        assert_ne!(base, blended);
        assert_eq!(base, PipelineKey { ..base });
    }
}
