use crate::{
    GraphicsError,
    background::{BackgroundUniform, BackgroundVertex, CameraImageUpload, quad_vertices},
    lines::LineVertex,
    mesh::MeshVertex,
    renderer::{BodyInstance, DrawStep, PreparedFrame},
    resources::ResourceStore,
    shaders::{BACKGROUND_WGSL, BODY_WGSL, LINE_WGSL, create_shader_module},
};
use ahash::AHashMap;
use asterixia_ids::MeshID;
use asterixia_render_bridge::{CameraState, DEFAULT_BACKGROUND_UV};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const LIGHT_POSITION: [f32; 4] = [0.0, 0.0, 10.0, 1.0];

// GL clip depth [-1, 1] to wgpu [0, 1].
#[rustfmt::skip]
const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, PartialEq)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light: [f32; 4],
}

impl CameraUniform {
    fn from_state(camera: &CameraState) -> Self {
        let view = Mat4::from_cols_array_2d(&camera.view);
        let projection = Mat4::from_cols_array_2d(&camera.projection);
        let [x, y, z] = camera.position;
        Self {
            view_proj: (OPENGL_TO_WGPU * projection * view).to_cols_array_2d(),
            eye: [x, y, z, 1.0],
            light: LIGHT_POSITION,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    _texture: wgpu::Texture,
    texture_bind_group: wgpu::BindGroup,
}

struct CameraFeed {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    Nothing,
    Background,
    Body,
    Lines,
}

pub struct Gpu {
    window_handle: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    last_camera: Option<CameraUniform>,
    background_pipeline: wgpu::RenderPipeline,
    background_uniform: wgpu::Buffer,
    background_bind_group: wgpu::BindGroup,
    background_vertices: wgpu::Buffer,
    feed: CameraFeed,
    body_pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,
    meshes: AHashMap<MeshID, GpuMesh>,
}

impl Gpu {
    pub fn new(window: Arc<Window>) -> Result<Self, GraphicsError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("asterixia_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(GraphicsError::NoSurfaceFormat)?;
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        };
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("asterixia_texture_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("asterixia_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let camera_bgl = uniform_layout(
            &device,
            "asterixia_camera_bgl",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("asterixia_camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("asterixia_camera_bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let background_bgl =
            uniform_layout(&device, "asterixia_background_bgl", wgpu::ShaderStages::FRAGMENT);
        let background_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("asterixia_background_uniform"),
            size: std::mem::size_of::<BackgroundUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let background_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("asterixia_background_bg"),
            layout: &background_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: background_uniform.as_entire_binding(),
            }],
        });
        let background_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asterixia_background_vertices"),
            contents: bytemuck::cast_slice(&quad_vertices(&DEFAULT_BACKGROUND_UV)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let (feed_texture, feed_bind_group) = create_rgba_texture(
            &device,
            &queue,
            &texture_bgl,
            &sampler,
            "asterixia_camera_feed",
            1,
            1,
            &[0, 0, 0, 255],
        );
        let feed = CameraFeed {
            texture: feed_texture,
            bind_group: feed_bind_group,
            size: (1, 1),
        };

        let background_pipeline = create_background_pipeline(
            &device,
            &[&background_bgl, &texture_bgl],
            format,
        );
        let body_pipeline = create_body_pipeline(&device, &[&camera_bgl, &texture_bgl], format);
        let line_pipeline = create_line_pipeline(&device, &[&camera_bgl], format);

        let instance_capacity = 64usize;
        let instance_buffer = create_vertex_buffer(
            &device,
            "asterixia_body_instances",
            instance_capacity * std::mem::size_of::<BodyInstance>(),
        );
        let line_capacity = 1024usize;
        let line_buffer = create_vertex_buffer(
            &device,
            "asterixia_line_vertices",
            line_capacity * std::mem::size_of::<LineVertex>(),
        );

        let depth = create_depth_target(&device, width, height);

        Ok(Self {
            window_handle: window,
            surface,
            device,
            queue,
            config,
            depth,
            texture_bgl,
            sampler,
            camera_buffer,
            camera_bind_group,
            last_camera: None,
            background_pipeline,
            background_uniform,
            background_bind_group,
            background_vertices,
            feed,
            body_pipeline,
            instance_buffer,
            instance_capacity,
            line_pipeline,
            line_buffer,
            line_capacity,
            meshes: AHashMap::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = create_depth_target(&self.device, width, height);
    }

    pub fn upload_camera_image(&mut self, image: &CameraImageUpload) {
        if self.feed.size != (image.width, image.height) {
            let (texture, bind_group) = create_rgba_texture(
                &self.device,
                &self.queue,
                &self.texture_bgl,
                &self.sampler,
                "asterixia_camera_feed",
                image.width,
                image.height,
                &image.rgba,
            );
            self.feed = CameraFeed {
                texture,
                bind_group,
                size: (image.width, image.height),
            };
            return;
        }
        write_rgba(
            &self.queue,
            &self.feed.texture,
            image.width,
            image.height,
            &image.rgba,
        );
    }

    pub fn render(&mut self, resources: &ResourceStore, frame: &PreparedFrame) {
        // Keep window alive for the full surface lifetime.
        self.window_handle.id();

        if frame.is_idle() {
            return;
        }
        self.prepare(resources, frame);

        let surface_frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(wgpu::SurfaceError::Other) => return,
        };
        let view = surface_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("asterixia_main_encoder"),
            });
        self.encode_pass(&mut encoder, &view, frame);

        self.queue.submit(Some(encoder.finish()));
        surface_frame.present();
    }

    fn prepare(&mut self, resources: &ResourceStore, frame: &PreparedFrame) {
        if let Some(camera) = &frame.camera {
            let uniform = CameraUniform::from_state(camera);
            if self.last_camera != Some(uniform) {
                self.queue
                    .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
                self.last_camera = Some(uniform);
            }
        }

        if let Some(background) = &frame.background {
            self.queue.write_buffer(
                &self.background_uniform,
                0,
                bytemuck::bytes_of(&BackgroundUniform::from(background)),
            );
            self.queue.write_buffer(
                &self.background_vertices,
                0,
                bytemuck::cast_slice(&quad_vertices(&background.uv)),
            );
        }

        for step in &frame.steps {
            if let DrawStep::Body { mesh, .. } = *step {
                self.ensure_mesh(resources, mesh);
            }
        }

        if !frame.instances.is_empty() {
            if frame.instances.len() > self.instance_capacity {
                self.instance_capacity = grow_capacity(self.instance_capacity, frame.instances.len());
                self.instance_buffer = create_vertex_buffer(
                    &self.device,
                    "asterixia_body_instances",
                    self.instance_capacity * std::mem::size_of::<BodyInstance>(),
                );
            }
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&frame.instances),
            );
        }

        if !frame.line_vertices.is_empty() {
            if frame.line_vertices.len() > self.line_capacity {
                self.line_capacity = grow_capacity(self.line_capacity, frame.line_vertices.len());
                self.line_buffer = create_vertex_buffer(
                    &self.device,
                    "asterixia_line_vertices",
                    self.line_capacity * std::mem::size_of::<LineVertex>(),
                );
            }
            self.queue.write_buffer(
                &self.line_buffer,
                0,
                bytemuck::cast_slice(&frame.line_vertices),
            );
        }
    }

    fn ensure_mesh(&mut self, resources: &ResourceStore, id: MeshID) {
        if self.meshes.contains_key(&id) {
            return;
        }
        let Some(asset) = resources.mesh(id) else {
            return;
        };
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("asterixia_mesh_vertices"),
                contents: bytemuck::cast_slice(&asset.mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("asterixia_mesh_indices"),
                contents: bytemuck::cast_slice(&asset.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let (texture, texture_bind_group) = create_rgba_texture(
            &self.device,
            &self.queue,
            &self.texture_bgl,
            &self.sampler,
            "asterixia_body_texture",
            asset.texture.width,
            asset.texture.height,
            &asset.texture.rgba,
        );
        log::debug!("uploaded mesh `{}` as {id}", asset.name);
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: asset.mesh.index_count(),
                _texture: texture,
                texture_bind_group,
            },
        );
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: &PreparedFrame,
    ) {
        let [r, g, b, a] = frame.clear_color;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("asterixia_main_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut bound = Bound::Nothing;
        for step in &frame.steps {
            match *step {
                DrawStep::Background => {
                    if bound != Bound::Background {
                        pass.set_pipeline(&self.background_pipeline);
                        pass.set_bind_group(0, &self.background_bind_group, &[]);
                        pass.set_bind_group(1, &self.feed.bind_group, &[]);
                        pass.set_vertex_buffer(0, self.background_vertices.slice(..));
                        bound = Bound::Background;
                    }
                    pass.draw(0..4, 0..1);
                }
                DrawStep::Body { mesh, instance } => {
                    let Some(gpu_mesh) = self.meshes.get(&mesh) else {
                        continue;
                    };
                    if bound != Bound::Body {
                        pass.set_pipeline(&self.body_pipeline);
                        pass.set_bind_group(0, &self.camera_bind_group, &[]);
                        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                        bound = Bound::Body;
                    }
                    pass.set_bind_group(1, &gpu_mesh.texture_bind_group, &[]);
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu_mesh.index_count, 0, instance..instance + 1);
                }
                DrawStep::Lines {
                    first_vertex,
                    vertex_count,
                } => {
                    if bound != Bound::Lines {
                        pass.set_pipeline(&self.line_pipeline);
                        pass.set_bind_group(0, &self.camera_bind_group, &[]);
                        pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                        bound = Bound::Lines;
                    }
                    pass.draw(first_vertex..first_vertex + vertex_count, 0..1);
                }
            }
        }
    }
}

fn grow_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &'static str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_vertex_buffer(device: &wgpu::Device, label: &'static str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size.max(1) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[allow(clippy::too_many_arguments)]
fn create_rgba_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &'static str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_rgba(queue, &texture, width, height, rgba);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind_group)
}

fn write_rgba(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, rgba: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn create_depth_target(device: &wgpu::Device, width: u32, height: u32) -> DepthTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("asterixia_depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTarget {
        _texture: texture,
        view,
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> Option<wgpu::DepthStencilState> {
    Some(wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

struct PipelineDesc<'a> {
    label: &'static str,
    source: &'static str,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    blend: Option<wgpu::BlendState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
}

fn create_pipeline(
    device: &wgpu::Device,
    desc: PipelineDesc<'_>,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = create_shader_module(device, desc.label, desc.source);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: desc.depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn create_background_pipeline(
    device: &wgpu::Device,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let attributes = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];
    create_pipeline(
        device,
        PipelineDesc {
            label: "asterixia_background",
            source: BACKGROUND_WGSL,
            bind_group_layouts,
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<BackgroundVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            blend: None,
            depth_stencil: depth_state(false, wgpu::CompareFunction::Always),
        },
        color_format,
    )
}

fn create_body_pipeline(
    device: &wgpu::Device,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let vertex_attributes =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    let instance_attributes = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];
    create_pipeline(
        device,
        PipelineDesc {
            label: "asterixia_body",
            source: BODY_WGSL,
            bind_group_layouts,
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<BodyInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance_attributes,
                },
            ],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_stencil: depth_state(true, wgpu::CompareFunction::LessEqual),
        },
        color_format,
    )
}

fn create_line_pipeline(
    device: &wgpu::Device,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
    create_pipeline(
        device,
        PipelineDesc {
            label: "asterixia_line",
            source: LINE_WGSL,
            bind_group_layouts,
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_stencil: depth_state(true, wgpu::CompareFunction::LessEqual),
        },
        color_format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn grow_capacity_doubles() {
        assert_eq!(grow_capacity(64, 10), 64);
        assert_eq!(grow_capacity(64, 65), 128);
        assert_eq!(grow_capacity(0, 3), 4);
    }

    #[test]
    fn gl_depth_maps_into_unit_range() {
        let proj = Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 100.0);
        let wgpu_proj = OPENGL_TO_WGPU * proj;
        let near = wgpu_proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = wgpu_proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn camera_uniform_carries_eye_and_light() {
        let camera = CameraState {
            position: [1.0, 2.0, 3.0],
            ..Default::default()
        };
        let uniform = CameraUniform::from_state(&camera);
        assert_eq!(uniform.eye, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.light, [0.0, 0.0, 10.0, 1.0]);
    }
}
