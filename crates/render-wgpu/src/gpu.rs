use crate::camera::OrthoCamera;
use crate::shaders;
use crate::texture::{DecodedImage, TextureLoader};
use bytemuck::{Pod, Zeroable};
use driftgrid_kernel::{FrameState, Plane, Scene};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PlaneUniforms {
    offset: [f32; 2],
    scale: [f32; 2],
    resolution: [f32; 2],
    size: [f32; 2],
    diff: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

/// Unit quad centered on the origin, v pointing down the image.
fn quad_mesh() -> ([QuadVertex; 4], [u16; 6]) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = [
        QuadVertex { position: [-p, -p], uv: [0.0, 1.0] },
        QuadVertex { position: [ p, -p], uv: [1.0, 1.0] },
        QuadVertex { position: [ p,  p], uv: [1.0, 0.0] },
        QuadVertex { position: [-p,  p], uv: [0.0, 0.0] },
    ];
    (vertices, [0, 1, 2, 2, 3, 0])
}

/// GPU half of a plane: its uniforms and the texture it samples.
struct GpuPlane {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Uploaded image; `None` while the plane samples the blank texture.
    texture: Option<(wgpu::Texture, wgpu::TextureView)>,
    resolution: [f32; 2],
    size: [f32; 2],
}

/// wgpu renderer for the plane grid.
pub struct PlaneRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    plane_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    quad_index_count: u32,
    planes: Vec<GpuPlane>,
    textures_loaded: usize,
}

impl PlaneRenderer {
    /// Build the pipeline and one blank-textured GPU plane per scene plane.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scene: &Scene,
    ) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let plane_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane_bind_group_layout"),
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

        // Linear min/mag, no mipmaps
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plane_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &plane_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PLANE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Double-sided: the bend can flip winding
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (quad_verts, quad_indices) = quad_mesh();
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&quad_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Bind groups keep the blank texture alive
        let (_blank_texture, blank_view) =
            Self::create_image_texture(device, queue, "blank_texture", 1, 1, &[0, 0, 0, 255]);

        let planes = scene
            .registry()
            .planes()
            .iter()
            .map(|plane| {
                let size = [plane.rect.width as f32, plane.rect.height as f32];
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("plane_uniform_buffer"),
                    size: std::mem::size_of::<PlaneUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = Self::plane_bind_group(
                    device,
                    &plane_layout,
                    &uniform_buffer,
                    &blank_view,
                    &sampler,
                );
                GpuPlane {
                    uniform_buffer,
                    bind_group,
                    texture: None,
                    resolution: [1.0, 1.0],
                    size,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("plane renderer ready with {} planes", planes.len());

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            plane_layout,
            sampler,
            quad_vertex_buffer,
            quad_index_buffer,
            quad_index_count: quad_indices.len() as u32,
            planes,
            textures_loaded: 0,
        }
    }

    /// Planes whose image has been uploaded.
    pub fn textures_loaded(&self) -> usize {
        self.textures_loaded
    }

    /// Queue every plane's image on the loader.
    pub fn request_textures(&self, scene: &Scene, loader: &mut TextureLoader) {
        for plane in scene.registry().planes() {
            loader.request(plane.id, plane.src.clone());
        }
    }

    /// Upload any images the loader finished since the last frame.
    pub fn process_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        loader: &mut TextureLoader,
    ) {
        for image in loader.drain() {
            self.upload(device, queue, image);
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: DecodedImage) {
        let Some(plane) = self.planes.get_mut(image.id.0 as usize) else {
            tracing::warn!("decoded image for unknown plane {}", image.id);
            return;
        };
        let (texture, view) = Self::create_image_texture(
            device,
            queue,
            "plane_texture",
            image.width,
            image.height,
            &image.data,
        );
        plane.bind_group = Self::plane_bind_group(
            device,
            &self.plane_layout,
            &plane.uniform_buffer,
            &view,
            &self.sampler,
        );
        plane.resolution = [image.width as f32, image.height as f32];
        if plane.texture.replace((texture, view)).is_none() {
            self.textures_loaded += 1;
        }
        tracing::debug!(
            "uploaded texture for plane {} ({}x{})",
            image.id,
            image.width,
            image.height
        );
    }

    /// Render one frame: one draw call per plane.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrthoCamera,
        scene: &Scene,
        frame: &FrameState,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );

        for (plane, gpu) in scene.registry().planes().iter().zip(&self.planes) {
            queue.write_buffer(
                &gpu.uniform_buffer,
                0,
                bytemuck::bytes_of(&Self::plane_uniforms(plane, gpu, frame.diff)),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("plane_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plane_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
            pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for gpu in &self.planes {
                pass.set_bind_group(1, &gpu.bind_group, &[]);
                pass.draw_indexed(0..self.quad_index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn plane_uniforms(plane: &Plane, gpu: &GpuPlane, diff: f64) -> PlaneUniforms {
        PlaneUniforms {
            offset: [plane.position.x as f32, plane.position.y as f32],
            scale: gpu.size,
            resolution: gpu.resolution,
            size: gpu.size,
            diff: diff as f32,
            _pad: [0.0; 3],
        }
    }

    fn plane_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane_bind_group"),
            layout,
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
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_image_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}
