//! WebGPU render pipeline setup
//!
//! Two pipelines share one surface: textured sprites for the catch game and
//! flat-colored triangles for the hello-triangle demo. Geometry is
//! transformed to clip space on the CPU and rebuilt every frame.

use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::vertex::{ColorVertex, QUAD_CORNERS, SpriteVertex};
use super::{SpriteRenderer, TextureHandle, TextureImage, sprite_model};

/// Failures while bringing up the GPU
#[derive(Debug, thiserror::Error)]
pub enum RenderInitError {
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Consecutive sprites that share a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteBatch {
    pub texture: TextureHandle,
    pub first: u32,
    pub count: u32,
}

/// CPU-side sprite queue for one frame
///
/// Draw order is preserved; a new batch starts whenever the texture changes.
#[derive(Debug, Default)]
pub struct SpriteBatcher {
    pub vertices: Vec<SpriteVertex>,
    pub batches: Vec<SpriteBatch>,
}

impl SpriteBatcher {
    pub fn push(&mut self, projection: Mat4, texture: TextureHandle, position: Vec2, size: Vec2, rotation_deg: f32) {
        let mvp = projection * sprite_model(position, size, rotation_deg);
        let first = self.vertices.len() as u32;
        for [u, v] in QUAD_CORNERS {
            let clip = mvp.project_point3(Vec3::new(u, v, 0.0));
            self.vertices.push(SpriteVertex::new(clip.x, clip.y, u, v));
        }

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture => batch.count += QUAD_CORNERS.len() as u32,
            _ => self.batches.push(SpriteBatch {
                texture,
                first,
                count: QUAD_CORNERS.len() as u32,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.batches.clear();
    }
}

/// Main render state
pub struct GpuRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    sprite_pipeline: wgpu::RenderPipeline,
    flat_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bind group per uploaded texture, indexed by handle
    textures: Vec<wgpu::BindGroup>,
    /// Field coordinates to clip space
    projection: Mat4,
    sprites: SpriteBatcher,
    flat_vertices: Vec<ColorVertex>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl GpuRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderInitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("apple-catch-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderInitError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
            label: Some("sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });
        let flat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("flat.wgsl").into()),
        });

        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&texture_layout],
            immediate_size: 0,
        });
        let flat_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let sprite_pipeline = create_pipeline(
            &device,
            "sprite_pipeline",
            &sprite_layout,
            &sprite_shader,
            SpriteVertex::desc(),
            config.format,
        );
        let flat_pipeline = create_pipeline(
            &device,
            "flat_pipeline",
            &flat_layout,
            &flat_shader,
            ColorVertex::desc(),
            config.format,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sprite_pipeline,
            flat_pipeline,
            texture_layout,
            sampler,
            textures: Vec::new(),
            projection: Mat4::IDENTITY,
            sprites: SpriteBatcher::default(),
            flat_vertices: Vec::new(),
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Projection used for subsequent draws; identity until set
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Queue flat-colored triangles given in field coordinates
    pub fn draw_triangles(&mut self, positions: &[Vec2], color: [f32; 4]) {
        for p in positions {
            let clip = self.projection.project_point3(p.extend(0.0));
            self.flat_vertices.push(ColorVertex::new(clip.x, clip.y, color));
        }
    }

    /// Submit everything queued since the last present
    pub fn present(&mut self, clear: [f32; 4]) -> Result<(), wgpu::SurfaceError> {
        let sprite_buffer = (!self.sprites.vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sprite_vertex_buffer"),
                    contents: bytemuck::cast_slice(&self.sprites.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        let flat_buffer = (!self.flat_vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("flat_vertex_buffer"),
                    contents: bytemuck::cast_slice(&self.flat_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let result = self.encode_and_submit(clear, sprite_buffer.as_ref(), flat_buffer.as_ref());

        self.sprites.clear();
        self.flat_vertices.clear();
        result
    }

    fn encode_and_submit(
        &self,
        clear: [f32; 4],
        sprite_buffer: Option<&wgpu::Buffer>,
        flat_buffer: Option<&wgpu::Buffer>,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: clear[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = sprite_buffer {
                render_pass.set_pipeline(&self.sprite_pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                for batch in &self.sprites.batches {
                    let Some(bind_group) = self.textures.get(batch.texture.0 as usize) else {
                        log::warn!("Skipping draw with unknown texture {:?}", batch.texture);
                        continue;
                    };
                    render_pass.set_bind_group(0, bind_group, &[]);
                    render_pass.draw(batch.first..batch.first + batch.count, 0..1);
                }
            }

            if let Some(buffer) = flat_buffer {
                render_pass.set_pipeline(&self.flat_pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..self.flat_vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl SpriteRenderer for GpuRenderer {
    fn upload_texture(&mut self, image: &TextureImage) -> TextureHandle {
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
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
            &image.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.textures.push(bind_group);
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn draw_sprite(&mut self, texture: TextureHandle, position: Vec2, size: Vec2, rotation_deg: f32) {
        self.sprites
            .push(self.projection, texture, position, size, rotation_deg);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::field_projection;

    #[test]
    fn test_batches_merge_same_texture() {
        let proj = field_projection(800.0, 600.0);
        let mut batcher = SpriteBatcher::default();
        batcher.push(proj, TextureHandle(0), Vec2::ZERO, Vec2::splat(10.0), 0.0);
        batcher.push(proj, TextureHandle(0), Vec2::splat(20.0), Vec2::splat(10.0), 0.0);
        batcher.push(proj, TextureHandle(1), Vec2::splat(40.0), Vec2::splat(10.0), 0.0);
        batcher.push(proj, TextureHandle(0), Vec2::splat(60.0), Vec2::splat(10.0), 0.0);

        assert_eq!(batcher.vertices.len(), 24);
        assert_eq!(
            batcher.batches,
            vec![
                SpriteBatch { texture: TextureHandle(0), first: 0, count: 12 },
                SpriteBatch { texture: TextureHandle(1), first: 12, count: 6 },
                SpriteBatch { texture: TextureHandle(0), first: 18, count: 6 },
            ]
        );
    }

    #[test]
    fn test_full_field_sprite_covers_clip_space() {
        let proj = field_projection(800.0, 600.0);
        let mut batcher = SpriteBatcher::default();
        batcher.push(proj, TextureHandle(0), Vec2::ZERO, Vec2::new(800.0, 600.0), 0.0);

        let top_left = batcher.vertices[0];
        assert!((top_left.position[0] + 1.0).abs() < 1e-5);
        assert!((top_left.position[1] - 1.0).abs() < 1e-5);
        assert_eq!(top_left.uv, [0.0, 0.0]);

        let bottom_right = batcher.vertices[2];
        assert!((bottom_right.position[0] - 1.0).abs() < 1e-5);
        assert!((bottom_right.position[1] + 1.0).abs() < 1e-5);
        assert_eq!(bottom_right.uv, [1.0, 1.0]);
    }

    #[test]
    fn test_clear_empties_queue() {
        let mut batcher = SpriteBatcher::default();
        batcher.push(Mat4::IDENTITY, TextureHandle(3), Vec2::ZERO, Vec2::ONE, 0.0);
        batcher.clear();
        assert!(batcher.vertices.is_empty());
        assert!(batcher.batches.is_empty());
    }
}
