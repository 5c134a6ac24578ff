use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    ops::Range,
    sync::Arc
};

use bytemuck::{
    Pod,
    Zeroable
};

use wgpu::{
    util::DeviceExt, Device, RenderPipeline
};
use winit::window::Window;

use crate::{
    error::{EngineError, Result},
    game::{
        color::Rgb,
        components::SpriteImage,
        math::{Rect2F, Vector2F}
    }
};

use super::{DrawCommand, DrawList};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum TextureKey {
    /// 1x1 white texture, solid rects are tinted by vertex color.
    White,
    Image(u64),
}

#[derive(Debug, Clone, PartialEq)]
struct Batch {
    texture: TextureKey,
    indices: Range<u32>,
}

/// CPU side of one frame: quads for every command, grouped into runs that
/// share a texture.
#[derive(Debug, Default)]
struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    batches: Vec<Batch>,
}

/// Maps a pixel-space rect (origin top-left, `y` down) to normalized device
/// coordinates (origin center, `y` up).
fn pixel_rect_to_ndc(rect: Rect2F, viewport: Vector2F) -> Rect2F {
    Rect2F::new(
        rect.pos.x / viewport.x * 2.0 - 1.0,
        1.0 - rect.pos.y / viewport.y * 2.0,
        rect.size.x / viewport.x * 2.0,
        -rect.size.y / viewport.y * 2.0
    )
}

/// Whether a `width` x `height` texture is non-empty and within `max_dimension`.
fn fits_texture_limits(width: u32, height: u32, max_dimension: u32) -> bool {
    width > 0 && height > 0 && width <= max_dimension && height <= max_dimension
}

/// Drops cached textures of images not drawn this frame, returns how many went.
fn evict_unused<V>(cache: &mut HashMap<u64, V>, drawn: &HashSet<u64>) -> usize {
    let before = cache.len();
    cache.retain(|id, _| drawn.contains(id));
    before - cache.len()
}

impl Geometry {
    fn build(commands: &[DrawCommand], viewport: Vector2F) -> Self {
        let mut geometry = Self::default();
        for command in commands {
            match command {
                DrawCommand::FillRect { rect, color } => {
                    geometry.push_quad(TextureKey::White, *rect, color.to_linear_rgba(), viewport);
                },
                DrawCommand::Blit { image, position } => {
                    let rect = Rect2F::new(position.x, position.y, image.width() as f32, image.height() as f32);
                    geometry.push_quad(TextureKey::Image(image.id()), rect, [1.0; 4], viewport);
                },
            }
        }
        geometry
    }

    fn push_quad(&mut self, texture: TextureKey, rect: Rect2F, color: [f32; 4], viewport: Vector2F) {
        let ndc = pixel_rect_to_ndc(rect, viewport);
        let (x, y, w, h) = (ndc.pos.x, ndc.pos.y, ndc.size.x, ndc.size.y);

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[
            Vertex { position: [x, y], uv: [0.0, 0.0], color },          // Top-left
            Vertex { position: [x + w, y], uv: [1.0, 0.0], color },      // Top-right
            Vertex { position: [x + w, y + h], uv: [1.0, 1.0], color },  // Bottom-right
            Vertex { position: [x, y + h], uv: [0.0, 1.0], color },      // Bottom-left
        ]);

        let first_index = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base, base + 1, base + 2,
            base + 2, base + 3, base,
        ]);
        let last_index = self.indices.len() as u32;

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture => batch.indices.end = last_index,
            _ => self.batches.push(Batch {
                texture,
                indices: first_index..last_index
            }),
        }
    }
}

/// wgpu backend presenting a [`DrawList`] into a window.
pub struct Renderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    render_pipeline: RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_bind_group: wgpu::BindGroup,
    /// Keyed by `SpriteImage::id`, holds only images drawn in the last frame.
    image_bind_groups: HashMap<u64, wgpu::BindGroup>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Renderer> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance.create_surface(window.clone())
            .map_err(|e| EngineError::Renderer(format!("could not create surface, reason='{e}'")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .ok_or_else(|| EngineError::Renderer("no compatible adapter".to_string()))?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor::default(),
                None
            )
            .await
            .map_err(|e| EngineError::Renderer(format!("could not request device, reason='{e}'")))?;

        let size = window.inner_size();

        let cap = surface.get_capabilities(&adapter);
        let surface_format = cap.formats.first()
            .copied()
            .ok_or_else(|| EngineError::Renderer("surface reports no formats".to_string()))?;

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Image Bind Group Layout"),
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

        let render_pipeline = Self::prepare_pipeline(
            &device,
            surface_format.add_srgb_suffix(),
            &texture_bind_group_layout
        );

        // Nearest keeps pixel art crisp.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Image Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white_bind_group = Self::upload_texture(
            &device,
            &queue,
            &texture_bind_group_layout,
            &sampler,
            "White Texture",
            &[255, 255, 255, 255],
            1,
            1
        );

        let renderer = Renderer {
            window,
            device,
            queue,
            size,
            surface,
            surface_format,
            render_pipeline,
            texture_bind_group_layout,
            sampler,
            white_bind_group,
            image_bind_groups: HashMap::new(),
        };

        // Configure surface for the first time
        renderer.configure_surface();
        log::info!("Renderer ready, surface {}x{} {:?}", size.width, size.height, surface_format);

        Ok(renderer)
    }

    fn prepare_pipeline(
        device: &Device,
        target_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quad Pipeline Layout"),
            bind_group_layouts: &[texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Quad Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn upload_texture(
        device: &Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> wgpu::BindGroup {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
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
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        device.create_bind_group(&wgpu::BindGroupDescriptor {
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
        })
    }

    fn ensure_image_uploaded(&mut self, image: &SpriteImage) -> Result<()> {
        if self.image_bind_groups.contains_key(&image.id()) {
            return Ok(());
        }

        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if !fits_texture_limits(image.width(), image.height(), max_dimension) {
            return Err(EngineError::Renderer(format!(
                "image id={} is {}x{}, textures must be 1..={max_dimension} px per side",
                image.id(), image.width(), image.height()
            )));
        }

        log::debug!("Uploading image id={} {}x{}", image.id(), image.width(), image.height());
        let bind_group = Self::upload_texture(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            &self.sampler,
            "Sprite Texture",
            image.pixels().as_raw(),
            image.width(),
            image.height()
        );
        self.image_bind_groups.insert(image.id(), bind_group);
        Ok(())
    }

    pub fn get_window(&self) -> &Window {
        &self.window
    }

    fn configure_surface(&self) {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.surface_format,
            // sRGB view so the blending happens in linear space
            view_formats: vec![self.surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width,
            height: self.size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // Minimized windows report 0x0, which is not a valid surface size.
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.configure_surface();
    }

    pub fn render(&mut self, draw_list: &DrawList, clear_color: Rgb) -> Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(());
        }

        let mut drawn_images = HashSet::new();
        for command in draw_list.commands() {
            if let DrawCommand::Blit { image, .. } = command {
                self.ensure_image_uploaded(image)?;
                drawn_images.insert(image.id());
            }
        }

        let evicted = evict_unused(&mut self.image_bind_groups, &drawn_images);
        if evicted > 0 {
            log::debug!("Evicted {evicted} unused image textures");
        }

        let viewport = Vector2F::new(self.size.width as f32, self.size.height as f32);
        let geometry = Geometry::build(draw_list.commands(), viewport);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.configure_surface();
                return Ok(());
            },
            Err(e) => {
                return Err(EngineError::Renderer(format!("failed to acquire next swapchain texture, reason='{e}'")));
            },
        };
        let texture_view = surface_texture.texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.surface_format.add_srgb_suffix()),
                ..Default::default()
            });

        let mut encoder = self.device.create_command_encoder(&Default::default());

        {
            let [r, g, b, a] = clear_color.to_linear_rgba();
            let mut renderpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !geometry.indices.is_empty() {
                let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Quad Vertex Buffer"),
                    contents: bytemuck::cast_slice(&geometry.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Quad Index Buffer"),
                    contents: bytemuck::cast_slice(&geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                renderpass.set_pipeline(&self.render_pipeline);
                renderpass.set_vertex_buffer(0, vertex_buffer.slice(..));
                renderpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for batch in geometry.batches.iter() {
                    let bind_group = match batch.texture {
                        TextureKey::White => &self.white_bind_group,
                        TextureKey::Image(id) => match self.image_bind_groups.get(&id) {
                            Some(bind_group) => bind_group,
                            None => {
                                log::warn!("Image id={id} was not uploaded, skipping");
                                continue;
                            },
                        },
                    };
                    renderpass.set_bind_group(0, bind_group, &[]);
                    renderpass.draw_indexed(batch.indices.clone(), 0, 0..1);
                }
            }
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Canvas;

    const VIEWPORT: Vector2F = Vector2F { x: 200.0, y: 100.0 };

    #[test]
    fn full_viewport_maps_to_ndc_corners() {
        let ndc = pixel_rect_to_ndc(Rect2F::new(0.0, 0.0, 200.0, 100.0), VIEWPORT);
        assert_eq!(ndc, Rect2F::new(-1.0, 1.0, 2.0, -2.0));
    }

    #[test]
    fn center_pixel_maps_to_origin() {
        let ndc = pixel_rect_to_ndc(Rect2F::new(100.0, 50.0, 20.0, 10.0), VIEWPORT);
        assert_eq!(ndc.pos, Vector2F::new(0.0, 0.0));
        assert_eq!(ndc.size, Vector2F::new(0.2, -0.2));
    }

    #[test]
    fn consecutive_rects_share_one_batch() {
        let mut list = DrawList::new();
        list.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), Rgb::RED).unwrap();
        list.fill_rect(Rect2F::new(5.0, 5.0, 1.0, 1.0), Rgb::BLUE).unwrap();

        let geometry = Geometry::build(list.commands(), VIEWPORT);
        assert_eq!(geometry.vertices.len(), 8);
        assert_eq!(geometry.indices.len(), 12);
        assert_eq!(geometry.batches, vec![Batch { texture: TextureKey::White, indices: 0..12 }]);
    }

    #[test]
    fn texture_changes_split_batches() {
        let image = Arc::new(SpriteImage::new(image::RgbaImage::new(4, 4)));
        let mut list = DrawList::new();
        list.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), Rgb::RED).unwrap();
        list.blit(&image, Vector2F::new(10.0, 10.0)).unwrap();
        list.blit(&image, Vector2F::new(20.0, 10.0)).unwrap();
        list.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), Rgb::RED).unwrap();

        let geometry = Geometry::build(list.commands(), VIEWPORT);
        assert_eq!(geometry.batches, vec![
            Batch { texture: TextureKey::White, indices: 0..6 },
            Batch { texture: TextureKey::Image(image.id()), indices: 6..18 },
            Batch { texture: TextureKey::White, indices: 18..24 },
        ]);
    }

    #[test]
    fn texture_limits_reject_empty_and_oversized() {
        assert!(fits_texture_limits(1, 1, 8192));
        assert!(fits_texture_limits(8192, 8192, 8192));
        assert!(!fits_texture_limits(0, 0, 8192));
        assert!(!fits_texture_limits(16, 0, 8192));
        assert!(!fits_texture_limits(8193, 16, 8192));
        assert!(!fits_texture_limits(16, 10_000, 8192));
    }

    #[test]
    fn images_not_drawn_this_frame_are_evicted() {
        let mut cache: HashMap<u64, &str> = HashMap::from([(1, "kept"), (2, "dropped"), (3, "dropped")]);
        let drawn = HashSet::from([1, 4]);

        assert_eq!(evict_unused(&mut cache, &drawn), 2);
        assert_eq!(cache, HashMap::from([(1, "kept")]));

        assert_eq!(evict_unused(&mut cache, &HashSet::new()), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn blit_quad_uses_image_size_and_white_tint() {
        let image = Arc::new(SpriteImage::new(image::RgbaImage::new(20, 10)));
        let mut list = DrawList::new();
        list.blit(&image, Vector2F::new(100.0, 50.0)).unwrap();

        let geometry = Geometry::build(list.commands(), VIEWPORT);
        let top_left = geometry.vertices[0];
        let bottom_right = geometry.vertices[2];
        assert_eq!(top_left.position, [0.0, 0.0]);
        assert_eq!(top_left.uv, [0.0, 0.0]);
        assert_eq!(top_left.color, [1.0; 4]);
        assert_eq!(bottom_right.uv, [1.0, 1.0]);
        assert!((bottom_right.position[0] - 0.2).abs() < 1e-6);
        assert!((bottom_right.position[1] + 0.2).abs() < 1e-6);
    }
}
