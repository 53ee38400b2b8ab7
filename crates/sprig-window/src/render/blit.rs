use bytemuck::{Pod, Zeroable};

use super::{RenderCtx, RenderTarget};

/// Uploads an RGBA8 frame and draws it letterboxed into the swapchain.
///
/// GPU objects are created lazily and rebuilt only when their inputs change:
/// - pipeline: on swapchain format change
/// - frame texture + bind group: on frame size change
#[derive(Default)]
pub struct BlitRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    sampler: Option<wgpu::Sampler>,
    fit_ubo: Option<wgpu::Buffer>,

    frame_texture: Option<wgpu::Texture>,
    frame_size: (u32, u32),
    bind_group: Option<wgpu::BindGroup>,
}

impl BlitRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies a tightly packed RGBA8 frame into the GPU texture.
    ///
    /// Ignores frames whose byte length does not match `width * height * 4`.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32, rgba: &[u8]) {
        if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
            log::warn!(
                "BlitRenderer: rejected {}-byte frame for {width}x{height}",
                rgba.len()
            );
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_frame_texture(ctx, width, height);

        let Some(texture) = self.frame_texture.as_ref() else { return };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
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
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Clears the target to black and draws the last uploaded frame.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.write_fit_uniform(ctx);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprig blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(pipeline), Some(bind_group)) = (self.pipeline.as_ref(), self.bind_group.as_ref())
        else {
            return;
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..4, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprig blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprig blit bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FitUniform>() as u64,
                        ),
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

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprig blit pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprig blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
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
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);

        // Bind group depends on the layout.
        self.bind_group = None;
        self.frame_texture = None;
        self.frame_size = (0, 0);
    }

    fn ensure_frame_texture(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) {
        if self.frame_size == (width, height) && self.frame_texture.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sprig frame texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("sprig frame sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        let fit_ubo = self.fit_ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("sprig blit fit ubo"),
                size: std::mem::size_of::<FitUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprig blit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: fit_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("BlitRenderer: frame texture {width}x{height}");
        self.frame_texture = Some(texture);
        self.frame_size = (width, height);
        self.bind_group = Some(bind_group);
    }

    fn write_fit_uniform(&self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.fit_ubo.as_ref() else { return };
        let u = FitUniform {
            scale: fit_scale(self.frame_size, ctx.target_size),
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FitUniform {
    scale: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

/// NDC scale that fits a `frame` into a `target` while keeping its aspect
/// ratio. One axis is always `1.0`; the other is `<= 1.0`.
pub fn fit_scale(frame: (u32, u32), target: (u32, u32)) -> [f32; 2] {
    if frame.0 == 0 || frame.1 == 0 || target.0 == 0 || target.1 == 0 {
        return [1.0, 1.0];
    }
    let frame_aspect = frame.0 as f32 / frame.1 as f32;
    let target_aspect = target.0 as f32 / target.1 as f32;

    if frame_aspect > target_aspect {
        // Wider than the window: bars top and bottom.
        [1.0, target_aspect / frame_aspect]
    } else {
        [frame_aspect / target_aspect, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn same_aspect_fills_target() {
        assert!(close(fit_scale((640, 360), (1280, 720)), [1.0, 1.0]));
    }

    #[test]
    fn wide_frame_letterboxes() {
        assert!(close(fit_scale((200, 100), (100, 100)), [1.0, 0.5]));
    }

    #[test]
    fn tall_frame_pillarboxes() {
        assert!(close(fit_scale((100, 200), (100, 100)), [0.5, 1.0]));
    }

    #[test]
    fn degenerate_sizes_fill() {
        assert!(close(fit_scale((0, 10), (10, 10)), [1.0, 1.0]));
        assert!(close(fit_scale((10, 10), (10, 0)), [1.0, 1.0]));
    }
}
