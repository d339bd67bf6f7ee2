use crate::assets::ShaderSet;
use crate::error::{Error, Result};
use crate::sensor::{DEPTH_BYTES_PER_SAMPLE, DepthGrid};

use super::ctx::RenderCtx;
use super::staging::{StagingTexture, pitch_for, write_depth_rows};

/// Full-screen view of the raw depth map.
///
/// Samples live in an `R16Uint` texture read with `textureLoad`; the fragment
/// shader normalizes distances itself, so no sampler is bound.
pub struct DepthRenderer {
    texture: wgpu::Texture,
    extent: wgpu::Extent3d,
    staging: StagingTexture,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl DepthRenderer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Uint;

    pub fn new(ctx: &RenderCtx<'_>, shaders: &ShaderSet, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::GpuCallFailed(format!(
                "depth texture cannot be {width}x{height}"
            )));
        }

        let extent = wgpu::Extent3d {
            width: width as u32,
            height: height as u32,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sensorview depth texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let row_bytes = width * DEPTH_BYTES_PER_SAMPLE;
        let row_pitch = pitch_for(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize);
        let staging = StagingTexture::new(row_bytes, row_pitch, height);

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("sensorview depth bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Uint,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    }],
                });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sensorview depth bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("sensorview depth pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let vs = ctx.shader_module("sensorview depth vs", &shaders.vertex);
        let fs = ctx.shader_module("sensorview depth fs", &shaders.fragment);

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sensorview depth pipeline"),
            layout: Some(&pipeline_layout),

            // Quad corners come from the vertex index.
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
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
                front_face: wgpu::FrontFace::Cw,
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

        log::info!(
            "depth texture {}x{} {:?}, upload pitch {} bytes",
            width,
            height,
            Self::FORMAT,
            row_pitch
        );

        Ok(Self {
            texture,
            extent,
            staging,
            bind_group,
            pipeline,
        })
    }

    /// Writes `grid` row by row into pitched staging memory, then copies the
    /// whole block to the texture.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, grid: &DepthGrid<'_>) -> Result<()> {
        write_depth_rows(grid, &mut self.staging.map_write_discard())?;

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.staging.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.staging.row_pitch() as u32),
                rows_per_image: Some(self.staging.height() as u32),
            },
            self.extent,
        );
        Ok(())
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, vertex_count: u32) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..vertex_count, 0..1);
    }
}
