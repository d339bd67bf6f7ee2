use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::ShaderSet;
use crate::error::Result;
use crate::pipeline::{TransformState, TransformUniform};

use super::ctx::RenderCtx;

/// Position plus a packed `B8G8R8A8` color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PyramidVertex {
    pub position: [f32; 3],
    pub color: u32,
}

impl PyramidVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Unorm8x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(x: f32, y: f32, z: f32, color: u32) -> PyramidVertex {
    PyramidVertex {
        position: [x, y, z],
        color,
    }
}

const BASE: u32 = 0xFF33_AAAA;

/// Square base (two triangles) plus four sides, apex at `+Y`.
pub const PYRAMID: [PyramidVertex; 18] = [
    v(-1.0, 0.0, -1.0, BASE),
    v(1.0, 0.0, -1.0, BASE),
    v(-1.0, 0.0, 1.0, BASE),
    v(-1.0, 0.0, 1.0, BASE),
    v(1.0, 0.0, -1.0, BASE),
    v(1.0, 0.0, 1.0, BASE),
    v(1.0, 0.0, -1.0, 0xFFEE_33BB),
    v(-1.0, 0.0, -1.0, 0xFFEE_33BB),
    v(0.0, 1.0, 0.0, 0xFFEE_33BB),
    v(-1.0, 0.0, -1.0, 0xFFCC_33BB),
    v(-1.0, 0.0, 1.0, 0xFFCC_33BB),
    v(0.0, 1.0, 0.0, 0xFFCC_33BB),
    v(-1.0, 0.0, 1.0, 0xFFAA_33BB),
    v(1.0, 0.0, 1.0, 0xFFAA_33BB),
    v(0.0, 1.0, 0.0, 0xFFAA_33BB),
    v(1.0, 0.0, 1.0, 0xFF88_33BB),
    v(1.0, 0.0, -1.0, 0xFF88_33BB),
    v(0.0, 1.0, 0.0, 0xFF88_33BB),
];

/// Orientation pyramid driven by the transform constant buffer.
pub struct BodyRenderer {
    vertices: wgpu::Buffer,
    transform_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl BodyRenderer {
    pub fn new(ctx: &RenderCtx<'_>, shaders: &ShaderSet) -> Result<Self> {
        let vertices = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sensorview pyramid vbo"),
                contents: bytemuck::cast_slice(&PYRAMID),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let transform_ubo = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sensorview transform ubo"),
                contents: bytemuck::bytes_of(&TransformUniform::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("sensorview transform bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<TransformUniform>() as u64,
                            ),
                        },
                        count: None,
                    }],
                });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sensorview transform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("sensorview body pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let vs = ctx.shader_module("sensorview body vs", &shaders.vertex);
        let fs = ctx.shader_module("sensorview body fs", &shaders.fragment);

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sensorview body pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PyramidVertex::layout()],
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

            // Clockwise front faces; the pyramid is convex so culling replaces a depth buffer.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
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
            "body pyramid: {} vertices, {}-byte transform buffer",
            PYRAMID.len(),
            std::mem::size_of::<TransformUniform>()
        );

        Ok(Self {
            vertices,
            transform_ubo,
            bind_group,
            pipeline,
        })
    }

    /// Replaces the constant buffer contents in one write.
    pub fn upload(&self, ctx: &RenderCtx<'_>, transform: &TransformState) {
        ctx.queue
            .write_buffer(&self.transform_ubo, 0, bytemuck::bytes_of(&transform.to_uniform()));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, vertex_count: u32) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..vertex_count, 0..1);
    }
}
