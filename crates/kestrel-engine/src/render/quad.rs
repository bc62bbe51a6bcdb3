use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, Rect, Transform2D, Vec2};
use crate::render::{BlendMode, RenderCtx, RenderTarget};

/// Solid-color quadrilateral in the space of whatever transform it is drawn with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    /// Winding order: top-left, top-right, bottom-right, bottom-left.
    pub corners: [Vec2; 4],
    /// Straight alpha; premultiplied at upload.
    pub color: ColorRgba,
}

impl Quad {
    #[inline]
    pub fn new(corners: [Vec2; 4], color: ColorRgba) -> Self {
        Self { corners, color }
    }

    #[inline]
    pub fn from_rect(rect: Rect, color: ColorRgba) -> Self {
        Self::new(rect.corners(), color)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2],
    color: [f32; 4],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x4  // premultiplied color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadParams {
    m0: [f32; 4],
    m1: [f32; 4],
}

/// Quad renderer: flashes, letterbox bars and application geometry.
///
/// Each call uploads its own vertex and uniform buffers; draw counts here are
/// tiny and several calls may be recorded into one encoder.
#[derive(Default)]
pub struct QuadRenderer {
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<(BlendMode, wgpu::TextureFormat), wgpu::RenderPipeline>,
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `quads` in order, mapping their corners through `transform`
    /// into target pixels.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        transform: &Transform2D,
        quads: &[Quad],
        blend: BlendMode,
    ) {
        if target.size.is_empty() {
            return;
        }
        let vertices = build_vertices(quads);
        if vertices.is_empty() {
            return;
        }

        self.ensure_layouts(ctx);
        let format = ctx.surface_format;
        self.ensure_pipeline(ctx, blend, format);

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(pipeline) = self.pipelines.get(&(blend, format)) else { return };

        let (linear, translation) = transform.to_columns();
        let params = QuadParams {
            m0: linear,
            m1: [
                translation[0],
                translation[1],
                target.size.width as f32,
                target.size.height as f32,
            ],
        };

        let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kestrel quad params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kestrel quad vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kestrel quad bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kestrel quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..vertices.len() as u32, 0..1);
    }

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_layout.is_some() && self.pipeline_layout.is_some() {
            return;
        }

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("kestrel quad bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<QuadParams>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("kestrel quad pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        self.bind_group_layout = Some(bind_group_layout);
        self.pipeline_layout = Some(pipeline_layout);
        self.pipelines.clear();
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, blend: BlendMode, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&(blend, format)) {
            return;
        }
        let Some(layout) = self.pipeline_layout.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kestrel quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kestrel quad pipeline"),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: blend.to_wgpu(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
        });

        self.pipelines.insert((blend, format), pipeline);
    }
}

/// Two triangles per quad; quads with non-finite corners or color are skipped.
fn build_vertices(quads: &[Quad]) -> Vec<QuadVertex> {
    let mut out = Vec::with_capacity(quads.len() * 6);
    for q in quads {
        if !q.color.is_finite() || !q.corners.iter().all(|c| c.is_finite()) {
            continue;
        }
        let color = q.color.premultiplied();
        let [tl, tr, br, bl] = q.corners;
        for p in [tl, tr, br, tl, br, bl] {
            out.push(QuadVertex { pos: [p.x, p.y], color });
        }
    }
    out
}
