use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, Rect};
use crate::render::{BlendMode, RenderCtx, RenderTarget};

const PRELUDE: &str = include_str!("shaders/blit_prelude.wgsl");

/// Fragment stage of a blit: a WGSL body appended to the blit prelude.
///
/// The body must define `fs_main(in: VsOut) -> @location(0) vec4<f32>` and
/// may read `src_tex`, `src_sampler` and `params`. `key` identifies the
/// compiled pipeline; two shaders with the same key must share a body.
#[derive(Debug, Copy, Clone)]
pub struct BlitShader<'a> {
    pub key: u64,
    pub label: &'a str,
    pub fragment: &'a str,
}

impl BlitShader<'static> {
    /// Pass-through sample multiplied by the tint.
    pub const IDENTITY: BlitShader<'static> = BlitShader {
        key: 0,
        label: "identity",
        fragment: include_str!("shaders/identity.wgsl"),
    };
}

/// One textured quad drawn into a [`RenderTarget`].
#[derive(Debug, Copy, Clone)]
pub struct BlitJob<'a> {
    pub source: &'a wgpu::TextureView,
    /// Destination rect in target pixels.
    pub rect: Rect,
    pub shader: BlitShader<'a>,
    pub blend: BlendMode,
    pub tint: ColorRgba,
    /// Clears the target first when set; otherwise its contents are kept.
    pub clear: Option<ColorRgba>,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlitParams {
    rect: [f32; 4],
    target: [f32; 4],
    tint: [f32; 4],
}

type PipelineKey = (u64, BlendMode, wgpu::TextureFormat);

/// Draws textures onto targets through an optional shader pass.
///
/// Pipelines are compiled on first use per (shader, blend mode, format) and
/// kept for the renderer's lifetime. Parameters go into a fresh uniform buffer
/// per blit, so several blits recorded into one encoder never share state.
#[derive(Default)]
pub struct BlitRenderer {
    sampler: Option<wgpu::Sampler>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl BlitRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `job` into `target`. Empty rects and empty targets draw nothing
    /// but still honor `clear`.
    pub fn blit(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, job: &BlitJob<'_>) {
        self.ensure_shared(ctx);
        let format = ctx.surface_format;
        self.ensure_pipeline(ctx, job.shader, job.blend, format);

        let (Some(sampler), Some(bgl)) = (self.sampler.as_ref(), self.bind_group_layout.as_ref())
        else {
            return;
        };
        let Some(pipeline) = self.pipelines.get(&(job.shader.key, job.blend, format)) else {
            return;
        };

        let draws = !job.rect.is_empty() && !target.size.is_empty();
        if !draws && job.clear.is_none() {
            return;
        }

        let bind_group = draws.then(|| {
            let params = BlitParams {
                rect: [job.rect.origin.x, job.rect.origin.y, job.rect.size.x, job.rect.size.y],
                target: [target.size.width as f32, target.size.height as f32, ctx.time, 0.0],
                tint: job.tint.premultiplied(),
            };
            let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kestrel blit params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("kestrel blit bind group"),
                layout: bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(job.source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: ubo.as_entire_binding(),
                    },
                ],
            })
        });

        let load = match job.clear {
            Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kestrel blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some(bind_group) = bind_group.as_ref() {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.draw(0..6, 0..1);
        }
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() && self.bind_group_layout.is_some() && self.pipeline_layout.is_some() {
            return;
        }

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kestrel blit sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("kestrel blit bgl"),
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
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<BlitParams>() as u64,
                            ),
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("kestrel blit pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        self.sampler = Some(sampler);
        self.bind_group_layout = Some(bind_group_layout);
        self.pipeline_layout = Some(pipeline_layout);
        self.pipelines.clear();
    }

    fn ensure_pipeline(
        &mut self,
        ctx: &RenderCtx<'_>,
        shader: BlitShader<'_>,
        blend: BlendMode,
        format: wgpu::TextureFormat,
    ) {
        let key = (shader.key, blend, format);
        if self.pipelines.contains_key(&key) {
            return;
        }
        let Some(layout) = self.pipeline_layout.as_ref() else { return };

        let source = compose_source(shader.fragment);
        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.label),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
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

        log::debug!("compiled blit pipeline '{}' ({blend:?}, {format:?})", shader.label);
        self.pipelines.insert(key, pipeline);
    }
}

fn compose_source(fragment: &str) -> String {
    let mut source = String::with_capacity(PRELUDE.len() + fragment.len() + 1);
    source.push_str(PRELUDE);
    source.push('\n');
    source.push_str(fragment);
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_uniform_aligned() {
        assert_eq!(std::mem::size_of::<BlitParams>() % 16, 0);
    }

    #[test]
    fn composed_source_defines_both_stages() {
        let src = compose_source(BlitShader::IDENTITY.fragment);
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
        assert!(src.find("fn vs_main") < src.find("fn fs_main"));
    }
}
