//! Presents the backing texture on the swapchain.
//!
//! Scenes render at the capped backing resolution; the blit stretches that
//! image over the full window with linear filtering.

use crate::error::{ShaderError, ShaderStageKind};
use crate::surface::SurfaceSize;

use super::pipeline;

const BLIT_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(set = 0, binding = 0) uniform texture2D backing;
layout(set = 0, binding = 1) uniform sampler backing_sampler;

void main() {
    out_color = texture(sampler2D(backing, backing_sampler), vec2(v_uv.x, 1.0 - v_uv.y));
}
";

struct BackingTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    size: SurfaceSize,
}

pub(crate) struct BlitPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,
    target: Option<BackingTarget>,
}

impl BlitPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let vertex = pipeline::shader_module(
            device,
            ShaderStageKind::Vertex,
            BLIT_VERTEX_GLSL.to_string(),
        )
        .map_err(|log| ShaderError::ContextUnavailable(format!("blit vertex shader: {log}")))?;
        let fragment = pipeline::shader_module(
            device,
            ShaderStageKind::Fragment,
            BLIT_FRAGMENT_GLSL.to_string(),
        )
        .map_err(|log| ShaderError::ContextUnavailable(format!("blit fragment shader: {log}")))?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
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
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            pipeline,
            layout,
            sampler,
            format,
            target: None,
        })
    }

    /// Reallocates the backing texture when its pixel size changes.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        let size = SurfaceSize::new(size.width.max(1), size.height.max(1));
        if self.target.as_ref().is_some_and(|target| target.size == size) {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("canvas backing"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit bind group"),
            layout: &self.layout,
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

        tracing::debug!(width = size.width, height = size.height, "allocated backing texture");
        self.target = Some(BackingTarget {
            _texture: texture,
            view,
            bind_group,
            size,
        });
    }

    pub(crate) fn backing_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|target| &target.view)
    }

    pub(crate) fn encode(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &target.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
