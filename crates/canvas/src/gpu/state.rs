use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{BufferId, ContextSource, GraphicsBackend, ProgramId, ShaderId};
use crate::compile;
use crate::error::{FrameError, ShaderError, ShaderStageKind};
use crate::runtime::FrameStats;
use crate::surface::SurfaceMetrics;
use crate::uniforms::{UniformSet, UNIFORM_BLOCK_SIZE};

use super::blit::BlitPass;
use super::context::GpuContext;
use super::pipeline;

/// Acquires a [`WgpuBackend`] for a winit window.
pub struct WgpuContextSource {
    window: Arc<Window>,
}

impl WgpuContextSource {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl ContextSource for WgpuContextSource {
    type Backend = WgpuBackend;

    fn acquire(&mut self) -> Result<WgpuBackend, ShaderError> {
        WgpuBackend::new(Arc::clone(&self.window))
    }
}

struct ShaderObject {
    stage: ShaderStageKind,
    module: Option<wgpu::ShaderModule>,
}

struct LinkedProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// [`GraphicsBackend`] over wgpu.
///
/// Scenes draw into an offscreen texture sized to the capped backing store,
/// which is then blitted over the whole swapchain image.
pub struct WgpuBackend {
    // Declared before `window`: the surface must drop first.
    context: GpuContext,
    blit: BlitPass,
    uniform_layout: wgpu::BindGroupLayout,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, Option<LinkedProgram>>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    next_name: u32,
    stats: FrameStats,
    window: Arc<Window>,
}

impl WgpuBackend {
    pub fn new(window: Arc<Window>) -> Result<Self, ShaderError> {
        let context = GpuContext::new(window.as_ref(), window.inner_size())?;
        let blit = BlitPass::new(&context.device, context.surface_format)?;
        let uniform_layout = pipeline::uniform_layout(&context.device);
        Ok(Self {
            context,
            blit,
            uniform_layout,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            next_name: 1,
            stats: FrameStats::new(Instant::now()),
            window,
        })
    }

    fn allocate_name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn module(&self, shader: ShaderId, stage: ShaderStageKind) -> Result<&wgpu::ShaderModule, String> {
        let object = self
            .shaders
            .get(&shader)
            .ok_or_else(|| format!("unknown {stage} shader object {}", shader.0))?;
        if object.stage != stage {
            return Err(format!("shader object {} is not a {stage} shader", shader.0));
        }
        object
            .module
            .as_ref()
            .ok_or_else(|| format!("{stage} shader {} has not been compiled", shader.0))
    }

    fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>, FrameError> {
        let acquisition_start = Instant::now();
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring a frame; skipping");
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Outdated) => {
                debug!("surface outdated; reconfiguring");
                self.context.resize(self.window.inner_size());
                self.context.reconfigure();
                return Ok(None);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(FrameError::Device("out of memory acquiring frame".to_string()));
            }
            Err(other) => return Err(FrameError::SurfaceLost(other.to_string())),
        };
        let acquisition = acquisition_start.elapsed();
        if acquisition > Duration::from_millis(50) {
            warn!(
                "acquiring frame took {}ms",
                acquisition.as_millis()
            );
        }
        Ok(Some(frame))
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_shader(&mut self, stage: ShaderStageKind) -> ShaderId {
        let id = ShaderId(self.allocate_name());
        self.shaders.insert(id, ShaderObject { stage, module: None });
        id
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> Result<(), String> {
        let stage = self
            .shaders
            .get(&shader)
            .map(|object| object.stage)
            .ok_or_else(|| format!("unknown shader object {}", shader.0))?;
        let prepared = compile::prepare(stage, source);
        compile::validate(stage, &prepared)?;
        let module = pipeline::shader_module(&self.context.device, stage, prepared)?;
        if let Some(object) = self.shaders.get_mut(&shader) {
            object.module = Some(module);
        }
        Ok(())
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> ProgramId {
        let id = ProgramId(self.allocate_name());
        self.programs.insert(id, None);
        id
    }

    fn link_program(
        &mut self,
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<(), String> {
        if !self.programs.contains_key(&program) {
            return Err(format!("unknown program object {}", program.0));
        }
        let device = &self.context.device;
        let vertex_module = self.module(vertex, ShaderStageKind::Vertex)?;
        let fragment_module = self.module(fragment, ShaderStageKind::Fragment)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let render_pipeline = pipeline::scene_pipeline(
            device,
            &self.uniform_layout,
            vertex_module,
            fragment_module,
            self.context.surface_format,
        );
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas uniforms"),
            size: UNIFORM_BLOCK_SIZE as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("canvas uniform bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(err.to_string());
        }

        self.programs.insert(
            program,
            Some(LinkedProgram {
                pipeline: render_pipeline,
                uniform_buffer,
                bind_group,
            }),
        );
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
    }

    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> BufferId {
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("canvas quad"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = BufferId(self.allocate_name());
        self.buffers.insert(id, buffer);
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn configure_surface(&mut self, metrics: &SurfaceMetrics) {
        self.context.resize(self.window.inner_size());
        self.blit.resize(&self.context.device, metrics.backing);
    }

    fn upload_uniforms(&mut self, program: ProgramId, uniforms: &UniformSet) {
        if let Some(Some(linked)) = self.programs.get(&program) {
            self.context
                .queue
                .write_buffer(&linked.uniform_buffer, 0, uniforms.as_bytes());
        }
    }

    fn draw_strip(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        vertex_count: u32,
        clear: [f64; 4],
    ) -> Result<bool, FrameError> {
        let Some(frame) = self.acquire_frame()? else {
            return Ok(false);
        };
        let linked = self
            .programs
            .get(&program)
            .and_then(Option::as_ref)
            .ok_or_else(|| FrameError::Device(format!("program {} is not linked", program.0)))?;
        let vertices = self
            .buffers
            .get(&buffer)
            .ok_or_else(|| FrameError::Device(format!("unknown vertex buffer {}", buffer.0)))?;
        let backing = self
            .blit
            .backing_view()
            .ok_or_else(|| FrameError::Device("surface was never configured".to_string()))?;

        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("canvas frame"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: backing,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0],
                            g: clear[1],
                            b: clear[2],
                            a: clear[3],
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&linked.pipeline);
            pass.set_bind_group(0, &linked.bind_group, &[]);
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.draw(0..vertex_count, 0..1);
        }
        self.blit.encode(&mut encoder, &surface_view);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(FrameError::Device(err.to_string()));
        }
        frame.present();

        if let Some(fps) = self.stats.record(Instant::now()) {
            debug!(
                fps = fps.round(),
                frame_count = self.stats.total_frames(),
                "render stats"
            );
        }
        Ok(true)
    }
}
