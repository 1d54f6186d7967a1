use crate::backend::{BufferId, ContextSource, GraphicsBackend, ProgramId, ShaderId, CLEAR_COLOR};
use crate::error::{FrameError, ShaderError, ShaderStageKind};
use crate::scheduler::{FrameRequester, RedrawScheduler};
use crate::surface::{SurfaceMetrics, Viewport};
use crate::uniforms::UniformSet;

/// Clip-space quad drawn as a triangle strip.
pub const QUAD_VERTICES: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// A linked program bound to the full-screen quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHandle {
    pub program: ProgramId,
    pub geometry: BufferId,
    pub vertex_count: u32,
    pub components_per_vertex: u32,
}

struct GpuObjects {
    handle: ProgramHandle,
    vertex: ShaderId,
    fragment: ShaderId,
}

/// Owns one drawing surface, its compiled program, and its redraw scheduler.
pub struct ShaderCanvasHost<S: ContextSource> {
    source: S,
    backend: Option<S::Backend>,
    objects: Option<GpuObjects>,
    scheduler: RedrawScheduler,
    uniforms: UniformSet,
    metrics: Option<SurfaceMetrics>,
    dpr_cap: f32,
    draws: u64,
    disposed: bool,
}

impl<S: ContextSource> ShaderCanvasHost<S> {
    pub fn new(source: S, requester: Box<dyn FrameRequester>, dpr_cap: f32) -> Self {
        Self {
            source,
            backend: None,
            objects: None,
            scheduler: RedrawScheduler::new(requester),
            uniforms: UniformSet::default(),
            metrics: None,
            dpr_cap,
            draws: 0,
            disposed: false,
        }
    }

    /// Acquires a context and builds the program. On any failure every object
    /// created so far is released before the error is returned.
    pub fn initialize(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        if self.disposed {
            return Err(ShaderError::ContextUnavailable(
                "canvas has been disposed".into(),
            ));
        }
        if let Some(objects) = &self.objects {
            return Ok(objects.handle);
        }

        let mut backend = self.source.acquire()?;
        let vertex = compile_stage(&mut backend, ShaderStageKind::Vertex, vertex_source)?;
        let fragment =
            match compile_stage(&mut backend, ShaderStageKind::Fragment, fragment_source) {
                Ok(fragment) => fragment,
                Err(err) => {
                    backend.delete_shader(vertex);
                    return Err(err);
                }
            };

        let program = backend.create_program();
        if let Err(log) = backend.link_program(program, vertex, fragment) {
            backend.delete_program(program);
            backend.delete_shader(vertex);
            backend.delete_shader(fragment);
            return Err(ShaderError::LinkError { log });
        }

        let geometry = backend.create_vertex_buffer(&QUAD_VERTICES);
        let handle = ProgramHandle {
            program,
            geometry,
            vertex_count: QUAD_VERTICES.len() as u32,
            components_per_vertex: 2,
        };
        if let Some(metrics) = &self.metrics {
            backend.configure_surface(metrics);
        }
        self.objects = Some(GpuObjects {
            handle,
            vertex,
            fragment,
        });
        self.backend = Some(backend);
        Ok(handle)
    }

    /// Recomputes the backing store for `viewport`. Returns `true` when the
    /// size actually changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if self.disposed {
            return false;
        }
        let metrics = SurfaceMetrics::compute(viewport, self.dpr_cap);
        if self.metrics == Some(metrics) {
            return false;
        }
        self.metrics = Some(metrics);
        self.uniforms
            .set_resolution(metrics.backing.width, metrics.backing.height);
        if let Some(backend) = self.backend.as_mut() {
            backend.configure_surface(&metrics);
        }
        true
    }

    pub fn request_redraw(&mut self) -> bool {
        if self.objects.is_none() {
            return false;
        }
        self.scheduler.request()
    }

    /// Consumes the pending request when a frame callback fires.
    pub fn take_frame(&mut self) -> bool {
        self.scheduler.take()
    }

    /// Uploads the uniforms and draws the quad. Returns whether a frame was
    /// actually presented; only presented frames count towards `draw_count`.
    pub fn draw(&mut self) -> Result<bool, FrameError> {
        let (Some(backend), Some(objects)) = (self.backend.as_mut(), self.objects.as_ref()) else {
            return Ok(false);
        };
        let handle = objects.handle;
        backend.upload_uniforms(handle.program, &self.uniforms);
        let presented = backend.draw_strip(
            handle.program,
            handle.geometry,
            handle.vertex_count,
            CLEAR_COLOR,
        )?;
        if presented {
            self.draws += 1;
        }
        Ok(presented)
    }

    /// Releases the program, both stages and the geometry, and cancels any
    /// pending frame. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.scheduler.cancel();
        if let (Some(backend), Some(objects)) = (self.backend.as_mut(), self.objects.take()) {
            backend.delete_program(objects.handle.program);
            backend.delete_shader(objects.vertex);
            backend.delete_shader(objects.fragment);
            backend.delete_buffer(objects.handle.geometry);
        }
        self.backend = None;
        self.disposed = true;
    }

    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformSet {
        &mut self.uniforms
    }

    pub fn metrics(&self) -> Option<SurfaceMetrics> {
        self.metrics
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn is_initialized(&self) -> bool {
        self.objects.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.is_pending()
    }
}

impl<S: ContextSource> Drop for ShaderCanvasHost<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn compile_stage<B: GraphicsBackend>(
    backend: &mut B,
    stage: ShaderStageKind,
    source: &str,
) -> Result<ShaderId, ShaderError> {
    let shader = backend.create_shader(stage);
    if let Err(log) = backend.compile_shader(shader, source) {
        backend.delete_shader(shader);
        return Err(ShaderError::CompileError { stage, log });
    }
    Ok(shader)
}
