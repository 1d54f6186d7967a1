//! The narrow graphics API the canvas host drives.
//!
//! Objects are addressed by opaque integer names in the style of GL: the host
//! creates, links, draws with, and deletes them explicitly, which keeps every
//! acquisition paired with a release that tests can count.

#[cfg(test)]
pub(crate) mod recording;

use crate::error::{FrameError, ShaderError, ShaderStageKind};
use crate::surface::SurfaceMetrics;
use crate::uniforms::UniformSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Opaque black.
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

pub trait GraphicsBackend {
    fn create_shader(&mut self, stage: ShaderStageKind) -> ShaderId;

    /// Compiles `source` into `shader`; the error is the compiler log.
    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> Result<(), String>;

    fn delete_shader(&mut self, shader: ShaderId);

    fn create_program(&mut self) -> ProgramId;

    /// Links both stages into `program`; the error is the linker log.
    fn link_program(
        &mut self,
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<(), String>;

    fn delete_program(&mut self, program: ProgramId);

    /// Uploads a static vertex buffer of tightly packed `vec2` positions.
    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> BufferId;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Resizes the backing store and viewport transform.
    fn configure_surface(&mut self, metrics: &SurfaceMetrics);

    fn upload_uniforms(&mut self, program: ProgramId, uniforms: &UniformSet);

    /// Clears to `clear` and draws `vertex_count` vertices as a triangle strip.
    ///
    /// Returns `Ok(false)` when no frame could be presented this time, for
    /// example when the surface had no image ready.
    fn draw_strip(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        vertex_count: u32,
        clear: [f64; 4],
    ) -> Result<bool, FrameError>;
}

/// Hands out a graphics context for a drawing surface.
pub trait ContextSource {
    type Backend: GraphicsBackend;

    /// Fails with [`ShaderError::ContextUnavailable`] when no context exists.
    fn acquire(&mut self) -> Result<Self::Backend, ShaderError>;
}
