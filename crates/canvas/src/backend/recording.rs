use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::{BufferId, ContextSource, GraphicsBackend, ProgramId, ShaderId};
use crate::error::{FrameError, ShaderError, ShaderStageKind};
use crate::surface::SurfaceMetrics;
use crate::uniforms::UniformSet;

/// Everything a [`RecordingBackend`] has done, shared with the test body.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    next_name: u32,
    pub shaders: HashSet<u32>,
    pub programs: HashSet<u32>,
    pub buffers: HashSet<u32>,
    pub uploads: Vec<UniformSet>,
    pub draws: u32,
    pub configures: Vec<SurfaceMetrics>,
    pub fail_compile: Option<ShaderStageKind>,
    pub fail_link: bool,
    pub fail_draw: bool,
    /// Makes every draw report that nothing was presented.
    pub skip_draws: bool,
    stages: Vec<(u32, ShaderStageKind)>,
}

impl Ledger {
    fn name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len() + self.buffers.len()
    }

    pub fn last_upload(&self) -> Option<UniformSet> {
        self.uploads.last().copied()
    }
}

pub(crate) type SharedLedger = Rc<RefCell<Ledger>>;

pub(crate) struct RecordingSource {
    pub ledger: SharedLedger,
    pub available: bool,
}

impl RecordingSource {
    pub fn new() -> (Self, SharedLedger) {
        let ledger = SharedLedger::default();
        (
            Self {
                ledger: ledger.clone(),
                available: true,
            },
            ledger,
        )
    }

    pub fn unavailable() -> Self {
        Self {
            ledger: SharedLedger::default(),
            available: false,
        }
    }
}

impl ContextSource for RecordingSource {
    type Backend = RecordingBackend;

    fn acquire(&mut self) -> Result<RecordingBackend, ShaderError> {
        if !self.available {
            return Err(ShaderError::ContextUnavailable("no adapter".into()));
        }
        Ok(RecordingBackend {
            ledger: self.ledger.clone(),
        })
    }
}

pub(crate) struct RecordingBackend {
    ledger: SharedLedger,
}

impl GraphicsBackend for RecordingBackend {
    fn create_shader(&mut self, stage: ShaderStageKind) -> ShaderId {
        let mut ledger = self.ledger.borrow_mut();
        let name = ledger.name();
        ledger.shaders.insert(name);
        ledger.stages.push((name, stage));
        ShaderId(name)
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> Result<(), String> {
        let ledger = self.ledger.borrow();
        let stage = ledger
            .stages
            .iter()
            .find(|(name, _)| *name == shader.0)
            .map(|(_, stage)| *stage);
        if stage.is_some() && stage == ledger.fail_compile {
            return Err(format!("0:1: syntax error near '{}'", source.trim()));
        }
        Ok(())
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.ledger.borrow_mut().shaders.remove(&shader.0);
    }

    fn create_program(&mut self) -> ProgramId {
        let mut ledger = self.ledger.borrow_mut();
        let name = ledger.name();
        ledger.programs.insert(name);
        ProgramId(name)
    }

    fn link_program(
        &mut self,
        _program: ProgramId,
        _vertex: ShaderId,
        _fragment: ShaderId,
    ) -> Result<(), String> {
        if self.ledger.borrow().fail_link {
            return Err("varying v_uv not written by vertex stage".into());
        }
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.ledger.borrow_mut().programs.remove(&program.0);
    }

    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> BufferId {
        assert_eq!(vertices.len(), 4, "canvas geometry is a 4-vertex strip");
        let mut ledger = self.ledger.borrow_mut();
        let name = ledger.name();
        ledger.buffers.insert(name);
        BufferId(name)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.ledger.borrow_mut().buffers.remove(&buffer.0);
    }

    fn configure_surface(&mut self, metrics: &SurfaceMetrics) {
        self.ledger.borrow_mut().configures.push(*metrics);
    }

    fn upload_uniforms(&mut self, _program: ProgramId, uniforms: &UniformSet) {
        self.ledger.borrow_mut().uploads.push(*uniforms);
    }

    fn draw_strip(
        &mut self,
        _program: ProgramId,
        _buffer: BufferId,
        vertex_count: u32,
        clear: [f64; 4],
    ) -> Result<bool, FrameError> {
        assert_eq!(vertex_count, 4);
        assert_eq!(clear, super::CLEAR_COLOR);
        let mut ledger = self.ledger.borrow_mut();
        if ledger.fail_draw {
            return Err(FrameError::Device("device lost".into()));
        }
        if ledger.skip_draws {
            return Ok(false);
        }
        ledger.draws += 1;
        Ok(true)
    }
}
