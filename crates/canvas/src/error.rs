use std::fmt;

/// Pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures while bringing a canvas up. All of them are terminal for the
/// mount: the canvas renders nothing afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("{stage} shader failed to compile:\n{log}")]
    CompileError { stage: ShaderStageKind, log: String },
    #[error("shader program failed to link:\n{log}")]
    LinkError { log: String },
}

/// Fault raised while drawing a frame; fatal for the mount.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("drawing surface lost: {0}")]
    SurfaceLost(String),
    #[error("GPU fault during draw: {0}")]
    Device(String),
}
