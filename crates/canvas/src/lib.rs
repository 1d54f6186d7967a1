//! Shader canvas for the Cloud-High scenes.
//!
//! A canvas is one full-screen quad drawn by a fragment shader whose uniforms
//! are fed by a scene driver. The overall flow is:
//!
//! ```text
//!   cloudhigh CLI
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ CanvasMount::frame()
//!                          │                    │
//!          wheel / keys ───┘                    ├─▶ UniformDriver::on_frame()
//!          ScrollObserver ─▶ on_scroll()        └─▶ ShaderCanvasHost::draw() ─▶ GPU
//! ```
//!
//! [`ShaderCanvasHost`] owns the graphics objects and never draws on its own;
//! every frame goes through its [`RedrawScheduler`], which collapses bursts of
//! triggers into a single platform request. Drivers decide whether a scene
//! animates continuously ([`PrismDriver`]) or only when something changes
//! ([`ShadeDriver`]).
//!
//! The host talks to the GPU through [`GraphicsBackend`], implemented over
//! wgpu in [`gpu`]. Fragment shaders are written ShaderToy style and wrapped
//! at compile time, see [`compile`].

pub mod backend;
pub mod compile;
pub mod driver;
pub mod error;
pub mod gpu;
pub mod host;
pub mod mount;
pub mod runtime;
pub mod scheduler;
pub mod scroll;
pub mod surface;
pub mod types;
pub mod uniforms;
mod window;

use anyhow::Result;

pub use backend::{ContextSource, GraphicsBackend};
pub use driver::{PrismDriver, ShadeDriver, ShadeSettings, UniformDriver};
pub use error::{FrameError, ShaderError, ShaderStageKind};
pub use host::ShaderCanvasHost;
pub use mount::{CanvasMount, FrameStatus};
pub use runtime::RenderPolicy;
pub use scheduler::{FrameRequester, RedrawScheduler};
pub use scroll::ScrollObserver;
pub use surface::{SurfaceMetrics, SurfaceSize, Viewport};
pub use types::{RendererConfig, SceneSetup, ShaderSources};
pub use uniforms::UniformSet;

/// Entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window, mounts the scene and blocks until the window closes.
    ///
    /// Fails only when the window itself cannot be created. A missing GPU or
    /// a shader that does not build leaves the window open and blank.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config)
    }
}
