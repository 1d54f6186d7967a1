use std::borrow::Cow;

use crate::driver::{PrismDriver, ShadeDriver, ShadeSettings, UniformDriver};

/// Pass-through vertex stage shared by every scene.
pub const QUAD_VERTEX_SHADER: &str = include_str!("../shaders/quad.vert");
pub const PRISM_FRAGMENT_SHADER: &str = include_str!("../shaders/prism.frag");
pub const SHADE_FRAGMENT_SHADER: &str = include_str!("../shaders/shade.frag");

/// Vertex/fragment source pair handed to the host at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Fully tuned scene ready to mount.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSetup {
    /// Ray-marched prism, animated from wall-clock time.
    Prism { dpr_cap: f32 },
    /// Scroll-driven day cycle over terrain and clouds.
    Shade(ShadeSettings),
}

impl SceneSetup {
    pub fn label(&self) -> &'static str {
        match self {
            SceneSetup::Prism { .. } => "prism",
            SceneSetup::Shade(_) => "shade",
        }
    }

    pub fn sources(&self) -> ShaderSources {
        let fragment = match self {
            SceneSetup::Prism { .. } => PRISM_FRAGMENT_SHADER,
            SceneSetup::Shade(_) => SHADE_FRAGMENT_SHADER,
        };
        ShaderSources::new(QUAD_VERTEX_SHADER, fragment)
    }

    pub fn driver(&self) -> Box<dyn UniformDriver> {
        match self {
            SceneSetup::Prism { dpr_cap } => Box::new(PrismDriver::new(*dpr_cap)),
            SceneSetup::Shade(settings) => Box::new(ShadeDriver::new(*settings)),
        }
    }
}

/// Window-level settings for [`crate::Renderer::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub scene: SceneSetup,
    /// Initial inner size in logical pixels.
    pub window_size: (u32, u32),
    pub title: String,
    /// Pixels scrolled per wheel line or arrow key press.
    pub line_height_px: f32,
}

impl RendererConfig {
    pub fn new(scene: SceneSetup) -> Self {
        Self {
            scene,
            window_size: (1280, 720),
            title: "Cloud-High".to_string(),
            line_height_px: 48.0,
        }
    }
}
