use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use canvas::{Renderer, RendererConfig, SceneSetup, ShadeSettings};
use sceneconfig::{SceneConfig, SceneKind};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

/// Configuration plus the file it came from (which may not exist).
pub struct LoadedConfig {
    pub config: SceneConfig,
    pub path: PathBuf,
}

pub fn run(args: RunArgs) -> Result<()> {
    let loaded = load_config(args.config.as_deref())?;
    let scene = args.scene.unwrap_or_else(|| loaded.config.default_scene());
    let renderer_config = build_renderer_config(&args, &loaded.config, scene)?;
    tracing::info!(
        %scene,
        config = %loaded.path.display(),
        width = renderer_config.window_size.0,
        height = renderer_config.window_size.1,
        "starting cloudhigh"
    );
    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads an explicit `--config` file, or the platform config when present.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        return Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
        });
    }

    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    let config = SceneConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(config = %path.display(), exists = path.exists(), "resolved config path");
    Ok(LoadedConfig { config, path })
}

/// Resolves a scene's tuning from the config, with an optional dpr cap
/// override from the command line.
///
/// Easing names resolve against the process-wide registry, so
/// [`timeline::register_once`] must have run first.
pub fn scene_setup(config: &SceneConfig, scene: SceneKind, dpr_cap: Option<f32>) -> Result<SceneSetup> {
    let dpr_cap = dpr_cap.unwrap_or_else(|| config.dpr_cap(scene));
    match scene {
        SceneKind::Prism => Ok(SceneSetup::Prism { dpr_cap }),
        SceneKind::Shade => {
            let shade = &config.shade;
            let intro_easing = timeline::lookup(&shade.intro_easing)
                .with_context(|| format!("invalid shade.intro_easing '{}'", shade.intro_easing))?;
            Ok(SceneSetup::Shade(ShadeSettings {
                dpr_cap,
                intro_duration: shade.intro_duration,
                intro_easing,
                time_span: shade.time_span,
                scroll_pages: shade.scroll_pages,
            }))
        }
    }
}

pub fn build_renderer_config(
    args: &RunArgs,
    config: &SceneConfig,
    scene: SceneKind,
) -> Result<RendererConfig> {
    let mut renderer_config = RendererConfig::new(scene_setup(config, scene, args.dpr_cap)?);
    if let Some(size) = args.size.or(config.window.size) {
        renderer_config.window_size = (size.width, size.height);
    }
    if let Some(title) = args.title.clone().or_else(|| config.window.title.clone()) {
        renderer_config.title = title;
    }
    renderer_config.line_height_px = config.window.line_height_px;
    Ok(renderer_config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sceneconfig::WindowSize;
    use timeline::Easing;

    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            scene: None,
            config: None,
            size: None,
            dpr_cap: None,
            title: None,
        }
    }

    #[test]
    fn config_values_flow_into_shade_settings() {
        let config = SceneConfig::from_toml_str(
            r#"
            [shade]
            intro_duration = "1500ms"
            intro_easing = "linear"
            time_span = 120.0
            scroll_pages = 4
            "#,
        )
        .unwrap();
        timeline::register_once();
        let setup = scene_setup(&config, SceneKind::Shade, None).unwrap();
        assert_eq!(
            setup,
            SceneSetup::Shade(ShadeSettings {
                dpr_cap: 1.0,
                intro_duration: Duration::from_millis(1500),
                intro_easing: Easing::Linear,
                time_span: 120.0,
                scroll_pages: 4.0,
            })
        );
    }

    #[test]
    fn flags_override_config() {
        let config = SceneConfig::from_toml_str(
            r#"
            [window]
            size = "640x480"
            title = "From config"
            "#,
        )
        .unwrap();
        let mut args = args();
        args.size = Some(WindowSize {
            width: 1024,
            height: 768,
        });
        args.dpr_cap = Some(3.0);

        let built = build_renderer_config(&args, &config, SceneKind::Prism).unwrap();
        assert_eq!(built.window_size, (1024, 768));
        assert_eq!(built.title, "From config");
        assert_eq!(built.scene, SceneSetup::Prism { dpr_cap: 3.0 });
    }

    #[test]
    fn wheel_line_height_comes_from_window_section() {
        let config = SceneConfig::from_toml_str(
            r#"
            [window]
            line_height_px = 30.0
            "#,
        )
        .unwrap();
        let built = build_renderer_config(&args(), &config, SceneKind::Prism).unwrap();
        assert_eq!(built.line_height_px, 30.0);

        let defaults = build_renderer_config(&args(), &SceneConfig::default(), SceneKind::Prism)
            .unwrap();
        assert_eq!(defaults.line_height_px, 48.0);
    }

    #[test]
    fn unknown_easing_is_reported() {
        let mut config = SceneConfig::default();
        config.shade.intro_easing = "bounce".to_string();
        timeline::register_once();
        let err = scene_setup(&config, SceneKind::Shade, None).unwrap_err();
        assert!(format!("{err:#}").contains("bounce"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
