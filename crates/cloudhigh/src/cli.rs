use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sceneconfig::{SceneKind, WindowSize};

#[derive(Parser, Debug)]
#[command(
    name = "cloudhigh",
    author,
    version,
    about = "Cloud-High shader scenes",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scene to open: `prism` or `shade` (defaults to the config, else `shade`).
    #[arg(value_name = "SCENE", value_parser = parse_scene)]
    pub scene: Option<SceneKind>,

    /// Read configuration from FILE instead of the platform config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial window size in logical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_window_size)]
    pub size: Option<WindowSize>,

    /// Upper bound on the device pixel ratio used for the backing store.
    #[arg(long, value_name = "RATIO", value_parser = parse_dpr_cap)]
    pub dpr_cap: Option<f32>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available scenes and their effective tuning.
    Scenes(ScenesArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ScenesArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration file path.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_scene(value: &str) -> Result<SceneKind, String> {
    value.parse()
}

pub fn parse_window_size(value: &str) -> Result<WindowSize, String> {
    value.parse()
}

pub fn parse_dpr_cap(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("dpr cap must not be empty".to_string());
    }
    let cap: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid dpr cap '{trimmed}'; expected a number such as 2"))?;
    if !cap.is_finite() || cap < 1.0 {
        return Err(format!("dpr cap must be at least 1 (got {trimmed})"));
    }
    Ok(cap)
}
