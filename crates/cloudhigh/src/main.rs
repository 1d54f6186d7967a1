mod cli;
mod paths;
mod run;
mod scenes;

use anyhow::Result;
use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();
    timeline::register_once();

    match cli.command {
        Some(Command::Scenes(args)) => {
            let loaded = run::load_config(cli.run.config.as_deref())?;
            scenes::print(&loaded.config, args.json)
        }
        Some(Command::Config(config_cmd)) => {
            handle_config_command(config_cmd.action, cli.run.config.as_deref())
        }
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction, explicit: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Where => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => AppPaths::discover()?.config_file(),
            };
            let status = if path.exists() { "present" } else { "missing" };
            println!("{} ({status})", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let loaded = run::load_config(explicit)?;
            print!("{}", loaded.config.to_toml_string()?);
            Ok(())
        }
    }
}
