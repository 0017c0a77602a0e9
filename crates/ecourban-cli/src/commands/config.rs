use clap::Subcommand;
use ecourban_core::Config;

use super::Workspace;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole configuration as TOML
    Show,
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "training.epochs", "server.port")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::open()?;
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&ws.config)?);
        }
        ConfigAction::Get { key } => match ws.config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = ws.config;
            config.set(&key, &value)?;
            config.save_in(&ws.dir)?;
            println!("ok");
        }
        ConfigAction::Path => {
            println!("{}", Config::path_in(&ws.dir).display());
        }
    }
    Ok(())
}
