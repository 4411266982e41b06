use clap::Subcommand;
use focusweek_core::Config;
use serde::Serialize;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. `storage.backend` or `defaults.focusTime`
    Get { key: String },
    /// Change one setting and write config.toml
    Set { key: String, value: String },
    /// Print the whole configuration
    List,
    /// Overwrite config.toml with the defaults
    Reset,
}

#[derive(Serialize)]
struct Entry<'a> {
    key: &'a str,
    value: serde_json::Value,
}

fn entry<'a>(config: &Config, key: &'a str) -> Result<Entry<'a>, Box<dyn std::error::Error>> {
    let value = config
        .get(key)
        .ok_or_else(|| format!("unknown key: {key}"))?;
    Ok(Entry { key, value })
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => print_json(&entry(&Config::load()?, &key)?),
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            print_json(&entry(&config, &key)?)
        }
        ConfigAction::List => print_json(&Config::load()?),
        ConfigAction::Reset => {
            let defaults = Config::default();
            defaults.save()?;
            eprintln!("configuration reset");
            print_json(&defaults)
        }
    }
}
