pub mod chunk;
pub mod config;
pub mod note;
pub mod settings;
pub mod status;
pub mod task;
pub mod timer;

use focusweek_core::{open_gateway, Config, Session};
use serde::Serialize;
use tracing::debug;

use crate::sink::TerminalSink;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the configured gateway and restore the session from it.
pub fn open_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    debug!(backend = ?config.storage.backend, "opening session");
    let gateway = open_gateway(config)?;
    Ok(Session::load(gateway, Box::new(TerminalSink), config.defaults)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
