use clap::Subcommand;
use focusweek_core::timer::SettingsChanges;
use focusweek_core::{Config, SoundKind};

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current settings
    Show,
    /// Change one or more settings
    Set {
        /// Focus duration in minutes
        #[arg(long)]
        focus: Option<u32>,
        /// Short break duration in minutes
        #[arg(long)]
        short: Option<u32>,
        /// Long break duration in minutes
        #[arg(long)]
        long: Option<u32>,
        /// Completion sounds (on/off)
        #[arg(long, value_parser = parse_switch)]
        sound: Option<bool>,
        /// Completion sound (chime, retro, bell)
        #[arg(long)]
        sound_kind: Option<String>,
        /// Dark theme preference (on/off)
        #[arg(long, value_parser = parse_switch)]
        dark: Option<bool>,
    },
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

pub fn run(action: SettingsAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;
    match action {
        SettingsAction::Show => print_json(session.settings()),
        SettingsAction::Set {
            focus,
            short,
            long,
            sound,
            sound_kind,
            dark,
        } => {
            let changes = SettingsChanges {
                focus_time: focus,
                short_break: short,
                long_break: long,
                sound_enabled: sound,
                sound_type: sound_kind.map(|s| s.parse::<SoundKind>()).transpose()?,
                dark_mode: dark,
            };
            let settings = session.update_settings(&changes)?;
            session.save()?;
            print_json(&settings)
        }
    }
}
