use clap::Subcommand;
use focusweek_core::Config;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum NoteAction {
    /// Capture a note
    Add {
        text: Vec<String>,
    },
    /// List notes, newest first
    List,
    /// Delete a note
    Delete {
        id: String,
    },
    /// Delete every note
    Clear,
}

pub fn run(action: NoteAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;
    match action {
        NoteAction::Add { text } => {
            let note = session.add_note(&text.join(" "))?;
            print_json(&note)?;
        }
        NoteAction::List => print_json(session.notes().notes())?,
        NoteAction::Delete { id } => {
            let note = session.delete_note(&id)?;
            print_json(&note)?;
        }
        NoteAction::Clear => {
            let cleared = session.clear_notes();
            print_json(&serde_json::json!({ "cleared": cleared }))?;
        }
    }
    session.save()?;
    Ok(())
}
