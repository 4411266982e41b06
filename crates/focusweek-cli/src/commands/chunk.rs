use clap::Subcommand;
use focusweek_core::Config;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum ChunkAction {
    /// Add a chunk (sub-step) to a task
    Add {
        task_id: String,
        text: Vec<String>,
    },
    /// Replace a chunk's text
    Edit {
        task_id: String,
        chunk_id: String,
        text: Vec<String>,
    },
    /// Toggle a chunk's done flag
    Toggle {
        task_id: String,
        chunk_id: String,
    },
    /// Delete a chunk
    Delete {
        task_id: String,
        chunk_id: String,
    },
}

pub fn run(action: ChunkAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;
    let task_id = match action {
        ChunkAction::Add { task_id, text } => {
            let chunk = session.add_chunk(&task_id, &text.join(" "))?;
            eprintln!("Chunk added: {}", chunk.id);
            task_id
        }
        ChunkAction::Edit {
            task_id,
            chunk_id,
            text,
        } => {
            session.set_chunk_text(&task_id, &chunk_id, &text.join(" "))?;
            task_id
        }
        ChunkAction::Toggle { task_id, chunk_id } => {
            let done = session.toggle_chunk(&task_id, &chunk_id)?;
            eprintln!("Chunk {chunk_id} done: {done}");
            task_id
        }
        ChunkAction::Delete { task_id, chunk_id } => {
            session.delete_chunk(&task_id, &chunk_id)?;
            task_id
        }
    };
    session.save()?;

    match session.tasks().get(&task_id) {
        Some(task) => print_json(task),
        None => Err(format!("task not found: {task_id}").into()),
    }
}
