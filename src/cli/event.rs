//! Session event recording command

use clap::Subcommand;
use guardian_core::{error::Result, session::record_event, SessionEvent, StateStore};
use tracing::warn;

use super::helpers::{print_json, Context};

#[derive(Subcommand, Debug)]
pub enum EventAction {
    /// Lines of code written to a file
    CodeWritten {
        #[arg(long)]
        file: String,

        #[arg(long)]
        lines: u32,
    },

    /// An error surfaced during the session
    Error {
        #[arg(long)]
        message: String,
    },

    /// A file was edited
    FileEdit {
        #[arg(long)]
        file: String,
    },

    /// The user corrected the assistant
    Correction {
        #[arg(long)]
        message: String,
    },
}

impl From<EventAction> for SessionEvent {
    fn from(action: EventAction) -> Self {
        match action {
            EventAction::CodeWritten { file, lines } => SessionEvent::CodeWritten { file, lines },
            EventAction::Error { message } => SessionEvent::Error { message },
            EventAction::FileEdit { file } => SessionEvent::FileEdit { file },
            EventAction::Correction { message } => SessionEvent::Correction { message },
        }
    }
}

/// Store for recording events
///
/// A state directory that cannot be created is not fatal: the event is then
/// evaluated against in-memory state only.
fn event_store(ctx: &Context) -> StateStore {
    match ctx.write_store() {
        Ok(store) => store,
        Err(e) => {
            warn!("Failed to prepare state directory: {}", e);
            ctx.read_store()
        }
    }
}

/// Handle event command
pub fn handle(ctx: &Context, action: EventAction, session: Option<String>) -> Result<()> {
    let store = event_store(ctx);
    let event = SessionEvent::from(action);

    let outcome = record_event(&store, &event, session.as_deref(), chrono::Utc::now());
    print_json(&outcome)
}
