use serde::Serialize;
use thrive_core::{Event, Snapshot};

use crate::state::{print_json, CliSession};

#[derive(Serialize)]
struct StatusView {
    #[serde(flatten)]
    snapshot: Snapshot,
    /// Events from seconds that elapsed since the previous command.
    caught_up: Vec<Event>,
}

/// Print the current snapshot after catching up elapsed time.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;
    print_json(&StatusView {
        snapshot: session.store.snapshot(),
        caught_up: session.take_pending(),
    })?;
    session.save()
}
