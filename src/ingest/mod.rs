//! Batch ingestion with per-entry failure isolation.
//!
//! A single upload is decoded directly; an archive upload is walked entry by
//! entry. Whatever happens to one entry is captured in its [`EntryResult`],
//! so a corrupt file in a bundle never costs the caller the other results.

mod batch;
mod entry;
mod single;

pub use batch::{BatchResult, decode_archive, ingest_archive};
pub use entry::{EntryOutcome, EntryResult, process_entry};
pub use single::decode_single;

use tokio::task::JoinError;

use crate::decode::DecodeError;

/// Turn a blocking decode task that did not return normally into the
/// decoder error it stands for.
///
/// # Arguments
///
/// * `err` - The join error of a `spawn_blocking` decode task
///
/// # Returns
///
/// [`DecodeError::Panicked`] carrying the panic payload, or
/// [`DecodeError::Cancelled`] when the runtime dropped the task.
fn join_failure(err: JoinError) -> DecodeError {
    if err.is_cancelled() {
        return DecodeError::Cancelled;
    }

    // Panic payloads are `&str` for literal messages, `String` for formatted ones
    let payload = err.into_panic();
    let message = if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    };
    DecodeError::Panicked(message)
}
