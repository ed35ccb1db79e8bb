use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::decode::{Decoder, ReplayStream};

/// Outcome for one archive entry.
///
/// Serializes as `{"fileName", "round", "activities"}` on success and
/// `{"fileName", "error"}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResult {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryOutcome {
    Success { round: Value, activities: Vec<Value> },
    Failure { error: String },
}

impl EntryResult {
    pub fn success(file_name: String, round: Value, activities: Vec<Value>) -> Self {
        Self {
            file_name,
            outcome: EntryOutcome::Success { round, activities },
        }
    }

    pub fn failure(file_name: String, error: impl Into<String>) -> Self {
        Self {
            file_name,
            outcome: EntryOutcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            EntryOutcome::Failure { error } => Some(error),
            EntryOutcome::Success { .. } => None,
        }
    }
}

/// Decode one entry, turning every failure into a result value.
///
/// `opened` is the outcome of opening the entry's stream. Blocks while the
/// decoder reads; run it off the async executor.
pub fn process_entry<R, E>(file_name: String, opened: Result<R, E>, decoder: &dyn Decoder) -> EntryResult
where
    R: Read + Send + 'static,
    E: fmt::Display,
{
    let stream: ReplayStream = match opened {
        Ok(stream) => Box::new(stream),
        Err(err) => return failed(file_name, format!("{err:#}")),
    };

    let session = match decoder.open(stream) {
        Ok(session) => session,
        Err(err) => return failed(file_name, err.to_string()),
    };

    match session.decode().into_round() {
        Ok(round) => {
            debug!(file = %file_name, events = round.events.len(), "decoded entry");
            EntryResult::success(file_name, round.header, round.events)
        }
        Err(err) => failed(file_name, err.to_string()),
    }
}

fn failed(file_name: String, error: String) -> EntryResult {
    debug!(file = %file_name, %error, "entry failed");
    EntryResult::failure(file_name, error)
}
