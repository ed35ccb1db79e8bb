//! The replay decoder capability.
//!
//! The ingestion pipeline never looks inside a replay. It hands a byte
//! stream to a [`Decoder`], gets back a [`Session`], and runs it once. What
//! comes out is a JSON header plus a list of JSON events, passed through to
//! the caller untouched.

mod dissect;

pub use dissect::{DissectDecoder, MatchUpdate, MatchUpdateType};

use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Byte stream of one replay, owned by the session reading it
pub type ReplayStream = Box<dyn Read + Send>;

/// Errors raised while constructing or running a decoder session
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized replay container: {0}")]
    UnrecognizedContainer(String),

    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u8),

    #[error("malformed replay: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("decoder panicked: {0}")]
    Panicked(String),

    #[error("decode task was cancelled")]
    Cancelled,
}

/// How a decode run ended.
#[derive(Debug)]
pub enum DecodeStatus {
    /// The replay signalled its own end
    Complete,
    /// The stream ran out on a record boundary
    EndOfStream,
    Failed(DecodeError),
}

impl DecodeStatus {
    pub fn is_ok(&self) -> bool {
        !matches!(self, DecodeStatus::Failed(_))
    }
}

/// Everything a session produced, including what it read before failing.
#[derive(Debug)]
pub struct Decoded {
    pub header: Value,
    pub events: Vec<Value>,
    pub status: DecodeStatus,
}

impl Decoded {
    /// Keep the output only when the decoder reported success.
    pub fn into_round(self) -> Result<ParsedRound, DecodeError> {
        match self.status {
            DecodeStatus::Failed(err) => Err(err),
            DecodeStatus::Complete | DecodeStatus::EndOfStream => Ok(ParsedRound {
                header: self.header,
                events: self.events,
            }),
        }
    }
}

/// A successfully decoded round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRound {
    pub header: Value,
    pub events: Vec<Value>,
}

/// Turns a byte stream into a decoding session.
///
/// `open` is expected to check only what identifies the format (magic,
/// version); the bulk of the work happens in [`Session::decode`].
pub trait Decoder: Send + Sync {
    fn open(&self, stream: ReplayStream) -> Result<Box<dyn Session>, DecodeError>;
}

/// One decoding run over one stream.
pub trait Session: Send {
    fn decode(self: Box<Self>) -> Decoded;
}
