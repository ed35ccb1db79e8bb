//! Request-fatal failures.
//!
//! Anything that goes wrong before per-entry processing starts ends the
//! request. Entry-local failures never become an [`IngestError`]; they are
//! recorded in the batch result instead.

use thiserror::Error;

use crate::decode::DecodeError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    MissingUpload(String),

    #[error("{0}")]
    UploadUnreadable(String),

    #[error("{0}")]
    ArchiveUnreadable(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl IngestError {
    /// Which step of the request failed, phrased for API callers
    pub fn context(&self) -> &'static str {
        match self {
            IngestError::MissingUpload(_) => "Error fetching form file",
            IngestError::UploadUnreadable(_) => "Error copying file to buffer",
            IngestError::ArchiveUnreadable(_) => "Error creating zip reader",
            IngestError::Decode(_) => "Error decoding replay",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
