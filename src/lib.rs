//! # replay-ingest
//!
//! An HTTP service that decodes uploaded game replays.
//!
//! Callers upload either a single replay or a zip archive bundling many.
//! Archives are walked in central directory order and every file is decoded
//! on its own: a corrupt entry shows up as an error next to its name while
//! the rest of the batch still decodes.
//!
//! ## Features
//!
//! - Zip central directory walker over in-memory uploads (ZIP64, STORED, DEFLATE, CRC-32 checked)
//! - Per-entry failure isolation, including decoder panics
//! - Optional bounded parallel decoding that keeps archive order
//! - Pluggable [`Decoder`](decode::Decoder), with a bundled `dissect` container decoder
//!
//! ## Example
//!
//! ```no_run
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use replay_ingest::{DissectDecoder, UploadBuffer, ingest_archive};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let upload = UploadBuffer::new(std::fs::read("rounds.zip")?);
//!     let batch = ingest_archive(upload, Arc::new(DissectDecoder), NonZeroUsize::MIN).await?;
//!
//!     for entry in batch.entries() {
//!         match entry.error() {
//!             Some(err) => println!("{}: {}", entry.file_name, err),
//!             None => println!("{}: ok", entry.file_name),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod decode;
pub mod error;
pub mod ingest;
pub mod io;
pub mod logging;
pub mod server;
pub mod zip;

pub use cli::Cli;
pub use decode::{Decoder, DissectDecoder, ParsedRound};
pub use error::IngestError;
pub use ingest::{BatchResult, EntryResult, decode_single, ingest_archive};
pub use io::{ReadAt, UploadBuffer};
pub use server::{ServerConfig, router};
pub use crate::zip::{ZipArchive, ZipFileEntry};
