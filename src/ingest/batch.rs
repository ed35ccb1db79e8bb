use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decode::Decoder;
use crate::error::{IngestError, Result};
use crate::io::UploadBuffer;
use crate::zip::{ZipArchive, ZipFileEntry};

use super::entry::{EntryResult, process_entry};
use super::join_failure;

/// Per-entry results of one archive, in central directory order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    entries: Vec<EntryResult>,
}

impl BatchResult {
    pub fn new(entries: Vec<EntryResult>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EntryResult] {
        &self.entries
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_success()).count()
    }
}

impl IntoIterator for BatchResult {
    type Item = EntryResult;
    type IntoIter = std::vec::IntoIter<EntryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Open an uploaded archive and decode every file in it.
///
/// # Arguments
///
/// * `upload` - The buffered request upload, expected to be a zip archive
/// * `decoder` - Decoder shared by every entry of the archive
/// * `workers` - How many entries may be decoded at the same time
///
/// # Returns
///
/// One [`EntryResult`] per non-directory entry, in central directory order.
///
/// # Errors
///
/// Only an unreadable archive fails the call
/// ([`IngestError::ArchiveUnreadable`]); entry failures are part of the
/// returned batch.
pub async fn ingest_archive(
    upload: UploadBuffer,
    decoder: Arc<dyn Decoder>,
    workers: NonZeroUsize,
) -> Result<BatchResult> {
    let size = upload.len();

    // Parse the central directory up front: a broken index rejects the
    // whole request before any entry is decoded
    let archive = ZipArchive::open(upload)
        .await
        .map_err(|err| IngestError::ArchiveUnreadable(format!("{err:#}")))?;

    info!(
        bytes = size,
        entries = archive.entries().len(),
        "opened replay archive"
    );

    let batch = decode_archive(Arc::new(archive), decoder, workers).await;

    info!(
        results = batch.len(),
        failures = batch.failures(),
        "decoded replay archive"
    );
    Ok(batch)
}

/// Decode each non-directory entry of `archive`.
///
/// At most `workers` entries are in flight at once. Results come back in
/// directory order whatever order the decodes finish in, and each entry's
/// stream is dropped as soon as that entry is done.
///
/// # Arguments
///
/// * `archive` - The opened archive, shared with every in-flight entry
/// * `decoder` - Decoder run once per entry on the blocking pool
/// * `workers` - Upper bound on concurrently decoded entries
///
/// # Returns
///
/// The batch, never an error: every entry failure is recorded in place.
pub async fn decode_archive(
    archive: Arc<ZipArchive>,
    decoder: Arc<dyn Decoder>,
    workers: NonZeroUsize,
) -> BatchResult {
    // Directories carry no data and produce no result
    let files: Vec<ZipFileEntry> = archive.files().cloned().collect();

    // Each future owns its entry and a handle on the archive, so nothing
    // borrowed from this frame crosses into the stream
    let entries: Vec<EntryResult> = stream::iter(files)
        .map(|entry| {
            let archive = Arc::clone(&archive);
            let decoder = Arc::clone(&decoder);
            async move { decode_entry(archive, entry, decoder).await }
        })
        .buffered(workers.get())
        .collect()
        .await;

    BatchResult::new(entries)
}

async fn decode_entry(
    archive: Arc<ZipArchive>,
    entry: ZipFileEntry,
    decoder: Arc<dyn Decoder>,
) -> EntryResult {
    let opened = archive.open_entry(&entry).await;
    let file_name = entry.file_name;

    let task = tokio::task::spawn_blocking({
        let file_name = file_name.clone();
        move || process_entry(file_name, opened, decoder.as_ref())
    });

    match task.await {
        Ok(result) => result,
        Err(err) => {
            let error = join_failure(err).to_string();
            warn!(file = %file_name, %error, "entry decode aborted");
            EntryResult::failure(file_name, error)
        }
    }
}
