use std::sync::Arc;

use bytes::Buf;
use tracing::info;

use crate::decode::{Decoder, ParsedRound, ReplayStream};
use crate::error::{IngestError, Result};
use crate::io::UploadBuffer;

use super::join_failure;

/// Decode an upload that holds exactly one replay.
///
/// Unlike archive entries, a failure here fails the request.
pub async fn decode_single(upload: UploadBuffer, decoder: Arc<dyn Decoder>) -> Result<ParsedRound> {
    let size = upload.len();
    let task = tokio::task::spawn_blocking(move || {
        let stream: ReplayStream = Box::new(upload.as_bytes().clone().reader());
        decoder.open(stream)?.decode().into_round()
    });

    let round = match task.await {
        Ok(decoded) => decoded?,
        Err(err) => return Err(IngestError::Decode(join_failure(err))),
    };

    info!(bytes = size, events = round.events.len(), "decoded replay");
    Ok(round)
}
