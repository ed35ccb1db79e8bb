use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};

use crate::decode::ParsedRound;
use crate::error::Result;
use crate::ingest::{self, BatchResult};

use super::{AppState, UPLOAD_FIELD, read_upload};

pub(super) async fn get_test() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

/// Decode one uploaded replay.
pub(super) async fn post_round(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ParsedRound>> {
    let upload = read_upload(multipart, UPLOAD_FIELD).await?;
    let round = ingest::decode_single(upload, state.decoder).await?;
    Ok(Json(round))
}

/// Decode every replay in an uploaded zip archive.
pub(super) async fn post_replay(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchResult>> {
    let upload = read_upload(multipart, UPLOAD_FIELD).await?;
    let batch = ingest::ingest_archive(upload, state.decoder, state.workers).await?;
    Ok(Json(batch))
}
