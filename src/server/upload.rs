use axum::extract::Multipart;
use axum::extract::multipart::MultipartRejection;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::io::UploadBuffer;

/// Buffer the multipart field named `field_name`.
///
/// Other fields are skipped. The upload is only returned once it has been
/// read in full.
pub async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    field_name: &str,
) -> Result<UploadBuffer> {
    let mut multipart =
        multipart.map_err(|rejection| IngestError::MissingUpload(rejection.body_text()))?;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| IngestError::UploadUnreadable(err.body_text()))?;

        let Some(field) = field else {
            return Err(IngestError::MissingUpload("http: no such file".to_string()));
        };

        if field.name() != Some(field_name) {
            debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|err| IngestError::UploadUnreadable(err.body_text()))?;
        return Ok(UploadBuffer::new(data));
    }
}
