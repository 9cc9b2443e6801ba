use axum::extract::Multipart;
use drainwatch_core::ports::Upload;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ApiError;

/// Multipart body: a JSON `payload` field plus an optional `attachment` file
pub struct UploadForm<T> {
    pub payload: T,
    pub attachment: Option<Upload>,
}

/// Read a multipart form into its payload and attachment
pub async fn read_form<T: DeserializeOwned>(
    multipart: &mut Multipart,
) -> Result<UploadForm<T>, ApiError> {
    let mut payload = None;
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::bad_request("Failed to parse multipart form").with_details(e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "payload" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request("Failed to read payload").with_details(e.to_string())
                })?;
                let parsed: T = serde_json::from_str(&text).map_err(|e| {
                    ApiError::bad_request("Invalid payload").with_details(e.to_string())
                })?;
                payload = Some(parsed);
            }
            "attachment" => {
                let extension = field
                    .file_name()
                    .and_then(|f| Path::new(f).extension())
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request("Failed to read file data").with_details(e.to_string())
                })?;
                if !data.is_empty() {
                    attachment = Some(Upload::new(data.to_vec(), extension));
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let payload = payload.ok_or_else(|| {
        ApiError::bad_request("No payload provided")
            .with_details("Expected a 'payload' field in the multipart form")
    })?;
    Ok(UploadForm { payload, attachment })
}
