use actix_multipart::{Field, Multipart};
use actix_web::error::UrlencodedError;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::FormError;

/// An image received through the `file` form field.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// SHA-256 of the payload, hex encoded. Only used to correlate log lines.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Everything `/predict` accepts, as read off the wire.
#[derive(Debug, Clone, Default)]
pub struct PredictInput {
    pub text: Option<String>,
    pub file: Option<Upload>,
}

/// Text-only form used for urlencoded bodies.
#[derive(Debug, Default, Deserialize)]
pub struct TextForm {
    pub text: Option<String>,
}

impl From<TextForm> for PredictInput {
    fn from(form: TextForm) -> Self {
        Self {
            text: form.text,
            file: None,
        }
    }
}

pub async fn read_multipart(
    mut payload: Multipart,
    max_upload_bytes: usize,
) -> Result<PredictInput, FormError> {
    let mut input = PredictInput::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| FormError::Payload(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("text") => {
                let bytes = read_field(&mut field, max_upload_bytes)
                    .await
                    .map_err(|e| match e {
                        FormError::UploadTooLarge { limit } => FormError::TextTooLarge { limit },
                        other => other,
                    })?;
                input.text = Some(String::from_utf8(bytes).map_err(|_| FormError::InvalidText)?);
            }
            Some("file") => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_owned);
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = read_field(&mut field, max_upload_bytes).await?;
                input.file = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => {
                log::debug!("Skipping unexpected form field {:?}", other);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| FormError::Payload(e.to_string()))?;
                }
            }
        }
    }

    Ok(input)
}

/// Maps a failed urlencoded extraction onto the form error reported to the caller.
pub fn urlencoded_error(err: &actix_web::Error) -> FormError {
    match err.as_error::<UrlencodedError>() {
        Some(UrlencodedError::Overflow { limit, .. }) => FormError::TextTooLarge { limit: *limit },
        _ => FormError::Payload(err.to_string()),
    }
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, FormError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| FormError::Payload(e.to_string()))?;
        if data.len() + chunk.len() > limit {
            return Err(FormError::UploadTooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
