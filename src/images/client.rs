use crate::config::ImagesConfig;
use async_trait::async_trait;
use postboard_common::{DeletionHandle, Error, ImagePayload, ImageRef, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Operations offered by the image hosting service.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image and return where it is served from and how to delete it.
    async fn upload(&self, payload: &ImagePayload) -> Result<ImageRef>;

    /// Delete a previously uploaded image.
    async fn delete(&self, handle: &DeletionHandle) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    url: String,
    public_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    public_id: &'a str,
}

/// Detect the MIME type of an image from its leading bytes.
///
/// Returns `None` when the bytes are not a format the `image` crate knows.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

/// [`ImageStore`] backed by the upload proxy's HTTP API.
pub struct HttpImageStore {
    client: Client,
    endpoint: String,
}

impl HttpImageStore {
    pub fn new(config: &ImagesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn file_part(payload: &ImagePayload) -> Result<Part> {
        let sniffed = sniff_content_type(&payload.bytes)
            .ok_or_else(|| Error::validation(format!("{} is not a supported image", payload.file_name)))?;
        let content_type = payload.content_type.as_deref().unwrap_or(sniffed);

        Part::bytes(payload.bytes.to_vec())
            .file_name(payload.file_name.clone())
            .mime_str(content_type)
            .map_err(|e| Error::validation(format!("invalid content type {content_type}: {e}")))
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, payload: &ImagePayload) -> Result<ImageRef> {
        let form = Form::new().part("file", Self::file_part(payload)?);

        tracing::debug!(
            file = %payload.file_name,
            size = payload.len(),
            "Uploading image"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upload(format!("{status}: {body}")));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(format!("unreadable response: {e}")))?;

        tracing::info!(public_id = %body.public_id, "Image uploaded");

        Ok(ImageRef::new(body.url, DeletionHandle::new(body.public_id)))
    }

    async fn delete(&self, handle: &DeletionHandle) -> Result<()> {
        let response = self
            .client
            .delete(&self.endpoint)
            .json(&DeleteRequest {
                public_id: handle.as_str(),
            })
            .send()
            .await
            .map_err(|e| Error::deletion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::deletion(format!("{status}: {body}")));
        }

        tracing::info!(public_id = %handle, "Image deleted");
        Ok(())
    }
}
