//! HTTP upload transport: posts each block as a multipart form file.

use crate::error::{MicstreamError, Result};
use crate::transport::{EncodedBlock, TransportSink};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// Posts every block as one multipart/form-data request.
///
/// The block bytes go in a single file part under the configured field name,
/// with a timestamped filename so uploads never collide on the server.
pub struct HttpUploadSink {
    client: reqwest::Client,
    url: String,
    field_name: String,
}

impl HttpUploadSink {
    /// Create an upload sink posting to `url` with the given form field name.
    pub fn new(url: &str, field_name: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            field_name: field_name.to_string(),
        }
    }

    fn timestamped_filename(block: &EncodedBlock) -> String {
        let extension = if block.is_wav() { "wav" } else { "pcm" };
        format!(
            "capture-{}.{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S%.3f"),
            extension
        )
    }
}

#[async_trait]
impl TransportSink for HttpUploadSink {
    async fn send(&mut self, block: EncodedBlock) -> Result<()> {
        let filename = Self::timestamped_filename(&block);
        let mime = if block.is_wav() {
            "audio/wav"
        } else {
            "application/octet-stream"
        };

        let part = Part::bytes(block.into_bytes())
            .file_name(filename)
            .mime_str(mime)
            .map_err(|e| MicstreamError::Transport {
                message: format!("Invalid upload part: {}", e),
            })?;
        let form = Form::new().part(self.field_name.clone(), part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MicstreamError::Transport {
                message: format!("Upload to {} failed: {}", self.url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MicstreamError::Transport {
                message: format!("Upload to {} rejected: HTTP {}", self.url, status),
            });
        }

        if let Ok(body) = response.text().await
            && !body.is_empty()
        {
            eprintln!("micstream: upload response: {}", body.trim_end());
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "http-upload"
    }
}
