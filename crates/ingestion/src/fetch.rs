//! Document download
//!
//! Downloads land in a temporary file owned by [`DownloadedDocument`]; the
//! file is removed when the value is dropped.

use crate::errors::IngestionError;
use async_trait::async_trait;
use paperscope_common::{config::FetchConfig, metrics};
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;
use tracing::{debug, instrument, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

/// A downloaded document on local disk
#[derive(Debug)]
pub struct DownloadedDocument {
    path: TempPath,
    source_url: String,
    size: usize,
}

impl DownloadedDocument {
    /// Write `bytes` to a fresh temporary file
    pub fn from_bytes(bytes: &[u8], source_url: &str) -> Result<Self, IngestionError> {
        let mut file = tempfile::Builder::new()
            .prefix("paperscope-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
            source_url: source_url.to_string(),
            size: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Whether a response body should be accepted as a PDF.
///
/// A declared `application/pdf` content type or a `.pdf` URL suffix is
/// trusted as is; otherwise the body must start with the PDF magic bytes.
pub fn is_pdf_payload(content_type: Option<&str>, url: &str, bytes: &[u8]) -> bool {
    let declared = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/pdf"))
        .unwrap_or(false);

    declared || url.ends_with(".pdf") || bytes.starts_with(PDF_MAGIC)
}

/// Append `chunk` unless the buffer would grow past `limit`.
/// On overflow the buffer is left as is and the would-be size is returned.
fn append_bounded(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<(), usize> {
    let size = buffer.len() + chunk.len();
    if size > limit {
        return Err(size);
    }
    buffer.extend_from_slice(chunk);
    Ok(())
}

/// Anything that can turn a URL into a local document
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Download `url`. Any failure means "no document".
    async fn download(&self, url: &str) -> Result<DownloadedDocument, IngestionError>;
}

/// HTTP document fetcher with a bounded timeout and size cap
pub struct DocumentFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl DocumentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, IngestionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IngestionError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    async fn fetch(&self, url: &str) -> Result<DownloadedDocument, IngestionError> {
        let fetch_error = |message: String| IngestionError::FetchError {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(IngestionError::DocumentTooLarge {
                    url: url.to_string(),
                    size: len as usize,
                    limit: self.max_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_error(e.to_string()))? {
            append_bounded(&mut bytes, &chunk, self.max_bytes).map_err(|size| {
                IngestionError::DocumentTooLarge {
                    url: url.to_string(),
                    size,
                    limit: self.max_bytes,
                }
            })?;
        }

        if !is_pdf_payload(content_type.as_deref(), url, &bytes) {
            return Err(fetch_error(format!(
                "response is not a PDF (content-type: {})",
                content_type.as_deref().unwrap_or("none")
            )));
        }

        let source_url = url.to_string();
        tokio::task::spawn_blocking(move || DownloadedDocument::from_bytes(&bytes, &source_url))
            .await
            .map_err(|e| IngestionError::IoError(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl DocumentSource for DocumentFetcher {
    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<DownloadedDocument, IngestionError> {
        let result = self.fetch(url).await;
        metrics::record_fetch(result.is_ok());

        match &result {
            Ok(doc) => debug!(bytes = doc.size(), "Document downloaded"),
            Err(e) => warn!(error = %e, "No document"),
        }
        result
    }
}
