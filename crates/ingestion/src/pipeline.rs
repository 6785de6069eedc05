//! Ingestion pipeline
//!
//! Keyword search, URL fetch, PDF upload and directory batch, each ending in
//! a summarized record in the paper store. Batch items fail independently.

use crate::arxiv::{ArxivClient, MetadataSource};
use crate::fetch::{DocumentFetcher, DocumentSource};
use crate::pdf;
use crate::resolver::{ReferenceKind, UrlResolver};
use crate::url::is_url;
use paperscope_common::errors::{AppError, Result};
use paperscope_common::summarizer::{create_summarizer, Summarizer};
use paperscope_common::{AppConfig, PaperRecord, PaperSource, PaperStore, ABSTRACT_PREVIEW_CHARS};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One batch item that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    /// Paper id, URL or file name
    pub item: String,
    pub error: String,
}

/// Result of an ingestion run
#[derive(Debug, Default, Clone, Serialize)]
pub struct IngestReport {
    pub added: Vec<PaperRecord>,
    /// Ids that were already stored
    pub duplicates: Vec<String>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    fn record(&mut self, outcome: IngestOutcome) {
        if outcome.added {
            self.added.push(outcome.record);
        } else {
            self.duplicates.push(outcome.record.id);
        }
    }

    fn fail(&mut self, item: impl Into<String>, error: &AppError) {
        self.failures.push(IngestFailure {
            item: item.into(),
            error: error.to_string(),
        });
    }
}

/// A single processed paper and whether it was new
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub record: PaperRecord,
    pub added: bool,
}

/// Stored id for uploaded bytes
pub fn upload_id(bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    format!("local-{}", &digest[..8])
}

/// Leading characters of extracted text kept as the stored abstract
pub fn abstract_preview(text: &str) -> String {
    let preview: String = text.chars().take(ABSTRACT_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

pub struct PaperPipeline {
    store: Arc<PaperStore>,
    summarizer: Arc<dyn Summarizer>,
    metadata: Arc<dyn MetadataSource>,
    resolver: UrlResolver,
    max_results: usize,
}

impl PaperPipeline {
    pub fn new(
        store: Arc<PaperStore>,
        summarizer: Arc<dyn Summarizer>,
        metadata: Arc<dyn MetadataSource>,
        documents: Arc<dyn DocumentSource>,
        max_results: usize,
    ) -> Self {
        Self {
            store,
            summarizer,
            resolver: UrlResolver::new(metadata.clone(), documents),
            metadata,
            max_results,
        }
    }

    /// Wire the pipeline from configuration with the real network collaborators
    pub fn from_config(config: &AppConfig, store: Arc<PaperStore>) -> Result<Self> {
        let summarizer = create_summarizer(&config.summarizer)?;
        let metadata = Arc::new(ArxivClient::new(&config.arxiv)?);
        let documents = Arc::new(DocumentFetcher::new(&config.fetch)?);

        Ok(Self::new(store, summarizer, metadata, documents, config.arxiv.max_results))
    }

    pub fn store(&self) -> &Arc<PaperStore> {
        &self.store
    }

    pub fn is_demo(&self) -> bool {
        self.summarizer.mode().is_demo()
    }

    /// Fetch by URL or keyword search, summarize and store
    #[instrument(skip(self))]
    pub async fn fetch_and_summarize(&self, input: &str) -> Result<IngestReport> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::Validation {
                message: "Enter keywords or a paper URL".to_string(),
                field: Some("input".to_string()),
            });
        }

        if self.is_demo() {
            return Err(AppError::DemoModeRestricted {
                operation: "fetch".to_string(),
            });
        }

        if is_url(input) {
            let mut report = IngestReport::default();
            report.record(self.process_url(input).await?);
            return Ok(report);
        }

        self.search_keywords(input).await
    }

    async fn search_keywords(&self, keywords: &str) -> Result<IngestReport> {
        let papers = self.metadata.search(keywords, self.max_results).await?;
        info!(count = papers.len(), "Search returned papers");

        let mut report = IngestReport::default();
        for paper in papers {
            let id = paper.id.clone();
            let outcome: Result<IngestOutcome> = async {
                let summary = self.summarizer.summarize(&paper.abstract_text).await?;
                let record = PaperRecord::new(paper.id, paper.title, summary)
                    .with_abstract(paper.abstract_text)
                    .with_source(PaperSource::Arxiv);
                self.store_record(record).await
            }
            .await;

            match outcome {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!(paper_id = %id, error = %e, "Skipping paper");
                    report.fail(id, &e);
                }
            }
        }

        Ok(report)
    }

    /// Resolve a URL, extract its document text, summarize and store
    #[instrument(skip(self))]
    pub async fn process_url(&self, url: &str) -> Result<IngestOutcome> {
        if self.is_demo() {
            return Err(AppError::DemoModeRestricted {
                operation: "fetch".to_string(),
            });
        }

        let resolved = self.resolver.resolve(url).await?;
        let document = resolved.document.ok_or_else(|| AppError::DocumentUnavailable {
            message: format!("Could not download a document for {}", url.trim()),
        })?;

        // The temp file is removed when `document` drops inside the closure
        let text = tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(document.path()))
            .await??;

        let summary = self.summarizer.summarize(&text).await?;
        let source = match resolved.kind {
            ReferenceKind::Repository => PaperSource::Arxiv,
            ReferenceKind::DirectDocument => PaperSource::Manual,
        };

        let record = PaperRecord::new(resolved.id, resolved.title, summary)
            .with_abstract(abstract_preview(&text))
            .with_source(source);
        self.store_record(record).await
    }

    /// Summarize an uploaded PDF and store it under a content-derived id
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn process_upload(&self, filename: &str, bytes: Vec<u8>) -> Result<IngestOutcome> {
        if bytes.is_empty() {
            return Err(AppError::Validation {
                message: "Uploaded file is empty".to_string(),
                field: Some("file".to_string()),
            });
        }

        let id = upload_id(&bytes);
        if let Some(existing) = self.read_record(&id).await? {
            debug!(paper_id = %id, "Upload already stored");
            return Ok(IngestOutcome {
                record: existing,
                added: false,
            });
        }

        let label = filename.to_string();
        let text = tokio::task::spawn_blocking(move || pdf::extract_text_from_bytes(&bytes, &label))
            .await??;

        let summary = self.summarizer.summarize(&text).await?;
        let record = PaperRecord::new(id, filename, summary)
            .with_abstract("")
            .with_source(PaperSource::Upload);
        self.store_record(record).await
    }

    /// Upload every `*.pdf` in `dir`, in file name order
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn process_directory(&self, dir: &Path) -> Result<IngestReport> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| AppError::validation(format!("Cannot read {}: {}", dir.display(), e)))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if is_pdf && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let report = self.process_files(&files).await;
        info!(
            added = report.added.len(),
            duplicates = report.duplicates.len(),
            failures = report.failures.len(),
            "Directory processed"
        );
        Ok(report)
    }

    /// Upload each file in order. Unreadable or unparseable files are
    /// recorded as failures and the batch continues.
    pub async fn process_files(&self, paths: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let outcome = match tokio::fs::read(path).await {
                Ok(bytes) => self.process_upload(&name, bytes).await,
                Err(e) => Err(AppError::storage(path, e)),
            };

            match outcome {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping file");
                    report.fail(name, &e);
                }
            }
        }
        report
    }

    async fn store_record(&self, record: PaperRecord) -> Result<IngestOutcome> {
        let store = self.store.clone();
        let candidate = record.clone();
        let added = tokio::task::spawn_blocking(move || store.add(candidate)).await??;

        // Return what is actually stored, including the assigned timestamp
        let stored = if added { self.read_record(&record.id).await? } else { None };
        Ok(IngestOutcome {
            record: stored.unwrap_or(record),
            added,
        })
    }

    async fn read_record(&self, id: &str) -> Result<Option<PaperRecord>> {
        let store = self.store.clone();
        let id = id.to_string();
        Ok(tokio::task::spawn_blocking(move || store.get(&id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_id() {
        let id = upload_id(b"%PDF-1.4 hello");
        assert!(id.starts_with("local-"));
        assert_eq!(id.len(), "local-".len() + 8);
        assert_eq!(id, upload_id(b"%PDF-1.4 hello"));
        assert_ne!(id, upload_id(b"%PDF-1.4 other"));
    }

    #[test]
    fn test_abstract_preview() {
        assert_eq!(abstract_preview("short"), "short...");
        let long = "é".repeat(600);
        let preview = abstract_preview(&long);
        assert_eq!(preview.chars().count(), ABSTRACT_PREVIEW_CHARS + 3);
    }
}
