//! Turns a URL into a paper reference: identifier, title and local document
//!
//! Metadata lookup and document download run independently. Either one alone
//! is a usable result; only when both fail is the URL unresolvable.

use crate::arxiv::MetadataSource;
use crate::errors::IngestionError;
use crate::fetch::{DocumentSource, DownloadedDocument};
use crate::url::{arxiv_pdf_url, extract_identifier, is_document_url, is_url, title_from_url};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What kind of link was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// arXiv abstract or PDF page
    Repository,
    /// Any other link that serves a PDF
    DirectDocument,
}

/// Outcome of a successful resolution
#[derive(Debug)]
pub struct ResolvedPaper {
    pub id: String,
    pub title: String,
    pub kind: ReferenceKind,
    /// `None` when only metadata could be obtained
    pub document: Option<DownloadedDocument>,
}

pub struct UrlResolver {
    metadata: Arc<dyn MetadataSource>,
    documents: Arc<dyn DocumentSource>,
}

impl UrlResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>, documents: Arc<dyn DocumentSource>) -> Self {
        Self { metadata, documents }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, url: &str) -> Result<ResolvedPaper, IngestionError> {
        let url = url.trim();
        if !is_url(url) {
            return Err(IngestionError::InvalidUrl(url.to_string()));
        }

        if let Some(id) = extract_identifier(url) {
            return self.resolve_repository(url, id).await;
        }

        if is_document_url(url) {
            return match self.documents.download(url).await {
                Ok(document) => Ok(ResolvedPaper {
                    id: url.to_string(),
                    title: title_from_url(url),
                    kind: ReferenceKind::DirectDocument,
                    document: Some(document),
                }),
                Err(e) => {
                    warn!(url = %url, error = %e, "Direct document download failed");
                    Err(IngestionError::Unresolvable { url: url.to_string() })
                }
            };
        }

        Err(IngestionError::Unresolvable { url: url.to_string() })
    }

    async fn resolve_repository(&self, url: &str, id: String) -> Result<ResolvedPaper, IngestionError> {
        let pdf_url = arxiv_pdf_url(&id);
        let (metadata, document) =
            tokio::join!(self.metadata.lookup(&id), self.documents.download(&pdf_url));

        let document = document
            .map_err(|e| warn!(paper_id = %id, url = %pdf_url, error = %e, "Document download failed"))
            .ok();

        match metadata {
            Ok(paper) => Ok(ResolvedPaper {
                id: paper.id,
                title: paper.title,
                kind: ReferenceKind::Repository,
                document,
            }),
            Err(e) => {
                warn!(paper_id = %id, error = %e, "Metadata lookup failed");
                match document {
                    Some(document) => {
                        info!(paper_id = %id, "Using document without metadata");
                        Ok(ResolvedPaper {
                            title: format!("arXiv:{}", id),
                            id,
                            kind: ReferenceKind::Repository,
                            document: Some(document),
                        })
                    }
                    None => Err(IngestionError::Unresolvable { url: url.to_string() }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arxiv::ArxivPaper;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeMetadata {
        ok: bool,
    }

    #[async_trait]
    impl MetadataSource for FakeMetadata {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<ArxivPaper>, IngestionError> {
            Ok(Vec::new())
        }

        async fn lookup(&self, id: &str) -> Result<ArxivPaper, IngestionError> {
            if self.ok {
                Ok(ArxivPaper {
                    id: id.to_string(),
                    title: "Real Title".to_string(),
                    abstract_text: "abs".to_string(),
                })
            } else {
                Err(IngestionError::MetadataError {
                    id: id.to_string(),
                    message: "down".to_string(),
                })
            }
        }
    }

    #[derive(Default)]
    struct FakeDocuments {
        ok: bool,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentSource for FakeDocuments {
        async fn download(&self, url: &str) -> Result<DownloadedDocument, IngestionError> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.ok {
                DownloadedDocument::from_bytes(b"%PDF-1.4", url)
            } else {
                Err(IngestionError::FetchError {
                    url: url.to_string(),
                    message: "404".to_string(),
                })
            }
        }
    }

    fn resolver(meta_ok: bool, doc_ok: bool) -> (UrlResolver, Arc<FakeDocuments>) {
        let docs = Arc::new(FakeDocuments {
            ok: doc_ok,
            ..Default::default()
        });
        let resolver = UrlResolver::new(Arc::new(FakeMetadata { ok: meta_ok }), docs.clone());
        (resolver, docs)
    }

    const ABS: &str = "https://arxiv.org/abs/2301.12345v2";

    #[tokio::test]
    async fn test_metadata_and_document() {
        let (resolver, docs) = resolver(true, true);
        let paper = resolver.resolve(ABS).await.unwrap();
        assert_eq!(paper.id, "2301.12345");
        assert_eq!(paper.title, "Real Title");
        assert_eq!(paper.kind, ReferenceKind::Repository);
        assert!(paper.document.is_some());
        assert_eq!(
            docs.requested.lock().unwrap().as_slice(),
            ["https://arxiv.org/pdf/2301.12345.pdf"]
        );
    }

    #[tokio::test]
    async fn test_metadata_failure_keeps_document() {
        let (resolver, _) = resolver(false, true);
        let paper = resolver.resolve(ABS).await.unwrap();
        assert_eq!(paper.id, "2301.12345");
        assert_eq!(paper.title, "arXiv:2301.12345");
        assert!(paper.document.is_some());
    }

    #[tokio::test]
    async fn test_download_failure_keeps_metadata() {
        let (resolver, _) = resolver(true, false);
        let paper = resolver.resolve(ABS).await.unwrap();
        assert_eq!(paper.title, "Real Title");
        assert!(paper.document.is_none());
    }

    #[tokio::test]
    async fn test_total_failure() {
        let (resolver, _) = resolver(false, false);
        assert!(matches!(
            resolver.resolve(ABS).await,
            Err(IngestionError::Unresolvable { .. })
        ));
    }

    #[tokio::test]
    async fn test_direct_document_link() {
        let (resolver, docs) = resolver(false, true);
        let url = "https://example.com/files/research-paper.pdf";
        let paper = resolver.resolve(url).await.unwrap();
        assert_eq!(paper.id, url);
        assert_eq!(paper.title, "research paper");
        assert_eq!(paper.kind, ReferenceKind::DirectDocument);
        assert_eq!(docs.requested.lock().unwrap().as_slice(), [url]);
    }

    #[tokio::test]
    async fn test_unrecognised_urls() {
        let (resolver, docs) = resolver(true, true);
        assert!(matches!(
            resolver.resolve("https://example.com/about").await,
            Err(IngestionError::Unresolvable { .. })
        ));
        assert!(matches!(
            resolver.resolve("not a url").await,
            Err(IngestionError::InvalidUrl(_))
        ));
        assert!(docs.requested.lock().unwrap().is_empty());
    }
}
