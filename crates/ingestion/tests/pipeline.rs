//! Pipeline tests against in-process fakes of the network collaborators

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use paperscope_common::errors::AppError;
use paperscope_common::summarizer::{DemoSummarizer, Summarizer, SummaryMode, DEMO_MARKER};
use paperscope_common::{PaperSource, PaperStore};
use paperscope_ingestion::errors::IngestionError;
use paperscope_ingestion::pipeline::upload_id;
use paperscope_ingestion::{ArxivPaper, DocumentSource, DownloadedDocument, MetadataSource, PaperPipeline};
use std::sync::{Arc, Mutex};

/// Minimal single-page PDF showing `text`
fn sample_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

const PAPER_TEXT: &str = "We propose a method. We evaluate it on benchmarks. It works well. It is fast. We release code.";

struct FakeArxiv {
    papers: Vec<ArxivPaper>,
    fail_search: bool,
}

#[async_trait]
impl MetadataSource for FakeArxiv {
    async fn search(&self, _keywords: &str, max_results: usize) -> Result<Vec<ArxivPaper>, IngestionError> {
        if self.fail_search {
            return Err(IngestionError::SearchError("service unavailable".into()));
        }
        Ok(self.papers.iter().take(max_results).cloned().collect())
    }

    async fn lookup(&self, id: &str) -> Result<ArxivPaper, IngestionError> {
        self.papers
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| IngestionError::MetadataError {
                id: id.to_string(),
                message: "not found".into(),
            })
    }
}

#[derive(Default)]
struct FakeDocuments {
    pdf: Option<Vec<u8>>,
    downloads: Mutex<Vec<String>>,
}

#[async_trait]
impl DocumentSource for FakeDocuments {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, IngestionError> {
        self.downloads.lock().unwrap().push(url.to_string());
        match &self.pdf {
            Some(bytes) => DownloadedDocument::from_bytes(bytes, url),
            None => Err(IngestionError::FetchError {
                url: url.to_string(),
                message: "404".into(),
            }),
        }
    }
}

/// Demo-format summaries, but reports live mode so network paths are allowed
struct OfflineLiveSummarizer {
    fail_on: Option<&'static str>,
}

#[async_trait]
impl Summarizer for OfflineLiveSummarizer {
    async fn summarize(&self, text: &str) -> paperscope_common::Result<String> {
        if let Some(marker) = self.fail_on {
            if text.contains(marker) {
                return Err(AppError::Generation {
                    message: "rate limited".into(),
                });
            }
        }
        Ok(DemoSummarizer::new().summarize_text(text))
    }

    fn mode(&self) -> SummaryMode {
        SummaryMode::Live
    }
}

fn paper(id: &str, title: &str, abstract_text: &str) -> ArxivPaper {
    ArxivPaper {
        id: id.to_string(),
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<PaperStore>,
    documents: Arc<FakeDocuments>,
    pipeline: PaperPipeline,
}

fn harness(
    papers: Vec<ArxivPaper>,
    pdf: Option<Vec<u8>>,
    summarizer: Arc<dyn Summarizer>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PaperStore::new(dir.path().join("papers.json")));
    let documents = Arc::new(FakeDocuments {
        pdf,
        ..Default::default()
    });
    let metadata = Arc::new(FakeArxiv {
        papers,
        fail_search: false,
    });
    let pipeline = PaperPipeline::new(store.clone(), summarizer, metadata, documents.clone(), 5);
    Harness {
        _dir: dir,
        store,
        documents,
        pipeline,
    }
}

fn live() -> Arc<dyn Summarizer> {
    Arc::new(OfflineLiveSummarizer { fail_on: None })
}

#[tokio::test]
async fn keyword_search_stores_every_result() {
    let h = harness(
        vec![
            paper("2301.00001", "First", "Contrastive objectives help."),
            paper("2301.00002", "Second", "Robots learn to walk."),
        ],
        None,
        live(),
    );

    let report = h.pipeline.fetch_and_summarize("robot learning").await.unwrap();
    assert_eq!(report.added.len(), 2);
    assert!(report.failures.is_empty());

    let stored = h.store.load();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.source == Some(PaperSource::Arxiv)));
    assert!(stored.iter().all(|r| r.timestamp.is_some()));
    assert_eq!(stored[0].abstract_or_empty(), "Contrastive objectives help.");

    let again = h.pipeline.fetch_and_summarize("robot learning").await.unwrap();
    assert!(again.added.is_empty());
    assert_eq!(again.duplicates, vec!["2301.00001", "2301.00002"]);
    assert_eq!(h.store.len(), 2);
}

#[tokio::test]
async fn one_failing_item_does_not_abort_the_batch() {
    let h = harness(
        vec![
            paper("2301.00001", "First", "Fine abstract."),
            paper("2301.00002", "Second", "POISON abstract."),
            paper("2301.00003", "Third", "Another fine abstract."),
        ],
        None,
        Arc::new(OfflineLiveSummarizer { fail_on: Some("POISON") }),
    );

    let report = h.pipeline.fetch_and_summarize("anything").await.unwrap();
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item, "2301.00002");

    let ids: Vec<_> = h.store.load().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["2301.00001", "2301.00003"]);
}

#[tokio::test]
async fn search_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PaperStore::new(dir.path().join("papers.json")));
    let pipeline = PaperPipeline::new(
        store,
        live(),
        Arc::new(FakeArxiv {
            papers: Vec::new(),
            fail_search: true,
        }),
        Arc::new(FakeDocuments::default()),
        5,
    );

    let err = pipeline.fetch_and_summarize("anything").await.unwrap_err();
    assert!(matches!(err, AppError::UpstreamSearch { .. }));
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let h = harness(Vec::new(), None, live());
    let err = h.pipeline.fetch_and_summarize("   ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn arxiv_url_is_fetched_and_stored() {
    let h = harness(
        vec![paper("2301.12345", "Real Title", "abs")],
        Some(sample_pdf(PAPER_TEXT)),
        live(),
    );

    let report = h
        .pipeline
        .fetch_and_summarize("https://arxiv.org/abs/2301.12345v3")
        .await
        .unwrap();
    assert_eq!(report.added.len(), 1);

    let record = &report.added[0];
    assert_eq!(record.id, "2301.12345");
    assert_eq!(record.title, "Real Title");
    assert_eq!(record.source, Some(PaperSource::Arxiv));
    assert!(record.abstract_or_empty().ends_with("..."));
    assert!(record.timestamp.is_some());
    assert_eq!(
        h.documents.downloads.lock().unwrap().as_slice(),
        ["https://arxiv.org/pdf/2301.12345.pdf"]
    );
}

#[tokio::test]
async fn direct_link_is_stored_as_manual() {
    let h = harness(Vec::new(), Some(sample_pdf(PAPER_TEXT)), live());
    let url = "https://example.com/papers/research-paper.pdf";

    let outcome = h.pipeline.process_url(url).await.unwrap();
    assert!(outcome.added);
    assert_eq!(outcome.record.id, url);
    assert_eq!(outcome.record.title, "research paper");
    assert_eq!(outcome.record.source, Some(PaperSource::Manual));
}

#[tokio::test]
async fn metadata_without_document_is_unavailable() {
    let h = harness(vec![paper("2301.12345", "Real Title", "abs")], None, live());
    let err = h
        .pipeline
        .process_url("https://arxiv.org/abs/2301.12345")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DocumentUnavailable { .. }));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn upload_uses_content_hash_id_and_deduplicates() {
    let h = harness(Vec::new(), None, Arc::new(DemoSummarizer::new()));
    let bytes = sample_pdf(PAPER_TEXT);
    let expected_id = upload_id(&bytes);

    let first = h.pipeline.process_upload("my-paper.pdf", bytes.clone()).await.unwrap();
    assert!(first.added);
    assert_eq!(first.record.id, expected_id);
    assert_eq!(first.record.title, "my-paper.pdf");
    assert_eq!(first.record.abstract_or_empty(), "");
    assert_eq!(first.record.source, Some(PaperSource::Upload));
    assert!(first.record.summary.starts_with(DEMO_MARKER));

    let second = h.pipeline.process_upload("renamed.pdf", bytes).await.unwrap();
    assert!(!second.added);
    assert_eq!(second.record.title, "my-paper.pdf");
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn unreadable_upload_is_a_parse_error() {
    let h = harness(Vec::new(), None, Arc::new(DemoSummarizer::new()));
    let err = h
        .pipeline
        .process_upload("broken.pdf", b"not a pdf at all".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DocumentParse { .. }));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn demo_mode_blocks_network_fetches() {
    let h = harness(
        vec![paper("2301.00001", "First", "abs")],
        Some(sample_pdf(PAPER_TEXT)),
        Arc::new(DemoSummarizer::new()),
    );

    for input in ["robot learning", "https://arxiv.org/abs/2301.00001"] {
        let err = h.pipeline.fetch_and_summarize(input).await.unwrap_err();
        assert!(matches!(err, AppError::DemoModeRestricted { .. }));
    }
    assert!(h.documents.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn directory_batch_skips_bad_files() {
    let h = harness(Vec::new(), None, Arc::new(DemoSummarizer::new()));
    let input = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a.pdf"), sample_pdf("Alpha paper text.")).unwrap();
    std::fs::write(input.path().join("b.PDF"), sample_pdf("Beta paper text.")).unwrap();
    std::fs::write(input.path().join("broken.pdf"), b"garbage").unwrap();
    std::fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

    let report = h.pipeline.process_directory(input.path()).await.unwrap();
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item, "broken.pdf");
    assert_eq!(h.store.len(), 2);
}

#[tokio::test]
async fn file_batch_continues_past_bad_files() {
    let h = harness(Vec::new(), None, Arc::new(DemoSummarizer::new()));
    let input = tempfile::tempdir().unwrap();
    let bad = input.path().join("bad.pdf");
    let good = input.path().join("good.pdf");
    let missing = input.path().join("missing.pdf");
    std::fs::write(&bad, b"not a pdf at all").unwrap();
    std::fs::write(&good, sample_pdf("A valid paper. It has sentences.")).unwrap();

    let report = h.pipeline.process_files(&[bad, good.clone(), missing]).await;
    assert_eq!(report.added.len(), 1);
    assert_eq!(report.added[0].title, "good.pdf");
    let failed: Vec<_> = report.failures.iter().map(|f| f.item.as_str()).collect();
    assert_eq!(failed, vec!["bad.pdf", "missing.pdf"]);
    assert_eq!(h.store.len(), 1);

    // Same file again is a duplicate, not a failure
    let again = h.pipeline.process_files(&[good]).await;
    assert!(again.added.is_empty());
    assert_eq!(again.duplicates.len(), 1);
    assert!(again.failures.is_empty());
}
