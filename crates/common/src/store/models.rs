//! Paper record entity

use serde::{Deserialize, Serialize};

/// Where a stored paper came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSource {
    /// arXiv keyword search or arXiv URL
    Arxiv,
    UploadedPdf,
    /// Direct document link entered by the user
    Manual,
    /// PDF uploaded through the local API
    Upload,
}

impl PaperSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSource::Arxiv => "arxiv",
            PaperSource::UploadedPdf => "uploaded_pdf",
            PaperSource::Manual => "manual",
            PaperSource::Upload => "upload",
        }
    }
}

/// One processed paper: metadata plus its generated summary.
///
/// `id` is the unique key of the store. A record is never updated in place
/// once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// arXiv identifier, document URL, or generated local id
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    /// Structured Markdown-like summary
    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PaperSource>,

    /// ISO-8601 creation time, assigned on insertion when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Free-text user notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<String>,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: None,
            summary: summary.into(),
            source: None,
            timestamp: None,
            annotations: None,
        }
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn with_source(mut self, source: PaperSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_annotations(mut self, annotations: impl Into<String>) -> Self {
        self.annotations = Some(annotations.into());
        self
    }

    /// Abstract text, empty when absent
    pub fn abstract_or_empty(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or("")
    }
}
