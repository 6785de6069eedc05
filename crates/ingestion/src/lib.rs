//! PaperScope ingestion
//!
//! Everything between user input and a stored, summarized paper:
//! - URL classification and arXiv identifier extraction
//! - arXiv keyword search and metadata lookup
//! - Document download into scoped temporary files
//! - PDF text extraction
//! - The ingestion pipeline and the demo dataset

pub mod arxiv;
pub mod demo;
pub mod errors;
pub mod fetch;
pub mod pdf;
pub mod pipeline;
pub mod resolver;
pub mod url;

pub use arxiv::{ArxivClient, ArxivPaper, MetadataSource};
pub use errors::IngestionError;
pub use fetch::{DocumentFetcher, DocumentSource, DownloadedDocument};
pub use pipeline::{IngestOutcome, IngestReport, PaperPipeline};
pub use resolver::{ResolvedPaper, UrlResolver};
