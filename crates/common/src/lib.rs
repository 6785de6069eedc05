//! PaperScope Common Library
//!
//! Shared code for the PaperScope crates including:
//! - The paper record model and the local JSON paper store
//! - Summarization strategies (demo and live)
//! - Embedding abstraction (placeholder hash and remote model)
//! - Error types and handling
//! - Configuration management
//! - Export formatting and metrics helpers

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod export;
pub mod metrics;
pub mod store;
pub mod summarizer;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use store::{PaperRecord, PaperSource, PaperStore};
pub use summarizer::{SummaryMode, Summarizer};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding dimension for the placeholder embedder
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Number of characters of extracted text kept as a stored abstract
pub const ABSTRACT_PREVIEW_CHARS: usize = 500;
