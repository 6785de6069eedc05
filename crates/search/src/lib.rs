//! PaperScope retrieval
//!
//! Keyword and similarity search over stored papers, plus the filtered and
//! sorted history views.

pub mod history;
pub mod retrieval;

pub use history::{HistoryQuery, HistoryStats, SortOrder};
pub use retrieval::{
    keyword_search, search, KeywordRetriever, RetrievalMode, RetrievedPaper, Retriever, SearchRequest,
    SearchResponse, SimilarityIndex, SimilarityRetriever,
};
