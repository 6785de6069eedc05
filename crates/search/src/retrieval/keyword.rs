//! Keyword search over stored summaries

use super::{RetrievalMode, RetrievedPaper, Retriever, SearchRequest};
use paperscope_common::errors::Result;
use paperscope_common::{PaperRecord, PaperStore};
use std::sync::Arc;

/// Records whose summary contains `query`, case-insensitively, in store order
pub fn keyword_search(query: &str, records: &[PaperRecord]) -> Vec<PaperRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.summary.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Keyword retriever reading the paper store
pub struct KeywordRetriever {
    store: Arc<PaperStore>,
}

impl KeywordRetriever {
    pub fn new(store: Arc<PaperStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<RetrievedPaper>> {
        let store = self.store.clone();
        let records = tokio::task::spawn_blocking(move || store.load()).await?;

        Ok(keyword_search(&request.query, &records)
            .into_iter()
            .map(|record| RetrievedPaper {
                record,
                distance: None,
                retrieval_mode: RetrievalMode::Keyword,
            })
            .collect())
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<PaperRecord> {
        vec![
            PaperRecord::new("1", "A", "A CONTRASTIVE approach"),
            PaperRecord::new("2", "B", "reinforcement learning"),
            PaperRecord::new("3", "Contrastive title only", "graph methods"),
            PaperRecord::new("4", "D", "non-contrastive baselines"),
        ]
    }

    #[test]
    fn test_matches_summary_only_in_order() {
        let ids: Vec<_> = keyword_search("contrastive", &records())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(keyword_search("quantum", &records()).is_empty());
        assert!(keyword_search("anything", &[]).is_empty());
    }

    #[tokio::test]
    async fn test_retriever_reads_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PaperStore::new(dir.path().join("papers.json")));
        store.save(&records()).unwrap();

        let retriever = KeywordRetriever::new(store);
        let found = retriever
            .retrieve(&SearchRequest::new("Reinforcement", RetrievalMode::Keyword))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.id, "2");
        assert_eq!(found[0].distance, None);
    }
}
