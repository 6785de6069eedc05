//! Similarity search over the index snapshot
//!
//! The snapshot is a JSON array of the records present at the last build.
//! Vectors are derived from summaries at query time by the configured
//! embedder; with the hash embedder the ranking carries no meaning.

use super::{RetrievalMode, RetrievedPaper, Retriever, SearchRequest};
use paperscope_common::embeddings::Embedder;
use paperscope_common::errors::{AppError, Result};
use paperscope_common::store::StoreStatus;
use paperscope_common::{PaperRecord, PaperStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Results returned when no limit is given
pub const DEFAULT_TOP_K: usize = 5;

/// Euclidean (L2) distance; vectors of different length compare on the shared prefix
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn load_snapshot(path: &Path) -> Option<Vec<PaperRecord>> {
    let snapshot = PaperStore::new(path).load_snapshot();
    match snapshot.status {
        StoreStatus::Loaded => Some(snapshot.records),
        StoreStatus::Missing => None,
        StoreStatus::Corrupt { reason } => {
            warn!(path = %path.display(), reason = %reason, "Index snapshot is unreadable");
            None
        }
    }
}

/// Side-channel snapshot of indexed records
pub struct SimilarityIndex {
    meta_path: PathBuf,
    embedder: Arc<dyn Embedder>,
}

impl SimilarityIndex {
    pub fn new(meta_path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            meta_path: meta_path.into(),
            embedder,
        }
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    /// Write the snapshot for `records`. An empty set removes any old snapshot.
    pub fn build(&self, records: &[PaperRecord]) -> Result<usize> {
        if records.is_empty() {
            match fs::remove_file(&self.meta_path) {
                Ok(()) => info!(path = %self.meta_path.display(), "Removed stale index snapshot"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::storage(&self.meta_path, e)),
            }
            return Ok(0);
        }

        PaperStore::new(&self.meta_path).save(records)?;
        info!(
            path = %self.meta_path.display(),
            count = records.len(),
            model = self.embedder.model_name(),
            "Index snapshot written"
        );
        Ok(records.len())
    }

    /// Records of the last build; `None` when no usable snapshot exists
    pub fn load(&self) -> Option<Vec<PaperRecord>> {
        load_snapshot(&self.meta_path)
    }

    /// Up to `k` snapshot records ranked by ascending distance to `query`.
    /// Ties keep snapshot order.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<(PaperRecord, f32)>> {
        let path = self.meta_path.clone();
        let Some(records) = tokio::task::spawn_blocking(move || load_snapshot(&path)).await? else {
            debug!("No index snapshot, similarity search is empty");
            return Ok(Vec::new());
        };

        let mut ranked = self.rank(query, records).await?;
        ranked.truncate(k);
        Ok(ranked)
    }

    async fn rank(&self, query: &str, records: Vec<PaperRecord>) -> Result<Vec<(PaperRecord, f32)>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query).await?;
        let summaries: Vec<String> = records.iter().map(|r| r.summary.clone()).collect();
        let vectors = self.embedder.embed_batch(&summaries).await?;
        if vectors.len() != records.len() {
            return Err(AppError::EmbeddingError {
                message: format!("expected {} vectors, got {}", records.len(), vectors.len()),
            });
        }

        let mut ranked: Vec<(PaperRecord, f32)> = records
            .into_iter()
            .zip(vectors.iter())
            .map(|(record, vector)| {
                let distance = euclidean_distance(&query_vec, vector);
                (record, distance)
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(ranked)
    }
}

/// Similarity retriever backed by the index snapshot
pub struct SimilarityRetriever {
    index: Arc<SimilarityIndex>,
}

impl SimilarityRetriever {
    pub fn new(index: Arc<SimilarityIndex>) -> Self {
        Self { index }
    }
}

#[async_trait::async_trait]
impl Retriever for SimilarityRetriever {
    async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<RetrievedPaper>> {
        let ranked = self.index.similarity_search(&request.query, usize::MAX).await?;

        Ok(ranked
            .into_iter()
            .map(|(record, distance)| RetrievedPaper {
                record,
                distance: Some(distance),
                retrieval_mode: RetrievalMode::Similarity,
            })
            .collect())
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Similarity
    }
}
