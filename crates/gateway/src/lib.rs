//! PaperScope local HTTP API
//!
//! Exposes the paper operations over HTTP:
//! - Fetch by keywords or URL, PDF upload
//! - History listing, stats, export and deletion
//! - Keyword and similarity search, index rebuilds
//! - Demo dataset loading, health and Prometheus metrics

pub mod handlers;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use paperscope_common::{
    config::AppConfig,
    embeddings::create_embedder,
    errors::Result,
    PaperStore,
};
use paperscope_ingestion::PaperPipeline;
use paperscope_search::{KeywordRetriever, RetrievalMode, Retriever, SimilarityIndex, SimilarityRetriever};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<PaperStore>,
    pub pipeline: Arc<PaperPipeline>,
    pub index: Arc<SimilarityIndex>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Wire store, pipeline and index from configuration
    pub fn from_config(config: AppConfig, metrics: PrometheusHandle) -> Result<Self> {
        let store = Arc::new(PaperStore::new(&config.storage.db_path));
        let pipeline = Arc::new(PaperPipeline::from_config(&config, store.clone())?);
        let embedder = create_embedder(&config.embedding, config.is_demo())?;
        let index = Arc::new(SimilarityIndex::new(&config.storage.index_meta_path, embedder));

        Ok(Self {
            config: Arc::new(config),
            store,
            pipeline,
            index,
            metrics,
        })
    }

    /// Retriever for `mode`
    pub fn retriever(&self, mode: RetrievalMode) -> Arc<dyn Retriever> {
        match mode {
            RetrievalMode::Keyword => Arc::new(KeywordRetriever::new(self.store.clone())),
            RetrievalMode::Similarity => Arc::new(SimilarityRetriever::new(self.index.clone())),
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let upload_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    let api_routes = Router::new()
        // Ingestion
        .route("/papers/fetch", post(handlers::papers::fetch_papers))
        .route(
            "/papers/upload",
            post(handlers::papers::upload_paper).layer(upload_limit),
        )
        // History
        .route(
            "/papers",
            get(handlers::papers::list_papers).delete(handlers::papers::clear_papers),
        )
        .route("/papers/stats", get(handlers::papers::paper_stats))
        .route(
            "/papers/{id}",
            get(handlers::papers::get_paper).delete(handlers::papers::delete_paper),
        )
        .route("/papers/{id}/export", get(handlers::papers::export_paper))
        // Retrieval
        .route("/search", post(handlers::search::search))
        .route("/index/rebuild", post(handlers::search::rebuild_index))
        // Demo dataset
        .route("/demo/load", post(handlers::demo::load_demo));

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}
