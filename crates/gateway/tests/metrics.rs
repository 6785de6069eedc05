//! Prometheus exposition of summarization metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use paperscope_common::summarizer::{DemoSummarizer, Summarizer};

#[test]
fn test_demo_summaries_are_timed() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let summary = metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime
            .block_on(DemoSummarizer::new().summarize("We study robots. We train them."))
            .unwrap()
    });
    assert_eq!(summary, DemoSummarizer::new().summarize_text("We study robots. We train them."));

    let rendered = handle.render();
    assert!(rendered.contains("paperscope_summarization_duration_seconds"));
    assert!(rendered.contains("mode=\"demo\""));
    assert!(rendered.contains("status=\"success\""));
}
