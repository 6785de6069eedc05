//! Built-in demo dataset

use paperscope_common::store::now_timestamp;
use paperscope_common::summarizer::DemoSummarizer;
use paperscope_common::{PaperRecord, PaperStore, Result};
use tracing::info;

const DEMO_PAPERS: [(&str, &str, &str); 2] = [
    (
        "demo:1",
        "Demonstration of PaperScope",
        "This paper demonstrates the PaperScope demo flow and UI.",
    ),
    (
        "demo:2",
        "Sample Paper on Robot Learning",
        "An example abstract about robot learning and reinforcement learning.",
    ),
];

/// The fixed demo records, summarized offline
pub fn demo_records() -> Vec<PaperRecord> {
    let summarizer = DemoSummarizer::new();
    DEMO_PAPERS
        .iter()
        .map(|(id, title, abstract_text)| {
            PaperRecord::new(*id, *title, summarizer.summarize_text(abstract_text))
                .with_abstract(*abstract_text)
        })
        .collect()
}

/// Replace the store contents with the demo dataset, stamped with the current time
pub fn load_demo_data(store: &PaperStore) -> Result<Vec<PaperRecord>> {
    let now = now_timestamp();
    let records: Vec<PaperRecord> = demo_records()
        .into_iter()
        .map(|r| r.with_timestamp(now.clone()))
        .collect();
    store.save(&records)?;
    info!(count = records.len(), path = %store.path().display(), "Demo dataset written");
    Ok(records)
}
