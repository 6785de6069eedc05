//! Local paper store
//!
//! Provides:
//! - The `PaperRecord` model persisted as a JSON array
//! - `PaperStore`, a read-modify-write file store with idempotent insertion
//! - Timestamp parsing used for chronological views

mod models;
mod repository;
mod timestamp;

pub use models::{PaperRecord, PaperSource};
pub use repository::{PaperStore, StoreSnapshot, StoreStatus};
pub use timestamp::{now_timestamp, parse_timestamp, sort_key};
