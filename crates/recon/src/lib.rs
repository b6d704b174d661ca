//! `sampleaudit-recon`: Lab sample reconciliation engine.
//!
//! Pure engine crate: receives a worksheet cell grid and document text,
//! returns classified records and statistics. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod worksheet;

pub use config::ReconConfig;
pub use engine::reconcile;
pub use error::ReconError;
pub use extract::{extract_records, Extractor};
pub use matcher::{analyses_equivalent, similarity_ratio};
pub use model::{Cell, MatchedPair, ReconResult, ReconStats, ReconStatus, SampleRecord};
pub use normalize::normalize;
pub use summary::compute_stats;
pub use worksheet::load_worksheet;
