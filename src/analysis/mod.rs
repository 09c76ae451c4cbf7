//! Analysis modules.
//!
//! Aggregation of per-annotator state into one corpus, and reconciliation
//! of that corpus into agreement items for a single text.

pub mod aggregator;
pub mod builder;

pub use aggregator::{aggregate, AggregateOptions};
pub use builder::{build, coder_entries};
