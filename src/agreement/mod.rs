//! Agreement statistics over reconciled annotation data.
//!
//! Consumes only (coder, item, labels) triples; it knows nothing about
//! corpora, annotators or edges.

pub mod distance;
pub mod task;

pub use distance::Distance;
pub use task::AnnotationTask;
