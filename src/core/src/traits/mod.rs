//! Seams towards the storage collaborators

pub mod dataset;

pub use dataset::{DatasetSink, DatasetSource};
