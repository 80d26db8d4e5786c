//! Deterministic embedders and sample corpora

pub mod fixtures;

pub use fixtures::{LookupEmbedder, TestDataFactory};
