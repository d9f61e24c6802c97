//! Data ingestion layer for cycle-compare.
//!
//! Locates and parses the usage, metadata and vacation payloads on disk and
//! runs the normalization pipeline over them.

pub mod analysis;
pub mod reader;

pub use cycle_core as core;
