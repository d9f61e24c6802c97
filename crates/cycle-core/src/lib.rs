//! Normalization and comparison engine for utility billing cycles.
//!
//! Turns raw usage, account metadata and vacation payloads into canonical
//! cycle records (calendar context, rate-bucket allocation, itemized end
//! uses) and computes field-by-field deltas between two cycles.

pub mod allocation;
pub mod builder;
pub mod calendar;
pub mod diff;
pub mod error;
pub mod fields;
pub mod itemization;
pub mod models;
pub mod settings;
pub mod vacation;

pub use builder::{normalize, NormalizeOptions};
pub use diff::calculate_difference;
pub use error::{CycleError, Result};
