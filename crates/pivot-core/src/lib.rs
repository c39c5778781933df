//! Shared building blocks for the CSV pivot table generator.
//!
//! Holds the run configuration and CLI settings, the error type, date and
//! period helpers, and cell formatting used by the data and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{PivotError, Result};
