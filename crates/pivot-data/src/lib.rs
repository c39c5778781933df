//! Data layer for the CSV pivot table generator.
//!
//! Reads CSV rows, loads match lists, aggregates rows into a pivot model,
//! renders the model into a header and body matrix, and writes it back out
//! as CSV.

pub mod aggregator;
pub mod match_list;
pub mod reader;
pub mod renderer;
pub mod writer;

pub use pivot_core as core;
