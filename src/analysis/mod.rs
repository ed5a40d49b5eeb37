//! Market analysis.
//!
//! Turns the collected data into one prompt and asks the model for the
//! narrative write-up.

pub mod analyzer;
pub mod prompt;

pub use analyzer::Analyzer;
