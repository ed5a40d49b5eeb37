//! Report rendering and persistence.

pub mod generator;
pub mod template;

pub use generator::Reporter;
