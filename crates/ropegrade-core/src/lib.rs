//! ropegrade-core: exam scoring, achievement evaluation and submissions.
//!
//! This crate defines the data model, the medal catalog, the pure scorer and
//! evaluator, and the engine that persists their results through an
//! injected repository.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod scorer;
pub mod statistics;
pub mod traits;
