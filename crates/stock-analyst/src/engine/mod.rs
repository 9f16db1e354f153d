//! Analysis engine
//!
//! Runs one request end to end: quote, news, prompt, model.

pub mod generator;
pub mod pipeline;
pub mod result;

pub use generator::AnalysisGenerator;
pub use pipeline::AnalysisEngine;
pub use result::AnalysisReport;
