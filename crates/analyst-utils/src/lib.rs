//! Shared utilities for the stock analyst workspace
//!
//! Currently this is the tracing subscriber setup used by the binary.

pub mod logging;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
