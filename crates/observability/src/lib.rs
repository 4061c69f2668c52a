//! Process-wide logging setup shared by the API and worker binaries.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{init, LogFormat};
