//! VideoIntel Core Engine
//!
//! Annotation models, the analysis service seam, the long-running operation
//! client and its configuration.

pub mod annotations;
pub mod jobs;
pub mod settings;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
