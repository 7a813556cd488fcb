//! Video Annotation System
//!
//! Request and result models for remote video analysis, the service seam,
//! and console rendering of results.
//!
//! Supported features: label detection, face detection, safe-search
//! detection and shot-change detection. Time offsets arrive in microseconds.

pub mod format;
pub mod models;
pub mod provider;
pub mod providers;

pub use format::format_annotation;
pub use models::*;
pub use provider::{AnalysisRequest, AnnotateVideoRequest, AnnotationApi, VideoSource};
pub use providers::GoogleCloudProvider;
