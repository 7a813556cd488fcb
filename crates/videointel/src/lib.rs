//! VideoIntel Core Library
//!
//! Submits video-analysis jobs (labels, faces, safe search, shot changes) to a
//! remote annotation service, waits for the long-running operation to finish,
//! and renders the annotation results as text.
//!
//! ## Usage
//!
//! ```no_run
//! use videointel_lib::core::{
//!     annotations::{format_annotation, AnalysisRequest, FeatureKind},
//!     jobs::AnnotationClient,
//!     settings::ClientSettings,
//! };
//!
//! # async fn run() -> videointel_lib::core::CoreResult<()> {
//! let client = AnnotationClient::from_settings(&ClientSettings::from_env())?;
//! let request = AnalysisRequest::remote("gs://bucket/video.mp4", [FeatureKind::ShotChangeDetection]);
//!
//! let operation = client
//!     .submit(request, |op| {
//!         let result = op.into_first_result()?;
//!         Ok(format_annotation(&result.annotation_for(FeatureKind::ShotChangeDetection)))
//!     })
//!     .await?;
//!
//! for line in operation.wait_until_done().await? {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
