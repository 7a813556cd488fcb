//! Analysis Request & Service Trait
//!
//! Defines the request submitted for analysis and the interface to the
//! remote annotation service. The Google Cloud REST provider implements it;
//! tests substitute an in-memory service.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;

use crate::core::jobs::OperationSnapshot;
use crate::core::{CoreError, CoreResult, OperationName};

use super::FeatureKind;

// =============================================================================
// Analysis Request
// =============================================================================

/// Where the video to analyze comes from
#[derive(Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Object storage URI (e.g. `gs://bucket/video.mp4`)
    RemoteUri(String),
    /// Raw file bytes embedded in the request
    InlineBytes(Vec<u8>),
}

impl std::fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoSource::RemoteUri(uri) => f.debug_tuple("RemoteUri").field(uri).finish(),
            VideoSource::InlineBytes(bytes) => f
                .debug_tuple("InlineBytes")
                .field(&format_args!("{} bytes", bytes.len()))
                .finish(),
        }
    }
}

/// Request for analysis of a single video
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Video source
    pub source: VideoSource,
    /// Requested features
    pub features: BTreeSet<FeatureKind>,
}

impl AnalysisRequest {
    /// Creates a request for a video in remote storage
    pub fn remote(uri: impl Into<String>, features: impl IntoIterator<Item = FeatureKind>) -> Self {
        Self {
            source: VideoSource::RemoteUri(uri.into()),
            features: features.into_iter().collect(),
        }
    }

    /// Creates a request carrying the video bytes inline
    pub fn inline(bytes: Vec<u8>, features: impl IntoIterator<Item = FeatureKind>) -> Self {
        Self {
            source: VideoSource::InlineBytes(bytes),
            features: features.into_iter().collect(),
        }
    }

    /// Reads a local file and creates an inline request from it
    pub async fn from_local_file(
        path: impl AsRef<Path>,
        features: impl IntoIterator<Item = FeatureKind>,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CoreError::LocalFileRead {
                path: path.display().to_string(),
                source,
            })?;

        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::inline(bytes, features))
    }

    /// Validates the request before submission
    pub fn validate(&self) -> CoreResult<()> {
        if self.features.is_empty() {
            return Err(CoreError::ValidationError(
                "At least one feature must be requested".to_string(),
            ));
        }

        match &self.source {
            VideoSource::RemoteUri(uri) if uri.trim().is_empty() => Err(
                CoreError::ValidationError("Remote video URI cannot be empty".to_string()),
            ),
            VideoSource::InlineBytes(bytes) if bytes.is_empty() => Err(
                CoreError::ValidationError("Inline video content cannot be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Builds the JSON body of an annotate call
    pub fn to_wire(&self) -> AnnotateVideoRequest {
        let (input_uri, input_content) = match &self.source {
            VideoSource::RemoteUri(uri) => (Some(uri.clone()), None),
            VideoSource::InlineBytes(bytes) => (
                None,
                Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            ),
        };

        AnnotateVideoRequest {
            input_uri,
            input_content,
            features: self.features.iter().copied().collect(),
        }
    }
}

/// Wire body of an annotate call
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateVideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_content: Option<String>,
    pub features: Vec<FeatureKind>,
}

// =============================================================================
// Annotation Service Trait
// =============================================================================

/// Remote annotation service
///
/// Implementations:
/// - `GoogleCloudProvider`: Video Intelligence REST API
#[async_trait]
pub trait AnnotationApi: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Starts a long-running annotation job and returns its operation name
    async fn annotate(&self, request: &AnalysisRequest) -> CoreResult<OperationName>;

    /// Fetches the current state of an operation
    async fn get_operation(&self, name: &str) -> CoreResult<OperationSnapshot>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_remote_request_deduplicates_features() {
        let request = AnalysisRequest::remote(
            "gs://bucket/video.mp4",
            [
                FeatureKind::LabelDetection,
                FeatureKind::LabelDetection,
                FeatureKind::ShotChangeDetection,
            ],
        );

        assert_eq!(request.features.len(), 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_features() {
        let request = AnalysisRequest::remote("gs://bucket/video.mp4", Vec::<FeatureKind>::new());
        assert!(matches!(
            request.validate(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_sources() {
        let remote = AnalysisRequest::remote("  ", [FeatureKind::FaceDetection]);
        assert!(remote.validate().is_err());

        let inline = AnalysisRequest::inline(Vec::new(), [FeatureKind::FaceDetection]);
        assert!(inline.validate().is_err());
    }

    #[test]
    fn test_wire_body_for_remote_uri() {
        let request =
            AnalysisRequest::remote("gs://bucket/video.mp4", [FeatureKind::SafeSearchDetection]);
        let json = serde_json::to_value(request.to_wire()).unwrap();

        assert_eq!(json["inputUri"], "gs://bucket/video.mp4");
        assert_eq!(json["features"][0], "SAFE_SEARCH_DETECTION");
        assert!(json.get("inputContent").is_none());
    }

    #[test]
    fn test_wire_body_for_inline_bytes() {
        let request = AnalysisRequest::inline(b"video".to_vec(), [FeatureKind::LabelDetection]);
        let json = serde_json::to_value(request.to_wire()).unwrap();

        assert_eq!(json["inputContent"], "dmlkZW8=");
        assert!(json.get("inputUri").is_none());
    }

    #[test]
    fn test_debug_hides_inline_bytes() {
        let request = AnalysisRequest::inline(vec![7u8; 2048], [FeatureKind::LabelDetection]);
        let debug = format!("{:?}", request.source);
        assert_eq!(debug, "InlineBytes(2048 bytes)");
    }

    #[tokio::test]
    async fn test_from_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not really an mp4").unwrap();

        let request = AnalysisRequest::from_local_file(file.path(), [FeatureKind::LabelDetection])
            .await
            .unwrap();

        assert_eq!(
            request.source,
            VideoSource::InlineBytes(b"not really an mp4".to_vec())
        );
    }

    #[tokio::test]
    async fn test_from_local_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.mp4");

        let result = AnalysisRequest::from_local_file(&missing, [FeatureKind::LabelDetection]).await;
        match result {
            Err(CoreError::LocalFileRead { path, .. }) => assert!(path.ends_with("missing.mp4")),
            other => panic!("Expected LocalFileRead, got {:?}", other),
        }
    }
}
