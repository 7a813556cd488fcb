//! Annotation Data Models
//!
//! Feature kinds and the per-video annotation schema returned by the
//! analysis service. Field names follow the service's JSON wire format.

use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{deserialize_int64, micros_to_seconds, Micros, TimeSec};

// =============================================================================
// Feature Kinds
// =============================================================================

/// Analysis capability requested for a video
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKind {
    /// Label (entity) detection
    LabelDetection,
    /// Face detection
    FaceDetection,
    /// Explicit content detection
    SafeSearchDetection,
    /// Camera shot change detection
    ShotChangeDetection,
}

impl FeatureKind {
    /// Returns all feature kinds
    pub fn all() -> Vec<FeatureKind> {
        vec![
            FeatureKind::LabelDetection,
            FeatureKind::FaceDetection,
            FeatureKind::SafeSearchDetection,
            FeatureKind::ShotChangeDetection,
        ]
    }

    /// Wire name used in annotate requests
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            FeatureKind::LabelDetection => "LABEL_DETECTION",
            FeatureKind::FaceDetection => "FACE_DETECTION",
            FeatureKind::SafeSearchDetection => "SAFE_SEARCH_DETECTION",
            FeatureKind::ShotChangeDetection => "SHOT_CHANGE_DETECTION",
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::LabelDetection => write!(f, "label"),
            FeatureKind::FaceDetection => write!(f, "face"),
            FeatureKind::SafeSearchDetection => write!(f, "safe search"),
            FeatureKind::ShotChangeDetection => write!(f, "shot change"),
        }
    }
}

// =============================================================================
// Time Segment
// =============================================================================

/// A time span within the video, in microsecond offsets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSegment {
    /// Start offset in microseconds
    #[serde(default, deserialize_with = "deserialize_int64")]
    pub start_time_offset: Micros,
    /// End offset in microseconds
    #[serde(default, deserialize_with = "deserialize_int64")]
    pub end_time_offset: Micros,
}

impl TimeSegment {
    /// Creates a new segment
    pub fn new(start_time_offset: Micros, end_time_offset: Micros) -> Self {
        Self {
            start_time_offset,
            end_time_offset,
        }
    }

    /// Start time in seconds
    pub fn start_sec(&self) -> TimeSec {
        micros_to_seconds(self.start_time_offset)
    }

    /// End time in seconds
    pub fn end_sec(&self) -> TimeSec {
        micros_to_seconds(self.end_time_offset)
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Granularity of a label location
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelLevel {
    /// Applies to the whole video
    VideoLevel,
    /// Applies to a user-specified segment
    SegmentLevel,
    /// Applies to a detected shot
    ShotLevel,
    /// Applies to a single frame
    FrameLevel,
    /// Unspecified or unrecognized level
    #[default]
    #[serde(other)]
    LabelLevelUnspecified,
}

/// Where a label was found
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLocation {
    /// Segment the label applies to (absent for whole-video labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<TimeSegment>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub level: LabelLevel,
}

impl LabelLocation {
    /// Creates a whole-video location
    pub fn whole_video() -> Self {
        Self {
            segment: None,
            confidence: 0.0,
            level: LabelLevel::VideoLevel,
        }
    }

    /// Creates a segment-level location
    pub fn segment(start_time_offset: Micros, end_time_offset: Micros) -> Self {
        Self {
            segment: Some(TimeSegment::new(start_time_offset, end_time_offset)),
            confidence: 0.0,
            level: LabelLevel::SegmentLevel,
        }
    }

    /// Whether the label applies to the entire video
    pub fn is_whole_video(&self) -> bool {
        self.level == LabelLevel::VideoLevel
    }

    /// Segment for non-video-level locations; a missing segment reads as zero offsets
    pub fn segment_or_default(&self) -> TimeSegment {
        self.segment.unwrap_or_default()
    }
}

/// A detected label with its locations
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language_code: String,
    #[serde(default)]
    pub locations: Vec<LabelLocation>,
}

// =============================================================================
// Faces
// =============================================================================

/// A detected face
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    /// Thumbnail image bytes (base64 on the wire)
    #[serde(
        default,
        serialize_with = "serialize_base64",
        deserialize_with = "deserialize_base64"
    )]
    pub thumbnail: Vec<u8>,
    /// Segments where the face appears
    #[serde(default)]
    pub segments: Vec<TimeSegment>,
}

fn serialize_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| serde::de::Error::custom(format!("invalid base64 thumbnail: {}", e)))
}

// =============================================================================
// Safe Search
// =============================================================================

/// Bucketized likelihood score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Likelihood {
    /// Wire name of the score
    pub fn as_str(&self) -> &'static str {
        match self {
            Likelihood::Unknown => "UNKNOWN",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit content scores at one point in time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeSearchAnnotation {
    /// Offset in microseconds
    #[serde(default, deserialize_with = "deserialize_int64")]
    pub time_offset: Micros,
    #[serde(default)]
    pub adult: Likelihood,
    #[serde(default)]
    pub spoof: Likelihood,
    #[serde(default)]
    pub medical: Likelihood,
    #[serde(default)]
    pub violent: Likelihood,
    #[serde(default)]
    pub racy: Likelihood,
}

impl SafeSearchAnnotation {
    /// Time of the sample in seconds
    pub fn time_sec(&self) -> TimeSec {
        micros_to_seconds(self.time_offset)
    }
}

// =============================================================================
// Status
// =============================================================================

/// Error status reported by the service
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Per-video Results
// =============================================================================

/// Everything the service detected in one video
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnnotationResults {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input_uri: String,
    #[serde(default)]
    pub label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    pub face_annotations: Vec<FaceAnnotation>,
    #[serde(default)]
    pub safe_search_annotations: Vec<SafeSearchAnnotation>,
    #[serde(default)]
    pub shot_annotations: Vec<TimeSegment>,
    /// Per-video failure, if this video could not be processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceStatus>,
}

impl VideoAnnotationResults {
    /// Extracts the annotations produced by one feature
    pub fn annotation_for(&self, feature: FeatureKind) -> AnnotationResult {
        match feature {
            FeatureKind::LabelDetection => AnnotationResult::Labels(self.label_annotations.clone()),
            FeatureKind::FaceDetection => AnnotationResult::Faces(self.face_annotations.clone()),
            FeatureKind::SafeSearchDetection => {
                AnnotationResult::SafeSearch(self.safe_search_annotations.clone())
            }
            FeatureKind::ShotChangeDetection => {
                AnnotationResult::Shots(self.shot_annotations.clone())
            }
        }
    }
}

/// Annotations of a single feature kind
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationResult {
    Labels(Vec<LabelAnnotation>),
    Faces(Vec<FaceAnnotation>),
    SafeSearch(Vec<SafeSearchAnnotation>),
    Shots(Vec<TimeSegment>),
}

impl AnnotationResult {
    /// Feature that produced these annotations
    pub fn feature(&self) -> FeatureKind {
        match self {
            AnnotationResult::Labels(_) => FeatureKind::LabelDetection,
            AnnotationResult::Faces(_) => FeatureKind::FaceDetection,
            AnnotationResult::SafeSearch(_) => FeatureKind::SafeSearchDetection,
            AnnotationResult::Shots(_) => FeatureKind::ShotChangeDetection,
        }
    }

    /// Number of annotation entries
    pub fn len(&self) -> usize {
        match self {
            AnnotationResult::Labels(items) => items.len(),
            AnnotationResult::Faces(items) => items.len(),
            AnnotationResult::SafeSearch(items) => items.len(),
            AnnotationResult::Shots(items) => items.len(),
        }
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
