//! Annotation Text Rendering
//!
//! Line-oriented console rendering of annotation results. Output is
//! deterministic for a given input and cannot fail.

use crate::core::format_seconds;

use super::{
    AnnotationResult, FaceAnnotation, LabelAnnotation, LabelLocation, SafeSearchAnnotation,
    TimeSegment,
};

/// Label printed for locations that cover the whole video
pub const ENTIRE_VIDEO: &str = "Entire video";

/// Renders any annotation result
pub fn format_annotation(result: &AnnotationResult) -> Vec<String> {
    match result {
        AnnotationResult::Labels(labels) => labels.iter().flat_map(format_label).collect(),
        AnnotationResult::Faces(faces) => faces.iter().flat_map(format_face).collect(),
        AnnotationResult::SafeSearch(entries) => {
            entries.iter().flat_map(format_safe_search).collect()
        }
        AnnotationResult::Shots(shots) => format_shots(shots),
    }
}

/// `<start> through <end>` in seconds
pub fn format_segment(segment: &TimeSegment) -> String {
    format!(
        "{} through {}",
        format_seconds(segment.start_sec()),
        format_seconds(segment.end_sec())
    )
}

/// One line per label location
pub fn format_location(location: &LabelLocation) -> String {
    if location.is_whole_video() {
        ENTIRE_VIDEO.to_string()
    } else {
        format_segment(&location.segment_or_default())
    }
}

pub fn format_label(label: &LabelAnnotation) -> Vec<String> {
    let mut lines = Vec::with_capacity(label.locations.len() + 2);
    lines.push(format!("Label description: {}", label.description));
    lines.push("Locations:".to_string());
    lines.extend(label.locations.iter().map(format_location));
    lines
}

pub fn format_face(face: &FaceAnnotation) -> Vec<String> {
    let mut lines = Vec::with_capacity(face.segments.len() + 2);
    lines.push(format!("Thumbnail size: {}", face.thumbnail.len()));
    lines.push("Locations:".to_string());
    lines.extend(face.segments.iter().map(format_segment));
    lines
}

pub fn format_safe_search(entry: &SafeSearchAnnotation) -> Vec<String> {
    vec![
        format!("Time:    {}", format_seconds(entry.time_sec())),
        format!("adult:   {}", entry.adult),
        format!("spoof:   {}", entry.spoof),
        format!("medical: {}", entry.medical),
        format!("racy:    {}", entry.racy),
        format!("violent: {}", entry.violent),
    ]
}

pub fn format_shots(shots: &[TimeSegment]) -> Vec<String> {
    std::iter::once("Scenes:".to_string())
        .chain(shots.iter().map(format_segment))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
