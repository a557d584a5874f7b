//! Video analysis responses: segments, labels, text and celebrities.
//!
//! All four report times as integer milliseconds; they are converted to
//! seconds rounded to hundredths on the way in.

use serde::Deserialize;
use tracing::{debug, info};
use vidtei_core::model::{CueKind, DetectedCelebrity, DetectedLabel, DetectedText, Shot, TechnicalCue};
use vidtei_core::timecode::millis_to_seconds;

use crate::IngestError;

/// Celebrity matches at or below this confidence (percent) are dropped.
pub const CELEBRITY_CONFIDENCE_THRESHOLD: f64 = 90.0;

const SEGMENT_TECHNICAL_CUE: &str = "TECHNICAL_CUE";
const SEGMENT_SHOT: &str = "SHOT";
const TEXT_LINE: &str = "LINE";

// ── Segments ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SegmentResponse {
    #[serde(default)]
    segments: Vec<SegmentRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SegmentRecord {
    #[serde(rename = "Type")]
    kind: String,
    start_timestamp_millis: i64,
    end_timestamp_millis: i64,
    duration_millis: i64,
    technical_cue_segment: Option<CueSegment>,
    shot_segment: Option<ShotSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CueSegment {
    #[serde(rename = "Type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ShotSegment {
    index: u32,
}

/// Technical cues and shots from a segment detection response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
    pub cues: Vec<TechnicalCue>,
    pub shots: Vec<Shot>,
}

pub fn parse_segments(json: &str) -> Result<Segments, IngestError> {
    let response: SegmentResponse = serde_json::from_str(json)?;
    let mut out = Segments::default();
    for seg in response.segments {
        let start = millis_to_seconds(seg.start_timestamp_millis);
        let end = millis_to_seconds(seg.end_timestamp_millis);
        let duration = millis_to_seconds(seg.duration_millis);
        match seg.kind.as_str() {
            SEGMENT_TECHNICAL_CUE => {
                let cue = seg.technical_cue_segment.ok_or(IngestError::MissingField {
                    record: "technical cue segment",
                    field: "TechnicalCueSegment",
                })?;
                out.cues.push(TechnicalCue {
                    start,
                    end,
                    duration,
                    kind: CueKind::from(cue.kind),
                });
            }
            SEGMENT_SHOT => {
                let shot = seg.shot_segment.ok_or(IngestError::MissingField {
                    record: "shot segment",
                    field: "ShotSegment",
                })?;
                out.shots.push(Shot {
                    start,
                    end,
                    duration,
                    index: shot.index,
                });
            }
            other => debug!(kind = other, "unknown segment type, skipped"),
        }
    }
    info!(cues = out.cues.len(), shots = out.shots.len(), "parsed segments");
    Ok(out)
}

// ── Labels ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LabelResponse {
    #[serde(default)]
    labels: Vec<LabelRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LabelRecord {
    timestamp: i64,
    label: LabelName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LabelName {
    name: String,
}

pub fn parse_labels(json: &str) -> Result<Vec<DetectedLabel>, IngestError> {
    let response: LabelResponse = serde_json::from_str(json)?;
    let labels: Vec<DetectedLabel> = response
        .labels
        .into_iter()
        .map(|l| DetectedLabel {
            name: l.label.name,
            timestamp: millis_to_seconds(l.timestamp),
        })
        .collect();
    info!(labels = labels.len(), "parsed labels");
    Ok(labels)
}

// ── Text ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextResponse {
    #[serde(default)]
    text_detections: Vec<TextRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextRecord {
    timestamp: i64,
    text_detection: TextDetection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextDetection {
    detected_text: String,
    #[serde(rename = "Type")]
    kind: String,
}

/// On-screen text lines. Word-level detections are dropped.
pub fn parse_text(json: &str) -> Result<Vec<DetectedText>, IngestError> {
    let response: TextResponse = serde_json::from_str(json)?;
    let total = response.text_detections.len();
    let texts: Vec<DetectedText> = response
        .text_detections
        .into_iter()
        .filter(|t| t.text_detection.kind == TEXT_LINE)
        .map(|t| DetectedText {
            text: t.text_detection.detected_text,
            timestamp: millis_to_seconds(t.timestamp),
        })
        .collect();
    info!(lines = texts.len(), skipped = total - texts.len(), "parsed text detections");
    Ok(texts)
}

// ── Celebrities ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CelebrityResponse {
    #[serde(default)]
    celebrities: Vec<CelebrityRecord>,
    video_metadata: Option<VideoMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CelebrityRecord {
    timestamp: i64,
    celebrity: CelebrityMatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CelebrityMatch {
    name: String,
    confidence: f64,
    #[serde(default)]
    urls: Vec<String>,
}

/// Media facts reported alongside every video analysis result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoMetadata {
    pub duration_millis: i64,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub frame_height: u32,
    #[serde(default)]
    pub frame_width: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CelebrityRecognition {
    pub celebrities: Vec<DetectedCelebrity>,
    pub video: Option<VideoMetadata>,
}

/// Confident celebrity matches, each at its own timestamp, plus the video
/// metadata block.
pub fn parse_celebrities(json: &str) -> Result<CelebrityRecognition, IngestError> {
    let response: CelebrityResponse = serde_json::from_str(json)?;
    let total = response.celebrities.len();
    let celebrities: Vec<DetectedCelebrity> = response
        .celebrities
        .into_iter()
        .filter(|c| c.celebrity.confidence > CELEBRITY_CONFIDENCE_THRESHOLD)
        .map(|c| DetectedCelebrity {
            name: c.celebrity.name,
            timestamp: millis_to_seconds(c.timestamp),
            urls: c.celebrity.urls,
        })
        .collect();
    info!(
        celebrities = celebrities.len(),
        low_confidence = total - celebrities.len(),
        "parsed celebrity recognition"
    );
    Ok(CelebrityRecognition {
        celebrities,
        video: response.video_metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_into_cues_and_shots() {
        let json = r#"{
            "JobStatus": "SUCCEEDED",
            "Segments": [
                {"Type": "TECHNICAL_CUE", "StartTimestampMillis": 0, "EndTimestampMillis": 60040,
                 "DurationMillis": 60040, "TechnicalCueSegment": {"Type": "Content", "Confidence": 99.1}},
                {"Type": "SHOT", "StartTimestampMillis": 10000, "EndTimestampMillis": 15126,
                 "DurationMillis": 5126, "ShotSegment": {"Index": 3, "Confidence": 98.0}},
                {"Type": "TECHNICAL_CUE", "StartTimestampMillis": 60040, "EndTimestampMillis": 61000,
                 "DurationMillis": 960, "TechnicalCueSegment": {"Type": "BlackFrames"}}
            ]
        }"#;
        let segs = parse_segments(json).unwrap();
        assert_eq!(segs.cues.len(), 2);
        assert_eq!(segs.cues[0].kind, CueKind::Content);
        assert_eq!(segs.cues[0].end, 60.04);
        assert_eq!(segs.cues[1].kind, CueKind::Other("BlackFrames".into()));
        assert_eq!(
            segs.shots,
            vec![Shot {
                start: 10.0,
                end: 15.13,
                duration: 5.13,
                index: 3,
            }]
        );
    }

    #[test]
    fn cue_without_cue_block_is_an_error() {
        let json = r#"{"Segments": [{"Type": "TECHNICAL_CUE", "StartTimestampMillis": 0,
            "EndTimestampMillis": 1, "DurationMillis": 1}]}"#;
        assert!(matches!(
            parse_segments(json).unwrap_err(),
            IngestError::MissingField { field: "TechnicalCueSegment", .. }
        ));
    }

    #[test]
    fn labels_convert_millis() {
        let json = r#"{"Labels": [{"Timestamp": 12300, "Label": {"Name": "Car", "Confidence": 97.5}}]}"#;
        assert_eq!(
            parse_labels(json).unwrap(),
            vec![DetectedLabel {
                name: "Car".into(),
                timestamp: 12.3,
            }]
        );
    }

    #[test]
    fn only_text_lines_are_kept() {
        let json = r#"{"TextDetections": [
            {"Timestamp": 1000, "TextDetection": {"DetectedText": "BREAKING NEWS", "Type": "LINE", "Id": 0}},
            {"Timestamp": 1000, "TextDetection": {"DetectedText": "BREAKING", "Type": "WORD", "Id": 1}}
        ]}"#;
        let texts = parse_text(json).unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "BREAKING NEWS");
    }

    #[test]
    fn celebrities_keep_own_timestamp_and_filter_confidence() {
        let json = r#"{
            "Celebrities": [
                {"Timestamp": 4000, "Celebrity": {"Name": "Jane Doe", "Confidence": 99.2,
                 "Urls": ["www.example.org/jane"]}},
                {"Timestamp": 9000, "Celebrity": {"Name": "Jane Doe", "Confidence": 95.0}},
                {"Timestamp": 9500, "Celebrity": {"Name": "John Roe", "Confidence": 90.0, "Urls": []}}
            ],
            "VideoMetadata": {"Codec": "h264", "DurationMillis": 61000, "Format": "QuickTime / MOV",
                              "FrameRate": 25.0, "FrameHeight": 1080, "FrameWidth": 1920}
        }"#;
        let rec = parse_celebrities(json).unwrap();
        let stamps: Vec<f64> = rec.celebrities.iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, [4.0, 9.0]);
        assert!(rec.celebrities[1].urls.is_empty());
        let video = rec.video.unwrap();
        assert_eq!((video.frame_width, video.frame_height), (1920, 1080));
        assert_eq!(video.duration_millis, 61000);
    }
}
