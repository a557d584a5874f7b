//! The flat `annotation.json` layout written by earlier pipeline versions.
//!
//! Every stream is present under its own key and most numbers are encoded
//! as strings; the `Metadata` block uses PascalCase keys.

use serde::Deserialize;
use tracing::info;
use vidtei_core::model::{
    CueKind, DetectedCelebrity, DetectedLabel, DetectedText, Recording, RecordingMetadata, Shot, TechnicalCue,
};

use crate::IngestError;
use crate::comprehend::AnalysedUtterance;
use crate::lenient;

#[derive(Debug, Deserialize)]
struct AnnotationFile {
    #[serde(default)]
    utterances: Vec<AnalysedUtterance>,
    #[serde(default)]
    detected_text: Vec<LegacyText>,
    #[serde(default)]
    detected_cues: Vec<LegacySegment>,
    #[serde(default)]
    detected_shots: Vec<LegacySegment>,
    #[serde(default)]
    detected_labels: Vec<LegacyLabel>,
    #[serde(default)]
    detected_celebrities: Vec<LegacyCelebrity>,
    #[serde(rename = "Metadata")]
    metadata: LegacyMetadata,
}

#[derive(Debug, Deserialize)]
struct LegacyText {
    detected_text: String,
    #[serde(deserialize_with = "lenient::number")]
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct LegacySegment {
    #[serde(deserialize_with = "lenient::number")]
    start: f64,
    #[serde(deserialize_with = "lenient::number")]
    end: f64,
    #[serde(deserialize_with = "lenient::number")]
    dur: f64,
    /// Cue kind; absent on shots.
    #[serde(default, rename = "type")]
    kind: Option<String>,
    /// Shot index; absent on cues.
    #[serde(default, deserialize_with = "lenient::integer")]
    index: u32,
}

#[derive(Debug, Deserialize)]
struct LegacyLabel {
    label_name: String,
    #[serde(deserialize_with = "lenient::number")]
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct LegacyCelebrity {
    name: String,
    #[serde(deserialize_with = "lenient::number")]
    timestamp: f64,
    #[serde(default)]
    urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyMetadata {
    file_name: String,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    duration: Option<f64>,
    #[serde(default)]
    format: String,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    frame_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    frame_height: u32,
    #[serde(default, deserialize_with = "lenient::integer")]
    frame_width: u32,
    video_language: String,
    translation_language: String,
}

/// Decode an `annotation.json` document into a [`Recording`]. The MIME
/// type is left unset.
pub fn parse_annotation(json: &str) -> Result<Recording, IngestError> {
    let file: AnnotationFile = serde_json::from_str(json)?;

    let mut cues = Vec::with_capacity(file.detected_cues.len());
    for seg in file.detected_cues {
        let kind = seg.kind.ok_or(IngestError::MissingField {
            record: "detected cue",
            field: "type",
        })?;
        cues.push(TechnicalCue {
            start: seg.start,
            end: seg.end,
            duration: seg.dur,
            kind: CueKind::from(kind),
        });
    }

    let shots: Vec<Shot> = file
        .detected_shots
        .into_iter()
        .map(|s| Shot {
            start: s.start,
            end: s.end,
            duration: s.dur,
            index: s.index,
        })
        .collect();

    let meta = file.metadata;
    let recording = Recording {
        metadata: RecordingMetadata {
            file_name: meta.file_name,
            mime_type: None,
            duration: meta.duration.unwrap_or_default(),
            format: meta.format,
            frame_rate: meta.frame_rate.unwrap_or_default(),
            frame_width: meta.frame_width,
            frame_height: meta.frame_height,
            source_language: meta.video_language,
            target_language: meta.translation_language,
        },
        utterances: file.utterances.into_iter().map(AnalysedUtterance::into_utterance).collect(),
        cues,
        shots,
        texts: file
            .detected_text
            .into_iter()
            .map(|t| DetectedText {
                text: t.detected_text,
                timestamp: t.timestamp,
            })
            .collect(),
        labels: file
            .detected_labels
            .into_iter()
            .map(|l| DetectedLabel {
                name: l.label_name,
                timestamp: l.timestamp,
            })
            .collect(),
        celebrities: file
            .detected_celebrities
            .into_iter()
            .map(|c| DetectedCelebrity {
                name: c.name,
                timestamp: c.timestamp,
                urls: c.urls,
            })
            .collect(),
    };

    info!(
        file = %recording.metadata.file_name,
        utterances = recording.utterances.len(),
        cues = recording.cues.len(),
        shots = recording.shots.len(),
        events = recording.point_event_count(),
        "parsed annotation file"
    );
    Ok(recording)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATION: &str = r#"{
        "utterances": [{
            "text": "Berlin ist schön.", "start": "16.0", "end": "17.5", "dur": "1.50",
            "translation": "Berlin is beautiful.",
            "entities": [{"Score": 0.99, "Type": "LOCATION", "Text": "Berlin",
                          "BeginOffset": 0, "EndOffset": 6}],
            "sentiment": "POSITIVE",
            "syntax": [{"TokenId": 1, "Text": "Berlin", "BeginOffset": 0, "EndOffset": 6,
                        "PartOfSpeech": {"Tag": "NOUN", "Score": 0.9}}]
        }],
        "detected_text": [{"detected_text": "EXIT", "timestamp": "14.00"}],
        "detected_cues": [{"start": "0.00", "end": "60.04", "dur": "60.04", "type": "Content"}],
        "detected_shots": [{"start": "10.00", "end": "15.00", "dur": "5.00", "index": 1}],
        "detected_labels": [{"label_name": "Car", "timestamp": "12.30"}],
        "detected_celebrities": [{"name": "Jane Doe", "timestamp": "11.00", "urls": ["www.example.org/jane"]}],
        "Metadata": {
            "FileName": "clip.mp4", "Duration": 61.0, "Format": "QuickTime / MOV",
            "FrameRate": 25.0, "FrameHeight": "1080", "FrameWidth": "1920",
            "VideoLanguage": "de", "TranslationLanguage": "en"
        }
    }"#;

    #[test]
    fn string_encoded_numbers_parse() {
        let rec = parse_annotation(ANNOTATION).unwrap();
        assert_eq!(rec.metadata.frame_width, 1920);
        assert_eq!(rec.metadata.frame_height, 1080);
        assert_eq!(rec.metadata.source_language, "de");
        assert_eq!(rec.metadata.mime_type, None);
        assert_eq!(rec.cues[0].end, 60.04);
        assert_eq!(rec.shots[0].index, 1);
        assert_eq!(rec.labels[0].timestamp, 12.3);
    }

    #[test]
    fn every_stream_is_carried_over() {
        let rec = parse_annotation(ANNOTATION).unwrap();
        assert_eq!(rec.utterances.len(), 1);
        assert_eq!(rec.utterances[0].duration, 1.5);
        assert_eq!(rec.utterances[0].syntax_tokens.len(), 1);
        assert_eq!(rec.point_event_count(), 3);
        assert_eq!(rec.celebrities[0].urls, ["www.example.org/jane"]);
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let err = parse_annotation(r#"{"utterances": []}"#).unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }
}
