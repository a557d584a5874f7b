//! The native recording bundle: every stream of one recording in a single
//! JSON file, assembled from the individual service responses.

use std::fs;
use std::path::Path;

use tracing::info;
use vidtei_core::model::{DetectedLabel, DetectedText, Recording, RecordingMetadata, Utterance};

use crate::IngestError;
use crate::rekognition::{CelebrityRecognition, Segments};

/// MIME type for a media file name, from its extension.
pub fn guess_mime_type(file_name: &str) -> Option<&'static str> {
    mime_guess::from_path(file_name).first_raw()
}

pub fn read_file(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_recording(path: &Path) -> Result<Recording, IngestError> {
    let recording: Recording = serde_json::from_str(&read_file(path)?)?;
    info!(
        path = %path.display(),
        utterances = recording.utterances.len(),
        cues = recording.cues.len(),
        "loaded recording bundle"
    );
    Ok(recording)
}

pub fn save_recording(recording: &Recording, path: &Path) -> Result<(), IngestError> {
    let json = serde_json::to_string_pretty(recording)?;
    fs::write(path, json).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "saved recording bundle");
    Ok(())
}

/// Collects decoded service responses into one [`Recording`].
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    recording: Recording,
}

impl BundleBuilder {
    pub fn new(file_name: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            recording: Recording {
                metadata: RecordingMetadata {
                    file_name: file_name.to_string(),
                    mime_type: guess_mime_type(file_name).map(str::to_string),
                    source_language: source_language.to_string(),
                    target_language: target_language.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Replace the guessed MIME type.
    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.recording.metadata.mime_type = Some(mime_type.to_string());
        self
    }

    pub fn utterances(mut self, utterances: Vec<Utterance>) -> Self {
        self.recording.utterances = utterances;
        self
    }

    pub fn segments(mut self, segments: Segments) -> Self {
        self.recording.cues = segments.cues;
        self.recording.shots = segments.shots;
        self
    }

    pub fn labels(mut self, labels: Vec<DetectedLabel>) -> Self {
        self.recording.labels = labels;
        self
    }

    pub fn texts(mut self, texts: Vec<DetectedText>) -> Self {
        self.recording.texts = texts;
        self
    }

    /// Celebrities, plus the media facts from the response's video metadata.
    pub fn celebrities(mut self, recognition: CelebrityRecognition) -> Self {
        self.recording.celebrities = recognition.celebrities;
        if let Some(video) = recognition.video {
            let meta = &mut self.recording.metadata;
            meta.duration = video.duration_millis as f64 / 1000.0;
            meta.format = video.format;
            meta.frame_rate = video.frame_rate;
            meta.frame_width = video.frame_width;
            meta.frame_height = video.frame_height;
        }
        self
    }

    pub fn build(self) -> Recording {
        let rec = self.recording;
        info!(
            file = %rec.metadata.file_name,
            utterances = rec.utterances.len(),
            cues = rec.cues.len(),
            shots = rec.shots.len(),
            events = rec.point_event_count(),
            "bundle assembled"
        );
        rec
    }
}
