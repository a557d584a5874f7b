//! Speech transcript decoding and pause-based segmentation.
//!
//! The transcription service reports a flat item stream: spoken words with
//! start and end times, and punctuation marks without times. An utterance
//! ends wherever the silence between two words exceeds the pause threshold.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::IngestError;
use crate::lenient;

/// Silence, in seconds, that separates two utterances.
pub const PAUSE_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    pub pause: f64,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            pause: PAUSE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Pronunciation,
    Punctuation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub start_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub end_time: Option<f64>,
    pub alternatives: Vec<Alternative>,
}

impl TranscriptItem {
    fn content(&self) -> &str {
        self.alternatives.first().map(|a| a.content.as_str()).unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct TranscriptResponse {
    results: TranscriptResults,
}

#[derive(Deserialize)]
struct TranscriptResults {
    items: Vec<TranscriptItem>,
}

/// An utterance before translation and language analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceDraft {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Decode the `results.items` stream of a transcription result.
pub fn parse_transcript(json: &str) -> Result<Vec<TranscriptItem>, IngestError> {
    let response: TranscriptResponse = serde_json::from_str(json)?;
    info!(items = response.results.items.len(), "parsed transcript");
    Ok(response.results.items)
}

fn round_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

struct Open {
    text: String,
    start: f64,
    end: f64,
}

impl Open {
    fn finish(self) -> UtteranceDraft {
        UtteranceDraft {
            text: self.text,
            start: self.start,
            end: self.end,
            duration: round_hundredths(self.end - self.start),
        }
    }
}

/// Group words into utterances separated by pauses longer than
/// `options.pause`. Words are joined by single spaces; punctuation attaches
/// to the preceding word.
pub fn segment(items: &[TranscriptItem], options: &SegmentOptions) -> Result<Vec<UtteranceDraft>, IngestError> {
    let mut drafts = Vec::new();
    let mut current: Option<Open> = None;

    for item in items {
        match item.kind {
            ItemKind::Pronunciation => {
                let start = item.start_time.ok_or(IngestError::MissingField {
                    record: "pronunciation item",
                    field: "start_time",
                })?;
                let end = item.end_time.ok_or(IngestError::MissingField {
                    record: "pronunciation item",
                    field: "end_time",
                })?;
                if let Some(open) = current.as_mut().filter(|open| start - open.end <= options.pause) {
                    open.text.push(' ');
                    open.text.push_str(item.content());
                    open.end = end;
                } else {
                    drafts.extend(current.take().map(Open::finish));
                    current = Some(Open {
                        text: item.content().to_string(),
                        start,
                        end,
                    });
                }
            }
            ItemKind::Punctuation => match current.as_mut() {
                Some(open) => open.text.push_str(item.content()),
                None => debug!(mark = item.content(), "punctuation before the first word, skipped"),
            },
        }
    }
    drafts.extend(current.map(Open::finish));

    info!(utterances = drafts.len(), pause = options.pause, "transcript segmented");
    Ok(drafts)
}
