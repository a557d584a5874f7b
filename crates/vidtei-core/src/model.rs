//! Record types for the annotation streams merged into one TEI document.
//!
//! Every stream arrives fully materialised: utterances with their
//! character-offset annotations, technical cues and shots as time ranges,
//! and point detections as single timestamps. All times are seconds.

use serde::{Deserialize, Serialize};

/// Entities scoring at or below this value are dropped before they reach
/// the registry or the markup rewriter.
pub const ENTITY_SCORE_THRESHOLD: f64 = 0.7;

// ── Labels with an open value set ──

/// Named-entity category reported by the entity analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Person,
    Location,
    Organization,
    Date,
    Quantity,
    /// Any category without a wrapper (EVENT, TITLE, COMMERCIAL_ITEM, ...).
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Organization => "ORGANIZATION",
            Self::Date => "DATE",
            Self::Quantity => "QUANTITY",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PERSON" => Self::Person,
            "LOCATION" => Self::Location,
            "ORGANIZATION" => Self::Organization,
            "DATE" => Self::Date,
            "QUANTITY" => Self::Quantity,
            _ => Self::Other(s),
        }
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

/// Universal part-of-speech tag reported by the syntax analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    /// `O`, `X` and anything else the service may add later.
    Other(String),
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for PartOfSpeech {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            _ => Self::Other(s),
        }
    }
}

impl From<PartOfSpeech> for String {
    fn from(p: PartOfSpeech) -> Self {
        p.as_str().to_string()
    }
}

/// Kind of a technical cue segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CueKind {
    OpeningCredits,
    Content,
    EndCredits,
    /// ColorBars, BlackFrames, StudioLogo, Slate, ...
    Other(String),
}

impl CueKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpeningCredits => "OpeningCredits",
            Self::Content => "Content",
            Self::EndCredits => "EndCredits",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for CueKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "OpeningCredits" => Self::OpeningCredits,
            "Content" => Self::Content,
            "EndCredits" => Self::EndCredits,
            _ => Self::Other(s),
        }
    }
}

impl From<CueKind> for String {
    fn from(k: CueKind) -> Self {
        k.as_str().to_string()
    }
}

// ── Speech ──

/// A named entity at a half-open character range of its utterance's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub text: String,
    pub begin_offset: usize,
    pub end_offset: usize,
    pub score: f64,
}

impl Entity {
    pub fn is_retained(&self) -> bool {
        self.score > ENTITY_SCORE_THRESHOLD
    }
}

/// A part-of-speech token at a half-open character range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxToken {
    pub text: String,
    pub begin_offset: usize,
    pub end_offset: usize,
    pub part_of_speech: PartOfSpeech,
}

/// One spoken segment, delimited by pauses in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub syntax_tokens: Vec<SyntaxToken>,
}

impl Utterance {
    /// Entities above [`ENTITY_SCORE_THRESHOLD`], in their original order.
    pub fn retained_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_retained())
    }
}

// ── Time segments ──

/// Top-level technical segment of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCue {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub kind: CueKind,
}

impl TechnicalCue {
    /// Start used for containment. Opening credits always begin at 0.
    pub fn effective_start(&self) -> f64 {
        match self.kind {
            CueKind::OpeningCredits => 0.0,
            _ => self.start,
        }
    }

    pub fn contains_shot(&self, shot: &Shot) -> bool {
        shot.start >= self.effective_start() && shot.end <= self.end
    }

    pub fn contains_time(&self, t: f64) -> bool {
        self.effective_start() <= t && t <= self.end
    }
}

/// A visually continuous segment nested within a cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub index: u32,
}

impl Shot {
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

// ── Point detections ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedText {
    pub text: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub name: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedCelebrity {
    pub name: String,
    pub timestamp: f64,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// A single-timestamp detection attached to the shot that contains it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointEvent<'a> {
    Text(&'a DetectedText),
    Label(&'a DetectedLabel),
    Celebrity(&'a DetectedCelebrity),
}

impl PointEvent<'_> {
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Text(t) => t.timestamp,
            Self::Label(l) => l.timestamp,
            Self::Celebrity(c) => c.timestamp,
        }
    }
}

// ── Recording bundle ──

/// Header facts about the recorded media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub frame_width: u32,
    #[serde(default)]
    pub frame_height: u32,
    /// ISO 639-1 code of the spoken language.
    pub source_language: String,
    /// ISO 639-1 code of the translation.
    pub target_language: String,
}

/// Every stream describing one recording, ready for the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    #[serde(default)]
    pub utterances: Vec<Utterance>,
    #[serde(default)]
    pub cues: Vec<TechnicalCue>,
    #[serde(default)]
    pub shots: Vec<Shot>,
    #[serde(default)]
    pub texts: Vec<DetectedText>,
    #[serde(default)]
    pub labels: Vec<DetectedLabel>,
    #[serde(default)]
    pub celebrities: Vec<DetectedCelebrity>,
}

impl Recording {
    /// Total number of point detections across the three event streams.
    pub fn point_event_count(&self) -> usize {
        self.texts.len() + self.labels.len() + self.celebrities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_known_and_unknown() {
        assert_eq!(EntityType::from("LOCATION".to_string()), EntityType::Location);
        let other = EntityType::from("COMMERCIAL_ITEM".to_string());
        assert_eq!(other, EntityType::Other("COMMERCIAL_ITEM".into()));
        assert_eq!(other.as_str(), "COMMERCIAL_ITEM");
    }

    #[test]
    fn part_of_speech_other_keeps_raw_tag() {
        let o = PartOfSpeech::from("O".to_string());
        assert_eq!(o, PartOfSpeech::Other("O".into()));
        assert_eq!(String::from(PartOfSpeech::Propn), "PROPN");
    }

    #[test]
    fn entity_score_threshold_is_exclusive() {
        let mut e = Entity {
            entity_type: EntityType::Person,
            text: "Anna".into(),
            begin_offset: 0,
            end_offset: 4,
            score: 0.7,
        };
        assert!(!e.is_retained());
        e.score = 0.71;
        assert!(e.is_retained());
    }

    #[test]
    fn opening_credits_start_at_zero() {
        let cue = TechnicalCue {
            start: 1.5,
            end: 10.0,
            duration: 8.5,
            kind: CueKind::OpeningCredits,
        };
        assert_eq!(cue.effective_start(), 0.0);
        assert!(cue.contains_time(0.2));

        let content = TechnicalCue {
            kind: CueKind::Content,
            ..cue
        };
        assert_eq!(content.effective_start(), 1.5);
        assert!(!content.contains_time(0.2));
    }

    #[test]
    fn shot_bounds_are_inclusive() {
        let shot = Shot {
            start: 10.0,
            end: 15.0,
            duration: 5.0,
            index: 3,
        };
        assert!(shot.contains(10.0));
        assert!(shot.contains(15.0));
        assert!(!shot.contains(15.1));
    }

    #[test]
    fn recording_json_defaults_missing_streams() {
        let json = r#"{
            "metadata": {
                "file_name": "clip.mp4",
                "source_language": "de",
                "target_language": "en"
            },
            "cues": [{"start": 0.0, "end": 5.0, "duration": 5.0, "kind": "StudioLogo"}]
        }"#;
        let rec: Recording = serde_json::from_str(json).unwrap();
        assert!(rec.utterances.is_empty());
        assert_eq!(rec.point_event_count(), 0);
        assert_eq!(rec.cues[0].kind, CueKind::Other("StudioLogo".into()));
        assert_eq!(rec.metadata.mime_type, None);
    }

    #[test]
    fn utterance_json_uses_type_key_for_entities() {
        let json = r#"{
            "text": "Berlin ist schön.",
            "start": 1.0, "end": 2.5, "duration": 1.5,
            "translation": "Berlin is beautiful.",
            "sentiment": "POSITIVE",
            "entities": [{"type": "LOCATION", "text": "Berlin",
                          "begin_offset": 0, "end_offset": 6, "score": 0.99}],
            "syntax_tokens": [{"text": "Berlin", "begin_offset": 0, "end_offset": 6,
                               "part_of_speech": "PROPN"}]
        }"#;
        let u: Utterance = serde_json::from_str(json).unwrap();
        assert_eq!(u.entities[0].entity_type, EntityType::Location);
        assert_eq!(u.syntax_tokens[0].part_of_speech, PartOfSpeech::Propn);
        assert_eq!(u.retained_entities().count(), 1);

        let back = serde_json::to_value(&u).unwrap();
        assert_eq!(back["entities"][0]["type"], "LOCATION");
    }
}
