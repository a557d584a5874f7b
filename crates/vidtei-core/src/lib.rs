pub mod error;
pub mod hierarchy;
pub mod markup;
pub mod model;
pub mod registry;
pub mod timecode;
pub mod vocabulary;

pub use error::{CoreError, MarkupError};
pub use hierarchy::{Assembly, AssemblyStats, CueChild, CueNode, EventNode, ShotNode, SpeechNode, assemble};
pub use markup::{Markup, Span, annotate, rewrite};
pub use model::{
    CueKind, DetectedCelebrity, DetectedLabel, DetectedText, Entity, EntityType, PartOfSpeech, PointEvent,
    Recording, RecordingMetadata, Shot, SyntaxToken, TechnicalCue, Utterance,
};
pub use registry::{ReferenceEntry, Registry, SentimentVocabulary};
pub use vocabulary::{RefCategory, Tag};
