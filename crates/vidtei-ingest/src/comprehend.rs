//! Utterances enriched by translation, sentiment, entity and syntax analysis.
//!
//! Each record is a transcript draft plus the raw fields the language
//! services return, in their PascalCase shape. Times may be numbers or
//! decimal strings, and the duration may be called `dur`.

use serde::Deserialize;
use tracing::{debug, info};
use vidtei_core::model::{Entity, EntityType, PartOfSpeech, SyntaxToken, Utterance};

use crate::IngestError;
use crate::lenient;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectedEntity {
    #[serde(rename = "Type")]
    pub entity_type: String,
    pub text: String,
    pub begin_offset: usize,
    pub end_offset: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PosTag {
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectedToken {
    pub text: String,
    pub begin_offset: usize,
    pub end_offset: usize,
    pub part_of_speech: PosTag,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysedUtterance {
    pub text: String,
    #[serde(deserialize_with = "lenient::number")]
    pub start: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub end: f64,
    #[serde(default, alias = "dur", deserialize_with = "lenient::opt_number")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub entities: Vec<DetectedEntity>,
    #[serde(default, alias = "syntax_tokens")]
    pub syntax: Vec<DetectedToken>,
}

impl AnalysedUtterance {
    /// Convert to the core record, dropping entities at or below the score
    /// threshold.
    pub fn into_utterance(self) -> Utterance {
        let total = self.entities.len();
        let entities: Vec<Entity> = self
            .entities
            .into_iter()
            .map(|e| Entity {
                entity_type: EntityType::from(e.entity_type),
                text: e.text,
                begin_offset: e.begin_offset,
                end_offset: e.end_offset,
                score: e.score,
            })
            .filter(Entity::is_retained)
            .collect();
        if entities.len() < total {
            debug!(
                text = %self.text,
                dropped = total - entities.len(),
                "low-scoring entities dropped"
            );
        }

        let syntax_tokens = self
            .syntax
            .into_iter()
            .map(|t| SyntaxToken {
                text: t.text,
                begin_offset: t.begin_offset,
                end_offset: t.end_offset,
                part_of_speech: PartOfSpeech::from(t.part_of_speech.tag),
            })
            .collect();

        Utterance {
            duration: self.duration.unwrap_or(self.end - self.start),
            text: self.text,
            start: self.start,
            end: self.end,
            translation: self.translation,
            sentiment: self.sentiment,
            entities,
            syntax_tokens,
        }
    }
}

/// Decode a JSON array of analysed utterances.
pub fn parse_analysed(json: &str) -> Result<Vec<Utterance>, IngestError> {
    let records: Vec<AnalysedUtterance> = serde_json::from_str(json)?;
    let utterances: Vec<Utterance> = records.into_iter().map(AnalysedUtterance::into_utterance).collect();
    info!(utterances = utterances.len(), "parsed analysed utterances");
    Ok(utterances)
}
