//! Human-readable summary of a recording for `vidtei inspect`.

use std::fmt::Write as _;

use vidtei_core::hierarchy::{CueChild, CueNode, assemble};
use vidtei_core::model::Recording;
use vidtei_core::registry::{Catalog, Registry, SentimentVocabulary};
use vidtei_core::timecode::{clock, decimal};
use vidtei_core::vocabulary::RefCategory;

const MAX_LIST_ITEMS: usize = 10;

pub fn print_recording_card(recording: &Recording) -> anyhow::Result<()> {
    print!("{}", recording_card(recording)?);
    Ok(())
}

/// Build the card text: media facts, stream counts, registries, sentiment
/// labels and the cue outline.
pub fn recording_card(recording: &Recording) -> anyhow::Result<String> {
    let meta = &recording.metadata;
    let registry = Registry::from_recording(recording);
    let sentiments = SentimentVocabulary::collect(&recording.utterances);
    let assembly = assemble(recording, &registry)?;

    let mut out = String::new();
    let heading = format!("=== {} ===", meta.file_name);
    writeln!(out, "{heading}")?;
    writeln!(
        out,
        "{}, {} -> {}",
        meta.mime_type.as_deref().unwrap_or("unknown type"),
        meta.source_language,
        meta.target_language
    )?;
    writeln!(out)?;

    // ── Media ──
    writeln!(out, "Media")?;
    field(&mut out, "duration", &format!("{} s", decimal(meta.duration)))?;
    if !meta.format.is_empty() {
        field(&mut out, "format", &meta.format)?;
    }
    field(&mut out, "frame rate", &meta.frame_rate.to_string())?;
    field(&mut out, "frame size", &format!("{}x{}", meta.frame_width, meta.frame_height))?;
    writeln!(out)?;

    // ── Streams ──
    writeln!(out, "Streams")?;
    field(&mut out, "utterances", &recording.utterances.len().to_string())?;
    field(&mut out, "technical cues", &recording.cues.len().to_string())?;
    field(&mut out, "shots", &recording.shots.len().to_string())?;
    field(&mut out, "on-screen text", &recording.texts.len().to_string())?;
    field(&mut out, "labels", &recording.labels.len().to_string())?;
    field(&mut out, "celebrities", &recording.celebrities.len().to_string())?;
    writeln!(out)?;

    // ── References ──
    writeln!(out, "References")?;
    for (name, category) in [
        ("celebrities", RefCategory::Celebrity),
        ("persons", RefCategory::Person),
        ("places", RefCategory::Place),
        ("organizations", RefCategory::Organization),
    ] {
        reference_list(&mut out, name, registry.catalog(category))?;
    }
    if !sentiments.labels().is_empty() {
        field(&mut out, "sentiments", &sentiments.labels().join(", "))?;
    }
    writeln!(out)?;

    // ── Cues ──
    writeln!(out, "Cues ({})", assembly.cues.len())?;
    for node in &assembly.cues {
        cue_line(&mut out, node)?;
    }
    let stats = &assembly.stats;
    let dropped = stats.shots_dropped + stats.events_dropped + stats.utterances_dropped;
    if dropped > 0 {
        writeln!(
            out,
            "  dropped: {} shots, {} events, {} utterances outside every parent",
            stats.shots_dropped, stats.events_dropped, stats.utterances_dropped
        )?;
    }

    Ok(out)
}

fn field(out: &mut String, name: &str, value: &str) -> std::fmt::Result {
    writeln!(out, "  {:<26} {}", name, value)
}

fn reference_list(out: &mut String, name: &str, catalog: &Catalog) -> std::fmt::Result {
    if catalog.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {} ({}):", name, catalog.len())?;
    for entry in catalog.entries().iter().take(MAX_LIST_ITEMS) {
        writeln!(out, "    {:<10} {}", entry.id, entry.display_text)?;
    }
    if catalog.len() > MAX_LIST_ITEMS {
        writeln!(out, "    ... and {} more", catalog.len() - MAX_LIST_ITEMS)?;
    }
    Ok(())
}

fn cue_line(out: &mut String, node: &CueNode<'_>) -> std::fmt::Result {
    let (mut shots, mut events, mut speech) = (0, 0, 0);
    for child in &node.children {
        match child {
            CueChild::Shot(shot) => {
                shots += 1;
                events += shot.events.len();
            }
            CueChild::Speech(_) => speech += 1,
        }
    }
    writeln!(
        out,
        "  {:<16} {} - {}  ({} shots, {} events, {} utterances)",
        node.cue.kind.as_str(),
        clock(node.cue.start),
        clock(node.cue.end),
        shots,
        events,
        speech
    )
}

#[cfg(test)]
mod tests {
    use vidtei_core::model::{
        CueKind, DetectedCelebrity, DetectedLabel, Entity, EntityType, RecordingMetadata, Shot, TechnicalCue,
        Utterance,
    };

    use super::*;

    fn recording() -> Recording {
        Recording {
            metadata: RecordingMetadata {
                file_name: "clip.mp4".into(),
                mime_type: Some("video/mp4".into()),
                duration: 61.0,
                format: "QuickTime / MOV".into(),
                frame_rate: 25.0,
                frame_width: 1920,
                frame_height: 1080,
                source_language: "de".into(),
                target_language: "en".into(),
            },
            utterances: vec![Utterance {
                text: "Berlin ist schön.".into(),
                start: 16.0,
                end: 17.5,
                duration: 1.5,
                translation: "Berlin is beautiful.".into(),
                sentiment: "POSITIVE".into(),
                entities: vec![Entity {
                    entity_type: EntityType::Location,
                    text: "Berlin".into(),
                    begin_offset: 0,
                    end_offset: 6,
                    score: 0.99,
                }],
                syntax_tokens: vec![],
            }],
            cues: vec![TechnicalCue {
                start: 0.0,
                end: 60.0,
                duration: 60.0,
                kind: CueKind::Content,
            }],
            shots: vec![Shot {
                start: 10.0,
                end: 15.0,
                duration: 5.0,
                index: 1,
            }],
            labels: vec![DetectedLabel {
                name: "Car".into(),
                timestamp: 12.3,
            }],
            celebrities: vec![DetectedCelebrity {
                name: "Jane Doe".into(),
                timestamp: 11.0,
                urls: vec![],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn card_lists_media_and_references() {
        let card = recording_card(&recording()).unwrap();
        assert!(card.starts_with("=== clip.mp4 ===\nvideo/mp4, de -> en\n"));
        assert!(card.contains("  frame size                 1920x1080\n"));
        assert!(card.contains("    pers001    Jane Doe\n"));
        assert!(card.contains("    place001   Berlin\n"));
        assert!(card.contains("  sentiments                 POSITIVE\n"));
    }

    #[test]
    fn card_outlines_cues() {
        let card = recording_card(&recording()).unwrap();
        assert!(card.contains("Cues (1)\n"));
        assert!(card.contains("00:00:00 - 00:01:00  (1 shots, 2 events, 1 utterances)"));
        assert!(!card.contains("dropped"));
    }
}
