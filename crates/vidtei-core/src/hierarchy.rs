//! Nest shots, point detections and utterances under technical cues.
//!
//! Each item is claimed by the first parent in input order whose range
//! contains it; items nothing contains are dropped and logged. Utterances
//! are numbered by one counter across the whole recording, so the ids
//! derived from the number are unique in the document.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::markup::{Markup, annotate};
use crate::model::{PointEvent, Recording, Shot, TechnicalCue, Utterance};
use crate::registry::Registry;
use crate::vocabulary::RefCategory;

/// A point detection placed in a shot.
#[derive(Debug, Clone, PartialEq)]
pub struct EventNode<'a> {
    pub event: PointEvent<'a>,
    /// Registry id, for celebrity detections only.
    pub reference: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotNode<'a> {
    pub shot: &'a Shot,
    pub events: Vec<EventNode<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechNode<'a> {
    pub utterance: &'a Utterance,
    /// 1-based, document-wide.
    pub number: usize,
    pub markup: Markup,
}

impl SpeechNode<'_> {
    pub fn utterance_id(&self) -> String {
        format!("utterance{:03}", self.number)
    }

    pub fn translation_id(&self) -> String {
        format!("translation{:03}", self.number)
    }
}

/// Child division of a cue.
#[derive(Debug, Clone, PartialEq)]
pub enum CueChild<'a> {
    Shot(ShotNode<'a>),
    Speech(SpeechNode<'a>),
}

impl CueChild<'_> {
    pub fn start(&self) -> f64 {
        match self {
            Self::Shot(s) => s.shot.start,
            Self::Speech(s) => s.utterance.start,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CueNode<'a> {
    pub cue: &'a TechnicalCue,
    pub children: Vec<CueChild<'a>>,
}

/// Placed and dropped counts per stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub shots_placed: usize,
    pub shots_dropped: usize,
    pub events_placed: usize,
    pub events_dropped: usize,
    pub utterances_placed: usize,
    pub utterances_dropped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly<'a> {
    pub cues: Vec<CueNode<'a>>,
    pub stats: AssemblyStats,
}

/// Point detections pooled in text, label, celebrity order and stably
/// sorted by timestamp.
fn pooled_events(recording: &Recording) -> Vec<PointEvent<'_>> {
    let mut events: Vec<PointEvent<'_>> = recording
        .texts
        .iter()
        .map(PointEvent::Text)
        .chain(recording.labels.iter().map(PointEvent::Label))
        .chain(recording.celebrities.iter().map(PointEvent::Celebrity))
        .collect();
    events.sort_by(|a, b| a.timestamp().total_cmp(&b.timestamp()));
    events
}

/// Build the cue hierarchy. Utterance markup is produced here, so a bad
/// span or a missing reference fails the whole assembly.
pub fn assemble<'a>(recording: &'a Recording, registry: &'a Registry) -> Result<Assembly<'a>, CoreError> {
    let events = pooled_events(recording);
    let mut shot_claimed = vec![false; recording.shots.len()];
    let mut event_claimed = vec![false; events.len()];
    let mut utterance_claimed = vec![false; recording.utterances.len()];
    let mut stats = AssemblyStats::default();
    let mut number = 0;

    let mut cues = Vec::with_capacity(recording.cues.len());
    for cue in &recording.cues {
        let mut children = Vec::new();

        for (si, shot) in recording.shots.iter().enumerate() {
            if shot_claimed[si] || !cue.contains_shot(shot) {
                continue;
            }
            shot_claimed[si] = true;

            let mut placed = Vec::new();
            for (ei, event) in events.iter().enumerate() {
                if event_claimed[ei] || !shot.contains(event.timestamp()) {
                    continue;
                }
                event_claimed[ei] = true;
                let reference = match event {
                    PointEvent::Celebrity(c) => Some(registry.require(&c.name, RefCategory::Celebrity)?),
                    _ => None,
                };
                placed.push(EventNode {
                    event: *event,
                    reference,
                });
            }
            stats.events_placed += placed.len();
            children.push(CueChild::Shot(ShotNode {
                shot,
                events: placed,
            }));
        }

        for (ui, utterance) in recording.utterances.iter().enumerate() {
            if utterance_claimed[ui] || !cue.contains_time(utterance.start) {
                continue;
            }
            utterance_claimed[ui] = true;
            number += 1;
            let node = SpeechNode {
                utterance,
                number,
                markup: Markup::default(),
            };
            let markup = annotate(utterance, &node.utterance_id(), registry)?;
            children.push(CueChild::Speech(SpeechNode { markup, ..node }));
        }

        children.sort_by(|a, b| a.start().total_cmp(&b.start()));
        cues.push(CueNode { cue, children });
    }

    for (shot, _) in recording.shots.iter().zip(&shot_claimed).filter(|(_, c)| !**c) {
        debug!(index = shot.index, start = shot.start, end = shot.end, "shot outside every cue, dropped");
    }
    for (event, _) in events.iter().zip(&event_claimed).filter(|(_, c)| !**c) {
        debug!(timestamp = event.timestamp(), event = ?event, "event outside every placed shot, dropped");
    }
    for (utterance, _) in recording.utterances.iter().zip(&utterance_claimed).filter(|(_, c)| !**c) {
        debug!(start = utterance.start, text = %utterance.text, "utterance outside every cue, dropped");
    }

    stats.shots_placed = shot_claimed.iter().filter(|c| **c).count();
    stats.shots_dropped = shot_claimed.len() - stats.shots_placed;
    stats.events_dropped = events.len() - stats.events_placed;
    stats.utterances_placed = number;
    stats.utterances_dropped = recording.utterances.len() - number;

    info!(
        cues = cues.len(),
        shots = stats.shots_placed,
        events = stats.events_placed,
        utterances = stats.utterances_placed,
        dropped = stats.shots_dropped + stats.events_dropped + stats.utterances_dropped,
        "hierarchy assembled"
    );

    Ok(Assembly { cues, stats })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::{CueKind, DetectedCelebrity, DetectedLabel, DetectedText};

    fn cue(start: f64, end: f64, kind: CueKind) -> TechnicalCue {
        TechnicalCue {
            start,
            end,
            duration: end - start,
            kind,
        }
    }

    fn shot(start: f64, end: f64, index: u32) -> Shot {
        Shot {
            start,
            end,
            duration: end - start,
            index,
        }
    }

    fn label(name: &str, timestamp: f64) -> DetectedLabel {
        DetectedLabel {
            name: name.into(),
            timestamp,
        }
    }

    fn speech(text: &str, start: f64) -> Utterance {
        Utterance {
            text: text.into(),
            start,
            end: start + 1.0,
            duration: 1.0,
            translation: String::new(),
            sentiment: "NEUTRAL".into(),
            entities: Vec::new(),
            syntax_tokens: Vec::new(),
        }
    }

    fn shots_of<'r, 'a>(assembly: &'r Assembly<'a>) -> Vec<&'r ShotNode<'a>> {
        assembly
            .cues
            .iter()
            .flat_map(|c| &c.children)
            .filter_map(|child| match child {
                CueChild::Shot(s) => Some(s),
                CueChild::Speech(_) => None,
            })
            .collect()
    }

    #[test]
    fn event_attaches_to_containing_shot_or_is_dropped() {
        let recording = Recording {
            cues: vec![cue(0.0, 60.0, CueKind::Content)],
            shots: vec![shot(10.0, 15.0, 1)],
            labels: vec![label("Car", 12.3), label("Tree", 15.1)],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        let shots = shots_of(&assembly);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].events.len(), 1);
        assert!(matches!(shots[0].events[0].event, PointEvent::Label(l) if l.name == "Car"));
        assert_eq!(assembly.stats.events_dropped, 1);
    }

    #[test]
    fn boundary_event_is_claimed_once() {
        let recording = Recording {
            cues: vec![cue(0.0, 60.0, CueKind::Content)],
            shots: vec![shot(0.0, 5.0, 1), shot(5.0, 9.0, 2)],
            labels: vec![label("Door", 5.0)],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        let shots = shots_of(&assembly);
        assert_eq!(shots[0].events.len(), 1);
        assert!(shots[1].events.is_empty());
    }

    #[test]
    fn shot_is_claimed_by_first_containing_cue() {
        let recording = Recording {
            cues: vec![cue(0.0, 10.0, CueKind::Content), cue(0.0, 20.0, CueKind::Content)],
            shots: vec![shot(2.0, 8.0, 1), shot(25.0, 30.0, 2)],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        assert_eq!(assembly.cues[0].children.len(), 1);
        assert!(assembly.cues[1].children.is_empty());
        assert_eq!(assembly.stats.shots_dropped, 1);
    }

    #[test]
    fn opening_credits_cover_time_zero() {
        let recording = Recording {
            cues: vec![cue(1.5, 10.0, CueKind::OpeningCredits)],
            shots: vec![shot(0.0, 1.2, 1)],
            utterances: vec![speech("Hallo", 0.4)],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        assert_eq!(assembly.cues[0].children.len(), 2);
        assert_eq!(assembly.stats.utterances_dropped, 0);
    }

    #[test]
    fn children_interleave_by_start_seconds() {
        let recording = Recording {
            cues: vec![cue(0.0, 100.0, CueKind::Content)],
            shots: vec![shot(0.0, 9.5, 1), shot(9.5, 40.0, 2)],
            utterances: vec![speech("eins", 3.0), speech("zwei", 10.0)],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        let starts: Vec<f64> = assembly.cues[0].children.iter().map(CueChild::start).collect();
        assert_eq!(starts, vec![0.0, 3.0, 9.5, 10.0]);
    }

    #[test]
    fn utterance_ids_are_unique_across_cues() {
        let recording = Recording {
            cues: vec![
                cue(0.0, 10.0, CueKind::OpeningCredits),
                cue(10.0, 50.0, CueKind::Content),
                cue(50.0, 60.0, CueKind::EndCredits),
            ],
            utterances: vec![
                speech("a", 1.0),
                speech("b", 12.0),
                speech("c", 20.0),
                speech("d", 55.0),
                speech("e", 70.0),
            ],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        let ids: Vec<String> = assembly
            .cues
            .iter()
            .flat_map(|c| &c.children)
            .filter_map(|child| match child {
                CueChild::Speech(s) => Some(s.utterance_id()),
                CueChild::Shot(_) => None,
            })
            .collect();
        assert_eq!(ids, ["utterance001", "utterance002", "utterance003", "utterance004"]);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        assert_eq!(assembly.stats.utterances_dropped, 1);
    }

    #[test]
    fn events_in_a_shot_sort_by_time_with_stable_ties() {
        let recording = Recording {
            cues: vec![cue(0.0, 60.0, CueKind::Content)],
            shots: vec![shot(0.0, 30.0, 1)],
            texts: vec![DetectedText {
                text: "EXIT".into(),
                timestamp: 4.0,
            }],
            labels: vec![label("Person", 4.0), label("Sky", 1.0)],
            celebrities: vec![DetectedCelebrity {
                name: "X".into(),
                timestamp: 4.0,
                urls: vec![],
            }],
            ..Default::default()
        };
        let registry = Registry::from_recording(&recording);
        let assembly = assemble(&recording, &registry).unwrap();
        let events = &shots_of(&assembly)[0].events;
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e.event {
                PointEvent::Text(_) => "text",
                PointEvent::Label(_) => "label",
                PointEvent::Celebrity(_) => "celebrity",
            })
            .collect();
        assert_eq!(kinds, ["label", "text", "label", "celebrity"]);
        assert_eq!(events[3].reference, Some("pers001"));
    }
}
