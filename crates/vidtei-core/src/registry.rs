//! Canonical reference registries for persons, places and organisations.
//!
//! Built once from every utterance and every celebrity detection, then only
//! read. Ids are assigned in registration order:
//!
//! - Celebrities first, in detection order, deduplicated by exact name.
//! - Free-text PERSON mentions continue the same `pers` counter.
//! - Places and organisations each count from 1.
//!
//! Free-text mentions register in first-seen order (utterance order, then
//! entity order within the utterance), so ids are reproducible run to run.
//! A celebrity and a free-text person with the same name stay separate.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{DetectedCelebrity, Recording, Utterance};
use crate::vocabulary::{RefCategory, entity_category};

/// A canonical record that mentions point to via `ref="#id"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub id: String,
    pub display_text: String,
    pub urls: Vec<String>,
}

/// Deduplicated entries of one category, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ReferenceEntry>,
    by_text: HashMap<String, usize>,
}

impl Catalog {
    /// Register `text` unless present. Returns `true` if it was new.
    fn register(&mut self, text: &str, id: String, urls: &[String]) -> bool {
        if self.by_text.contains_key(text) {
            return false;
        }
        self.by_text.insert(text.to_string(), self.entries.len());
        self.entries.push(ReferenceEntry {
            id,
            display_text: text.to_string(),
            urls: urls.to_vec(),
        });
        true
    }

    pub fn get(&self, text: &str) -> Option<&ReferenceEntry> {
        self.by_text.get(text).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sizes of each catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySummary {
    pub celebrities: usize,
    pub persons: usize,
    pub places: usize,
    pub organizations: usize,
}

/// Reference registry for one recording.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    celebrities: Catalog,
    persons: Catalog,
    places: Catalog,
    organizations: Catalog,
}

fn format_id(prefix: &str, n: usize) -> String {
    format!("{prefix}{n:03}")
}

impl Registry {
    /// Scan all streams and assign ids.
    pub fn build(utterances: &[Utterance], celebrities: &[DetectedCelebrity]) -> Self {
        let mut registry = Self::default();

        // Shared by both person pools.
        let mut next_person = 1;
        for celeb in celebrities {
            let id = format_id(RefCategory::Celebrity.id_prefix(), next_person);
            if registry.celebrities.register(&celeb.name, id, &celeb.urls) {
                next_person += 1;
            }
        }

        let mut next_place = 1;
        let mut next_org = 1;
        for entity in utterances.iter().flat_map(|u| u.retained_entities()) {
            let Some(category) = entity_category(&entity.entity_type) else {
                continue;
            };
            let (catalog, counter) = match category {
                RefCategory::Person | RefCategory::Celebrity => {
                    (&mut registry.persons, &mut next_person)
                }
                RefCategory::Place => (&mut registry.places, &mut next_place),
                RefCategory::Organization => (&mut registry.organizations, &mut next_org),
            };
            if catalog.register(&entity.text, format_id(category.id_prefix(), *counter), &[]) {
                *counter += 1;
            }
        }

        debug!(summary = ?registry.summary(), "reference registry built");
        registry
    }

    pub fn from_recording(recording: &Recording) -> Self {
        Self::build(&recording.utterances, &recording.celebrities)
    }

    pub fn catalog(&self, category: RefCategory) -> &Catalog {
        match category {
            RefCategory::Celebrity => &self.celebrities,
            RefCategory::Person => &self.persons,
            RefCategory::Place => &self.places,
            RefCategory::Organization => &self.organizations,
        }
    }

    /// Id registered for `text` in `category`, if any.
    pub fn resolve(&self, text: &str, category: RefCategory) -> Option<&str> {
        self.catalog(category).get(text).map(|e| e.id.as_str())
    }

    /// Like [`resolve`](Self::resolve), but a miss is an error.
    pub fn require(&self, text: &str, category: RefCategory) -> Result<&str, CoreError> {
        self.resolve(text, category)
            .ok_or_else(|| CoreError::UnresolvedReference {
                category,
                text: text.to_string(),
            })
    }

    pub fn celebrities(&self) -> &[ReferenceEntry] {
        self.celebrities.entries()
    }

    pub fn persons(&self) -> &[ReferenceEntry] {
        self.persons.entries()
    }

    pub fn places(&self) -> &[ReferenceEntry] {
        self.places.entries()
    }

    pub fn organizations(&self) -> &[ReferenceEntry] {
        self.organizations.entries()
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            celebrities: self.celebrities.len(),
            persons: self.persons.len(),
            places: self.places.len(),
            organizations: self.organizations.len(),
        }
    }
}

/// Distinct sentiment labels in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentVocabulary {
    labels: Vec<String>,
}

impl SentimentVocabulary {
    pub fn collect(utterances: &[Utterance]) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for u in utterances {
            if !u.sentiment.is_empty() && !labels.contains(&u.sentiment) {
                labels.push(u.sentiment.clone());
            }
        }
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[cfg(test)]
    fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
