//! TEI element vocabulary used for inline utterance markup and references.
//!
//! The wrapper set is fixed: five entity wrappers (three of them carrying a
//! `ref` to a standoff registry entry) and one `w` wrapper whose `pos`
//! attribute holds an STTS tag mapped from the universal tag set.

use std::fmt;

use quick_xml::escape::escape;

use crate::model::{EntityType, PartOfSpeech};

pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

/// Registry a referenced mention points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefCategory {
    /// Recognised faces; shares the `pers` id sequence with [`Person`](Self::Person).
    Celebrity,
    /// Free-text PERSON mentions.
    Person,
    Place,
    Organization,
}

impl RefCategory {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Celebrity | Self::Person => "pers",
            Self::Place => "place",
            Self::Organization => "org",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celebrity => "celebrity",
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for RefCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry category for entity types that are rendered with a `ref`.
pub fn entity_category(entity_type: &EntityType) -> Option<RefCategory> {
    match entity_type {
        EntityType::Person => Some(RefCategory::Person),
        EntityType::Location => Some(RefCategory::Place),
        EntityType::Organization => Some(RefCategory::Organization),
        _ => None,
    }
}

/// Map a universal part-of-speech tag to its STTS `pos` value.
pub fn stts_tag(pos: &PartOfSpeech) -> &'static str {
    match pos {
        PartOfSpeech::Noun => "NN",
        PartOfSpeech::Det => "ART",
        PartOfSpeech::Num => "CARD",
        PartOfSpeech::Adj => "ADJA",
        PartOfSpeech::Adp => "APPR",
        PartOfSpeech::Adv => "ADV",
        PartOfSpeech::Aux => "VAINF",
        PartOfSpeech::Cconj => "KON",
        PartOfSpeech::Intj => "ITJ",
        PartOfSpeech::Pron => "PPER",
        PartOfSpeech::Propn => "NE",
        PartOfSpeech::Sconj => "KOUS",
        PartOfSpeech::Verb => "VVINF",
        PartOfSpeech::Part => "PTKZU",
        PartOfSpeech::Punct | PartOfSpeech::Sym | PartOfSpeech::Other(_) => "XY",
    }
}

/// An inline wrapper element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    PlaceName { reference: String },
    PersName { reference: String },
    OrgName { reference: String },
    Date,
    Num,
    Word { pos: &'static str },
}

impl Tag {
    /// Wrapper pointing at registry entry `id`.
    pub fn referenced(category: RefCategory, id: &str) -> Self {
        let reference = id.to_string();
        match category {
            RefCategory::Celebrity | RefCategory::Person => Self::PersName { reference },
            RefCategory::Place => Self::PlaceName { reference },
            RefCategory::Organization => Self::OrgName { reference },
        }
    }

    /// Wrapper for entity types that carry no reference, if any.
    pub fn unreferenced(entity_type: &EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Date => Some(Self::Date),
            EntityType::Quantity => Some(Self::Num),
            _ => None,
        }
    }

    pub fn word(pos: &PartOfSpeech) -> Self {
        Self::Word { pos: stts_tag(pos) }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaceName { .. } => "placeName",
            Self::PersName { .. } => "persName",
            Self::OrgName { .. } => "orgName",
            Self::Date => "date",
            Self::Num => "num",
            Self::Word { .. } => "w",
        }
    }

    /// Rendered opening tag, e.g. `<placeName ref="#place001">`.
    pub fn open_tag(&self) -> String {
        match self {
            Self::PlaceName { reference }
            | Self::PersName { reference }
            | Self::OrgName { reference } => {
                format!("<{} ref=\"#{}\">", self.name(), escape(reference.as_str()))
            }
            Self::Word { pos } => format!("<w pos=\"{pos}\">"),
            Self::Date | Self::Num => format!("<{}>", self.name()),
        }
    }

    pub fn close_tag(&self) -> String {
        format!("</{}>", self.name())
    }

    /// Characters the opening tag adds in front of the wrapped content.
    pub fn prefix_len(&self) -> usize {
        self.open_tag().chars().count()
    }

    /// Characters the closing tag adds after the wrapped content.
    pub fn suffix_len(&self) -> usize {
        self.close_tag().chars().count()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.open_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_tags_render_ref_attribute() {
        let tag = Tag::referenced(RefCategory::Place, "place001");
        assert_eq!(tag.open_tag(), r##"<placeName ref="#place001">"##);
        assert_eq!(tag.close_tag(), "</placeName>");

        let celeb = Tag::referenced(RefCategory::Celebrity, "pers001");
        assert_eq!(celeb.name(), "persName");
    }

    #[test]
    fn wrapper_widths_for_three_digit_ids() {
        let widths = |t: Tag| (t.prefix_len(), t.prefix_len() + t.suffix_len());
        assert_eq!(widths(Tag::referenced(RefCategory::Place, "place001")), (27, 39));
        assert_eq!(widths(Tag::referenced(RefCategory::Person, "pers001")), (25, 36));
        assert_eq!(widths(Tag::referenced(RefCategory::Organization, "org001")), (23, 33));
        assert_eq!(widths(Tag::Date), (6, 13));
        assert_eq!(widths(Tag::Num), (5, 11));
        assert_eq!(widths(Tag::word(&PartOfSpeech::Noun)), (12, 16));
        assert_eq!(widths(Tag::word(&PartOfSpeech::Verb)), (15, 19));
    }

    #[test]
    fn widths_follow_id_length() {
        let short = Tag::referenced(RefCategory::Place, "place001");
        let long = Tag::referenced(RefCategory::Place, "place1000");
        assert_eq!(long.prefix_len(), short.prefix_len() + 1);
        assert_eq!(long.suffix_len(), short.suffix_len());
    }

    #[test]
    fn unmapped_parts_of_speech_fall_back_to_xy() {
        assert_eq!(stts_tag(&PartOfSpeech::Punct), "XY");
        assert_eq!(stts_tag(&PartOfSpeech::Sym), "XY");
        assert_eq!(stts_tag(&PartOfSpeech::Other("O".into())), "XY");
        assert_eq!(stts_tag(&PartOfSpeech::Other("X".into())), "XY");
        assert_eq!(stts_tag(&PartOfSpeech::Part), "PTKZU");
    }

    #[test]
    fn only_three_entity_types_are_referenced() {
        assert_eq!(entity_category(&EntityType::Location), Some(RefCategory::Place));
        assert_eq!(entity_category(&EntityType::Date), None);
        assert_eq!(Tag::unreferenced(&EntityType::Quantity), Some(Tag::Num));
        assert_eq!(Tag::unreferenced(&EntityType::Other("EVENT".into())), None);
    }
}
