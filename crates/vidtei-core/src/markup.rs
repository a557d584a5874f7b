//! Inline markup for one utterance.
//!
//! The text is held as a flat list of segments (literal text, opening tag,
//! closing tag). Span offsets address the *rendered* character stream,
//! i.e. raw text plus every tag inserted so far, which is the coordinate
//! space the analysis services' offsets shift into as wrappers are added.
//! Literal text stays unescaped inside the segments and is escaped only
//! when rendered, so `&` or `<` in speech never disturbs the arithmetic.

use std::fmt;
use std::iter;

use quick_xml::Reader;
use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::error::{CoreError, MarkupError};
use crate::model::Utterance;
use crate::registry::Registry;
use crate::vocabulary::{Tag, entity_category};

/// A wrapper to insert at a half-open character range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
    /// Text the producer says the range covers.
    pub text: String,
    pub tag: Tag,
}

impl Span {
    pub fn new(begin: usize, end: usize, text: impl Into<String>, tag: Tag) -> Self {
        Self {
            begin,
            end,
            text: text.into(),
            tag,
        }
    }

    /// This span's position after `applied` has been inserted.
    pub fn shifted_past(&self, applied: &Span) -> Span {
        let delta = if self.begin >= applied.end {
            applied.tag.prefix_len() + applied.tag.suffix_len()
        } else if self.begin >= applied.begin {
            applied.tag.prefix_len()
        } else {
            0
        };
        Span {
            begin: self.begin + delta,
            end: self.end + delta,
            ..self.clone()
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> {:?} [{}, {})",
            self.tag.name(),
            self.text,
            self.begin,
            self.end
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Never empty.
    Text(String),
    Open(Tag),
    Close(Tag),
}

impl Segment {
    fn width(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Open(tag) => tag.prefix_len(),
            Self::Close(tag) => tag.suffix_len(),
        }
    }
}

/// Byte index of the `offset`-th character, or `text.len()` one past the end.
fn byte_index(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(text.len()))
        .nth(offset)
}

/// Segmented utterance text with inline wrappers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    segments: Vec<Segment>,
}

impl Markup {
    pub fn plain(text: &str) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Text(text.to_string())]
        };
        Self { segments }
    }

    /// Length of the rendered stream in characters, before escaping.
    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    /// XML mixed content: escaped text interleaved with the wrapper tags.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => out.push_str(&partial_escape(s.as_str())),
                Segment::Open(tag) => out.push_str(&tag.open_tag()),
                Segment::Close(tag) => out.push_str(&tag.close_tag()),
            }
        }
        out
    }

    /// The text with every wrapper removed.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every element with its unescaped text content, in closing order.
    #[cfg(test)]
    fn elements(&self) -> Vec<(Tag, String)> {
        let mut open: Vec<(Tag, String)> = Vec::new();
        let mut closed = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => open.iter_mut().for_each(|(_, content)| content.push_str(s)),
                Segment::Open(tag) => open.push((tag.clone(), String::new())),
                Segment::Close(_) => closed.extend(open.pop()),
            }
        }
        closed
    }

    /// Parse the rendered form inside a container element.
    pub fn validate(&self) -> Result<(), MarkupError> {
        let wrapped = format!("<fragment>{}</fragment>", self.render());
        let mut reader = Reader::from_str(&wrapped);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => return Ok(()),
                Ok(_) => {}
                Err(e) => return Err(MarkupError::Malformed(e.to_string())),
            }
        }
    }

    /// Segment index at which a boundary at `offset` sits, splitting a text
    /// segment when the offset falls inside one.
    fn split_at(&mut self, offset: usize, span: &Span) -> Result<usize, MarkupError> {
        let mut pos = 0;
        for i in 0..self.segments.len() {
            if offset == pos {
                return Ok(i);
            }
            let width = self.segments[i].width();
            if offset < pos + width {
                let tail = match &mut self.segments[i] {
                    Segment::Text(s) => {
                        let at = byte_index(s, offset - pos).unwrap_or(s.len());
                        s.split_off(at)
                    }
                    Segment::Open(tag) | Segment::Close(tag) => {
                        return Err(MarkupError::SplitsTag {
                            span: span.clone(),
                            offset,
                            tag: tag.name(),
                        });
                    }
                };
                self.segments.insert(i + 1, Segment::Text(tail));
                return Ok(i + 1);
            }
            pos += width;
        }
        if offset == pos {
            Ok(self.segments.len())
        } else {
            Err(MarkupError::OutOfBounds {
                span: span.clone(),
                len: pos,
            })
        }
    }

    /// Insert `span` and shift the spans still waiting to be applied.
    pub fn apply(&self, span: &Span, pending: &[Span]) -> Result<(Markup, Vec<Span>), MarkupError> {
        let width = self.width();
        if span.begin > span.end || span.end > width {
            return Err(MarkupError::OutOfBounds {
                span: span.clone(),
                len: width,
            });
        }

        let mut next = self.clone();
        let open_at = next.split_at(span.begin, span)?;
        let close_at = next.split_at(span.end, span)?;

        let mut stack: Vec<&Tag> = Vec::new();
        for segment in &next.segments[open_at..close_at] {
            match segment {
                Segment::Open(tag) => stack.push(tag),
                Segment::Close(tag) => {
                    if stack.pop().is_none() {
                        return Err(MarkupError::Crossing {
                            span: span.clone(),
                            tag: tag.name(),
                        });
                    }
                }
                Segment::Text(_) => {}
            }
        }
        if let Some(tag) = stack.last() {
            return Err(MarkupError::Crossing {
                span: span.clone(),
                tag: tag.name(),
            });
        }

        next.segments.insert(close_at, Segment::Close(span.tag.clone()));
        next.segments.insert(open_at, Segment::Open(span.tag.clone()));

        let shifted = pending.iter().map(|p| p.shifted_past(span)).collect();
        Ok((next, shifted))
    }
}

/// Apply `spans` to `text` in order and check the result is well-formed.
pub fn rewrite(text: &str, spans: Vec<Span>) -> Result<Markup, MarkupError> {
    let mut markup = Markup::plain(text);
    let mut pending = spans;
    while let Some((span, rest)) = pending.split_first() {
        let (next, shifted) = markup.apply(span, rest)?;
        markup = next;
        pending = shifted;
    }
    markup.validate()?;
    Ok(markup)
}

fn declared_text_check(utterance: &Utterance, begin: usize, end: usize, declared: &str) {
    let slice = byte_index(&utterance.text, begin)
        .zip(byte_index(&utterance.text, end))
        .filter(|(b, e)| b <= e)
        .map(|(b, e)| &utterance.text[b..e]);
    if let Some(actual) = slice
        && actual != declared
    {
        warn!(
            declared,
            actual,
            begin,
            end,
            "span text differs from the utterance slice it covers"
        );
    }
}

/// Spans for an utterance: retained entities with a wrapper, then every
/// syntax token. Offsets are in the raw text's coordinates.
pub fn utterance_spans(utterance: &Utterance, registry: &Registry) -> Result<Vec<Span>, CoreError> {
    let mut spans = Vec::new();

    for entity in utterance.retained_entities() {
        let tag = match entity_category(&entity.entity_type) {
            Some(category) => Tag::referenced(category, registry.require(&entity.text, category)?),
            None => match Tag::unreferenced(&entity.entity_type) {
                Some(tag) => tag,
                None => continue,
            },
        };
        declared_text_check(utterance, entity.begin_offset, entity.end_offset, &entity.text);
        spans.push(Span::new(entity.begin_offset, entity.end_offset, entity.text.clone(), tag));
    }

    for token in &utterance.syntax_tokens {
        declared_text_check(utterance, token.begin_offset, token.end_offset, &token.text);
        spans.push(Span::new(
            token.begin_offset,
            token.end_offset,
            token.text.clone(),
            Tag::word(&token.part_of_speech),
        ));
    }

    Ok(spans)
}

/// Build the inline markup for one utterance. `id` names it in errors.
pub fn annotate(utterance: &Utterance, id: &str, registry: &Registry) -> Result<Markup, CoreError> {
    let spans = utterance_spans(utterance, registry)?;
    let count = spans.len();
    let markup = rewrite(&utterance.text, spans).map_err(|source| CoreError::Markup {
        utterance: id.to_string(),
        source,
    })?;
    debug!(utterance = id, spans = count, "utterance annotated");
    Ok(markup)
}
