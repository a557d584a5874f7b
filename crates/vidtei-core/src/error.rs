use thiserror::Error;

use crate::markup::Span;
use crate::vocabulary::RefCategory;

/// Failure to insert one span into an utterance's markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("span {span} lies outside the text ({len} characters)")]
    OutOfBounds { span: Span, len: usize },

    #[error("span {span} has a boundary at {offset} inside a <{tag}> tag")]
    SplitsTag {
        span: Span,
        offset: usize,
        tag: &'static str,
    },

    #[error("span {span} crosses the existing <{tag}> element")]
    Crossing { span: Span, tag: &'static str },

    #[error("marked-up text is not well-formed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no {category} reference registered for {text:?}")]
    UnresolvedReference { category: RefCategory, text: String },

    #[error("{utterance}")]
    Markup {
        utterance: String,
        #[source]
        source: MarkupError,
    },
}
