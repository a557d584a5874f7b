//! TEI emitter: serialises an assembled recording as a TEI P5 document.

mod error;
pub use error::TeiError;

mod document;
pub use document::{DEFAULT_PUBLICATION_NOTE, RenderOptions, default_schema_models, render_tei, write_tei};
