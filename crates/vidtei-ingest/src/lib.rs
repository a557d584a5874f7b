//! Ingest layer: decoders for the analysis services' JSON responses,
//! transcript segmentation, and the bundle files passed between steps.

mod error;
mod lenient;

pub mod annotation;
pub mod bundle;
pub mod comprehend;
pub mod rekognition;
pub mod transcript;

pub use annotation::parse_annotation;
pub use bundle::{BundleBuilder, guess_mime_type, load_recording, save_recording};
pub use comprehend::parse_analysed;
pub use error::IngestError;
pub use transcript::{SegmentOptions, UtteranceDraft, parse_transcript, segment};
