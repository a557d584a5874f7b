//! Render pipeline: load a recording, fill in metadata, write TEI.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use vidtei_core::model::Recording;
use vidtei_ingest::bundle::read_file;
use vidtei_ingest::rekognition::{parse_celebrities, parse_labels, parse_segments, parse_text};
use vidtei_ingest::{BundleBuilder, SegmentOptions, guess_mime_type, load_recording, parse_analysed, parse_annotation};
use vidtei_tei::{RenderOptions, write_tei};

use crate::InputFormat;

#[derive(Debug)]
pub struct RenderStats {
    pub utterances: usize,
    pub shots: usize,
    pub events: usize,
    pub cues: usize,
    pub dropped: usize,
    pub elapsed_secs: f64,
}

/// Command-line values that complete or replace the recording metadata.
#[derive(Debug, Default)]
pub struct MetadataOverrides {
    pub mime_type: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

pub struct BundleInputs {
    pub utterances: PathBuf,
    pub segments: PathBuf,
    pub labels: PathBuf,
    pub text: PathBuf,
    pub celebrities: PathBuf,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub source_language: String,
    pub target_language: String,
}

pub fn load_input(path: &Path, format: InputFormat) -> anyhow::Result<Recording> {
    let recording = match format {
        InputFormat::Recording => load_recording(path).context("reading recording bundle")?,
        InputFormat::Annotation => {
            let json = read_file(path).context("reading annotation file")?;
            parse_annotation(&json).with_context(|| format!("parsing {}", path.display()))?
        }
    };
    Ok(recording)
}

/// MIME type: the recording's own, else the override, else a guess from
/// the file name. Languages are replaced when given.
pub fn apply_overrides(recording: &mut Recording, overrides: &MetadataOverrides) {
    let meta = &mut recording.metadata;
    if meta.mime_type.is_none() {
        meta.mime_type = overrides
            .mime_type
            .clone()
            .or_else(|| guess_mime_type(&meta.file_name).map(str::to_string));
    }
    if let Some(lang) = &overrides.source_language {
        meta.source_language = lang.clone();
    }
    if let Some(lang) = &overrides.target_language {
        meta.target_language = lang.clone();
    }
}

/// Write TEI for `recording` to `output`, or stdout when `None`. The file
/// is only written once the whole document has rendered.
pub fn run_render(
    recording: &Recording,
    options: &RenderOptions,
    output: Option<&Path>,
) -> anyhow::Result<RenderStats> {
    let start = Instant::now();

    let mut doc = Vec::new();
    let stats = write_tei(recording, options, &mut doc).context("writing TEI document")?;

    match output {
        Some(path) => {
            std::fs::write(path, &doc).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("  Wrote {}", path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&doc)?;
            writeln!(out)?;
            out.flush()?;
        }
    }

    Ok(RenderStats {
        utterances: stats.utterances_placed,
        shots: stats.shots_placed,
        events: stats.events_placed,
        cues: recording.cues.len(),
        dropped: stats.shots_dropped + stats.events_dropped + stats.utterances_dropped,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// Segment a transcript into utterance drafts and write them as a JSON
/// array. Returns the number of drafts.
pub fn run_segment(transcript: &Path, pause: f64, output: Option<&Path>) -> anyhow::Result<usize> {
    let json = read_file(transcript).context("reading transcript")?;
    let items = vidtei_ingest::parse_transcript(&json).with_context(|| format!("parsing {}", transcript.display()))?;
    let drafts = vidtei_ingest::segment(&items, &SegmentOptions { pause }).context("segmenting transcript")?;
    write_json(&drafts, output)?;
    Ok(drafts.len())
}

/// Combine the five service responses into one recording.
pub fn run_bundle(inputs: &BundleInputs) -> anyhow::Result<Recording> {
    let load = |path: &Path, what: &str| -> anyhow::Result<String> {
        read_file(path).with_context(|| format!("reading {what}"))
    };

    let utterances = parse_analysed(&load(&inputs.utterances, "utterances")?).context("parsing utterances")?;
    let segments = parse_segments(&load(&inputs.segments, "segments")?).context("parsing segments")?;
    let labels = parse_labels(&load(&inputs.labels, "labels")?).context("parsing labels")?;
    let texts = parse_text(&load(&inputs.text, "text detections")?).context("parsing text detections")?;
    let celebrities =
        parse_celebrities(&load(&inputs.celebrities, "celebrities")?).context("parsing celebrity recognition")?;

    let mut builder = BundleBuilder::new(&inputs.file_name, &inputs.source_language, &inputs.target_language);
    if let Some(mime) = &inputs.mime_type {
        builder = builder.mime_type(mime);
    }
    Ok(builder
        .utterances(utterances)
        .segments(segments)
        .labels(labels)
        .texts(texts)
        .celebrities(celebrities)
        .build())
}

/// Pretty JSON to `output`, or stdout when `None`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialising JSON")?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("  Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
