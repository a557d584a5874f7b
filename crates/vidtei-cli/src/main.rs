use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use vidtei_ingest::transcript::PAUSE_THRESHOLD;
use vidtei_tei::{DEFAULT_PUBLICATION_NOTE, RenderOptions};

mod display;
mod pipeline;

use pipeline::{BundleInputs, MetadataOverrides};

#[derive(Parser, Debug)]
#[command(name = "vidtei")]
#[command(about = "Merge video and speech annotation streams into one TEI document")]
#[command(version)]
struct Cli {
    /// Log at debug level (dropped items, per-utterance markup)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Native recording bundle
    Recording,
    /// Legacy annotation.json
    Annotation,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build registries, rewrite utterances, assemble the hierarchy and write TEI
    Render {
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = InputFormat::Recording)]
        format: InputFormat,

        /// MIME type of the media file, used when the input carries none
        #[arg(long)]
        mime_type: Option<String>,

        /// ISO 639-1 code of the spoken language
        #[arg(long, env = "VIDTEI_SOURCE_LANG")]
        source_lang: Option<String>,

        /// ISO 639-1 code of the translation
        #[arg(long, env = "VIDTEI_TARGET_LANG")]
        target_lang: Option<String>,

        /// Omit the xml-model processing instructions
        #[arg(long)]
        no_schema_models: bool,

        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,

        #[arg(long, default_value = DEFAULT_PUBLICATION_NOTE)]
        publication_note: String,
    },

    /// Split a speech transcript into utterance drafts
    Segment {
        transcript: PathBuf,

        /// Silence in seconds that ends an utterance
        #[arg(long, default_value_t = PAUSE_THRESHOLD)]
        pause: f64,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine analysis service responses into a recording bundle
    Bundle {
        /// Analysed utterances (JSON array)
        #[arg(long)]
        utterances: PathBuf,

        /// Segment detection response
        #[arg(long)]
        segments: PathBuf,

        /// Label detection response
        #[arg(long)]
        labels: PathBuf,

        /// Text detection response
        #[arg(long)]
        text: PathBuf,

        /// Celebrity recognition response
        #[arg(long)]
        celebrities: PathBuf,

        /// Name of the media file the responses describe
        #[arg(long)]
        file_name: String,

        #[arg(long)]
        mime_type: Option<String>,

        #[arg(long, env = "VIDTEI_SOURCE_LANG", default_value = "de")]
        source_lang: String,

        #[arg(long, env = "VIDTEI_TARGET_LANG", default_value = "en")]
        target_lang: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a recording
    Inspect {
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = InputFormat::Recording)]
        format: InputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
    tracing::debug!("vidtei v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Render {
            input,
            output,
            format,
            mime_type,
            source_lang,
            target_lang,
            no_schema_models,
            indent,
            publication_note,
        } => {
            let mut recording = pipeline::load_input(&input, format)?;
            pipeline::apply_overrides(
                &mut recording,
                &MetadataOverrides {
                    mime_type,
                    source_language: source_lang,
                    target_language: target_lang,
                },
            );
            let options = RenderOptions {
                publication_note,
                indent,
                schema_models: if no_schema_models {
                    Vec::new()
                } else {
                    vidtei_tei::default_schema_models()
                },
                ..Default::default()
            };
            let stats = pipeline::run_render(&recording, &options, output.as_deref())?;
            eprintln!(
                "  Rendered {} utterances, {} shots, {} events in {} cues ({:.2}s)",
                stats.utterances, stats.shots, stats.events, stats.cues, stats.elapsed_secs
            );
            if stats.dropped > 0 {
                eprintln!("  {} items fell outside every parent and were dropped", stats.dropped);
            }
        }
        Command::Segment {
            transcript,
            pause,
            output,
        } => {
            let count = pipeline::run_segment(&transcript, pause, output.as_deref())?;
            eprintln!("  Segmented {count} utterances");
        }
        Command::Bundle {
            utterances,
            segments,
            labels,
            text,
            celebrities,
            file_name,
            mime_type,
            source_lang,
            target_lang,
            output,
        } => {
            let recording = pipeline::run_bundle(&BundleInputs {
                utterances,
                segments,
                labels,
                text,
                celebrities,
                file_name,
                mime_type,
                source_language: source_lang,
                target_language: target_lang,
            })?;
            pipeline::write_json(&recording, output.as_deref())?;
        }
        Command::Inspect { input, format } => {
            let recording = pipeline::load_input(&input, format)?;
            display::print_recording_card(&recording)?;
        }
    }

    Ok(())
}
