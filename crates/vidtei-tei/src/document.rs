//! TEI document writer.
//!
//! Layout of the emitted document:
//!
//! - `teiHeader`: title, publication statement, provenance and the
//!   recording description (media file, language, frame size).
//! - `standOff`: person, place and organisation registries plus the
//!   sentiment interpretation group that `u/@ana` points into.
//! - `text/body`: one `div` per technical cue holding shot and speech
//!   divisions in time order.
//!
//! Utterance markup is written as pre-escaped mixed content so the
//! indenting writer never injects whitespace inside a `u`.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use tracing::info;
use vidtei_core::hierarchy::{Assembly, AssemblyStats, CueChild, CueNode, EventNode, ShotNode, SpeechNode, assemble};
use vidtei_core::model::{CueKind, PointEvent, Recording, RecordingMetadata};
use vidtei_core::registry::{Registry, SentimentVocabulary};
use vidtei_core::timecode::{clock, decimal};
use vidtei_core::CoreError;
use vidtei_core::vocabulary::{RefCategory, TEI_NAMESPACE};

use crate::TeiError;

pub const DEFAULT_PUBLICATION_NOTE: &str = "Publication Information";

const TEI_ALL_RNG: &str = "http://www.tei-c.org/release/xml/tei/custom/schema/relaxng/tei_all.rng";
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";
const UTTERANCE_GROUP: &str = "determined-by-utterances";

/// `xml-model` processing instructions binding the document to tei_all.
pub fn default_schema_models() -> Vec<String> {
    vec![
        format!(
            r#"xml-model href="{TEI_ALL_RNG}" type="application/xml" schematypens="http://relaxng.org/ns/structure/1.0""#
        ),
        format!(
            r#"xml-model href="{TEI_ALL_RNG}" type="application/xml" schematypens="http://purl.oclc.org/dsdl/schematron""#
        ),
    ]
}

/// Knobs for the emitted document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Named in the provenance line of `sourceDesc`.
    pub generator: String,
    pub publication_note: String,
    /// `None` uses today's date (UTC).
    pub publication_date: Option<NaiveDate>,
    /// Full processing-instruction bodies, one PI each.
    pub schema_models: Vec<String>,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            generator: format!("vidtei {}", env!("CARGO_PKG_VERSION")),
            publication_note: DEFAULT_PUBLICATION_NOTE.to_string(),
            publication_date: None,
            schema_models: default_schema_models(),
            indent: 2,
        }
    }
}

/// Build the registry and hierarchy for `recording` and write the TEI
/// document to `out`.
pub fn write_tei<W: Write>(recording: &Recording, options: &RenderOptions, out: W) -> Result<AssemblyStats, TeiError> {
    let registry = Registry::from_recording(recording);
    let sentiments = SentimentVocabulary::collect(&recording.utterances);
    let assembly = assemble(recording, &registry)?;

    let mut doc = TeiWriter {
        xml: Writer::new_with_indent(out, b' ', options.indent),
        metadata: &recording.metadata,
    };
    doc.prolog(options)?;
    doc.start("TEI", &[("xmlns", TEI_NAMESPACE)])?;
    doc.header(options)?;
    doc.standoff(&registry, &sentiments)?;
    doc.body(&assembly)?;
    doc.end("TEI")?;

    info!(
        file = %recording.metadata.file_name,
        cues = assembly.cues.len(),
        utterances = assembly.stats.utterances_placed,
        "TEI document written"
    );
    Ok(assembly.stats)
}

/// Like [`write_tei`], returning the document as a string.
pub fn render_tei(recording: &Recording, options: &RenderOptions) -> Result<String, TeiError> {
    let mut buf = Vec::new();
    write_tei(recording, options, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn cue_type(kind: &CueKind) -> &str {
    match kind {
        CueKind::OpeningCredits | CueKind::Content | CueKind::EndCredits => kind.as_str(),
        CueKind::Other(_) => "DetectedCue",
    }
}

struct TeiWriter<'a, W: Write> {
    xml: Writer<W>,
    metadata: &'a RecordingMetadata,
}

impl<W: Write> TeiWriter<'_, W> {
    // ── Primitives ──

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), TeiError> {
        let mut el = BytesStart::new(name);
        for &attr in attrs {
            el.push_attribute(attr);
        }
        self.xml.write_event(Event::Start(el))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), TeiError> {
        self.xml.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), TeiError> {
        let mut el = BytesStart::new(name);
        for &attr in attrs {
            el.push_attribute(attr);
        }
        self.xml.write_event(Event::Empty(el))?;
        Ok(())
    }

    /// `<name attrs>text</name>` with `text` escaped.
    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), TeiError> {
        self.start(name, attrs)?;
        self.xml.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    // ── Sections ──

    fn prolog(&mut self, options: &RenderOptions) -> Result<(), TeiError> {
        self.xml
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        for model in &options.schema_models {
            self.xml.write_event(Event::PI(BytesPI::new(model.as_str())))?;
        }
        Ok(())
    }

    fn header(&mut self, options: &RenderOptions) -> Result<(), TeiError> {
        let meta = self.metadata;
        let date = options
            .publication_date
            .unwrap_or_else(|| Utc::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();

        self.start("teiHeader", &[])?;
        self.start("fileDesc", &[])?;

        self.start("titleStmt", &[])?;
        self.text_element("title", &[], &meta.file_name)?;
        self.end("titleStmt")?;

        self.start("publicationStmt", &[])?;
        self.text_element("p", &[], &options.publication_note)?;
        self.text_element("date", &[("when", date.as_str())], &date)?;
        self.end("publicationStmt")?;

        self.start("sourceDesc", &[])?;
        self.text_element(
            "p",
            &[],
            &format!("Automatically generated from {} by {}", meta.file_name, options.generator),
        )?;
        self.end("sourceDesc")?;

        let mime_type = meta.mime_type.as_deref().unwrap_or(FALLBACK_MIME_TYPE);
        self.start("sourceDesc", &[])?;
        self.start("recordingStmt", &[])?;
        self.start("recording", &[("type", "video")])?;
        self.start(
            "media",
            &[
                ("url", meta.file_name.as_str()),
                ("mimeType", mime_type),
                ("xml:lang", meta.source_language.as_str()),
            ],
        )?;
        self.start("desc", &[])?;
        self.start("dimensions", &[])?;
        self.text_element("width", &[], &meta.frame_width.to_string())?;
        self.text_element("height", &[], &meta.frame_height.to_string())?;
        self.end("dimensions")?;
        self.end("desc")?;
        self.end("media")?;
        self.end("recording")?;
        self.end("recordingStmt")?;
        self.end("sourceDesc")?;

        self.end("fileDesc")?;
        self.end("teiHeader")
    }

    fn standoff(&mut self, registry: &Registry, sentiments: &SentimentVocabulary) -> Result<(), TeiError> {
        self.start("standOff", &[])?;

        self.start("listPerson", &[])?;
        for celeb in registry.celebrities() {
            self.start("person", &[("xml:id", celeb.id.as_str())])?;
            self.text_element("persName", &[], &celeb.display_text)?;
            for url in &celeb.urls {
                self.text_element("idno", &[], url)?;
            }
            self.end("person")?;
        }
        self.start("personGrp", &[("role", UTTERANCE_GROUP)])?;
        for person in registry.persons() {
            self.text_element("persName", &[("xml:id", person.id.as_str())], &person.display_text)?;
        }
        self.end("personGrp")?;
        self.end("listPerson")?;

        self.start("listPlace", &[("type", UTTERANCE_GROUP)])?;
        for place in registry.places() {
            self.start("place", &[])?;
            self.text_element("placeName", &[("xml:id", place.id.as_str())], &place.display_text)?;
            self.end("place")?;
        }
        self.end("listPlace")?;

        self.start("listOrg", &[("type", UTTERANCE_GROUP)])?;
        for org in registry.organizations() {
            self.start("org", &[])?;
            self.text_element("orgName", &[("xml:id", org.id.as_str())], &org.display_text)?;
            self.end("org")?;
        }
        self.end("listOrg")?;

        self.start("interpGrp", &[("xml:id", "sentiment")])?;
        for label in sentiments.labels() {
            self.empty("interp", &[("xml:id", label.as_str())])?;
        }
        self.end("interpGrp")?;

        self.end("standOff")
    }

    fn body(&mut self, assembly: &Assembly<'_>) -> Result<(), TeiError> {
        self.start("text", &[])?;
        self.start("body", &[])?;
        for cue in &assembly.cues {
            self.cue(cue)?;
        }
        self.end("body")?;
        self.end("text")
    }

    fn cue(&mut self, node: &CueNode<'_>) -> Result<(), TeiError> {
        let cue = node.cue;
        self.start(
            "div",
            &[
                ("type", cue_type(&cue.kind)),
                ("from", clock(cue.start).as_str()),
                ("to", clock(cue.end).as_str()),
                ("dur", clock(cue.duration).as_str()),
            ],
        )?;
        for child in &node.children {
            match child {
                CueChild::Shot(shot) => self.shot(shot)?,
                CueChild::Speech(speech) => self.speech(speech)?,
            }
        }
        self.end("div")
    }

    fn shot(&mut self, node: &ShotNode<'_>) -> Result<(), TeiError> {
        let shot = node.shot;
        self.start(
            "div",
            &[
                ("type", "DetectedShot"),
                ("from", clock(shot.start).as_str()),
                ("to", clock(shot.end).as_str()),
                ("dur", decimal(shot.duration).as_str()),
            ],
        )?;
        for event in &node.events {
            self.event(event)?;
        }
        self.end("div")
    }

    fn event(&mut self, node: &EventNode<'_>) -> Result<(), TeiError> {
        let when = clock(node.event.timestamp());
        match node.event {
            PointEvent::Text(text) => {
                self.start("div", &[("type", "DetectedText"), ("when", when.as_str())])?;
                self.text_element("caption", &[], &text.text)?;
            }
            PointEvent::Label(label) => {
                self.start("div", &[("type", "DetectedLabel"), ("when", when.as_str())])?;
                self.text_element("ab", &[], &label.name)?;
            }
            PointEvent::Celebrity(celeb) => {
                let id = node.reference.ok_or_else(|| CoreError::UnresolvedReference {
                    category: RefCategory::Celebrity,
                    text: celeb.name.clone(),
                })?;
                let reference = format!("#{id}");
                self.start("div", &[("type", "DetectedPerson"), ("when", when.as_str())])?;
                self.start("p", &[])?;
                self.text_element("persName", &[("ref", reference.as_str())], &celeb.name)?;
                self.end("p")?;
            }
        }
        self.end("div")
    }

    fn speech(&mut self, node: &SpeechNode<'_>) -> Result<(), TeiError> {
        let meta = self.metadata;
        let utterance = node.utterance;
        let utterance_id = node.utterance_id();
        let translation_id = node.translation_id();
        let corresp = format!("#{translation_id}");
        let ana = format!("#{}", utterance.sentiment);

        self.start(
            "div",
            &[
                ("type", "DetectedSpeech"),
                ("from", clock(utterance.start).as_str()),
                ("to", clock(utterance.end).as_str()),
                ("dur", decimal(utterance.duration).as_str()),
            ],
        )?;

        let mut attrs = vec![("xml:id", utterance_id.as_str())];
        if !utterance.sentiment.is_empty() {
            attrs.push(("ana", ana.as_str()));
        }
        attrs.push(("corresp", corresp.as_str()));
        self.start("u", &attrs)?;
        let content = node.markup.render();
        self.xml
            .write_event(Event::Text(BytesText::from_escaped(content.as_str())))?;
        self.end("u")?;

        self.text_element(
            "ab",
            &[
                ("xml:id", translation_id.as_str()),
                ("xml:lang", meta.target_language.as_str()),
                ("type", "translation"),
            ],
            &utterance.translation,
        )?;
        self.end("div")
    }
}
