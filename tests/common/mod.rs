//! Shared fixtures for the integration tests
#![allow(dead_code)]

use ats_analyzer::input::text_extractor::{DefaultExtractor, DocumentExtractor};
use ats_analyzer::processing::analyzer::{PipelineState, ProgressObserver, ProgressStage};
use ats_analyzer::processing::document::NormalizedText;
use ats_analyzer::processing::taxonomy::SkillTaxonomy;
use ats_analyzer::{AnalysisEngine, Config, DocumentFormat, Result, SourceDocument};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zip::write::SimpleFileOptions;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// A minimal DOCX container with one paragraph per line
pub fn docx_bytes(lines: &[&str]) -> Vec<u8> {
    let paragraphs: String = lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape(line)
                )
            }
        })
        .collect();

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        paragraphs
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn docx_document(text: &str) -> SourceDocument {
    let lines: Vec<&str> = text.lines().collect();
    SourceDocument::new(docx_bytes(&lines), DocumentFormat::Docx).with_name("resume.docx")
}

pub fn sample_resume() -> SourceDocument {
    docx_document(&fixture("sample_resume.txt"))
}

pub fn sample_job() -> String {
    fixture("sample_job.txt")
}

pub fn engine_with(extractor: Arc<dyn DocumentExtractor>) -> AnalysisEngine {
    AnalysisEngine::with_components(
        Config::default(),
        Arc::new(SkillTaxonomy::builtin()),
        extractor,
    )
}

/// Delegates to the real extractor and counts invocations
#[derive(Default)]
pub struct CountingExtractor {
    calls: AtomicUsize,
    inner: DefaultExtractor,
}

impl CountingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentExtractor for CountingExtractor {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(source)
    }
}

/// Blocks the worker before extracting
pub struct SlowExtractor {
    delay: Duration,
    inner: DefaultExtractor,
}

impl SlowExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: DefaultExtractor::new(),
        }
    }
}

impl DocumentExtractor for SlowExtractor {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText> {
        std::thread::sleep(self.delay);
        self.inner.extract(source)
    }
}

#[derive(Default)]
pub struct Recorder {
    stages: Mutex<Vec<ProgressStage>>,
    transitions: Mutex<Vec<(PipelineState, PipelineState)>>,
}

impl Recorder {
    pub fn stages(&self) -> Vec<ProgressStage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn transitions(&self) -> Vec<(PipelineState, PipelineState)> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn visited(&self, state: PipelineState) -> bool {
        self.transitions().iter().any(|(_, to)| *to == state)
    }
}

impl ProgressObserver for Recorder {
    fn on_stage(&self, stage: ProgressStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_transition(&self, from: PipelineState, to: PipelineState) {
        self.transitions.lock().unwrap().push((from, to));
    }
}
