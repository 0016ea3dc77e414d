//! Text extraction from PDF and DOCX bytes

use crate::error::{AnalyzerError, Result};
use crate::config::MAX_INFLATED_BYTES;
use crate::input::file_detector::DocumentFormat;
use crate::input::source::SourceDocument;
use crate::processing::document::{ExtractionArtifacts, NormalizedText, SectionDetector};
use crate::processing::text_processor::TextProcessor;
use log::{debug, warn};
use regex::Regex;
use std::io::{Cursor, Read};

const DOCX_BODY_PART: &str = "word/document.xml";
const MIN_TABLE_ROWS: usize = 3;
const MIN_COLUMN_GAPS: usize = 2;

/// Turns a validated upload into normalized, segmented text
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText>;
}

pub struct PdfExtractor {
    processor: TextProcessor,
    detector: SectionDetector,
    image_object: regex::bytes::Regex,
    column_gap: Regex,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            processor: TextProcessor::new(),
            detector: SectionDetector::new(),
            image_object: regex::bytes::Regex::new(r"/Subtype\s*/Image\b").expect("Invalid image regex"),
            column_gap: Regex::new(r" {3,}|\t+").expect("Invalid column gap regex"),
        }
    }

    /// Runs of consecutive lines laid out in three or more columns
    fn count_tables(&self, raw: &str) -> usize {
        let mut tables = 0;
        let mut run = 0;

        for line in raw.lines() {
            let gaps = self.column_gap.find_iter(line.trim()).count();

            if gaps >= MIN_COLUMN_GAPS {
                run += 1;
                if run == MIN_TABLE_ROWS {
                    tables += 1;
                }
            } else {
                run = 0;
            }
        }

        tables
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText> {
        let bytes = source.bytes();
        if !DocumentFormat::Pdf.matches_magic(bytes) {
            return Err(AnalyzerError::CorruptDocument(
                "file is declared as PDF but has no %PDF- header".to_string(),
            ));
        }

        // pdf-extract panics on some malformed streams instead of erroring.
        let raw = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| {
                AnalyzerError::CorruptDocument("PDF parser aborted on malformed content".to_string())
            })?
            .map_err(|e| AnalyzerError::CorruptDocument(format!("Failed to extract text from PDF: {}", e)))?;

        let artifacts = ExtractionArtifacts {
            tables: self.count_tables(&raw),
            images: self.image_object.find_iter(bytes).count(),
            ..ExtractionArtifacts::default()
        };
        debug!("PDF extracted {} chars, artifacts {:?}", raw.len(), artifacts);

        NormalizedText::from_raw(&raw, artifacts, &self.processor, &self.detector)
    }
}

pub struct DocxExtractor {
    processor: TextProcessor,
    detector: SectionDetector,
    max_inflated_bytes: u64,
    fallback: Regex,
    tag: Regex,
    entity: Regex,
    table: Regex,
    image: Regex,
    text_box: Regex,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct ParagraphState {
    lines: Vec<String>,
    buffer: String,
    bulleted: bool,
    in_properties: bool,
    in_text: bool,
}

impl ParagraphState {
    fn flush(&mut self) {
        let line = std::mem::take(&mut self.buffer);
        if self.bulleted && !line.trim().is_empty() {
            self.lines.push(format!("• {}", line));
        } else {
            self.lines.push(line);
        }
        self.bulleted = false;
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::with_max_inflated_bytes(MAX_INFLATED_BYTES)
    }

    /// Refuse bodies that decompress past `max_inflated_bytes`
    pub fn with_max_inflated_bytes(max_inflated_bytes: u64) -> Self {
        Self {
            processor: TextProcessor::new(),
            detector: SectionDetector::new(),
            max_inflated_bytes,
            fallback: Regex::new(r"(?s)<mc:Fallback\b.*?</mc:Fallback>").expect("Invalid fallback regex"),
            tag: Regex::new(r"<(/?)([A-Za-z0-9]+:[A-Za-z0-9]+)([^>]*?)(/?)>").expect("Invalid tag regex"),
            entity: Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("Invalid entity regex"),
            table: Regex::new(r"<w:tbl[\s>]").expect("Invalid table regex"),
            image: Regex::new(r"<pic:pic[\s>]|<v:imagedata[\s/>]").expect("Invalid image regex"),
            text_box: Regex::new(r"<w:txbxContent[\s>]").expect("Invalid text box regex"),
        }
    }

    fn read_body(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let part = archive.by_name(DOCX_BODY_PART).map_err(|_| {
            AnalyzerError::CorruptDocument(format!("DOCX has no {} part", DOCX_BODY_PART))
        })?;

        let limit = self.max_inflated_bytes;
        let too_large = || {
            AnalyzerError::CorruptDocument(format!(
                "{} inflates past the {} byte limit",
                DOCX_BODY_PART, limit
            ))
        };
        if part.size() > limit {
            return Err(too_large());
        }

        // The declared size can lie, so the read itself is bounded too.
        let mut xml = String::new();
        part.take(limit + 1)
            .read_to_string(&mut xml)
            .map_err(|e| AnalyzerError::CorruptDocument(format!("unreadable {}: {}", DOCX_BODY_PART, e)))?;
        if xml.len() as u64 > limit {
            return Err(too_large());
        }
        Ok(xml)
    }

    /// Paragraphs become lines, runs are concatenated in reading order
    fn paragraphs_to_text(&self, xml: &str) -> String {
        let mut state = ParagraphState::default();
        let mut text_start = 0;

        for caps in self.tag.captures_iter(xml) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
            let attributes = caps.get(3).map(|m| m.as_str()).unwrap_or("");

            match (name.as_str(), closing) {
                ("w:t", false) if !self_closing => {
                    state.in_text = true;
                    text_start = whole.end();
                }
                ("w:t", true) if state.in_text => {
                    state.buffer.push_str(&self.decode_entities(&xml[text_start..whole.start()]));
                    state.in_text = false;
                }
                ("w:p", false) => {
                    // A nested paragraph (text box) ends the enclosing line.
                    if !state.buffer.is_empty() {
                        state.flush();
                    }
                    if self_closing {
                        state.lines.push(String::new());
                    }
                    state.bulleted = false;
                }
                ("w:p", true) => state.flush(),
                ("w:pPr", false) if !self_closing => state.in_properties = true,
                ("w:pPr", true) => state.in_properties = false,
                ("w:numPr", false) if state.in_properties => state.bulleted = true,
                ("w:pStyle", false) if state.in_properties && attributes.contains("w:val=\"List") => {
                    state.bulleted = true;
                }
                ("w:tab", false) if !state.in_properties => state.buffer.push('\t'),
                ("w:br", false) | ("w:cr", false) => state.buffer.push('\n'),
                _ => {}
            }
        }
        if !state.buffer.is_empty() {
            state.flush();
        }

        state.lines.join("\n")
    }

    fn decode_entities(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &regex::Captures| {
                let entity = &caps[1];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ if entity.starts_with("#x") => {
                        u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                    }
                    _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
                };
                decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl DocumentExtractor for DocxExtractor {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText> {
        let bytes = source.bytes();
        if !DocumentFormat::Docx.matches_magic(bytes) {
            return Err(AnalyzerError::CorruptDocument(
                "file is declared as DOCX but is not a ZIP container".to_string(),
            ));
        }

        let xml = self.read_body(bytes)?;
        let xml = self.fallback.replace_all(&xml, "");

        let artifacts = ExtractionArtifacts {
            tables: self.table.find_iter(&xml).count(),
            images: self.image.find_iter(&xml).count(),
            text_boxes: self.text_box.find_iter(&xml).count(),
            unreadable_chars: 0,
        };

        let raw = self.paragraphs_to_text(&xml);
        debug!("DOCX extracted {} chars, artifacts {:?}", raw.len(), artifacts);

        NormalizedText::from_raw(&raw, artifacts, &self.processor, &self.detector)
    }
}

/// Dispatches on the declared document format
#[derive(Default)]
pub struct DefaultExtractor {
    pdf: PdfExtractor,
    docx: DocxExtractor,
}

impl DefaultExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_inflated_bytes(max_inflated_bytes: u64) -> Self {
        Self {
            pdf: PdfExtractor::new(),
            docx: DocxExtractor::with_max_inflated_bytes(max_inflated_bytes),
        }
    }
}

impl DocumentExtractor for DefaultExtractor {
    fn extract(&self, source: &SourceDocument) -> Result<NormalizedText> {
        let result = match source.format() {
            DocumentFormat::Pdf => self.pdf.extract(source),
            DocumentFormat::Docx => self.docx.extract(source),
        };

        if let Err(e) = &result {
            warn!(
                "Extraction of {} '{}' failed: {}",
                source.format(),
                source.name().unwrap_or("upload"),
                e
            );
        }
        result
    }
}
