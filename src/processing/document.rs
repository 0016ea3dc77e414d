//! Normalized resume text and its section layout

use crate::error::{AnalyzerError, Result};
use crate::processing::text_processor::TextProcessor;
use aho_corasick::{AhoCorasick, Anchored, Input, MatchKind, StartKind};
use serde::{Deserialize, Serialize};

/// Characters that open a bullet line
pub const BULLET_MARKERS: &[char] = &[
    '•', '●', '▪', '◦', '■', '○', '►', '➢', '➤', '✓', '❖', '♦', '-', '*',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Awards,
    Other,
}

const SECTION_ANCHORS: &[(&str, SectionType)] = &[
    ("summary", SectionType::Summary),
    ("professional summary", SectionType::Summary),
    ("career summary", SectionType::Summary),
    ("profile", SectionType::Summary),
    ("professional profile", SectionType::Summary),
    ("objective", SectionType::Summary),
    ("career objective", SectionType::Summary),
    ("about me", SectionType::Summary),
    ("experience", SectionType::Experience),
    ("work experience", SectionType::Experience),
    ("professional experience", SectionType::Experience),
    ("relevant experience", SectionType::Experience),
    ("employment", SectionType::Experience),
    ("employment history", SectionType::Experience),
    ("work history", SectionType::Experience),
    ("career history", SectionType::Experience),
    ("education", SectionType::Education),
    ("education and training", SectionType::Education),
    ("academic background", SectionType::Education),
    ("skills", SectionType::Skills),
    ("technical skills", SectionType::Skills),
    ("key skills", SectionType::Skills),
    ("core competencies", SectionType::Skills),
    ("competencies", SectionType::Skills),
    ("expertise", SectionType::Skills),
    ("areas of expertise", SectionType::Skills),
    ("projects", SectionType::Projects),
    ("personal projects", SectionType::Projects),
    ("key projects", SectionType::Projects),
    ("certifications", SectionType::Certifications),
    ("certificates", SectionType::Certifications),
    ("licenses", SectionType::Certifications),
    ("licenses and certifications", SectionType::Certifications),
    ("licenses & certifications", SectionType::Certifications),
    ("awards", SectionType::Awards),
    ("honors", SectionType::Awards),
    ("awards and honors", SectionType::Awards),
    ("achievements", SectionType::Awards),
    ("publications", SectionType::Other),
    ("languages", SectionType::Other),
    ("interests", SectionType::Other),
    ("volunteer experience", SectionType::Other),
    ("volunteering", SectionType::Other),
    ("references", SectionType::Other),
];

/// Counts of layout features the extractor saw in the source document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionArtifacts {
    pub tables: usize,
    pub images: usize,
    pub text_boxes: usize,
    pub unreadable_chars: usize,
}

/// A labeled span of the normalized text.
///
/// `start..end` covers the section body; the heading line itself is kept
/// in `heading`. The leading segment before the first heading has no
/// heading and is labeled `Contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub section: SectionType,
    pub heading: Option<String>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    text: String,
    segments: Vec<Segment>,
    artifacts: ExtractionArtifacts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    pub section: SectionType,
    pub heading: String,
    /// Byte offset within the line where the section body begins
    pub body_offset: usize,
}

pub struct SectionDetector {
    matcher: AhoCorasick,
}

impl Default for SectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionDetector {
    pub fn new() -> Self {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .start_kind(StartKind::Anchored)
            .build(SECTION_ANCHORS.iter().map(|(anchor, _)| anchor))
            .expect("Invalid section anchor table");

        Self { matcher }
    }

    /// Classify a single line as a section heading.
    ///
    /// A line is a heading when it is exactly an anchor phrase (optionally
    /// followed by `:` and inline content), or when it starts with one and
    /// is either colon-terminated or all caps, in at most five words.
    pub fn detect(&self, line: &str) -> Option<HeadingMatch> {
        let lead = line.len()
            - line
                .trim_start_matches(|c: char| c == '#' || c.is_whitespace() || BULLET_MARKERS.contains(&c))
                .len();
        let candidate = &line[lead..];

        let (head, inline_body) = match candidate.find(':') {
            Some(idx) => (&candidate[..idx], Some(lead + idx + 1)),
            None => (candidate, None),
        };
        let head = head.trim_end();
        if head.is_empty() {
            return None;
        }

        let found = self.matcher.find(Input::new(head).anchored(Anchored::Yes))?;
        let section = SECTION_ANCHORS[found.pattern().as_usize()].1;
        let has_body = inline_body.is_some_and(|idx| !line[idx..].trim().is_empty());

        let is_heading = if found.end() == head.len() {
            true
        } else {
            let at_word_boundary = head[found.end()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_alphanumeric());
            at_word_boundary
                && !has_body
                && head.split_whitespace().count() <= 5
                && (inline_body.is_some() || is_all_caps(head))
        };

        if !is_heading {
            return None;
        }

        Some(HeadingMatch {
            section,
            heading: head.to_string(),
            body_offset: inline_body.unwrap_or(line.len()),
        })
    }

    /// Split normalized text into labeled segments
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let mut headings: Vec<(usize, usize, HeadingMatch)> = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            if let Some(m) = self.detect(line) {
                headings.push((offset, offset + m.body_offset, m));
            }
            offset += line.len() + 1;
        }

        let mut segments = Vec::new();
        let preamble_end = headings.first().map(|(start, _, _)| *start).unwrap_or(text.len());
        if !text[..preamble_end].trim().is_empty() {
            segments.push(Segment {
                section: SectionType::Contact,
                heading: None,
                start: 0,
                end: preamble_end,
            });
        }

        for (i, (_, body_start, m)) in headings.iter().enumerate() {
            let end = headings
                .get(i + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(text.len());
            segments.push(Segment {
                section: m.section,
                heading: Some(m.heading.clone()),
                start: (*body_start).min(end),
                end,
            });
        }

        segments
    }
}

impl NormalizedText {
    /// Normalize raw extracted text and lay out its sections.
    ///
    /// Fails with `EmptyDocument` when nothing readable survives.
    pub fn from_raw(
        raw: &str,
        mut artifacts: ExtractionArtifacts,
        processor: &TextProcessor,
        detector: &SectionDetector,
    ) -> Result<Self> {
        let normalized = processor.normalize(raw);
        if normalized.text.trim().is_empty() {
            return Err(AnalyzerError::EmptyDocument);
        }

        artifacts.unreadable_chars += normalized.unreadable_chars;
        let segments = detector.segment(&normalized.text);

        Ok(Self {
            text: normalized.text,
            segments,
            artifacts,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn artifacts(&self) -> &ExtractionArtifacts {
        &self.artifacts
    }

    pub fn segment_text(&self, segment: &Segment) -> &str {
        self.text[segment.start..segment.end].trim()
    }

    pub fn has_headings(&self) -> bool {
        self.segments.iter().any(|s| s.heading.is_some())
    }

    pub fn contains_section(&self, section: SectionType) -> bool {
        self.segments.iter().any(|s| s.section == section)
    }

    pub fn sections(&self, section: SectionType) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.section == section)
    }

    /// Non-blank lines in document order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    pub fn word_count(&self) -> usize {
        self.text
            .split_whitespace()
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .count()
    }

    /// Share of glyphs in the source that could not be decoded
    pub fn unreadable_ratio(&self) -> f64 {
        let readable = self.text.chars().filter(|c| !c.is_whitespace()).count();
        let total = readable + self.artifacts.unreadable_chars;
        if total == 0 {
            0.0
        } else {
            self.artifacts.unreadable_chars as f64 / total as f64
        }
    }
}

/// The bullet marker opening `line`, if any.
///
/// `-` and `*` only count when followed by a space, so ranges and
/// emphasis do not read as list items.
pub fn bullet_marker(line: &str) -> Option<char> {
    let line = line.trim_start();
    let mut chars = line.chars();
    let first = chars.next()?;
    if !BULLET_MARKERS.contains(&first) {
        return None;
    }
    match first {
        '-' | '*' => chars.next().filter(|c| *c == ' ').map(|_| first),
        _ => Some(first),
    }
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
        && text.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

impl SectionType {
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Contact => "Contact",
            SectionType::Summary => "Summary",
            SectionType::Experience => "Experience",
            SectionType::Education => "Education",
            SectionType::Skills => "Skills",
            SectionType::Projects => "Projects",
            SectionType::Certifications => "Certifications",
            SectionType::Awards => "Awards",
            SectionType::Other => "Other",
        }
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
