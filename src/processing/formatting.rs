//! Formatting and structure checks for ATS readability

use crate::config::FormattingConfig;
use crate::processing::document::{bullet_marker, NormalizedText, SectionType};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DATE_STYLE_PENALTY: u32 = 10;
const BULLET_STYLE_PENALTY: u32 = 8;
const NO_BULLETS_PENALTY: u32 = 6;
const TOO_SHORT_PENALTY: u32 = 15;
const TOO_LONG_PENALTY: u32 = 10;
const TABLES_PENALTY: u32 = 15;
const IMAGES_PENALTY: u32 = 10;
const TEXT_BOXES_PENALTY: u32 = 5;
const UNREADABLE_PENALTY: u32 = 10;
const UNREADABLE_RATIO_LIMIT: f64 = 0.01;
const NO_HEADINGS_FORMATTING_PENALTY: u32 = 10;

const NO_HEADINGS_STRUCTURE_PENALTY: u32 = 50;
const MISSING_SECTION_PENALTY: u32 = 20;
const MISSING_EMAIL_PENALTY: u32 = 10;
const MISSING_PHONE_PENALTY: u32 = 5;
const MISSING_SUMMARY_PENALTY: u32 = 5;
const EMPTY_SECTION_PENALTY: u32 = 5;
const MAX_EMPTY_SECTIONS: usize = 3;
const MIN_SECTION_WORDS: usize = 3;

/// What a deficit is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeficitKind {
    InconsistentDateFormats,
    InconsistentBulletStyles,
    NoBulletPoints,
    TooShort,
    TooLong,
    TablesDetected,
    ImagesDetected,
    TextBoxesDetected,
    UnreadableCharacters,
    MissingSectionHeaders,
    MissingSection(SectionType),
    MissingContactInfo,
    MissingSummary,
    EmptySection(SectionType),
    MissingKeywords,
    LowKeywordDensity,
    FewQuantifiedAchievements,
    WeakActionVerbs,
    FewSkillsListed,
}

/// The score a deficit drags down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Formatting,
    Keywords,
    Structure,
    /// Writing quality that no single score measures
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficit {
    pub kind: DeficitKind,
    pub component: ScoreComponent,
    /// Estimated score points lost
    pub impact: u32,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingAssessment {
    pub formatting: u8,
    pub structure: u8,
    pub deficits: Vec<Deficit>,
}

pub struct FormattingAnalyzer {
    config: FormattingConfig,
    processor: TextProcessor,
    month_name_date: Regex,
    numeric_slash_date: Regex,
    iso_date: Regex,
}

#[derive(Default)]
struct Tally {
    formatting_penalty: u32,
    structure_penalty: u32,
    deficits: Vec<Deficit>,
}

impl Tally {
    fn flag(&mut self, kind: DeficitKind, component: ScoreComponent, impact: u32, detail: impl Into<String>) {
        match component {
            ScoreComponent::Formatting => self.formatting_penalty += impact,
            ScoreComponent::Structure => self.structure_penalty += impact,
            ScoreComponent::Keywords | ScoreComponent::Content => {}
        }
        debug!("{:?} (-{}): {:?}", kind, impact, component);
        self.deficits.push(Deficit {
            kind,
            component,
            impact,
            detail: detail.into(),
        });
    }

    fn score(penalty: u32) -> u8 {
        100u32.saturating_sub(penalty) as u8
    }
}

impl FormattingAnalyzer {
    pub fn new(config: FormattingConfig) -> Self {
        Self {
            config,
            processor: TextProcessor::new(),
            month_name_date: Regex::new(
                r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(?:19|20)\d{2}\b",
            )
            .expect("Invalid month-name date regex"),
            numeric_slash_date: Regex::new(r"\b(?:0?[1-9]|1[0-2])/(?:19|20)?\d{2}\b")
                .expect("Invalid numeric date regex"),
            iso_date: Regex::new(r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])(?:-\d{2})?\b")
                .expect("Invalid ISO date regex"),
        }
    }

    pub fn analyze(&self, doc: &NormalizedText) -> FormattingAssessment {
        let mut tally = Tally::default();
        self.formatting_battery(doc, &mut tally);
        self.structure_battery(doc, &mut tally);

        FormattingAssessment {
            formatting: Tally::score(tally.formatting_penalty),
            structure: Tally::score(tally.structure_penalty),
            deficits: tally.deficits,
        }
    }

    fn formatting_battery(&self, doc: &NormalizedText, tally: &mut Tally) {
        use ScoreComponent::Formatting;

        let date_styles = self.date_styles(doc.text());
        if date_styles.len() > 1 {
            tally.flag(
                DeficitKind::InconsistentDateFormats,
                Formatting,
                DATE_STYLE_PENALTY,
                format!("Dates mix {} styles: {}", date_styles.len(), date_styles.join(", ")),
            );
        }

        let markers: BTreeSet<char> = doc.lines().filter_map(bullet_marker).collect();
        if markers.len() > 1 {
            let shown: String = markers.iter().map(|m| format!("'{}' ", m)).collect();
            tally.flag(
                DeficitKind::InconsistentBulletStyles,
                Formatting,
                BULLET_STYLE_PENALTY,
                format!("Bullet points use {} different markers: {}", markers.len(), shown.trim_end()),
            );
        }

        if markers.is_empty() && doc.contains_section(SectionType::Experience) {
            tally.flag(
                DeficitKind::NoBulletPoints,
                Formatting,
                NO_BULLETS_PENALTY,
                "Experience is written as paragraphs without bullet points",
            );
        }

        let words = doc.word_count();
        if words < self.config.min_words {
            tally.flag(
                DeficitKind::TooShort,
                Formatting,
                TOO_SHORT_PENALTY,
                format!("Only {} words; aim for at least {}", words, self.config.min_words),
            );
        } else if words > self.config.max_words {
            tally.flag(
                DeficitKind::TooLong,
                Formatting,
                TOO_LONG_PENALTY,
                format!("{} words; aim for at most {}", words, self.config.max_words),
            );
        }

        let artifacts = doc.artifacts();
        if artifacts.tables > 0 {
            tally.flag(
                DeficitKind::TablesDetected,
                Formatting,
                TABLES_PENALTY,
                format!("{} table(s) found; many ATS parsers scramble table cells", artifacts.tables),
            );
        }
        if artifacts.images > 0 {
            tally.flag(
                DeficitKind::ImagesDetected,
                Formatting,
                IMAGES_PENALTY,
                format!("{} image(s) found; text inside images is invisible to ATS", artifacts.images),
            );
        }
        if artifacts.text_boxes > 0 {
            tally.flag(
                DeficitKind::TextBoxesDetected,
                Formatting,
                TEXT_BOXES_PENALTY,
                format!("{} text box(es) found; their content is often skipped", artifacts.text_boxes),
            );
        }

        let ratio = doc.unreadable_ratio();
        if ratio > UNREADABLE_RATIO_LIMIT {
            tally.flag(
                DeficitKind::UnreadableCharacters,
                Formatting,
                UNREADABLE_PENALTY,
                format!("{:.1}% of characters could not be read", ratio * 100.0),
            );
        }

        // The matching deficit is reported once, by the structure battery.
        if !doc.has_headings() {
            tally.formatting_penalty += NO_HEADINGS_FORMATTING_PENALTY;
        }
    }

    fn structure_battery(&self, doc: &NormalizedText, tally: &mut Tally) {
        use ScoreComponent::Structure;

        let has_headings = doc.has_headings();
        if !has_headings {
            tally.structure_penalty += NO_HEADINGS_STRUCTURE_PENALTY;
            tally.deficits.push(Deficit {
                kind: DeficitKind::MissingSectionHeaders,
                component: Structure,
                impact: NO_HEADINGS_STRUCTURE_PENALTY + NO_HEADINGS_FORMATTING_PENALTY,
                detail: "No standard section headings were found".to_string(),
            });
        } else {
            for section in &self.config.required_sections {
                if !doc.contains_section(*section) {
                    tally.flag(
                        DeficitKind::MissingSection(*section),
                        Structure,
                        MISSING_SECTION_PENALTY,
                        format!("No {} section was found", section.label()),
                    );
                }
            }
        }

        let text = doc.text();
        if !self.processor.contains_email(text) {
            tally.flag(
                DeficitKind::MissingContactInfo,
                Structure,
                MISSING_EMAIL_PENALTY,
                "No email address was found",
            );
        } else if !self.processor.contains_phone(text) {
            tally.flag(
                DeficitKind::MissingContactInfo,
                Structure,
                MISSING_PHONE_PENALTY,
                "No phone number was found",
            );
        }

        if !has_headings {
            return;
        }

        if !doc.contains_section(SectionType::Summary) {
            tally.flag(
                DeficitKind::MissingSummary,
                Structure,
                MISSING_SUMMARY_PENALTY,
                "No summary or profile section introduces the resume",
            );
        }

        let empty = doc
            .segments()
            .iter()
            .filter(|s| s.heading.is_some())
            .filter(|s| doc.segment_text(s).split_whitespace().count() < MIN_SECTION_WORDS)
            .take(MAX_EMPTY_SECTIONS);
        for segment in empty {
            let heading = segment.heading.as_deref().unwrap_or(segment.section.label());
            tally.flag(
                DeficitKind::EmptySection(segment.section),
                Structure,
                EMPTY_SECTION_PENALTY,
                format!("The '{}' section is nearly empty", heading),
            );
        }
    }

    fn date_styles(&self, text: &str) -> Vec<&'static str> {
        let mut styles = Vec::new();
        if self.month_name_date.is_match(text) {
            styles.push("month name");
        }
        if self.numeric_slash_date.is_match(text) {
            styles.push("numeric");
        }
        if self.iso_date.is_match(text) {
            styles.push("ISO");
        }
        styles
    }
}
