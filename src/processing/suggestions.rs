//! Prioritized improvement suggestions

use crate::config::SuggestionConfig;
use crate::processing::document::{bullet_marker, NormalizedText, SectionType, BULLET_MARKERS};
use crate::processing::formatting::{Deficit, DeficitKind, FormattingAssessment, ScoreComponent};
use crate::processing::keyword_matcher::{KeywordMatchResult, KeywordScoreMethod};
use crate::processing::skill_extractor::SkillSet;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Impact strictly above this is high priority
pub const HIGH_IMPACT_THRESHOLD: u32 = 15;
/// Impact at or above this is at least medium priority
pub const MEDIUM_IMPACT_THRESHOLD: u32 = 5;
pub const MAX_IMPROVEMENTS: usize = 5;

const MAX_LISTED_KEYWORDS: usize = 8;
const DENSITY_FLOOR: u8 = 60;
const MIN_SAMPLE_LINES: usize = 3;
const QUANTIFIED_SHARE: f64 = 0.30;
const QUANTIFIED_IMPACT: u32 = 12;
const ACTION_VERB_SHARE: f64 = 0.40;
const ACTION_VERB_IMPACT: u32 = 10;
const MIN_TECHNICAL_SKILLS: usize = 5;
const FEW_SKILLS_IMPACT: u32 = 8;

const ACTION_VERBS: &[&str] = &[
    "accelerated", "achieved", "administered", "analyzed", "architected", "automated",
    "boosted", "built", "championed", "coached", "collaborated", "completed", "configured",
    "consolidated", "coordinated", "created", "cut", "debugged", "decreased", "defined",
    "delivered", "deployed", "designed", "developed", "devised", "directed", "drove",
    "eliminated", "enabled", "engineered", "established", "evaluated", "executed",
    "expanded", "facilitated", "generated", "grew", "guided", "headed", "identified",
    "implemented", "improved", "increased", "initiated", "integrated", "introduced",
    "launched", "led", "maintained", "managed", "mentored", "migrated", "modernized",
    "negotiated", "optimized", "orchestrated", "organized", "overhauled", "owned",
    "pioneered", "planned", "produced", "programmed", "published", "redesigned",
    "reduced", "refactored", "resolved", "restructured", "revamped", "saved", "scaled",
    "secured", "shipped", "simplified", "spearheaded", "standardized", "streamlined",
    "strengthened", "supervised", "tested", "trained", "transformed", "troubleshot",
    "upgraded", "wrote",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub priority: Priority,
    pub title: String,
    pub description: String,
}

pub struct SuggestionEngine {
    config: SuggestionConfig,
    date_or_year: Regex,
    digit: Regex,
    action_verbs: HashSet<&'static str>,
}

impl SuggestionEngine {
    pub fn new(config: SuggestionConfig) -> Self {
        Self {
            config,
            date_or_year: Regex::new(
                r"(?i)\b(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+)?(?:19|20)\d{2}(?:[-/](?:0[1-9]|1[0-2]))?\b|\b(?:0?[1-9]|1[0-2])/(?:19|20)?\d{2}\b",
            )
            .expect("Invalid date regex"),
            digit: Regex::new(r"\d|%|[$€£]").expect("Invalid quantity regex"),
            action_verbs: ACTION_VERBS.iter().copied().collect(),
        }
    }

    pub fn priority_for(&self, impact: u32) -> Priority {
        if impact > self.config.high_impact_threshold {
            Priority::High
        } else if impact >= self.config.medium_impact_threshold {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// All deficits in detection order: formatting and structure first,
    /// then keyword gaps, then content checks.
    pub fn collect_deficits(
        &self,
        doc: &NormalizedText,
        skills: &SkillSet,
        keywords: &KeywordMatchResult,
        formatting: &FormattingAssessment,
    ) -> Vec<Deficit> {
        let mut deficits = formatting.deficits.clone();

        match keywords.method {
            KeywordScoreMethod::JobDescription if !keywords.missing.is_empty() => {
                let listed: Vec<&str> = keywords
                    .missing
                    .iter()
                    .take(MAX_LISTED_KEYWORDS)
                    .map(String::as_str)
                    .collect();
                let more = keywords.missing.len() - listed.len();
                let mut detail = format!("The job description asks for {}", listed.join(", "));
                if more > 0 {
                    detail.push_str(&format!(" and {} more", more));
                }
                deficits.push(Deficit {
                    kind: DeficitKind::MissingKeywords,
                    component: ScoreComponent::Keywords,
                    impact: 100u32.saturating_sub(u32::from(keywords.score)),
                    detail,
                });
            }
            KeywordScoreMethod::DensityFallback if keywords.score < DENSITY_FLOOR => {
                deficits.push(Deficit {
                    kind: DeficitKind::LowKeywordDensity,
                    component: ScoreComponent::Keywords,
                    impact: u32::from(DENSITY_FLOOR - keywords.score) / 2 + 5,
                    detail: format!(
                        "Skill keywords make up a small share of your resume (keyword score {})",
                        keywords.score
                    ),
                });
            }
            _ => {}
        }

        let achievement_lines = achievement_lines(doc);
        if achievement_lines.len() >= MIN_SAMPLE_LINES {
            let quantified = achievement_lines.iter().filter(|l| self.is_quantified(l)).count();
            let share = quantified as f64 / achievement_lines.len() as f64;
            if share < QUANTIFIED_SHARE {
                deficits.push(Deficit {
                    kind: DeficitKind::FewQuantifiedAchievements,
                    component: ScoreComponent::Content,
                    impact: QUANTIFIED_IMPACT,
                    detail: format!(
                        "Only {} of {} experience lines include a number",
                        quantified,
                        achievement_lines.len()
                    ),
                });
            }
        }

        let bullets: Vec<&str> = doc.lines().filter(|l| bullet_marker(l).is_some()).collect();
        if bullets.len() >= MIN_SAMPLE_LINES {
            let strong = bullets.iter().filter(|l| self.starts_with_action_verb(l)).count();
            let share = strong as f64 / bullets.len() as f64;
            if share < ACTION_VERB_SHARE {
                deficits.push(Deficit {
                    kind: DeficitKind::WeakActionVerbs,
                    component: ScoreComponent::Content,
                    impact: ACTION_VERB_IMPACT,
                    detail: format!(
                        "Only {} of {} bullet points open with an action verb",
                        strong,
                        bullets.len()
                    ),
                });
            }
        }

        let technical = skills.technical().len();
        if technical < MIN_TECHNICAL_SKILLS {
            deficits.push(Deficit {
                kind: DeficitKind::FewSkillsListed,
                component: ScoreComponent::Content,
                impact: FEW_SKILLS_IMPACT,
                detail: format!("Only {} technical skill(s) were recognized", technical),
            });
        }

        deficits
    }

    /// Map deficits to improvements, highest priority first, keeping
    /// detection order within a priority.
    pub fn improvements(&self, deficits: &[Deficit]) -> Vec<Improvement> {
        let mut improvements: Vec<Improvement> = deficits
            .iter()
            .map(|d| Improvement {
                priority: self.priority_for(d.impact),
                title: title_for(d.kind),
                description: format!("{}. {}", d.detail, advice_for(d.kind)),
            })
            .collect();

        improvements.sort_by_key(|i| i.priority);
        improvements.truncate(self.config.max_improvements);

        debug!(
            "{} deficits reduced to {} improvements",
            deficits.len(),
            improvements.len()
        );
        improvements
    }

    pub fn suggest(
        &self,
        doc: &NormalizedText,
        skills: &SkillSet,
        keywords: &KeywordMatchResult,
        formatting: &FormattingAssessment,
    ) -> Vec<Improvement> {
        let deficits = self.collect_deficits(doc, skills, keywords, formatting);
        self.improvements(&deficits)
    }

    fn is_quantified(&self, line: &str) -> bool {
        let without_dates = self.date_or_year.replace_all(line, "");
        self.digit.is_match(&without_dates)
    }

    fn starts_with_action_verb(&self, line: &str) -> bool {
        let body = line
            .trim_start()
            .trim_start_matches(|c: char| BULLET_MARKERS.contains(&c))
            .trim_start();
        body.split_whitespace()
            .next()
            .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase())
            .is_some_and(|w| self.action_verbs.contains(w.as_str()))
    }
}

/// Bullet lines anywhere plus every body line of experience sections
fn achievement_lines(doc: &NormalizedText) -> Vec<&str> {
    let mut lines = Vec::new();
    for segment in doc.segments() {
        let in_experience = segment.section == SectionType::Experience;
        for line in doc.segment_text(segment).lines().map(str::trim) {
            if !line.is_empty() && (in_experience || bullet_marker(line).is_some()) {
                lines.push(line);
            }
        }
    }
    lines
}

fn title_for(kind: DeficitKind) -> String {
    match kind {
        DeficitKind::MissingKeywords => "Add missing keywords".to_string(),
        DeficitKind::LowKeywordDensity => "Strengthen keyword coverage".to_string(),
        DeficitKind::FewQuantifiedAchievements => "Add measurable outcomes".to_string(),
        DeficitKind::WeakActionVerbs => "Optimize work experience section".to_string(),
        DeficitKind::FewSkillsListed => "Update skills section".to_string(),
        DeficitKind::InconsistentDateFormats | DeficitKind::InconsistentBulletStyles => {
            "Improve formatting consistency".to_string()
        }
        DeficitKind::NoBulletPoints => "Use bullet points for experience".to_string(),
        DeficitKind::TooShort => "Expand your resume".to_string(),
        DeficitKind::TooLong => "Tighten your resume".to_string(),
        DeficitKind::TablesDetected => "Remove tables".to_string(),
        DeficitKind::ImagesDetected => "Remove images and graphics".to_string(),
        DeficitKind::TextBoxesDetected => "Move text out of text boxes".to_string(),
        DeficitKind::UnreadableCharacters => "Fix unreadable characters".to_string(),
        DeficitKind::MissingSectionHeaders => "Add standard section headings".to_string(),
        DeficitKind::MissingSection(section) => format!("Add a {} section", section.label()),
        DeficitKind::MissingContactInfo => "Complete your contact information".to_string(),
        DeficitKind::MissingSummary => "Add a professional summary".to_string(),
        DeficitKind::EmptySection(section) => format!("Expand the {} section", section.label()),
    }
}

fn advice_for(kind: DeficitKind) -> &'static str {
    match kind {
        DeficitKind::MissingKeywords => {
            "Work these terms into your experience and skills where they genuinely apply."
        }
        DeficitKind::LowKeywordDensity => {
            "Name the tools, languages and methods you used instead of describing them generically."
        }
        DeficitKind::FewQuantifiedAchievements => {
            "Add numbers such as percentages, revenue, users or time saved to show impact."
        }
        DeficitKind::WeakActionVerbs => {
            "Open each bullet with a strong verb such as Led, Built, Reduced or Launched."
        }
        DeficitKind::FewSkillsListed => {
            "List the specific technologies you work with in a dedicated Skills section."
        }
        DeficitKind::InconsistentDateFormats => "Use one date style, for example 'Jan 2020', throughout.",
        DeficitKind::InconsistentBulletStyles => "Use a single bullet character for every list.",
        DeficitKind::NoBulletPoints => "Break each role into short bullet points.",
        DeficitKind::TooShort => "Describe your roles, projects and results in more detail.",
        DeficitKind::TooLong => "Trim older or less relevant roles to keep the resume focused.",
        DeficitKind::TablesDetected => "Present the same information as plain text lines.",
        DeficitKind::ImagesDetected => "Replace logos, icons and skill charts with text.",
        DeficitKind::TextBoxesDetected => "Put that content in the main body of the document.",
        DeficitKind::UnreadableCharacters => {
            "Re-export the file with standard fonts so every character is real text."
        }
        DeficitKind::MissingSectionHeaders => {
            "Use plain headings such as Summary, Experience, Education and Skills."
        }
        DeficitKind::MissingSection(_) => "ATS systems look for this heading by name.",
        DeficitKind::MissingContactInfo => "Put your email and phone number at the top.",
        DeficitKind::MissingSummary => "Open with two or three lines on who you are and what you offer.",
        DeficitKind::EmptySection(_) => "Add content under the heading or remove it.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::{ExtractionArtifacts, SectionDetector};
    use crate::processing::text_processor::TextProcessor;

    fn engine() -> SuggestionEngine {
        SuggestionEngine::new(SuggestionConfig::default())
    }

    fn doc(text: &str) -> NormalizedText {
        NormalizedText::from_raw(
            text,
            ExtractionArtifacts::default(),
            &TextProcessor::new(),
            &SectionDetector::new(),
        )
        .unwrap()
    }

    fn deficit(kind: DeficitKind, impact: u32) -> Deficit {
        Deficit {
            kind,
            component: ScoreComponent::Formatting,
            impact,
            detail: "detail".to_string(),
        }
    }

    fn fallback(score: u8) -> KeywordMatchResult {
        KeywordMatchResult {
            matched: Vec::new(),
            missing: Vec::new(),
            additional: Vec::new(),
            job_keywords: Vec::new(),
            score,
            method: KeywordScoreMethod::DensityFallback,
        }
    }

    fn no_formatting_issues() -> FormattingAssessment {
        FormattingAssessment {
            formatting: 100,
            structure: 100,
            deficits: Vec::new(),
        }
    }

    #[test]
    fn test_priority_thresholds() {
        let engine = engine();
        assert_eq!(engine.priority_for(16), Priority::High);
        assert_eq!(engine.priority_for(15), Priority::Medium);
        assert_eq!(engine.priority_for(5), Priority::Medium);
        assert_eq!(engine.priority_for(4), Priority::Low);
    }

    #[test]
    fn test_improvements_sorted_stably_and_truncated() {
        let deficits = vec![
            deficit(DeficitKind::TooShort, 15),
            deficit(DeficitKind::MissingSummary, 3),
            deficit(DeficitKind::MissingSectionHeaders, 60),
            deficit(DeficitKind::TablesDetected, 15),
            deficit(DeficitKind::MissingSection(SectionType::Skills), 20),
            deficit(DeficitKind::ImagesDetected, 10),
            deficit(DeficitKind::TextBoxesDetected, 5),
        ];

        let improvements = engine().improvements(&deficits);
        let titles: Vec<&str> = improvements.iter().map(|i| i.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                "Add standard section headings",
                "Add a Skills section",
                "Expand your resume",
                "Remove tables",
                "Remove images and graphics",
            ]
        );
    }

    #[test]
    fn test_missing_keywords_lists_at_most_eight() {
        let missing: Vec<String> = (1..=10).map(|i| format!("Skill{}", i)).collect();
        let keywords = KeywordMatchResult {
            matched: vec!["Rust".to_string()],
            missing: missing.clone(),
            additional: Vec::new(),
            job_keywords: missing,
            score: 9,
            method: KeywordScoreMethod::JobDescription,
        };
        let skills = SkillSet::default();

        let deficits = engine().collect_deficits(&doc("Rust"), &skills, &keywords, &no_formatting_issues());
        let gap = deficits.iter().find(|d| d.kind == DeficitKind::MissingKeywords).unwrap();

        assert_eq!(gap.impact, 91);
        assert!(gap.detail.contains("Skill8"));
        assert!(!gap.detail.contains("Skill9,"));
        assert!(gap.detail.ends_with("and 2 more"));
    }

    #[test]
    fn test_low_density_only_in_fallback_mode() {
        let skills = SkillSet::default();
        let deficits = engine().collect_deficits(&doc("Rust"), &skills, &fallback(20), &no_formatting_issues());
        let low = deficits.iter().find(|d| d.kind == DeficitKind::LowKeywordDensity).unwrap();
        assert_eq!(low.impact, 25);

        let fine = engine().collect_deficits(&doc("Rust"), &skills, &fallback(60), &no_formatting_issues());
        assert!(fine.iter().all(|d| d.kind != DeficitKind::LowKeywordDensity));
    }

    #[test]
    fn test_content_checks() {
        let text = doc(
            "Experience\n• Responsible for backend services since 2019\n• Worked on the billing team\n\
             • Helped with deployments\n• Built a cache that cut latency 40%",
        );
        let deficits = engine().collect_deficits(&text, &SkillSet::default(), &fallback(100), &no_formatting_issues());
        let kinds: Vec<DeficitKind> = deficits.iter().map(|d| d.kind).collect();

        assert_eq!(
            kinds,
            vec![
                DeficitKind::FewQuantifiedAchievements,
                DeficitKind::WeakActionVerbs,
                DeficitKind::FewSkillsListed
            ]
        );
    }

    #[test]
    fn test_strong_bullets_pass() {
        let text = doc(
            "Experience\n• Led 5 engineers\n• Reduced costs by $20k\n• Shipped 3 products\n• Built APIs for 2M users",
        );
        let deficits = engine().collect_deficits(&text, &SkillSet::default(), &fallback(100), &no_formatting_issues());

        assert!(deficits.iter().all(|d| d.kind != DeficitKind::FewQuantifiedAchievements));
        assert!(deficits.iter().all(|d| d.kind != DeficitKind::WeakActionVerbs));
    }
}
