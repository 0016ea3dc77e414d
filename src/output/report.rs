//! The analysis report handed back to callers and exporters

use crate::processing::keyword_matcher::{KeywordMatchResult, KeywordScoreMethod};
use crate::processing::scoring::ScoreBreakdown;
use crate::processing::skill_extractor::SkillSet;
use crate::processing::suggestions::Improvement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SUMMARY_IMPROVEMENTS: usize = 2;

/// Result of one analysis. Built once when the pipeline completes and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    analysis_id: Uuid,
    created_at: DateTime<Utc>,
    ats_score: u8,
    score_breakdown: ScoreBreakdown,
    skills: SkillsSummary,
    keyword_matching: KeywordMatching,
    improvements: Vec<Improvement>,
    summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsSummary {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatching {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub additional: Vec<String>,
}

/// Verbal band for a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ScoreLabel::Excellent,
            60..=79 => ScoreLabel::Good,
            _ => ScoreLabel::NeedsImprovement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalysisReport {
    pub fn new(
        breakdown: ScoreBreakdown,
        skills: &SkillSet,
        keywords: &KeywordMatchResult,
        improvements: Vec<Improvement>,
    ) -> Self {
        let summary = compose_summary(&breakdown, keywords, &improvements);
        let owned = |names: Vec<&str>| -> Vec<String> { names.into_iter().map(String::from).collect() };

        Self {
            analysis_id: Uuid::new_v4(),
            created_at: Utc::now(),
            ats_score: breakdown.composite,
            score_breakdown: breakdown,
            skills: SkillsSummary {
                technical: owned(skills.technical()),
                soft: owned(skills.soft()),
                certifications: owned(skills.certifications()),
            },
            keyword_matching: KeywordMatching {
                matched: keywords.matched.clone(),
                missing: keywords.missing.clone(),
                additional: keywords.additional.clone(),
            },
            improvements,
            summary,
        }
    }

    pub fn analysis_id(&self) -> Uuid {
        self.analysis_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ats_score(&self) -> u8 {
        self.ats_score
    }

    pub fn score_label(&self) -> ScoreLabel {
        ScoreLabel::from_score(self.ats_score)
    }

    pub fn score_breakdown(&self) -> &ScoreBreakdown {
        &self.score_breakdown
    }

    pub fn skills(&self) -> &SkillsSummary {
        &self.skills
    }

    pub fn keyword_matching(&self) -> &KeywordMatching {
        &self.keyword_matching
    }

    pub fn improvements(&self) -> &[Improvement] {
        &self.improvements
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

fn compose_summary(
    breakdown: &ScoreBreakdown,
    keywords: &KeywordMatchResult,
    improvements: &[Improvement],
) -> String {
    let label = ScoreLabel::from_score(breakdown.composite);
    let mut summary = format!(
        "Your resume scores {}/100 on ATS compatibility, which is considered {}.",
        breakdown.composite, label
    );

    // First of equals wins, in display order.
    let components = [
        ("formatting", breakdown.formatting),
        ("keywords", breakdown.keywords),
        ("structure", breakdown.structure),
    ];
    let mut strongest = components[0];
    for component in &components[1..] {
        if component.1 > strongest.1 {
            strongest = *component;
        }
    }
    summary.push_str(&format!(
        " Your strongest area is {} ({}/100).",
        strongest.0, strongest.1
    ));

    let titles: Vec<&str> = improvements
        .iter()
        .take(SUMMARY_IMPROVEMENTS)
        .map(|i| i.title.as_str())
        .collect();
    if !titles.is_empty() {
        summary.push_str(&format!(" Focus first on: {}.", titles.join("; ")));
    }

    if keywords.method == KeywordScoreMethod::JobDescription {
        summary.push_str(&format!(
            " Matched {} of {} job keywords.",
            keywords.matched.len(),
            keywords.job_keywords.len()
        ));
    }

    summary
}
