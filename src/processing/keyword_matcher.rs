//! Keyword matching between a resume's skills and a job description

use crate::processing::skill_extractor::SkillSet;
use crate::processing::taxonomy::{SkillCategory, SkillTaxonomy};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Skill-token share of content tokens that earns a full keyword score
/// when there is no job description to match against.
pub const DENSITY_TARGET: f64 = 0.08;

/// A job posting and the canonical skill keywords it asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription {
    text: String,
    truncated: bool,
    keywords: Vec<String>,
}

impl JobDescription {
    /// Truncate to `max_chars` characters and derive the keyword set.
    ///
    /// Keywords are the technical and soft skills the taxonomy recognizes,
    /// in order of first mention. Certifications are left out. Stop words
    /// stay in the token stream because canonical names such as
    /// "Ruby on Rails" contain them; the taxonomy scan never yields one alone.
    pub fn parse(text: &str, taxonomy: &SkillTaxonomy, max_chars: usize) -> Self {
        let (text, truncated) = match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                warn!(
                    "Job description exceeds {} characters, truncating",
                    max_chars
                );
                (&text[..cut], true)
            }
            None => (text, false),
        };

        let tokens = taxonomy.processor().tokenize(text);
        let mut keywords: Vec<String> = Vec::new();
        for mention in taxonomy.scan(&tokens) {
            if mention.entry.category == SkillCategory::Certification {
                continue;
            }
            if !keywords.iter().any(|k| k.eq_ignore_ascii_case(&mention.entry.name)) {
                keywords.push(mention.entry.name.clone());
            }
        }

        debug!("Job description yields {} keywords", keywords.len());

        Self {
            text: text.to_string(),
            truncated,
            keywords,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordScoreMethod {
    JobDescription,
    DensityFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatchResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub additional: Vec<String>,
    pub job_keywords: Vec<String>,
    pub score: u8,
    pub method: KeywordScoreMethod,
}

pub struct KeywordMatcher {
    density_target: f64,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DENSITY_TARGET)
    }
}

impl KeywordMatcher {
    pub fn new(density_target: f64) -> Self {
        Self { density_target }
    }

    pub fn match_skills(&self, skills: &SkillSet, job: Option<&JobDescription>) -> KeywordMatchResult {
        match job {
            Some(job) if !job.is_blank() => {
                if job.keywords().is_empty() {
                    warn!("Job description names no known skills");
                }
                self.match_against_job(skills, job)
            }
            _ => self.density_fallback(skills),
        }
    }

    fn match_against_job(&self, skills: &SkillSet, job: &JobDescription) -> KeywordMatchResult {
        let in_job = |name: &str| job.keywords().iter().any(|k| k.eq_ignore_ascii_case(name));
        let resume_skills = skills.technical_and_soft();

        let (matched, additional): (Vec<&str>, Vec<&str>) =
            resume_skills.into_iter().partition(|name| in_job(name));

        let missing: Vec<String> = job
            .keywords()
            .iter()
            .filter(|k| !matched.iter().any(|m| m.eq_ignore_ascii_case(k)))
            .cloned()
            .collect();

        let denominator = (matched.len() + missing.len()).max(1);
        let score = percent(matched.len() as f64 / denominator as f64);

        debug!(
            "Matched {} of {} job keywords",
            matched.len(),
            job.keywords().len()
        );

        KeywordMatchResult {
            matched: matched.into_iter().map(String::from).collect(),
            missing,
            additional: additional.into_iter().map(String::from).collect(),
            job_keywords: job.keywords().to_vec(),
            score,
            method: KeywordScoreMethod::JobDescription,
        }
    }

    fn density_fallback(&self, skills: &SkillSet) -> KeywordMatchResult {
        let density = skills.skill_token_count() as f64 / skills.content_token_count().max(1) as f64;
        let score = percent((density / self.density_target).min(1.0));

        debug!("Keyword density {:.3} scores {}", density, score);

        KeywordMatchResult {
            matched: Vec::new(),
            missing: Vec::new(),
            additional: skills.technical_and_soft().into_iter().map(String::from).collect(),
            job_keywords: Vec::new(),
            score,
            method: KeywordScoreMethod::DensityFallback,
        }
    }
}

fn percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}
