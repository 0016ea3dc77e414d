//! Skill extraction against the taxonomy

use crate::processing::document::NormalizedText;
use crate::processing::taxonomy::{SkillCategory, SkillTaxonomy};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSkill {
    pub name: String,
    pub category: SkillCategory,
}

/// Canonical skills found in a resume, deduplicated and in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    skills: Vec<ExtractedSkill>,
    skill_token_count: usize,
    content_token_count: usize,
}

impl SkillSet {
    /// Add a skill unless one with the same name (ignoring case) exists
    pub fn insert(&mut self, name: impl Into<String>, category: SkillCategory) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.skills.push(ExtractedSkill { name, category });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn skills(&self) -> &[ExtractedSkill] {
        &self.skills
    }

    pub fn technical(&self) -> Vec<&str> {
        self.of(|c| c == SkillCategory::Technical)
    }

    pub fn soft(&self) -> Vec<&str> {
        self.of(|c| c == SkillCategory::Soft)
    }

    pub fn certifications(&self) -> Vec<&str> {
        self.of(|c| c == SkillCategory::Certification)
    }

    /// Technical and soft skills interleaved in first-seen order
    pub fn technical_and_soft(&self) -> Vec<&str> {
        self.of(|c| c != SkillCategory::Certification)
    }

    fn of(&self, keep: impl Fn(SkillCategory) -> bool) -> Vec<&str> {
        self.skills
            .iter()
            .filter(|s| keep(s.category))
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Tokens covered by skill mentions, counting every occurrence
    pub fn skill_token_count(&self) -> usize {
        self.skill_token_count
    }

    /// Non-stopword, non-numeric tokens in the scanned text
    pub fn content_token_count(&self) -> usize {
        self.content_token_count
    }
}

pub struct SkillExtractor {
    taxonomy: Arc<SkillTaxonomy>,
}

impl SkillExtractor {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn extract(&self, text: &NormalizedText) -> SkillSet {
        self.extract_from_str(text.text())
    }

    pub fn extract_from_str(&self, text: &str) -> SkillSet {
        let processor = self.taxonomy.processor();
        let tokens = processor.tokenize(text);

        let mut set = SkillSet {
            content_token_count: processor.content_tokens(&tokens).len(),
            ..SkillSet::default()
        };

        for mention in self.taxonomy.scan(&tokens) {
            set.skill_token_count += mention.token_count;
            set.insert(mention.entry.name.clone(), mention.entry.category);
        }

        debug!(
            "Extracted {} skills ({} skill tokens of {} content tokens) with taxonomy {}",
            set.len(),
            set.skill_token_count,
            set.content_token_count,
            self.taxonomy.version()
        );

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SkillExtractor {
        SkillExtractor::new(Arc::new(SkillTaxonomy::builtin()))
    }

    #[test]
    fn test_skills_are_grouped_by_category() {
        let set = extractor().extract_from_str(
            "Led a team building React and TypeScript apps. Strong leadership. PMP certified. Kubernetes (k8s) operator.",
        );

        assert_eq!(set.technical(), vec!["React", "TypeScript", "Kubernetes"]);
        assert_eq!(set.soft(), vec!["Leadership"]);
        assert_eq!(set.certifications(), vec!["PMP"]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence_but_count_tokens() {
        let set = extractor().extract_from_str("python, Python, PYTHON and machine learning");

        assert_eq!(set.technical(), vec!["Python", "Machine Learning"]);
        assert_eq!(set.skill_token_count(), 5);
        assert_eq!(set.content_token_count(), 5);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = extractor();
        let text = "Rust, Go lang, Docker, AWS, teamwork, communication, CI/CD, Node.js";
        assert_eq!(extractor.extract_from_str(text), extractor.extract_from_str(text));
    }

    #[test]
    fn test_insert_ignores_case() {
        let mut set = SkillSet::default();
        assert!(set.insert("React", SkillCategory::Technical));
        assert!(!set.insert("react", SkillCategory::Technical));
        assert_eq!(set.len(), 1);
    }
}
