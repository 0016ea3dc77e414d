//! Versioned skill taxonomy and the span scanner built on it

use crate::config::TaxonomyConfig;
use crate::error::{AnalyzerError, Result};
use crate::processing::text_processor::{TextProcessor, Token};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const BUILTIN_TAXONOMY_VERSION: &str = "1.0.0";

/// Longest alias, in tokens, the scanner will try
pub const MAX_SPAN_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Certification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    version: String,
    #[serde(default)]
    skills: Vec<SkillEntry>,
}

/// One taxonomy hit inside a token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillMention<'a> {
    pub entry: &'a SkillEntry,
    /// Index of the first token of the span
    pub token_index: usize,
    pub token_count: usize,
}

/// Immutable lookup table from normalized phrases to canonical skills
pub struct SkillTaxonomy {
    version: String,
    entries: Vec<SkillEntry>,
    exact: HashMap<String, usize>,
    stemmed: HashMap<String, usize>,
    processor: TextProcessor,
}

impl SkillTaxonomy {
    pub fn builtin() -> Self {
        let entries = BUILTIN_SKILLS
            .iter()
            .map(|(name, category, aliases)| SkillEntry {
                name: name.to_string(),
                category: *category,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();

        Self::build(BUILTIN_TAXONOMY_VERSION.to_string(), entries)
    }

    pub fn from_entries(version: impl Into<String>, entries: Vec<SkillEntry>) -> Result<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(AnalyzerError::TaxonomyUnavailable(
                "taxonomy has no version".to_string(),
            ));
        }

        let taxonomy = Self::build(version, entries);
        if taxonomy.exact.is_empty() {
            return Err(AnalyzerError::TaxonomyUnavailable(
                "taxonomy contains no usable skills".to_string(),
            ));
        }
        Ok(taxonomy)
    }

    /// Parse a TOML taxonomy: a `version` key and `[[skills]]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TaxonomyFile = toml::from_str(content)
            .map_err(|e| AnalyzerError::TaxonomyUnavailable(format!("invalid taxonomy file: {}", e)))?;
        Self::from_entries(file.version, file.skills)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyzerError::TaxonomyUnavailable(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// The configured taxonomy file, or the built-in table
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    fn build(version: String, entries: Vec<SkillEntry>) -> Self {
        let processor = TextProcessor::new();
        let mut kept: Vec<SkillEntry> = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();

        for entry in entries {
            if entry.name.trim().is_empty() || !seen.insert(entry.name.to_lowercase()) {
                warn!("Skipping duplicate or unnamed taxonomy entry '{}'", entry.name);
                continue;
            }
            kept.push(entry);
        }

        let mut exact = HashMap::new();
        let mut stemmed = HashMap::new();

        for (idx, entry) in kept.iter().enumerate() {
            for phrase in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
                let tokens: Vec<String> = processor
                    .tokenize(phrase)
                    .into_iter()
                    .map(|t| t.text)
                    .collect();

                if tokens.is_empty() || tokens.len() > MAX_SPAN_TOKENS {
                    debug!("Alias '{}' of '{}' is not scannable", phrase, entry.name);
                    continue;
                }

                // Earlier entries keep a contested key.
                exact.entry(tokens.join(" ")).or_insert(idx);
                let stems: Vec<String> = tokens.iter().map(|t| processor.stem(t)).collect();
                stemmed.entry(stems.join(" ")).or_insert(idx);
            }
        }

        Self {
            version,
            entries: kept,
            exact,
            stemmed,
            processor,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_category(&self, category: SkillCategory) -> impl Iterator<Item = &SkillEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn processor(&self) -> &TextProcessor {
        &self.processor
    }

    /// Resolve a free-form phrase to its canonical entry
    pub fn lookup(&self, phrase: &str) -> Option<&SkillEntry> {
        let tokens = self.processor.tokenize(phrase);
        if tokens.is_empty() || tokens.len() > MAX_SPAN_TOKENS {
            return None;
        }
        self.lookup_span(&tokens).map(|idx| &self.entries[idx])
    }

    fn lookup_span(&self, span: &[Token]) -> Option<usize> {
        let key = span.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
        if let Some(idx) = self.exact.get(&key) {
            return Some(*idx);
        }

        let stem_key = span
            .iter()
            .map(|t| self.processor.stem(&t.text))
            .collect::<Vec<_>>()
            .join(" ");
        self.stemmed.get(&stem_key).copied()
    }

    /// Scan tokens left to right, preferring the longest span at each
    /// position and consuming it once matched.
    pub fn scan(&self, tokens: &[Token]) -> Vec<SkillMention<'_>> {
        let mut mentions = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = MAX_SPAN_TOKENS.min(tokens.len() - i);
            let hit = (1..=longest)
                .rev()
                .find_map(|len| self.lookup_span(&tokens[i..i + len]).map(|idx| (idx, len)));

            match hit {
                Some((idx, len)) => {
                    mentions.push(SkillMention {
                        entry: &self.entries[idx],
                        token_index: i,
                        token_count: len,
                    });
                    i += len;
                }
                None => i += 1,
            }
        }

        mentions
    }
}

impl std::fmt::Debug for SkillTaxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillTaxonomy")
            .field("version", &self.version)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillCategory::Technical => write!(f, "technical"),
            SkillCategory::Soft => write!(f, "soft"),
            SkillCategory::Certification => write!(f, "certification"),
        }
    }
}

impl std::str::FromStr for SkillCategory {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "technical" | "tech" => Ok(SkillCategory::Technical),
            "soft" => Ok(SkillCategory::Soft),
            "certification" | "certifications" | "cert" => Ok(SkillCategory::Certification),
            other => Err(AnalyzerError::InvalidInput(format!(
                "Unknown skill category '{}'",
                other
            ))),
        }
    }
}

use SkillCategory::{Certification as Cert, Soft, Technical as Tech};

const BUILTIN_SKILLS: &[(&str, SkillCategory, &[&str])] = &[
    // Languages
    ("Rust", Tech, &[]),
    ("Python", Tech, &["python3"]),
    ("JavaScript", Tech, &["js", "ecmascript", "es6"]),
    ("TypeScript", Tech, &[]),
    ("Java", Tech, &[]),
    ("C++", Tech, &["cpp"]),
    ("C#", Tech, &["csharp"]),
    ("Golang", Tech, &["go lang"]),
    ("Ruby", Tech, &[]),
    ("PHP", Tech, &[]),
    ("Swift", Tech, &[]),
    ("Kotlin", Tech, &[]),
    ("Scala", Tech, &[]),
    ("Haskell", Tech, &[]),
    ("Elixir", Tech, &[]),
    ("Perl", Tech, &[]),
    ("MATLAB", Tech, &[]),
    ("SQL", Tech, &["t-sql", "pl/sql"]),
    ("Bash", Tech, &["shell scripting"]),
    ("PowerShell", Tech, &[]),
    // Web
    ("HTML", Tech, &["html5"]),
    ("CSS", Tech, &["css3"]),
    ("Sass", Tech, &["scss"]),
    ("Tailwind CSS", Tech, &["tailwind", "tailwindcss"]),
    ("React", Tech, &["react.js", "reactjs"]),
    ("Redux", Tech, &[]),
    ("Angular", Tech, &["angularjs"]),
    ("Vue.js", Tech, &["vue", "vuejs"]),
    ("Svelte", Tech, &[]),
    ("Next.js", Tech, &["nextjs"]),
    ("Node.js", Tech, &["nodejs"]),
    ("Express.js", Tech, &["expressjs"]),
    ("jQuery", Tech, &[]),
    ("Webpack", Tech, &[]),
    ("Django", Tech, &[]),
    ("Flask", Tech, &[]),
    ("FastAPI", Tech, &[]),
    ("Spring Boot", Tech, &[]),
    ("Ruby on Rails", Tech, &["rails"]),
    (".NET", Tech, &["dotnet", "asp.net", ".net core"]),
    ("GraphQL", Tech, &[]),
    ("REST APIs", Tech, &["rest api", "restful", "restful apis", "restful services"]),
    ("gRPC", Tech, &[]),
    ("Microservices", Tech, &["microservice", "microservice architecture"]),
    // Infrastructure
    ("Docker", Tech, &[]),
    ("Kubernetes", Tech, &["k8s"]),
    ("Terraform", Tech, &[]),
    ("Ansible", Tech, &[]),
    ("Jenkins", Tech, &[]),
    ("GitHub Actions", Tech, &[]),
    ("GitLab CI", Tech, &[]),
    ("CI/CD", Tech, &["continuous integration", "continuous delivery", "continuous deployment"]),
    ("DevOps", Tech, &[]),
    ("AWS", Tech, &["amazon web services"]),
    ("AWS Lambda", Tech, &["lambda"]),
    ("Azure", Tech, &["microsoft azure"]),
    ("Google Cloud", Tech, &["gcp", "google cloud platform"]),
    ("Serverless", Tech, &[]),
    ("Linux", Tech, &["unix"]),
    ("Git", Tech, &[]),
    ("Nginx", Tech, &[]),
    ("Prometheus", Tech, &[]),
    ("Grafana", Tech, &[]),
    ("Distributed Systems", Tech, &[]),
    ("System Design", Tech, &[]),
    // Data
    ("PostgreSQL", Tech, &["postgres"]),
    ("MySQL", Tech, &[]),
    ("MongoDB", Tech, &["mongo"]),
    ("Redis", Tech, &[]),
    ("Elasticsearch", Tech, &[]),
    ("Cassandra", Tech, &[]),
    ("DynamoDB", Tech, &[]),
    ("SQLite", Tech, &[]),
    ("Snowflake", Tech, &[]),
    ("Kafka", Tech, &["apache kafka"]),
    ("RabbitMQ", Tech, &[]),
    ("Apache Spark", Tech, &["spark", "pyspark"]),
    ("Hadoop", Tech, &[]),
    ("Airflow", Tech, &["apache airflow"]),
    ("ETL", Tech, &[]),
    ("Data Modeling", Tech, &["data modelling"]),
    ("Data Analysis", Tech, &["data analytics"]),
    ("Data Visualization", Tech, &["data visualisation"]),
    ("Tableau", Tech, &[]),
    ("Power BI", Tech, &["powerbi"]),
    ("Machine Learning", Tech, &["ml"]),
    ("Deep Learning", Tech, &[]),
    ("Natural Language Processing", Tech, &["nlp"]),
    ("Computer Vision", Tech, &[]),
    ("TensorFlow", Tech, &[]),
    ("PyTorch", Tech, &[]),
    ("scikit-learn", Tech, &["sklearn"]),
    ("Pandas", Tech, &[]),
    ("NumPy", Tech, &[]),
    // Testing and process
    ("Unit Testing", Tech, &["unit tests"]),
    ("Test-Driven Development", Tech, &["tdd"]),
    ("Jest", Tech, &[]),
    ("Pytest", Tech, &[]),
    ("JUnit", Tech, &[]),
    ("Selenium", Tech, &[]),
    ("Cypress", Tech, &[]),
    ("Agile", Tech, &[]),
    ("Scrum", Tech, &[]),
    ("Kanban", Tech, &[]),
    ("Jira", Tech, &[]),
    ("Figma", Tech, &[]),
    // Soft skills
    ("Leadership", Soft, &["team leadership"]),
    ("Communication", Soft, &["communication skills"]),
    ("Teamwork", Soft, &["team player"]),
    ("Collaboration", Soft, &["cross-functional collaboration"]),
    ("Problem Solving", Soft, &["problem-solving"]),
    ("Critical Thinking", Soft, &[]),
    ("Analytical Thinking", Soft, &["analytical skills"]),
    ("Time Management", Soft, &[]),
    ("Project Management", Soft, &[]),
    ("Stakeholder Management", Soft, &[]),
    ("Mentoring", Soft, &["mentorship", "coaching"]),
    ("Adaptability", Soft, &[]),
    ("Creativity", Soft, &[]),
    ("Negotiation", Soft, &[]),
    ("Public Speaking", Soft, &["presentation skills"]),
    ("Attention to Detail", Soft, &["detail oriented"]),
    ("Conflict Resolution", Soft, &[]),
    ("Decision Making", Soft, &[]),
    ("Emotional Intelligence", Soft, &[]),
    ("Customer Service", Soft, &[]),
    // Certifications
    ("AWS Certified Solutions Architect", Cert, &["aws solutions architect"]),
    ("Certified Kubernetes Administrator", Cert, &["cka"]),
    ("PMP", Cert, &["project management professional"]),
    ("Certified ScrumMaster", Cert, &["csm", "certified scrum master"]),
    ("CISSP", Cert, &[]),
    ("CompTIA Security+", Cert, &["security+"]),
    ("CompTIA A+", Cert, &[]),
    ("CCNA", Cert, &[]),
    ("CEH", Cert, &["certified ethical hacker"]),
    ("OSCP", Cert, &[]),
    ("ITIL", Cert, &[]),
    ("Six Sigma", Cert, &["lean six sigma"]),
    ("CPA", Cert, &["certified public accountant"]),
    ("CFA", Cert, &[]),
    ("Azure Fundamentals", Cert, &["az-900"]),
    ("Google Cloud Professional", Cert, &["professional cloud architect"]),
    ("Terraform Associate", Cert, &[]),
];
