//! Composite ATS score

use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};

pub const FORMATTING_WEIGHT: f64 = 0.3;
pub const KEYWORD_WEIGHT: f64 = 0.4;
pub const STRUCTURE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub formatting: f64,
    pub keywords: f64,
    pub structure: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            formatting: FORMATTING_WEIGHT,
            keywords: KEYWORD_WEIGHT,
            structure: STRUCTURE_WEIGHT,
        }
    }
}

impl From<&ScoringConfig> for ScoreWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            formatting: config.formatting_weight,
            keywords: config.keyword_weight,
            structure: config.structure_weight,
        }
    }
}

/// The three component scores and their weighted composite, all 0 to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub formatting: u8,
    pub keywords: u8,
    pub structure: u8,
    #[serde(skip)]
    pub composite: u8,
}

pub struct ScoreAggregator {
    weights: ScoreWeights,
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl ScoreAggregator {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Weighted sum in exact thousandths, rounded half up
    pub fn composite(&self, formatting: u8, keywords: u8, structure: u8) -> u8 {
        let w = &self.weights;
        let raw = millis(w.formatting) * u32::from(formatting)
            + millis(w.keywords) * u32::from(keywords)
            + millis(w.structure) * u32::from(structure);
        ((raw + 500) / 1000).min(100) as u8
    }

    pub fn aggregate(&self, formatting: u8, keywords: u8, structure: u8) -> ScoreBreakdown {
        let formatting = formatting.min(100);
        let keywords = keywords.min(100);
        let structure = structure.min(100);

        ScoreBreakdown {
            formatting,
            keywords,
            structure,
            composite: self.composite(formatting, keywords, structure),
        }
    }
}

fn millis(weight: f64) -> u32 {
    (weight.clamp(0.0, 1.0) * 1000.0).round() as u32
}
