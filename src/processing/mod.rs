//! Text processing and analysis module

pub mod analyzer;
pub mod document;
pub mod formatting;
pub mod keyword_matcher;
pub mod scoring;
pub mod skill_extractor;
pub mod suggestions;
pub mod taxonomy;
pub mod text_processor;
