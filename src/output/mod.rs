//! Report structures and export formats

pub mod formatter;
pub mod report;
