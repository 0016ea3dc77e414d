//! Report export: console, JSON, Markdown, HTML and PDF renderings of the
//! same report fields

use crate::config::OutputFormat;
use crate::error::{AnalyzerError, Result};
use crate::output::report::{AnalysisReport, KeywordMatching, ScoreLabel, SkillsSummary};
use crate::processing::scoring::ScoreBreakdown;
use crate::processing::suggestions::Priority;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Renders a report into one output format
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// A4 pages in the built-in Helvetica font
pub struct PdfFormatter {
    font_size: f32,
}

/// Dispatches a report to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    pdf_formatter: PdfFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ATS Resume Analysis</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
        }
        .score-badge {
            display: inline-block;
            padding: 8px 16px;
            border-radius: 20px;
            font-weight: bold;
            color: white;
            margin-left: 10px;
        }
        .score-excellent { background: #28a745; }
        .score-good { background: #17a2b8; }
        .score-poor { background: #dc3545; }
        .section { margin: 25px 0; }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        .score-breakdown {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 15px;
            margin: 20px 0;
        }
        .score-item {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
            border-left: 4px solid #007acc;
        }
        .improvement {
            background: white;
            padding: 15px;
            margin: 10px 0;
            border-radius: 6px;
            border-left: 4px solid #17a2b8;
        }
        .priority-high { border-left-color: #dc3545; }
        .priority-medium { border-left-color: #ffc107; }
        .priority-low { border-left-color: #28a745; }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>ATS Resume Analysis</h1>
            <h2>{{ ats_score }}/100 <span class="score-badge {{ score_class }}">{{ score_label }}</span></h2>
        </div>

        <div class="section">
            <h2>Summary</h2>
            <p>{{ summary }}</p>
            <div class="score-breakdown">
                <div class="score-item"><h4>Formatting</h4><p><strong>{{ breakdown.formatting }}</strong>/100</p></div>
                <div class="score-item"><h4>Keywords</h4><p><strong>{{ breakdown.keywords }}</strong>/100</p></div>
                <div class="score-item"><h4>Structure</h4><p><strong>{{ breakdown.structure }}</strong>/100</p></div>
            </div>
        </div>

        {% if !improvements.is_empty() %}
        <div class="section">
            <h2>Improvements</h2>
            {% for improvement in improvements %}
            <div class="improvement priority-{{ improvement.priority }}">
                <h4>[{{ improvement.priority }}] {{ improvement.title }}</h4>
                <p>{{ improvement.description }}</p>
            </div>
            {% endfor %}
        </div>
        {% endif %}

        <div class="section">
            <h2>Skills</h2>
            <p><strong>Technical:</strong> {{ skills.technical.join(", ") }}</p>
            <p><strong>Soft:</strong> {{ skills.soft.join(", ") }}</p>
            <p><strong>Certifications:</strong> {{ skills.certifications.join(", ") }}</p>
        </div>

        <div class="section">
            <h2>Keyword Matching</h2>
            <p><strong>Matched:</strong> {{ keywords.matched.join(", ") }}</p>
            <p><strong>Missing:</strong> {{ keywords.missing.join(", ") }}</p>
            <p><strong>Additional:</strong> {{ keywords.additional.join(", ") }}</p>
        </div>

        <div class="metadata">
            <p><strong>Analysis:</strong> {{ analysis_id }} | <strong>Created:</strong> {{ created_at }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate<'a> {
    include_styles: bool,
    analysis_id: String,
    created_at: String,
    ats_score: u8,
    score_class: &'static str,
    score_label: &'static str,
    summary: &'a str,
    breakdown: &'a ScoreBreakdown,
    skills: &'a SkillsSummary,
    keywords: &'a KeywordMatching,
    improvements: Vec<HtmlImprovement<'a>>,
}

struct HtmlImprovement<'a> {
    priority: &'static str,
    title: &'a str,
    description: &'a str,
}

fn priority_name(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

fn timestamp(report: &AnalysisReport) -> String {
    report.created_at().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let label = ScoreLabel::from_score(score);
        let color = match label {
            ScoreLabel::Excellent => Color::Green,
            ScoreLabel::Good => Color::Yellow,
            ScoreLabel::NeedsImprovement => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", label.as_str().to_uppercase().color(color).bold())
        } else {
            format!("[{}]", label.as_str().to_uppercase())
        }
    }

    fn format_priority(&self, priority: Priority) -> String {
        let color = match priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        self.colorize(&format!("[{}]", priority_name(priority).to_uppercase()), color)
    }

    fn render(&self, report: &AnalysisReport) -> String {
        let mut output = String::new();

        output.push_str(&self.format_header("ATS RESUME ANALYSIS", 1));
        output.push_str(&format!(
            "ATS Score: {}/100 {}\n",
            report.ats_score(),
            self.format_score_badge(report.ats_score())
        ));
        output.push_str(&format!("{}\n", self.colorize(report.summary(), Color::Cyan)));

        let breakdown = report.score_breakdown();
        output.push_str(&self.format_header("Score Breakdown", 2));
        output.push_str(&format!("Formatting: {:>3}/100\n", breakdown.formatting));
        output.push_str(&format!("Keywords:   {:>3}/100\n", breakdown.keywords));
        output.push_str(&format!("Structure:  {:>3}/100\n", breakdown.structure));

        if !report.improvements().is_empty() {
            output.push_str(&self.format_header("Improvements", 2));
            for (i, improvement) in report.improvements().iter().enumerate() {
                output.push_str(&format!(
                    "{}. {} {}\n",
                    i + 1,
                    self.format_priority(improvement.priority),
                    improvement.title
                ));
                output.push_str(&format!("   {}\n", improvement.description));
            }
        }

        let keywords = report.keyword_matching();
        output.push_str(&self.format_header("Keyword Matching", 2));
        output.push_str(&format!(
            "Matched:    {}\n",
            self.colorize(&list_or_none(&keywords.matched), Color::Green)
        ));
        output.push_str(&format!(
            "Missing:    {}\n",
            self.colorize(&list_or_none(&keywords.missing), Color::Red)
        ));
        output.push_str(&format!("Additional: {}\n", list_or_none(&keywords.additional)));

        if self.detailed {
            let skills = report.skills();
            output.push_str(&self.format_header("Skills", 3));
            output.push_str(&format!("Technical:      {}\n", list_or_none(&skills.technical)));
            output.push_str(&format!("Soft:           {}\n", list_or_none(&skills.soft)));
            output.push_str(&format!("Certifications: {}\n", list_or_none(&skills.certifications)));

            output.push_str(&format!(
                "\nAnalysis {} | {}\n",
                report.analysis_id(),
                timestamp(report)
            ));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        Ok(self.render(report).into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        if self.pretty {
            Ok(serde_json::to_vec_pretty(report)?)
        } else {
            Ok(serde_json::to_vec(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(score: u8) -> &'static str {
        match ScoreLabel::from_score(score) {
            ScoreLabel::Excellent => "🟢",
            ScoreLabel::Good => "🟡",
            ScoreLabel::NeedsImprovement => "🔴",
        }
    }

    fn render(&self, report: &AnalysisReport) -> String {
        let mut output = String::new();

        output.push_str("# ATS Resume Analysis\n\n");
        if self.include_metadata {
            output.push_str(&format!(
                "**Analysis:** `{}` | **Created:** {}\n\n",
                report.analysis_id(),
                timestamp(report)
            ));
        }

        output.push_str(&format!(
            "**ATS Score:** {}/100 {} {}\n\n",
            report.ats_score(),
            Self::markdown_score_badge(report.ats_score()),
            report.score_label()
        ));
        output.push_str(&format!("{}\n\n", report.summary()));

        let breakdown = report.score_breakdown();
        output.push_str("## Score Breakdown\n\n");
        output.push_str("| Component | Score |\n|---|---|\n");
        output.push_str(&format!("| Formatting | {} |\n", breakdown.formatting));
        output.push_str(&format!("| Keywords | {} |\n", breakdown.keywords));
        output.push_str(&format!("| Structure | {} |\n\n", breakdown.structure));

        if !report.improvements().is_empty() {
            output.push_str("## Improvements\n\n");
            for (i, improvement) in report.improvements().iter().enumerate() {
                output.push_str(&format!(
                    "{}. **{}** ({} priority)\n   {}\n",
                    i + 1,
                    improvement.title,
                    priority_name(improvement.priority),
                    improvement.description
                ));
            }
            output.push('\n');
        }

        let skills = report.skills();
        output.push_str("## Skills\n\n");
        output.push_str(&format!("- **Technical:** {}\n", list_or_none(&skills.technical)));
        output.push_str(&format!("- **Soft:** {}\n", list_or_none(&skills.soft)));
        output.push_str(&format!(
            "- **Certifications:** {}\n\n",
            list_or_none(&skills.certifications)
        ));

        let keywords = report.keyword_matching();
        output.push_str("## Keyword Matching\n\n");
        output.push_str(&format!("- **Matched:** {}\n", list_or_none(&keywords.matched)));
        output.push_str(&format!("- **Missing:** {}\n", list_or_none(&keywords.missing)));
        output.push_str(&format!("- **Additional:** {}\n", list_or_none(&keywords.additional)));

        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        Ok(self.render(report).into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data<'a>(&self, report: &'a AnalysisReport) -> HtmlTemplate<'a> {
        let label = report.score_label();
        let score_class = match label {
            ScoreLabel::Excellent => "score-excellent",
            ScoreLabel::Good => "score-good",
            ScoreLabel::NeedsImprovement => "score-poor",
        };

        HtmlTemplate {
            include_styles: self.include_styles,
            analysis_id: report.analysis_id().to_string(),
            created_at: timestamp(report),
            ats_score: report.ats_score(),
            score_class,
            score_label: label.as_str(),
            summary: report.summary(),
            breakdown: report.score_breakdown(),
            skills: report.skills(),
            keywords: report.keyword_matching(),
            improvements: report
                .improvements()
                .iter()
                .map(|i| HtmlImprovement {
                    priority: priority_name(i.priority),
                    title: &i.title,
                    description: &i.description,
                })
                .collect(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        let html = self
            .create_template_data(report)
            .render()
            .map_err(|e| AnalyzerError::OutputFormatting(e.to_string()))?;
        Ok(html.into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const WRAP_COLUMNS: usize = 90;

impl PdfFormatter {
    pub fn new(font_size: f32) -> Self {
        Self { font_size }
    }

    /// Plain ASCII lines; the built-in fonts cannot encode anything else
    fn lines(report: &AnalysisReport) -> Vec<String> {
        let mut lines = vec![
            "ATS RESUME ANALYSIS".to_string(),
            String::new(),
            format!("ATS Score: {}/100 ({})", report.ats_score(), report.score_label()),
            format!("Created: {}", timestamp(report)),
            String::new(),
        ];
        lines.extend(wrap(report.summary(), WRAP_COLUMNS));

        let breakdown = report.score_breakdown();
        lines.push(String::new());
        lines.push("SCORE BREAKDOWN".to_string());
        lines.push(format!("Formatting: {}/100", breakdown.formatting));
        lines.push(format!("Keywords: {}/100", breakdown.keywords));
        lines.push(format!("Structure: {}/100", breakdown.structure));

        if !report.improvements().is_empty() {
            lines.push(String::new());
            lines.push("IMPROVEMENTS".to_string());
            for (i, improvement) in report.improvements().iter().enumerate() {
                lines.push(format!(
                    "{}. [{}] {}",
                    i + 1,
                    priority_name(improvement.priority).to_uppercase(),
                    improvement.title
                ));
                lines.extend(wrap(&improvement.description, WRAP_COLUMNS - 3).into_iter().map(|l| format!("   {}", l)));
            }
        }

        let skills = report.skills();
        let keywords = report.keyword_matching();
        lines.push(String::new());
        lines.push("SKILLS".to_string());
        lines.extend(wrap(&format!("Technical: {}", list_or_none(&skills.technical)), WRAP_COLUMNS));
        lines.extend(wrap(&format!("Soft: {}", list_or_none(&skills.soft)), WRAP_COLUMNS));
        lines.extend(wrap(&format!("Certifications: {}", list_or_none(&skills.certifications)), WRAP_COLUMNS));
        lines.push(String::new());
        lines.push("KEYWORD MATCHING".to_string());
        lines.extend(wrap(&format!("Matched: {}", list_or_none(&keywords.matched)), WRAP_COLUMNS));
        lines.extend(wrap(&format!("Missing: {}", list_or_none(&keywords.missing)), WRAP_COLUMNS));
        lines.extend(wrap(&format!("Additional: {}", list_or_none(&keywords.additional)), WRAP_COLUMNS));

        lines.into_iter().map(|l| to_ascii(&l)).collect()
    }
}

impl OutputFormatter for PdfFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        use printpdf::{BuiltinFont, Mm, PdfDocument};

        fn pdf_error(e: impl std::fmt::Display) -> AnalyzerError {
            AnalyzerError::OutputFormatting(format!("PDF export failed: {}", e))
        }

        let (doc, page, layer) = PdfDocument::new(
            "ATS Resume Analysis",
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Report",
        );
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

        for line in Self::lines(report) {
            if y < MARGIN_MM {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Report");
                current = doc.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            if !line.is_empty() {
                current.use_text(line, self.font_size, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_HEIGHT_MM;
        }

        doc.save_to_bytes().map_err(pdf_error)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '•' => '-',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            '–' | '—' => '-',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(detailed),
            html_formatter: HtmlFormatter::new(true),
            pdf_formatter: PdfFormatter::new(11.0),
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
            OutputFormat::Pdf => self.pdf_formatter.format_report(report),
        }
    }

    /// Textual formats only; PDF has no terminal rendering
    pub fn generate_text(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<String> {
        if *format == OutputFormat::Pdf {
            return Err(AnalyzerError::OutputFormatting(
                "PDF output must be saved to a file".to_string(),
            ));
        }
        let bytes = self.generate_report(report, format)?;
        String::from_utf8(bytes).map_err(|e| AnalyzerError::OutputFormatting(e.to_string()))
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Pdf => "pdf",
    };
    format!("{}_ats_report{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::keyword_matcher::{KeywordMatchResult, KeywordScoreMethod};
    use crate::processing::scoring::ScoreAggregator;
    use crate::processing::skill_extractor::SkillSet;
    use crate::processing::suggestions::Improvement;
    use crate::processing::taxonomy::SkillCategory;

    fn sample_report() -> AnalysisReport {
        let mut skills = SkillSet::default();
        skills.insert("React", SkillCategory::Technical);
        skills.insert("TypeScript", SkillCategory::Technical);
        skills.insert("Leadership", SkillCategory::Soft);

        let keywords = KeywordMatchResult {
            matched: vec!["React".into(), "Leadership".into()],
            missing: vec!["Kubernetes".into()],
            additional: vec!["TypeScript".into()],
            job_keywords: vec!["React".into(), "Kubernetes".into(), "Leadership".into()],
            score: 67,
            method: KeywordScoreMethod::JobDescription,
        };

        AnalysisReport::new(
            ScoreAggregator::default().aggregate(85, 67, 80),
            &skills,
            &keywords,
            vec![Improvement {
                priority: Priority::High,
                title: "Add missing keywords".to_string(),
                description: "Work these job keywords into your resume: Kubernetes <k8s>".to_string(),
            }],
        )
    }

    #[test]
    fn test_console_without_colors() {
        let report = sample_report();
        let text = ReportGenerator::with_options(false, true)
            .generate_text(&report, &OutputFormat::Console)
            .unwrap();

        assert!(text.contains(&format!("ATS Score: {}/100", report.ats_score())));
        assert!(text.contains("[HIGH] Add missing keywords"));
        assert!(text.contains("Missing:    Kubernetes"));
        assert!(text.contains("Technical:      React, TypeScript"));
        assert!(!text.contains("\u{1b}["));
    }

    #[test]
    fn test_json_matches_report_fields() {
        let report = sample_report();
        let bytes = ReportGenerator::new()
            .generate_report(&report, &OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["atsScore"], report.ats_score());
        assert_eq!(value["analysisId"], report.analysis_id().to_string());
        assert_eq!(value["keywordMatching"]["matched"][1], "Leadership");
    }

    #[test]
    fn test_markdown_sections() {
        let text = ReportGenerator::new()
            .generate_text(&sample_report(), &OutputFormat::Markdown)
            .unwrap();

        assert!(text.starts_with("# ATS Resume Analysis"));
        assert!(text.contains("| Keywords | 67 |"));
        assert!(text.contains("1. **Add missing keywords** (high priority)"));
        assert!(text.contains("- **Missing:** Kubernetes"));
    }

    #[test]
    fn test_html_escapes_content() {
        let html = ReportGenerator::new()
            .generate_text(&sample_report(), &OutputFormat::Html)
            .unwrap();

        assert!(html.contains("<title>ATS Resume Analysis</title>"));
        assert!(html.contains("priority-high"));
        assert!(html.contains("Kubernetes &lt;k8s&gt;"));
        assert!(!html.contains("<k8s>"));
    }

    #[test]
    fn test_pdf_bytes() {
        let bytes = ReportGenerator::new()
            .generate_report(&sample_report(), &OutputFormat::Pdf)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_pdf_is_not_text() {
        let err = ReportGenerator::new()
            .generate_text(&sample_report(), &OutputFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::OutputFormatting(_)));
    }

    #[test]
    fn test_wrap_and_ascii() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("", 5), vec![""]);
        assert_eq!(to_ascii("• “Rust” – café"), "- \"Rust\" - caf?");
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(
            suggest_filename(&OutputFormat::Markdown, "/tmp/jane_doe.pdf", false),
            "jane_doe_ats_report.md"
        );
        assert!(suggest_filename(&OutputFormat::Pdf, "cv.docx", true).ends_with(".pdf"));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");
        save_report_to_file(b"{}", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }
}
