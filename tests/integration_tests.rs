//! Integration tests for the ATS analyzer

mod common;

use ats_analyzer::config::OutputFormat;
use ats_analyzer::input::text_extractor::DefaultExtractor;
use ats_analyzer::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use ats_analyzer::processing::analyzer::PipelineState;
use ats_analyzer::processing::suggestions::Priority;
use ats_analyzer::{
    AnalysisEngine, AnalyzerError, CancelHandle, Config, DocumentFormat, ErrorKind, ProgressStage,
    SourceDocument,
};
use common::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_resume_matched_against_job_description() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let job = sample_job();

    let report = engine.submit(sample_resume(), Some(&job)).await.unwrap();
    let keywords = report.keyword_matching();

    assert_eq!(keywords.matched, vec!["React", "Leadership"]);
    assert_eq!(keywords.missing, vec!["Kubernetes"]);
    assert!(keywords.additional.contains(&"TypeScript".to_string()));
    for name in ["React", "Leadership", "Kubernetes"] {
        assert!(!keywords.additional.contains(&name.to_string()));
    }

    assert!(report.skills().technical.contains(&"Redux".to_string()));
    assert!(report.skills().soft.contains(&"Communication".to_string()));
    assert_eq!(report.skills().certifications, vec!["Certified ScrumMaster"]);
    assert!(report.summary().ends_with("Matched 2 of 3 job keywords."));
    assert!(report
        .improvements()
        .iter()
        .any(|i| i.title == "Add missing keywords"));
}

#[tokio::test]
async fn test_without_job_description_uses_density() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));

    let report = engine.submit(sample_resume(), None).await.unwrap();
    let keywords = report.keyword_matching();
    let skills = report.skills();

    assert!(keywords.matched.is_empty());
    assert!(keywords.missing.is_empty());

    let additional: HashSet<&String> = keywords.additional.iter().collect();
    let extracted: HashSet<&String> = skills.technical.iter().chain(skills.soft.iter()).collect();
    assert_eq!(additional, extracted);
    assert!(report.score_breakdown().keywords > 0);
    assert!(!report.summary().contains("job keywords"));
}

#[tokio::test]
async fn test_oversized_document_never_reaches_extractor() {
    let extractor = Arc::new(CountingExtractor::default());
    let engine = engine_with(extractor.clone());
    let recorder = Arc::new(Recorder::default());

    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(11 * 1024 * 1024, b' ');
    let document = SourceDocument::new(bytes, DocumentFormat::Pdf);

    let err = engine
        .submit_with(document, None, recorder.clone(), CancelHandle::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    assert_eq!(extractor.calls(), 0);
    assert_eq!(
        recorder.transitions(),
        vec![(PipelineState::Uploaded, PipelineState::Failed(ErrorKind::FileTooLarge))]
    );
    assert!(recorder.stages().is_empty());
}

#[tokio::test]
async fn test_resume_without_headings_gets_high_priority_fix() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let prose = "Jane Doe\n\
        jane.doe@example.com\n\
        I have spent eight years building web applications with React and TypeScript for product teams.\n\
        Before that I studied computer science and worked on accessibility tooling at a small studio.\n\
        I enjoy mentoring newer engineers and reviewing code with care and patience.";

    let report = engine.submit(docx_document(prose), None).await.unwrap();

    assert!(report.score_breakdown().structure < 100);
    assert!(report.score_breakdown().formatting < 100);

    let first = &report.improvements()[0];
    assert_eq!(first.priority, Priority::High);
    assert!(report
        .improvements()
        .iter()
        .any(|i| i.priority == Priority::High && i.title == "Add standard section headings"));
}

#[tokio::test]
async fn test_corrupt_docx_fails_in_parsing() {
    let extractor = Arc::new(CountingExtractor::default());
    let engine = engine_with(extractor.clone());
    let recorder = Arc::new(Recorder::default());

    let mut bytes = docx_bytes(&["Experience", "Built things"]);
    bytes.truncate(bytes.len() / 2);
    let document = SourceDocument::new(bytes, DocumentFormat::Docx);

    let err = engine
        .submit_with(document, None, recorder.clone(), CancelHandle::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptDocument);
    assert_eq!(extractor.calls(), 1);
    assert_eq!(
        recorder.transitions().last(),
        Some(&(PipelineState::Parsing, PipelineState::Failed(ErrorKind::CorruptDocument)))
    );
    assert!(!recorder.visited(PipelineState::Extracting));
    assert_eq!(recorder.stages(), vec![ProgressStage::Parsing]);
}

#[tokio::test]
async fn test_blank_document_is_empty_not_zero() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let document = SourceDocument::new(docx_bytes(&["", "   ", ""]), DocumentFormat::Docx);

    let err = engine.submit(document, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyDocument);
}

#[tokio::test]
async fn test_scores_stay_in_range() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let job = sample_job();
    let documents = vec![
        sample_resume(),
        docx_document("Rust"),
        docx_document("SKILLS\nRust, Go lang, Docker, Kubernetes, AWS, Terraform, Python, SQL"),
        docx_document(&"word ".repeat(3000)),
    ];

    for document in documents {
        for jd in [None, Some(job.as_str()), Some("nothing relevant here")] {
            let report = engine.submit(document.clone(), jd).await.unwrap();
            let breakdown = report.score_breakdown();
            assert!(report.ats_score() <= 100);
            assert!(breakdown.formatting <= 100);
            assert!(breakdown.keywords <= 100);
            assert!(breakdown.structure <= 100);
            assert!(report.improvements().len() <= 5);
        }
    }
}

#[tokio::test]
async fn test_job_description_without_known_skills_scores_zero_keywords() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));

    let report = engine
        .submit(sample_resume(), Some("We want someone friendly who likes gardening."))
        .await
        .unwrap();

    assert_eq!(report.score_breakdown().keywords, 0);
    assert!(report.keyword_matching().matched.is_empty());
    assert!(report.keyword_matching().missing.is_empty());
    assert!(report.summary().ends_with("Matched 0 of 0 job keywords."));
}

#[tokio::test]
async fn test_repeated_analysis_is_deterministic() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let job = sample_job();

    let first = engine.submit(sample_resume(), Some(&job)).await.unwrap();
    let second = engine.submit(sample_resume(), Some(&job)).await.unwrap();

    assert_ne!(first.analysis_id(), second.analysis_id());
    assert_eq!(first.score_breakdown(), second.score_breakdown());
    assert_eq!(first.skills(), second.skills());
    assert_eq!(first.keyword_matching(), second.keyword_matching());
    assert_eq!(first.improvements(), second.improvements());
}

#[tokio::test]
async fn test_concurrent_analyses_share_engine() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let job = sample_job();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let job = job.clone();
            tokio::spawn(async move { engine.submit(sample_resume(), Some(&job)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    let mut scores = HashSet::new();
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        ids.insert(report.analysis_id());
        scores.insert(report.ats_score());
    }

    assert_eq!(ids.len(), 8);
    assert_eq!(scores.len(), 1);
}

#[tokio::test]
async fn test_timeout_discards_work() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine_with(Arc::new(SlowExtractor::new(Duration::from_millis(500))))
        .with_timeout(Duration::from_millis(50));

    let started = Instant::now();
    let err = engine
        .submit_with(sample_resume(), None, recorder.clone(), CancelHandle::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::Timeout(_)));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(!recorder.visited(PipelineState::Complete));
}

#[tokio::test]
async fn test_cancellation_returns_promptly() {
    let engine = engine_with(Arc::new(SlowExtractor::new(Duration::from_millis(500))));
    let cancel = CancelHandle::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = engine
        .submit_with(sample_resume(), None, Arc::new(Recorder::default()), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::Cancelled));
    assert_eq!(err.kind(), ErrorKind::InternalFailure);
    assert_eq!(err.to_string(), "analysis cancelled");
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_cancelling_one_analysis_leaves_others_running() {
    let engine = engine_with(Arc::new(SlowExtractor::new(Duration::from_millis(100))));
    let cancel = CancelHandle::new();
    cancel.cancel();

    let cancelled = engine.submit_with(
        sample_resume(),
        None,
        Arc::new(Recorder::default()),
        cancel,
    );
    let normal = engine.submit(sample_resume(), None);
    let (cancelled, normal) = tokio::join!(cancelled, normal);

    assert!(matches!(cancelled, Err(AnalyzerError::Cancelled)));
    assert!(normal.is_ok());
}

#[tokio::test]
async fn test_progress_stages_in_order() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressStage>();

    engine
        .submit_with(sample_resume(), None, Arc::new(tx), CancelHandle::new())
        .await
        .unwrap();

    let mut stages = Vec::new();
    while let Ok(stage) = rx.try_recv() {
        stages.push(stage);
    }
    assert_eq!(
        stages,
        vec![ProgressStage::Parsing, ProgressStage::Analyzing, ProgressStage::Generating]
    );
}

#[tokio::test]
async fn test_unsupported_upload_is_rejected() {
    let err = SourceDocument::from_path(Path::new("tests/fixtures/sample_resume.txt"), 1024)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFileType);

    assert_eq!(
        DocumentFormat::from_mime("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            .unwrap(),
        DocumentFormat::Docx
    );
    assert_eq!(
        DocumentFormat::from_mime("text/plain").unwrap_err().kind(),
        ErrorKind::InvalidFileType
    );
}

#[tokio::test]
async fn test_missing_taxonomy_file() {
    let mut config = Config::default();
    config.taxonomy.path = Some("does/not/exist.toml".into());

    let err = AnalysisEngine::new(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::TaxonomyUnavailable);
}

#[tokio::test]
async fn test_custom_taxonomy_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taxonomy.toml");
    std::fs::write(
        &path,
        r#"
version = "2024.1"

[[skills]]
name = "React"
category = "technical"

[[skills]]
name = "Leadership"
category = "soft"
"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.taxonomy.path = Some(path);
    let engine = AnalysisEngine::new(config).unwrap();
    assert_eq!(engine.taxonomy().version(), "2024.1");

    let report = engine.submit(sample_resume(), None).await.unwrap();
    assert_eq!(report.skills().technical, vec!["React"]);
    assert_eq!(report.skills().soft, vec!["Leadership"]);
    assert!(report.skills().certifications.is_empty());
}

#[tokio::test]
async fn test_report_exports() {
    let engine = engine_with(Arc::new(DefaultExtractor::new()));
    let job = sample_job();
    let report = engine.submit(sample_resume(), Some(&job)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let generator = ReportGenerator::with_options(false, true);

    for format in [
        OutputFormat::Console,
        OutputFormat::Json,
        OutputFormat::Markdown,
        OutputFormat::Html,
        OutputFormat::Pdf,
    ] {
        let bytes = generator.generate_report(&report, &format).unwrap();
        let path = dir.path().join(suggest_filename(&format, "jane_doe.docx", false));
        save_report_to_file(&bytes, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    let json = std::fs::read(dir.path().join("jane_doe_ats_report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["atsScore"], report.ats_score());
    assert_eq!(value["keywordMatching"]["missing"][0], "Kubernetes");
    assert_eq!(value["summary"], report.summary());

    let pdf = std::fs::read(dir.path().join("jane_doe_ats_report.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.limits.timeout_secs = 5;
    config.output.format = OutputFormat::Json;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::write(&path, "[scoring]\nkeyword_weight = 0.9\n").unwrap();
    assert!(matches!(
        Config::load_from(&path),
        Err(AnalyzerError::Configuration(_))
    ));
}
