//! Analysis engine: runs one resume through extraction, scoring and
//! suggestion generation and hands back a finished report

use crate::config::Config;
use crate::error::{AnalyzerError, ErrorKind, Result};
use crate::input::source::SourceDocument;
use crate::input::text_extractor::{DefaultExtractor, DocumentExtractor};
use crate::output::report::AnalysisReport;
use crate::processing::formatting::FormattingAnalyzer;
use crate::processing::keyword_matcher::{JobDescription, KeywordMatcher};
use crate::processing::scoring::{ScoreAggregator, ScoreWeights};
use crate::processing::skill_extractor::SkillExtractor;
use crate::processing::suggestions::SuggestionEngine;
use crate::processing::taxonomy::SkillTaxonomy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Uploaded,
    Parsing,
    Extracting,
    Matching,
    Aggregating,
    Complete,
    Failed(ErrorKind),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed(_))
    }

    fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (from, Failed(_)) => !from.is_terminal(),
            (Uploaded, Parsing)
            | (Parsing, Extracting)
            | (Extracting, Matching)
            | (Matching, Aggregating)
            | (Aggregating, Complete) => true,
            _ => false,
        }
    }

    /// Progress stage announced when this state is entered
    fn progress_stage(&self) -> Option<ProgressStage> {
        match self {
            PipelineState::Parsing => Some(ProgressStage::Parsing),
            PipelineState::Extracting => Some(ProgressStage::Analyzing),
            PipelineState::Aggregating => Some(ProgressStage::Generating),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Uploaded => write!(f, "uploaded"),
            PipelineState::Parsing => write!(f, "parsing"),
            PipelineState::Extracting => write!(f, "extracting"),
            PipelineState::Matching => write!(f, "matching"),
            PipelineState::Aggregating => write!(f, "aggregating"),
            PipelineState::Complete => write!(f, "complete"),
            PipelineState::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

/// Coarse progress reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Parsing,
    Analyzing,
    Generating,
}

impl ProgressStage {
    pub fn name(&self) -> &'static str {
        match self {
            ProgressStage::Parsing => "parsing",
            ProgressStage::Analyzing => "analyzing",
            ProgressStage::Generating => "generating",
        }
    }
}

impl std::fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives progress notifications. Nothing an observer does can affect
/// the analysis.
pub trait ProgressObserver: Send + Sync {
    fn on_stage(&self, stage: ProgressStage);

    fn on_transition(&self, _from: PipelineState, _to: PipelineState) {}
}

impl ProgressObserver for mpsc::UnboundedSender<ProgressStage> {
    fn on_stage(&self, stage: ProgressStage) {
        // A closed receiver only means nobody is listening.
        let _ = self.send(stage);
    }
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_stage(&self, _stage: ProgressStage) {}
}

/// Cooperative cancellation shared between a caller and one analysis
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// State machine for a single request
pub struct Pipeline {
    state: PipelineState,
    history: Vec<PipelineState>,
    observer: Arc<dyn ProgressObserver>,
}

impl Pipeline {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            state: PipelineState::Uploaded,
            history: vec![PipelineState::Uploaded],
            observer,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, starting with `Uploaded`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn advance(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(AnalyzerError::InternalFailure(format!(
                "illegal pipeline transition {} -> {}",
                self.state, next
            )));
        }

        let from = self.state;
        self.state = next;
        self.history.push(next);
        log::info!("Analysis pipeline: {} -> {}", from, next);

        self.observer.on_transition(from, next);
        if let Some(stage) = next.progress_stage() {
            self.observer.on_stage(stage);
        }
        Ok(())
    }

    /// Move to `Failed`. A pipeline that already finished stays where it is.
    pub fn fail(&mut self, kind: ErrorKind) {
        if self.state.is_terminal() {
            log::warn!("Ignoring failure {} after pipeline reached {}", kind, self.state);
            return;
        }
        let _ = self.advance(PipelineState::Failed(kind));
    }
}

/// Immutable per-engine components shared by every request
struct Stages {
    skills: SkillExtractor,
    formatting: FormattingAnalyzer,
    keywords: KeywordMatcher,
    scoring: ScoreAggregator,
    suggestions: SuggestionEngine,
}

/// Entry point for analyses. Cheap to clone; clones share the taxonomy,
/// configuration and extractor.
#[derive(Clone)]
pub struct AnalysisEngine {
    config: Arc<Config>,
    taxonomy: Arc<SkillTaxonomy>,
    extractor: Arc<dyn DocumentExtractor>,
    stages: Arc<Stages>,
    timeout: Duration,
}

impl AnalysisEngine {
    /// Build an engine with the configured taxonomy and the PDF/DOCX extractor
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let taxonomy = SkillTaxonomy::from_config(&config.taxonomy)?;
        if taxonomy.is_empty() {
            return Err(AnalyzerError::TaxonomyUnavailable(
                "taxonomy contains no skills".to_string(),
            ));
        }

        log::info!(
            "Loaded skill taxonomy v{} with {} entries",
            taxonomy.version(),
            taxonomy.len()
        );

        let extractor = DefaultExtractor::with_max_inflated_bytes(config.limits.max_inflated_bytes);
        Ok(Self::with_components(config, Arc::new(taxonomy), Arc::new(extractor)))
    }

    pub fn with_components(
        config: Config,
        taxonomy: Arc<SkillTaxonomy>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        let stages = Stages {
            skills: SkillExtractor::new(taxonomy.clone()),
            formatting: FormattingAnalyzer::new(config.formatting.clone()),
            keywords: KeywordMatcher::new(config.scoring.density_target),
            scoring: ScoreAggregator::new(ScoreWeights::from(&config.scoring)),
            suggestions: SuggestionEngine::new(config.suggestions.clone()),
        };

        Self {
            timeout: config.timeout(),
            config: Arc::new(config),
            taxonomy,
            extractor,
            stages: Arc::new(stages),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn submit(
        &self,
        document: SourceDocument,
        job_description: Option<&str>,
    ) -> Result<AnalysisReport> {
        self.submit_with(document, job_description, Arc::new(NoopObserver), CancelHandle::new())
            .await
    }

    /// Analyze `document`, reporting progress to `observer`.
    ///
    /// Size and format are checked before any parsing. The rest runs on a
    /// blocking worker bounded by the engine timeout. Cancelling `cancel`
    /// returns `AnalyzerError::Cancelled` right away and the worker stops
    /// at its next stage boundary.
    pub async fn submit_with(
        &self,
        document: SourceDocument,
        job_description: Option<&str>,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancelHandle,
    ) -> Result<AnalysisReport> {
        let mut pipeline = Pipeline::new(observer);

        if let Err(e) = document.validate(self.config.limits.max_document_bytes) {
            log::warn!(
                "Rejected '{}': {}",
                document.name().unwrap_or("upload"),
                e
            );
            pipeline.fail(e.kind());
            return Err(e);
        }

        let request = Request {
            engine: self.clone(),
            document,
            job_description: job_description.map(str::to_string),
            cancel: cancel.clone(),
            deadline: Instant::now() + self.timeout,
        };
        let worker = tokio::task::spawn_blocking(move || request.run(pipeline));

        tokio::select! {
            joined = tokio::time::timeout(self.timeout, worker) => match joined {
                Ok(result) => result?,
                Err(_) => {
                    log::warn!("Analysis exceeded {:?}", self.timeout);
                    Err(AnalyzerError::Timeout(self.timeout))
                }
            },
            _ = cancel.cancelled() => {
                log::info!("Analysis cancelled by caller");
                Err(AnalyzerError::Cancelled)
            }
        }
    }
}

/// One analysis as executed on the blocking worker
struct Request {
    engine: AnalysisEngine,
    document: SourceDocument,
    job_description: Option<String>,
    cancel: CancelHandle,
    deadline: Instant,
}

impl Request {
    fn run(self, mut pipeline: Pipeline) -> Result<AnalysisReport> {
        let started = Instant::now();
        match self.execute(&mut pipeline) {
            Ok(report) => {
                log::info!(
                    "Analysis {} complete in {}ms (score {})",
                    report.analysis_id(),
                    started.elapsed().as_millis(),
                    report.ats_score()
                );
                Ok(report)
            }
            Err(e) => {
                pipeline.fail(e.kind());
                Err(e)
            }
        }
    }

    fn execute(&self, pipeline: &mut Pipeline) -> Result<AnalysisReport> {
        let stages = &self.engine.stages;

        self.checkpoint()?;
        pipeline.advance(PipelineState::Parsing)?;
        let text = self.engine.extractor.extract(&self.document)?;
        log::debug!(
            "Extracted {} words in {} segments",
            text.word_count(),
            text.segments().len()
        );

        self.checkpoint()?;
        pipeline.advance(PipelineState::Extracting)?;
        let skills = stages.skills.extract(&text);
        let assessment = stages.formatting.analyze(&text);

        self.checkpoint()?;
        pipeline.advance(PipelineState::Matching)?;
        let job = self.job_description.as_deref().map(|jd| {
            JobDescription::parse(
                jd,
                &self.engine.taxonomy,
                self.engine.config.limits.max_job_description_chars,
            )
        });
        let keywords = stages.keywords.match_skills(&skills, job.as_ref());

        self.checkpoint()?;
        pipeline.advance(PipelineState::Aggregating)?;
        let breakdown = stages
            .scoring
            .aggregate(assessment.formatting, keywords.score, assessment.structure);
        let improvements = stages.suggestions.suggest(&text, &skills, &keywords, &assessment);
        let report = AnalysisReport::new(breakdown, &skills, &keywords, improvements);

        self.checkpoint()?;
        pipeline.advance(PipelineState::Complete)?;
        Ok(report)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(AnalyzerError::Cancelled);
        }
        if Instant::now() >= self.deadline {
            return Err(AnalyzerError::Timeout(self.engine.timeout));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<ProgressStage>>,
        transitions: Mutex<Vec<(PipelineState, PipelineState)>>,
    }

    impl ProgressObserver for Recorder {
        fn on_stage(&self, stage: ProgressStage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_transition(&self, from: PipelineState, to: PipelineState) {
            self.transitions.lock().unwrap().push((from, to));
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = Pipeline::new(recorder.clone());

        for state in [
            PipelineState::Parsing,
            PipelineState::Extracting,
            PipelineState::Matching,
            PipelineState::Aggregating,
            PipelineState::Complete,
        ] {
            pipeline.advance(state).unwrap();
        }

        assert_eq!(pipeline.state(), PipelineState::Complete);
        assert_eq!(pipeline.history().len(), 6);
        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![ProgressStage::Parsing, ProgressStage::Analyzing, ProgressStage::Generating]
        );
    }

    #[test]
    fn test_illegal_transition_is_internal_failure() {
        let mut pipeline = Pipeline::new(Arc::new(NoopObserver));
        let err = pipeline.advance(PipelineState::Matching).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalFailure);
        assert_eq!(pipeline.state(), PipelineState::Uploaded);
    }

    #[test]
    fn test_failed_is_reachable_and_terminal() {
        let mut pipeline = Pipeline::new(Arc::new(NoopObserver));
        pipeline.advance(PipelineState::Parsing).unwrap();
        pipeline.fail(ErrorKind::CorruptDocument);

        assert_eq!(pipeline.state(), PipelineState::Failed(ErrorKind::CorruptDocument));
        assert!(pipeline.advance(PipelineState::Extracting).is_err());

        pipeline.fail(ErrorKind::Timeout);
        assert_eq!(pipeline.state(), PipelineState::Failed(ErrorKind::CorruptDocument));
    }

    #[test]
    fn test_complete_cannot_fail() {
        let mut pipeline = Pipeline::new(Arc::new(NoopObserver));
        for state in [
            PipelineState::Parsing,
            PipelineState::Extracting,
            PipelineState::Matching,
            PipelineState::Aggregating,
            PipelineState::Complete,
        ] {
            pipeline.advance(state).unwrap();
        }
        pipeline.fail(ErrorKind::Timeout);
        assert_eq!(pipeline.state(), PipelineState::Complete);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ProgressStage::Parsing.name(), "parsing");
        assert_eq!(ProgressStage::Analyzing.to_string(), "analyzing");
        assert_eq!(
            serde_json::to_string(&ProgressStage::Generating).unwrap(),
            "\"generating\""
        );
    }

    #[test]
    fn test_closed_channel_observer_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressStage>();
        drop(rx);
        tx.on_stage(ProgressStage::Parsing);
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let cancel = CancelHandle::new();
        let waiter = {
            let cancel = cancel.clone();
            tokio::spawn(async move { cancel.cancelled().await })
        };
        tokio::task::yield_now().await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_before_wait_returns_immediately() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        cancel.cancelled().await;
    }
}
