//! Analysis orchestrator
//!
//! Drives one run through extraction, prompt rendering, inference and
//! validation. At most one run is in flight per orchestrator; every state
//! transition is tagged with the run id it belongs to and is dropped if that
//! run is no longer current.

use crate::config::{Config, Credentials};
use crate::error::{PreconditionViolation, Result, ResumeLensError};
use crate::input::document::Document;
use crate::input::text_extractor::DocumentTextExtractor;
use crate::llm::client::InferenceClient;
use crate::llm::prompts::{self, AnalysisRequest, PromptBuilder};
use crate::llm::validator::{AnalysisResult, ResponseValidator};
use crate::pipeline::state::{PipelineFailure, PipelineState, RunId, StateSnapshot};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// A validated result plus what the caller needs to present it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub run_id: RunId,
    pub result: AnalysisResult,
    pub resume_chars: usize,
    pub page_count: usize,
    /// Nothing could be extracted from the resume, so the model saw no text.
    pub low_confidence: bool,
    pub completed_at: DateTime<Utc>,
}

pub struct AnalysisOrchestrator {
    extractor: DocumentTextExtractor,
    prompt_builder: PromptBuilder,
    inference: InferenceClient,
    validator: ResponseValidator,
    credentials: Credentials,
    last_run: AtomicU64,
    state: watch::Sender<StateSnapshot>,
}

/// Returns the run to Idle if its future is dropped before it finished.
struct RunGuard<'a> {
    orchestrator: &'a AnalysisOrchestrator,
    run_id: RunId,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.orchestrator.release(self.run_id) {
            warn!("Analysis run {} was dropped before completing", self.run_id);
        }
    }
}

impl AnalysisOrchestrator {
    pub fn new(
        extractor: DocumentTextExtractor,
        inference: InferenceClient,
        credentials: Credentials,
    ) -> Self {
        let (state, _) = watch::channel(StateSnapshot::default());
        Self {
            extractor,
            prompt_builder: PromptBuilder::new(),
            inference,
            validator: ResponseValidator::new(),
            credentials,
            last_run: AtomicU64::new(0),
            state,
        }
    }

    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self> {
        let extractor = if config.extraction.headless {
            DocumentTextExtractor::headless()
        } else {
            DocumentTextExtractor::new()
        };
        let inference = InferenceClient::from_config(&config.inference)?;
        Ok(Self::new(extractor, inference, credentials))
    }

    /// Model the inference client is configured for.
    pub fn model(&self) -> &str {
        self.inference.model()
    }

    pub fn state(&self) -> PipelineState {
        self.state.borrow().state.clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    /// Detach the in-flight run, if any. Its eventual result is discarded.
    pub fn abandon(&self) -> Option<RunId> {
        let mut abandoned = None;
        self.state.send_if_modified(|snapshot| {
            if !snapshot.state.is_busy() {
                return false;
            }
            abandoned = snapshot.run_id;
            *snapshot = StateSnapshot::default();
            true
        });

        if let Some(run_id) = abandoned {
            info!("Abandoned analysis run {}", run_id);
        }
        abandoned
    }

    /// Run one analysis end to end.
    ///
    /// Precondition failures are returned without touching the state. Any
    /// later failure leaves the orchestrator in `Failed` with the error's kind.
    pub async fn submit_analysis(
        &self,
        document: Option<Document>,
        role_title: &str,
        role_description: &str,
    ) -> Result<AnalysisOutcome> {
        let document = document
            .ok_or(ResumeLensError::Precondition(PreconditionViolation::MissingDocument))?;
        let role_context = prompts::role_context(role_title, role_description)
            .ok_or(ResumeLensError::Precondition(PreconditionViolation::EmptyRoleContext))?;

        let run_id = self.begin_run()?;
        let mut guard = RunGuard {
            orchestrator: self,
            run_id,
            armed: true,
        };

        let outcome = self.run_pipeline(run_id, document, role_context).await;
        guard.armed = false;

        match outcome {
            Ok(outcome) => {
                info!("Analysis run {} succeeded with score {}", run_id, outcome.result.score);
                Ok(outcome)
            }
            Err(e) => {
                if !self.fail(run_id, &e) {
                    debug!("Discarding result of superseded run {}: {}", run_id, e);
                    return Err(ResumeLensError::Superseded(run_id));
                }
                error!("Analysis run {} failed: {}", run_id, e);
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        run_id: RunId,
        document: Document,
        role_context: String,
    ) -> Result<AnalysisOutcome> {
        info!("Analysis run {} started", run_id);

        let extracted = self.extractor.extract(document).await?;
        let low_confidence = extracted.is_blank();
        if low_confidence {
            warn!("Run {}: no text extracted from the resume, results are low-confidence", run_id);
        }
        let request = AnalysisRequest {
            resume_text: extracted.joined(),
            role_context,
        };
        self.advance(run_id, PipelineState::AwaitingInference)?;

        let prompt = self.prompt_builder.build(&request);
        let raw = self.inference.infer(&prompt, &self.credentials).await?;
        self.advance(run_id, PipelineState::Validating)?;

        let result = self.validator.validate(&raw)?;
        self.advance(run_id, PipelineState::Succeeded(result.clone()))?;

        Ok(AnalysisOutcome {
            run_id,
            result,
            resume_chars: request.resume_text.chars().count(),
            page_count: extracted.page_count(),
            low_confidence,
            completed_at: Utc::now(),
        })
    }

    /// Start a fresh run unless one is already in flight.
    fn begin_run(&self) -> Result<RunId> {
        let mut started = Err(RunId::default());
        self.state.send_if_modified(|snapshot| {
            if snapshot.state.is_busy() {
                started = Err(snapshot.run_id.unwrap_or_default());
                return false;
            }
            let run_id = RunId(self.last_run.fetch_add(1, Ordering::SeqCst) + 1);
            *snapshot = StateSnapshot {
                run_id: Some(run_id),
                state: PipelineState::Extracting,
            };
            started = Ok(run_id);
            true
        });

        started.map_err(|active| {
            warn!("Rejected submission while run {} is in flight", active);
            ResumeLensError::Precondition(PreconditionViolation::RunInFlight(active))
        })
    }

    /// Move `run_id` to `next`, failing with `Superseded` if it is no longer current.
    fn advance(&self, run_id: RunId, next: PipelineState) -> Result<()> {
        let mut applied = false;
        self.state.send_if_modified(|snapshot| {
            if snapshot.run_id != Some(run_id) || !snapshot.state.is_busy() {
                return false;
            }
            debug!("Run {}: {} -> {}", run_id, snapshot.state.label(), next.label());
            snapshot.state = next;
            applied = true;
            true
        });

        if applied {
            Ok(())
        } else {
            Err(ResumeLensError::Superseded(run_id))
        }
    }

    /// Record a pipeline failure. Returns false when the run is no longer current.
    fn fail(&self, run_id: RunId, error: &ResumeLensError) -> bool {
        let Some(kind) = error.kind() else {
            if matches!(error, ResumeLensError::Superseded(_)) {
                return false;
            }
            return self.release(run_id);
        };
        let failure = PipelineFailure {
            kind,
            message: error.to_string(),
        };
        self.advance(run_id, PipelineState::Failed(failure)).is_ok()
    }

    /// Reset to Idle if `run_id` is still the busy run.
    fn release(&self, run_id: RunId) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.run_id != Some(run_id) || !snapshot.state.is_busy() {
                return false;
            }
            *snapshot = StateSnapshot::default();
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::llm::client::{InferenceRequest, InferenceTransport};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    const REPLY: &str = r#"{"score":40,"missingKeywords":["kubernetes"],"weakBulletPoints":[],"atsFriendliness":"Low","skillsFound":["Rust"]}"#;

    struct StaticTransport {
        reply: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InferenceTransport for StaticTransport {
        async fn send(&self, _request: InferenceRequest<'_>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    fn orchestrator(reply: &'static str, credentials: Credentials) -> (AnalysisOrchestrator, Arc<StaticTransport>) {
        let transport = Arc::new(StaticTransport {
            reply,
            calls: AtomicUsize::new(0),
        });
        let client = InferenceClient::new(transport.clone(), "test-model");
        let orchestrator = AnalysisOrchestrator::new(DocumentTextExtractor::new(), client, credentials);
        (orchestrator, transport)
    }

    #[tokio::test]
    async fn test_missing_document_leaves_state_idle() {
        let (orchestrator, transport) = orchestrator(REPLY, Credentials::new("k"));
        let err = orchestrator
            .submit_analysis(None, "Backend Engineer", "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResumeLensError::Precondition(PreconditionViolation::MissingDocument)
        ));
        assert_eq!(orchestrator.snapshot(), StateSnapshot::default());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_role_is_precondition_error() {
        let (orchestrator, _) = orchestrator(REPLY, Credentials::new("k"));
        let err = orchestrator
            .submit_analysis(Some(Document::plain_text("Rust")), "  ", "")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Precondition));
        assert_eq!(orchestrator.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_success_reaches_succeeded() {
        let (orchestrator, transport) = orchestrator(REPLY, Credentials::new("k"));
        let outcome = orchestrator
            .submit_analysis(Some(Document::plain_text("Rust, Tokio")), "Backend Engineer", "")
            .await
            .unwrap();

        assert_eq!(outcome.run_id, RunId(1));
        assert_eq!(orchestrator.model(), "test-model");
        assert_eq!(outcome.result.score, 40);
        assert!(!outcome.low_confidence);
        assert_eq!(orchestrator.state(), PipelineState::Succeeded(outcome.result));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_extraction_is_flagged_not_fatal() {
        let (orchestrator, _) = orchestrator(REPLY, Credentials::new("k"));
        let outcome = orchestrator
            .submit_analysis(Some(Document::plain_text("   ")), "Backend Engineer", "")
            .await
            .unwrap();
        assert!(outcome.low_confidence);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_terminal() {
        let (orchestrator, transport) = orchestrator(REPLY, Credentials::new("k"));
        let bad = Document::new(vec![0xff, 0xfe], crate::input::MediaType::PlainText);
        let err = orchestrator.submit_analysis(Some(bad), "Engineer", "").await.unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Extraction));
        match orchestrator.state() {
            PipelineState::Failed(failure) => assert_eq!(failure.kind, ErrorKind::Extraction),
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_validation() {
        let (orchestrator, _) = orchestrator("definitely not json", Credentials::new("k"));
        let err = orchestrator
            .submit_analysis(Some(Document::plain_text("Rust")), "Engineer", "")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert!(matches!(orchestrator.state(), PipelineState::Failed(_)));
    }

    #[tokio::test]
    async fn test_terminal_state_accepts_new_submission() {
        let (orchestrator, _) = orchestrator("{}", Credentials::new("k"));
        for expected in 1..=2 {
            let _ = orchestrator
                .submit_analysis(Some(Document::plain_text("Rust")), "Engineer", "")
                .await;
            assert_eq!(orchestrator.snapshot().run_id, Some(RunId(expected)));
            assert!(orchestrator.state().is_terminal());
        }
    }

    #[test]
    fn test_abandon_when_idle_is_noop() {
        let (orchestrator, _) = orchestrator(REPLY, Credentials::new("k"));
        assert_eq!(orchestrator.abandon(), None);
        assert_eq!(orchestrator.state(), PipelineState::Idle);
    }
}
