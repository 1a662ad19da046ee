//! Event Pipeline
//!
//! Per event: validate -> extract -> match (local pool + remote lookup)
//! -> decide -> enforce -> feedback.
//!
//! Stages run in order; each one absorbs its own failures. Only a
//! structurally invalid event is rejected.

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::events::{DownloadEvent, EventRejected};
use crate::error::AgentResult;
use crate::logic::backend::{
    lookup_or_none, send_and_log, FeedbackRecord, FeedbackSink, HttpFeedbackClient,
    HttpScoringClient, LookupRequest, ScoringService,
};
use crate::logic::config::AgentConfig;
use crate::logic::decision::{DecisionEngine, DecisionResult};
use crate::logic::enforcement::{
    ConsolePrompt, EnforcementController, EnforcementResult, LogNotifier, SilentPrompt, UserPrompt,
};
use crate::logic::features::{Embedder, FingerprintExtractor, FingerprintSet, HashingEmbedder};
use crate::logic::similarity::{ReferencePool, SimilarityOrchestrator, SimilarityScore};

/// Everything that happened to one event
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub event_id: String,
    pub filename: String,
    /// Fingerprint types that were extracted
    pub fingerprints: Vec<&'static str>,
    pub decision: DecisionResult,
    pub enforcement: EnforcementResult,
    pub feedback: FeedbackRecord,
}

pub struct EventPipeline {
    agent_id: String,
    extractor: Arc<FingerprintExtractor>,
    orchestrator: SimilarityOrchestrator,
    pool: Arc<ReferencePool>,
    scorer: Option<Arc<dyn ScoringService>>,
    engine: DecisionEngine,
    enforcement: EnforcementController,
    feedback: Option<Arc<dyn FeedbackSink>>,
    /// In-flight feedback sends
    pending_feedback: Mutex<Vec<JoinHandle<()>>>,
}

impl EventPipeline {
    pub fn new(
        agent_id: impl Into<String>,
        extractor: Arc<FingerprintExtractor>,
        orchestrator: SimilarityOrchestrator,
        engine: DecisionEngine,
        enforcement: EnforcementController,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            extractor,
            orchestrator,
            pool: Arc::new(ReferencePool::empty()),
            scorer: None,
            engine,
            enforcement,
            feedback: None,
            pending_feedback: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reference_pool(mut self, pool: Arc<ReferencePool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_scoring_service(mut self, scorer: Arc<dyn ScoringService>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_feedback_sink(mut self, sink: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = Some(sink);
        self
    }

    /// Composition root: builds every collaborator from config
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        let embedder: Option<Arc<dyn Embedder>> = if config.features.semantic_enabled {
            Some(Arc::new(HashingEmbedder::new(config.features.embedding_dim)))
        } else {
            None
        };
        let extractor = Arc::new(FingerprintExtractor::new(&config.features, embedder));

        let prompt: Arc<dyn UserPrompt> = if config.interactive_prompts {
            Arc::new(ConsolePrompt::new())
        } else {
            Arc::new(SilentPrompt)
        };
        let enforcement =
            EnforcementController::new(config.enforcement.clone(), prompt, Arc::new(LogNotifier));

        let pool = ReferencePool::load_or_empty(&config.reference_pool_path)?;

        let mut pipeline = Self::new(
            config.agent_id.clone(),
            extractor,
            SimilarityOrchestrator::new(config.matching.clone()),
            DecisionEngine::new(config.thresholds),
            enforcement,
        )
        .with_reference_pool(Arc::new(pool));

        if config.backend.enabled {
            let scorer = HttpScoringClient::new(
                &config.backend.base_url,
                config.backend.api_key.clone(),
                config.backend.lookup_timeout(),
            )?;
            log::info!("[LOOKUP] Scoring service: {}", scorer.endpoint());
            pipeline = pipeline.with_scoring_service(Arc::new(scorer));

            if config.backend.feedback_enabled {
                let sink = HttpFeedbackClient::new(
                    &config.backend.base_url,
                    config.backend.api_key.clone(),
                    config.backend.feedback_timeout(),
                )?;
                pipeline = pipeline.with_feedback_sink(Arc::new(sink));
            }
        } else {
            log::info!("[LOOKUP] Backend disabled, local reference pool only");
        }

        Ok(pipeline)
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub async fn process(&self, mut event: DownloadEvent) -> Result<PipelineOutcome, EventRejected> {
        if let Err(e) = event.validate() {
            log::error!("[EVENT] Rejected: {}", e);
            return Err(e);
        }
        let event_id = event.ensure_event_id();
        let filename = event.filename().to_string();
        log::info!("[EVENT] {} received: {}", event_id, filename);

        // 1. Extract
        let path = event.data.download_path.clone().unwrap_or_default();
        let fingerprints = self
            .extractor
            .extract_concurrent(
                path,
                Some(event.file_metadata()),
                self.extractor.default_partial_hash_bytes(),
            )
            .await;

        // 2. Match
        let scores = self.collect_scores(&event_id, &event, &fingerprints).await;

        // 3. Decide
        let decision = self.engine.decide(&event_id, scores.as_deref());
        log::info!(
            "[DECISION] {} {} | Rules: {} | {}",
            event_id,
            decision.decision,
            if decision.triggered_rules.is_empty() {
                "DEFAULT".to_string()
            } else {
                decision.reason_code()
            },
            decision.explanation
        );

        // 4. Enforce
        let enforcement = self.enforcement.enforce(&decision, &filename).await;
        log::info!(
            "[ENFORCE] {} complete: enforced={}, response={}, state={}",
            event_id,
            enforcement.enforced,
            enforcement.user_response,
            enforcement.state
        );

        // 5. Feedback
        let feedback = FeedbackRecord::from_outcome(&self.agent_id, &decision, &enforcement, Utc::now());
        self.dispatch_feedback(&feedback);

        Ok(PipelineOutcome {
            event_id,
            filename,
            fingerprints: fingerprints.present_fields(),
            decision,
            enforcement,
            feedback,
        })
    }

    /// Local pool scores + remote scores.
    /// `None` only when neither side produced anything to compare.
    async fn collect_scores(
        &self,
        event_id: &str,
        event: &DownloadEvent,
        fingerprints: &FingerprintSet,
    ) -> Option<Vec<SimilarityScore>> {
        let local = self
            .orchestrator
            .match_fingerprints(fingerprints, &self.pool)
            .scores();

        let remote = match &self.scorer {
            Some(scorer) if !fingerprints.is_empty() => {
                let request = LookupRequest::new(
                    &self.agent_id,
                    event_id,
                    fingerprints,
                    event.lookup_metadata(),
                );
                lookup_or_none(scorer.as_ref(), &request).await
            }
            Some(_) => {
                log::warn!("[LOOKUP] {} no fingerprints, skipping lookup", event_id);
                None
            }
            None => None,
        };

        match remote {
            Some(mut remote) => {
                remote.extend(local);
                Some(remote)
            }
            None if !local.is_empty() => Some(local),
            None => None,
        }
    }

    /// Fire-and-forget: never awaited, never retried
    fn dispatch_feedback(&self, record: &FeedbackRecord) {
        let Some(sink) = self.feedback.clone() else {
            log::debug!("[FEEDBACK] No sink configured, skipping {}", record.event_id);
            return;
        };
        let record = record.clone();
        let task = tokio::spawn(async move {
            send_and_log(sink.as_ref(), &record).await;
        });

        let mut pending = self.pending_feedback.lock();
        pending.retain(|t| !t.is_finished());
        pending.push(task);
    }

    /// Wait for in-flight feedback sends (each bounded by the client timeout).
    /// Used before shutdown.
    pub async fn drain_feedback(&self) {
        let tasks = std::mem::take(&mut *self.pending_feedback.lock());
        for task in tasks {
            if let Err(e) = task.await {
                log::warn!("[FEEDBACK] Send task failed: {}", e);
            }
        }
    }
}
