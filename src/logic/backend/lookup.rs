//! Scoring Lookup Client
//!
//! Sends fingerprints (never file content) to the scoring service and gets
//! scores back. The service never decides.
//!
//! Single attempt per event, no retry. Any failure ≡ no matches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::error::AgentResult;
use crate::logic::features::FingerprintSet;
use crate::logic::similarity::{Algorithm, SimilarityScore};

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupRequest {
    pub agent_id: String,
    pub event_id: String,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_sig: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_vec: Option<Vec<f32>>,
}

impl LookupRequest {
    /// Only fingerprints that were actually extracted are sent
    pub fn new(agent_id: &str, event_id: &str, set: &FingerprintSet, metadata: Value) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            event_id: event_id.to_string(),
            metadata,
            exact_hash: set.exact.as_ref().map(|e| e.digest.clone()),
            fuzzy_sig: set.fuzzy.as_ref().map(|f| f.signature.clone()),
            semantic_vec: set.semantic.as_ref().map(|s| s.vector.clone()),
        }
    }

    fn queried(&self, algorithm: Algorithm) -> bool {
        match algorithm {
            Algorithm::Exact => self.exact_hash.is_some(),
            Algorithm::Fuzzy => self.fuzzy_sig.is_some(),
            Algorithm::Semantic => self.semantic_vec.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchEntry {
    /// Advisory only; the decision engine uses `score`
    pub is_match: bool,
    pub similarity_type: String,
    pub score: f64,
    pub reference_id: Option<String>,
    pub reference_metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupResponse {
    pub exact_match: MatchEntry,
    pub fuzzy_match: MatchEntry,
    pub semantic_match: MatchEntry,
}

impl LookupResponse {
    pub fn entry(&self, algorithm: Algorithm) -> &MatchEntry {
        match algorithm {
            Algorithm::Exact => &self.exact_match,
            Algorithm::Fuzzy => &self.fuzzy_match,
            Algorithm::Semantic => &self.semantic_match,
        }
    }

    /// One score per algorithm the request actually asked about
    pub fn scores_for(&self, request: &LookupRequest) -> Vec<SimilarityScore> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| request.queried(*a))
            .map(|a| {
                let entry = self.entry(a);
                SimilarityScore {
                    reference_id: entry.reference_id.clone(),
                    reference_metadata: entry.reference_metadata.clone(),
                    ..SimilarityScore::new(a, entry.score)
                }
            })
            .collect()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LookupFailure {
    #[error("lookup timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("backend rejected lookup with HTTP {0}")]
    Rejected(u16),
    #[error("response schema invalid: {0}")]
    SchemaInvalid(String),
}

impl From<reqwest::Error> for LookupFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupFailure::Timeout
        } else if e.is_decode() {
            LookupFailure::SchemaInvalid(e.to_string())
        } else {
            LookupFailure::Connection(e.to_string())
        }
    }
}

// ============================================================================
// SCHEMA VALIDATION
// ============================================================================

const MATCH_KEYS: [&str; 3] = ["exact_match", "fuzzy_match", "semantic_match"];
const ENTRY_FIELDS: [&str; 5] = [
    "is_match",
    "similarity_type",
    "score",
    "reference_id",
    "reference_metadata",
];

/// Strict check of the whole body. One bad field discards everything.
pub fn validate_lookup_response(body: &Value) -> Result<LookupResponse, LookupFailure> {
    let invalid = |msg: String| LookupFailure::SchemaInvalid(msg);

    let root = body
        .as_object()
        .ok_or_else(|| invalid("response must be an object".to_string()))?;

    for key in MATCH_KEYS {
        let entry = root
            .get(key)
            .ok_or_else(|| invalid(format!("missing key {}", key)))?
            .as_object()
            .ok_or_else(|| invalid(format!("{} must be an object", key)))?;

        for field in ENTRY_FIELDS {
            if !entry.contains_key(field) {
                return Err(invalid(format!("{} missing field {}", key, field)));
            }
        }

        if !entry["is_match"].is_boolean() {
            return Err(invalid(format!("{}.is_match must be bool", key)));
        }
        if !entry["similarity_type"].is_string() {
            return Err(invalid(format!("{}.similarity_type must be str", key)));
        }

        let score = entry["score"]
            .as_f64()
            .ok_or_else(|| invalid(format!("{}.score must be numeric", key)))?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(invalid(format!("{}.score must be 0.0-1.0, got {}", key, score)));
        }

        let reference_id = &entry["reference_id"];
        if !(reference_id.is_null() || reference_id.is_string()) {
            return Err(invalid(format!("{}.reference_id must be str or null", key)));
        }
        let reference_metadata = &entry["reference_metadata"];
        if !(reference_metadata.is_null() || reference_metadata.is_object()) {
            return Err(invalid(format!("{}.reference_metadata must be object or null", key)));
        }
    }

    serde_json::from_value(body.clone()).map_err(|e| invalid(e.to_string()))
}

// ============================================================================
// SCORING SERVICE
// ============================================================================

#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupFailure>;
}

/// POST {base}/api/v1/lookup
pub struct HttpScoringClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpScoringClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> AgentResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: format!("{}/api/v1/lookup", base_url.trim_end_matches('/')),
            api_key,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupFailure> {
        let mut builder = self.http_client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!(
                "[LOOKUP] Backend returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
            return Err(LookupFailure::Rejected(status.as_u16()));
        }

        let body: Value = response.json().await?;
        validate_lookup_response(&body)
    }
}

/// Call boundary: every failure becomes "no matches" (`None`)
pub async fn lookup_or_none(
    service: &dyn ScoringService,
    request: &LookupRequest,
) -> Option<Vec<SimilarityScore>> {
    match service.lookup(request).await {
        Ok(response) => {
            let scores = response.scores_for(request);
            log::info!(
                "[LOOKUP] {} remote scores: {}",
                request.event_id,
                scores
                    .iter()
                    .map(|s| format!("{}={:.3}", s.algorithm, s.confidence))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Some(scores)
        }
        Err(e) => {
            log::warn!(
                "[LOOKUP] {} lookup failed, treating as no matches: {}",
                request.event_id,
                e
            );
            None
        }
    }
}
