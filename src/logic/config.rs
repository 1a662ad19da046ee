//! Agent Configuration
//!
//! defaults <- JSON file (`AGENT_CONFIG_PATH`) <- environment variables.
//! Every section has `#[serde(default)]`, so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::error::{AgentError, AgentResult};
use crate::logic::decision::DecisionThresholds;
use crate::logic::enforcement::EnforcementConfig;
use crate::logic::features::ExtractorConfig;
use crate::logic::similarity::MatcherConfig;

pub const CONFIG_PATH_ENV: &str = "AGENT_CONFIG_PATH";

// ============================================================================
// BACKEND
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// false = local reference pool only, no feedback
    pub enabled: bool,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub lookup_timeout_secs: u64,
    pub feedback_enabled: bool,
    pub feedback_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: constants::DEFAULT_BACKEND_URL.to_string(),
            api_key: None,
            lookup_timeout_secs: constants::DEFAULT_LOOKUP_TIMEOUT_SECS,
            feedback_enabled: true,
            feedback_timeout_secs: constants::DEFAULT_FEEDBACK_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn feedback_timeout(&self) -> Duration {
        Duration::from_secs(self.feedback_timeout_secs)
    }
}

// ============================================================================
// AGENT CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub agent_id: String,
    pub backend: BackendConfig,
    pub features: ExtractorConfig,
    pub matching: MatcherConfig,
    pub thresholds: DecisionThresholds,
    pub enforcement: EnforcementConfig,
    pub reference_pool_path: PathBuf,
    /// Ask on the terminal for WARN decisions (false = always cancel)
    pub interactive_prompts: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: constants::default_agent_id(),
            backend: BackendConfig::default(),
            features: ExtractorConfig::default(),
            matching: MatcherConfig::default(),
            thresholds: DecisionThresholds::default(),
            enforcement: EnforcementConfig::default(),
            reference_pool_path: constants::default_reference_pool_path(),
            interactive_prompts: true,
        }
    }
}

impl AgentConfig {
    /// Offline mode: no backend calls, never prompts
    pub fn offline() -> Self {
        Self {
            backend: BackendConfig {
                enabled: false,
                feedback_enabled: false,
                ..Default::default()
            },
            interactive_prompts: false,
            ..Default::default()
        }
    }

    /// Full load from the process environment
    pub fn load() -> AgentResult<Self> {
        let mut config = match constants::env_string(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(constants::env_string);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AgentResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AgentError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AgentConfig =
            serde_json::from_str(&content).map_err(|source| AgentError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Option<u64> {
            let raw = get(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a number", key, raw);
                    None
                }
            }
        };
        let flag = |key: &str| get(key).map(|v| constants::parse_flag(&v));

        if let Some(v) = get("AGENT_ID") {
            self.agent_id = v;
        }
        if let Some(v) = get("BACKEND_BASE_URL") {
            self.backend.base_url = v;
        }
        if let Some(v) = get("BACKEND_API_KEY") {
            self.backend.api_key = Some(v);
        }
        if let Some(v) = number("LOOKUP_TIMEOUT_SECONDS") {
            self.backend.lookup_timeout_secs = v;
        }
        if let Some(v) = number("FEATURE_PARTIAL_HASH_BYTES") {
            self.features.partial_hash_bytes = v as usize;
        }
        if let Some(v) = flag("FUZZY_ENABLED") {
            self.features.fuzzy_enabled = v;
        }
        if let Some(v) = flag("SEMANTIC_ENABLED") {
            self.features.semantic_enabled = v;
        }
        if let Some(v) = number("WARN_CONFIRMATION_TIMEOUT") {
            self.enforcement.warn_confirmation_timeout_secs = v;
        }
        if let Some(v) = flag("ALLOW_ENFORCEMENT_ENABLED") {
            self.enforcement.allow_enforcement = v;
        }
        if let Some(v) = flag("WARN_ENFORCEMENT_ENABLED") {
            self.enforcement.warn_enforcement = v;
        }
        if let Some(v) = flag("BLOCK_ENFORCEMENT_ENABLED") {
            self.enforcement.block_enforcement = v;
        }
        if let Some(v) = get("REFERENCE_POOL_PATH") {
            self.reference_pool_path = PathBuf::from(v);
        }
        if let Some(v) = flag("INTERACTIVE_PROMPTS") {
            self.interactive_prompts = v;
        }
    }

    pub fn validate(&self) -> AgentResult<()> {
        let fail = |msg: String| Err(AgentError::InvalidConfig(msg));

        if self.agent_id.trim().is_empty() {
            return fail("agent_id must be non-empty".to_string());
        }
        if self.backend.enabled && self.backend.base_url.trim().is_empty() {
            return fail("backend.base_url must be set when the backend is enabled".to_string());
        }
        if self.backend.lookup_timeout_secs == 0 {
            return fail("backend.lookup_timeout_secs must be > 0".to_string());
        }
        if self.features.partial_hash_bytes == 0 {
            return fail("features.partial_hash_bytes must be > 0".to_string());
        }
        if self.features.fuzzy_enabled && self.features.num_perm == 0 {
            return fail("features.num_perm must be > 0 when fuzzy is enabled".to_string());
        }
        if self.features.fuzzy_chunk_bytes == 0 {
            return fail("features.fuzzy_chunk_bytes must be > 0".to_string());
        }
        if self.features.semantic_enabled && self.features.embedding_dim == 0 {
            return fail("features.embedding_dim must be > 0 when semantic is enabled".to_string());
        }
        for (name, value) in [
            ("matching.fuzzy_threshold", self.matching.fuzzy_threshold),
            ("matching.semantic_threshold", self.matching.semantic_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if let Err(msg) = self.thresholds.validate() {
            return fail(format!("thresholds: {}", msg));
        }
        if self.enforcement.warn_confirmation_timeout_secs == 0 {
            return fail("enforcement.warn_confirmation_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
