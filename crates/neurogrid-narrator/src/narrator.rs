//! Non-failing narration client.
//!
//! Every call is bounded by a timeout. Errors, timeouts, and blank replies
//! all collapse into a fixed fallback string; the underlying cause is only
//! traced.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use neurogrid_state::{ClusterConfig, SystemMetrics};

use crate::error::NarratorError;
use crate::generator::{GenerationRequest, NarrationContext, OfflineGenerator, TextGenerator};
use crate::prompt::{narration_prompt, plan_prompt, recent_window};

/// Text returned by [`Narrator::narrate`] when the service is unavailable.
pub const NARRATION_FALLBACK: &str = "Telemetry link unstable. Running local heuristics.";

/// Text returned by [`Narrator::plan`] when the service is unavailable.
pub const PLAN_FALLBACK: &str =
    "Planner unreachable. Hold current topology and keep load inside the 40-85% band.";

/// Request parameters for the generation service.
#[derive(Debug, Clone)]
pub struct NarratorSettings {
    pub model: String,
    /// Upper bound on a single request, connection included.
    pub timeout: Duration,
    /// Token budget for narration lines.
    pub max_tokens: u32,
    /// Token budget for optimization plans.
    pub plan_max_tokens: u32,
}

impl Default for NarratorSettings {
    fn default() -> Self {
        Self {
            model: "neurogrid-narrator".to_string(),
            timeout: Duration::from_secs(8),
            max_tokens: 60,
            plan_max_tokens: 160,
        }
    }
}

/// Produces commentary text, never an error.
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    settings: NarratorSettings,
}

impl Narrator {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: NarratorSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// A narrator with no remote service; every call returns a fallback.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineGenerator), NarratorSettings::default())
    }

    pub fn settings(&self) -> &NarratorSettings {
        &self.settings
    }

    /// One line of commentary on the current state.
    ///
    /// Only the last three entries of `recent` are sent.
    pub async fn narrate(
        &self,
        metrics: &SystemMetrics,
        config: &ClusterConfig,
        recent: &[String],
    ) -> String {
        let window = recent_window(recent);
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            prompt: narration_prompt(metrics, config, window),
            max_tokens: self.settings.max_tokens,
            context: NarrationContext {
                metrics: *metrics,
                config: Some(*config),
                recent_logs: window.to_vec(),
            },
        };
        self.generate_or(&request, NARRATION_FALLBACK, "narration").await
    }

    /// An optimization plan for the given telemetry. Not on the periodic
    /// schedule; callers invoke it on demand.
    pub async fn plan(&self, metrics: &SystemMetrics) -> String {
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            prompt: plan_prompt(metrics),
            max_tokens: self.settings.plan_max_tokens,
            context: NarrationContext {
                metrics: *metrics,
                config: None,
                recent_logs: Vec::new(),
            },
        };
        self.generate_or(&request, PLAN_FALLBACK, "plan").await
    }

    async fn generate_or(&self, request: &GenerationRequest, fallback: &str, what: &str) -> String {
        let result = tokio::time::timeout(self.settings.timeout, self.generator.generate(request)).await;

        let outcome = match result {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    Err(NarratorError::Empty)
                } else {
                    Ok(text.to_string())
                }
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(
                    kind = what,
                    timeout_ms = self.settings.timeout.as_millis() as u64,
                    "narrator request timed out"
                );
                return fallback.to_string();
            }
        };

        match outcome {
            Ok(text) => {
                debug!(kind = what, chars = text.len(), "narrator reply received");
                text
            }
            Err(NarratorError::Offline) => {
                debug!(kind = what, "narrator offline, using fallback");
                fallback.to_string()
            }
            Err(e) => {
                warn!(kind = what, error = %e, "narrator request failed");
                fallback.to_string()
            }
        }
    }
}
