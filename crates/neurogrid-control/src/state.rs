//! The state container owned by the control loop.
//!
//! Every mutation of metrics, config, history, log, load, or stress goes
//! through a method here, which keeps the log a faithful record of every
//! transition. The methods are synchronous so tests can drive them with
//! injected noise and clock values.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;
use tracing::{debug, info};

use neurogrid_autoscale::{ScaleDecision, ScaleDirection, evaluate};
use neurogrid_metrics::{NoiseSource, step};
use neurogrid_state::*;

use crate::stress::{StressState, StressTransition};

pub const ONLINE_MESSAGE: &str = "NeuroGrid control loop online.";
pub const STRESS_CONCLUDED_MESSAGE: &str = "Stress test concluded. Load returning to baseline.";

/// Metrics, config, buffers, and user inputs of one running cluster.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub metrics: SystemMetrics,
    pub config: ClusterConfig,
    pub history: HistoryBuffer,
    pub log: EventLog,
    /// User-controlled load, always within `[0, 80]`.
    pub artificial_load: f64,
    pub autoscale_enabled: bool,
    pub stress: StressState,
    /// Metric ticks executed so far.
    pub ticks: u64,
}

impl EngineState {
    pub fn new(autoscale_enabled: bool) -> Self {
        Self {
            metrics: SystemMetrics::default(),
            config: ClusterConfig::default(),
            history: HistoryBuffer::default(),
            log: EventLog::default(),
            artificial_load: 0.0,
            autoscale_enabled,
            stress: StressState::Idle,
            ticks: 0,
        }
    }

    /// Load fed to the simulator: user load plus any active pulse.
    pub fn effective_load(&self) -> f64 {
        clamp_artificial_load(self.artificial_load + self.stress.amount())
    }

    /// Advance the simulation by one sample and record it in the history.
    pub fn tick<N: NoiseSource + ?Sized>(&mut self, noise: &mut N) -> SystemMetrics {
        let next = step(
            &self.metrics,
            self.config.node_count,
            self.effective_load(),
            noise,
        );
        self.metrics = next;
        self.history.push(HistorySample {
            time: epoch_millis(),
            cpu: next.cpu_load,
            mem: next.memory_usage,
        });
        self.ticks += 1;
        next
    }

    /// Run the autoscale policy against the latest sample and apply its
    /// decision. Does nothing while autoscaling is disengaged.
    pub fn evaluate_autoscale(&mut self) -> Option<ScaleDecision> {
        if !self.autoscale_enabled {
            return None;
        }

        let decision = evaluate(self.metrics.cpu_load, &self.config)?;
        let kind = match decision.direction {
            ScaleDirection::Down => LogKind::Warning,
            ScaleDirection::Up => LogKind::System,
        };

        info!(
            from = self.config.node_count,
            to = decision.config.node_count,
            status = decision.config.status.as_str(),
            "cluster rescaled"
        );
        self.config = decision.config;
        self.log.append(kind, decision.reason.clone());
        Some(decision)
    }

    pub fn set_autoscale(&mut self, enabled: bool) {
        if self.autoscale_enabled == enabled {
            return;
        }
        self.autoscale_enabled = enabled;
        let message = if enabled {
            "Autoscaling engaged."
        } else {
            "Autoscaling disengaged. Manual control active."
        };
        self.log.append(LogKind::System, message);
    }

    pub fn set_artificial_load(&mut self, load: f64) {
        self.artificial_load = clamp_artificial_load(load);
        debug!(load = self.artificial_load, "artificial load set");
    }

    pub fn trigger_stress(&mut self, amount: f64, duration: Duration, now: Instant) -> StressTransition {
        let transition = self.stress.trigger(amount, duration, now);
        let amount = self.stress.amount();
        let secs = self
            .stress
            .deadline()
            .map(|until| until.saturating_duration_since(now).as_secs_f64())
            .unwrap_or_default();

        let (kind, message) = match transition {
            StressTransition::Started => (
                LogKind::Warning,
                format!("Stress test initiated: +{amount:.0}% synthetic load for {secs:.1}s."),
            ),
            StressTransition::Extended => (
                LogKind::Info,
                format!("Stress test extended: +{amount:.0}% synthetic load for {secs:.1}s."),
            ),
        };
        info!(amount, secs, ?transition, "stress pulse");
        self.log.append(kind, message);
        transition
    }

    /// End the stress pulse if its deadline has passed.
    pub fn expire_stress(&mut self, now: Instant) -> bool {
        if !self.stress.expire(now) {
            return false;
        }
        info!("stress pulse ended");
        self.log.append(LogKind::Info, STRESS_CONCLUDED_MESSAGE);
        true
    }

    /// Append a manual diagnostic entry summarizing the current state.
    pub fn diagnostic(&mut self) -> LogEntry {
        let message = format!(
            "Manual diagnostic: cpu {:.1}%, mem {:.1}%, {} nodes, status {}.",
            self.metrics.cpu_load,
            self.metrics.memory_usage,
            self.config.node_count,
            self.config.status.as_str()
        );
        self.log.append(LogKind::Info, message)
    }

    /// Record narrator output. Always typed `AI`, fallback text included.
    pub fn record_narration(&mut self, text: impl Into<String>) -> LogEntry {
        self.log.append(LogKind::Ai, text)
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            metrics: self.metrics,
            config: self.config,
            history: self.history.to_vec(),
            logs: self.log.to_vec(),
            artificial_load: self.artificial_load,
            autoscale_enabled: self.autoscale_enabled,
            stress: self.stress.view(now),
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
