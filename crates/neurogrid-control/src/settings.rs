//! Scheduling parameters for the control loop.

use std::time::Duration;

/// Cadences and gating for the three periodic tasks.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Metrics sampling period.
    pub tick_interval: Duration,
    /// Autoscale evaluation period. Slower than the tick to damp reactions.
    pub autoscale_interval: Duration,
    /// How often a narration request is considered.
    pub narration_interval: Duration,
    /// Chance that a narration tick actually calls the narrator.
    pub narration_probability: f64,
    /// Whether autoscaling starts engaged.
    pub autoscale_enabled: bool,
    /// Capacity of the command queue.
    pub command_buffer: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1_000),
            autoscale_interval: Duration::from_millis(3_000),
            narration_interval: Duration::from_millis(8_000),
            narration_probability: 0.4,
            autoscale_enabled: true,
            command_buffer: 64,
        }
    }
}
