//! Read-only views published by the control loop for renderers.

use serde::{Deserialize, Serialize};

use crate::types::{ClusterConfig, HistorySample, LogEntry, SystemMetrics};

/// Stress pulse as seen from outside the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StressView {
    pub active: bool,
    /// Extra load applied on top of the artificial load.
    pub amount: f64,
    /// Time left until the pulse ends; zero when idle.
    pub remaining_ms: u64,
}

/// Everything the dashboard needs to paint one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Metric ticks executed since start.
    pub tick: u64,
    pub metrics: SystemMetrics,
    pub config: ClusterConfig,
    /// Oldest → newest.
    pub history: Vec<HistorySample>,
    /// Oldest → newest.
    pub logs: Vec<LogEntry>,
    pub artificial_load: f64,
    pub autoscale_enabled: bool,
    pub stress: StressView,
}

/// Input of the force-directed graph renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub node_count: u32,
    pub cpu_load: f64,
}

impl Snapshot {
    pub fn topology(&self) -> Topology {
        Topology {
            node_count: self.config.node_count,
            cpu_load: self.metrics.cpu_load,
        }
    }
}
