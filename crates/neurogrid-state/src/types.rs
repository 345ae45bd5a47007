//! Domain types for the NeuroGrid control loop.
//!
//! Field names serialize in camelCase and enum variants in
//! SCREAMING_SNAKE_CASE, which is what the dashboard renderer reads.

use serde::{Deserialize, Serialize};

use crate::limits::{INITIAL_NODES, clamp_nodes};

// ── Telemetry ─────────────────────────────────────────────────────

/// One simulated telemetry reading for the whole cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    /// CPU load percentage (0–100).
    pub cpu_load: f64,
    /// Memory usage percentage (0–100).
    pub memory_usage: f64,
    /// Network latency in milliseconds.
    pub network_latency: f64,
    /// Core temperature in degrees Celsius.
    pub temperature: f64,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self {
            cpu_load: 20.0,
            memory_usage: 30.0,
            network_latency: 45.0,
            temperature: 40.0,
        }
    }
}

// ── Cluster ───────────────────────────────────────────────────────

/// How elaborate the simulated network topology currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Complexity {
    Low,
    Medium,
    High,
    Critical,
}

/// Health label shown next to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterStatus {
    Optimal,
    Strained,
    Overload,
    Idle,
}

impl ClusterStatus {
    /// All variants, in display order.
    pub const ALL: [ClusterStatus; 4] = [
        ClusterStatus::Optimal,
        ClusterStatus::Strained,
        ClusterStatus::Overload,
        ClusterStatus::Idle,
    ];

    /// Upper-case label as rendered in the dashboard and the event log.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatus::Optimal => "OPTIMAL",
            ClusterStatus::Strained => "STRAINED",
            ClusterStatus::Overload => "OVERLOAD",
            ClusterStatus::Idle => "IDLE",
        }
    }
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "LOW",
            Complexity::Medium => "MEDIUM",
            Complexity::High => "HIGH",
            Complexity::Critical => "CRITICAL",
        }
    }
}

/// Current shape of the simulated cluster.
///
/// `complexity` and `status` are derived by the autoscale policy from
/// `node_count` and recent CPU load. Outside of tests, only the policy
/// produces new values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Active nodes, always within `[MIN_NODES, MAX_NODES]`.
    pub node_count: u32,
    pub complexity: Complexity,
    pub status: ClusterStatus,
}

impl ClusterConfig {
    /// Build a config, clamping the node count into the allowed range.
    pub fn new(node_count: u32, complexity: Complexity, status: ClusterStatus) -> Self {
        Self {
            node_count: clamp_nodes(node_count),
            complexity,
            status,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new(INITIAL_NODES, Complexity::Medium, ClusterStatus::Optimal)
    }
}

// ── Buffers ───────────────────────────────────────────────────────

/// A single chart point kept by the [`HistoryBuffer`](crate::HistoryBuffer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HistorySample {
    /// Unix timestamp in milliseconds.
    pub time: u64,
    pub cpu: f64,
    pub mem: f64,
}

/// Category of an event log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Info,
    Warning,
    Error,
    System,
    Ai,
}

/// An immutable entry in the [`EventLog`](crate::EventLog).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    /// Unique among the entries currently held by the log.
    pub id: u64,
    /// Wall-clock time of the append, `HH:MM:SS`.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
}
