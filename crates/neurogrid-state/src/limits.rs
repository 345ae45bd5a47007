//! Build-time limits shared across the workspace.

/// Smallest cluster the autoscaler will shrink to.
pub const MIN_NODES: u32 = 10;

/// Largest cluster the autoscaler will grow to.
pub const MAX_NODES: u32 = 100;

/// Node count at process start.
pub const INITIAL_NODES: u32 = 24;

/// Samples retained for the time-series charts.
pub const HISTORY_LENGTH: usize = 30;

/// Entries retained in the event log.
pub const LOG_CAPACITY: usize = 50;

/// Upper bound of the user-controlled artificial load.
pub const MAX_ARTIFICIAL_LOAD: f64 = 80.0;

/// Clamp a requested artificial load into `[0, MAX_ARTIFICIAL_LOAD]`.
///
/// NaN is treated as zero load.
pub fn clamp_artificial_load(load: f64) -> f64 {
    if load.is_nan() {
        return 0.0;
    }
    load.clamp(0.0, MAX_ARTIFICIAL_LOAD)
}

/// Clamp a node count into `[MIN_NODES, MAX_NODES]`.
pub fn clamp_nodes(nodes: u32) -> u32 {
    nodes.clamp(MIN_NODES, MAX_NODES)
}
