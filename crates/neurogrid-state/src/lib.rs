//! neurogrid-state — shared state for the NeuroGrid control loop.
//!
//! Holds the value types that flow between the simulator, the autoscale
//! policy, the narrator, and the HTTP surface, plus the two bounded
//! buffers the dashboard charts from.
//!
//! # Architecture
//!
//! ```text
//! SystemMetrics ──► HistoryBuffer (HISTORY_LENGTH samples, FIFO)
//! ClusterConfig
//! EventLog (LOG_CAPACITY entries, FIFO)
//!        └──► Snapshot (read-only view for renderers)
//! ```
//!
//! Nothing here is persisted; every structure is rebuilt at process start.

pub mod history;
pub mod limits;
pub mod log;
pub mod snapshot;
pub mod types;

pub use history::HistoryBuffer;
pub use limits::*;
pub use log::EventLog;
pub use snapshot::{Snapshot, StressView, Topology};
pub use types::*;
