//! neurogrid-metrics — telemetry for the simulated NeuroGrid cluster.
//!
//! Produces the next `SystemMetrics` sample from the previous one and
//! renders the current state in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! NoiseSource (seeded StdRng in production, scripted in tests)
//!   └── step(prev, node_count, artificial_load) → SystemMetrics
//!
//! Prometheus exposition
//!   └── render_prometheus(&Snapshot) → text/plain for /metrics
//! ```
//!
//! # Model
//!
//! ```text
//! base  = 10 + nodes / 2
//! cpu   = clamp(base + load + U(-5, 5), 5, 100)
//! mem   = clamp(mem + (cpu - mem) * 0.1 + U(-2.5, 2.5), 10, 100)
//! lat   = 40 + cpu * 0.5 + U(0, 20)
//! temp  = 40 + cpu * 0.4
//! ```
//!
//! Memory is a first-order low-pass filter over CPU, so it lags and
//! smooths CPU spikes instead of tracking them.

pub mod noise;
pub mod prometheus;
pub mod simulator;

pub use noise::{NoiseSource, SeededNoise};
pub use prometheus::render_prometheus;
pub use simulator::step;
