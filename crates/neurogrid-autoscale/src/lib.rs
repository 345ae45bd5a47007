//! neurogrid-autoscale — CPU-driven node scaling.
//!
//! A pure decision function: given the latest CPU load and the current
//! `ClusterConfig`, return the next config and a human-readable reason, or
//! nothing when no change is warranted.
//!
//! # Scaling Algorithm
//!
//! ```text
//! if cpu > 85:
//!     target = max(nodes - floor(nodes * 0.2), MIN_NODES)   // shed 20%
//! elif cpu < 40:
//!     target = min(nodes + 5, MAX_NODES)                    // grow by 5
//! else:
//!     no change                                             // dead zone
//!
//! if target == nodes: no change
//! ```
//!
//! The disjoint trigger bands and the asymmetric step sizes leave a dead
//! zone of `[40, 85]` where the cluster holds steady, which keeps it from
//! oscillating. The control loop also evaluates the policy on a slower
//! cadence than it samples metrics.

pub mod policy;

pub use policy::{ScaleDecision, ScaleDirection, classify, evaluate};
