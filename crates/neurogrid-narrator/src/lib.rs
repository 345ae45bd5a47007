//! neurogrid-narrator — AI commentary for the NeuroGrid event log.
//!
//! Wraps a remote text-generation service behind a non-failing contract:
//! every call resolves to text, degrading to a fixed fallback line when the
//! service is unreachable, slow, over quota, or returns nothing useful.
//!
//! # Architecture
//!
//! ```text
//! Narrator
//!   ├── narrate(metrics, config, recent) → String   (periodic, gated by caller)
//!   ├── plan(metrics) → String                      (on demand)
//!   └── Arc<dyn TextGenerator>
//!         ├── HttpGenerator    POST JSON over hyper http1
//!         └── OfflineGenerator always fails → fallback
//! ```
//!
//! Failures are traced for diagnostics and never surface to the caller.

pub mod error;
pub mod generator;
pub mod narrator;
pub mod prompt;

pub use error::NarratorError;
pub use generator::{
    BoxFuture, GenerationRequest, HttpGenerator, NarrationContext, OfflineGenerator, TextGenerator,
};
pub use narrator::{NARRATION_FALLBACK, Narrator, NarratorSettings, PLAN_FALLBACK};
