//! neurogrid-control — the NeuroGrid control loop.
//!
//! One task owns all mutable state (metrics, cluster config, history, event
//! log, stress pulse) and is the only writer. Timers, user commands, and
//! finished narration requests are multiplexed into that task, so no two
//! mutations ever interleave.
//!
//! # Architecture
//!
//! ```text
//! Engine::run
//!   ├── metrics tick    → step() → HistoryBuffer
//!   ├── autoscale tick  → evaluate() → ClusterConfig + EventLog
//!   ├── narration tick  → NarrationGate → spawn Narrator::narrate (JoinSet)
//!   ├── JoinSet result  → EventLog (AI)
//!   ├── stress deadline → StressState::Idle + EventLog
//!   ├── Command (mpsc)  ← EngineHandle (API, CLI)
//!   └── publish         → watch::Sender<Arc<Snapshot>>
//! ```
//!
//! Narration runs outside the loop and never delays a tick; on shutdown any
//! request still in flight is aborted.

pub mod engine;
pub mod error;
pub mod gate;
pub mod handle;
pub mod settings;
pub mod state;
pub mod stress;

pub use engine::Engine;
pub use error::ControlError;
pub use gate::NarrationGate;
pub use handle::{Command, EngineHandle};
pub use settings::EngineSettings;
pub use state::EngineState;
pub use stress::{MAX_PULSE, StressState, StressTransition};
