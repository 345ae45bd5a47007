//! Handle used by the API and the daemon to talk to a running engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use neurogrid_state::Snapshot;

use crate::error::ControlError;

/// User actions, applied by the control loop in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetAutoscale(bool),
    /// Set the artificial load; clamped to `[0, 80]`.
    SetLoad(f64),
    /// Start (or merge into) a stress pulse.
    Stress { amount: f64, duration: Duration },
    /// Append a manual diagnostic entry.
    Diagnostic,
}

/// Cloneable sender of commands and reader of published snapshots.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl EngineHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        snapshots: watch::Receiver<Arc<Snapshot>>,
    ) -> Self {
        Self {
            commands,
            snapshots,
        }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Wait until the engine publishes a snapshot newer than the last one
    /// seen by this handle.
    pub async fn changed(&mut self) -> Result<Arc<Snapshot>, ControlError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| ControlError::EngineStopped)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Whether the control loop is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    pub async fn send(&self, command: Command) -> Result<(), ControlError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControlError::EngineStopped)
    }

    pub async fn set_autoscale(&self, enabled: bool) -> Result<(), ControlError> {
        self.send(Command::SetAutoscale(enabled)).await
    }

    pub async fn set_load(&self, load: f64) -> Result<(), ControlError> {
        self.send(Command::SetLoad(load)).await
    }

    /// Trigger a stress pulse. Durations beyond [`crate::MAX_PULSE`] are
    /// shortened to it.
    pub async fn stress(&self, amount: f64, duration: Duration) -> Result<(), ControlError> {
        self.send(Command::Stress { amount, duration }).await
    }

    pub async fn diagnostic(&self) -> Result<(), ControlError> {
        self.send(Command::Diagnostic).await
    }
}
