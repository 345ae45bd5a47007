//! Error types for talking to the control loop.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("control loop has stopped")]
    EngineStopped,
}
