//! Bridge error types
//!
//! Only direct calls report errors. Nothing here is ever raised across the
//! callback boundary, and a gate rejection is not an error at all (see
//! [`DropReason`](crate::lifecycle::DropReason)).

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::LifecycleState;
use crate::pacer::RefreshSourceError;

/// Errors reported by window and app operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The refresh source could not be armed. Recoverable: a later
    /// `request_frame` call retries.
    #[error("Frame pacer failed to start: {0}")]
    PacerStartFailed(#[from] RefreshSourceError),

    /// State was pushed into an object that has already been torn down
    #[error("Invalid transition: {operation} while {from:?}")]
    InvalidTransition {
        /// State the object was in
        from: LifecycleState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Configuration could not be used
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
