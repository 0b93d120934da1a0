use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the panetune engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors originating from configuration resolution.
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),

    /// The evaluator rejected a subscription request.
    #[error("Evaluator rejected subscription: {0}")]
    Subscribe(String),
}
