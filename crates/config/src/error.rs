//! Error types for configuration validation and resolution.

use thiserror::Error;

/// Render a breadcrumb chain as `a > b > a`.
fn chain(names: &[String]) -> String {
    names.join(" > ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while validating or resolving a configuration document.
///
/// All variants are fatal: resolution stops at the first one and the
/// effective configuration is never produced. Recoverable conditions
/// (unknown partial, unmatched order item) are logged as warnings instead.
pub enum Error {
    #[error("Invalid configuration: {message}")]
    /// Structural violation in the raw document. The message carries a path
    /// qualifier such as `exceptions[0]` or `item "logbook"`.
    Validation {
        /// Human-readable, path-qualified description of the violation.
        message: String,
    },

    #[error("Invalid configuration: {referrer} extends unknown fragment \"{name}\"")]
    /// An `extend_from` entry names a fragment that does not exist.
    UnknownExtend {
        /// The declaring scope, e.g. `fragment "compact"` or `exceptions[1]`.
        referrer: String,
        /// The missing fragment name.
        name: String,
    },

    #[error("Invalid configuration: circular extend_from chain: {}", chain(.names))]
    /// The fragment inheritance graph contains a cycle.
    ExtendCycle {
        /// The cycle, starting and ending at the first revisited name.
        names: Vec<String>,
    },

    #[error("Invalid configuration: circular partial reference: {}", chain(.names))]
    /// The partial reference graph contains a cycle.
    PartialCycle {
        /// The cycle, starting and ending at the first revisited name.
        names: Vec<String>,
    },

    #[error("Invalid configuration: {referrer} may not extend from \"base\"")]
    /// The `base` keyword was used outside an override chain.
    BaseNotAllowed {
        /// The declaring scope, e.g. `document` or `fragment "compact"`.
        referrer: String,
    },
}

impl Error {
    /// Structural violation with an already-qualified message.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// The subsystem this error originates from.
    fn subsystem(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::UnknownExtend { .. } | Self::ExtendCycle { .. } | Self::BaseNotAllowed { .. } => {
                "inheritance"
            }
            Self::PartialCycle { .. } => "partials",
        }
    }

    /// Render the full human-friendly form: the failing subsystem on the
    /// first line, the path-qualified detail beneath it.
    pub fn pretty(&self) -> String {
        format!("Config {} error\n{self}", self.subsystem())
    }
}
