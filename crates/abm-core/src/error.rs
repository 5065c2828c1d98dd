//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into `AbmError`
//! via `From` impls or wrap it as one variant.  Both patterns are acceptable;
//! prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `abm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum AbmError {
    /// A configuration value is outside its valid domain.  Surfaced at model
    /// construction, before any simulation state exists; fatal to that run.
    #[error("configuration error: {0}")]
    Config(String),

    /// A parameter name is not part of the target model's configuration
    /// schema.  Raised when applying sweep parameters by name.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),
}

/// Shorthand result type for all `abm-*` crates.
pub type AbmResult<T> = Result<T, AbmError>;
