use abm_core::RunId;
use abm_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    /// The sweep references a parameter the target model does not recognize
    /// (or a value of the wrong type).  Raised before any instance runs.
    #[error("invalid parameter spec: {reason}")]
    InvalidParameterSpec { reason: String },

    #[error("batch configuration error: {0}")]
    Config(String),
}

pub type BatchResult<T> = Result<T, BatchError>;

/// One contained instance failure: the batch carries on, the caller gets
/// the full context of what was skipped.
#[derive(Debug)]
pub struct InstanceFailure {
    pub run:         RunId,
    /// Index into the expanded combination list.
    pub combination: usize,
    /// Repetition number within that combination.
    pub iteration:   u32,
    pub error:       EngineError,
}
