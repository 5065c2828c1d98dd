use abm_core::AbmError;
use abm_space::SpaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] AbmError),

    /// A grid operation failed.  During a run this means the movement rule
    /// produced an out-of-range coordinate — a bug, fatal to the instance.
    #[error(transparent)]
    Space(#[from] SpaceError),
}

pub type EngineResult<T> = Result<T, EngineError>;
