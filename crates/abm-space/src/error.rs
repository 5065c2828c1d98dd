use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpaceError {
    /// A coordinate lies outside `[0, width) × [0, height)`.  Indicates a
    /// movement-rule bug in the caller; fatal, never silently clamped.
    #[error("cell ({x}, {y}) is outside the {width}×{height} grid")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    /// Grid dimensions must both be positive.
    #[error("grid dimensions must be positive, got {width}×{height}")]
    ZeroDimension { width: u32, height: u32 },
}

pub type SpaceResult<T> = Result<T, SpaceError>;
