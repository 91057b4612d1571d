use thiserror::Error;

/// Crate-local result type for clipping operations.
pub type Result<T> = std::result::Result<T, ClipError>;

/// All failure modes of the Boolean core.
///
/// The engine itself is deterministic over valid input and performs no I/O,
/// so everything here is detected either before the first scanline runs or
/// when an algorithmic invariant is found broken mid-run.
#[derive(Debug, Error)]
pub enum ClipError {
    /// A coordinate lies outside the supported range (±1e18). The limit
    /// leaves headroom so 128-bit intermediates cannot overflow.
    #[error("coordinate outside the supported range of +/-1e18")]
    CoordinateOutOfRange,

    /// A closed path failed structural validation (for example a vertex
    /// ring whose links do not close). Cleaning the input and retrying is
    /// a reasonable caller response.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal invariant (AEL ordering, output-ring integrity) was
    /// detected violated during processing. This is a bug in the engine,
    /// not a data problem.
    #[error("internal invariant violated: {0}")]
    InternalError(&'static str),
}

/// Helper for building an [`ClipError::InvalidInput`] result.
pub(crate) fn invalid_input<T>(msg: &str) -> Result<T> {
    Err(ClipError::InvalidInput(msg.to_string()))
}
