use thiserror::Error;

/// Result type for the analysis core.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised by the analysis core.
///
/// These are caller-side input-shape violations and always surface as
/// errors. Insufficient-data conditions (no overlapping observations, zero
/// variance, empty groups) are *not* errors; they travel through the
/// pipeline as `None` values so one degenerate feature or rater cannot
/// sink the rest of a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two vectors that must be index-aligned have different lengths.
    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Matrices that must share a dimension do not.
    #[error("matrix dimension mismatch: expected {expected}x{expected}, got {found}x{found}")]
    DimensionMismatch { expected: usize, found: usize },
}
