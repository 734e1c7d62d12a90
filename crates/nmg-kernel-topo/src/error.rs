//! Error types for NMG kernel operations.

use nmg_kernel_math::ToleranceError;
use thiserror::Error;

/// Errors raised by topology construction, fusing and classification.
///
/// None of these abort; the caller decides whether to retry with a looser
/// tolerance, skip the offending element, or give up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NmgError {
    /// Two candidates are equidistant within tolerance and disagree.
    #[error("tolerance ambiguity: {0}")]
    ToleranceAmbiguity(String),

    /// Zero-length edge, zero-area loop, singular plane fit and the like.
    #[error("degenerate topology: {0}")]
    DegenerateTopology(String),

    /// Orientation alternation around an edge, or loop parity in a face, failed.
    #[error("parity violation: {0}")]
    ParityViolation(String),

    /// The point classifier could not settle a crack.
    #[error("unknown classification: {0}")]
    UnknownClassification(String),

    /// A key no longer resolves to a live node.
    #[error("stale {0} handle")]
    StaleHandle(&'static str),

    /// A plane or line was required but the geometry is a spline.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Structural check failed (broken mate/radial links, dangling parents).
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Tolerance record is unusable.
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(#[from] ToleranceError),

    /// A progress hook asked the operation to stop.
    #[error("cancelled during {stage}")]
    Cancelled {
        /// Pipeline stage that was running.
        stage: &'static str,
    },
}

/// Result type for NMG kernel operations.
pub type Result<T> = std::result::Result<T, NmgError>;
