//! Error type for the dehazing engine.
//!
//! Every failure is reported synchronously as the result of the failing
//! call. Nothing is retried inside the engine: a retry with the same
//! parameters would fail the same way.

use thiserror::Error;

/// Errors reported by [`DcpEngine`](crate::DcpEngine) and its stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DcpError {
    /// Width or height is zero.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Scaling factor outside `(0, 1]`.
    #[error("Invalid scaling factor {0} (expected a value in (0, 1])")]
    InvalidScale(f32),

    /// Image shape differs from the one the context was initialized with.
    #[error("Image is {width}x{height}, context was initialized for {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    /// A `process` call is already running against this context.
    #[error("Context is busy with another process call")]
    Busy,

    /// A LUT, working buffer or the worker pool could not be allocated.
    #[error("Failed to allocate {what}")]
    AllocationFailure { what: &'static str },

    /// `process` was called before `initialize` or after `release`.
    #[error("Engine is not initialized")]
    NotInitialized,

    /// A parameter violates its documented range or invariant.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type DcpResult<T> = Result<T, DcpError>;
