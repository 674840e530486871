//! Per-session sizing: [`FrameContext`] and its [`LookupTables`].

mod context;
mod lut;

pub use context::FrameContext;
pub use lut::{LookupTables, Tap};

use crate::error::{DcpError, DcpResult};

/// Allocate `len` copies of `fill`, reporting failure instead of aborting.
pub(crate) fn try_alloc<T: Clone>(len: usize, fill: T, what: &'static str) -> DcpResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        tracing::warn!(error = %e, len, what, "Allocation failed");
        DcpError::AllocationFailure { what }
    })?;
    buf.resize(len, fill);
    Ok(buf)
}
