//! Fixed-size worker pool for row-tiled image stages.
//!
//! Each stage hands the pool one mutable output buffer. The buffer is cut
//! into row-contiguous tiles, one task per tile, and the call returns only
//! after every tile is done. That return is the barrier between stages:
//! the next stage may read everything the previous one wrote.

use rayon::prelude::*;

use crate::error::{DcpError, DcpResult};

/// A fixed pool of worker threads, created at `initialize` and dropped at
/// `release`.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

impl WorkerPool {
    /// Spawn `threads` workers (0 = one per available core).
    pub fn new(threads: usize) -> DcpResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dcp-worker-{i}"))
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, threads, "Failed to build worker pool");
                DcpError::AllocationFailure {
                    what: "worker pool",
                }
            })?;
        let threads = pool.current_num_threads();
        Ok(Self { pool, threads })
    }

    /// Number of worker threads.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `f(first_row, tile)` over row tiles of `data`.
    ///
    /// `data` holds rows of `row_len` elements. Tiles are disjoint, so `f`
    /// only ever sees its own rows. Returns once every tile has finished.
    pub fn for_each_tile<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if data.is_empty() || row_len == 0 {
            return;
        }
        let rows = data.len() / row_len;
        let rows_per_tile = rows.div_ceil(self.threads).max(1);
        self.pool.install(|| {
            data.par_chunks_mut(rows_per_tile * row_len)
                .enumerate()
                .for_each(|(tile, chunk)| f(tile * rows_per_tile, chunk));
        });
    }

    /// Run `f(row_index, row)` over every row of `data`, tiled across the
    /// workers. Returns once every row has finished.
    pub fn for_each_row<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        self.for_each_tile(data, row_len, |first_row, tile| {
            for (i, row) in tile.chunks_mut(row_len).enumerate() {
                f(first_row + i, row);
            }
        });
    }
}
