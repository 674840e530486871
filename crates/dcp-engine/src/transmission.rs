//! Transmission map estimation on the working grid.
//!
//! `t = 1 - omega * dark / A`, refined under the luminance guide and
//! clamped to `[t0, t1]`. The sky blend and the upsample to full
//! resolution follow in the engine.

use crate::filter::{GuidedFilter, GuidedScratch};
use crate::image::CHANNELS;
use crate::params::DcpParams;
use crate::pool::WorkerPool;

/// Rec. 601 luma weights.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Luminance of interleaved RGB `rgb`, normalized to `0..1`, into `guide`.
pub fn luminance(pool: &WorkerPool, rgb: &[u8], width: usize, guide: &mut [f32]) {
    debug_assert_eq!(rgb.len(), guide.len() * CHANNELS);
    pool.for_each_row(guide, width, |y, row| {
        let src = &rgb[y * width * CHANNELS..][..width * CHANNELS];
        for (out, px) in row.iter_mut().zip(src.chunks_exact(CHANNELS)) {
            let luma: f32 = px.iter().zip(LUMA).map(|(&v, w)| v as f32 * w).sum();
            *out = luma / 255.0;
        }
    });
}

#[derive(Debug, Clone, Copy)]
pub struct TransmissionEstimator {
    omega: f32,
    t0: f32,
    t1: f32,
}

impl TransmissionEstimator {
    pub fn new(omega: f32, t0: f32, t1: f32) -> Self {
        Self { omega, t0, t1 }
    }

    pub fn from_params(params: &DcpParams) -> Self {
        Self::new(params.omega, params.t0, params.t1)
    }

    /// Unrefined transmission from the dark channel and the combined
    /// airlight. An airlight below one level is treated as one.
    pub fn raw(&self, pool: &WorkerPool, dark: &[u8], width: usize, airlight: f32, out: &mut [f32]) {
        let scale = self.omega / airlight.max(1.0);
        pool.for_each_row(out, width, |y, row| {
            let src = &dark[y * width..][..width];
            for (t, &d) in row.iter_mut().zip(src) {
                *t = 1.0 - scale * d as f32;
            }
        });
    }

    /// Guided refinement of `raw` into `out`, then the `[t0, t1]` clamp.
    #[allow(clippy::too_many_arguments)]
    pub fn refine(
        &self,
        pool: &WorkerPool,
        filter: &GuidedFilter,
        guide: &[f32],
        raw: &[f32],
        width: usize,
        height: usize,
        scratch: &mut GuidedScratch,
        out: &mut [f32],
    ) {
        filter.apply(pool, guide, raw, width, height, scratch, out);
        self.clamp(pool, out, width);
    }

    pub fn clamp(&self, pool: &WorkerPool, t: &mut [f32], width: usize) {
        let (t0, t1) = (self.t0, self.t1);
        pool.for_each_row(t, width, |_, row| {
            for v in row {
                *v = v.clamp(t0, t1);
            }
        });
    }
}
