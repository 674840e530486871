//! Guided filter (He, Sun and Tang) for edge-aware transmission refinement.
//!
//! The windowed minimum behind the dark channel leaves block artifacts in
//! the raw transmission. The guided filter fits, in every box window, a
//! linear model `q = a * I + b` of the output against the guide luminance
//! `I`, then averages the per-window coefficients. Flat guide regions
//! (low variance relative to `eps`) are smoothed; guide edges survive.

use crate::error::DcpResult;
use crate::frame::try_alloc;
use crate::params::EdgeMode;
use crate::pool::WorkerPool;

use super::box_mean;

/// Working buffers of the guided filter, allocated once per session.
///
/// After [`GuidedFilter::apply`] returns, `mean_i` and `var_i` hold the
/// local mean and variance of the guide over the filter window. The sky
/// detector reuses them.
#[derive(Debug)]
pub struct GuidedScratch {
    pub mean_i: Vec<f32>,
    pub var_i: Vec<f32>,
    mean_p: Vec<f32>,
    a: Vec<f32>,
    b: Vec<f32>,
    tmp: Vec<f32>,
}

impl GuidedScratch {
    pub fn new(len: usize) -> DcpResult<Self> {
        let what = "guided filter buffers";
        Ok(Self {
            mean_i: try_alloc(len, 0.0, what)?,
            var_i: try_alloc(len, 0.0, what)?,
            mean_p: try_alloc(len, 0.0, what)?,
            a: try_alloc(len, 0.0, what)?,
            b: try_alloc(len, 0.0, what)?,
            tmp: try_alloc(len, 0.0, what)?,
        })
    }
}

/// Overwrite every element with `f(index, old_value)`, tiled across the pool.
fn map_indexed<F>(pool: &WorkerPool, data: &mut [f32], width: usize, f: F)
where
    F: Fn(usize, f32) -> f32 + Send + Sync,
{
    pool.for_each_row(data, width, |y, row| {
        let base = y * width;
        for (x, v) in row.iter_mut().enumerate() {
            *v = f(base + x, *v);
        }
    });
}

/// Edge-aware smoothing of a map under a guide image.
#[derive(Debug, Clone, Copy)]
pub struct GuidedFilter {
    radius: usize,
    eps: f32,
    mode: EdgeMode,
}

impl GuidedFilter {
    /// `radius` is in working-resolution pixels; `eps` regularizes the
    /// per-window slope against a guide normalized to `0..1`.
    pub fn new(radius: usize, eps: f32, mode: EdgeMode) -> Self {
        Self { radius, eps, mode }
    }

    /// Filter `input` under `guide` into `out`.
    ///
    /// All slices hold `width * height` samples.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        pool: &WorkerPool,
        guide: &[f32],
        input: &[f32],
        width: usize,
        height: usize,
        scratch: &mut GuidedScratch,
        out: &mut [f32],
    ) {
        let GuidedScratch {
            mean_i,
            var_i,
            mean_p,
            a,
            b,
            tmp,
        } = scratch;
        let (r, mode, eps) = (self.radius, self.mode, self.eps);

        mean_i.copy_from_slice(guide);
        box_mean(pool, mean_i, width, height, r, mode, tmp);

        map_indexed(pool, var_i, width, |i, _| guide[i] * guide[i]);
        box_mean(pool, var_i, width, height, r, mode, tmp);
        {
            let mean_i = &*mean_i;
            map_indexed(pool, var_i, width, |i, corr| {
                (corr - mean_i[i] * mean_i[i]).max(0.0)
            });
        }

        mean_p.copy_from_slice(input);
        box_mean(pool, mean_p, width, height, r, mode, tmp);

        map_indexed(pool, a, width, |i, _| guide[i] * input[i]);
        box_mean(pool, a, width, height, r, mode, tmp);
        {
            let (mean_i, var_i, mean_p) = (&*mean_i, &*var_i, &*mean_p);
            map_indexed(pool, a, width, |i, corr| {
                (corr - mean_i[i] * mean_p[i]) / (var_i[i] + eps)
            });
            let a = &*a;
            map_indexed(pool, b, width, |i, _| mean_p[i] - a[i] * mean_i[i]);
        }

        box_mean(pool, a, width, height, r, mode, tmp);
        box_mean(pool, b, width, height, r, mode, tmp);

        let (a, b) = (&*a, &*b);
        map_indexed(pool, out, width, |i, _| a[i] * guide[i] + b[i]);
    }
}
