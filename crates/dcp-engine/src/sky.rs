//! Sky detection and transmission blending.
//!
//! The dark channel prior assumes every haze-free patch has a dark pixel.
//! Sky has none, so the prior reads bright sky as dense haze and the
//! compositor then over-amplifies it into noise and color casts. Pixels
//! that are bright and locally flat are treated as sky and their
//! transmission is lifted toward 1 before the final clamp.

use crate::params::DcpParams;
use crate::pool::WorkerPool;

/// Local variance is compared in squared percent of full scale.
const VARIANCE_SCALE: f32 = 1.0e4;

#[derive(Debug, Clone, Copy)]
pub struct SkyDetector {
    /// Minimum luminance, 8-bit scale.
    threshold: f32,
    /// Exclusive variance limit, squared percent.
    max_var: f32,
    t0: f32,
    t1: f32,
}

impl SkyDetector {
    pub fn from_params(params: &DcpParams) -> Self {
        Self {
            threshold: params.sky_threshold(),
            max_var: params.sky_var,
            t0: params.t0,
            t1: params.t1,
        }
    }

    /// Whether a pixel with luminance `luma` and local variance `variance`
    /// (both on the normalized `0..1` guide scale) is sky.
    #[inline]
    pub fn is_sky(&self, luma: f32, variance: f32) -> bool {
        luma * 255.0 >= self.threshold && variance * VARIANCE_SCALE < self.max_var
    }

    /// Blend weight in `[0, 1]`; zero for non-sky pixels.
    ///
    /// Grows linearly with the distance above the luminance threshold and
    /// with the distance below the variance limit, so the sky boundary has
    /// no hard edge.
    #[inline]
    pub fn weight(&self, luma: f32, variance: f32) -> f32 {
        if !self.is_sky(luma, variance) {
            return 0.0;
        }
        let span = (255.0 - self.threshold).max(1.0);
        let brightness = ((luma * 255.0 - self.threshold) / span).clamp(0.0, 1.0);
        let flatness = 1.0 - variance * VARIANCE_SCALE / self.max_var;
        brightness * flatness
    }

    /// `t + w * (1 - t)`, clamped back into `[t0, t1]`. Never below `t`.
    #[inline]
    pub fn blend(&self, t: f32, weight: f32) -> f32 {
        (t + weight * (1.0 - t)).clamp(self.t0, self.t1)
    }

    /// Lift the transmission of sky pixels in place.
    ///
    /// `guide` and `variance` are the luminance guide and its local
    /// variance; `weights` receives the per-pixel blend weight. Returns the
    /// number of sky pixels.
    pub fn apply(
        &self,
        pool: &WorkerPool,
        guide: &[f32],
        variance: &[f32],
        width: usize,
        transmission: &mut [f32],
        weights: &mut [f32],
    ) -> usize {
        pool.for_each_row(weights, width, |y, row| {
            let base = y * width;
            for (x, w) in row.iter_mut().enumerate() {
                *w = self.weight(guide[base + x], variance[base + x]);
            }
        });
        {
            let weights = &*weights;
            pool.for_each_row(transmission, width, |y, row| {
                let base = y * width;
                for (x, t) in row.iter_mut().enumerate() {
                    *t = self.blend(*t, weights[base + x]);
                }
            });
        }
        guide
            .iter()
            .zip(variance)
            .filter(|(&luma, &var)| self.is_sky(luma, var))
            .count()
    }
}
