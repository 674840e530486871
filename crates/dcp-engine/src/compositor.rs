//! Scene radiance recovery at full resolution.

use crate::image::{RgbImage, CHANNELS};
use crate::params::AIRLIGHT_CHANNELS;
use crate::pool::WorkerPool;

/// Inverts the haze model `I = J * t + A * (1 - t)` per pixel and channel:
/// `J = (I - A) / max(t, t0) + A`, rounded and clamped to `0..=255`.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    airlight: [f32; CHANNELS],
    t0: f32,
}

impl Compositor {
    pub fn new(airlight: [f32; AIRLIGHT_CHANNELS], t0: f32) -> Self {
        Self {
            airlight: [airlight[0], airlight[1], airlight[2]],
            t0,
        }
    }

    /// Recover one channel value.
    #[inline]
    pub fn recover(&self, value: u8, channel: usize, t: f32) -> u8 {
        let a = self.airlight[channel];
        ((value as f32 - a) / t.max(self.t0) + a)
            .round()
            .clamp(0.0, 255.0) as u8
    }

    /// Write the dehazed `input` into `output`.
    ///
    /// `transmission` holds one full-resolution sample per pixel. `output`
    /// must have the shape of `input`.
    pub fn compose(&self, pool: &WorkerPool, input: &RgbImage, transmission: &[f32], output: &mut RgbImage) {
        debug_assert_eq!(input.dimensions(), output.dimensions());
        debug_assert_eq!(transmission.len(), input.len());
        let width = input.width() as usize;
        let stride = width * CHANNELS;
        let src = input.as_raw();
        pool.for_each_row(output.as_raw_mut(), stride, |y, row| {
            let in_row = &src[y * stride..][..stride];
            let t_row = &transmission[y * width..][..width];
            for ((out, px), &t) in row
                .chunks_exact_mut(CHANNELS)
                .zip(in_row.chunks_exact(CHANNELS))
                .zip(t_row)
            {
                for c in 0..CHANNELS {
                    out[c] = self.recover(px[c], c, t);
                }
            }
        });
    }
}
