//! Dark channel: per-pixel channel minimum followed by a windowed minimum.

use std::collections::VecDeque;

use crate::image::CHANNELS;
use crate::params::EdgeMode;
use crate::pool::WorkerPool;

use super::separable;

/// Sliding minimum of radius `radius` along one line.
///
/// Monotonic-deque formulation: each source sample enters and leaves the
/// deque once, so the cost does not depend on the radius. Window positions
/// outside the line are resolved through `mode`.
pub fn sliding_min_line(src: &[u8], radius: usize, mode: EdgeMode, dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let n = src.len();
    if n == 0 {
        return;
    }
    let r = radius as isize;
    let mut window: VecDeque<(isize, u8)> = VecDeque::with_capacity(2 * radius + 1);
    let mut next = -r;
    for (i, out) in dst.iter_mut().enumerate() {
        let i = i as isize;
        while next <= i + r {
            let v = src[mode.resolve(next, n)];
            while window.back().is_some_and(|&(_, back)| back >= v) {
                window.pop_back();
            }
            window.push_back((next, v));
            next += 1;
        }
        while window.front().is_some_and(|&(pos, _)| pos < i - r) {
            window.pop_front();
        }
        *out = window.front().map_or(u8::MAX, |&(_, v)| v);
    }
}

/// Windowed minimum over color channels and a square neighbourhood.
///
/// `dark(x, y) = min over c, min over |dx|, |dy| <= radius of
/// pixel(x + dx, y + dy, c)`, evaluated on the working grid.
#[derive(Debug, Clone, Copy)]
pub struct DarkChannelFilter {
    radius: usize,
    mode: EdgeMode,
}

impl DarkChannelFilter {
    /// `radius` is in working-resolution pixels.
    pub fn new(radius: usize, mode: EdgeMode) -> Self {
        Self { radius, mode }
    }

    /// Compute the dark channel of interleaved RGB `rgb` into `dark`.
    ///
    /// `dark` and `tmp` hold `width * height` samples.
    pub fn compute(
        &self,
        pool: &WorkerPool,
        rgb: &[u8],
        width: usize,
        height: usize,
        dark: &mut [u8],
        tmp: &mut [u8],
    ) {
        debug_assert_eq!(rgb.len(), width * height * CHANNELS);
        pool.for_each_row(dark, width, |y, row| {
            let src = &rgb[y * width * CHANNELS..][..width * CHANNELS];
            for (out, px) in row.iter_mut().zip(src.chunks_exact(CHANNELS)) {
                *out = px[0].min(px[1]).min(px[2]);
            }
        });
        let (radius, mode) = (self.radius, self.mode);
        separable(pool, dark, width, height, tmp, |src, dst| {
            sliding_min_line(src, radius, mode, dst)
        });
    }
}
