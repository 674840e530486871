//! Lookup tables between full and working resolution.
//!
//! Bilinear resampling is separable, so each direction is stored as two
//! axis tables (one per image axis). The bilinear footprint of a
//! full-resolution pixel `(x, y)` is the product of its column tap and its
//! row tap.
//!
//! Sample centres are aligned (`(i + 0.5) * ratio - 0.5`), so a scaling
//! factor of 1.0 produces taps with zero fractional weight and resampling
//! becomes an exact copy.

use crate::error::DcpResult;
use crate::image::{RgbImage, CHANNELS};
use crate::pool::WorkerPool;

use super::try_alloc;

/// One axis tap: `value = src[i0] * (1 - w) + src[i1] * w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub i0: u32,
    pub i1: u32,
    pub w: f32,
}

impl Tap {
    /// Index of the closer of the two source samples.
    #[inline]
    pub fn nearest(&self) -> usize {
        if self.w < 0.5 {
            self.i0 as usize
        } else {
            self.i1 as usize
        }
    }
}

/// Build the taps mapping `dst_len` destination samples onto `src_len`
/// source samples.
fn build_axis(dst_len: usize, src_len: usize, what: &'static str) -> DcpResult<Vec<Tap>> {
    let mut taps = try_alloc(
        dst_len,
        Tap {
            i0: 0,
            i1: 0,
            w: 0.0,
        },
        what,
    )?;
    let ratio = src_len as f64 / dst_len as f64;
    let last = (src_len - 1) as f64;
    for (d, tap) in taps.iter_mut().enumerate() {
        let pos = ((d as f64 + 0.5) * ratio - 0.5).clamp(0.0, last);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(src_len - 1);
        *tap = Tap {
            i0: i0 as u32,
            i1: i1 as u32,
            w: (pos - i0 as f64) as f32,
        };
    }
    Ok(taps)
}

#[inline]
fn lerp(a: f32, b: f32, w: f32) -> f32 {
    a + (b - a) * w
}

/// Index and weight tables for one `FrameContext`, built once and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct LookupTables {
    width: usize,
    height: usize,
    wid_down: usize,
    hei_down: usize,
    /// Full-resolution column -> working columns.
    up_x: Vec<Tap>,
    /// Full-resolution row -> working rows.
    up_y: Vec<Tap>,
    /// Working column -> full-resolution columns.
    down_x: Vec<Tap>,
    /// Working row -> full-resolution rows.
    down_y: Vec<Tap>,
}

impl LookupTables {
    /// Build the tables for a `width x height` image processed at
    /// `wid_down x hei_down`.
    ///
    /// All dimensions must be non-zero.
    pub fn new(wid_down: usize, hei_down: usize, width: usize, height: usize) -> DcpResult<Self> {
        Ok(Self {
            width,
            height,
            wid_down,
            hei_down,
            up_x: build_axis(width, wid_down, "lookup tables")?,
            up_y: build_axis(height, hei_down, "lookup tables")?,
            down_x: build_axis(wid_down, width, "lookup tables")?,
            down_y: build_axis(hei_down, height, "lookup tables")?,
        })
    }

    /// Full-resolution pixel closest to working pixel `(xd, yd)`.
    #[inline]
    pub fn source_pixel(&self, xd: usize, yd: usize) -> (usize, usize) {
        (self.down_x[xd].nearest(), self.down_y[yd].nearest())
    }

    /// Resample the full-resolution input to the working grid.
    ///
    /// `dst` holds `wid_down * hei_down` interleaved RGB pixels.
    pub fn downsample(&self, pool: &WorkerPool, src: &RgbImage, dst: &mut [u8]) {
        debug_assert_eq!(src.len(), self.width * self.height);
        debug_assert_eq!(dst.len(), self.wid_down * self.hei_down * CHANNELS);
        let src = src.as_raw();
        let stride = self.width * CHANNELS;
        pool.for_each_row(dst, self.wid_down * CHANNELS, |yd, row| {
            let ty = self.down_y[yd];
            let row0 = &src[ty.i0 as usize * stride..][..stride];
            let row1 = &src[ty.i1 as usize * stride..][..stride];
            for (xd, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let tx = self.down_x[xd];
                let (c0, c1) = (tx.i0 as usize * CHANNELS, tx.i1 as usize * CHANNELS);
                for c in 0..CHANNELS {
                    let top = lerp(row0[c0 + c] as f32, row0[c1 + c] as f32, tx.w);
                    let bottom = lerp(row1[c0 + c] as f32, row1[c1 + c] as f32, tx.w);
                    out[c] = lerp(top, bottom, ty.w).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    }

    /// Resample a working-resolution map to full resolution.
    pub fn upsample(&self, pool: &WorkerPool, src: &[f32], dst: &mut [f32]) {
        debug_assert_eq!(src.len(), self.wid_down * self.hei_down);
        debug_assert_eq!(dst.len(), self.width * self.height);
        let stride = self.wid_down;
        pool.for_each_row(dst, self.width, |y, row| {
            let ty = self.up_y[y];
            let row0 = &src[ty.i0 as usize * stride..][..stride];
            let row1 = &src[ty.i1 as usize * stride..][..stride];
            for (x, out) in row.iter_mut().enumerate() {
                let tx = self.up_x[x];
                let top = lerp(row0[tx.i0 as usize], row0[tx.i1 as usize], tx.w);
                let bottom = lerp(row1[tx.i0 as usize], row1[tx.i1 as usize], tx.w);
                *out = lerp(top, bottom, ty.w);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_axis_has_zero_weights() {
        let taps = build_axis(6, 6, "test").unwrap();
        for (i, tap) in taps.iter().enumerate() {
            assert_eq!(tap.i0 as usize, i);
            assert_eq!(tap.w, 0.0, "tap {i} must not interpolate at scale 1");
        }
    }

    #[test]
    fn test_halving_axis_interpolates_pairs() {
        // Working sample 0 sits between full-resolution pixels 0 and 1.
        let taps = build_axis(2, 4, "test").unwrap();
        assert_eq!((taps[0].i0, taps[0].i1), (0, 1));
        assert!((taps[0].w - 0.5).abs() < 1e-6);
        assert_eq!((taps[1].i0, taps[1].i1), (2, 3));
    }

    #[test]
    fn test_upsample_preserves_constant_map() {
        // Weights of every footprint sum to one.
        let pool = WorkerPool::new(2).unwrap();
        let luts = LookupTables::new(5, 4, 13, 9).unwrap();
        let mut full = vec![0.0f32; 13 * 9];
        luts.upsample(&pool, &[0.25; 20], &mut full);
        for (i, &v) in full.iter().enumerate() {
            assert!((v - 0.25).abs() < 1e-6, "pixel {i} upsampled to {v}");
        }
    }

    #[test]
    fn test_identity_resampling_is_exact() {
        let pool = WorkerPool::new(2).unwrap();
        let image = RgbImage::from_fn(7, 5, |x, y| [(x * 30) as u8, (y * 40) as u8, 77]);
        let luts = LookupTables::new(7, 5, 7, 5).unwrap();

        let mut working = vec![0u8; 7 * 5 * CHANNELS];
        luts.downsample(&pool, &image, &mut working);
        assert_eq!(working.as_slice(), image.as_raw());

        let map: Vec<f32> = (0..35).map(|i| i as f32 / 35.0).collect();
        let mut full = vec![0.0f32; 35];
        luts.upsample(&pool, &map, &mut full);
        assert_eq!(full, map);
    }

    #[test]
    fn test_downsample_uniform_stays_uniform() {
        let pool = WorkerPool::new(2).unwrap();
        let image = RgbImage::from_pixel(20, 10, [90, 120, 200]);
        let luts = LookupTables::new(10, 5, 20, 10).unwrap();
        let mut working = vec![0u8; 10 * 5 * CHANNELS];
        luts.downsample(&pool, &image, &mut working);
        for px in working.chunks_exact(CHANNELS) {
            assert_eq!(px, &[90, 120, 200]);
        }
    }

    #[test]
    fn test_upsample_stays_within_source_range() {
        let pool = WorkerPool::new(2).unwrap();
        let luts = LookupTables::new(3, 3, 10, 10).unwrap();
        let map = vec![0.1, 0.4, 0.2, 0.3, 0.1, 0.4, 0.2, 0.2, 0.35];
        let mut full = vec![0.0f32; 100];
        luts.upsample(&pool, &map, &mut full);
        for &v in &full {
            assert!((0.1 - 1e-6..=0.4 + 1e-6).contains(&v), "interpolated {v} escaped source range");
        }
    }

    #[test]
    fn test_source_pixel_maps_into_full_image() {
        let luts = LookupTables::new(4, 3, 16, 12).unwrap();
        for yd in 0..3 {
            for xd in 0..4 {
                let (x, y) = luts.source_pixel(xd, yd);
                assert!(x < 16 && y < 12);
            }
        }
        // Working pixel 0 covers full-resolution pixels 0..4; its centre is 1.5.
        assert_eq!(luts.source_pixel(0, 0), (2, 2));
    }
}
