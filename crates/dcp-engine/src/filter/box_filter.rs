//! Box (moving-average) filter.

use crate::params::EdgeMode;
use crate::pool::WorkerPool;

use super::separable;

/// Mean over a window of radius `radius` along one line.
///
/// Running sum in `f64`: one add and one subtract per sample regardless of
/// the radius. Window positions outside the line are resolved through
/// `mode`, so every window holds exactly `2 * radius + 1` samples.
pub fn box_mean_line(src: &[f32], radius: usize, mode: EdgeMode, dst: &mut [f32]) {
    debug_assert_eq!(src.len(), dst.len());
    let n = src.len();
    if n == 0 {
        return;
    }
    let r = radius as isize;
    let norm = 1.0 / (2 * radius + 1) as f64;
    let at = |pos: isize| src[mode.resolve(pos, n)] as f64;

    let mut sum: f64 = (-r..=r).map(at).sum();
    for (i, out) in dst.iter_mut().enumerate() {
        let i = i as isize;
        *out = (sum * norm) as f32;
        sum += at(i + r + 1) - at(i - r);
    }
}

/// Square box mean of `data` (`width * height` samples), in place.
pub fn box_mean(
    pool: &WorkerPool,
    data: &mut [f32],
    width: usize,
    height: usize,
    radius: usize,
    mode: EdgeMode,
    tmp: &mut [f32],
) {
    separable(pool, data, width, height, tmp, |src, dst| {
        box_mean_line(src, radius, mode, dst)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_mean_line_constant() {
        let src = [0.25f32; 9];
        let mut dst = [0.0f32; 9];
        for mode in [EdgeMode::Tile, EdgeMode::Smear] {
            box_mean_line(&src, 3, mode, &mut dst);
            for &v in &dst {
                assert!((v - 0.25).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_box_mean_line_matches_direct_average() {
        let src = [1.0f32, 4.0, 2.0, 8.0, 5.0, 7.0];
        let n = src.len();
        for mode in [EdgeMode::Tile, EdgeMode::Smear] {
            let mut dst = [0.0f32; 6];
            box_mean_line(&src, 2, mode, &mut dst);
            for i in 0..n as isize {
                let expected: f32 = (i - 2..=i + 2)
                    .map(|p| src[mode.resolve(p, n)])
                    .sum::<f32>()
                    / 5.0;
                assert!(
                    (dst[i as usize] - expected).abs() < 1e-5,
                    "mode {mode:?} index {i}: {} != {expected}",
                    dst[i as usize]
                );
            }
        }
    }

    #[test]
    fn test_box_mean_preserves_total_with_tiling() {
        // Periodic tiling redistributes mass without losing any.
        let pool = WorkerPool::new(2).unwrap();
        let (w, h) = (6, 5);
        let mut data: Vec<f32> = (0..w * h).map(|i| (i % 7) as f32).collect();
        let total: f32 = data.iter().sum();
        let mut tmp = vec![0.0f32; w * h];
        box_mean(&pool, &mut data, w, h, 2, EdgeMode::Tile, &mut tmp);
        let filtered: f32 = data.iter().sum();
        assert!((total - filtered).abs() < 1e-3, "{total} vs {filtered}");
    }

    #[test]
    fn test_box_mean_2d_point_spread() {
        let pool = WorkerPool::new(2).unwrap();
        let (w, h) = (7, 7);
        let mut data = vec![0.0f32; w * h];
        data[3 * w + 3] = 9.0;
        let mut tmp = vec![0.0f32; w * h];
        box_mean(&pool, &mut data, w, h, 1, EdgeMode::Smear, &mut tmp);
        for y in 0..h {
            for x in 0..w {
                let inside = x.abs_diff(3) <= 1 && y.abs_diff(3) <= 1;
                let expected = if inside { 1.0 } else { 0.0 };
                assert!((data[y * w + x] - expected).abs() < 1e-6, "({x}, {y})");
            }
        }
    }
}
