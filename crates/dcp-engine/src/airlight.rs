//! Atmospheric light (airlight) estimation.
//!
//! The raw estimate averages the original-resolution colors behind the
//! brightest dark-channel pixels. It is then bounded and smoothed against
//! the estimate of the previous call, so that consecutive frames with
//! similar content do not flicker.
//!
//! Bright sky is the usual reason the raw estimate drifts toward pure
//! white. The ceiling `airlight_clip_value - airlight_offset` keeps the
//! estimate a margin below full scale, while the final bound stays at
//! `airlight_clip_value`.

use crate::frame::FrameContext;
use crate::image::RgbImage;
use crate::params::{DcpParams, AIRLIGHT_CHANNELS, COMBINED_CHANNEL};

/// Default fraction of dark-channel pixels sampled for the raw estimate.
pub const DEFAULT_TOP_FRACTION: f64 = 0.001;

/// Histogram-based selection of the haze-opaque pixels.
#[derive(Debug, Clone, Copy)]
pub struct AirlightEstimator {
    top_fraction: f64,
}

impl Default for AirlightEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_FRACTION)
    }
}

impl AirlightEstimator {
    /// `top_fraction` is clamped to `(0, 1]`; non-finite values fall back to
    /// [`DEFAULT_TOP_FRACTION`].
    pub fn new(top_fraction: f64) -> Self {
        let top_fraction = if top_fraction.is_finite() && top_fraction > 0.0 {
            top_fraction.min(1.0)
        } else {
            DEFAULT_TOP_FRACTION
        };
        Self { top_fraction }
    }

    #[inline]
    pub fn top_fraction(&self) -> f64 {
        self.top_fraction
    }

    /// Number of pixels sampled out of `len`: at least one, at most all.
    pub fn candidate_count(&self, len: usize) -> usize {
        ((len as f64 * self.top_fraction).ceil() as usize).clamp(1, len.max(1))
    }

    /// Indices of the `count` brightest samples of `dark`.
    ///
    /// Ties at the cut level are taken in raster order, so the selection is
    /// deterministic.
    pub fn select_candidates(&self, dark: &[u8]) -> Vec<usize> {
        if dark.is_empty() {
            return Vec::new();
        }
        let count = self.candidate_count(dark.len());
        let mut histogram = [0usize; 256];
        for &v in dark {
            histogram[v as usize] += 1;
        }

        // Lowest level still needed, and how many samples at that level.
        let mut above = 0usize;
        let mut cut = 0u8;
        for level in (0..=255u8).rev() {
            let here = histogram[level as usize];
            if above + here >= count {
                cut = level;
                break;
            }
            above += here;
        }
        let mut at_cut = count - above;

        let mut selected = Vec::with_capacity(count);
        for (i, &v) in dark.iter().enumerate() {
            if v > cut {
                selected.push(i);
            } else if v == cut && at_cut > 0 {
                selected.push(i);
                at_cut -= 1;
            }
        }
        selected
    }

    /// Mean full-resolution color behind the brightest dark-channel pixels.
    ///
    /// `dark` is the working-resolution dark channel of `input`.
    pub fn raw_estimate(&self, dark: &[u8], frame: &FrameContext, input: &RgbImage) -> [f32; 3] {
        let wid_down = frame.wid_down() as usize;
        let luts = frame.luts();
        let selected = self.select_candidates(dark);
        if selected.is_empty() {
            return [0.0; 3];
        }

        let mut sum = [0u64; 3];
        for &i in &selected {
            let (x, y) = luts.source_pixel(i % wid_down, i / wid_down);
            let px = input.pixel(x as u32, y as u32);
            for c in 0..3 {
                sum[c] += px[c] as u64;
            }
        }
        let n = selected.len() as f64;
        sum.map(|s| (s as f64 / n) as f32)
    }
}

/// Bounds applied to the raw estimate: `[al_lower_bound, ceiling]` with
/// `ceiling = airlight_clip_value - airlight_offset`, kept inside
/// `[al_lower_bound, airlight_clip_value]` even for a negative offset.
pub fn raw_bounds(params: &DcpParams) -> (f32, f32) {
    let lower = params.al_lower_bound;
    let ceiling = (params.airlight_clip_value - params.airlight_offset)
        .min(params.airlight_clip_value)
        .max(lower);
    (lower, ceiling)
}

/// Airlight for this call, from the raw estimate and the history in
/// `params`. Does not modify `params`.
///
/// Without history the bounded raw estimate is used directly. Otherwise
/// each channel moves toward
/// `al_lambda * raw + (1 - al_lambda) * airlight_prev`, by at most
/// `airlight_diff`. The combined entry is the mean of the three colors.
pub fn smooth(params: &DcpParams, raw: [f32; 3]) -> [f32; AIRLIGHT_CHANNELS] {
    let (lower, ceiling) = raw_bounds(params);
    let history = params.has_airlight_history();
    let mut curr = [0.0f32; AIRLIGHT_CHANNELS];

    for c in 0..COMBINED_CHANNEL {
        let bounded = raw[c].clamp(lower, ceiling);
        curr[c] = if history {
            let prev = params.airlight_prev[c];
            let target = prev + params.al_lambda * (bounded - prev);
            let delta = (target - prev).clamp(-params.airlight_diff, params.airlight_diff);
            (prev + delta).clamp(lower, params.airlight_clip_value)
        } else {
            bounded
        };
    }
    curr[COMBINED_CHANNEL] = curr[..COMBINED_CHANNEL].iter().sum::<f32>() / COMBINED_CHANNEL as f32;
    curr
}

/// Publish `curr` as the airlight of a completed call.
pub fn commit(params: &mut DcpParams, curr: [f32; AIRLIGHT_CHANNELS]) {
    params.airlight_curr = curr;
    params.airlight_prev = curr;
    params.airlight_seeded = true;
    let brightest = curr[..COMBINED_CHANNEL]
        .iter()
        .copied()
        .fold(f32::MIN, f32::max);
    params.airlight_highest = params.airlight_highest.max(brightest);
}
