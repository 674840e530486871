//! Dehazing parameters.
//!
//! [`DcpParams`] is the single mutable record shared between the caller and
//! the engine. The caller owns it, adjusts single fields between calls (one
//! per slider) and passes it by reference into every
//! [`DcpEngine`](crate::DcpEngine) entry point. The engine reads it on each
//! call and writes back only the airlight temporal state.

use serde::{Deserialize, Serialize};

use crate::error::{DcpError, DcpResult};

/// Number of entries in the airlight vectors: R, G, B and a combined term.
pub const AIRLIGHT_CHANNELS: usize = 4;

/// Index of the combined airlight term (mean of the three color channels).
///
/// The transmission estimate normalizes the dark channel by this entry.
pub const COMBINED_CHANNEL: usize = 3;

/// Boundary policy for sliding-window filters.
///
/// Both the dark-channel minimum filter and the box filters behind the
/// transmission refinement resolve out-of-range window positions through
/// this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Periodic tiling: position `-1` reads the last pixel of the line.
    #[default]
    Tile,
    /// Edge replication: out-of-range positions read the nearest edge pixel.
    Smear,
}

impl EdgeMode {
    /// Map a possibly out-of-range position onto `0..len`.
    ///
    /// `len` must be non-zero.
    #[inline]
    pub fn resolve(self, pos: isize, len: usize) -> usize {
        debug_assert!(len > 0, "EdgeMode::resolve on an empty line");
        let len = len as isize;
        match self {
            EdgeMode::Tile => pos.rem_euclid(len) as usize,
            EdgeMode::Smear => pos.clamp(0, len - 1) as usize,
        }
    }
}

/// Parameters of the sky-aware dark channel prior.
///
/// # Defaults
///
/// The defaults are the values the interactive application starts with:
///
/// | Field | Default |
/// |-------|---------|
/// | `min_radius` / `box_radius` | 7 / 28 |
/// | `eps` | 0.1 |
/// | `edge_mode` | `Tile` |
/// | `omega` | 0.95 |
/// | `airlight_clip_value` / `airlight_offset` | 256 / 80 |
/// | `airlight_diff` / `al_lower_bound` / `al_lambda` | 1 / 0 / 0.95 |
/// | `t0` / `t1` | 0.1 / 0.4 |
/// | `sky_offset` / `sky_intensity` / `sky_var` | 0 / 150 / 0.6 |
/// | `scaling_factor` | 1.0 |
///
/// Airlight history (`airlight_curr`, `airlight_prev`, `airlight_highest`)
/// starts at zero with `airlight_seeded` unset, meaning "no previous
/// estimate". A committed airlight of zero (a black frame) is still history.
///
/// # Example
///
/// ```
/// use dcp_engine::DcpParams;
///
/// let mut params = DcpParams::default();
/// params.omega = 0.8;
/// params.box_radius = 40;
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcpParams {
    /// Radius of the dark-channel minimum window, in full-resolution pixels.
    pub min_radius: u32,

    /// Radius of the box window used by the guided refinement and the sky
    /// variance, in full-resolution pixels.
    pub box_radius: u32,

    /// Regularization of the guided refinement (guide normalized to 0..1).
    pub eps: f32,

    /// Boundary policy of all sliding windows.
    pub edge_mode: EdgeMode,

    /// Fraction of the haze removed. 0 disables dehazing entirely.
    pub omega: f32,

    /// Upper bound of any airlight channel (8-bit scale).
    pub airlight_clip_value: f32,

    /// Margin kept below `airlight_clip_value` for the raw estimate, so that
    /// bright sky or specular outliers cannot push the airlight to pure white.
    pub airlight_offset: f32,

    /// Maximum per-call change of an airlight channel.
    pub airlight_diff: f32,

    /// Lower bound of any airlight channel.
    pub al_lower_bound: f32,

    /// Weight of the new raw estimate in the temporal smoothing.
    pub al_lambda: f32,

    /// Running maximum of all committed airlight channels.
    pub airlight_highest: f32,

    /// Airlight used by the most recent call: R, G, B, combined.
    pub airlight_curr: [f32; AIRLIGHT_CHANNELS],

    /// Airlight history the next call smooths against.
    pub airlight_prev: [f32; AIRLIGHT_CHANNELS],

    /// Set by every committed call; `airlight_prev` is only smoothed
    /// against while this is true.
    pub airlight_seeded: bool,

    /// Lower transmission bound.
    pub t0: f32,

    /// Upper transmission bound.
    pub t1: f32,

    /// Subtracted from `sky_intensity` to form the sky threshold.
    pub sky_offset: f32,

    /// Minimum luminance (8-bit scale) of a sky pixel.
    pub sky_intensity: f32,

    /// Maximum local luminance variance of a sky pixel, measured in squared
    /// percent of full scale (a standard deviation of 2 levels is about 0.6).
    pub sky_var: f32,

    /// Working-resolution downscale factor in `(0, 1]`.
    pub scaling_factor: f32,
}

impl Default for DcpParams {
    fn default() -> Self {
        Self {
            min_radius: 7,
            box_radius: 28,
            eps: 0.1,
            edge_mode: EdgeMode::Tile,
            omega: 0.95,
            airlight_clip_value: 256.0,
            airlight_offset: 80.0,
            airlight_diff: 1.0,
            al_lower_bound: 0.0,
            al_lambda: 0.95,
            airlight_highest: 0.0,
            airlight_curr: [0.0; AIRLIGHT_CHANNELS],
            airlight_prev: [0.0; AIRLIGHT_CHANNELS],
            airlight_seeded: false,
            t0: 0.1,
            t1: 0.4,
            sky_offset: 0.0,
            sky_intensity: 150.0,
            sky_var: 0.6,
            scaling_factor: 1.0,
        }
    }
}

fn ensure(ok: bool, name: &'static str, reason: impl FnOnce() -> String) -> DcpResult<()> {
    if ok {
        Ok(())
    } else {
        Err(DcpError::InvalidParameter {
            name,
            reason: reason(),
        })
    }
}

impl DcpParams {
    /// Create parameters with the default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the documented ranges and cross-field invariants.
    ///
    /// An out-of-range `scaling_factor` is reported as
    /// [`DcpError::InvalidScale`]; everything else as
    /// [`DcpError::InvalidParameter`].
    pub fn validate(&self) -> DcpResult<()> {
        if !(self.scaling_factor > 0.0 && self.scaling_factor <= 1.0) {
            return Err(DcpError::InvalidScale(self.scaling_factor));
        }
        ensure(self.min_radius >= 1, "min_radius", || {
            "must be at least 1".to_string()
        })?;
        ensure(self.box_radius >= 1, "box_radius", || {
            "must be at least 1".to_string()
        })?;
        ensure(self.min_radius <= self.box_radius, "min_radius", || {
            format!(
                "{} exceeds box_radius {}",
                self.min_radius, self.box_radius
            )
        })?;
        ensure(self.eps.is_finite() && self.eps > 0.0, "eps", || {
            format!("{} is not a positive number", self.eps)
        })?;
        ensure((0.0..=1.0).contains(&self.omega), "omega", || {
            format!("{} is outside [0, 1]", self.omega)
        })?;
        ensure(self.t0 > 0.0 && self.t0 < 1.0, "t0", || {
            format!("{} is outside (0, 1)", self.t0)
        })?;
        ensure(self.t1 > 0.0 && self.t1 <= 1.0, "t1", || {
            format!("{} is outside (0, 1]", self.t1)
        })?;
        ensure(self.t0 < self.t1, "t0", || {
            format!("{} is not below t1 {}", self.t0, self.t1)
        })?;
        ensure((0.0..=1.0).contains(&self.al_lambda), "al_lambda", || {
            format!("{} is outside [0, 1]", self.al_lambda)
        })?;
        ensure(self.airlight_diff >= 0.0, "airlight_diff", || {
            format!("{} is negative", self.airlight_diff)
        })?;
        ensure(
            self.al_lower_bound <= self.airlight_clip_value,
            "al_lower_bound",
            || {
                format!(
                    "{} exceeds airlight_clip_value {}",
                    self.al_lower_bound, self.airlight_clip_value
                )
            },
        )?;
        ensure(self.sky_var >= 0.0, "sky_var", || {
            format!("{} is negative", self.sky_var)
        })?;
        Ok(())
    }

    /// Forget all airlight history.
    ///
    /// The next call seeds the history from its raw estimate instead of
    /// smoothing against a previous frame.
    pub fn reset_airlight(&mut self) {
        self.airlight_curr = [0.0; AIRLIGHT_CHANNELS];
        self.airlight_prev = [0.0; AIRLIGHT_CHANNELS];
        self.airlight_highest = 0.0;
        self.airlight_seeded = false;
    }

    /// Whether a previous call left an airlight estimate to smooth against.
    #[inline]
    pub fn has_airlight_history(&self) -> bool {
        self.airlight_seeded
    }

    /// Luminance threshold (8-bit scale) a pixel must reach to be sky.
    #[inline]
    pub fn sky_threshold(&self) -> f32 {
        self.sky_intensity - self.sky_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let params = DcpParams::default();
        assert_eq!(params.min_radius, 7);
        assert_eq!(params.box_radius, 28);
        assert_eq!(params.edge_mode, EdgeMode::Tile);
        assert!((params.omega - 0.95).abs() < f32::EPSILON);
        assert!((params.t0 - 0.1).abs() < f32::EPSILON);
        assert!((params.t1 - 0.4).abs() < f32::EPSILON);
        assert!((params.airlight_offset - 80.0).abs() < f32::EPSILON);
        assert!(!params.has_airlight_history());
        assert!(params.validate().is_ok(), "defaults must be valid");
    }

    #[test]
    fn test_edge_mode_tile_wraps() {
        assert_eq!(EdgeMode::Tile.resolve(-1, 5), 4);
        assert_eq!(EdgeMode::Tile.resolve(5, 5), 0);
        assert_eq!(EdgeMode::Tile.resolve(-11, 5), 4);
        assert_eq!(EdgeMode::Tile.resolve(2, 5), 2);
    }

    #[test]
    fn test_edge_mode_smear_clamps() {
        assert_eq!(EdgeMode::Smear.resolve(-3, 5), 0);
        assert_eq!(EdgeMode::Smear.resolve(9, 5), 4);
        assert_eq!(EdgeMode::Smear.resolve(3, 5), 3);
    }

    #[test]
    fn test_validate_scale() {
        let params = DcpParams {
            scaling_factor: 1.5,
            ..DcpParams::default()
        };
        assert_eq!(params.validate(), Err(DcpError::InvalidScale(1.5)));

        let params = DcpParams {
            scaling_factor: 0.0,
            ..DcpParams::default()
        };
        assert_eq!(params.validate(), Err(DcpError::InvalidScale(0.0)));
    }

    #[test]
    fn test_validate_radius_order() {
        let params = DcpParams {
            min_radius: 30,
            box_radius: 28,
            ..DcpParams::default()
        };
        match params.validate() {
            Err(DcpError::InvalidParameter { name, .. }) => assert_eq!(name, "min_radius"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_transmission_bounds() {
        let params = DcpParams {
            t0: 0.5,
            t1: 0.4,
            ..DcpParams::default()
        };
        match params.validate() {
            Err(DcpError::InvalidParameter { name, .. }) => assert_eq!(name, "t0"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_zero_omega() {
        let params = DcpParams {
            omega: 0.0,
            ..DcpParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_eps() {
        let params = DcpParams {
            eps: 0.0,
            ..DcpParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DcpError::InvalidParameter { name: "eps", .. })
        ));
    }

    #[test]
    fn test_reset_airlight() {
        let mut params = DcpParams::default();
        params.airlight_curr = [200.0, 190.0, 180.0, 190.0];
        params.airlight_prev = [200.0, 190.0, 180.0, 190.0];
        params.airlight_highest = 200.0;
        params.airlight_seeded = true;
        assert!(params.has_airlight_history());

        params.reset_airlight();
        assert_eq!(params.airlight_curr, [0.0; 4]);
        assert_eq!(params.airlight_prev, [0.0; 4]);
        assert_eq!(params.airlight_highest, 0.0);
        assert!(!params.has_airlight_history());
    }

    #[test]
    fn test_sky_threshold() {
        let params = DcpParams {
            sky_intensity: 150.0,
            sky_offset: 20.0,
            ..DcpParams::default()
        };
        assert!((params.sky_threshold() - 130.0).abs() < f32::EPSILON);
    }
}
