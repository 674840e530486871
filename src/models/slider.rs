//! Slider table of the interactive front end.
//!
//! Each slider maps an integer position to exactly one [`DcpParams`] field.
//! Float parameters are stored as position / 100.

use dcp_engine::DcpParams;
use serde::{Deserialize, Serialize};

/// Integer range and scaling of one slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSpec {
    pub min: i32,
    pub max: i32,
    /// Position matching the parameter default
    pub default: i32,
    /// Parameter value = position / divisor
    pub divisor: i32,
}

impl SliderSpec {
    #[inline]
    pub fn clamp(&self, position: i32) -> i32 {
        position.clamp(self.min, self.max)
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        self.divisor != 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    MinRadius,
    BoxRadius,
    Omega,
    /// Sky variance limit (`sky_var`)
    Variance,
    T0,
    T1,
    AirlightOffset,
}

impl Slider {
    /// Every slider, in on-screen order.
    pub const ALL: [Slider; 7] = [
        Slider::MinRadius,
        Slider::BoxRadius,
        Slider::Omega,
        Slider::Variance,
        Slider::T0,
        Slider::T1,
        Slider::AirlightOffset,
    ];

    pub fn spec(self) -> SliderSpec {
        let (min, max, default, divisor) = match self {
            Slider::MinRadius => (7, 107, 7, 1),
            Slider::BoxRadius => (7, 107, 28, 1),
            Slider::Omega => (1, 100, 95, 100),
            Slider::Variance => (1, 200, 60, 100),
            Slider::T0 => (1, 100, 10, 100),
            Slider::T1 => (1, 100, 40, 100),
            Slider::AirlightOffset => (1, 256, 80, 1),
        };
        SliderSpec {
            min,
            max,
            default,
            divisor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slider::MinRadius => "Min Radius",
            Slider::BoxRadius => "Box Radius",
            Slider::Omega => "Omega",
            Slider::Variance => "Variance",
            Slider::T0 => "T0",
            Slider::T1 => "T1",
            Slider::AirlightOffset => "Airlight Offset",
        }
    }

    /// Write `position` (clamped into range) to this slider's field.
    ///
    /// Returns the clamped position.
    pub fn apply(self, params: &mut DcpParams, position: i32) -> i32 {
        let spec = self.spec();
        let position = spec.clamp(position);
        let value = position as f32 / spec.divisor as f32;
        match self {
            Slider::MinRadius => params.min_radius = position as u32,
            Slider::BoxRadius => params.box_radius = position as u32,
            Slider::Omega => params.omega = value,
            Slider::Variance => params.sky_var = value,
            Slider::T0 => params.t0 = value,
            Slider::T1 => params.t1 = value,
            Slider::AirlightOffset => params.airlight_offset = value,
        }
        position
    }

    /// Current slider position of this slider's field.
    pub fn value(self, params: &DcpParams) -> i32 {
        let divisor = self.spec().divisor as f32;
        match self {
            Slider::MinRadius => params.min_radius as i32,
            Slider::BoxRadius => params.box_radius as i32,
            Slider::Omega => (params.omega * divisor).round() as i32,
            Slider::Variance => (params.sky_var * divisor).round() as i32,
            Slider::T0 => (params.t0 * divisor).round() as i32,
            Slider::T1 => (params.t1 * divisor).round() as i32,
            Slider::AirlightOffset => params.airlight_offset.round() as i32,
        }
    }

    /// On-screen text for `position`: two decimals for float sliders.
    pub fn display_value(self, position: i32) -> String {
        let spec = self.spec();
        if spec.is_float() {
            format!("{:.2}", position as f32 / spec.divisor as f32)
        } else {
            position.to_string()
        }
    }
}

impl std::fmt::Display for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_params() {
        let params = DcpParams::default();
        for slider in Slider::ALL {
            assert_eq!(
                slider.value(&params),
                slider.spec().default,
                "{slider} default position does not match the parameter default"
            );
        }
    }

    #[test]
    fn test_apply_writes_one_field() {
        let mut params = DcpParams::default();
        let before = params.clone();
        Slider::Omega.apply(&mut params, 80);
        assert!((params.omega - 0.8).abs() < f32::EPSILON);

        params.omega = before.omega;
        assert_eq!(params, before, "only omega may change");
    }

    #[test]
    fn test_apply_clamps_position() {
        let mut params = DcpParams::default();
        assert_eq!(Slider::BoxRadius.apply(&mut params, 500), 107);
        assert_eq!(params.box_radius, 107);
        assert_eq!(Slider::T0.apply(&mut params, 0), 1);
        assert!((params.t0 - 0.01).abs() < f32::EPSILON);
        assert_eq!(Slider::AirlightOffset.apply(&mut params, -4), 1);
    }

    #[test]
    fn test_variance_maps_to_sky_var() {
        let mut params = DcpParams::default();
        Slider::Variance.apply(&mut params, 150);
        assert!((params.sky_var - 1.5).abs() < f32::EPSILON);
        assert_eq!(Slider::Variance.value(&params), 150);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(Slider::Omega.display_value(95), "0.95");
        assert_eq!(Slider::Variance.display_value(200), "2.00");
        assert_eq!(Slider::BoxRadius.display_value(28), "28");
        assert_eq!(Slider::AirlightOffset.display_value(80), "80");
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: std::collections::HashSet<_> = Slider::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), Slider::ALL.len());
    }
}
