//! Assertion helpers for tests.

use dcp_engine::{RgbImage, TransmissionMap};
use pretty_assertions::assert_eq;

/// Assert two images have the same size.
pub fn assert_same_shape(actual: &RgbImage, expected: &RgbImage) {
    assert_eq!(
        actual.dimensions(),
        expected.dimensions(),
        "Image shape differs"
    );
}

/// Assert bytes start with the PNG signature.
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG data, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

/// Assert every transmission sample lies in `[t0, t1]`.
pub fn assert_transmission_within(map: &TransmissionMap, t0: f32, t1: f32) {
    assert_eq!(map.values.len(), (map.width * map.height) as usize);
    for (i, &t) in map.values.iter().enumerate() {
        assert!(
            t >= t0 - 1e-6 && t <= t1 + 1e-6,
            "Transmission {t} at pixel {i} outside [{t0}, {t1}]"
        );
    }
}

/// Mean of all channel values.
pub fn mean_level(image: &RgbImage) -> f64 {
    let raw = image.as_raw();
    raw.iter().map(|&v| v as f64).sum::<f64>() / raw.len() as f64
}

/// Variance of all channel values.
pub fn level_variance(image: &RgbImage) -> f64 {
    let mean = mean_level(image);
    let raw = image.as_raw();
    raw.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / raw.len() as f64
}
