//! Test fixtures: synthetic images and configurations.

use dcp_engine::{EngineOptions, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyhaze::models::AppConfig;

/// Haze color used by the synthetic scenes
pub const HAZE: [u8; 3] = [196, 200, 206];

/// Flat bright sky color, well above the default sky threshold
pub const SKY: [u8; 3] = [226, 232, 240];

/// Random textured scene seen through uniform haze at transmission `t`.
pub fn hazy_scene(width: u32, height: u32, seed: u64, t: f32) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        let mut px = [0u8; 3];
        for (c, v) in px.iter_mut().enumerate() {
            let scene: u8 = rng.gen_range(0..150);
            *v = (scene as f32 * t + HAZE[c] as f32 * (1.0 - t)).round() as u8;
        }
        px
    })
}

/// Hazy ground below a flat sky occupying the top half.
pub fn landscape(width: u32, height: u32, seed: u64) -> RgbImage {
    let ground = hazy_scene(width, height, seed, 0.5);
    RgbImage::from_fn(width, height, |x, y| {
        if y < height / 2 {
            SKY
        } else {
            ground.pixel(x, y)
        }
    })
}

/// Default configuration with a small fixed worker pool.
pub fn test_config() -> AppConfig {
    AppConfig {
        engine: EngineOptions::new().threads(2),
        ..AppConfig::default()
    }
}

/// YAML preset exercising every section.
pub const PRESET_YAML: &str = r#"
engine:
  threads: 2
  airlight_top_fraction: 0.002
params:
  min_radius: 5
  box_radius: 20
  omega: 0.85
  edge_mode: smear
  scaling_factor: 0.5
  sky_var: 0.8
log_filter: "skyhaze=debug"
"#;
