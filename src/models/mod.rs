pub mod config;
pub mod slider;

pub use config::AppConfig;
pub use slider::{Slider, SliderSpec};
