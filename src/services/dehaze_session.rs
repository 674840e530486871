use std::path::Path;

use dcp_engine::{DcpEngine, DcpParams, RgbImage, TransmissionMap};

use crate::codec;
use crate::error::AppError;
use crate::models::{AppConfig, Slider};

/// Load / tweak / reprocess loop of the interactive front end.
///
/// Owns the engine, the parameter record and the current image pair.
/// Loading a new image releases the previous context and initializes a new
/// one for the new size; every slider change mutates one parameter and
/// reprocesses into the same output buffer.
#[derive(Debug)]
pub struct DehazeSession {
    engine: DcpEngine,
    params: DcpParams,
    input: Option<RgbImage>,
    output: Option<RgbImage>,
}

impl DehazeSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            engine: DcpEngine::new(config.engine.clone()),
            params: config.params.clone(),
            input: None,
            output: None,
        }
    }

    /// Replace the current image and dehaze it with the current parameters.
    ///
    /// The airlight history starts over for the new image.
    pub fn load_image(&mut self, image: RgbImage) -> Result<&RgbImage, AppError> {
        self.unload();

        let (width, height) = image.dimensions();
        let scaling_factor = self.params.scaling_factor;
        self.engine
            .initialize(width, height, scaling_factor, &mut self.params)?;
        let mut output = RgbImage::try_new(width, height)?;
        self.engine
            .process_into(&image, &mut self.params, &mut output)?;

        tracing::info!(width, height, scaling_factor, "Loaded image");
        self.input = Some(image);
        Ok(self.output.insert(output))
    }

    pub fn load_png(&mut self, path: &Path) -> Result<&RgbImage, AppError> {
        let image = codec::read_png(path)?;
        self.load_image(image)
    }

    /// Move one slider and reprocess.
    ///
    /// A position that would break a parameter invariant (for example `T0`
    /// above `T1`) is rejected and the parameters stay as they were.
    pub fn set_slider(&mut self, slider: Slider, position: i32) -> Result<&RgbImage, AppError> {
        let mut candidate = self.params.clone();
        let position = slider.apply(&mut candidate, position);
        candidate.validate()?;
        self.params = candidate;
        tracing::debug!(%slider, position, "Slider changed");
        self.reprocess()
    }

    /// Current position of `slider`.
    pub fn slider_position(&self, slider: Slider) -> i32 {
        slider.value(&self.params)
    }

    /// Dehaze the loaded image again with the current parameters.
    pub fn reprocess(&mut self) -> Result<&RgbImage, AppError> {
        let (Some(input), Some(output)) = (self.input.as_ref(), self.output.as_mut()) else {
            return Err(AppError::NoImage);
        };
        self.engine.process_into(input, &mut self.params, output)?;
        Ok(output)
    }

    pub fn input(&self) -> Option<&RgbImage> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&RgbImage> {
        self.output.as_ref()
    }

    pub fn params(&self) -> &DcpParams {
        &self.params
    }

    /// Transmission of the last processed frame.
    pub fn transmission(&self) -> Result<Option<TransmissionMap>, AppError> {
        if self.input.is_none() {
            return Ok(None);
        }
        Ok(self.engine.last_transmission()?)
    }

    pub fn save_output(&self, path: &Path) -> Result<(), AppError> {
        let output = self.output.as_ref().ok_or(AppError::NoImage)?;
        codec::write_png(path, output)?;
        tracing::info!(path = %path.display(), "Saved output");
        Ok(())
    }

    /// Release the engine context and forget the current images.
    pub fn unload(&mut self) {
        self.engine.release();
        self.input = None;
        self.output = None;
    }
}
