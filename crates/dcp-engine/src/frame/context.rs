//! Frame geometry derived from the input size and scaling factor.

use crate::error::{DcpError, DcpResult};

use super::LookupTables;

/// Sizing of one dehazing session.
///
/// Created by [`DcpEngine::initialize`](crate::DcpEngine::initialize) for a
/// given image size and scaling factor, and rebuilt whenever an image of a
/// different size is loaded. Owns the [`LookupTables`] every stage uses to
/// move between full and working resolution.
#[derive(Debug, Clone)]
pub struct FrameContext {
    width: u32,
    height: u32,
    scaling_factor: f32,
    wid_down: u32,
    hei_down: u32,
    luts: LookupTables,
}

/// Working size of one axis: `round(len * scale)`, at least 1.
fn scaled_len(len: u32, scale: f32) -> u32 {
    ((len as f32 * scale + 0.5) as u32).max(1)
}

impl FrameContext {
    /// Validate the geometry and build the lookup tables.
    ///
    /// Fails with [`DcpError::InvalidDimension`] for a zero width or height
    /// and [`DcpError::InvalidScale`] for a scaling factor outside `(0, 1]`.
    pub fn new(width: u32, height: u32, scaling_factor: f32) -> DcpResult<Self> {
        if width == 0 || height == 0 {
            return Err(DcpError::InvalidDimension { width, height });
        }
        if !(scaling_factor > 0.0 && scaling_factor <= 1.0) {
            return Err(DcpError::InvalidScale(scaling_factor));
        }
        let wid_down = scaled_len(width, scaling_factor);
        let hei_down = scaled_len(height, scaling_factor);
        let luts = LookupTables::new(
            wid_down as usize,
            hei_down as usize,
            width as usize,
            height as usize,
        )?;
        Ok(Self {
            width,
            height,
            scaling_factor,
            wid_down,
            hei_down,
            luts,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn scaling_factor(&self) -> f32 {
        self.scaling_factor
    }

    /// Working-resolution width.
    #[inline]
    pub fn wid_down(&self) -> u32 {
        self.wid_down
    }

    /// Working-resolution height.
    #[inline]
    pub fn hei_down(&self) -> u32 {
        self.hei_down
    }

    /// Full-resolution pixel count.
    #[inline]
    pub fn full_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Working-resolution pixel count.
    #[inline]
    pub fn working_len(&self) -> usize {
        self.wid_down as usize * self.hei_down as usize
    }

    #[inline]
    pub fn luts(&self) -> &LookupTables {
        &self.luts
    }

    /// Convert a full-resolution window radius to the working grid.
    #[inline]
    pub fn working_radius(&self, radius: u32) -> usize {
        ((radius as f32 * self.scaling_factor).round() as usize).max(1)
    }
}
