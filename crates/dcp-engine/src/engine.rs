//! The dehazing engine: session lifecycle and the per-call stage pipeline.

use std::sync::{Mutex, TryLockError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::airlight::{self, AirlightEstimator, DEFAULT_TOP_FRACTION};
use crate::compositor::Compositor;
use crate::error::{DcpError, DcpResult};
use crate::filter::{DarkChannelFilter, GuidedFilter, GuidedScratch};
use crate::frame::{try_alloc, FrameContext};
use crate::image::{RgbImage, CHANNELS};
use crate::params::{DcpParams, AIRLIGHT_CHANNELS, COMBINED_CHANNEL};
use crate::pool::WorkerPool;
use crate::sky::SkyDetector;
use crate::transmission::{luminance, TransmissionEstimator};

/// Engine-wide settings that outlive individual sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Worker threads per session; 0 uses one per available core.
    pub threads: usize,
    /// Fraction of dark-channel pixels averaged into the raw airlight.
    pub airlight_top_fraction: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            airlight_top_fraction: DEFAULT_TOP_FRACTION,
        }
    }
}

impl EngineOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[inline]
    pub fn airlight_top_fraction(mut self, fraction: f64) -> Self {
        self.airlight_top_fraction = fraction;
        self
    }
}

/// Transmission of the last successful call, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionMap {
    /// Full-resolution width.
    pub width: u32,
    /// Full-resolution height.
    pub height: u32,
    /// One sample per full-resolution pixel, row-major.
    pub values: Vec<f32>,
    /// Working-resolution width of `sky_weights`.
    pub wid_down: u32,
    /// Working-resolution height of `sky_weights`.
    pub hei_down: u32,
    /// Sky blend weight per working-resolution pixel; zero for non-sky.
    pub sky_weights: Vec<f32>,
    /// Number of working-resolution pixels classified as sky.
    pub sky_pixels: usize,
    /// Airlight the map was computed with.
    pub airlight: [f32; AIRLIGHT_CHANNELS],
}

/// Working buffers of one session, reused by every call.
#[derive(Debug)]
struct WorkBuffers {
    working: Vec<u8>,
    dark: Vec<u8>,
    dark_tmp: Vec<u8>,
    guide: Vec<f32>,
    raw: Vec<f32>,
    refined: Vec<f32>,
    guided: GuidedScratch,
    sky_weights: Vec<f32>,
    transmission: Vec<f32>,
    sky_pixels: usize,
    airlight: [f32; AIRLIGHT_CHANNELS],
    /// Set once a call completed the full pipeline.
    valid: bool,
}

impl WorkBuffers {
    fn new(frame: &FrameContext) -> DcpResult<Self> {
        let working = frame.working_len();
        Ok(Self {
            working: try_alloc(working * CHANNELS, 0u8, "working image")?,
            dark: try_alloc(working, 0u8, "dark channel")?,
            dark_tmp: try_alloc(working, 0u8, "dark channel")?,
            guide: try_alloc(working, 0.0, "luminance guide")?,
            raw: try_alloc(working, 0.0, "transmission map")?,
            refined: try_alloc(working, 0.0, "transmission map")?,
            guided: GuidedScratch::new(working)?,
            sky_weights: try_alloc(working, 0.0, "sky weights")?,
            transmission: try_alloc(frame.full_len(), 0.0, "transmission map")?,
            sky_pixels: 0,
            airlight: [0.0; AIRLIGHT_CHANNELS],
            valid: false,
        })
    }
}

/// Everything `initialize` builds and `release` tears down.
#[derive(Debug)]
struct Session {
    frame: FrameContext,
    pool: WorkerPool,
    buffers: Mutex<WorkBuffers>,
}

fn check_shape(frame: &FrameContext, image: &RgbImage) -> DcpResult<()> {
    if image.dimensions() != (frame.width(), frame.height()) {
        return Err(DcpError::DimensionMismatch {
            expected_width: frame.width(),
            expected_height: frame.height(),
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Sky-aware dark channel prior dehazing engine.
///
/// One engine holds at most one session. A session is created by
/// [`initialize`](Self::initialize) for an image size and scaling factor and
/// owns the [`FrameContext`], the worker pool and every working buffer.
/// [`process`](Self::process) borrows the engine shared, so a second call
/// racing on the same session is rejected with [`DcpError::Busy`].
///
/// # Example
///
/// ```
/// use dcp_engine::{DcpEngine, DcpParams, RgbImage};
///
/// let mut params = DcpParams::default();
/// let mut engine = DcpEngine::default();
/// engine.initialize(64, 48, 0.5, &mut params)?;
///
/// let hazy = RgbImage::from_pixel(64, 48, [180, 185, 190]);
/// let clear = engine.process(&hazy, &mut params)?;
/// assert_eq!(clear.dimensions(), (64, 48));
/// assert!(params.airlight_prev[3] > 0.0);
///
/// engine.release();
/// # Ok::<(), dcp_engine::DcpError>(())
/// ```
#[derive(Debug, Default)]
pub struct DcpEngine {
    options: EngineOptions,
    airlight: AirlightEstimator,
    session: Option<Session>,
}

impl DcpEngine {
    pub fn new(options: EngineOptions) -> Self {
        let airlight = AirlightEstimator::new(options.airlight_top_fraction);
        Self {
            options,
            airlight,
            session: None,
        }
    }

    #[inline]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Frame geometry of the current session.
    #[inline]
    pub fn frame(&self) -> Option<&FrameContext> {
        self.session.as_ref().map(|s| &s.frame)
    }

    /// Start a session for `width x height` images at `scaling_factor`.
    ///
    /// Construction is all-or-nothing: on error the previous session, if
    /// any, is left untouched. On success it replaces the previous session,
    /// sets `params.scaling_factor` and clears the airlight history.
    pub fn initialize(
        &mut self,
        width: u32,
        height: u32,
        scaling_factor: f32,
        params: &mut DcpParams,
    ) -> DcpResult<&FrameContext> {
        let started = Instant::now();
        let frame = FrameContext::new(width, height, scaling_factor)?;
        DcpParams {
            scaling_factor,
            ..params.clone()
        }
        .validate()?;

        let pool = WorkerPool::new(self.options.threads)?;
        let buffers = WorkBuffers::new(&frame)?;

        if self.session.is_some() {
            tracing::debug!("Replacing existing frame context");
        }
        params.scaling_factor = scaling_factor;
        params.reset_airlight();

        tracing::info!(
            width,
            height,
            scaling_factor,
            wid_down = frame.wid_down(),
            hei_down = frame.hei_down(),
            threads = pool.threads(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Initialized dehazing context"
        );
        let session = self.session.insert(Session {
            frame,
            pool,
            buffers: Mutex::new(buffers),
        });
        Ok(&session.frame)
    }

    /// Dehaze `input` into a newly allocated image.
    pub fn process(&self, input: &RgbImage, params: &mut DcpParams) -> DcpResult<RgbImage> {
        let session = self.session.as_ref().ok_or(DcpError::NotInitialized)?;
        check_shape(&session.frame, input)?;
        let mut output = RgbImage::try_new(input.width(), input.height())?;
        self.process_into(input, params, &mut output)?;
        Ok(output)
    }

    /// Dehaze `input` into the caller-supplied `output`.
    ///
    /// On error neither `output` nor the airlight history in `params` is
    /// modified. On success `params.airlight_curr` and
    /// `params.airlight_prev` hold the airlight used by this call.
    pub fn process_into(
        &self,
        input: &RgbImage,
        params: &mut DcpParams,
        output: &mut RgbImage,
    ) -> DcpResult<()> {
        let session = self.session.as_ref().ok_or(DcpError::NotInitialized)?;
        let frame = &session.frame;
        check_shape(frame, input)?;
        check_shape(frame, output)?;
        params.validate()?;
        if params.scaling_factor != frame.scaling_factor() {
            return Err(DcpError::InvalidParameter {
                name: "scaling_factor",
                reason: format!(
                    "{} differs from the initialized {}; re-initialize to change it",
                    params.scaling_factor,
                    frame.scaling_factor()
                ),
            });
        }

        let mut guard = match session.buffers.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(DcpError::Busy),
            // Every buffer is rewritten from scratch below.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        let buffers = &mut *guard;
        buffers.valid = false;

        let pool = &session.pool;
        let luts = frame.luts();
        let (wd, hd) = (frame.wid_down() as usize, frame.hei_down() as usize);
        let started = Instant::now();

        luts.downsample(pool, input, &mut buffers.working);
        DarkChannelFilter::new(frame.working_radius(params.min_radius), params.edge_mode).compute(
            pool,
            &buffers.working,
            wd,
            hd,
            &mut buffers.dark,
            &mut buffers.dark_tmp,
        );
        let dark_done = Instant::now();

        let raw = self.airlight.raw_estimate(&buffers.dark, frame, input);
        let curr = airlight::smooth(params, raw);
        tracing::debug!(?raw, airlight = ?curr, "Estimated airlight");

        if params.omega == 0.0 {
            output.as_raw_mut().copy_from_slice(input.as_raw());
            airlight::commit(params, curr);
            tracing::debug!("omega is zero, output is a copy of the input");
            return Ok(());
        }

        let transmission = TransmissionEstimator::from_params(params);
        luminance(pool, &buffers.working, wd, &mut buffers.guide);
        transmission.raw(pool, &buffers.dark, wd, curr[COMBINED_CHANNEL], &mut buffers.raw);
        let guided = GuidedFilter::new(
            frame.working_radius(params.box_radius),
            params.eps,
            params.edge_mode,
        );
        transmission.refine(
            pool,
            &guided,
            &buffers.guide,
            &buffers.raw,
            wd,
            hd,
            &mut buffers.guided,
            &mut buffers.refined,
        );
        let sky_pixels = SkyDetector::from_params(params).apply(
            pool,
            &buffers.guide,
            &buffers.guided.var_i,
            wd,
            &mut buffers.refined,
            &mut buffers.sky_weights,
        );
        luts.upsample(pool, &buffers.refined, &mut buffers.transmission);
        let transmission_done = Instant::now();

        Compositor::new(curr, params.t0).compose(pool, input, &buffers.transmission, output);
        airlight::commit(params, curr);

        buffers.sky_pixels = sky_pixels;
        buffers.airlight = curr;
        buffers.valid = true;
        tracing::debug!(
            sky_pixels,
            dark_ms = (dark_done - started).as_secs_f64() * 1e3,
            transmission_ms = (transmission_done - dark_done).as_secs_f64() * 1e3,
            total_ms = started.elapsed().as_secs_f64() * 1e3,
            "Processed frame"
        );
        Ok(())
    }

    /// Copy of the transmission computed by the last successful call.
    ///
    /// `Ok(None)` if no call has produced one yet in this session, or if
    /// the last call skipped the transmission stage (`omega == 0`).
    pub fn last_transmission(&self) -> DcpResult<Option<TransmissionMap>> {
        let session = self.session.as_ref().ok_or(DcpError::NotInitialized)?;
        let buffers = match session.buffers.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(DcpError::Busy),
            Err(TryLockError::Poisoned(_)) => return Ok(None),
        };
        if !buffers.valid {
            return Ok(None);
        }
        let frame = &session.frame;
        Ok(Some(TransmissionMap {
            width: frame.width(),
            height: frame.height(),
            values: buffers.transmission.clone(),
            wid_down: frame.wid_down(),
            hei_down: frame.hei_down(),
            sky_weights: buffers.sky_weights.clone(),
            sky_pixels: buffers.sky_pixels,
            airlight: buffers.airlight,
        }))
    }

    /// Drop the session: LUTs, worker pool and working buffers.
    ///
    /// Calling it again, or before any `initialize`, does nothing.
    pub fn release(&mut self) {
        match self.session.take() {
            Some(session) => tracing::info!(
                width = session.frame.width(),
                height = session.frame.height(),
                "Released dehazing context"
            ),
            None => tracing::trace!("Release without an active context"),
        }
    }
}

impl Drop for DcpEngine {
    fn drop(&mut self) {
        self.release();
    }
}
