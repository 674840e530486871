#![allow(clippy::needless_range_loop, clippy::manual_range_contains)]

//! dcp-engine: Dark channel prior dehazing with sky-region handling
//!
//! This library removes haze from photographs using the dark channel prior
//! (He, Sun and Tang), extended so that bright, flat sky regions, where the
//! prior does not hold, are not over-darkened or discolored.
//!
//! # Quick Start
//!
//! [`DcpEngine`] is the entry point. The caller owns a [`DcpParams`] record,
//! initializes a session for an image size, and calls
//! [`DcpEngine::process`] once per frame or parameter change:
//!
//! ```
//! use dcp_engine::{DcpEngine, DcpParams, EngineOptions, RgbImage};
//!
//! let mut params = DcpParams::default();
//! let mut engine = DcpEngine::new(EngineOptions::new().threads(2));
//! engine.initialize(32, 32, 1.0, &mut params)?;
//!
//! let hazy = RgbImage::from_fn(32, 32, |x, y| [150 + (x % 7) as u8, 160, 170 + (y % 5) as u8]);
//! let clear = engine.process(&hazy, &mut params)?;
//!
//! // Slider change: mutate one field, process again.
//! params.omega = 0.8;
//! let clearer = engine.process(&hazy, &mut params)?;
//! assert_eq!(clear.dimensions(), clearer.dimensions());
//! # Ok::<(), dcp_engine::DcpError>(())
//! ```
//!
//! # Pipeline
//!
//! ```text
//! input (full resolution, 8-bit RGB)
//!     |
//!     v
//! downsample via LookupTables          -> working image (wid_down x hei_down)
//!     |
//!     v
//! DarkChannelFilter                    channel min + sliding window min
//!     |
//!     v
//! AirlightEstimator                    top dark-channel pixels, bounded,
//!     |                                smoothed against airlight_prev
//!     v
//! TransmissionEstimator                1 - omega * dark / A
//!     |                                guided refinement, clamp [t0, t1]
//!     v
//! SkyDetector                          lift bright, flat regions toward t1
//!     |
//!     v
//! upsample via LookupTables            -> full-resolution transmission
//!     |
//!     v
//! Compositor                           (I - A) / max(t, t0) + A
//! ```
//!
//! Every stage runs on the session's [`WorkerPool`] over disjoint row
//! tiles and returns only when all tiles are done, so each stage sees the
//! complete output of the previous one.
//!
//! # Airlight History
//!
//! The airlight is smoothed across calls to avoid flicker between frames.
//! The history lives in the caller's [`DcpParams`] (`airlight_prev` and
//! `airlight_seeded`) and is written only at the end of a successful call.
//! [`DcpEngine::initialize`] clears it; nothing else does.
//!
//! # Window Radii
//!
//! `min_radius` and `box_radius` are given in full-resolution pixels and
//! scaled to the working grid, so a preview at `scaling_factor = 0.25`
//! covers the same image area as a full-resolution run.

pub mod airlight;
pub mod compositor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frame;
pub mod image;
pub mod params;
pub mod pool;
pub mod sky;
pub mod transmission;


pub use airlight::AirlightEstimator;
pub use compositor::Compositor;
pub use engine::{DcpEngine, EngineOptions, TransmissionMap};
pub use error::{DcpError, DcpResult};
pub use filter::{DarkChannelFilter, GuidedFilter};
pub use frame::{FrameContext, LookupTables};
pub use image::RgbImage;
pub use params::{DcpParams, EdgeMode};
pub use pool::WorkerPool;
pub use sky::SkyDetector;
pub use transmission::TransmissionEstimator;
