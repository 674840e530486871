//! Skyhaze - dark channel prior dehazing with sky preservation
//!
//! Glue between the `dcp-engine` crate and an interactive front end:
//! YAML configuration, the slider table, PNG decoding and encoding, and
//! the load / tweak / reprocess session. This library exposes modules for
//! integration testing.

pub mod codec;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use dcp_engine;
