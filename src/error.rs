use std::path::PathBuf;

use dcp_engine::DcpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dehazing error: {0}")]
    Dehaze(#[from] DcpError),

    #[error("Image codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No image loaded")]
    NoImage,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Unsupported PNG format: {color_type} at {bit_depth} bits")]
    UnsupportedFormat { color_type: String, bit_depth: u8 },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid parameters in config: {0}")]
    Invalid(DcpError),
}
