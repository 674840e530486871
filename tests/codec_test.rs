//! PNG files in, PNG files out.

mod common;

use common::fixtures;
use dcp_engine::{DcpEngine, DcpParams, EngineOptions, RgbImage};
use pretty_assertions::assert_eq;
use skyhaze::codec;
use skyhaze::error::CodecError;

#[test]
fn test_png_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");
    let image = fixtures::hazy_scene(33, 21, 11, 0.6);

    codec::write_png(&path, &image).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    common::assert_png(&bytes);
    assert_eq!(codec::read_png(&path).unwrap(), image);
}

#[test]
fn test_dehaze_decoded_png() {
    let image = fixtures::landscape(40, 40, 12);
    let bytes = codec::encode_png(&image).unwrap();
    let decoded = codec::decode_png(&bytes).unwrap();

    let mut params = DcpParams::default();
    let mut engine = DcpEngine::new(EngineOptions::new().threads(2));
    engine.initialize(40, 40, 0.5, &mut params).unwrap();
    let output = engine.process(&decoded, &mut params).unwrap();
    common::assert_png(&codec::encode_png(&output).unwrap());
    common::assert_same_shape(&output, &image);
}

#[test]
fn test_write_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.png");
    let result = codec::write_png(&path, &RgbImage::new(2, 2));
    assert!(matches!(result, Err(CodecError::Write { .. })));
}

#[test]
fn test_truncated_png_is_rejected() {
    let bytes = codec::encode_png(&fixtures::hazy_scene(16, 16, 13, 0.5)).unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        codec::decode_png(truncated),
        Err(CodecError::PngDecode(_))
    ));
}
