//! PNG decoding and encoding for [`RgbImage`].
//!
//! The engine works on 3-channel 8-bit RGB only. Decoding expands palette
//! and low-bit-depth images, strips 16-bit samples to 8 bits and drops
//! alpha, so any PNG the `png` crate can read becomes an engine input.

use std::io::Cursor;
use std::path::Path;

use dcp_engine::RgbImage;

use crate::error::CodecError;

/// Decode PNG bytes into an 8-bit RGB image.
pub fn decode_png(bytes: &[u8]) -> Result<RgbImage, CodecError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::PngDecode(e.to_string()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::PngDecode(e.to_string()))?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(unsupported(info.color_type, info.bit_depth));
    }
    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgb => data.to_vec(),
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&v| [v, v, v]).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0]])
            .collect(),
        other => return Err(unsupported(other, info.bit_depth)),
    };

    tracing::debug!(
        width = info.width,
        height = info.height,
        color_type = ?info.color_type,
        "Decoded PNG"
    );
    RgbImage::from_raw(info.width, info.height, rgb)
        .ok_or_else(|| CodecError::PngDecode("decoded buffer has unexpected size".to_string()))
}

fn unsupported(color_type: png::ColorType, bit_depth: png::BitDepth) -> CodecError {
    CodecError::UnsupportedFormat {
        color_type: format!("{color_type:?}"),
        bit_depth: bit_depth as u8,
    }
}

/// Encode an RGB image as an 8-bit RGB PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| CodecError::PngEncode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| CodecError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

pub fn read_png(path: &Path) -> Result<RgbImage, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_png(&bytes)
}

pub fn write_png(path: &Path, image: &RgbImage) -> Result<(), CodecError> {
    let bytes = encode_png(image)?;
    std::fs::write(path, &bytes).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote PNG");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode raw samples with an arbitrary PNG layout.
    fn raw_png(
        width: u32,
        height: u32,
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
        palette: Option<&[u8]>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color_type);
            encoder.set_depth(bit_depth);
            if let Some(palette) = palette {
                encoder.set_palette(palette);
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_rgb_round_trip() {
        let image = RgbImage::from_fn(5, 3, |x, y| [x as u8 * 50, y as u8 * 80, 7]);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode_png(&bytes).unwrap(), image);
    }

    #[test]
    fn test_decode_grayscale() {
        let bytes = raw_png(2, 1, png::ColorType::Grayscale, png::BitDepth::Eight, None, &[10, 200]);
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.pixel(0, 0), [10, 10, 10]);
        assert_eq!(image.pixel(1, 0), [200, 200, 200]);
    }

    #[test]
    fn test_decode_rgba_drops_alpha() {
        let bytes = raw_png(
            1,
            2,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            &[1, 2, 3, 0, 4, 5, 6, 255],
        );
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.as_raw(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_decode_gray_alpha() {
        let bytes = raw_png(
            2,
            1,
            png::ColorType::GrayscaleAlpha,
            png::BitDepth::Eight,
            None,
            &[90, 255, 30, 0],
        );
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.as_raw(), &[90, 90, 90, 30, 30, 30]);
    }

    #[test]
    fn test_decode_indexed() {
        let palette = [255, 0, 0, 0, 0, 255];
        // 1-bit indices: 0b0100_0000 -> pixel 0 = index 0, pixel 1 = index 1
        let bytes = raw_png(
            2,
            1,
            png::ColorType::Indexed,
            png::BitDepth::One,
            Some(&palette),
            &[0b0100_0000],
        );
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.pixel(0, 0), [255, 0, 0]);
        assert_eq!(image.pixel(1, 0), [0, 0, 255]);
    }

    #[test]
    fn test_decode_sixteen_bit_strips_low_byte() {
        let bytes = raw_png(
            1,
            1,
            png::ColorType::Rgb,
            png::BitDepth::Sixteen,
            None,
            &[0x12, 0x34, 0xab, 0xcd, 0xff, 0x00],
        );
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.pixel(0, 0), [0x12, 0xab, 0xff]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(CodecError::PngDecode(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_png(Path::new("/nonexistent/input.png")),
            Err(CodecError::Read { .. })
        ));
    }
}
