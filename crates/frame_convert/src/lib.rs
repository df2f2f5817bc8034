//! # Frame Convert
//!
//! Raw-to-displayable conversion for driver frames.
//!
//! Supported layouts:
//! - Mono (8-bit or word samples reduced to 8 bits)
//! - Bayer RGGB / GRBG / GBRG / BGGR (2x2 block demosaic)
//! - YUYV 4:2:2
//! - RGB / BGR interleaved

mod bayer;
mod error;
mod yuv;

pub use error::{ConvertError, Result};

use bytes::Bytes;
use contracts::{ColorMode, Frame, ImageData, ImageFormat};
use tracing::trace;

/// Converts a raw driver frame into a displayable image
pub trait FrameConverter {
    fn convert(&self, frame: &Frame, mode: ColorMode) -> Result<ImageData>;
}

/// Default converter for the layouts listed in the crate docs
#[derive(Debug, Clone, Copy, Default)]
pub struct RawConverter;

impl FrameConverter for RawConverter {
    fn convert(&self, frame: &Frame, mode: ColorMode) -> Result<ImageData> {
        let width = frame.capture.width as usize;
        let height = frame.capture.height as usize;
        let samples = normalize_samples(frame, width * height * mode.samples_per_pixel())?;

        let (format, data) = match mode {
            ColorMode::Mono => (ImageFormat::Gray8, samples),
            ColorMode::BayerRg
            | ColorMode::BayerGr
            | ColorMode::BayerGb
            | ColorMode::BayerBg => (
                ImageFormat::Rgb8,
                bayer::demosaic(&samples, width, height, mode),
            ),
            ColorMode::Yuyv => (ImageFormat::Rgb8, yuv::yuyv_to_rgb(&samples, width, height)),
            ColorMode::Rgb => (ImageFormat::Rgb8, samples),
            ColorMode::Bgr => {
                let mut rgb = samples;
                for px in rgb.chunks_exact_mut(3) {
                    px.swap(0, 2);
                }
                (ImageFormat::Rgb8, rgb)
            }
        };

        trace!(width, height, ?mode, "frame converted");
        Ok(ImageData {
            width: frame.capture.width,
            height: frame.capture.height,
            format,
            data: Bytes::from(data),
        })
    }
}

/// Reduce raw samples to one byte each.
///
/// Word samples are little-endian and keep their top 8 significant bits.
fn normalize_samples(frame: &Frame, sample_count: usize) -> Result<Vec<u8>> {
    let capture = frame.capture;
    if capture.bit_width == 0 || capture.bit_width > 16 {
        return Err(ConvertError::UnsupportedBitWidth(capture.bit_width));
    }

    let bytes_per_sample = capture.bytes_per_sample();
    let expected = sample_count * bytes_per_sample;
    if frame.data.len() < expected {
        return Err(ConvertError::ShortBuffer {
            expected,
            actual: frame.data.len(),
        });
    }

    let raw = &frame.data[..expected];
    if bytes_per_sample == 1 {
        return Ok(raw.to_vec());
    }

    let shift = u32::from(capture.bit_width - 8);
    Ok(raw
        .chunks_exact(2)
        .map(|pair| (u16::from_le_bytes([pair[0], pair[1]]) >> shift) as u8)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CaptureConfig;

    fn frame(width: u32, height: u32, bit_width: u8, data: Vec<u8>) -> Frame {
        Frame {
            data: Bytes::from(data),
            capture: CaptureConfig {
                width,
                height,
                bit_width,
            },
            available_before: 1,
        }
    }

    #[test]
    fn test_mono_passthrough() {
        let img = RawConverter
            .convert(&frame(2, 2, 8, vec![1, 2, 3, 4]), ColorMode::Mono)
            .unwrap();
        assert_eq!(img.format, ImageFormat::Gray8);
        assert_eq!(&img.data[..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_mono_12_bit_reduced() {
        // 0x0FF0 >> 4 = 0xFF, 0x0100 >> 4 = 0x10
        let data = vec![0xF0, 0x0F, 0x00, 0x01];
        let img = RawConverter
            .convert(&frame(2, 1, 12, data), ColorMode::Mono)
            .unwrap();
        assert_eq!(&img.data[..], &[0xFF, 0x10]);
    }

    #[test]
    fn test_bgr_swapped() {
        let img = RawConverter
            .convert(&frame(1, 1, 8, vec![10, 20, 30]), ColorMode::Bgr)
            .unwrap();
        assert_eq!(&img.data[..], &[30, 20, 10]);
    }

    #[test]
    fn test_short_buffer() {
        let err = RawConverter
            .convert(&frame(4, 4, 8, vec![0; 3]), ColorMode::Mono)
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::ShortBuffer {
                expected: 16,
                actual: 3
            }
        );
    }

    #[test]
    fn test_bad_bit_width() {
        let err = RawConverter
            .convert(&frame(1, 1, 24, vec![0; 8]), ColorMode::Mono)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedBitWidth(24));
    }

    #[test]
    fn test_output_len_matches_format() {
        let img = RawConverter
            .convert(&frame(4, 2, 8, vec![128; 8]), ColorMode::BayerRg)
            .unwrap();
        assert_eq!(img.data.len(), img.expected_len());
    }
}
