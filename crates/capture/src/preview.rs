//! Preview sinks

use contracts::{FrameSet, ImageData, ImageFormat, PreviewSink};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use tracing::{debug, trace, Level};

/// Preview that scales each image and logs the result.
///
/// Stands in for an on-screen window: the loop hands it every complete set
/// when preview is enabled.
#[derive(Debug)]
pub struct LogPreview {
    name: String,
    scale_width: Option<u32>,
    shown: u64,
    resampled: u64,
}

impl LogPreview {
    /// `scale_width` of `None` shows images at native size
    pub fn new(name: impl Into<String>, scale_width: Option<u32>) -> Self {
        Self {
            name: name.into(),
            scale_width: scale_width.filter(|w| *w > 0),
            shown: 0,
            resampled: 0,
        }
    }

    /// Map the `-1 = no scaling` flag convention onto an optional width
    pub fn from_flag(name: impl Into<String>, preview_width: i64) -> Self {
        let width = u32::try_from(preview_width).ok();
        Self::new(name, width)
    }

    /// Frame sets shown so far
    pub fn shown(&self) -> u64 {
        self.shown
    }

    /// Images resized so far
    pub fn resampled(&self) -> u64 {
        self.resampled
    }

    /// Target dimensions for one image, aspect ratio preserved
    pub fn scaled_dims(&self, width: u32, height: u32) -> (u32, u32) {
        match self.scale_width {
            Some(target) if width > 0 => {
                let scaled = (u64::from(height) * u64::from(target) / u64::from(width)).max(1);
                (target, u32::try_from(scaled).unwrap_or(u32::MAX))
            }
            _ => (width, height),
        }
    }

    /// Resize one image to the preview width; `None` if the buffer is malformed
    pub fn scale(&self, image: &ImageData) -> Option<ImageData> {
        let (width, height) = self.scaled_dims(image.width, image.height);
        if (width, height) == (image.width, image.height) {
            return Some(image.clone());
        }

        let data = match image.format {
            ImageFormat::Gray8 => {
                let src = GrayImage::from_raw(image.width, image.height, image.data.to_vec())?;
                imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
            ImageFormat::Rgb8 => {
                let src = RgbImage::from_raw(image.width, image.height, image.data.to_vec())?;
                imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
        };

        Some(ImageData {
            width,
            height,
            format: image.format,
            data: data.into(),
        })
    }
}

impl PreviewSink for LogPreview {
    fn name(&self) -> &str {
        &self.name
    }

    fn show(&mut self, frame_set: &FrameSet) {
        self.shown += 1;
        // Nothing consumes the scaled image unless trace output is on
        if !tracing::enabled!(Level::TRACE) {
            return;
        }
        for (camera, image) in frame_set.iter().enumerate() {
            match self.scale(image) {
                Some(scaled) => {
                    self.resampled += 1;
                    trace!(
                        preview = %self.name,
                        tick = frame_set.tick(),
                        camera,
                        width = scaled.width,
                        height = scaled.height,
                        "preview image"
                    );
                }
                None => debug!(preview = %self.name, camera, "preview skipped malformed image"),
            }
        }
    }
}

/// Preview that discards everything
#[derive(Debug, Default)]
pub struct NullPreview;

impl PreviewSink for NullPreview {
    fn name(&self) -> &str {
        "null"
    }

    fn show(&mut self, _frame_set: &FrameSet) {}
}
