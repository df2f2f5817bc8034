//! Frame / FrameSet - acquisition and sync loop data
//!
//! A `Frame` is what one read call delivers; a `FrameSet` is what one
//! complete tick produces.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw buffer layout reported by the driver alongside each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Significant bits per sample (8 for byte samples, 10/12/16 for word samples)
    pub bit_width: u8,
}

impl CaptureConfig {
    /// Bytes used by one sample (1 for up to 8 bits, 2 otherwise)
    pub fn bytes_per_sample(&self) -> usize {
        if self.bit_width <= 8 {
            1
        } else {
            2
        }
    }
}

/// One raw frame from a single read call
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw sensor bytes (layout described by `capture`)
    pub data: Bytes,

    /// Layout metadata, passed through untouched
    pub capture: CaptureConfig,

    /// Buffers queued at the driver before this read
    pub available_before: u32,
}

/// Converted, displayable image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Pixel format
    pub format: ImageFormat,

    /// Pixel bytes, row-major, no padding
    pub data: Bytes,
}

impl ImageData {
    /// Expected byte length for the declared dimensions and format
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channels()
    }
}

/// Displayable pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Gray8,
    Rgb8,
}

impl ImageFormat {
    /// Channels per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
        }
    }
}

/// Exactly one converted image per bound camera, aligned to one tick.
///
/// Only constructible from a full tick: `from_tick` refuses any image list
/// whose length differs from the bound camera count, and the images are held
/// in a boxed slice so the arity cannot change afterwards.
#[derive(Debug, Clone)]
pub struct FrameSet {
    tick: u64,
    images: Box<[ImageData]>,
}

impl FrameSet {
    /// Build a frame set, or return the images back if the tick was partial.
    pub fn from_tick(
        tick: u64,
        images: Vec<ImageData>,
        expected: usize,
    ) -> Result<Self, Vec<ImageData>> {
        if expected == 0 || images.len() != expected {
            return Err(images);
        }
        Ok(Self {
            tick,
            images: images.into_boxed_slice(),
        })
    }

    /// Tick index this set was completed at
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of cameras (always the bound camera count)
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image of the camera at canonical position `index`
    pub fn get(&self, index: usize) -> Option<&ImageData> {
        self.images.get(index)
    }

    /// Images in canonical camera order
    pub fn images(&self) -> &[ImageData] {
        &self.images
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageData> {
        self.images.iter()
    }
}
