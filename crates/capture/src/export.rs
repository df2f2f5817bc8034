//! Export sinks - persist committed frame sets

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{ContractError, FrameSet, ImageData, ImageFormat};
use tracing::{debug, instrument};

/// Outcome of writing one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Images persisted
    pub written: usize,
    /// One entry per image that failed
    pub failures: Vec<ContractError>,
}

/// Durable storage for committed frame sets
///
/// Writes are best-effort per image: a failing image is reported and the
/// remaining images of the batch are still attempted.
pub trait ExportSink {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Write one frame set as batch `batch`
    fn write_batch(&mut self, batch: u64, frame_set: &FrameSet) -> BatchReport;
}

/// Writes `{base}/image{batch}/camera{position}.bmp`
#[derive(Debug, Clone)]
pub struct BmpExporter {
    base_path: PathBuf,
}

impl BmpExporter {
    /// The base directory is created lazily on the first batch
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory of batch `batch`
    pub fn batch_dir(&self, batch: u64) -> PathBuf {
        self.base_path.join(format!("image{batch}"))
    }

    /// File of camera `position` inside batch `batch`
    pub fn image_path(&self, batch: u64, position: usize) -> PathBuf {
        self.batch_dir(batch).join(format!("camera{position}.bmp"))
    }

    fn save_image(path: &Path, image: &ImageData) -> Result<(), ContractError> {
        if image.data.len() != image.expected_len() {
            return Err(ContractError::export_write(
                path,
                format!(
                    "buffer holds {} bytes, expected {}",
                    image.data.len(),
                    image.expected_len()
                ),
            ));
        }

        let color = match image.format {
            ImageFormat::Gray8 => image::ColorType::L8,
            ImageFormat::Rgb8 => image::ColorType::Rgb8,
        };
        image::save_buffer(path, &image.data, image.width, image.height, color)
            .map_err(|e| ContractError::export_write(path, e.to_string()))
    }
}

impl ExportSink for BmpExporter {
    fn name(&self) -> &str {
        "bmp"
    }

    #[instrument(
        name = "bmp_export_batch",
        skip(self, frame_set),
        fields(tick = frame_set.tick())
    )]
    fn write_batch(&mut self, batch: u64, frame_set: &FrameSet) -> BatchReport {
        let mut report = BatchReport::default();
        let dir = self.batch_dir(batch);

        if let Err(e) = fs::create_dir_all(&dir) {
            let message = e.to_string();
            report.failures = (0..frame_set.len())
                .map(|position| ContractError::export_write(self.image_path(batch, position), &message))
                .collect();
            return report;
        }

        for (position, image) in frame_set.iter().enumerate() {
            let path = self.image_path(batch, position);
            match Self::save_image(&path, image) {
                Ok(()) => report.written += 1,
                Err(e) => report.failures.push(e),
            }
        }

        debug!(
            dir = %dir.display(),
            written = report.written,
            failed = report.failures.len(),
            "batch written"
        );
        report
    }
}
