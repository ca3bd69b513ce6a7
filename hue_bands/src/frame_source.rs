// THEORY:
// A `FrameSource` is the pipeline's only view of the outside world's pixels. The
// camera lives in the binary (it needs OpenCV); the still-image source lives here
// because the `image` crate already covers it.
//
// Every source must hand out frames in R, G, B order. A failed read is an
// ordinary `Err`; the pipeline decides whether that ends the run.

use crate::config::Resize;
use crate::error::FrameAcquisitionError;
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};
use tracing::info;

/// Yields one RGB frame per call.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError> {
        (**self).next_frame()
    }
}

/// A single image file, decoded once and handed out on every call.
pub struct StillImageSource {
    path: PathBuf,
    frame: RgbImage,
}

impl StillImageSource {
    /// Loads `path`, optionally resizing it the way the camera would deliver it.
    pub fn open<P: AsRef<Path>>(path: P, resize: Option<Resize>) -> Result<Self, FrameAcquisitionError> {
        let path = path.as_ref().to_path_buf();
        let decoded = image::open(&path)?.to_rgb8();
        let frame = match resize {
            Some(Resize { width, height }) if decoded.dimensions() != (width, height) => {
                imageops::resize(&decoded, width, height, FilterType::Triangle)
            }
            _ => decoded,
        };
        info!(
            path = %path.display(),
            width = frame.width(),
            height = frame.height(),
            "Loaded still image"
        );
        Ok(Self { path, frame })
    }

    /// Wraps an already decoded frame.
    pub fn from_frame(frame: RgbImage) -> Self {
        Self {
            path: PathBuf::new(),
            frame,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillImageSource {
    fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError> {
        if self.frame.width() == 0 || self.frame.height() == 0 {
            return Err(FrameAcquisitionError::EmptyFrame {
                width: self.frame.width(),
                height: self.frame.height(),
            });
        }
        Ok(self.frame.clone())
    }
}
