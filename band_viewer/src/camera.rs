use hue_bands::error::FrameAcquisitionError;
use hue_bands::frame_source::FrameSource;
use image::RgbImage;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::info;

/// Live frames from an OpenCV capture device, converted from BGR to RGB.
pub struct OpenCvCamera {
    capture: VideoCapture,
    device: i32,
    /// Reused capture buffer.
    frame: Mat,
}

impl OpenCvCamera {
    /// Opens the device once; it stays open for the life of the process.
    pub fn open(device: i32) -> anyhow::Result<Self> {
        let capture = VideoCapture::new(device, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            anyhow::bail!("could not open camera device {device}");
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        info!(device, width, height, "Camera opened");

        Ok(Self {
            capture,
            device,
            frame: Mat::default(),
        })
    }

    pub fn device(&self) -> i32 {
        self.device
    }
}

impl FrameSource for OpenCvCamera {
    fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError> {
        match self.capture.read(&mut self.frame) {
            Ok(true) if !self.frame.empty() => bgr_mat_to_rgb_image(&self.frame),
            Ok(_) => Err(FrameAcquisitionError::NoFrame),
            Err(e) => Err(FrameAcquisitionError::Device(e.to_string())),
        }
    }
}

/// Swaps a BGR `Mat` into an owned RGB image.
fn bgr_mat_to_rgb_image(frame: &Mat) -> Result<RgbImage, FrameAcquisitionError> {
    let device_error = |e: opencv::Error| FrameAcquisitionError::Device(e.to_string());

    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(device_error)?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let bytes = rgb.data_bytes().map_err(device_error)?.to_vec();
    RgbImage::from_raw(width, height, bytes).ok_or(FrameAcquisitionError::EmptyFrame { width, height })
}
