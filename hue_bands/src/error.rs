use thiserror::Error;

// Top-level error for a pipeline run. Everything except a skipped acquisition is fatal.

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Frame acquisition failed {failures} times in a row: {last}")]
    Acquisition {
        failures: u32,
        last: FrameAcquisitionError,
    },
    #[error("Split error: {0}")]
    Split(#[from] SplitError),
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationRangeError),
    #[error("Frame size changed from {expected:?} to {actual:?}")]
    GeometryChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Debug renderer failed: {0}")]
    Render(#[from] RenderError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("segment count is missing")]
    MissingSegmentCount,
    #[error("segment count {0:?} is not a positive integer")]
    InvalidSegmentCount(String),
    #[error("segment count must be at least 1")]
    ZeroSegmentCount,
    #[error("resize {0:?} is not of the form <width>x<height>")]
    InvalidResize(String),
}

#[derive(Error, Debug)]
pub enum FrameAcquisitionError {
    #[error("source returned no frame")]
    NoFrame,
    #[error("source returned an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },
    #[error("capture device error: {0}")]
    Device(String),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("cannot split a frame of height {height} into {requested} segments")]
    InvalidSplitCount { requested: u32, height: u32 },
}

/// Raised when a hue falls outside [0, 360]. Points at a hue-scale mismatch upstream.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("hue {hue} is outside [0, 360]")]
pub struct ClassificationRangeError {
    pub hue: f32,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("display backend error: {0}")]
    Backend(String),
    #[error("{bands} bands cannot be drawn with {colors} colors")]
    ColorCountMismatch { bands: usize, colors: usize },
    #[error("cannot lay out bands: {0}")]
    Layout(#[from] SplitError),
}
