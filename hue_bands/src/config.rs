// THEORY:
// Configuration is read once, validated once, and then handed to
// `ColorPipeline::new` as a plain struct. Nothing downstream reads the process
// environment; the binary is the only place that knows where values come from.

use crate::error::ConfigError;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Pause between live cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Number of horizontal bands per frame. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCount(NonZeroU32);

impl SegmentCount {
    pub fn new(count: u32) -> Result<Self, ConfigError> {
        NonZeroU32::new(count)
            .map(Self)
            .ok_or(ConfigError::ZeroSegmentCount)
    }

    /// Parses the textual setting, e.g. the value of `N_SPLITS`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingSegmentCount);
        }
        let count = trimmed
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidSegmentCount(raw.to_string()))?;
        Self::new(count)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for SegmentCount {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

/// How a band is reduced to one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMode {
    /// Average every pixel, then classify the average's hue.
    #[default]
    Mean,
    /// Classify every pixel, then take the most common bucket.
    Histogram,
}

impl FromStr for SummaryMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mean" | "average" => Ok(SummaryMode::Mean),
            "histogram" | "majority" => Ok(SummaryMode::Histogram),
            other => Err(format!("unknown summary mode {other:?}, expected mean or histogram")),
        }
    }
}

/// Live sources loop until stopped; still images are processed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Live,
    Still,
}

/// Target size for still images, parsed from `<width>x<height>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resize {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidResize(raw.to_string());
        let (width, height) = raw.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Resize { width, height })
    }
}

/// Everything the pipeline needs, validated before the first frame.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub segment_count: SegmentCount,
    pub summary_mode: SummaryMode,
    pub run_mode: RunMode,
    /// Hand each processed frame to the debug renderer, if one is attached.
    pub debug: bool,
    /// Wait between live cycles, including cycles skipped for a missing frame.
    pub poll_interval: Duration,
    /// Give up after this many failed acquisitions in a row. `None` retries forever.
    pub max_consecutive_failures: Option<u32>,
}

impl PipelineConfig {
    pub fn new(segment_count: SegmentCount) -> Self {
        Self {
            segment_count,
            summary_mode: SummaryMode::default(),
            run_mode: RunMode::default(),
            debug: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_failures: None,
        }
    }

    pub fn with_summary_mode(mut self, summary_mode: SummaryMode) -> Self {
        self.summary_mode = summary_mode;
        self
    }

    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_consecutive_failures(mut self, limit: Option<u32>) -> Self {
        self.max_consecutive_failures = limit;
        self
    }
}
