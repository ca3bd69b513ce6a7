// THEORY:
// This file is the main entry point for the `hue_bands` library crate. It exposes
// the `ColorPipeline` and the small set of seams around it (`FrameSource`,
// `DebugRenderer`, `ReportSink`) as the public API, while the per-band math lives
// in `core_modules`.
//
// Data flows strictly one way:
//   frame -> BandSplitter -> Band -> (mean | histogram) -> ColorBucket -> report
//
// Everything that touches hardware or a display (cameras, windows, image files on
// disk) lives outside this crate, behind the traits defined here. That keeps the
// whole classification path testable headlessly with synthetic frames.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod frame_source;
pub mod pipeline;
pub mod renderer;

pub use config::{PipelineConfig, RunMode, SegmentCount, SummaryMode};
pub use core_modules::hue_bucket::{ColorBucket, classify};
pub use error::PipelineError;
pub use pipeline::{ColorPipeline, FrameReport, PipelineControl, ReportSink, StdoutReport};
