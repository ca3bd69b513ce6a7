// THEORY:
// The `pipeline` module is the top-level API of the crate. It drives one cycle per
// frame through the whole stack:
//
//   acquire -> split into bands -> summarize each band -> classify -> report
//                                                                 -> (debug render)
//
// Key architectural principles:
// 1.  **One loop, two summaries**: mean and histogram-majority share the same
//     acquisition, reporting and rendering scaffolding; `SummaryMode` only changes
//     how a `Band` is reduced.
// 2.  **Geometry is fixed by the first frame**: the `BandSplitter` is built from the
//     first frame that arrives, which is also where an impossible split count is
//     rejected. A later frame with another size stops the run instead of quietly
//     producing different bands.
// 3.  **Failures are local, limits are explicit**: a missing frame skips the cycle
//     and is logged. The run only gives up on acquisition when
//     `max_consecutive_failures` says so.
// 4.  **Stoppable**: `PipelineControl::stop` is checked at the top of every cycle and
//     cuts the inter-cycle sleep short.
// 5.  **Headless by default**: the renderer and the report sink are injected, so the
//     whole loop runs in tests with synthetic frames and no display.

use crate::config::{PipelineConfig, RunMode, SummaryMode};
use crate::core_modules::D1::pixel::pixel::Hue;
use crate::core_modules::band::band::Band;
use crate::core_modules::band_splitter::BandSplitter;
use crate::core_modules::hue_bucket::{ColorBucket, classify};
use crate::error::PipelineError;
use crate::frame_source::FrameSource;
use crate::renderer::DebugRenderer;
use image::{Rgb, RgbImage};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Printed after the band lines of every frame.
pub const REPORT_SEPARATOR: &str = "----------";

/// What one band was reduced to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandSummary {
    /// Mean color of the band, its hue and the hue's bucket.
    Mean {
        color: Rgb<u8>,
        hue: Hue,
        bucket: ColorBucket,
    },
    /// Winning bucket of the per-pixel vote.
    Histogram {
        bucket: ColorBucket,
        votes: u64,
        total: u64,
    },
}

impl BandSummary {
    pub fn bucket(&self) -> ColorBucket {
        match self {
            BandSummary::Mean { bucket, .. } | BandSummary::Histogram { bucket, .. } => *bucket,
        }
    }

    /// Color used to draw the band in the debug view.
    pub fn display_color(&self) -> Rgb<u8> {
        match self {
            BandSummary::Mean { color, .. } => *color,
            BandSummary::Histogram { bucket, .. } => bucket.swatch(),
        }
    }
}

/// Classification of one band in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandReport {
    pub index: usize,
    pub summary: BandSummary,
}

impl fmt::Display for BandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.summary {
            BandSummary::Mean { hue, bucket, .. } => {
                write!(f, "Segment {} average: {} (hue={:.1})", self.index, bucket, hue)
            }
            BandSummary::Histogram { bucket, votes, total } => {
                write!(f, "Segment {} dominant: {} (votes={}/{})", self.index, bucket, votes, total)
            }
        }
    }
}

/// Everything the pipeline concluded about one frame, top band first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub bands: Vec<BandReport>,
}

impl FrameReport {
    pub fn buckets(&self) -> Vec<ColorBucket> {
        self.bands.iter().map(|band| band.summary.bucket()).collect()
    }

    pub fn display_colors(&self) -> Vec<Rgb<u8>> {
        self.bands.iter().map(|band| band.summary.display_color()).collect()
    }

    /// The report lines followed by the separator.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.bands.iter().map(ToString::to_string).collect();
        lines.push(REPORT_SEPARATOR.to_string());
        lines
    }
}

/// Receives every frame report.
pub trait ReportSink {
    fn report(&mut self, report: &FrameReport);
}

/// Prints reports to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReport;

impl ReportSink for StdoutReport {
    fn report(&mut self, report: &FrameReport) {
        for line in report.lines() {
            println!("{line}");
        }
    }
}

/// Cloneable handle that asks a running pipeline to stop.
#[derive(Debug, Clone)]
pub struct PipelineControl {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl PipelineControl {
    /// Takes effect at the next cycle boundary, or immediately while sleeping.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

/// The band classifier loop over one frame source.
pub struct ColorPipeline<S: FrameSource> {
    config: PipelineConfig,
    source: S,
    renderer: Option<Box<dyn DebugRenderer>>,
    sink: Box<dyn ReportSink>,
    /// Fixed by the first frame.
    splitter: Option<BandSplitter>,
    control: PipelineControl,
    stop_rx: watch::Receiver<bool>,
    consecutive_failures: u32,
    frames_processed: u64,
}

impl<S: FrameSource> ColorPipeline<S> {
    pub fn new(config: PipelineConfig, source: S) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            config,
            source,
            renderer: None,
            sink: Box::new(StdoutReport),
            splitter: None,
            control: PipelineControl {
                stop_tx: Arc::new(stop_tx),
            },
            stop_rx,
            consecutive_failures: 0,
            frames_processed: 0,
        }
    }

    /// Attaches the debug view. Only used when `config.debug` is set.
    pub fn with_renderer<R: DebugRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_sink<K: ReportSink + 'static>(mut self, sink: K) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn control(&self) -> PipelineControl {
        self.control.clone()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Row geometry, once the first frame has fixed it.
    pub fn splitter(&self) -> Option<&BandSplitter> {
        self.splitter.as_ref()
    }

    /// Runs cycles until stopped, until the single still-image pass is done, or
    /// until a fatal error.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        info!(
            segments = self.config.segment_count.get(),
            mode = ?self.config.summary_mode,
            run_mode = ?self.config.run_mode,
            debug = self.config.debug,
            "Color pipeline starting"
        );

        loop {
            if *self.stop_rx.borrow_and_update() {
                info!(frames = self.frames_processed, "Stop requested, leaving pipeline loop");
                return Ok(());
            }

            let report = self.tick().inspect_err(|e| error!("Pipeline stopped: {e}"))?;

            if self.config.run_mode == RunMode::Still && report.is_some() {
                info!("Still image processed");
                return Ok(());
            }

            self.wait_for_next_cycle().await;
        }
    }

    async fn wait_for_next_cycle(&mut self) {
        let interval = self.config.poll_interval;
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = self.stop_rx.changed() => {}
        }
    }

    /// One cycle: acquire, classify, report, optionally render.
    /// `Ok(None)` means the frame was missing and the cycle was skipped.
    pub fn tick(&mut self) -> Result<Option<FrameReport>, PipelineError> {
        let frame = match self.source.next_frame() {
            Ok(frame) => {
                self.consecutive_failures = 0;
                frame
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    failures = self.consecutive_failures,
                    "Frame acquisition failed, skipping cycle: {e}"
                );
                return match self.config.max_consecutive_failures {
                    Some(limit) if self.consecutive_failures >= limit => {
                        Err(PipelineError::Acquisition {
                            failures: self.consecutive_failures,
                            last: e,
                        })
                    }
                    _ => Ok(None),
                };
            }
        };

        let report = self.process_frame(&frame)?;
        self.frames_processed += 1;
        self.sink.report(&report);

        if self.config.debug {
            if let Some(renderer) = self.renderer.as_mut() {
                let colors = report.display_colors();
                renderer.render(&frame, &colors, report.bands.len())?;
            }
        }

        Ok(Some(report))
    }

    /// Classifies every band of `frame` without touching the sink or renderer.
    pub fn process_frame(&mut self, frame: &RgbImage) -> Result<FrameReport, PipelineError> {
        let mode = self.config.summary_mode;
        let splitter = match &mut self.splitter {
            Some(splitter) => splitter,
            slot @ None => {
                let (width, height) = frame.dimensions();
                let splitter = BandSplitter::new(width, height, self.config.segment_count)?;
                info!(width, height, bands = splitter.band_count(), "Frame geometry fixed");
                slot.insert(splitter)
            }
        };

        if !splitter.accepts(frame) {
            return Err(PipelineError::GeometryChanged {
                expected: splitter.dimensions(),
                actual: frame.dimensions(),
            });
        }

        let bands = splitter
            .split(frame)
            .iter()
            .map(|band| summarize(band, mode))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FrameReport { bands })
    }
}

/// Reduces one band according to `mode`.
pub fn summarize(band: &Band, mode: SummaryMode) -> Result<BandReport, PipelineError> {
    let summary = match mode {
        SummaryMode::Mean => {
            let average = band.average_pixel();
            let hue = average.hue();
            let bucket = classify(hue)?;
            debug!(band = band.index, color = %average, hue, %bucket, "Band averaged");
            BandSummary::Mean {
                color: average.into(),
                hue,
                bucket,
            }
        }
        SummaryMode::Histogram => {
            let vote = band.dominant_bucket()?;
            debug!(band = band.index, bucket = %vote.bucket, votes = vote.votes, total = vote.total, "Band voted");
            BandSummary::Histogram {
                bucket: vote.bucket,
                votes: vote.votes,
                total: vote.total,
            }
        }
    };
    Ok(BandReport {
        index: band.index,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentCount;
    use crate::error::{FrameAcquisitionError, RenderError, SplitError};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    /// Plays back a fixed list of acquisition results, then fails forever.
    struct ScriptedSource {
        script: VecDeque<Option<RgbImage>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Option<RgbImage>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError> {
            self.script
                .pop_front()
                .flatten()
                .ok_or(FrameAcquisitionError::NoFrame)
        }
    }

    #[derive(Clone, Default)]
    struct Collected(Rc<RefCell<Vec<FrameReport>>>);

    impl ReportSink for Collected {
        fn report(&mut self, report: &FrameReport) {
            self.0.borrow_mut().push(report.clone());
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRenderer(Rc<RefCell<Vec<(u32, u32, Vec<Rgb<u8>>)>>>);

    impl DebugRenderer for RecordingRenderer {
        fn render(&mut self, frame: &RgbImage, colors: &[Rgb<u8>], bands: usize) -> Result<(), RenderError> {
            assert_eq!(colors.len(), bands);
            self.0
                .borrow_mut()
                .push((frame.width(), frame.height(), colors.to_vec()));
            Ok(())
        }
    }

    fn stripes(width: u32, colors: &[Rgb<u8>], rows_each: u32) -> RgbImage {
        RgbImage::from_fn(width, colors.len() as u32 * rows_each, |_, y| {
            colors[(y / rows_each) as usize]
        })
    }

    fn config(segments: u32) -> PipelineConfig {
        PipelineConfig::new(SegmentCount::new(segments).unwrap())
            .with_poll_interval(Duration::from_millis(10))
    }

    #[test]
    fn mean_mode_names_each_stripe() {
        let frame = stripes(1, &[RED, GREEN, BLUE], 1);
        let mut pipeline = ColorPipeline::new(config(3), ScriptedSource::new(vec![]));
        let report = pipeline.process_frame(&frame).unwrap();

        assert_eq!(
            report.buckets(),
            vec![ColorBucket::Red, ColorBucket::Green, ColorBucket::Blue]
        );
        assert_eq!(
            report.lines(),
            vec![
                "Segment 0 average: red (hue=0.0)",
                "Segment 1 average: green (hue=120.0)",
                "Segment 2 average: blue (hue=240.0)",
                REPORT_SEPARATOR,
            ]
        );
    }

    #[test]
    fn histogram_mode_reports_votes() {
        let mut frame = stripes(4, &[RED, BLUE], 2);
        frame.put_pixel(0, 0, GREEN);
        let mut pipeline = ColorPipeline::new(
            config(2).with_summary_mode(SummaryMode::Histogram),
            ScriptedSource::new(vec![]),
        );
        let report = pipeline.process_frame(&frame).unwrap();

        assert_eq!(report.lines()[0], "Segment 0 dominant: red (votes=7/8)");
        assert_eq!(report.lines()[1], "Segment 1 dominant: blue (votes=8/8)");
        assert_eq!(report.display_colors(), vec![RED, BLUE]);
    }

    #[test]
    fn split_count_is_checked_against_the_first_frame() {
        let mut pipeline = ColorPipeline::new(config(5), ScriptedSource::new(vec![]));
        let err = pipeline.process_frame(&RgbImage::new(3, 4)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Split(SplitError::InvalidSplitCount {
                requested: 5,
                height: 4
            })
        ));
    }

    #[test]
    fn later_frames_must_keep_the_first_geometry() {
        let mut pipeline = ColorPipeline::new(config(2), ScriptedSource::new(vec![]));
        pipeline.process_frame(&RgbImage::new(4, 4)).unwrap();
        let err = pipeline.process_frame(&RgbImage::new(4, 6)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::GeometryChanged {
                expected: (4, 4),
                actual: (4, 6)
            }
        ));
    }

    #[test]
    fn tick_skips_missing_frames() {
        let frame = stripes(2, &[GREEN], 2);
        let sink = Collected::default();
        let mut pipeline = ColorPipeline::new(config(1), ScriptedSource::new(vec![None, Some(frame)]))
            .with_sink(sink.clone());

        assert_eq!(pipeline.tick().unwrap(), None);
        let report = pipeline.tick().unwrap().expect("second cycle has a frame");
        assert_eq!(report.buckets(), vec![ColorBucket::Green]);
        assert_eq!(sink.0.borrow().len(), 1);
        assert_eq!(pipeline.frames_processed(), 1);
    }

    #[test]
    fn failure_limit_ends_the_run() {
        let mut pipeline = ColorPipeline::new(
            config(1).with_max_consecutive_failures(Some(2)),
            ScriptedSource::new(vec![]),
        );
        assert_eq!(pipeline.tick().unwrap(), None);
        assert!(matches!(
            pipeline.tick(),
            Err(PipelineError::Acquisition { failures: 2, .. })
        ));
    }

    #[test]
    fn renderer_only_runs_in_debug_mode() {
        let frame = stripes(3, &[RED, BLUE], 2);
        let renderer = RecordingRenderer::default();

        let mut quiet = ColorPipeline::new(config(2), ScriptedSource::new(vec![Some(frame.clone())]))
            .with_sink(Collected::default())
            .with_renderer(renderer.clone());
        quiet.tick().unwrap();
        assert!(renderer.0.borrow().is_empty());

        let mut loud = ColorPipeline::new(
            config(2).with_debug(true),
            ScriptedSource::new(vec![Some(frame)]),
        )
        .with_sink(Collected::default())
        .with_renderer(renderer.clone());
        loud.tick().unwrap();
        assert_eq!(renderer.0.borrow().as_slice(), &[(3, 4, vec![RED, BLUE])]);
    }

    #[tokio::test(start_paused = true)]
    async fn still_mode_runs_once() {
        let frame = stripes(2, &[RED, BLUE], 3);
        let sink = Collected::default();
        let mut pipeline = ColorPipeline::new(
            config(2).with_run_mode(RunMode::Still),
            crate::frame_source::StillImageSource::from_frame(frame),
        )
        .with_sink(sink.clone());

        let started = tokio::time::Instant::now();
        pipeline.run().await.unwrap();
        assert_eq!(sink.0.borrow().len(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_run_processes_nothing() {
        let sink = Collected::default();
        let mut pipeline = ColorPipeline::new(
            config(1),
            ScriptedSource::new(vec![Some(stripes(1, &[RED], 1))]),
        )
        .with_sink(sink.clone());
        pipeline.stop();
        assert!(pipeline.control().is_stopped());

        pipeline.run().await.unwrap();
        assert!(sink.0.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn live_mode_sleeps_between_cycles_until_stopped() {
        let frames = (0..3).map(|_| Some(stripes(2, &[GREEN], 2))).collect();
        let sink = Collected::default();
        let mut pipeline = ColorPipeline::new(
            config(1).with_poll_interval(Duration::from_secs(1)),
            ScriptedSource::new(frames),
        )
        .with_sink(sink.clone());
        let control = pipeline.control();

        let started = tokio::time::Instant::now();
        let stopper = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            control.stop();
        };
        let (result, ()) = tokio::join!(pipeline.run(), stopper);
        result.unwrap();

        // Cycles at t=0s, 1s, 2s; the stop at 2.5s cuts the third sleep short.
        assert_eq!(sink.0.borrow().len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn impossible_split_ends_the_run() {
        let mut pipeline = ColorPipeline::new(
            config(9),
            ScriptedSource::new(vec![Some(stripes(1, &[RED], 2))]),
        )
        .with_sink(Collected::default());
        assert!(matches!(pipeline.run().await, Err(PipelineError::Split(_))));
    }
}
