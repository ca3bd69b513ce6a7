use hue_bands::error::FrameAcquisitionError;
use hue_bands::frame_source::FrameSource;
use hue_bands::pipeline::{BandSummary, REPORT_SEPARATOR};
use hue_bands::{
    ColorBucket, ColorPipeline, FrameReport, PipelineConfig, PipelineControl, ReportSink, SegmentCount,
    SummaryMode,
};
use image::{Rgb, RgbImage};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Fails the first call, then serves its frames, then stops the pipeline.
struct FlakyCamera {
    frames: VecDeque<RgbImage>,
    failed_once: bool,
    on_empty: Rc<RefCell<Option<PipelineControl>>>,
}

impl FrameSource for FlakyCamera {
    fn next_frame(&mut self) -> Result<RgbImage, FrameAcquisitionError> {
        if !self.failed_once {
            self.failed_once = true;
            return Err(FrameAcquisitionError::Device("camera warming up".into()));
        }
        match self.frames.pop_front() {
            Some(frame) => Ok(frame),
            None => {
                if let Some(control) = self.on_empty.borrow().as_ref() {
                    control.stop();
                }
                Err(FrameAcquisitionError::NoFrame)
            }
        }
    }
}

#[derive(Clone, Default)]
struct Lines(Rc<RefCell<Vec<String>>>);

impl ReportSink for Lines {
    fn report(&mut self, report: &FrameReport) {
        self.0.borrow_mut().extend(report.lines());
    }
}

fn red_green_blue_column() -> RgbImage {
    let mut frame = RgbImage::new(1, 3);
    frame.put_pixel(0, 0, Rgb([255, 0, 0]));
    frame.put_pixel(0, 1, Rgb([0, 255, 0]));
    frame.put_pixel(0, 2, Rgb([0, 0, 255]));
    frame
}

#[test]
fn three_pure_rows_classify_as_red_green_blue() {
    let source = FlakyCamera {
        frames: VecDeque::from([red_green_blue_column()]),
        failed_once: true,
        on_empty: Rc::default(),
    };
    let config = PipelineConfig::new(SegmentCount::new(3).unwrap()).with_summary_mode(SummaryMode::Mean);
    let mut pipeline = ColorPipeline::new(config, source).with_sink(Lines::default());

    let report = pipeline.tick().unwrap().expect("frame available");
    let summaries: Vec<(usize, ColorBucket, f32)> = report
        .bands
        .iter()
        .map(|band| match band.summary {
            BandSummary::Mean { bucket, hue, .. } => (band.index, bucket, hue),
            BandSummary::Histogram { .. } => panic!("mean mode produced a vote"),
        })
        .collect();

    assert_eq!(
        summaries,
        vec![
            (0, ColorBucket::Red, 0.0),
            (1, ColorBucket::Green, 120.0),
            (2, ColorBucket::Blue, 240.0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn a_failed_acquisition_skips_one_cycle() {
    let sink = Lines::default();
    let stop_when_dry = Rc::new(RefCell::new(None));
    let config = PipelineConfig::new(SegmentCount::new(3).unwrap()).with_poll_interval(Duration::from_secs(1));
    let mut pipeline = ColorPipeline::new(
        config,
        FlakyCamera {
            frames: VecDeque::from([red_green_blue_column()]),
            failed_once: false,
            on_empty: stop_when_dry.clone(),
        },
    )
    .with_sink(sink.clone());
    *stop_when_dry.borrow_mut() = Some(pipeline.control());

    pipeline.run().await.unwrap();

    assert_eq!(
        sink.0.borrow().as_slice(),
        &[
            "Segment 0 average: red (hue=0.0)",
            "Segment 1 average: green (hue=120.0)",
            "Segment 2 average: blue (hue=240.0)",
            REPORT_SEPARATOR,
        ]
    );
    assert_eq!(pipeline.frames_processed(), 1);
}

#[test]
fn histogram_mode_over_a_still_frame() {
    let mut frame = RgbImage::from_pixel(10, 4, Rgb([0, 200, 200]));
    for x in 0..4 {
        frame.put_pixel(x, 0, Rgb([200, 0, 200]));
    }
    let source = FlakyCamera {
        frames: VecDeque::from([frame]),
        failed_once: true,
        on_empty: Rc::default(),
    };
    let config = PipelineConfig::new(SegmentCount::new(2).unwrap()).with_summary_mode(SummaryMode::Histogram);
    let mut pipeline = ColorPipeline::new(config, source).with_sink(Lines::default());

    let report = pipeline.tick().unwrap().unwrap();
    assert_eq!(report.buckets(), vec![ColorBucket::Cyan, ColorBucket::Cyan]);
    assert_eq!(report.lines()[0], "Segment 0 dominant: cyan (votes=16/20)");
}
