mod camera;
mod window;

use camera::OpenCvCamera;
use clap::Parser;
use hue_bands::config::Resize;
use hue_bands::frame_source::{FrameSource, StillImageSource};
use hue_bands::{ColorPipeline, PipelineConfig, RunMode, SegmentCount, SummaryMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};
use window::HighGuiWindow;

/// Names the dominant hue of each horizontal band of a camera frame or image.
#[derive(Parser, Debug)]
#[command(name = "band_viewer", version)]
struct Args {
    /// Number of horizontal bands per frame.
    #[arg(long = "segments", env = "N_SPLITS")]
    segments: SegmentCount,

    /// Band summary: `mean` or `histogram`.
    #[arg(long, default_value = "mean")]
    mode: SummaryMode,

    /// Show each frame next to its band colors and wait for a key press.
    #[arg(long)]
    debug: bool,

    /// Classify this image once instead of reading the camera.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Resize the still image before processing, e.g. 320x240.
    #[arg(long, requires = "image")]
    resize: Option<Resize>,

    /// Camera device index.
    #[arg(long, default_value_t = 2)]
    device: i32,

    /// Pause between live frames, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Stop after this many missing frames in a row. Retries forever when unset.
    #[arg(long)]
    max_failures: Option<u32>,

    /// Maximum log level.
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // --- 1. Argument Parsing & Setup ---
    // A missing or malformed N_SPLITS ends the process here, before any device is touched.
    let args = Args::parse();
    init_logging(args.log_level);

    let run_mode = if args.image.is_some() {
        RunMode::Still
    } else {
        RunMode::Live
    };
    let config = PipelineConfig::new(args.segments)
        .with_summary_mode(args.mode)
        .with_run_mode(run_mode)
        .with_debug(args.debug)
        .with_poll_interval(Duration::from_millis(args.interval_ms))
        .with_max_consecutive_failures(args.max_failures);

    // --- 2. Frame Source ---
    let source: Box<dyn FrameSource> = match &args.image {
        Some(path) => Box::new(StillImageSource::open(path, args.resize)?),
        None => {
            let camera = OpenCvCamera::open(args.device)?;
            info!(device = camera.device(), "Reading live frames");
            Box::new(camera)
        }
    };

    // --- 3. Pipeline ---
    let mut pipeline = ColorPipeline::new(config, source);
    if args.debug {
        pipeline = pipeline.with_renderer(HighGuiWindow::new("hue bands")?);
    }

    let control = pipeline.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping");
            control.stop();
        }
    });

    // --- 4. Main Processing Loop ---
    pipeline.run().await?;

    info!(frames = pipeline.frames_processed(), "Done");
    Ok(())
}
