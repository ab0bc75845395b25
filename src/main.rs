//! `corr-track` CLI: runs the tracker over an image-sequence directory using
//! precomputed detections and writes confirmed tracks per frame.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use corr_track::{
    ClassNames, DetectionLog, FrameSource, MotWriter, Pipeline, TrackerConfig, TrackerKind,
};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "corr-track", about = "Detection-driven multi-object tracker")]
struct Cli {
    /// Directory of frame images, processed in file name order
    frames: PathBuf,
    /// JSON detection log keyed by frame index
    #[arg(long)]
    detections: PathBuf,
    /// Visual tracking algorithm (`kalman` or `template`)
    #[arg(long)]
    tracker: Option<String>,
    /// JSON tracker config; command line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Class names, one per line
    #[arg(long)]
    classes: Option<PathBuf>,
    /// Track output file, stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,
    #[arg(long)]
    max_age: Option<u32>,
    #[arg(long)]
    min_hits: Option<u32>,
    #[arg(long)]
    iou_threshold: Option<f64>,
    #[arg(long)]
    refresh_iou_threshold: Option<f64>,
    #[arg(long)]
    tracker_scale: Option<f64>,
    #[arg(long)]
    detection_interval: Option<u32>,
}

impl Cli {
    fn tracker_config(&self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TrackerConfig::default(),
        };

        if let Some(name) = &self.tracker {
            config.tracker = name.parse::<TrackerKind>()?;
        }
        if let Some(max_age) = self.max_age {
            config.max_age = max_age;
        }
        if let Some(min_hits) = self.min_hits {
            config.min_hits = min_hits;
        }
        if let Some(iou_threshold) = self.iou_threshold {
            config.iou_threshold = iou_threshold;
        }
        if let Some(refresh_iou_threshold) = self.refresh_iou_threshold {
            config.refresh_iou_threshold = refresh_iou_threshold;
        }
        if let Some(tracker_scale) = self.tracker_scale {
            config.tracker_scale = tracker_scale;
        }
        if let Some(detection_interval) = self.detection_interval {
            config.detection_interval = detection_interval;
        }
        config.validate()?;

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.tracker_config()?;

    let detections = DetectionLog::load(&cli.detections)
        .with_context(|| format!("loading detections {}", cli.detections.display()))?;
    let class_names = match &cli.classes {
        Some(path) => ClassNames::load(path)
            .with_context(|| format!("loading class names {}", path.display()))?,
        None => ClassNames::default(),
    };
    let frames = FrameSource::open(&cli.frames)?;

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let mut writer = MotWriter::new(output, class_names);

    let mut pipeline = Pipeline::new(config, detections)?;
    if let Some(limit) = cli.max_frames {
        pipeline = pipeline.max_frames(limit);
    }

    let summary = pipeline.run(frames, |frame, tracks| {
        writer.write_frame(frame.index(), tracks)
    })?;
    writer.flush()?;

    eprintln!("Total frames: {}", summary.frames);
    eprintln!("Tracks created: {}", summary.tracks_created);
    eprintln!("Elapsed: {:.2}s", summary.elapsed.as_secs_f64());

    Ok(())
}
