use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{info, warn};

use crate::{
    config::TrackerConfig,
    detector::Detector,
    error::Result,
    frame::Frame,
    multi_tracker::MultiTracker,
    track::TrackSnapshot,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub tracks_created: u32,
    pub elapsed: Duration,
}

/// Strictly sequential frame loop: detector (every `detection_interval`
/// frames), then the track life-cycle update, then the sink.
pub struct Pipeline<D: Detector> {
    tracker: MultiTracker,
    detector: D,
    detection_interval: u64,
    max_frames: Option<u64>,
    stop: Arc<AtomicBool>,
}

impl<D: Detector> Pipeline<D> {
    pub fn new(config: TrackerConfig, detector: D) -> Result<Self> {
        Ok(Self::with_tracker(MultiTracker::new(config)?, detector))
    }

    pub fn with_tracker(tracker: MultiTracker, detector: D) -> Self {
        let detection_interval = tracker.config().detection_interval as u64;
        Self {
            tracker,
            detector,
            detection_interval,
            max_frames: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stops after `limit` frames even if the source has more.
    pub fn max_frames(mut self, limit: u64) -> Self {
        self.max_frames = Some(limit);
        self
    }

    /// Setting the returned flag ends the run before the next frame.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn tracker(&self) -> &MultiTracker {
        &self.tracker
    }

    /// Runs until the frame source is exhausted, the frame limit is reached or
    /// the stop handle is set. All tracks are released before returning.
    pub fn run<I, F>(&mut self, frames: I, mut sink: F) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Frame>>,
        F: FnMut(&Frame, &[TrackSnapshot]) -> Result<()>,
    {
        let start = Instant::now();
        let mut processed = 0u64;

        info!(
            "tracking with `{}` visual trackers, detector every {} frame(s)",
            self.tracker.config().tracker,
            self.detection_interval
        );

        for frame in frames {
            if self.stop.load(Ordering::Relaxed) {
                warn!("stopped by user after {processed} frames");
                break;
            }
            if self.max_frames.is_some_and(|limit| processed >= limit) {
                info!("frame limit of {processed} reached");
                break;
            }

            let frame = frame?;
            let detections = if frame.index() % self.detection_interval == 0 {
                self.detector.detect(&frame)?
            } else {
                None
            };

            let tracks = self.tracker.update(&frame, detections.as_deref());
            sink(&frame, &tracks)?;
            processed += 1;
        }

        let summary = RunSummary {
            frames: processed,
            tracks_created: self.tracker.tracks_created(),
            elapsed: start.elapsed(),
        };
        self.tracker.clear();

        info!(
            "total frames: {}, tracks created: {}, elapsed: {:.2}s",
            summary.frames,
            summary.tracks_created,
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use image::GrayImage;

    use super::*;
    use crate::{bbox::BBox, detection::Detection, error::Error, visual_tracker::TrackerKind};

    /// Reports one fixed detection on every call and records the frames it saw.
    #[derive(Default)]
    struct FixedDetector {
        calls: Vec<u64>,
    }

    impl Detector for FixedDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Detection>>> {
            self.calls.push(frame.index());
            Ok(Some(vec![Detection::new(
                0,
                0.9,
                BBox::new(10.0, 10.0, 20.0, 20.0),
            )]))
        }
    }

    fn frames(count: u64) -> impl Iterator<Item = Result<Frame>> {
        (0..count).map(|i| Ok(Frame::new(i, GrayImage::new(64, 64))))
    }

    fn config() -> TrackerConfig {
        TrackerConfig {
            tracker: TrackerKind::Kalman,
            tracker_scale: 1.0,
            min_hits: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_detector_runs_on_interval() {
        let config = TrackerConfig {
            detection_interval: 3,
            ..config()
        };
        let mut pipeline = Pipeline::new(config, FixedDetector::default()).unwrap();

        let summary = pipeline.run(frames(7), |_, _| Ok(())).unwrap();

        assert_eq!(summary.frames, 7);
        assert_eq!(pipeline.detector.calls, vec![0, 3, 6]);
        assert!(pipeline.tracker().tracks().is_empty());
    }

    #[test]
    fn test_sink_sees_confirmed_tracks() {
        let mut pipeline = Pipeline::new(config(), FixedDetector::default()).unwrap();
        let mut reported = Vec::new();

        let summary = pipeline
            .run(frames(3), |frame, tracks| {
                reported.push((frame.index(), tracks.len()));
                Ok(())
            })
            .unwrap();

        assert_eq!(reported, vec![(0, 0), (1, 1), (2, 1)]);
        assert_eq!(summary.tracks_created, 1);
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let mut pipeline = Pipeline::new(config(), FixedDetector::default()).unwrap();
        let stop = pipeline.stop_handle();

        let summary = pipeline
            .run(frames(10), |frame, _| {
                if frame.index() == 3 {
                    stop.store(true, Ordering::Relaxed);
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(summary.frames, 4);
    }

    #[test]
    fn test_frame_limit_ends_run() {
        let mut pipeline = Pipeline::new(config(), FixedDetector::default())
            .unwrap()
            .max_frames(2);

        let summary = pipeline.run(frames(10), |_, _| Ok(())).unwrap();

        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn test_frame_errors_abort_the_run() {
        let mut pipeline = Pipeline::new(config(), FixedDetector::default()).unwrap();
        let frames = frames(2).chain(std::iter::once(Err(Error::FrameSize {
            expected: 1,
            actual: 0,
        })));

        assert!(pipeline.run(frames, |_, _| Ok(())).is_err());
    }
}
