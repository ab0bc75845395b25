use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::{
    associate::associate,
    config::TrackerConfig,
    detection::Detection,
    error::Result,
    frame::Frame,
    track::{Track, TrackSnapshot},
    visual_tracker::TrackerFactory,
};

/// Owns the track store and drives every track through predict, associate,
/// update, aging and spawning once per frame.
pub struct MultiTracker {
    tracks: Vec<Track>,
    config: TrackerConfig,
    factory: Box<dyn TrackerFactory>,
    next_track_id: u32,
    frame_count: u64,
}

impl MultiTracker {
    /// Uses the visual tracker named in `config`.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let factory = config.tracker;
        Self::with_factory(config, factory)
    }

    pub fn with_factory(
        config: TrackerConfig,
        factory: impl TrackerFactory + 'static,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            tracks: Vec::new(),
            config,
            factory: Box::new(factory),
            next_track_id: 0,
            frame_count: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Every live track, confirmed or not, in creation order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks with at least `min_hits` hits, in creation order.
    pub fn confirmed_tracks(&self) -> Vec<TrackSnapshot> {
        self.tracks
            .iter()
            .filter(|track| track.num_hit >= self.config.min_hits)
            .map(Track::snapshot)
            .collect()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of track ids issued so far.
    pub fn tracks_created(&self) -> u32 {
        self.next_track_id
    }

    /// Processes one frame. `detections` is `None` on frames without a fresh
    /// detector batch, in which case tracks only follow their visual trackers.
    pub fn update(
        &mut self,
        frame: &Frame,
        detections: Option<&[Detection]>,
    ) -> Vec<TrackSnapshot> {
        self.frame_count += 1;
        let tracking_frame = frame.scaled(self.config.tracker_scale);

        self.predict(&tracking_frame);

        if let Some(detections) = detections {
            self.associate_and_update(&tracking_frame, detections);
        }

        self.confirmed_tracks()
    }

    fn predict(&mut self, frame: &Frame) {
        let scale = self.config.tracker_scale;
        self.tracks
            .par_iter_mut()
            .for_each(|track| track.predict(frame, scale));

        debug!(
            "frame {}: predicted {} tracks, {} lost",
            frame.index(),
            self.tracks.len(),
            self.tracks.iter().filter(|track| track.is_lost()).count()
        );
    }

    fn associate_and_update(&mut self, frame: &Frame, detections: &[Detection]) {
        let scale = self.config.tracker_scale;

        // tracks whose visual tracker failed sit out the association.
        let (candidates, lost): (Vec<usize>, Vec<usize>) =
            (0..self.tracks.len()).partition(|&i| !self.tracks[i].is_lost());

        let track_bboxes = candidates.iter().map(|&i| self.tracks[i].bbox).collect_vec();
        let detection_bboxes = detections.iter().map(|d| d.bbox).collect_vec();
        let association = associate(&track_bboxes, &detection_bboxes, self.config.iou_threshold);

        for &(candidate, detection_index) in &association.matched {
            let detection = &detections[detection_index];
            let track = &mut self.tracks[candidates[candidate]];
            track.register_hit(detection);

            if track.bbox.iou(&detection.bbox) > self.config.refresh_iou_threshold {
                let tracker = self.factory.initialize(frame, detection.bbox.scale(scale));
                track.refresh(tracker, detection.bbox);
            } else {
                track.observe(detection.bbox.scale(scale));
            }
        }

        for i in association
            .unmatched_tracks
            .iter()
            .map(|&candidate| candidates[candidate])
            .chain(lost)
        {
            self.tracks[i].register_miss();
        }

        let max_age = self.config.max_age;
        self.tracks.retain(|track| {
            let alive = track.num_miss <= max_age;
            if !alive {
                debug!(
                    "track {} deleted after {} missed frames",
                    track.track_id, track.num_miss
                );
            }
            alive
        });

        for &detection_index in &association.unmatched_detections {
            self.spawn(frame, &detections[detection_index]);
        }

        debug!(
            "frame {}: {} matched, {} new, {} live tracks",
            frame.index(),
            association.matched.len(),
            association.unmatched_detections.len(),
            self.tracks.len()
        );
    }

    fn spawn(&mut self, frame: &Frame, detection: &Detection) {
        let track_id = self.next_track_id;
        self.next_track_id += 1;

        let tracker = self
            .factory
            .initialize(frame, detection.bbox.scale(self.config.tracker_scale));
        self.tracks.push(Track::new(track_id, detection, tracker));
    }

    /// Drops every track and its visual tracker.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
