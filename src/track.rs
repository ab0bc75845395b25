use serde::Serialize;

use crate::{bbox::BBox, detection::Detection, frame::Frame, visual_tracker::VisualTracker};

/// Externally visible state of a confirmed track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackSnapshot {
    pub track_id: u32,
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BBox,
}

/// One persistent object hypothesis, owned by the [`MultiTracker`](crate::MultiTracker).
pub struct Track {
    pub track_id: u32,
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BBox,
    pub num_hit: u32,
    pub num_miss: u32,
    tracker: Box<dyn VisualTracker>,
    lost: bool,
}

impl Track {
    pub(crate) fn new(
        track_id: u32,
        detection: &Detection,
        tracker: Box<dyn VisualTracker>,
    ) -> Self {
        Self {
            track_id,
            class_id: detection.class_id,
            confidence: detection.confidence,
            bbox: detection.bbox,
            num_hit: 1,
            num_miss: 0,
            tracker,
            lost: false,
        }
    }

    /// Whether the visual tracker failed on the current frame.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            track_id: self.track_id,
            class_id: self.class_id,
            confidence: self.confidence,
            bbox: self.bbox,
        }
    }

    /// Runs the visual tracker on `frame`, which is `scale` times the size of
    /// the reporting coordinates. A failed prediction keeps the last box.
    pub(crate) fn predict(&mut self, frame: &Frame, scale: f64) {
        match self.tracker.update(frame) {
            Some(bbox) => {
                self.bbox = bbox.scale(1.0 / scale);
                self.lost = false;
            }
            None => self.lost = true,
        }
    }

    pub(crate) fn register_hit(&mut self, detection: &Detection) {
        self.num_hit += 1;
        self.num_miss = 0;
        self.class_id = detection.class_id;
        self.confidence = detection.confidence;
    }

    pub(crate) fn register_miss(&mut self) {
        self.num_miss += 1;
    }

    /// Replaces the visual tracker; the old one is dropped here.
    pub(crate) fn refresh(&mut self, tracker: Box<dyn VisualTracker>, bbox: BBox) {
        self.tracker = tracker;
        self.bbox = bbox;
        self.lost = false;
    }

    pub(crate) fn observe(&mut self, bbox: BBox) {
        self.tracker.observe(bbox);
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("track_id", &self.track_id)
            .field("class_id", &self.class_id)
            .field("confidence", &self.confidence)
            .field("bbox", &self.bbox)
            .field("num_hit", &self.num_hit)
            .field("num_miss", &self.num_miss)
            .field("lost", &self.lost)
            .finish_non_exhaustive()
    }
}
