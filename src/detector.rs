use std::{collections::BTreeMap, io::Read, path::Path};

use crate::{detection::Detection, error::Result, frame::Frame};

/// Object detector collaborator.
pub trait Detector {
    /// Detections for `frame`, or `None` when no fresh batch is available.
    fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Detection>>>;
}

/// Detections computed ahead of time, keyed by frame index.
///
/// JSON layout: `{"<frame index>": [{"class_id": 0, "confidence": 0.9,
/// "bbox": {"x": 0, "y": 0, "width": 10, "height": 10}}]}`.
#[derive(Debug, Default)]
pub struct DetectionLog {
    frames: BTreeMap<u64, Vec<Detection>>,
}

impl DetectionLog {
    pub fn new(frames: BTreeMap<u64, Vec<Detection>>) -> Self {
        Self { frames }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let frames: BTreeMap<u64, Vec<Detection>> = serde_json::from_reader(reader)?;
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Detector for DetectionLog {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Detection>>> {
        Ok(self.frames.remove(&frame.index()))
    }
}
