use pyo3::{PyErr, PyRef, PyResult, exceptions::PyValueError, pyclass, pymethods};

use crate::{
    Detection, Error, Frame, MultiTracker, Result, TrackSnapshot, TrackerConfig, TrackerKind,
    python_api::{PyDetection, PyTrack},
};

impl From<Error> for PyErr {
    fn from(err: Error) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

#[pyclass(name = "MultiTracker", unsendable)]
pub struct PyMultiTracker {
    inner: MultiTracker,
}

#[pymethods]
impl PyMultiTracker {
    #[new]
    #[pyo3(signature = (
        tracker = "template",
        max_age = 3,
        min_hits = 3,
        iou_threshold = 0.3,
        refresh_iou_threshold = 0.8,
        tracker_scale = 1.0 / 3.0
    ))]
    pub fn new(
        tracker: &str,
        max_age: u32,
        min_hits: u32,
        iou_threshold: f64,
        refresh_iou_threshold: f64,
        tracker_scale: f64,
    ) -> PyResult<PyMultiTracker> {
        let config = TrackerConfig {
            max_age,
            min_hits,
            iou_threshold,
            refresh_iou_threshold,
            tracker: tracker.parse::<TrackerKind>()?,
            tracker_scale,
            ..Default::default()
        };

        Ok(Self {
            inner: MultiTracker::new(config)?,
        })
    }

    /// Feeds one 8-bit luma frame; `detections=None` marks a frame without a detector batch.
    #[pyo3(signature = (frame, width, height, detections = None))]
    pub fn update(
        &mut self,
        frame: Vec<u8>,
        width: u32,
        height: u32,
        detections: Option<Vec<PyRef<PyDetection>>>,
    ) -> PyResult<Vec<PyTrack>> {
        let detections = detections.map(|detections| {
            detections
                .iter()
                .map(|detection| detection.inner)
                .collect::<Vec<Detection>>()
        });
        let tracks = self.track_luma(frame, width, height, detections.as_deref())?;

        Ok(tracks.into_iter().map(PyTrack::from).collect())
    }

    pub fn tracks(&self) -> Vec<PyTrack> {
        self.inner
            .confirmed_tracks()
            .into_iter()
            .map(PyTrack::from)
            .collect()
    }

    #[getter]
    fn frame_count(&self) -> u64 {
        self.inner.frame_count()
    }
}

impl PyMultiTracker {
    fn track_luma(
        &mut self,
        data: Vec<u8>,
        width: u32,
        height: u32,
        detections: Option<&[Detection]>,
    ) -> Result<Vec<TrackSnapshot>> {
        let frame = Frame::from_luma(self.inner.frame_count(), width, height, data)?;

        Ok(self.inner.update(&frame, detections))
    }
}
