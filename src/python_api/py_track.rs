use pyo3::{pyclass, pymethods};

use crate::{TrackSnapshot, python_api::PyBBox};

#[pyclass(name = "Track")]
pub struct PyTrack {
    #[pyo3(get)]
    pub track_id: u32,
    #[pyo3(get)]
    pub class_id: u32,
    #[pyo3(get)]
    pub confidence: f32,
    pub bbox: PyBBox,
}

impl From<TrackSnapshot> for PyTrack {
    fn from(track: TrackSnapshot) -> Self {
        Self {
            track_id: track.track_id,
            class_id: track.class_id,
            confidence: track.confidence,
            bbox: PyBBox { inner: track.bbox },
        }
    }
}

#[pymethods]
impl PyTrack {
    #[getter]
    fn bbox(&self) -> PyBBox {
        self.bbox.clone()
    }
}
