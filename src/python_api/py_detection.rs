use pyo3::{pyclass, pymethods};

use crate::{Detection, python_api::PyBBox};

#[pyclass(name = "Detection")]
pub struct PyDetection {
    pub inner: Detection,
}

#[pymethods]
impl PyDetection {
    #[new]
    pub fn new(bbox: &PyBBox, class_id: u32, confidence: f32) -> Self {
        Self {
            inner: Detection::new(class_id, confidence, bbox.inner),
        }
    }

    #[getter]
    fn bbox(&self) -> PyBBox {
        PyBBox {
            inner: self.inner.bbox,
        }
    }

    #[getter]
    fn class_id(&self) -> u32 {
        self.inner.class_id
    }

    #[getter]
    fn confidence(&self) -> f32 {
        self.inner.confidence
    }
}
