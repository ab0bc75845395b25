use pyo3::{pyclass, pymethods};

use crate::BBox;

#[pyclass(name = "BBox")]
#[derive(Clone)]
pub struct PyBBox {
    pub inner: BBox,
}

#[pymethods]
impl PyBBox {
    #[new]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            inner: BBox::new(x, y, width, height),
        }
    }

    #[getter]
    fn x(&self) -> f64 {
        self.inner.x
    }

    #[getter]
    fn y(&self) -> f64 {
        self.inner.y
    }

    #[getter]
    fn width(&self) -> f64 {
        self.inner.width
    }

    #[getter]
    fn height(&self) -> f64 {
        self.inner.height
    }

    #[getter]
    fn center(&self) -> (f64, f64) {
        self.inner.center()
    }

    #[getter]
    fn area(&self) -> f64 {
        self.inner.area()
    }

    /// Box clipped to a `width x height` frame.
    fn clip(&self, width: f64, height: f64) -> PyBBox {
        PyBBox {
            inner: self.inner.clip(width, height),
        }
    }

    fn iou(&self, other: &PyBBox) -> f64 {
        self.inner.iou(&other.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "BBox(x={}, y={}, width={}, height={})",
            self.x(),
            self.y(),
            self.width(),
            self.height()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
