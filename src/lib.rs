mod associate;
mod bbox;
mod config;
mod detection;
mod detector;
mod error;
mod frame;
mod kalman_box_tracker;
mod multi_tracker;
mod pipeline;
#[cfg(feature = "python")]
mod python_api;
mod report;
mod template_tracker;
mod track;
mod visual_tracker;

pub use associate::{Association, associate, calc_iou_matrix, filter_matches, solve_assignment};
pub use bbox::BBox;
pub use config::TrackerConfig;
pub use detection::Detection;
pub use detector::{DetectionLog, Detector};
pub use error::{Error, Result};
pub use frame::{Frame, FrameSource};
pub use kalman_box_tracker::KalmanBoxTracker;
pub use multi_tracker::MultiTracker;
pub use pipeline::{Pipeline, RunSummary};
pub use report::{ClassNames, MotWriter};
pub use template_tracker::{TemplateParams, TemplateTracker};
pub use track::{Track, TrackSnapshot};
pub use visual_tracker::{TrackerFactory, TrackerKind, VisualTracker};

#[cfg(feature = "python")]
use pyo3::{
    Bound, PyResult, pymodule,
    types::{PyModule, PyModuleMethods},
};

#[cfg(feature = "python")]
use crate::python_api::{PyBBox, PyDetection, PyMultiTracker, PyTrack};

#[cfg(feature = "python")]
#[pymodule]
fn corr_track(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBBox>()?;
    m.add_class::<PyDetection>()?;
    m.add_class::<PyTrack>()?;
    m.add_class::<PyMultiTracker>()?;

    Ok(())
}
