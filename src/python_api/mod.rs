mod py_bbox;
mod py_detection;
mod py_multi_tracker;
mod py_track;

pub use py_bbox::PyBBox;
pub use py_detection::PyDetection;
pub use py_multi_tracker::PyMultiTracker;
pub use py_track::PyTrack;
