use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    bbox::BBox,
    error::{Error, Result},
    frame::Frame,
    kalman_box_tracker::KalmanBoxTracker,
    template_tracker::{TemplateParams, TemplateTracker},
};

/// Single-object tracker bound to exactly one track.
///
/// Boxes passed in and out are in the coordinates of the frames the tracker
/// is fed with.
pub trait VisualTracker: Send {
    /// Locates the object in `frame`. `None` signals tracking failure.
    fn update(&mut self, frame: &Frame) -> Option<BBox>;

    /// Feedback from a matched detection that did not trigger a refresh.
    fn observe(&mut self, _bbox: BBox) {}
}

/// Creates initialized visual trackers for new or refreshed tracks.
pub trait TrackerFactory: Send + Sync {
    fn initialize(&self, frame: &Frame, bbox: BBox) -> Box<dyn VisualTracker>;
}

/// Supported visual tracking algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TrackerKind {
    /// Constant-velocity box motion model, blind to pixels.
    Kalman,
    /// Appearance template matched by normalized cross-correlation.
    #[default]
    Template,
}

impl TrackerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TrackerKind::Kalman => "kalman",
            TrackerKind::Template => "template",
        }
    }
}

impl FromStr for TrackerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kalman" => Ok(TrackerKind::Kalman),
            "template" => Ok(TrackerKind::Template),
            _ => Err(Error::UnknownTracker(s.to_string())),
        }
    }
}

impl TryFrom<String> for TrackerKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TrackerKind> for String {
    fn from(kind: TrackerKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TrackerFactory for TrackerKind {
    fn initialize(&self, frame: &Frame, bbox: BBox) -> Box<dyn VisualTracker> {
        match self {
            TrackerKind::Kalman => Box::new(KalmanBoxTracker::new(bbox)),
            TrackerKind::Template => {
                Box::new(TemplateTracker::new(frame, bbox, TemplateParams::default()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names_ignoring_case() {
        assert_eq!("kalman".parse::<TrackerKind>().unwrap(), TrackerKind::Kalman);
        assert_eq!("TEMPLATE".parse::<TrackerKind>().unwrap(), TrackerKind::Template);
        assert_eq!(" Template ".parse::<TrackerKind>().unwrap(), TrackerKind::Template);
    }

    #[test]
    fn test_parse_unknown_name_is_rejected() {
        let err = "MEDIANFLOW".parse::<TrackerKind>().unwrap_err();

        assert!(matches!(err, Error::UnknownTracker(name) if name == "MEDIANFLOW"));
    }

    #[test]
    fn test_serde_uses_names() {
        let kind: TrackerKind = serde_json::from_str("\"kalman\"").unwrap();
        assert_eq!(kind, TrackerKind::Kalman);
        assert_eq!(serde_json::to_string(&TrackerKind::Template).unwrap(), "\"template\"");
        assert!(serde_json::from_str::<TrackerKind>("\"csrt\"").is_err());
    }
}
