use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    visual_tracker::TrackerKind,
};

/// Association and track life-cycle settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames a track may stay unmatched before it is deleted
    pub max_age: u32,
    /// Hits needed before a track is reported
    pub min_hits: u32,
    /// Minimum IoU for a candidate match to be accepted
    pub iou_threshold: f64,
    /// IoU above which a matched track's visual tracker is rebuilt from the detection
    pub refresh_iou_threshold: f64,
    /// Visual tracking algorithm used for every track
    pub tracker: TrackerKind,
    /// Factor applied to frames and boxes before they reach the visual trackers
    pub tracker_scale: f64,
    /// The detector runs on frames whose index is a multiple of this
    pub detection_interval: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 3,
            min_hits: 3,
            iou_threshold: 0.3,
            refresh_iou_threshold: 0.8,
            tracker: TrackerKind::Template,
            tracker_scale: 1.0 / 3.0,
            detection_interval: 1,
        }
    }
}

impl TrackerConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("iou_threshold", self.iou_threshold),
            ("refresh_iou_threshold", self.refresh_iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !(self.tracker_scale > 0.0 && self.tracker_scale <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "tracker_scale must be within (0, 1], got {}",
                self.tracker_scale
            )));
        }
        if self.detection_interval == 0 {
            return Err(Error::InvalidConfig(
                "detection_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrackerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.max_age, 3);
        assert_eq!(config.min_hits, 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"max_age": 5, "tracker": "KALMAN"}"#).unwrap();

        assert_eq!(config.max_age, 5);
        assert_eq!(config.tracker, TrackerKind::Kalman);
        assert_eq!(config.iou_threshold, 0.3);
    }

    #[test]
    fn test_unknown_tracker_name_fails_to_load() {
        assert!(serde_json::from_str::<TrackerConfig>(r#"{"tracker": "goturn"}"#).is_err());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let config = TrackerConfig {
            iou_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = TrackerConfig {
            tracker_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TrackerConfig {
            detection_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
