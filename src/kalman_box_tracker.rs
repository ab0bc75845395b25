use kfilter::{
    Kalman1M, KalmanPredict, measurement::LinearMeasurement, system::LinearNoInputSystem,
};
use nalgebra::{SMatrix, SVector};

use crate::{bbox::BBox, frame::Frame, visual_tracker::VisualTracker};

type BoxFilter = Kalman1M<f64, 7, 0, 4, LinearNoInputSystem<f64, 7>, LinearMeasurement<f64, 7, 4>>;

/// Constant-velocity motion model over `(cx, cy, area, aspect)`.
///
/// Ignores frame content; the prediction drifts with the velocity learned
/// from observed boxes.
pub struct KalmanBoxTracker {
    kalman_filter: BoxFilter,
    last_observation: SVector<f64, 4>,
}

impl KalmanBoxTracker {
    #[allow(non_snake_case)]
    pub fn new(bbox: BBox) -> Self {
        let z = bbox.to_observation_vector();

        let mut F = SMatrix::<f64, 7, 7>::identity();
        F[(0, 4)] = 1.0;
        F[(1, 5)] = 1.0;
        F[(2, 6)] = 1.0;
        let Q_diag = SVector::<f64, 7>::from_vec(vec![1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001]);
        let Q = SMatrix::<f64, 7, 7>::from_diagonal(&Q_diag);
        let mut x_initial = SVector::<f64, 7>::zeros();
        x_initial.fixed_rows_mut::<4>(0).copy_from(&z);
        let system = LinearNoInputSystem::new(F, Q, x_initial);

        let P_diag =
            SVector::<f64, 7>::from_vec(vec![10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0]);
        let P = SMatrix::<f64, 7, 7>::from_diagonal(&P_diag);

        let H = SMatrix::<f64, 4, 7>::identity();
        let R_diag = SVector::<f64, 4>::new(1.0, 1.0, 10.0, 10.0);
        let R = SMatrix::from_diagonal(&R_diag);
        let measurement = LinearMeasurement::new(H, R, z);

        Self {
            kalman_filter: Kalman1M::new_custom(system, P, measurement),
            last_observation: z,
        }
    }
}

impl VisualTracker for KalmanBoxTracker {
    fn update(&mut self, _frame: &Frame) -> Option<BBox> {
        let mut z = self
            .kalman_filter
            .predict()
            .fixed_rows::<4>(0)
            .clone_owned();
        // the aspect ratio is not part of the motion model.
        z[3] = self.last_observation[3];

        BBox::from_observation_vector(z)
    }

    fn observe(&mut self, bbox: BBox) {
        let z = bbox.to_observation_vector();
        self.kalman_filter.update(z);
        self.last_observation = z;
    }
}

#[cfg(test)]
mod tests {
    use image::GrayImage;

    use super::*;

    fn blank_frame() -> Frame {
        Frame::new(0, GrayImage::new(8, 8))
    }

    #[test]
    fn test_stationary_box_stays_in_place() {
        let bbox = BBox::new(10.0, 10.0, 20.0, 40.0);
        let mut tracker = KalmanBoxTracker::new(bbox);

        let predicted = tracker.update(&blank_frame()).unwrap();

        assert!(predicted.iou(&bbox) > 0.99);
    }

    #[test]
    fn test_observed_motion_is_extrapolated() {
        let mut tracker = KalmanBoxTracker::new(BBox::new(0.0, 0.0, 10.0, 10.0));
        let frame = blank_frame();

        for step in 1..=10 {
            tracker.update(&frame);
            tracker.observe(BBox::new(step as f64 * 5.0, 0.0, 10.0, 10.0));
        }
        let predicted = tracker.update(&frame).unwrap();

        assert!(predicted.x > 45.0, "prediction {predicted:?} did not move ahead");
    }

    #[test]
    fn test_collapsing_box_reports_failure() {
        let mut tracker = KalmanBoxTracker::new(BBox::new(0.0, 0.0, 10.0, 10.0));
        let frame = blank_frame();

        tracker.update(&frame);
        tracker.observe(BBox::new(4.5, 4.5, 1.0, 1.0));

        // the learned area velocity drives the next prediction below zero
        assert!(tracker.update(&frame).is_none());
    }
}
