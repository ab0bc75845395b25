use std::collections::BTreeSet;

use itertools::{Itertools, iproduct};
use pathfinding::prelude::{Matrix, kuhn_munkres_min};

use crate::bbox::BBox;

// used to convert iou scores to integers since the weight
// matrix of the hungarian algorithm only accepts integers.
const IOU_MULTIPLIER: f64 = 1_000_000.0;

/// Outcome of associating one detection batch with the current tracks.
///
/// Every track index and every detection index appears exactly once: either
/// in a matched pair or in its unmatched set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Association {
    /// `(track_index, detection_index)` pairs.
    pub matched: Vec<(usize, usize)>,
    pub unmatched_tracks: BTreeSet<usize>,
    pub unmatched_detections: BTreeSet<usize>,
}

/// Associates the given detection boxes to the given track boxes.
///
/// ## Args
///  - track_bboxes: Predicted boxes of the tracks available for association.
///  - detection_bboxes: Boxes of the newest detection batch.
///  - iou_threshold: The minimum iou score needed for a valid association.
pub fn associate(
    track_bboxes: &[BBox],
    detection_bboxes: &[BBox],
    iou_threshold: f64,
) -> Association {
    let iou_matrix = calc_iou_matrix(track_bboxes, detection_bboxes);
    let candidates = solve_assignment(&iou_matrix);

    filter_matches(&iou_matrix, &candidates, iou_threshold)
}

/// Builds the `tracks x detections` similarity matrix.
pub fn calc_iou_matrix(track_bboxes: &[BBox], detection_bboxes: &[BBox]) -> Matrix<f64> {
    let mut matrix = Matrix::new(track_bboxes.len(), detection_bboxes.len(), 0.0);

    for ((i, track_bbox), (j, detection_bbox)) in iproduct!(
        track_bboxes.iter().enumerate(),
        detection_bboxes.iter().enumerate()
    ) {
        matrix[(i, j)] = track_bbox.iou(detection_bbox);
    }

    matrix
}

/// Finds the one-to-one pairing with the largest total similarity.
///
/// Returns `min(rows, columns)` `(row, column)` pairs sorted by row.
pub fn solve_assignment(iou_matrix: &Matrix<f64>) -> Vec<(usize, usize)> {
    if iou_matrix.rows == 0 || iou_matrix.columns == 0 {
        return Vec::new();
    }

    let mut cost_matrix = Matrix::new(iou_matrix.rows, iou_matrix.columns, 0i64);
    for (i, j) in iproduct!(0..iou_matrix.rows, 0..iou_matrix.columns) {
        cost_matrix[(i, j)] = -(iou_matrix[(i, j)] * IOU_MULTIPLIER).round() as i64;
    }

    // kuhn_munkres needs at least as many columns as rows.
    let transpose = cost_matrix.rows > cost_matrix.columns;
    let weights = if transpose {
        cost_matrix.transposed()
    } else {
        cost_matrix
    };
    let assignment_vector = kuhn_munkres_min(&weights).1;

    assignment_vector
        .into_iter()
        .enumerate()
        .map(|(i, j)| if transpose { (j, i) } else { (i, j) })
        .sorted()
        .collect()
}

/// Rejects candidate pairs whose similarity is below `iou_threshold` and
/// partitions the remaining indices.
pub fn filter_matches(
    iou_matrix: &Matrix<f64>,
    candidates: &[(usize, usize)],
    iou_threshold: f64,
) -> Association {
    let mut unmatched_tracks: BTreeSet<usize> = (0..iou_matrix.rows).collect();
    let mut unmatched_detections: BTreeSet<usize> = (0..iou_matrix.columns).collect();
    let mut matched = Vec::with_capacity(candidates.len());

    for &(track_index, detection_index) in candidates {
        if iou_matrix[(track_index, detection_index)] < iou_threshold {
            continue;
        }
        unmatched_tracks.remove(&track_index);
        unmatched_detections.remove(&detection_index);
        matched.push((track_index, detection_index));
    }

    Association {
        matched,
        unmatched_tracks,
        unmatched_detections,
    }
}
