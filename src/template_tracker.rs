use image::{GrayImage, imageops::crop_imm};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

use crate::{bbox::BBox, frame::Frame, visual_tracker::VisualTracker};

// templates with less gray-level deviation than this are treated as textureless
const FLAT_STD_DEV: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub struct TemplateParams {
    /// Fraction of the box size added on every side to form the search window.
    pub search_padding: f64,
    /// Lowest zero-mean normalized correlation accepted as a successful match.
    pub min_score: f32,
    /// Weight of the newly matched patch when the template is refreshed.
    pub learning_rate: f32,
    /// Largest RMS gray-level difference accepted when the template has no texture.
    pub flat_tolerance: f32,
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self {
            search_padding: 0.5,
            min_score: 0.5,
            learning_rate: 0.125,
            flat_tolerance: 8.0,
        }
    }
}

/// Appearance tracker that searches for its template around the last known box.
///
/// The box keeps the size it was initialized with.
pub struct TemplateTracker {
    template: Option<GrayImage>,
    bbox: BBox,
    // position of the template's top-left corner relative to the box; non-zero
    // when the box was clipped by the frame border at initialization.
    offset: (f64, f64),
    params: TemplateParams,
}

impl TemplateTracker {
    pub fn new(frame: &Frame, bbox: BBox, params: TemplateParams) -> Self {
        let (template, offset) = match frame.pixel_rect(&bbox) {
            Some((x, y, w, h)) => (
                Some(crop_imm(frame.image(), x, y, w, h).to_image()),
                (x as f64 - bbox.x, y as f64 - bbox.y),
            ),
            None => (None, (0.0, 0.0)),
        };

        Self {
            template,
            bbox,
            offset,
            params,
        }
    }

    fn search(&self, frame: &Frame) -> Option<((u32, u32), GrayImage)> {
        let template = self.template.as_ref()?;
        let (tw, th) = template.dimensions();
        let (sx, sy, sw, sh) = frame.pixel_rect(&self.bbox.pad(self.params.search_padding))?;
        if sw < tw || sh < th {
            return None;
        }

        let window = crop_imm(frame.image(), sx, sy, sw, sh).to_image();
        // textureless templates are located and judged by squared difference
        let flat = std_dev(template) < FLAT_STD_DEV;
        let (dx, dy) = if flat {
            let scores = match_template(&window, template, MatchTemplateMethod::SumOfSquaredErrors);
            find_extremes(&scores).min_value_location
        } else {
            let scores = match_template(
                &window,
                template,
                MatchTemplateMethod::CrossCorrelationNormalized,
            );
            find_extremes(&scores).max_value_location
        };
        let patch = crop_imm(&window, dx, dy, tw, th).to_image();

        let accepted = if flat {
            rms_difference(&patch, template) <= self.params.flat_tolerance
        } else {
            zero_mean_correlation(&patch, template) >= self.params.min_score
        };
        if !accepted {
            return None;
        }

        Some(((sx + dx, sy + dy), patch))
    }
}

impl VisualTracker for TemplateTracker {
    fn update(&mut self, frame: &Frame) -> Option<BBox> {
        let ((x, y), patch) = self.search(frame)?;

        if let Some(template) = self.template.as_mut() {
            blend(template, &patch, self.params.learning_rate);
        }
        self.bbox = BBox::new(
            x as f64 - self.offset.0,
            y as f64 - self.offset.1,
            self.bbox.width,
            self.bbox.height,
        );

        Some(self.bbox)
    }
}

fn mean(image: &GrayImage) -> f32 {
    let n = (image.width() * image.height()) as f32;
    if n == 0.0 {
        return 0.0;
    }
    image.pixels().map(|p| p.0[0] as f32).sum::<f32>() / n
}

fn std_dev(image: &GrayImage) -> f32 {
    let n = (image.width() * image.height()) as f32;
    if n == 0.0 {
        return 0.0;
    }
    let mean = mean(image);
    let var = image
        .pixels()
        .map(|p| (p.0[0] as f32 - mean).powi(2))
        .sum::<f32>()
        / n;

    var.sqrt()
}

/// Root mean square of the pixel-wise difference of two equally sized patches.
fn rms_difference(a: &GrayImage, b: &GrayImage) -> f32 {
    let n = (a.width() * a.height()) as f32;
    if n == 0.0 {
        return f32::INFINITY;
    }
    let sum = a
        .pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| (pa.0[0] as f32 - pb.0[0] as f32).powi(2))
        .sum::<f32>();

    (sum / n).sqrt()
}

/// Pearson correlation of two equally sized patches, 0 when either is flat.
fn zero_mean_correlation(a: &GrayImage, b: &GrayImage) -> f32 {
    let n = (a.width() * a.height()) as f32;
    if n == 0.0 {
        return 0.0;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);

    let (mut cov, mut var_a, mut var_b) = (0.0f32, 0.0f32, 0.0f32);
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let da = pa.0[0] as f32 - mean_a;
        let db = pb.0[0] as f32 - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }

    cov / denom
}

fn blend(template: &mut GrayImage, patch: &GrayImage, learning_rate: f32) {
    for (t, p) in template.pixels_mut().zip(patch.pixels()) {
        let value = (1.0 - learning_rate) * t.0[0] as f32 + learning_rate * p.0[0] as f32;
        t.0[0] = value.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    fn frame_with_object(index: u64, x: u32, y: u32) -> Frame {
        let mut image = GrayImage::new(100, 100);
        for dy in 0..20 {
            for dx in 0..20 {
                let value = ((dx * 7 + dy * 13) % 200 + 50) as u8;
                image.put_pixel(x + dx, y + dy, Luma([value]));
            }
        }
        Frame::new(index, image)
    }

    #[test]
    fn test_follows_moving_object() {
        let first = frame_with_object(0, 20, 20);
        let mut tracker = TemplateTracker::new(
            &first,
            BBox::new(20.0, 20.0, 20.0, 20.0),
            TemplateParams::default(),
        );

        let bbox = tracker.update(&frame_with_object(1, 26, 23)).unwrap();
        assert_eq!(bbox, BBox::new(26.0, 23.0, 20.0, 20.0));

        let bbox = tracker.update(&frame_with_object(2, 30, 27)).unwrap();
        assert_eq!(bbox, BBox::new(30.0, 27.0, 20.0, 20.0));
    }

    fn frame_with_flat_object(index: u64, x: u32, y: u32) -> Frame {
        let mut image = GrayImage::new(96, 64);
        for dy in 0..16 {
            for dx in 0..16 {
                image.put_pixel(x + dx, y + dy, Luma([200]));
            }
        }
        Frame::new(index, image)
    }

    #[test]
    fn test_follows_object_without_texture() {
        let first = frame_with_flat_object(0, 20, 20);
        let mut tracker = TemplateTracker::new(
            &first,
            BBox::new(20.0, 20.0, 16.0, 16.0),
            TemplateParams::default(),
        );

        let bbox = tracker.update(&first).unwrap();
        assert_eq!(bbox, BBox::new(20.0, 20.0, 16.0, 16.0));

        let bbox = tracker.update(&frame_with_flat_object(1, 24, 18)).unwrap();
        assert_eq!(bbox, BBox::new(24.0, 18.0, 16.0, 16.0));
    }

    #[test]
    fn test_object_without_texture_can_still_be_lost() {
        let first = frame_with_flat_object(0, 20, 20);
        let mut tracker = TemplateTracker::new(
            &first,
            BBox::new(20.0, 20.0, 16.0, 16.0),
            TemplateParams::default(),
        );

        assert!(tracker.update(&Frame::new(1, GrayImage::new(96, 64))).is_none());
    }

    #[test]
    fn test_reports_failure_when_object_disappears() {
        let first = frame_with_object(0, 20, 20);
        let mut tracker = TemplateTracker::new(
            &first,
            BBox::new(20.0, 20.0, 20.0, 20.0),
            TemplateParams::default(),
        );

        let blank = Frame::new(1, GrayImage::new(100, 100));
        assert!(tracker.update(&blank).is_none());
    }

    #[test]
    fn test_box_outside_frame_never_tracks() {
        let first = frame_with_object(0, 20, 20);
        let mut tracker = TemplateTracker::new(
            &first,
            BBox::new(150.0, 150.0, 20.0, 20.0),
            TemplateParams::default(),
        );

        assert!(tracker.update(&first).is_none());
    }

    #[test]
    fn test_zero_mean_correlation_of_flat_patch_is_zero() {
        let flat = GrayImage::from_pixel(5, 5, Luma([9]));
        let textured = GrayImage::from_fn(5, 5, |x, y| Luma([(x * 40 + y) as u8]));

        assert_eq!(zero_mean_correlation(&flat, &textured), 0.0);
        assert!((zero_mean_correlation(&textured, &textured) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_flatness_measures() {
        let flat = GrayImage::from_pixel(4, 4, Luma([100]));
        let brighter = GrayImage::from_pixel(4, 4, Luma([103]));
        let striped = GrayImage::from_fn(4, 4, |x, _| Luma([(x * 50) as u8]));

        assert_eq!(std_dev(&flat), 0.0);
        assert!(std_dev(&striped) > FLAT_STD_DEV);
        assert!((rms_difference(&flat, &brighter) - 3.0).abs() < 1e-5);
    }
}
