use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates, anchored at its top-left corner.
#[derive(Clone, Copy, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        if width < 0.0 || height < 0.0 {
            return BBox {
                x,
                y,
                width: 0.0,
                height: 0.0,
            };
        }
        BBox {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(x_1: f64, y_1: f64, x_2: f64, y_2: f64) -> Self {
        Self::new(x_1, y_1, x_2 - x_1, y_2 - y_1)
    }

    /// Inverse of [`BBox::to_observation_vector`]. Returns `None` when the
    /// area or aspect ratio is not positive.
    pub fn from_observation_vector(z: SVector<f64, 4>) -> Option<Self> {
        if !(z[2] > 0.0 && z[3] > 0.0) || !z.iter().all(|v| v.is_finite()) {
            return None;
        }
        let w = (z[2] * z[3]).sqrt();
        let h = z[2] / w;

        Some(Self::new(z[0] - w / 2.0, z[1] - h / 2.0, w, h))
    }

    /// `(cx, cy, area, width / height)`, the measurement space of the box motion model.
    pub fn to_observation_vector(&self) -> SVector<f64, 4> {
        let (cx, cy) = self.center();
        let r = self.width / (self.height + f64::EPSILON);

        SVector::<f64, 4>::new(cx, cy, self.area(), r)
    }

    pub fn x_2(&self) -> f64 {
        self.x + self.width
    }

    pub fn y_2(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        (self.width * self.height).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn iou(&self, other: &Self) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let iwidth = (self.x_2().min(other.x_2()) - self.x.max(other.x)).max(0.0);
        let iheight = (self.y_2().min(other.y_2()) - self.y.max(other.y)).max(0.0);
        let iarea = iwidth * iheight;

        let union = self.area() + other.area() - iarea;

        if union <= 0.0 {
            return 0.0;
        }

        (iarea / union).clamp(0.0, 1.0)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Grows the box by `padding` times its size on every side.
    pub fn pad(&self, padding: f64) -> Self {
        let dx = self.width * padding;
        let dy = self.height * padding;
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// Intersection with the `[0, width) x [0, height)` raster.
    pub fn clip(&self, width: f64, height: f64) -> Self {
        let x_1 = self.x.clamp(0.0, width);
        let y_1 = self.y.clamp(0.0, height);
        let x_2 = self.x_2().clamp(0.0, width);
        let y_2 = self.y_2().clamp(0.0, height);

        Self::from_corners(x_1, y_1, x_2, y_2)
    }
}
