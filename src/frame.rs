use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use image::{GrayImage, imageops::FilterType};
use itertools::Itertools;

use crate::{
    bbox::BBox,
    error::{Error, Result},
};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// One luma raster of the video stream.
#[derive(Clone, Debug)]
pub struct Frame {
    index: u64,
    image: GrayImage,
}

impl Frame {
    pub fn new(index: u64, image: GrayImage) -> Self {
        Self { index, image }
    }

    /// Wraps a row-major 8-bit luma buffer.
    pub fn from_luma(index: u64, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        let actual = data.len();
        let image = GrayImage::from_raw(width, height, data)
            .ok_or(Error::FrameSize { expected, actual })?;

        Ok(Self::new(index, image))
    }

    pub fn open(index: u64, path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path)?.to_luma8();

        Ok(Self::new(index, image))
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Resized copy of the frame, borrowed as-is when `factor` is 1.
    pub fn scaled(&self, factor: f64) -> Cow<'_, Frame> {
        if factor == 1.0 {
            return Cow::Borrowed(self);
        }
        let width = ((self.width() as f64 * factor).round() as u32).max(1);
        let height = ((self.height() as f64 * factor).round() as u32).max(1);
        let image = image::imageops::resize(&self.image, width, height, FilterType::Triangle);

        Cow::Owned(Self::new(self.index, image))
    }

    /// Integer pixel rectangle `(x, y, width, height)` covered by `bbox`
    /// inside this frame, or `None` when nothing is left after clipping.
    pub fn pixel_rect(&self, bbox: &BBox) -> Option<(u32, u32, u32, u32)> {
        let clipped = bbox.clip(self.width() as f64, self.height() as f64);
        let x_1 = clipped.x.round() as u32;
        let y_1 = clipped.y.round() as u32;
        let x_2 = (clipped.x_2().round() as u32).min(self.width());
        let y_2 = (clipped.y_2().round() as u32).min(self.height());

        if x_2 <= x_1 || y_2 <= y_1 {
            return None;
        }

        Some((x_1, y_1, x_2 - x_1, y_2 - y_1))
    }
}

/// Image-sequence directory read frame by frame in file name order.
pub struct FrameSource {
    paths: std::vec::IntoIter<PathBuf>,
    next_index: u64,
}

impl FrameSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map_ok(|entry| entry.path())
            .filter_ok(|path| is_image(path))
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .sorted()
            .collect();

        if paths.is_empty() {
            return Err(Error::EmptyFrameSource(dir.to_path_buf()));
        }

        Ok(Self {
            paths: paths.into_iter(),
            next_index: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.len() == 0
    }
}

impl Iterator for FrameSource {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        let index = self.next_index;
        self.next_index += 1;

        Some(Frame::open(index, path))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
