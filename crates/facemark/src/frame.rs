//! Video-frame intake — capture buffers, orientation, uniform rescale.

use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, GrayImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("frame dimensions are zero")]
    ZeroDimensions,
    #[error("frame buffer is smaller than {width}×{height}")]
    ShortBuffer { width: u32, height: u32 },
}

/// A captured grayscale video frame.
#[derive(Clone)]
pub struct VideoFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl VideoFrame {
    /// Wrap a row-major grayscale buffer of `width * height` bytes.
    pub fn from_luma(mut data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimensions);
        }
        let expected = (width * height) as usize;
        if data.len() < expected {
            return Err(FrameError::ShortBuffer { width, height });
        }
        data.truncate(expected);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Convert packed YUYV (4:2:2) to grayscale by extracting the Y channel.
    ///
    /// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]. Grayscale = every
    /// even-indexed byte.
    pub fn from_yuyv(yuyv: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimensions);
        }
        let expected = (width * height * 2) as usize;
        if yuyv.len() < expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: yuyv.len(),
            });
        }
        let data = yuyv[..expected].iter().step_by(2).copied().collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode into an orientation-corrected image.
    pub fn oriented(&self, orientation: Orientation) -> Result<DynamicImage, FrameError> {
        let gray = GrayImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            FrameError::ShortBuffer {
                width: self.width,
                height: self.height,
            },
        )?;
        let mut image = DynamicImage::ImageLuma8(gray);
        image.apply_orientation(orientation);
        Ok(image)
    }
}

/// Uniform rescale anchor: pin one dimension, scale the other to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeMark {
    Width(u32),
    Height(u32),
}

impl SizeMark {
    /// Scaled dimensions for a `width`×`height` source.
    pub fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            SizeMark::Width(w) => {
                let scale = w as f64 / width as f64;
                (w, (height as f64 * scale).round() as u32)
            }
            SizeMark::Height(h) => {
                let scale = h as f64 / height as f64;
                ((width as f64 * scale).round() as u32, h)
            }
        }
    }

    /// Rescale `image` uniformly. The result never collapses to a zero
    /// dimension even for extreme aspect ratios.
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = self.scaled_dimensions(image.width(), image.height());
        image.resize_exact(
            width.max(1),
            height.max(1),
            image::imageops::FilterType::Triangle,
        )
    }
}
