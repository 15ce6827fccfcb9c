//! Coordinate geometry: content-mode placement and the normalized→pixel map.
//!
//! The normalized space is the unit square with a bottom-left origin,
//! independent of the source image's aspect ratio. Pixel space has a top-left
//! origin, so the Y axis flips during mapping while X does not. That asymmetry
//! is the whole point of this module; treating both axes the same way is the
//! classic bug here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in the detector's normalized space: [0,1]×[0,1], origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in normalized space; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// A point in display pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of a source image or container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A rectangle in display pixel space; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two arbitrary corner points.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn is_degenerate(&self) -> bool {
        self.size().is_degenerate()
    }

    /// True when `point` lies inside or on the rectangle's edges.
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

/// Placement policy for an image within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Fill the container exactly; aspect ratio may distort.
    Stretch,
    /// Largest aspect-preserving size contained by the bounds; may letterbox.
    Fit,
    /// Smallest aspect-preserving size covering the bounds; may overflow.
    Fill,
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentMode::Stretch => "stretch",
            ContentMode::Fit => "fit",
            ContentMode::Fill => "fill",
        };
        f.write_str(name)
    }
}

impl FromStr for ContentMode {
    type Err = ParseContentModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stretch" => Ok(ContentMode::Stretch),
            "fit" => Ok(ContentMode::Fit),
            "fill" => Ok(ContentMode::Fill),
            _ => Err(ParseContentModeError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown content mode: {0:?} (expected stretch, fit or fill)")]
pub struct ParseContentModeError(String);

/// A display surface: pixel bounds plus its content-fit policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerGeometry {
    pub bounds: PixelRect,
    pub mode: ContentMode,
}

impl ContainerGeometry {
    pub fn new(bounds: PixelRect, mode: ContentMode) -> Self {
        Self { bounds, mode }
    }

    /// Pixel sub-rectangle of the container actually covered by image content.
    ///
    /// `Fit` letterboxes, `Fill` overflows on one axis (the placement rect is
    /// returned as-is, nothing is cropped), `Stretch` is the bounds verbatim.
    /// A zero-area container or image yields `None`.
    pub fn visible_rect(&self, image: PixelSize) -> Option<PixelRect> {
        if self.bounds.is_degenerate() || image.is_degenerate() {
            return None;
        }
        let rect = match self.mode {
            ContentMode::Stretch => self.bounds,
            ContentMode::Fit => place_scaled(&self.bounds, image, f64::min),
            ContentMode::Fill => place_scaled(&self.bounds, image, f64::max),
        };
        Some(rect)
    }
}

/// Scale `image` by the axis factor `pick` selects, then center the result in
/// `bounds`. `f64::min` contains, `f64::max` covers.
fn place_scaled(bounds: &PixelRect, image: PixelSize, pick: fn(f64, f64) -> f64) -> PixelRect {
    let scale = pick(bounds.width / image.width, bounds.height / image.height);
    let width = image.width * scale;
    let height = image.height * scale;
    PixelRect::new(
        bounds.x + (bounds.width - width) * 0.5,
        bounds.y + (bounds.height - height) * 0.5,
        width,
        height,
    )
}

/// Map a normalized point into `rect`.
///
/// X scales directly. Y flips: normalized 0 is the image bottom, which in
/// pixel space is the rect's maximum Y.
pub fn to_pixel_space(point: NormalizedPoint, rect: &PixelRect) -> PixelPoint {
    PixelPoint {
        x: rect.min_x() + point.x * rect.width,
        y: rect.min_y() + (1.0 - point.y) * rect.height,
    }
}

/// Inverse of [`to_pixel_space`]. `rect` must be non-degenerate.
pub fn from_pixel_space(point: PixelPoint, rect: &PixelRect) -> NormalizedPoint {
    NormalizedPoint {
        x: (point.x - rect.min_x()) / rect.width,
        y: 1.0 - (point.y - rect.min_y()) / rect.height,
    }
}

/// Map a normalized rectangle into `rect` by mapping its two extreme corners
/// independently and rebuilding the result.
///
/// Width and height cannot be scale-and-translated in place: Y flips while X
/// does not, so the bottom-left normalized corner lands *below* the top-right
/// one in pixel space.
pub fn rect_to_pixel_space(r: NormalizedRect, rect: &PixelRect) -> PixelRect {
    let a = to_pixel_space(NormalizedPoint::new(r.x, r.y), rect);
    let b = to_pixel_space(NormalizedPoint::new(r.x + r.width, r.y + r.height), rect);
    PixelRect::from_corners(a, b)
}
