//! Toolkit-independent overlay marker bookkeeping.
//!
//! A rendering binding consumes [`Marker`] descriptors; nothing here touches a
//! drawing API. The store swaps a surface's whole marker set at once, so a
//! reader never observes a mix of old and new markers.

use crate::geometry::{PixelPoint, PixelRect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle identifying one target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// RGBA stroke color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const GREEN: Color = Color {
        r: 0,
        g: 255,
        b: 0,
        a: 255,
    };

    pub const RED: Color = Color {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Geometry of one overlay primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    /// Stroked rectangle around a detected subject.
    Box { rect: PixelRect },
    /// Dot centered on a single landmark point.
    Dot { center: PixelPoint, diameter: f64 },
}

/// One overlay primitive, ready for a rendering binding to consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub shape: MarkerShape,
    pub stroke_width: f64,
    pub color: Color,
}

/// Marker sets keyed by surface.
#[derive(Debug, Default)]
pub struct OverlayStore {
    markers: HashMap<SurfaceId, Vec<Marker>>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `surface` with an empty marker set, dropping any previous set.
    pub fn bind(&mut self, surface: SurfaceId) {
        self.markers.insert(surface, Vec::new());
    }

    /// Swap in `markers` as the surface's entire set.
    pub fn replace(&mut self, surface: SurfaceId, markers: Vec<Marker>) {
        self.markers.insert(surface, markers);
    }

    /// Equivalent to replacing with an empty set.
    pub fn clear(&mut self, surface: SurfaceId) {
        self.replace(surface, Vec::new());
    }

    /// Drop the surface's entry entirely.
    pub fn remove(&mut self, surface: SurfaceId) {
        self.markers.remove(&surface);
    }

    /// Snapshot of the surface's current markers; empty for unknown surfaces.
    pub fn markers(&self, surface: SurfaceId) -> Vec<Marker> {
        self.markers.get(&surface).cloned().unwrap_or_default()
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.markers.contains_key(&surface)
    }
}
