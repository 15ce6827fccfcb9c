//! Observation model: one detected subject's geometry as the detector emits it.
//!
//! All coordinates are normalized to the image unit square (bottom-left
//! origin). A region or joint missing from the map was not localized for this
//! particular subject; that is ordinary detector output, not an error.

use crate::geometry::{NormalizedPoint, NormalizedRect};
use crate::region::{FaceRegion, HandJoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One detected face: normalized bounding box plus whichever landmark regions
/// the detector localized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_box: NormalizedRect,
    #[serde(default)]
    pub landmarks: BTreeMap<FaceRegion, Vec<NormalizedPoint>>,
}

impl FaceObservation {
    pub fn new(bounding_box: NormalizedRect) -> Self {
        Self {
            bounding_box,
            landmarks: BTreeMap::new(),
        }
    }

    /// Builder-style region insertion, mainly for detector backends and tests.
    pub fn with_region(mut self, region: FaceRegion, points: Vec<NormalizedPoint>) -> Self {
        self.landmarks.insert(region, points);
        self
    }

    /// Raw points for `region`, or `None` if it was not localized.
    pub fn region_points(&self, region: FaceRegion) -> Option<&[NormalizedPoint]> {
        self.landmarks.get(&region).map(Vec::as_slice)
    }
}

/// A hand joint position with the detector's confidence for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJoint {
    pub position: NormalizedPoint,
    pub confidence: f64,
}

/// One detected hand: normalized bounding box plus localized joints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    pub bounding_box: NormalizedRect,
    #[serde(default)]
    pub joints: BTreeMap<HandJoint, NormalizedJoint>,
}

impl HandObservation {
    pub fn new(bounding_box: NormalizedRect) -> Self {
        Self {
            bounding_box,
            joints: BTreeMap::new(),
        }
    }

    pub fn with_joint(mut self, joint: HandJoint, position: NormalizedPoint, confidence: f64) -> Self {
        self.joints.insert(
            joint,
            NormalizedJoint {
                position,
                confidence,
            },
        );
        self
    }

    pub fn joint(&self, joint: HandJoint) -> Option<NormalizedJoint> {
        self.joints.get(&joint).copied()
    }
}
