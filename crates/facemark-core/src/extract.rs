//! Region extraction: observation + requested regions + visible rect → pixel
//! space result entities.
//!
//! Pure functions. The same observation, request and geometry always produce
//! bit-identical output.

use crate::geometry::{rect_to_pixel_space, to_pixel_space, PixelPoint, PixelRect};
use crate::observation::{FaceObservation, HandObservation};
use crate::region::{FaceRegion, HandJoint};
use serde::{Deserialize, Serialize};

/// Pixel-space result for one face observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoints {
    pub bounding_box: Option<PixelRect>,
    /// One slot per requested region, in request order. `None` marks a region
    /// the detector did not localize for this face — distinct from an empty
    /// point list.
    pub landmarks: Vec<Option<Vec<PixelPoint>>>,
}

/// A mapped hand joint: pixel position plus the detector's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPoint {
    pub position: PixelPoint,
    pub confidence: f64,
}

/// Pixel-space result for one hand observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPoints {
    pub bounding_box: Option<PixelRect>,
    /// One slot per requested joint, in request order; `None` for joints the
    /// detector did not localize.
    pub joints: Vec<Option<JointPoint>>,
}

/// Map one face observation's requested regions into `visible` pixel space.
pub fn face_feature_points(
    observation: &FaceObservation,
    regions: &[FaceRegion],
    visible: &PixelRect,
) -> FeaturePoints {
    // allPoints already enumerates the union of the named regions; requesting
    // it collapses the set so nothing is emitted twice.
    let collapsed: &[FaceRegion] = if regions.contains(&FaceRegion::AllPoints) {
        &[FaceRegion::AllPoints]
    } else {
        regions
    };

    let landmarks = collapsed
        .iter()
        .map(|&region| {
            observation.region_points(region).map(|points| {
                points
                    .iter()
                    .map(|&p| to_pixel_space(p, visible))
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        requested = regions.len(),
        mapped = landmarks.iter().filter(|slot| slot.is_some()).count(),
        "mapped face observation"
    );

    FeaturePoints {
        bounding_box: Some(rect_to_pixel_space(observation.bounding_box, visible)),
        landmarks,
    }
}

/// Map one hand observation's requested joints into `visible` pixel space.
pub fn hand_joint_points(
    observation: &HandObservation,
    joints: &[HandJoint],
    visible: &PixelRect,
) -> HandPoints {
    let joints = joints
        .iter()
        .map(|&joint| {
            observation.joint(joint).map(|j| JointPoint {
                position: to_pixel_space(j.position, visible),
                confidence: j.confidence,
            })
        })
        .collect::<Vec<_>>();

    HandPoints {
        bounding_box: Some(rect_to_pixel_space(observation.bounding_box, visible)),
        joints,
    }
}
