//! facemark-core — Normalized-to-pixel geometry mapping and landmark region
//! extraction.
//!
//! The detector emits observations in a unit-square coordinate space with a
//! bottom-left origin; display surfaces use a top-left origin and place the
//! image per a content mode. This crate reconciles the two. Everything here is
//! pure and freely callable from any thread; async orchestration lives in the
//! `facemark` crate.

pub mod detector;
pub mod extract;
pub mod geometry;
pub mod observation;
pub mod overlay;
pub mod region;

pub use detector::{DetectOptions, DetectorError, LandmarkDetector};
pub use extract::{face_feature_points, hand_joint_points, FeaturePoints, HandPoints, JointPoint};
pub use geometry::{
    from_pixel_space, rect_to_pixel_space, to_pixel_space, ContainerGeometry, ContentMode,
    NormalizedPoint, NormalizedRect, PixelPoint, PixelRect, PixelSize,
};
pub use observation::{FaceObservation, HandObservation, NormalizedJoint};
pub use overlay::{Color, Marker, MarkerShape, OverlayStore, SurfaceId};
pub use region::{FaceRegion, HandJoint};
