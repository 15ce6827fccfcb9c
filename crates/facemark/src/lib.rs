//! facemark — Landmark detection orchestration and overlay mapping.
//!
//! Binds a display surface, runs an external [`LandmarkDetector`] off the
//! calling thread, and maps its normalized observations into the surface's
//! pixel space via `facemark-core`. One [`Session`] owns one surface and its
//! overlay markers; create additional sessions to work several surfaces at
//! once.

pub mod config;
pub mod frame;
pub mod session;

pub use config::SessionConfig;
pub use frame::{FrameError, SizeMark, VideoFrame};
pub use session::{DetectError, DrawOptions, Session, Surface};

pub use facemark_core::{
    face_feature_points, hand_joint_points, Color, ContainerGeometry, ContentMode, DetectOptions,
    DetectorError, FaceObservation, FaceRegion, FeaturePoints, HandJoint, HandObservation,
    HandPoints, JointPoint, LandmarkDetector, Marker, MarkerShape, NormalizedJoint,
    NormalizedPoint, NormalizedRect, OverlayStore, PixelPoint, PixelRect, PixelSize, SurfaceId,
};

use std::sync::OnceLock;

static SHARED: OnceLock<Session> = OnceLock::new();

/// Install a process-wide default session.
///
/// A convenience for simple callers with a single surface; explicit
/// [`Session`] construction remains the primary path. If a default session is
/// already installed the argument is dropped and the existing one is returned.
pub fn install_shared(session: Session) -> &'static Session {
    SHARED.get_or_init(|| session)
}

/// The process-wide default session, if one has been installed.
pub fn shared() -> Option<&'static Session> {
    SHARED.get()
}
