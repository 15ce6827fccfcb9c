//! The consumed detection seam.
//!
//! Inference is someone else's job: a backend implements [`LandmarkDetector`]
//! over a decoded image and hands back normalized observations. The
//! orchestrator in the `facemark` crate owns threading, so implementations can
//! be plain synchronous code.

use crate::observation::{FaceObservation, HandObservation};
use image::DynamicImage;
use thiserror::Error;

/// Default upper bound on hands reported per pass.
pub const DEFAULT_MAX_HANDS: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detector backend: {0}")]
    Backend(String),
}

/// Tuning passed through to the detector backend.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Upper bound on hands reported per pass.
    pub max_hands: usize,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            max_hands: DEFAULT_MAX_HANDS,
        }
    }
}

/// Pluggable landmark detection backend.
///
/// `Ok(None)` means the backend produced no result container at all, which is
/// distinct from `Ok(Some(vec![]))` — a result set with zero observations.
/// Both are legal returns; the orchestrator turns them into typed failures
/// where an observation was required.
pub trait LandmarkDetector: Send + Sync {
    /// Detect faces and their landmark regions in `image`.
    fn detect_faces(
        &self,
        image: &DynamicImage,
        options: &DetectOptions,
    ) -> Result<Option<Vec<FaceObservation>>, DetectorError>;

    /// Detect hands and their joints in `image`, reporting at most
    /// `options.max_hands` observations.
    fn detect_hands(
        &self,
        image: &DynamicImage,
        options: &DetectOptions,
    ) -> Result<Option<Vec<HandObservation>>, DetectorError>;
}
