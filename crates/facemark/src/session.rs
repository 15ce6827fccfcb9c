//! Detection orchestration: the bound-surface session state machine.
//!
//! A session moves `Unbound → Bound(idle) → Detecting → Bound(idle)` and never
//! queues: a second detect while one is in flight fails immediately with
//! [`DetectError::Busy`]. The detector runs on the blocking pool — the single
//! suspension point — while geometry mapping, extraction and overlay mutation
//! stay synchronous under the session lock.

use crate::config::SessionConfig;
use crate::frame::{SizeMark, VideoFrame};
use facemark_core::{
    face_feature_points, hand_joint_points, Color, ContainerGeometry, DetectOptions,
    DetectorError, FaceObservation, FaceRegion, FeaturePoints, HandJoint, HandObservation,
    HandPoints, LandmarkDetector, Marker, MarkerShape, OverlayStore, PixelRect, PixelSize,
    SurfaceId,
};
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("no target surface bound")]
    NotBound,
    #[error("a surface is already bound; unbind it first")]
    AlreadyBound,
    #[error("a detection pass is already in flight")]
    Busy,
    #[error("source image is missing or unreadable")]
    NoImage,
    #[error("detector returned zero observations")]
    EmptyResult,
    #[error("detector returned no result set")]
    NullResult,
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("detection worker failed: {0}")]
    Worker(String),
}

/// A target surface: identity plus display geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub geometry: ContainerGeometry,
}

impl Surface {
    pub fn new(id: SurfaceId, geometry: ContainerGeometry) -> Self {
        Self { id, geometry }
    }
}

/// Marker styling for the detect-and-draw operations.
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    /// Draw the per-face bounding box.
    pub display_box: bool,
    pub line_width: f64,
    pub line_color: Color,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            display_box: true,
            line_width: 1.0,
            line_color: Color::GREEN,
        }
    }
}

struct Inner {
    surface: Option<Surface>,
    overlay: OverlayStore,
    /// Pass id of the in-flight detection, if any.
    current_pass: Option<u64>,
    next_pass: u64,
    /// Overlay epoch. Bumped by bind/unbind/clear; a completed pass whose
    /// snapshot is stale must not touch the overlay.
    generation: u64,
}

/// Geometry snapshot taken when a pass starts. Results are always mapped
/// through this snapshot, never through whatever the session looks like when
/// the detector eventually returns.
struct PassTicket {
    pass: u64,
    generation: u64,
    surface: Surface,
    visible: PixelRect,
}

/// One orchestration context, exclusively owning one bound surface and its
/// marker set.
///
/// Sessions are independent: create one per surface to detect on several
/// surfaces concurrently. A process-wide default lives behind
/// [`crate::install_shared`] as a convenience, never as the only path.
pub struct Session {
    detector: Arc<dyn LandmarkDetector>,
    config: SessionConfig,
    inner: Mutex<Inner>,
}

impl Session {
    pub fn new(detector: Arc<dyn LandmarkDetector>) -> Self {
        Self::with_config(detector, SessionConfig::default())
    }

    pub fn with_config(detector: Arc<dyn LandmarkDetector>, config: SessionConfig) -> Self {
        Self {
            detector,
            config,
            inner: Mutex::new(Inner {
                surface: None,
                overlay: OverlayStore::new(),
                current_pass: None,
                next_pass: 0,
                generation: 0,
            }),
        }
    }

    /// Bind a target surface, starting from an empty marker set.
    ///
    /// Fails with [`DetectError::AlreadyBound`] if any surface is bound;
    /// rebinding requires an explicit [`Session::unbind`] first.
    pub fn bind(&self, surface: Surface) -> Result<(), DetectError> {
        let mut inner = self.lock();
        if inner.surface.is_some() {
            return Err(DetectError::AlreadyBound);
        }
        inner.overlay.bind(surface.id);
        inner.surface = Some(surface);
        inner.current_pass = None;
        inner.generation += 1;
        tracing::info!(surface = surface.id.0, mode = %surface.geometry.mode, "surface bound");
        Ok(())
    }

    /// Unbind the current surface, clearing its markers.
    ///
    /// An in-flight pass is not cancelled; its eventual overlay write is
    /// dropped.
    pub fn unbind(&self) -> Result<(), DetectError> {
        let mut inner = self.lock();
        let surface = inner.surface.take().ok_or(DetectError::NotBound)?;
        inner.overlay.remove(surface.id);
        inner.current_pass = None;
        inner.generation += 1;
        tracing::info!(surface = surface.id.0, "surface unbound");
        Ok(())
    }

    /// Replace the bound surface's markers with an empty set.
    pub fn clear(&self) -> Result<(), DetectError> {
        let mut inner = self.lock();
        let surface = inner.surface.ok_or(DetectError::NotBound)?;
        inner.overlay.clear(surface.id);
        inner.generation += 1;
        Ok(())
    }

    /// Snapshot of the bound surface's markers. Empty when unbound.
    pub fn markers(&self) -> Vec<Marker> {
        let inner = self.lock();
        match inner.surface {
            Some(surface) => inner.overlay.markers(surface.id),
            None => Vec::new(),
        }
    }

    /// Draw options seeded from the session configuration.
    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            line_width: self.config.line_width,
            ..DrawOptions::default()
        }
    }

    /// Detect faces and map the requested landmark regions into the bound
    /// surface's pixel space.
    pub async fn face_landmarks(
        &self,
        image: DynamicImage,
        regions: &[FaceRegion],
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let source = image_size(&image);
        self.face_landmarks_at(image, source, regions).await
    }

    /// Detect faces, map them, and atomically redraw the bound surface's
    /// overlay markers. Prior markers survive a failed pass untouched.
    pub async fn face_landmarks_boxed(
        &self,
        image: DynamicImage,
        regions: &[FaceRegion],
        options: DrawOptions,
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let source = image_size(&image);
        self.face_landmarks_boxed_at(image, source, regions, options)
            .await
    }

    /// Number of detected faces: the same pipeline as [`Self::face_landmarks`]
    /// run with a degenerate region set. Zero is a valid count, not an error.
    pub async fn face_count(&self, image: DynamicImage) -> Result<usize, DetectError> {
        let source = image_size(&image);
        let (observations, ticket) = self.run_face_pass(image, source).await?;
        let mapped: Vec<FeaturePoints> = observations
            .iter()
            .map(|o| face_feature_points(o, &[], &ticket.visible))
            .collect();
        Ok(mapped.len())
    }

    /// Detect hands and map the requested joints into the bound surface's
    /// pixel space.
    pub async fn hand_joints(
        &self,
        image: DynamicImage,
        joints: &[HandJoint],
    ) -> Result<Vec<HandPoints>, DetectError> {
        let source = image_size(&image);
        self.hand_joints_at(image, source, joints).await
    }

    /// Number of detected hands, via the pipeline with an empty joint set.
    pub async fn hand_count(&self, image: DynamicImage) -> Result<usize, DetectError> {
        let source = image_size(&image);
        let (observations, ticket) = self.run_hand_pass(image, source).await?;
        let mapped: Vec<HandPoints> = observations
            .iter()
            .map(|o| hand_joint_points(o, &[], &ticket.visible))
            .collect();
        Ok(mapped.len())
    }

    /// Face detection over a live capture frame.
    ///
    /// The frame is orientation-corrected and optionally rescaled per
    /// `size_mark` before detection; the reported geometry always derives from
    /// the oriented source aspect and the bound surface, never from the scaled
    /// intermediate.
    pub async fn frame_face_landmarks(
        &self,
        frame: &VideoFrame,
        orientation: Orientation,
        size_mark: Option<SizeMark>,
        regions: &[FaceRegion],
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let (image, source) = self.prepare_frame(frame, orientation, size_mark)?;
        self.face_landmarks_at(image, source, regions).await
    }

    /// Frame variant of [`Self::face_landmarks_boxed`].
    pub async fn frame_face_landmarks_boxed(
        &self,
        frame: &VideoFrame,
        orientation: Orientation,
        size_mark: Option<SizeMark>,
        regions: &[FaceRegion],
        options: DrawOptions,
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let (image, source) = self.prepare_frame(frame, orientation, size_mark)?;
        self.face_landmarks_boxed_at(image, source, regions, options)
            .await
    }

    /// Hand detection over a live capture frame.
    pub async fn frame_hand_joints(
        &self,
        frame: &VideoFrame,
        orientation: Orientation,
        size_mark: Option<SizeMark>,
        joints: &[HandJoint],
    ) -> Result<Vec<HandPoints>, DetectError> {
        let (image, source) = self.prepare_frame(frame, orientation, size_mark)?;
        self.hand_joints_at(image, source, joints).await
    }

    async fn face_landmarks_at(
        &self,
        image: DynamicImage,
        source: PixelSize,
        regions: &[FaceRegion],
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let (observations, ticket) = self.run_face_pass(image, source).await?;
        if observations.is_empty() {
            return Err(DetectError::EmptyResult);
        }
        Ok(observations
            .iter()
            .map(|o| face_feature_points(o, regions, &ticket.visible))
            .collect())
    }

    async fn face_landmarks_boxed_at(
        &self,
        image: DynamicImage,
        source: PixelSize,
        regions: &[FaceRegion],
        options: DrawOptions,
    ) -> Result<Vec<FeaturePoints>, DetectError> {
        let (observations, ticket) = self.run_face_pass(image, source).await?;
        if observations.is_empty() {
            return Err(DetectError::EmptyResult);
        }
        let features: Vec<FeaturePoints> = observations
            .iter()
            .map(|o| face_feature_points(o, regions, &ticket.visible))
            .collect();
        self.install_markers(&ticket, build_markers(&features, &options));
        Ok(features)
    }

    async fn hand_joints_at(
        &self,
        image: DynamicImage,
        source: PixelSize,
        joints: &[HandJoint],
    ) -> Result<Vec<HandPoints>, DetectError> {
        let (observations, ticket) = self.run_hand_pass(image, source).await?;
        if observations.is_empty() {
            return Err(DetectError::EmptyResult);
        }
        Ok(observations
            .iter()
            .map(|o| hand_joint_points(o, joints, &ticket.visible))
            .collect())
    }

    async fn run_face_pass(
        &self,
        image: DynamicImage,
        source: PixelSize,
    ) -> Result<(Vec<FaceObservation>, PassTicket), DetectError> {
        let ticket = self.begin_pass(source)?;
        let detector = Arc::clone(&self.detector);
        let options = self.detect_options();
        let joined =
            tokio::task::spawn_blocking(move || detector.detect_faces(&image, &options)).await;
        self.finish_pass(&ticket);

        let observations = unwrap_pass(joined)?;
        tracing::debug!(count = observations.len(), "face pass complete");
        Ok((observations, ticket))
    }

    async fn run_hand_pass(
        &self,
        image: DynamicImage,
        source: PixelSize,
    ) -> Result<(Vec<HandObservation>, PassTicket), DetectError> {
        let ticket = self.begin_pass(source)?;
        let detector = Arc::clone(&self.detector);
        let options = self.detect_options();
        let joined =
            tokio::task::spawn_blocking(move || detector.detect_hands(&image, &options)).await;
        self.finish_pass(&ticket);

        let observations = unwrap_pass(joined)?;
        tracing::debug!(count = observations.len(), "hand pass complete");
        Ok((observations, ticket))
    }

    /// Validate state and geometry, then flip to `Detecting`.
    fn begin_pass(&self, source: PixelSize) -> Result<PassTicket, DetectError> {
        let mut inner = self.lock();
        let surface = inner.surface.ok_or(DetectError::NotBound)?;
        if inner.current_pass.is_some() {
            return Err(DetectError::Busy);
        }
        let visible = surface
            .geometry
            .visible_rect(source)
            .ok_or(DetectError::NoImage)?;
        let pass = inner.next_pass;
        inner.next_pass += 1;
        inner.current_pass = Some(pass);
        Ok(PassTicket {
            pass,
            generation: inner.generation,
            surface,
            visible,
        })
    }

    /// Return to idle. Only this pass's flag is cleared: a rebind during
    /// flight may already have started a newer pass.
    fn finish_pass(&self, ticket: &PassTicket) {
        let mut inner = self.lock();
        if inner.current_pass == Some(ticket.pass) {
            inner.current_pass = None;
        }
    }

    fn install_markers(&self, ticket: &PassTicket, markers: Vec<Marker>) {
        let mut inner = self.lock();
        if inner.generation != ticket.generation {
            tracing::debug!(surface = ticket.surface.id.0, "stale pass, markers dropped");
            return;
        }
        tracing::debug!(
            surface = ticket.surface.id.0,
            markers = markers.len(),
            "overlay replaced"
        );
        inner.overlay.replace(ticket.surface.id, markers);
    }

    fn prepare_frame(
        &self,
        frame: &VideoFrame,
        orientation: Orientation,
        size_mark: Option<SizeMark>,
    ) -> Result<(DynamicImage, PixelSize), DetectError> {
        let oriented = frame.oriented(orientation).map_err(|err| {
            tracing::debug!(error = %err, "frame rejected");
            DetectError::NoImage
        })?;
        let source = image_size(&oriented);
        let image = match size_mark {
            Some(mark) => mark.apply(&oriented),
            None => oriented,
        };
        Ok((image, source))
    }

    fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            max_hands: self.config.max_hands,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means a panic while holding it; state is still
        // consistent (all mutations are single assignments).
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn image_size(image: &DynamicImage) -> PixelSize {
    let (width, height) = image.dimensions();
    PixelSize::new(width as f64, height as f64)
}

fn unwrap_pass<T>(
    joined: Result<Result<Option<Vec<T>>, DetectorError>, tokio::task::JoinError>,
) -> Result<Vec<T>, DetectError> {
    match joined {
        Ok(Ok(Some(observations))) => Ok(observations),
        Ok(Ok(None)) => Err(DetectError::NullResult),
        Ok(Err(err)) => Err(err.into()),
        Err(err) => Err(DetectError::Worker(err.to_string())),
    }
}

fn build_markers(features: &[FeaturePoints], options: &DrawOptions) -> Vec<Marker> {
    let mut markers = Vec::new();
    for feature in features {
        if options.display_box {
            if let Some(rect) = feature.bounding_box {
                markers.push(Marker {
                    shape: MarkerShape::Box { rect },
                    stroke_width: options.line_width,
                    color: options.line_color,
                });
            }
        }
        for points in feature.landmarks.iter().flatten() {
            for &point in points {
                markers.push(Marker {
                    shape: MarkerShape::Dot {
                        center: point,
                        diameter: options.line_width,
                    },
                    stroke_width: options.line_width,
                    color: options.line_color,
                });
            }
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use facemark_core::{ContentMode, NormalizedPoint, NormalizedRect};
    use std::sync::mpsc;
    use std::time::Duration;

    fn face() -> FaceObservation {
        FaceObservation::new(NormalizedRect::new(0.25, 0.25, 0.5, 0.5))
            .with_region(FaceRegion::Nose, vec![NormalizedPoint::new(0.5, 0.5)])
    }

    fn hand() -> HandObservation {
        HandObservation::new(NormalizedRect::new(0.0, 0.0, 1.0, 1.0)).with_joint(
            HandJoint::Wrist,
            NormalizedPoint::new(0.5, 0.1),
            0.8,
        )
    }

    fn surface(mode: ContentMode) -> Surface {
        Surface::new(
            SurfaceId(1),
            ContainerGeometry::new(PixelRect::new(0.0, 0.0, 300.0, 300.0), mode),
        )
    }

    fn test_image() -> DynamicImage {
        DynamicImage::new_luma8(600, 300)
    }

    /// Scriptable detector: each pass replays the configured outcome.
    #[derive(Clone)]
    enum Script {
        Faces(Vec<FaceObservation>),
        Empty,
        Null,
        Fail,
    }

    struct ScriptedDetector {
        script: Mutex<Script>,
        hands: Vec<HandObservation>,
    }

    impl ScriptedDetector {
        fn faces(observations: Vec<FaceObservation>) -> Self {
            Self::new(Script::Faces(observations))
        }

        fn new(script: Script) -> Self {
            Self {
                script: Mutex::new(script),
                hands: Vec::new(),
            }
        }

        fn with_hands(mut self, hands: Vec<HandObservation>) -> Self {
            self.hands = hands;
            self
        }

        fn set_script(&self, script: Script) {
            *self.script.lock().unwrap() = script;
        }
    }

    impl LandmarkDetector for ScriptedDetector {
        fn detect_faces(
            &self,
            _image: &DynamicImage,
            _options: &DetectOptions,
        ) -> Result<Option<Vec<FaceObservation>>, DetectorError> {
            match self.script.lock().unwrap().clone() {
                Script::Faces(observations) => Ok(Some(observations)),
                Script::Empty => Ok(Some(Vec::new())),
                Script::Null => Ok(None),
                Script::Fail => Err(DetectorError::Backend("scripted failure".into())),
            }
        }

        fn detect_hands(
            &self,
            _image: &DynamicImage,
            options: &DetectOptions,
        ) -> Result<Option<Vec<HandObservation>>, DetectorError> {
            let mut hands = self.hands.clone();
            hands.truncate(options.max_hands);
            Ok(Some(hands))
        }
    }

    /// Detector that signals entry and then blocks until released, to pin the
    /// session in `Detecting`.
    struct GatedDetector {
        entered: Mutex<mpsc::Sender<()>>,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl LandmarkDetector for GatedDetector {
        fn detect_faces(
            &self,
            _image: &DynamicImage,
            _options: &DetectOptions,
        ) -> Result<Option<Vec<FaceObservation>>, DetectorError> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.gate.lock().unwrap().recv();
            Ok(Some(vec![face()]))
        }

        fn detect_hands(
            &self,
            _image: &DynamicImage,
            _options: &DetectOptions,
        ) -> Result<Option<Vec<HandObservation>>, DetectorError> {
            Ok(Some(Vec::new()))
        }
    }

    fn gated() -> (Arc<GatedDetector>, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let detector = Arc::new(GatedDetector {
            entered: Mutex::new(entered_tx),
            gate: Mutex::new(release_rx),
        });
        (detector, entered_rx, release_tx)
    }

    #[tokio::test]
    async fn test_detect_before_bind_fails() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        let result = session.face_landmarks(test_image(), &[]).await;
        assert!(matches!(result, Err(DetectError::NotBound)));
    }

    #[tokio::test]
    async fn test_bind_twice_fails() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        let again = session.bind(surface(ContentMode::Fill));
        assert!(matches!(again, Err(DetectError::AlreadyBound)));
    }

    #[tokio::test]
    async fn test_face_landmarks_maps_through_fit_rect() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();

        // 600x300 image in a 300x300 fit container → visible 300x150 at y=75
        let features = session
            .face_landmarks(test_image(), &[FaceRegion::Nose])
            .await
            .unwrap();
        assert_eq!(features.len(), 1);

        let mapped = features[0].bounding_box.unwrap();
        assert!((mapped.min_x() - 75.0).abs() < 1e-9);
        assert!((mapped.min_y() - 112.5).abs() < 1e-9);
        assert!((mapped.max_x() - 225.0).abs() < 1e-9);
        assert!((mapped.max_y() - 187.5).abs() < 1e-9);

        let nose = features[0].landmarks[0].as_ref().unwrap();
        assert!((nose[0].x - 150.0).abs() < 1e-9);
        assert!((nose[0].y - 150.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_zero_area_image_is_no_image() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        let result = session
            .face_landmarks(DynamicImage::new_luma8(0, 10), &[])
            .await;
        assert!(matches!(result, Err(DetectError::NoImage)));
    }

    #[tokio::test]
    async fn test_empty_and_null_results_are_distinct() {
        let detector = Arc::new(ScriptedDetector::new(Script::Empty));
        let session = Session::new(Arc::clone(&detector) as Arc<dyn LandmarkDetector>);
        session.bind(surface(ContentMode::Fit)).unwrap();

        let empty = session.face_landmarks(test_image(), &[]).await;
        assert!(matches!(empty, Err(DetectError::EmptyResult)));

        detector.set_script(Script::Null);
        let null = session.face_landmarks(test_image(), &[]).await;
        assert!(matches!(null, Err(DetectError::NullResult)));
    }

    #[tokio::test]
    async fn test_detector_failure_passes_through() {
        let session = Session::new(Arc::new(ScriptedDetector::new(Script::Fail)));
        session.bind(surface(ContentMode::Fit)).unwrap();
        let result = session.face_landmarks(test_image(), &[]).await;
        assert!(matches!(result, Err(DetectError::Detector(_))));
    }

    #[tokio::test]
    async fn test_count_ignores_missing_regions() {
        // One face, zero resolvable landmark regions → count is still 1.
        let bare = FaceObservation::new(NormalizedRect::new(0.1, 0.1, 0.3, 0.3));
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![bare])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        assert_eq!(session.face_count(test_image()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_zero_is_not_an_error() {
        let session = Session::new(Arc::new(ScriptedDetector::new(Script::Empty)));
        session.bind(surface(ContentMode::Fit)).unwrap();
        assert_eq!(session.face_count(test_image()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_boxed_pass_installs_markers() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        session
            .face_landmarks_boxed(test_image(), &[FaceRegion::Nose], DrawOptions::default())
            .await
            .unwrap();

        let markers = session.markers();
        // one box + one nose dot
        assert_eq!(markers.len(), 2);
        assert!(matches!(markers[0].shape, MarkerShape::Box { .. }));
        assert!(matches!(markers[1].shape, MarkerShape::Dot { .. }));
    }

    #[tokio::test]
    async fn test_box_toggle_suppresses_box_marker() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        let options = DrawOptions {
            display_box: false,
            ..DrawOptions::default()
        };
        session
            .face_landmarks_boxed(test_image(), &[FaceRegion::Nose], options)
            .await
            .unwrap();
        assert!(session
            .markers()
            .iter()
            .all(|m| matches!(m.shape, MarkerShape::Dot { .. })));
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_previous_markers() {
        let detector = Arc::new(ScriptedDetector::faces(vec![face()]));
        let session = Session::new(Arc::clone(&detector) as Arc<dyn LandmarkDetector>);
        session.bind(surface(ContentMode::Fit)).unwrap();
        session
            .face_landmarks_boxed(test_image(), &[FaceRegion::Nose], DrawOptions::default())
            .await
            .unwrap();
        let before = session.markers();
        assert!(!before.is_empty());

        detector.set_script(Script::Fail);
        let failed = session
            .face_landmarks_boxed(test_image(), &[FaceRegion::Nose], DrawOptions::default())
            .await;
        assert!(failed.is_err());
        assert_eq!(session.markers(), before);
    }

    #[tokio::test]
    async fn test_unbind_clears_markers_and_rebind_starts_empty() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![face()])));
        session.bind(surface(ContentMode::Fit)).unwrap();
        session
            .face_landmarks_boxed(test_image(), &[], DrawOptions::default())
            .await
            .unwrap();
        assert!(!session.markers().is_empty());

        session.unbind().unwrap();
        assert!(session.markers().is_empty());

        session.bind(surface(ContentMode::Fit)).unwrap();
        assert!(session.markers().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_detect_is_busy_not_queued() {
        let (detector, entered_rx, release_tx) = gated();
        let session = Arc::new(Session::new(detector));
        session.bind(surface(ContentMode::Fit)).unwrap();

        let background = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.face_landmarks(test_image(), &[]).await })
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let second = session.face_landmarks(test_image(), &[]).await;
        assert!(matches!(second, Err(DetectError::Busy)));

        release_tx.send(()).unwrap();
        assert!(background.await.unwrap().is_ok());

        // back to idle afterwards
        let third = session.face_landmarks(test_image(), &[]).await;
        assert!(third.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stale_pass_never_installs_markers() {
        let (detector, entered_rx, release_tx) = gated();
        let session = Arc::new(Session::new(detector));
        session.bind(surface(ContentMode::Fit)).unwrap();

        let background = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .face_landmarks_boxed(test_image(), &[], DrawOptions::default())
                    .await
            })
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // rebind while the pass is in flight; the stale completion must not
        // write into the fresh marker set
        session.unbind().unwrap();
        session.bind(surface(ContentMode::Fit)).unwrap();

        release_tx.send(()).unwrap();
        assert!(background.await.unwrap().is_ok());
        assert!(session.markers().is_empty());
    }

    #[tokio::test]
    async fn test_hand_joints_and_count() {
        let detector =
            Arc::new(ScriptedDetector::faces(vec![face()]).with_hands(vec![hand(), hand()]));
        let session = Session::new(detector);
        session.bind(surface(ContentMode::Fit)).unwrap();

        let hands = session
            .hand_joints(test_image(), &[HandJoint::Wrist, HandJoint::IndexTip])
            .await
            .unwrap();
        assert_eq!(hands.len(), 2);
        assert!(hands[0].joints[0].is_some());
        assert!(hands[0].joints[1].is_none());

        assert_eq!(session.hand_count(test_image()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_configured_line_width_seeds_draw_options() {
        let config = SessionConfig {
            line_width: 3.0,
            ..SessionConfig::default()
        };
        let session =
            Session::with_config(Arc::new(ScriptedDetector::faces(vec![face()])), config);
        session.bind(surface(ContentMode::Fit)).unwrap();

        let options = session.draw_options();
        assert!((options.line_width - 3.0).abs() < 1e-9);

        session
            .face_landmarks_boxed(test_image(), &[], options)
            .await
            .unwrap();
        assert!((session.markers()[0].stroke_width - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_max_hands_option_reaches_detector() {
        let detector =
            Arc::new(ScriptedDetector::faces(vec![face()]).with_hands(vec![hand(), hand()]));
        let config = SessionConfig {
            max_hands: 1,
            ..SessionConfig::default()
        };
        let session = Session::with_config(detector, config);
        session.bind(surface(ContentMode::Fit)).unwrap();
        assert_eq!(session.hand_count(test_image()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_frame_geometry_ignores_size_mark() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![FaceObservation::new(
            NormalizedRect::new(0.0, 0.0, 1.0, 1.0),
        )])));
        session.bind(surface(ContentMode::Fit)).unwrap();

        // 200x100 frame in a 300x300 fit container → visible 300x150 at y=75.
        // The width-37 rescale rounds to 37x19 (aspect 1.947…); mapping must
        // still use the oriented 2:1 source.
        let frame = VideoFrame::from_luma(vec![0u8; 200 * 100], 200, 100).unwrap();
        let features = session
            .frame_face_landmarks(
                &frame,
                Orientation::NoTransforms,
                Some(SizeMark::Width(37)),
                &[],
            )
            .await
            .unwrap();

        let full = features[0].bounding_box.unwrap();
        assert!((full.min_x() - 0.0).abs() < 1e-9);
        assert!((full.min_y() - 75.0).abs() < 1e-9);
        assert!((full.width - 300.0).abs() < 1e-9);
        assert!((full.height - 150.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_frame_orientation_changes_aspect() {
        let session = Session::new(Arc::new(ScriptedDetector::faces(vec![FaceObservation::new(
            NormalizedRect::new(0.0, 0.0, 1.0, 1.0),
        )])));
        session.bind(surface(ContentMode::Fit)).unwrap();

        // Rotating a 200x100 frame by 90° makes it 100x200: the fit rect is
        // now pillarboxed, 150 wide and 300 tall.
        let frame = VideoFrame::from_luma(vec![0u8; 200 * 100], 200, 100).unwrap();
        let features = session
            .frame_face_landmarks(&frame, Orientation::Rotate90, None, &[])
            .await
            .unwrap();

        let full = features[0].bounding_box.unwrap();
        assert!((full.min_x() - 75.0).abs() < 1e-9);
        assert!((full.min_y() - 0.0).abs() < 1e-9);
        assert!((full.width - 150.0).abs() < 1e-9);
        assert!((full.height - 300.0).abs() < 1e-9);
    }
}
