//! Per-frame orchestration.
//!
//! `FrameDriver` owns the simulation state and the detector once it is
//! ready, and runs one tick per rendered frame:
//!
//! 1. **Idle** until a camera frame is readable *and* a detector is attached.
//!    Nothing in the field moves.
//! 2. **Active** otherwise: run detection if the camera's presentation time
//!    changed, feed a found fingertip to the tracker, then step the field
//!    with the tracker's current control point.  The step runs even when
//!    detection was skipped or found no hand.
//!
//! One tick is one simulation step, so the simulation speed follows the
//! display refresh rate.

use particle_field::{fingertip, ControlPointTracker, HandLandmarks, Landmark, ParticleField, Vec3};

use crate::camera::CameraSource;
use crate::detector::HandDetector;

// ════════════════════════════════════════════════════════════════════════════
// DriverState / FrameStats
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState { Idle, Active }

/// Running counters, shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub ticks:            u64,
    /// Field steps taken (Active ticks).
    pub steps:            u64,
    /// Detector invocations.
    pub detections:       u64,
    /// Active ticks that reused the previous camera frame.
    pub duplicate_frames: u64,
    /// Detections that produced a fingertip.
    pub hands_found:      u64,
    pub detector_errors:  u64,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameDriver
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameDriver<F> {
    field:         ParticleField,
    tracker:       ControlPointTracker,
    detector:      Option<Box<dyn HandDetector<F>>>,
    last_video_ms: Option<f64>,
    /// First hand of the most recent detection, for the camera inset.
    last_hand:     Option<HandLandmarks>,
    state:         DriverState,
    stats:         FrameStats,
}

impl<F> FrameDriver<F> {
    pub fn new(field: ParticleField, tracker: ControlPointTracker) -> Self {
        FrameDriver {
            field,
            tracker,
            detector:      None,
            last_video_ms: None,
            last_hand:     None,
            state:         DriverState::Idle,
            stats:         FrameStats::default(),
        }
    }

    /// Hand over a loaded detector.  Simulation starts on the next tick
    /// with a readable camera frame.
    pub fn attach_detector(&mut self, detector: Box<dyn HandDetector<F>>) {
        self.detector = Some(detector);
    }

    pub fn detector_ready(&self) -> bool { self.detector.is_some() }

    /// Run one frame.  `camera` is `None` until the stream is attached.
    pub fn tick<C>(&mut self, camera: Option<&C>) -> DriverState
    where
        C: CameraSource<Frame = F>,
    {
        self.stats.ticks += 1;

        let camera = match camera {
            Some(c) if c.has_frame_data() && self.detector.is_some() => c,
            _ => {
                self.enter(DriverState::Idle);
                return DriverState::Idle;
            }
        };
        self.enter(DriverState::Active);

        let now = camera.presentation_ms();
        if self.last_video_ms == Some(now) {
            self.stats.duplicate_frames += 1;
        } else {
            self.last_video_ms = Some(now);
            self.detect(camera.frame(), now);
        }

        self.field.step(self.tracker.current());
        self.stats.steps += 1;
        DriverState::Active
    }

    fn detect(&mut self, frame: &F, now: f64) {
        let Some(detector) = self.detector.as_mut() else { return };
        self.stats.detections += 1;

        match detector.detect(frame, now) {
            Ok(hands) => {
                // An empty result leaves the tracker untouched.
                if let Some(tip) = fingertip(&hands) {
                    self.stats.hands_found += 1;
                    self.tracker.update(Some(tip));
                }
                self.last_hand = hands.into_iter().next();
            }
            Err(e) => {
                self.last_hand = None;
                self.stats.detector_errors += 1;
                log::debug!("detector: {}", e);
            }
        }
    }

    fn enter(&mut self, next: DriverState) {
        if self.state != next {
            log::info!("frame driver: {:?} → {:?}", self.state, next);
            self.state = next;
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn field(&self)         -> &ParticleField       { &self.field }
    pub fn tracker(&self)       -> &ControlPointTracker { &self.tracker }
    pub fn control_point(&self) -> Vec3                 { self.tracker.current() }
    pub fn state(&self)         -> DriverState          { self.state }
    pub fn stats(&self)         -> FrameStats           { self.stats }
    pub fn last_video_ms(&self) -> Option<f64>          { self.last_video_ms }
    pub fn last_hand(&self)     -> Option<&[Landmark]>  { self.last_hand.as_deref() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use particle_field::landmark::{HandLandmarks, Landmark, INDEX_TIP, LANDMARK_COUNT};
    use particle_field::FieldParams;

    use crate::error::DetectorError;

    /// Frame content: the fingertip the fake detector will report.
    type TipFrame = Option<Landmark>;

    struct ScriptedCamera {
        frame: TipFrame,
        ms:    f64,
        ready: bool,
    }

    impl CameraSource for ScriptedCamera {
        type Frame = TipFrame;
        fn has_frame_data(&self)  -> bool      { self.ready }
        fn presentation_ms(&self) -> f64       { self.ms }
        fn frame(&self)           -> &TipFrame { &self.frame }
    }

    struct CountingDetector {
        calls: Arc<AtomicUsize>,
        fail:  bool,
    }

    impl HandDetector<TipFrame> for CountingDetector {
        fn detect(&mut self, frame: &TipFrame, _ms: f64) -> Result<Vec<HandLandmarks>, DetectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DetectorError::Inference("scripted".into()));
            }
            Ok(frame.map(|tip| {
                let mut hand = vec![Landmark::default(); LANDMARK_COUNT];
                hand[INDEX_TIP] = tip;
                hand
            }).into_iter().collect())
        }
    }

    fn field() -> ParticleField {
        ParticleField::from_positions(
            vec![Vec3::new(1.0, 0.5, 0.0), Vec3::new(-4.0, 2.0, 3.0), Vec3::new(8.0, -8.0, 1.0)],
            FieldParams::default(),
        )
    }

    fn driver() -> FrameDriver<TipFrame> {
        FrameDriver::new(field(), ControlPointTracker::default())
    }

    fn counting(fail: bool) -> (Box<CountingDetector>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(CountingDetector { calls: calls.clone(), fail }), calls)
    }

    fn camera(tip: TipFrame, ms: f64) -> ScriptedCamera {
        ScriptedCamera { frame: tip, ms, ready: true }
    }

    #[test]
    fn idle_without_camera() {
        let mut d = driver();
        let (det, calls) = counting(false);
        d.attach_detector(det);
        assert_eq!(d.tick::<ScriptedCamera>(None), DriverState::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(d.field().positions(), field().positions());
    }

    #[test]
    fn field_frozen_until_detector_ready() {
        let mut d = driver();
        for i in 0..50 {
            let cam = camera(Some(Landmark::new(0.0, 0.0, 0.0)), i as f64);
            assert_eq!(d.tick(Some(&cam)), DriverState::Idle);
        }
        assert_eq!(d.field().positions(), field().positions());
        assert!(d.field().velocities().iter().all(|v| *v == Vec3::ZERO));
        assert_eq!(d.control_point(), Vec3::ZERO);
        assert_eq!(d.stats().steps, 0);
    }

    #[test]
    fn idle_while_camera_has_no_data() {
        let mut d = driver();
        let (det, calls) = counting(false);
        d.attach_detector(det);
        let cam = ScriptedCamera { frame: None, ms: 0.0, ready: false };
        assert_eq!(d.tick(Some(&cam)), DriverState::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unchanged_timestamp_detects_once() {
        let mut d = driver();
        let (det, calls) = counting(false);
        d.attach_detector(det);
        let cam = camera(Some(Landmark::new(0.0, 0.0, 0.0)), 33.0);
        d.tick(Some(&cam));
        d.tick(Some(&cam));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(d.stats().duplicate_frames, 1);
        // Both ticks still stepped the field.
        assert_eq!(d.stats().steps, 2);
    }

    #[test]
    fn new_timestamp_detects_again() {
        let mut d = driver();
        let (det, calls) = counting(false);
        d.attach_detector(det);
        d.tick(Some(&camera(None, 0.0)));
        d.tick(Some(&camera(None, 33.0)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(d.last_video_ms(), Some(33.0));
    }

    #[test]
    fn fingertip_moves_control_point() {
        let mut d = driver();
        let (det, _) = counting(false);
        d.attach_detector(det);
        assert_eq!(d.tick(Some(&camera(Some(Landmark::new(0.0, 0.0, 0.0)), 0.0))), DriverState::Active);
        assert!((d.control_point() - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);
        assert_eq!(d.stats().hands_found, 1);
        assert_eq!(d.last_hand().map(|h| h.len()), Some(LANDMARK_COUNT));
    }

    #[test]
    fn empty_detection_keeps_control_point_but_steps() {
        let mut d = driver();
        let (det, _) = counting(false);
        d.attach_detector(det);
        d.tick(Some(&camera(Some(Landmark::new(0.0, 0.0, 0.0)), 0.0)));
        let held = d.control_point();
        let before = d.field().positions().to_vec();
        d.tick(Some(&camera(None, 33.0)));
        assert_eq!(d.control_point(), held);
        assert!(d.last_hand().is_none());
        assert_ne!(d.field().positions(), &before[..]);
    }

    #[test]
    fn detector_error_is_not_fatal() {
        let mut d = driver();
        let (det, _) = counting(true);
        d.attach_detector(det);
        assert_eq!(d.tick(Some(&camera(Some(Landmark::new(0.0, 0.0, 0.0)), 0.0))), DriverState::Active);
        assert_eq!(d.control_point(), Vec3::ZERO);
        assert_eq!(d.stats().detector_errors, 1);
        assert_eq!(d.stats().steps, 1);
    }

    #[test]
    fn state_follows_camera_readiness() {
        let mut d = driver();
        let (det, _) = counting(false);
        d.attach_detector(det);
        d.tick(Some(&camera(None, 0.0)));
        assert_eq!(d.state(), DriverState::Active);
        d.tick::<ScriptedCamera>(None);
        assert_eq!(d.state(), DriverState::Idle);
    }
}
