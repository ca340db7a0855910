//! Hand detector adapters.
//!
//! A detector turns one camera frame into zero or more hands of normalized
//! landmarks.  The caller only reads the first hand's index fingertip, but
//! detectors always return every hand and every landmark they found.
//!
//! Detectors are built on a loader thread (see [`crate::startup`]) and then
//! moved to the frame loop, hence the `Send` bound.

use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use particle_field::landmark::{HandLandmarks, Landmark, INDEX_TIP, LANDMARK_COUNT};

use crate::camera::PointerFrame;
use crate::error::DetectorError;

// ════════════════════════════════════════════════════════════════════════════
// HandDetector
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can find hands in a frame of type `F`.
pub trait HandDetector<F>: Send {
    /// Detect hands in `frame`, captured at `timestamp_ms`.
    ///
    /// An empty list means no hand was found; that is not an error.
    fn detect(&mut self, frame: &F, timestamp_ms: f64) -> Result<Vec<HandLandmarks>, DetectorError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimulatedDetector — pointer → synthetic hand
// ════════════════════════════════════════════════════════════════════════════

/// A pointing right hand in image space, relative to the wrist.  Index
/// extended upward, the other fingers loosely curled.
const HAND_TEMPLATE: [(f32, f32); LANDMARK_COUNT] = [
    ( 0.000,  0.000),                                            // wrist
    (-0.035, -0.030), (-0.060, -0.060), (-0.070, -0.090), (-0.065, -0.115), // thumb
    (-0.020, -0.110), (-0.020, -0.160), (-0.020, -0.195), (-0.020, -0.225), // index
    ( 0.010, -0.105), ( 0.020, -0.125), ( 0.020, -0.100), ( 0.015, -0.085), // middle
    ( 0.035, -0.095), ( 0.045, -0.110), ( 0.045, -0.090), ( 0.040, -0.075), // ring
    ( 0.055, -0.080), ( 0.065, -0.095), ( 0.065, -0.080), ( 0.060, -0.068), // pinky
];

/// Detector for [`PointerFrame`]s: places a synthetic hand so its index
/// fingertip lands on the pointer, with a little uniform landmark noise.
///
/// Like a video-mode pose model it requires strictly increasing timestamps.
#[derive(Debug)]
pub struct SimulatedDetector {
    jitter:  f32,
    rng:     ChaCha8Rng,
    last_ms: Option<f64>,
}

impl SimulatedDetector {
    pub fn new(jitter: f32, seed: u64) -> Self {
        SimulatedDetector {
            jitter:  jitter.max(0.0),
            rng:     ChaCha8Rng::seed_from_u64(seed),
            last_ms: None,
        }
    }

    /// Stand-in for model loading: waits `delay`, then returns the detector.
    pub fn load(delay: Duration, jitter: f32, seed: u64) -> Result<Self, DetectorError> {
        if !jitter.is_finite() {
            return Err(DetectorError::Init(format!("invalid jitter {}", jitter)));
        }
        thread::sleep(delay);
        Ok(Self::new(jitter, seed))
    }

    fn noise(&mut self) -> f32 {
        if self.jitter > 0.0 {
            self.rng.random_range(-self.jitter..self.jitter)
        } else {
            0.0
        }
    }

    fn synthesize(&mut self, tip_x: f32, tip_y: f32) -> HandLandmarks {
        let (ox, oy) = HAND_TEMPLATE[INDEX_TIP];
        let (wx, wy) = (tip_x - ox, tip_y - oy);
        HAND_TEMPLATE.iter()
            .map(|&(dx, dy)| {
                let x = wx + dx + self.noise();
                let y = wy + dy + self.noise();
                Landmark::new(x, y, self.noise())
            })
            .collect()
    }
}

impl HandDetector<PointerFrame> for SimulatedDetector {
    fn detect(&mut self, frame: &PointerFrame, timestamp_ms: f64) -> Result<Vec<HandLandmarks>, DetectorError> {
        if let Some(last) = self.last_ms {
            if timestamp_ms <= last {
                return Err(DetectorError::Inference(format!(
                    "timestamp {} ms is not after {} ms", timestamp_ms, last
                )));
            }
        }
        self.last_ms = Some(timestamp_ms);

        Ok(match frame.pointer {
            Some((x, y)) => vec![self.synthesize(x, y)],
            None         => Vec::new(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapDetector — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Maps LeapMotion joints (millimetres above the device) into normalized
/// landmarks over a fixed interaction box.
///
/// The device looks up at the hand, so image-space `x` is pre-mirrored to
/// keep the tracker's selfie mirroring natural.
#[cfg(feature = "leap")]
#[derive(Clone, Copy, Debug)]
pub struct LeapDetector {
    /// Half-width of the interaction box along X (mm).
    pub half_width: f32,
    /// Height range above the device along Y (mm).
    pub y_range:    (f32, f32),
    /// Depth span along Z (mm).
    pub depth:      f32,
}

#[cfg(feature = "leap")]
impl Default for LeapDetector {
    fn default() -> Self {
        LeapDetector { half_width: 200.0, y_range: (100.0, 400.0), depth: 300.0 }
    }
}

#[cfg(feature = "leap")]
impl LeapDetector {
    fn normalize(&self, j: [f32; 3]) -> Landmark {
        let (y0, y1) = self.y_range;
        Landmark::new(
            0.5 - j[0] / (2.0 * self.half_width),
            1.0 - (j[1] - y0) / (y1 - y0),
            j[2] / self.depth,
        )
    }
}

#[cfg(feature = "leap")]
impl HandDetector<crate::camera::LeapFrame> for LeapDetector {
    fn detect(&mut self, frame: &crate::camera::LeapFrame, _timestamp_ms: f64) -> Result<Vec<HandLandmarks>, DetectorError> {
        Ok(frame.hands.iter()
            .map(|h| h.joints.iter().map(|&j| self.normalize(j)).collect())
            .collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use particle_field::landmark::{fingertip, WRIST};

    fn frame(x: f32, y: f32) -> PointerFrame {
        PointerFrame { pointer: Some((x, y)) }
    }

    #[test]
    fn fingertip_lands_on_pointer() {
        let mut d = SimulatedDetector::new(0.0, 1);
        let hands = d.detect(&frame(0.3, 0.6), 0.0).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].len(), LANDMARK_COUNT);
        let tip = fingertip(&hands).unwrap();
        assert!((tip.x - 0.3).abs() < 1e-6);
        assert!((tip.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn wrist_sits_below_fingertip() {
        let mut d = SimulatedDetector::new(0.0, 1);
        let hands = d.detect(&frame(0.5, 0.3), 0.0).unwrap();
        assert!(hands[0][WRIST].y > hands[0][INDEX_TIP].y);
    }

    #[test]
    fn no_pointer_no_hand() {
        let mut d = SimulatedDetector::new(0.0, 1);
        let hands = d.detect(&PointerFrame { pointer: None }, 0.0).unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn jitter_stays_within_bound() {
        let mut d = SimulatedDetector::new(0.01, 5);
        for i in 0..50 {
            let hands = d.detect(&frame(0.5, 0.5), i as f64).unwrap();
            let tip = fingertip(&hands).unwrap();
            assert!((tip.x - 0.5).abs() <= 0.0101);
            assert!((tip.y - 0.5).abs() <= 0.0101);
        }
    }

    #[test]
    fn repeated_timestamp_is_rejected() {
        let mut d = SimulatedDetector::new(0.0, 1);
        d.detect(&frame(0.5, 0.5), 10.0).unwrap();
        let err = d.detect(&frame(0.5, 0.5), 10.0).unwrap_err();
        assert!(matches!(err, DetectorError::Inference(_)));
    }

    #[test]
    fn load_rejects_nan_jitter() {
        let err = SimulatedDetector::load(Duration::ZERO, f32::NAN, 0).unwrap_err();
        assert!(matches!(err, DetectorError::Init(_)));
    }
}
