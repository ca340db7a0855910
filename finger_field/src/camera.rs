//! Video sources feeding the hand detector.
//!
//! The frame driver only needs three things from a camera: whether a frame
//! is readable yet, that frame's presentation time, and the frame itself.
//! Presentation time repeats while the camera has not produced a new frame,
//! which is how the driver avoids running inference twice on the same image.

#[cfg(feature = "leap")]
use std::sync::mpsc::{self, Receiver};
#[cfg(feature = "leap")]
use std::time::Instant;

// ════════════════════════════════════════════════════════════════════════════
// CameraSource
// ════════════════════════════════════════════════════════════════════════════

/// A live video stream as seen by the frame driver.
pub trait CameraSource {
    type Frame;

    /// True once at least one frame can be read.
    fn has_frame_data(&self) -> bool;

    /// Presentation time of the current frame in milliseconds.
    fn presentation_ms(&self) -> f64;

    /// The current frame.
    fn frame(&self) -> &Self::Frame;
}

// ════════════════════════════════════════════════════════════════════════════
// PointerCamera — simulated webcam
// ════════════════════════════════════════════════════════════════════════════

/// One simulated frame: where the pointer was as a user-facing camera would
/// see it, normalized to [0, 1] with the origin at the top-left of the image.
/// The image is the window mirrored left-to-right.  `None` when the pointer
/// was outside the window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerFrame {
    pub pointer: Option<(f32, f32)>,
}

/// A webcam stand-in that samples the window pointer at a fixed capture rate.
///
/// Frames are captured on a fixed grid of `1000 / capture_fps` ms, so a
/// 60 Hz render loop over a 30 fps camera sees every timestamp twice.
#[derive(Debug)]
pub struct PointerCamera {
    interval_ms:     f64,
    frame:           PointerFrame,
    presentation_ms: f64,
    captured:        bool,
}

impl PointerCamera {
    pub fn new(capture_fps: f64) -> Self {
        PointerCamera {
            interval_ms:     1000.0 / capture_fps.max(1.0),
            frame:           PointerFrame::default(),
            presentation_ms: 0.0,
            captured:        false,
        }
    }

    /// Offer the latest pointer sample (window-normalized) at host time
    /// `now_ms`.
    ///
    /// Returns true when a new frame was captured.  Samples that land in an
    /// already-captured interval are dropped.
    pub fn capture(&mut self, pointer: Option<(f32, f32)>, now_ms: f64) -> bool {
        let slot = (now_ms / self.interval_ms).floor() * self.interval_ms;
        if self.captured && slot <= self.presentation_ms {
            return false;
        }
        self.presentation_ms = slot;
        self.frame = PointerFrame { pointer: pointer.map(|(x, y)| (1.0 - x, y)) };
        self.captured = true;
        true
    }

    pub fn interval_ms(&self) -> f64 { self.interval_ms }
}

impl CameraSource for PointerCamera {
    type Frame = PointerFrame;

    fn has_frame_data(&self)  -> bool          { self.captured }
    fn presentation_ms(&self) -> f64           { self.presentation_ms }
    fn frame(&self)           -> &PointerFrame { &self.frame }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapCamera — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// One tracked hand: 21 joints in LeapMotion millimetres, ordered like the
/// landmark topology (wrist, then four joints per digit from thumb to pinky).
#[cfg(feature = "leap")]
#[derive(Clone, Debug)]
pub struct LeapHand {
    pub joints: Vec<[f32; 3]>,
}

/// One LeapMotion tracking frame.
#[cfg(feature = "leap")]
#[derive(Clone, Debug, Default)]
pub struct LeapFrame {
    pub hands: Vec<LeapHand>,
}

/// LeapMotion tracking frames, polled on a background thread.
#[cfg(feature = "leap")]
pub struct LeapCamera {
    rx:              Receiver<LeapFrame>,
    frame:           LeapFrame,
    presentation_ms: f64,
    captured:        bool,
    epoch:           Instant,
}

#[cfg(feature = "leap")]
impl LeapCamera {
    /// Open the first LeapMotion device and start the polling thread.
    ///
    /// Blocks until the device has been opened or has failed to open, so
    /// call it from a loader thread.
    pub fn open() -> Result<Self, String> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let (frame_tx, frame_rx) = mpsc::channel::<LeapFrame>();

        std::thread::spawn(move || {
            use leaprs::*;

            let mut connection = match Connection::create(ConnectionConfig::default()) {
                Ok(c)  => c,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("LeapC connection: {:?}", e)));
                    return;
                }
            };
            if let Err(e) = connection.open() {
                let _ = ready_tx.send(Err(format!("LeapMotion device: {:?}", e)));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            loop {
                let msg = match connection.poll(100) {
                    Ok(m)  => m,
                    Err(_) => continue,
                };
                if let Event::Tracking(frame) = msg.event() {
                    let hands = frame.hands().map(|h| LeapHand { joints: hand_joints(&h) }).collect();
                    if frame_tx.send(LeapFrame { hands }).is_err() {
                        return;
                    }
                }
            }
        });

        match ready_rx.recv() {
            Ok(Ok(()))  => {}
            Ok(Err(e))  => return Err(e),
            Err(_)      => return Err("LeapMotion thread exited during startup".to_string()),
        }

        Ok(LeapCamera {
            rx:              frame_rx,
            frame:           LeapFrame::default(),
            presentation_ms: 0.0,
            captured:        false,
            epoch:           Instant::now(),
        })
    }

    /// Take the newest pending tracking frame, if any.
    pub fn pump(&mut self) {
        let mut newest = None;
        while let Ok(f) = self.rx.try_recv() { newest = Some(f); }
        if let Some(f) = newest {
            self.frame = f;
            self.presentation_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
            self.captured = true;
        }
    }
}

#[cfg(feature = "leap")]
impl CameraSource for LeapCamera {
    type Frame = LeapFrame;

    fn has_frame_data(&self)  -> bool       { self.captured }
    fn presentation_ms(&self) -> f64        { self.presentation_ms }
    fn frame(&self)           -> &LeapFrame { &self.frame }
}

#[cfg(feature = "leap")]
fn hand_joints(hand: &leaprs::Hand) -> Vec<[f32; 3]> {
    let palm = hand.palm().position();
    let mut joints = vec![[palm.x, palm.y, palm.z]];
    for digit in hand.digits() {
        for bone in [digit.metacarpal(), digit.proximal(), digit.intermediate(), digit.distal()] {
            let j = bone.next_joint();
            joints.push([j.x, j.y, j.z]);
        }
    }
    joints
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
