//! Hand landmarks as produced by a hand-pose detector.
//!
//! Coordinates are normalized to the camera image: `x` and `y` in [0, 1]
//! with the origin at the top-left, `z` a relative depth with no fixed range.

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (21-point hand topology)
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Number of landmarks in one detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Bones of the hand skeleton, for drawing.
pub const HAND_SKELETON: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),   (THUMB_CMC, THUMB_MCP),   (THUMB_MCP, THUMB_IP),     (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),   (INDEX_MCP, INDEX_PIP),   (INDEX_PIP, INDEX_DIP),    (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP),  (RING_MCP, RING_PIP),     (RING_PIP, RING_DIP),     (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP),   (PINKY_MCP, PINKY_PIP),   (PINKY_PIP, PINKY_DIP),   (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One normalized keypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// True when `x` and `y` fall inside the image.
    pub fn in_frame(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// All landmarks of one detected hand, indexed by the constants above.
pub type HandLandmarks = Vec<Landmark>;

/// The index fingertip of the first detected hand.
///
/// Additional hands and every other keypoint are ignored.  Returns `None`
/// for an empty detection or a first hand with fewer than nine landmarks.
pub fn fingertip(hands: &[HandLandmarks]) -> Option<Landmark> {
    hands.first()?.get(INDEX_TIP).copied()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
