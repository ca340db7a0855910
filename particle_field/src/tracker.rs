//! Control point tracking.
//!
//! Maps the fingertip landmark into world space and low-pass filters it.
//! The filter runs once per detection, not per unit of wall-clock time, so
//! its effective cut-off follows the detection rate.

use glam::Vec3;

use crate::landmark::Landmark;

// ════════════════════════════════════════════════════════════════════════════
// TrackerParams
// ════════════════════════════════════════════════════════════════════════════

/// Landmark → world mapping and smoothing rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerParams {
    /// World units spanned by the full image width.
    pub world_width:  f32,
    /// World units spanned by the full image height.
    pub world_height: f32,
    /// Fraction of the remaining distance covered per update (0–1].
    pub smoothing:    f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        TrackerParams {
            world_width:  30.0,
            world_height: 20.0,
            smoothing:    0.2,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlPointTracker
// ════════════════════════════════════════════════════════════════════════════

/// Smoothed world-space control point.  `z` stays on the `z = 0` plane.
#[derive(Clone, Debug)]
pub struct ControlPointTracker {
    current: Vec3,
    params:  TrackerParams,
}

impl ControlPointTracker {
    pub fn new(start: Vec3, params: TrackerParams) -> Self {
        ControlPointTracker {
            current: Vec3::new(start.x, start.y, 0.0),
            params,
        }
    }

    pub fn current(&self) -> Vec3 { self.current }
    pub fn params(&self)  -> &TrackerParams { &self.params }

    /// World position a landmark maps to.
    ///
    /// X is mirrored so moving the hand right moves the point right on a
    /// selfie-view camera.
    pub fn target_for(&self, landmark: Landmark) -> Vec3 {
        Vec3::new(
            (0.5 - landmark.x) * self.params.world_width,
            (0.5 - landmark.y) * self.params.world_height,
            0.0,
        )
    }

    /// Move toward the landmark's target.  `None` keeps the last position.
    pub fn update(&mut self, landmark: Option<Landmark>) {
        if let Some(lm) = landmark {
            let target = self.target_for(lm);
            self.current += (target - self.current) * self.params.smoothing;
        }
    }
}

impl Default for ControlPointTracker {
    fn default() -> Self {
        ControlPointTracker::new(Vec3::ZERO, TrackerParams::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
