//! # particle_field
//!
//! The simulation core behind `finger_field`: a smoothed control point
//! tracked from a hand landmark, and a few thousand particles pushed away
//! from it by a short-range repulsion field.
//!
//! Nothing in this crate touches a window, a camera or a clock.  Each call
//! to [`ParticleField::step`] is one rendered frame; each call to
//! [`ControlPointTracker::update`] is one detection.
//!
//! ```text
//! landmark (normalized) ──► ControlPointTracker ──► control point (world)
//!                                                        │
//!                                ParticleField::step ◄───┘
//! ```
//!
//! ## Constants
//!
//! | Parameter | Default | Meaning |
//! |---|---|---|
//! | `influence_radius` | 6.0 | repulsion cut-off distance |
//! | `repulsion_gain` | 0.5 | impulse scale at zero distance |
//! | `damping` | 0.95 | per-frame velocity retention |
//! | `restoring` | 0.005 | spring constant toward the origin |
//! | `smoothing` | 0.2 | tracker low-pass step |
//! | world extent | 30 × 20 | landmark → world scale |

pub mod landmark;
pub mod tracker;
pub mod field;

pub use glam::Vec3;
pub use landmark::{fingertip, HandLandmarks, Landmark, HAND_SKELETON, INDEX_TIP, LANDMARK_COUNT};
pub use tracker::{ControlPointTracker, TrackerParams};
pub use field::{FieldParams, ParticleField};
