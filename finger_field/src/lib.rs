//! # finger_field
//!
//! A real-time particle field steered by an index fingertip.  A hand
//! detector reads camera frames; the first hand's fingertip drives a
//! smoothed control point; every rendered frame the particles are pushed
//! away from that point and drift back toward the origin.
//!
//! ## Frame loop
//!
//! ```text
//! camera frame ─► HandDetector ─► fingertip ─► ControlPointTracker
//!                                                     │
//!                       Visualizer ◄── ParticleField::step
//! ```
//!
//! The loop starts rendering immediately.  Simulation only begins once the
//! camera is attached *and* the detector has finished loading; both load
//! on background threads and are polled each frame.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse pointer over the window is
//!   sampled as a 30 fps "camera" and turned into a synthetic hand.
//! * `leap` — **Hardware mode**: the index finger of a real LeapMotion
//!   controller is tracked via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod camera;
pub mod detector;
pub mod startup;
pub mod driver;
pub mod projection;
pub mod visualizer;
pub mod app;

pub use error::{AppError, DetectorError};
