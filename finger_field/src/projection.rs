//! Perspective projection from world space to window pixels.
//!
//! The eye sits on the +Z axis looking at the origin, so the control
//! point's `z = 0` plane faces the viewer.  Aspect ratio follows the
//! window and is recomputed on every resize.

use glam::{Mat4, Vec3};

pub const FOV_Y_DEG: f32 = 75.0;
pub const EYE_Z:     f32 = 30.0;
pub const Z_NEAR:    f32 = 0.1;
pub const Z_FAR:     f32 = 1000.0;

#[derive(Clone, Debug)]
pub struct Projection {
    width:     usize,
    height:    usize,
    view_proj: Mat4,
}

impl Projection {
    pub fn new(width: usize, height: usize) -> Self {
        let mut p = Projection { width: 0, height: 0, view_proj: Mat4::IDENTITY };
        p.resize(width, height);
        p
    }

    pub fn size(&self) -> (usize, usize) { (self.width, self.height) }

    /// Recompute for a new viewport.  Returns false if the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width  = width;
        self.height = height;
        let aspect = width as f32 / height as f32;
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, EYE_Z), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, Z_NEAR, Z_FAR);
        self.view_proj = proj * view;
        log::debug!("projection: {}x{} (aspect {:.3})", width, height, aspect);
        true
    }

    /// Pixel position and view depth of `p`, or `None` outside the depth
    /// range.  Points off the sides of the window still project.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let sx = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let sy = (1.0 - ndc.y) * 0.5 * self.height as f32;
        Some((sx, sy, clip.w))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
