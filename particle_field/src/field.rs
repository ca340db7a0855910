//! Particle field state and the per-frame force integration.
//!
//! Each frame every particle may receive a radial kick away from the
//! control point, then its velocity is damped and pulled toward the world
//! origin, then its position advances by one unit step.  There is no
//! delta-time: one call to [`ParticleField::step`] is one rendered frame.

use glam::Vec3;
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// FieldParams
// ════════════════════════════════════════════════════════════════════════════

/// Force-field constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    /// Distance beyond which the control point has no effect.
    pub influence_radius: f32,
    /// Impulse magnitude at zero distance.
    pub repulsion_gain:   f32,
    /// Velocity retained per frame.
    pub damping:          f32,
    /// Spring constant pulling every particle toward the origin.
    pub restoring:        f32,
    /// Below this distance the repulsion direction is undefined and the
    /// kick is skipped.
    pub min_distance:     f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams {
            influence_radius: 6.0,
            repulsion_gain:   0.5,
            damping:          0.95,
            restoring:        0.005,
            min_distance:     1e-6,
        }
    }
}

impl FieldParams {
    /// Velocity impulse for a particle displaced `d` from the control point.
    pub fn repulsion(&self, d: Vec3) -> Vec3 {
        let dist = d.length();
        if dist >= self.influence_radius || dist < self.min_distance {
            return Vec3::ZERO;
        }
        let force = (self.influence_radius - dist) / self.influence_radius;
        d / dist * (force * self.repulsion_gain)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Positions and velocities of a fixed number of particles.
#[derive(Clone, Debug)]
pub struct ParticleField {
    positions:  Vec<Vec3>,
    velocities: Vec<Vec3>,
    params:     FieldParams,
}

impl ParticleField {
    /// Scatter `count` particles uniformly in the cube
    /// `[-half_extent, half_extent)³`, all at rest.
    pub fn new<R: Rng + ?Sized>(
        count:       usize,
        half_extent: f32,
        params:      FieldParams,
        rng:         &mut R,
    ) -> Self {
        let positions = if half_extent > 0.0 {
            (0..count)
                .map(|_| Vec3::new(
                    rng.random_range(-half_extent..half_extent),
                    rng.random_range(-half_extent..half_extent),
                    rng.random_range(-half_extent..half_extent),
                ))
                .collect()
        } else {
            vec![Vec3::ZERO; count]
        };
        log::debug!("particle field: {} particles in ±{} cube", count, half_extent);
        Self::from_positions(positions, params)
    }

    /// Build a field from explicit positions, all at rest.
    pub fn from_positions(positions: Vec<Vec3>, params: FieldParams) -> Self {
        let velocities = vec![Vec3::ZERO; positions.len()];
        ParticleField { positions, velocities, params }
    }

    pub fn len(&self)        -> usize        { self.positions.len() }
    pub fn is_empty(&self)   -> bool         { self.positions.is_empty() }
    pub fn positions(&self)  -> &[Vec3]      { &self.positions }
    pub fn velocities(&self) -> &[Vec3]      { &self.velocities }
    pub fn params(&self)     -> &FieldParams { &self.params }

    /// True when no position or velocity component is NaN or infinite.
    pub fn all_finite(&self) -> bool {
        self.positions.iter().chain(&self.velocities).all(|v| v.is_finite())
    }

    /// Advance every particle by one frame under the given control point.
    pub fn step(&mut self, control: Vec3) {
        let p = self.params;
        for (pos, vel) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            // Kick first; damping and the origin spring act on the kicked velocity.
            *vel += p.repulsion(*pos - control);
            *vel *= p.damping;
            *vel -= *pos * p.restoring;
            *pos += *vel;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn single(pos: Vec3) -> ParticleField {
        ParticleField::from_positions(vec![pos], FieldParams::default())
    }

    #[test]
    fn new_scatters_inside_cube_at_rest() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let f = ParticleField::new(5000, 10.0, FieldParams::default(), &mut rng);
        assert_eq!(f.len(), 5000);
        assert!(f.positions().iter().all(|p| p.abs().max_element() <= 10.0));
        assert!(f.velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn same_seed_same_field() {
        let a = ParticleField::new(64, 10.0, FieldParams::default(), &mut ChaCha8Rng::seed_from_u64(3));
        let b = ParticleField::new(64, 10.0, FieldParams::default(), &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn zero_extent_collapses_to_origin() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let f = ParticleField::new(10, 0.0, FieldParams::default(), &mut rng);
        assert!(f.positions().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn repulsion_vanishes_at_radius() {
        let p = FieldParams::default();
        assert_eq!(p.repulsion(Vec3::new(6.0, 0.0, 0.0)), Vec3::ZERO);
        assert_eq!(p.repulsion(Vec3::new(0.0, 9.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn repulsion_zero_distance_guarded() {
        let p = FieldParams::default();
        assert_eq!(p.repulsion(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn repulsion_points_away_from_control() {
        let p = FieldParams::default();
        let k = p.repulsion(Vec3::new(0.0, -3.0, 0.0));
        assert!((k - Vec3::new(0.0, -0.25, 0.0)).length() < 1e-6);
    }

    #[test]
    fn single_step_kicks_before_damping() {
        // kick 0.25 → damped 0.2375 → spring −0.015 → v = 0.2225
        let mut f = single(Vec3::new(3.0, 0.0, 0.0));
        f.step(Vec3::ZERO);
        assert!((f.velocities()[0].x - 0.2225).abs() < 1e-6);
        assert!((f.positions()[0].x - 3.2225).abs() < 1e-6);
    }

    #[test]
    fn positions_stay_finite_with_control_on_particle() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut f = ParticleField::new(500, 10.0, FieldParams::default(), &mut rng);
        let control = f.positions()[0];
        for _ in 0..1000 {
            f.step(control);
            assert!(f.all_finite());
        }
    }

    #[test]
    fn origin_equilibrium_holds() {
        let mut f = ParticleField::from_positions(vec![Vec3::ZERO; 100], FieldParams::default());
        for _ in 0..1000 { f.step(Vec3::ZERO); }
        assert!(f.positions().iter().all(|p| *p == Vec3::ZERO));
        assert!(f.velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn far_control_only_restores() {
        let mut f = single(Vec3::new(5.0, -2.0, 1.0));
        let control = Vec3::new(100.0, 0.0, 0.0);
        for _ in 0..2000 { f.step(control); }
        assert!(f.positions()[0].length() < 1e-3);
        assert!(f.velocities()[0].length() < 1e-3);
    }

    #[test]
    fn pushed_particle_does_not_return_to_shell() {
        let control = Vec3::new(20.0, 0.0, 0.0);
        let radius  = FieldParams::default().influence_radius;
        let mut f = single(Vec3::new(16.0, 0.0, 0.0));

        let mut exited = false;
        for _ in 0..2000 {
            f.step(control);
            let dist = (f.positions()[0] - control).length();
            if dist >= radius {
                exited = true;
            } else {
                assert!(!exited, "particle re-entered the influence radius");
            }
        }
        assert!(exited);
        assert!(f.positions()[0].length() < 1e-3);
        assert!(f.velocities()[0].length() < 1e-3);
    }

    #[test]
    fn active_control_clears_a_hole() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut f = ParticleField::new(2000, 10.0, FieldParams::default(), &mut rng);
        for _ in 0..600 { f.step(Vec3::ZERO); }
        assert!(f.all_finite());
        // Everything settles outside a shell around the control point,
        // well away from the centre.
        let min = f.positions().iter().map(|p| p.length()).fold(f32::MAX, f32::min);
        assert!(min > 1.0, "closest particle at {}", min);
    }
}
