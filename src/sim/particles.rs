//! Particle effects: a rising ambient mist and click-triggered confetti
//!
//! Velocities are expressed per reference frame (1/60 s); a step converts its
//! `dt` into reference frames so the look is the same at any display rate.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;
use crate::consts::REFERENCE_FPS;
use crate::sanitize_dt;
use crate::tuning::ParticleTuning;

/// Confetti colours (0xRRGGBB)
pub const CONFETTI_PALETTE: [u32; 6] = [0xe74c3c, 0xf39c12, 0xf1c40f, 0x2ecc71, 0x3498db, 0x9b59b6];

/// Confetti launch speed range (px/frame)
const LAUNCH_SPEED_MIN: f32 = 1.4;
const LAUNCH_SPEED_MAX: f32 = 5.0;
/// Upward bias added to every launch (px/frame)
const LAUNCH_LIFT: f32 = 2.0;
/// Confetti lifetime range (frames)
const LIFE_MIN: f32 = 60.0;
const LIFE_MAX: f32 = 100.0;

/// A background mist particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

/// A single piece of confetti
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfettiPiece {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Palette colour (0xRRGGBB)
    pub color: u32,
    pub rotation: f32,
    /// Remaining life in reference frames
    pub life: f32,
}

/// Read-only view of both populations for the renderer
#[derive(Debug, Clone, Copy)]
pub struct ParticleFrame<'a> {
    pub ambient: &'a [AmbientParticle],
    pub confetti: &'a [ConfettiPiece],
}

/// Owns and advances both particle populations
#[derive(Debug, Clone)]
pub struct ParticleEngine {
    ambient: Vec<AmbientParticle>,
    confetti: Vec<ConfettiPiece>,
    rng: Pcg32,
    tuning: ParticleTuning,
}

impl ParticleEngine {
    /// Create an empty engine. The ambient population is scattered over the
    /// surface on the first step that sees non-empty bounds.
    pub fn new(tuning: &ParticleTuning, seed: u64) -> Self {
        Self {
            ambient: Vec::with_capacity(tuning.ambient_count),
            confetti: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            tuning: *tuning,
        }
    }

    pub fn ambient(&self) -> &[AmbientParticle] {
        &self.ambient
    }

    pub fn confetti(&self) -> &[ConfettiPiece] {
        &self.confetti
    }

    pub fn frame(&self) -> ParticleFrame<'_> {
        ParticleFrame {
            ambient: &self.ambient,
            confetti: &self.confetti,
        }
    }

    /// Advance both populations by `dt` seconds.
    ///
    /// Does nothing until the surface has a size.
    pub fn step(&mut self, dt: f32, bounds: &Bounds) -> ParticleFrame<'_> {
        if bounds.is_empty() {
            return self.frame();
        }
        let bounds = bounds.normalized();
        if self.ambient.is_empty() {
            self.scatter_ambient(&bounds);
        }

        let frames = (sanitize_dt(dt) * REFERENCE_FPS).min(self.tuning.max_frames_per_step);
        self.step_ambient(frames, &bounds);
        self.step_confetti(frames, &bounds);
        self.frame()
    }

    /// Launch `count` confetti pieces from (x, y)
    pub fn spawn_burst(&mut self, x: f32, y: f32, count: usize) {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Ignoring confetti burst at non-finite position");
            return;
        }
        let origin = Vec2::new(x, y);
        self.confetti.reserve(count);
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(LAUNCH_SPEED_MIN..LAUNCH_SPEED_MAX);
            let color = CONFETTI_PALETTE[self.rng.random_range(0..CONFETTI_PALETTE.len())];
            self.confetti.push(ConfettiPiece {
                pos: origin,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - LAUNCH_LIFT),
                size: self.rng.random_range(4.0..12.0),
                color,
                rotation: self.rng.random_range(0.0..TAU),
                life: self.rng.random_range(LIFE_MIN..LIFE_MAX),
            });
        }
        log::debug!("Confetti burst of {} at ({:.0}, {:.0})", count, x, y);
    }

    /// Burst using the configured default size
    pub fn spawn_default_burst(&mut self, x: f32, y: f32) {
        self.spawn_burst(x, y, self.tuning.burst_size);
    }

    fn scatter_ambient(&mut self, bounds: &Bounds) {
        let rng = &mut self.rng;
        self.ambient.extend((0..self.tuning.ambient_count).map(|_| AmbientParticle {
            pos: Vec2::new(
                rng.random_range(0.0..bounds.width),
                rng.random_range(0.0..bounds.height),
            ),
            vel: Vec2::new(rng.random_range(-0.1..0.1), rng.random_range(-0.4..-0.1)),
            radius: rng.random_range(2.0..7.0),
            alpha: rng.random_range(0.12..0.3),
        }));
        log::debug!("Scattered {} ambient particles", self.ambient.len());
    }

    fn step_ambient(&mut self, frames: f32, bounds: &Bounds) {
        let fade = self.tuning.ambient_fade.powf(frames);
        let margin = self.tuning.ambient_margin;
        let rng = &mut self.rng;
        let mut respawned = 0;

        for p in self.ambient.iter_mut() {
            p.pos += p.vel * frames;
            p.alpha *= fade;

            let above_top = p.pos.y + p.radius < 0.0;
            let off_side = p.pos.x < -margin || p.pos.x > bounds.width + margin;
            if above_top || off_side {
                *p = spawn_below(rng, bounds);
                respawned += 1;
            }
        }
        if respawned > 0 {
            log::trace!("Respawned {} ambient particles", respawned);
        }
    }

    fn step_confetti(&mut self, frames: f32, bounds: &Bounds) {
        let gravity = self.tuning.confetti_gravity;
        let drag = self.tuning.confetti_drag.powf(frames);
        let spin = self.tuning.confetti_spin;
        let floor = bounds.height + self.tuning.confetti_floor_margin;

        self.confetti.retain_mut(|c| {
            c.vel.y += gravity * frames;
            c.vel.x *= drag;
            c.pos += c.vel * frames;
            c.rotation += spin * frames;
            c.life -= frames;
            c.life > 0.0 && c.pos.y <= floor
        });
    }
}

/// Fresh ambient particle just below the bottom edge
fn spawn_below(rng: &mut Pcg32, bounds: &Bounds) -> AmbientParticle {
    AmbientParticle {
        pos: Vec2::new(
            rng.random_range(0.0..bounds.width),
            bounds.height + rng.random_range(8.0..48.0),
        ),
        vel: Vec2::new(rng.random_range(-0.15..0.15), rng.random_range(-0.4..-0.1)),
        radius: rng.random_range(2.0..7.0),
        alpha: rng.random_range(0.12..0.3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn engine() -> ParticleEngine {
        ParticleEngine::new(&ParticleTuning::default(), 42)
    }

    fn surface() -> Bounds {
        Bounds::new(800.0, 600.0, 40.0, 40.0)
    }

    #[test]
    fn test_unsized_surface_is_noop() {
        let mut e = engine();
        for _ in 0..10 {
            let frame = e.step(FRAME, &Bounds::default());
            assert!(frame.ambient.is_empty());
            assert!(frame.confetti.is_empty());
        }
    }

    #[test]
    fn test_first_sized_step_scatters_ambient() {
        let mut e = engine();
        let b = surface();
        let frame = e.step(0.0, &b);
        assert_eq!(frame.ambient.len(), 28);
        for p in frame.ambient {
            assert!(p.pos.x >= 0.0 && p.pos.x < b.width);
            assert!(p.pos.y >= 0.0 && p.pos.y < b.height);
            assert!(p.alpha >= 0.12 && p.alpha < 0.3);
        }
    }

    #[test]
    fn test_ambient_count_is_invariant() {
        let mut e = engine();
        let b = surface();
        for _ in 0..5000 {
            assert_eq!(e.step(FRAME, &b).ambient.len(), 28);
        }
        // Hitches are capped but still recycle
        for _ in 0..200 {
            assert_eq!(e.step(2.0, &b).ambient.len(), 28);
        }
    }

    #[test]
    fn test_ambient_fades_multiplicatively() {
        let mut e = engine();
        let b = surface();
        e.step(0.0, &b);
        let before: Vec<f32> = e.ambient().iter().map(|p| p.alpha).collect();
        e.step(FRAME, &b);
        for (p, a) in e.ambient().iter().zip(before) {
            assert!((p.alpha - a * 0.999).abs() < 1e-6);
        }
    }

    #[test]
    fn test_off_side_particles_respawn_below() {
        let mut e = engine();
        e.step(0.0, &surface());

        let narrow = Bounds::new(10.0, 600.0, 40.0, 40.0);
        let frame = e.step(0.0, &narrow);
        assert_eq!(frame.ambient.len(), 28);
        for p in frame.ambient {
            assert!(p.pos.x <= 30.0);
            if p.pos.x < 0.0 || p.pos.y > 600.0 {
                assert!(p.pos.y >= 608.0 && p.pos.y < 648.0);
            }
        }
    }

    #[test]
    fn test_burst_adds_exact_count() {
        let mut e = engine();
        let b = surface();
        e.step(FRAME, &b);
        e.spawn_burst(100.0, 200.0, 26);
        assert_eq!(e.confetti().len(), 26);
        e.spawn_default_burst(300.0, 200.0);
        assert_eq!(e.confetti().len(), 52);

        for c in &e.confetti()[..26] {
            assert_eq!(c.pos, Vec2::new(100.0, 200.0));
            let launch = (c.vel + Vec2::new(0.0, LAUNCH_LIFT)).length();
            assert!(launch >= LAUNCH_SPEED_MIN - 1e-4 && launch < LAUNCH_SPEED_MAX + 1e-4);
            assert!(CONFETTI_PALETTE.contains(&c.color));
            assert!(c.life >= LIFE_MIN && c.life < LIFE_MAX);
            assert!(c.size >= 4.0 && c.size < 12.0);
        }
    }

    #[test]
    fn test_burst_expires() {
        let mut e = engine();
        let b = Bounds::new(800.0, 100_000.0, 40.0, 40.0);
        e.spawn_burst(400.0, 300.0, 26);
        let mut last = e.confetti().len();
        for _ in 0..200 {
            let now = e.step(FRAME, &b).confetti.len();
            assert!(now <= last);
            last = now;
        }
        assert!(e.confetti().is_empty());
        assert_eq!(e.ambient().len(), 28);
    }

    #[test]
    fn test_confetti_below_surface_is_removed() {
        let mut e = engine();
        let b = surface();
        e.spawn_burst(400.0, 1600.0, 10);
        e.step(FRAME, &b);
        assert!(e.confetti().is_empty());
    }

    #[test]
    fn test_confetti_gravity_and_drag() {
        let mut e = engine();
        let b = Bounds::new(800.0, 100_000.0, 40.0, 40.0);
        e.spawn_burst(400.0, 300.0, 1);
        let before = e.confetti()[0];
        e.step(FRAME, &b);
        let after = e.confetti()[0];
        assert!(after.vel.y > before.vel.y);
        assert!(after.vel.x.abs() <= before.vel.x.abs());
        assert!(after.life < before.life);
        assert!(after.rotation > before.rotation);
    }

    #[test]
    fn test_burst_before_layout_survives_unsized_steps() {
        let mut e = engine();
        e.spawn_burst(10.0, 10.0, 26);
        e.step(FRAME, &Bounds::default());
        assert_eq!(e.confetti().len(), 26);
    }

    #[test]
    fn test_non_finite_burst_is_ignored() {
        let mut e = engine();
        e.spawn_burst(f32::NAN, 10.0, 26);
        assert!(e.confetti().is_empty());
    }

    #[test]
    fn test_seeded_engines_agree() {
        let b = surface();
        let mut a = engine();
        let mut c = engine();
        a.spawn_burst(50.0, 50.0, 26);
        c.spawn_burst(50.0, 50.0, 26);
        for _ in 0..120 {
            a.step(FRAME, &b);
            c.step(FRAME, &b);
        }
        assert_eq!(a.ambient(), c.ambient());
        assert_eq!(a.confetti(), c.confetti());
    }

    proptest! {
        #[test]
        fn prop_ambient_population_constant(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..0.5, 1.0f32..1200.0, 1.0f32..900.0), 1..150),
        ) {
            let tuning = ParticleTuning::default();
            let mut e = ParticleEngine::new(&tuning, seed);
            for (dt, w, h) in steps {
                let b = Bounds::new(w, h, 20.0, 20.0);
                prop_assert_eq!(e.step(dt, &b).ambient.len(), tuning.ambient_count);
            }
        }
    }
}
