//! Scene orchestration
//!
//! Composes the optional motion and particle layers, owns their frame clocks
//! and turns shell events into engine calls.

use super::bounds::Bounds;
use super::clock::FrameClock;
use super::motion::{Facing, MotionController, SpriteState};
use super::particles::{ParticleEngine, ParticleFrame};
use crate::tuning::Tuning;

/// Discrete input from the shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// Start button
    Start,
    /// Pause button
    Pause,
    /// Reset button
    Reset,
    /// Space bar
    Toggle,
    /// Arrow keys
    Nudge(Facing),
    /// Pointer down on the sprite
    Press,
    /// Click at a surface position (confetti)
    Burst { x: f32, y: f32 },
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// `None` when the scene has no sprite layer
    pub sprite: Option<SpriteState>,
    /// `None` when particles are disabled
    pub particles: Option<ParticleFrame<'a>>,
}

/// The sprite and particle layers driven by one frame cadence
#[derive(Debug, Clone)]
pub struct Scene {
    motion: Option<MotionController>,
    particles: Option<ParticleEngine>,
    motion_clock: FrameClock,
    particle_clock: FrameClock,
    max_frame_dt: f32,
}

impl Scene {
    /// Build a scene with a stopped sprite resting on the floor
    pub fn new(tuning: &Tuning, bounds: &Bounds, seed: u64) -> Self {
        let particles = tuning
            .layers
            .particles
            .then(|| ParticleEngine::new(&tuning.particles, seed));
        Self {
            motion: Some(MotionController::new(tuning, bounds)),
            particles,
            motion_clock: FrameClock::new(),
            particle_clock: FrameClock::new(),
            max_frame_dt: tuning.max_frame_dt,
        }
    }

    /// Drop the sprite layer (e.g. the shell found no sprite element)
    pub fn without_motion(mut self) -> Self {
        self.motion = None;
        self
    }

    pub fn motion(&self) -> Option<&MotionController> {
        self.motion.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleEngine> {
        self.particles.as_ref()
    }

    pub fn is_motion_running(&self) -> bool {
        self.motion.as_ref().is_some_and(|m| m.is_running())
    }

    /// Whether the shell should schedule another frame
    pub fn wants_frame(&self) -> bool {
        self.is_motion_running() || self.particles.is_some()
    }

    /// Apply one input event. Missing layers ignore their events.
    pub fn handle(&mut self, event: SceneEvent, bounds: &Bounds) {
        let was_running = self.is_motion_running();

        match event {
            SceneEvent::Burst { x, y } => {
                if let Some(particles) = self.particles.as_mut() {
                    particles.spawn_default_burst(x, y);
                }
            }
            _ => {
                let Some(motion) = self.motion.as_mut() else {
                    return;
                };
                match event {
                    SceneEvent::Start => motion.start(),
                    SceneEvent::Pause => motion.stop(),
                    SceneEvent::Reset => motion.reset(bounds),
                    SceneEvent::Toggle => motion.toggle(),
                    SceneEvent::Nudge(facing) => motion.nudge(facing, bounds),
                    SceneEvent::Press => motion.trigger_bounce(),
                    SceneEvent::Burst { .. } => {}
                }
            }
        }

        // A fresh run never inherits the timestamp of the previous one
        if was_running != self.is_motion_running() {
            self.motion_clock.reset();
        }
    }

    /// Container or sprite size changed
    pub fn on_resize(&mut self, bounds: &Bounds) {
        if let Some(motion) = self.motion.as_mut() {
            motion.on_resize(bounds);
        }
    }

    /// Advance every layer to `now_ms` and return the frame to draw
    pub fn frame(&mut self, now_ms: f64, bounds: &Bounds, speed_multiplier: f32) -> Frame<'_> {
        let max_dt = self.max_frame_dt;

        let sprite = match self.motion.as_mut() {
            Some(motion) if motion.is_running() => {
                let dt = self.motion_clock.tick(now_ms).min(max_dt);
                Some(motion.step(dt, bounds, speed_multiplier))
            }
            Some(motion) => {
                self.motion_clock.reset();
                Some(*motion.state())
            }
            None => None,
        };

        let particles = match self.particles.as_mut() {
            Some(engine) => {
                let dt = self.particle_clock.tick(now_ms).min(max_dt);
                Some(engine.step(dt, bounds))
            }
            None => None,
        };

        Frame { sprite, particles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::motion::RunState;

    fn bounds() -> Bounds {
        Bounds::new(400.0, 300.0, 20.0, 20.0)
    }

    fn motion_only() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.layers.particles = false;
        tuning
    }

    #[test]
    fn test_default_scene() {
        let scene = Scene::new(&Tuning::default(), &bounds(), 7);
        assert!(scene.wants_frame());
        assert!(!scene.is_motion_running());
        assert!(scene.particles().is_some());
        assert_eq!(scene.motion().unwrap().state().pos.y, 280.0);
    }

    #[test]
    fn test_start_pause_drive_scheduling() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        assert!(!scene.wants_frame());
        scene.handle(SceneEvent::Start, &b);
        assert!(scene.wants_frame());
        scene.handle(SceneEvent::Pause, &b);
        assert!(!scene.wants_frame());
        scene.handle(SceneEvent::Toggle, &b);
        assert!(scene.wants_frame());
    }

    #[test]
    fn test_first_frame_after_start_has_zero_dt() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Start, &b);

        let first = scene.frame(1000.0, &b, 1.0).sprite.unwrap();
        assert_eq!(first.pos.x, 0.0);

        let second = scene.frame(1016.0, &b, 1.0).sprite.unwrap();
        assert!((second.pos.x - 0.96).abs() < 1e-4);
    }

    #[test]
    fn test_long_frames_are_capped() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Start, &b);
        scene.frame(0.0, &b, 1.0);
        let s = scene.frame(1000.0, &b, 1.0).sprite.unwrap();
        assert!((s.pos.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_restart_ignores_paused_gap() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Start, &b);
        scene.frame(0.0, &b, 1.0);
        let x = scene.frame(16.0, &b, 1.0).sprite.unwrap().pos.x;

        scene.handle(SceneEvent::Pause, &b);
        scene.handle(SceneEvent::Start, &b);
        let resumed = scene.frame(600_000.0, &b, 1.0).sprite.unwrap();
        assert_eq!(resumed.pos.x, x);
    }

    #[test]
    fn test_idle_frames_do_not_move_sprite() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        let a = scene.frame(0.0, &b, 1.0).sprite.unwrap();
        let c = scene.frame(5000.0, &b, 1.0).sprite.unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_press_while_paused_stops_scheduling_once_settled() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Press, &b);
        assert!(scene.wants_frame());

        let mut now = 0.0;
        let mut frames = 0;
        while scene.wants_frame() {
            let s = scene.frame(now, &b, 1.0).sprite.unwrap();
            assert_eq!(s.pos.x, 0.0);
            now += 16.0;
            frames += 1;
            assert!(frames < 2000, "bounce never settled");
        }
        let s = scene.motion().unwrap().state();
        assert_eq!(s.run, RunState::Idle);
        assert_eq!(s.vy, 0.0);
        assert_eq!(s.pos.y, 280.0);
    }

    #[test]
    fn test_burst_event() {
        let b = bounds();
        let mut scene = Scene::new(&Tuning::default(), &b, 7);
        scene.handle(SceneEvent::Burst { x: 10.0, y: 290.0 }, &b);
        assert_eq!(scene.particles().unwrap().confetti().len(), 26);

        let frame = scene.frame(0.0, &b, 1.0);
        let particles = frame.particles.unwrap();
        assert_eq!(particles.confetti.len(), 26);
        assert_eq!(particles.ambient.len(), 28);
    }

    #[test]
    fn test_missing_layers_are_noops() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Burst { x: 10.0, y: 10.0 }, &b);
        assert!(scene.particles().is_none());
        assert!(scene.frame(0.0, &b, 1.0).particles.is_none());

        let mut scene = Scene::new(&Tuning::default(), &b, 7).without_motion();
        scene.handle(SceneEvent::Press, &b);
        scene.handle(SceneEvent::Start, &b);
        scene.on_resize(&b);
        assert!(!scene.is_motion_running());
        let frame = scene.frame(0.0, &b, 1.0);
        assert!(frame.sprite.is_none());
        assert!(frame.particles.is_some());
    }

    #[test]
    fn test_unsized_surface() {
        let empty = Bounds::default();
        let mut scene = Scene::new(&Tuning::default(), &empty, 7);
        scene.handle(SceneEvent::Start, &empty);
        scene.handle(SceneEvent::Press, &empty);
        for i in 0..10 {
            let frame = scene.frame(i as f64 * 16.0, &empty, 1.0);
            let s = frame.sprite.unwrap();
            assert_eq!(s.pos, glam::Vec2::ZERO);
            assert!(frame.particles.unwrap().ambient.is_empty());
        }
    }

    #[test]
    fn test_resize_and_reset() {
        let b = bounds();
        let mut scene = Scene::new(&motion_only(), &b, 7);
        scene.handle(SceneEvent::Start, &b);
        scene.frame(0.0, &b, 1.0);
        for i in 1..200 {
            scene.frame(i as f64 * 100.0, &b, 3.0);
        }

        let small = Bounds::new(50.0, 40.0, 20.0, 20.0);
        scene.on_resize(&small);
        let s = scene.motion().unwrap().state();
        assert!(s.pos.x <= 30.0 && s.pos.y <= 20.0);

        scene.handle(SceneEvent::Reset, &small);
        let s = scene.motion().unwrap().state();
        assert_eq!(s.pos, glam::Vec2::new(0.0, 20.0));
        assert!(!scene.wants_frame());
    }
}
