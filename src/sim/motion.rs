//! Sprite motion controller
//!
//! Horizontal patrol between the surface edges, vertical projectile motion
//! with damped floor bounces, scale easing, and the press-while-paused
//! bounce episode.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;
use crate::sanitize_dt;
use crate::tuning::{MotionTuning, Tuning};

/// Resting scale the sprite eases back to
pub const NEUTRAL_SCALE: f32 = 1.0;

/// Horizontal travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Toward increasing x
    #[default]
    Forward,
    /// Toward decreasing x
    Reverse,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Forward => 1.0,
            Facing::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Forward => Facing::Reverse,
            Facing::Reverse => Facing::Forward,
        }
    }
}

/// Whether the sprite advances on a step, and why
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Stopped; steps leave the sprite untouched
    #[default]
    Idle,
    /// Started by the user; full horizontal and vertical motion
    Patrolling,
    /// Pressed while idle. Runs with horizontal motion locked until the
    /// bounce settles on the floor, then drops back to `Idle`.
    BouncingWhilePaused,
}

impl RunState {
    pub fn is_running(self) -> bool {
        !matches!(self, RunState::Idle)
    }

    pub fn horizontal_locked(self) -> bool {
        matches!(self, RunState::BouncingWhilePaused)
    }
}

/// Kinematic state of the sprite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteState {
    /// Top-left corner within the surface (px, y grows downward)
    pub pos: Vec2,
    /// Vertical velocity (px/s, positive is downward)
    pub vy: f32,
    pub scale: f32,
    pub scale_target: f32,
    pub facing: Facing,
    pub run: RunState,
}

impl SpriteState {
    /// Stopped at the left edge, resting on the floor
    pub fn resting(bounds: &Bounds) -> Self {
        Self {
            pos: Vec2::new(0.0, bounds.floor_y()),
            vy: 0.0,
            scale: NEUTRAL_SCALE,
            scale_target: NEUTRAL_SCALE,
            facing: Facing::Forward,
            run: RunState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    /// Centre of the sprite's box
    pub fn center(&self, bounds: &Bounds) -> Vec2 {
        self.pos + Vec2::new(bounds.sprite_width, bounds.sprite_height) * 0.5
    }

    /// On the floor with (near) zero vertical velocity
    pub fn is_settled(&self, bounds: &Bounds, epsilon: f32) -> bool {
        (bounds.floor_y() - self.pos.y).abs() <= epsilon && self.vy.abs() <= epsilon
    }
}

/// Advance the sprite by `dt` seconds.
///
/// Idle sprites are returned unchanged. `vertical_physics` switches gravity
/// and floor bounces on or off; horizontal patrol and scale easing always run.
pub fn step_sprite(
    mut state: SpriteState,
    dt: f32,
    bounds: &Bounds,
    speed_multiplier: f32,
    tuning: &MotionTuning,
    vertical_physics: bool,
) -> SpriteState {
    if !state.is_running() {
        return state;
    }

    let dt = sanitize_dt(dt);
    let speed = sanitize_speed(speed_multiplier);
    let max_x = bounds.max_x();
    let floor_y = bounds.floor_y();

    // Horizontal patrol
    if !state.run.horizontal_locked() {
        state.pos.x += tuning.base_speed * speed * state.facing.sign() * dt;
    }
    if state.pos.x.is_nan() || state.pos.x <= 0.0 {
        state.pos.x = 0.0;
        state.facing = Facing::Forward;
    } else if state.pos.x >= max_x {
        state.pos.x = max_x;
        state.facing = Facing::Reverse;
    }

    // Vertical projectile motion
    if vertical_physics {
        state.vy += tuning.gravity * dt;
        state.pos.y += state.vy * dt;

        if state.pos.y >= floor_y {
            state.pos.y = floor_y;
            // Only downward motion is an impact; a sprite launched from the
            // floor is still on it for a zero-length tick.
            if state.vy > 0.0 {
                if state.vy > tuning.restitution_threshold {
                    state.vy = -state.vy * tuning.bounce_factor;
                } else {
                    state.vy = 0.0;
                }
            }
        } else if state.pos.y <= 0.0 {
            state.pos.y = 0.0;
            state.vy = state.vy.max(0.0);
        }

        if state.run == RunState::BouncingWhilePaused
            && state.is_settled(bounds, tuning.settle_epsilon)
        {
            state.pos.y = floor_y;
            state.vy = 0.0;
            state.run = RunState::Idle;
            log::debug!("Bounce settled, returning to idle");
        }
    }

    // Scale easing (never overshoots, even on long frames)
    let k = (tuning.scale_easing * dt).min(1.0);
    state.scale += (state.scale_target - state.scale) * k;

    state.pos = bounds.clamp_sprite(state.pos);
    state
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() { speed.max(0.0) } else { 0.0 }
}

/// Owns the sprite state and applies input commands to it
#[derive(Debug, Clone)]
pub struct MotionController {
    state: SpriteState,
    tuning: MotionTuning,
    vertical_physics: bool,
}

impl MotionController {
    /// Create a stopped sprite resting on the floor
    pub fn new(tuning: &Tuning, bounds: &Bounds) -> Self {
        Self {
            state: SpriteState::resting(bounds),
            tuning: tuning.motion,
            vertical_physics: tuning.layers.vertical_physics,
        }
    }

    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Advance one frame and return the new state
    pub fn step(&mut self, dt: f32, bounds: &Bounds, speed_multiplier: f32) -> SpriteState {
        self.state = step_sprite(
            self.state,
            dt,
            bounds,
            speed_multiplier,
            &self.tuning,
            self.vertical_physics,
        );
        self.state
    }

    /// Begin patrolling. An explicit start also takes over a bounce episode,
    /// so the sprite keeps running once it lands.
    pub fn start(&mut self) {
        if self.state.run != RunState::Patrolling {
            log::debug!("Motion started (was {:?})", self.state.run);
            self.state.run = RunState::Patrolling;
        }
    }

    pub fn stop(&mut self) {
        if self.state.is_running() {
            log::debug!("Motion stopped (was {:?})", self.state.run);
            self.state.run = RunState::Idle;
        }
    }

    /// Start if stopped, stop if running
    pub fn toggle(&mut self) {
        if self.state.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Stop and return to the left edge, resting on the floor
    pub fn reset(&mut self, bounds: &Bounds) {
        self.state = SpriteState::resting(bounds);
        log::debug!("Motion reset");
    }

    /// Re-clamp into new bounds; velocity and facing are untouched
    pub fn on_resize(&mut self, bounds: &Bounds) {
        self.state.pos = bounds.clamp_sprite(self.state.pos);
    }

    /// Step the sprite sideways by the nudge distance and face that way
    pub fn nudge(&mut self, facing: Facing, bounds: &Bounds) {
        self.state.facing = facing;
        self.state.pos.x += facing.sign() * self.tuning.nudge_step;
        self.state.pos = bounds.clamp_sprite(self.state.pos);
    }

    /// Press on the sprite: jump, turn around and squash.
    ///
    /// Pressing while idle runs the sprite until the jump settles, then
    /// stops it again. Pressing while running leaves the run state alone.
    pub fn trigger_bounce(&mut self) {
        if !self.vertical_physics {
            self.state.facing = self.state.facing.flipped();
            if self.state.is_running() {
                self.kick_scale();
            }
            return;
        }

        if self.state.run == RunState::Idle {
            self.state.run = RunState::BouncingWhilePaused;
            log::debug!("Bounce while paused, running until settled");
        }
        self.state.vy = -self.tuning.jump_power;
        self.state.facing = self.state.facing.flipped();
        self.kick_scale();
    }

    fn kick_scale(&mut self) {
        self.state.scale = self.tuning.press_scale;
        self.state.scale_target = NEUTRAL_SCALE;
    }
}
