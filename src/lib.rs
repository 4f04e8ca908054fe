//! Patrol Playground - a patrolling, bouncing sprite over a particle backdrop
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (sprite motion, particles, scene orchestration)
//! - `tuning`: Data-driven physics and effect parameters
//! - `gaze`: Pupil placement for the eye decoration

pub mod gaze;
pub mod sim;
pub mod tuning;

pub use tuning::{Layers, MotionTuning, ParticleTuning, Tuning, TuningError};

/// Simulation configuration constants
pub mod consts {
    /// Reference display rate that particle velocities are expressed against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest frame delta the scene will feed the engines (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Horizontal patrol speed at multiplier 1 (px/s)
    pub const BASE_SPEED: f32 = 60.0;
    /// Downward acceleration on the sprite (px/s²)
    pub const GRAVITY: f32 = 1400.0;
    /// Fraction of impact speed kept after a floor bounce
    pub const BOUNCE_FACTOR: f32 = 0.6;
    /// Impact speeds at or below this settle instead of bouncing (px/s)
    pub const RESTITUTION_THRESHOLD: f32 = 80.0;
    /// Upward launch speed on press (px/s)
    pub const JUMP_POWER: f32 = 520.0;
    /// Scale easing rate (larger => faster return to target)
    pub const SCALE_EASING: f32 = 10.0;
    /// Scale applied the moment the sprite is pressed
    pub const PRESS_SCALE: f32 = 1.08;
    /// Arrow-key nudge distance (px)
    pub const NUDGE_STEP: f32 = 10.0;
    /// Floor distance and |vy| under which a bounce counts as settled
    pub const SETTLE_EPSILON: f32 = 1e-3;

    /// Ambient particle population
    pub const AMBIENT_COUNT: usize = 28;
    /// Confetti pieces per click
    pub const BURST_SIZE: usize = 26;
}

/// Replace NaN/negative time deltas with zero
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}
