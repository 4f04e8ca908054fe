//! Data-driven simulation tuning
//!
//! Every field has a default taken from `crate::consts`, so a JSON document
//! only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Optional simulation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layers {
    /// Gravity, floor bounces and press-to-jump
    pub vertical_physics: bool,
    /// Ambient backdrop and confetti
    pub particles: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            vertical_physics: true,
            particles: true,
        }
    }
}

/// Sprite motion parameters (px, seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub base_speed: f32,
    pub gravity: f32,
    pub bounce_factor: f32,
    pub restitution_threshold: f32,
    pub jump_power: f32,
    pub scale_easing: f32,
    pub press_scale: f32,
    pub nudge_step: f32,
    pub settle_epsilon: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            gravity: GRAVITY,
            bounce_factor: BOUNCE_FACTOR,
            restitution_threshold: RESTITUTION_THRESHOLD,
            jump_power: JUMP_POWER,
            scale_easing: SCALE_EASING,
            press_scale: PRESS_SCALE,
            nudge_step: NUDGE_STEP,
            settle_epsilon: SETTLE_EPSILON,
        }
    }
}

/// Particle parameters, expressed per reference frame (1/60 s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub ambient_count: usize,
    /// Horizontal slack before an ambient particle counts as off-surface
    pub ambient_margin: f32,
    /// Multiplicative alpha fade per frame
    pub ambient_fade: f32,
    pub burst_size: usize,
    pub confetti_gravity: f32,
    /// Multiplicative horizontal velocity decay per frame
    pub confetti_drag: f32,
    /// Rotation per frame (radians)
    pub confetti_spin: f32,
    /// How far below the bottom edge a piece may fall before removal
    pub confetti_floor_margin: f32,
    /// Upper bound on reference frames consumed by a single step
    pub max_frames_per_step: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            ambient_count: AMBIENT_COUNT,
            ambient_margin: 20.0,
            ambient_fade: 0.999,
            burst_size: BURST_SIZE,
            confetti_gravity: 0.12,
            confetti_drag: 0.99,
            confetti_spin: 0.2,
            confetti_floor_margin: 40.0,
            max_frames_per_step: 6.0,
        }
    }
}

/// Complete tuning for a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub motion: MotionTuning,
    pub particles: ParticleTuning,
    pub layers: Layers,
    /// Frame delta cap applied by the scene (seconds)
    pub max_frame_dt: f32,
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values outside their physical range
    pub fn validate(&self) -> Result<(), TuningError> {
        let m = &self.motion;
        let p = &self.particles;

        for (value, field) in [
            (m.base_speed, "motion.base_speed"),
            (m.gravity, "motion.gravity"),
            (m.bounce_factor, "motion.bounce_factor"),
            (m.restitution_threshold, "motion.restitution_threshold"),
            (m.jump_power, "motion.jump_power"),
            (m.scale_easing, "motion.scale_easing"),
            (m.press_scale, "motion.press_scale"),
            (m.nudge_step, "motion.nudge_step"),
            (m.settle_epsilon, "motion.settle_epsilon"),
            (p.ambient_margin, "particles.ambient_margin"),
            (p.ambient_fade, "particles.ambient_fade"),
            (p.confetti_gravity, "particles.confetti_gravity"),
            (p.confetti_drag, "particles.confetti_drag"),
            (p.confetti_spin, "particles.confetti_spin"),
            (p.confetti_floor_margin, "particles.confetti_floor_margin"),
            (p.max_frames_per_step, "particles.max_frames_per_step"),
            (self.max_frame_dt, "max_frame_dt"),
        ] {
            check(value.is_finite(), field, "must be finite")?;
        }

        check(m.base_speed >= 0.0, "motion.base_speed", "must be non-negative")?;
        check(m.gravity > 0.0, "motion.gravity", "must be positive")?;
        check(
            (0.0..1.0).contains(&m.bounce_factor),
            "motion.bounce_factor",
            "must be in [0, 1)",
        )?;
        check(
            m.restitution_threshold > 0.0,
            "motion.restitution_threshold",
            "must be positive",
        )?;
        check(m.jump_power >= 0.0, "motion.jump_power", "must be non-negative")?;
        check(m.scale_easing > 0.0, "motion.scale_easing", "must be positive")?;
        check(m.press_scale > 0.0, "motion.press_scale", "must be positive")?;
        check(m.nudge_step >= 0.0, "motion.nudge_step", "must be non-negative")?;
        check(
            m.settle_epsilon >= 0.0,
            "motion.settle_epsilon",
            "must be non-negative",
        )?;

        check(
            p.ambient_fade > 0.0 && p.ambient_fade <= 1.0,
            "particles.ambient_fade",
            "must be in (0, 1]",
        )?;
        check(
            p.confetti_drag > 0.0 && p.confetti_drag <= 1.0,
            "particles.confetti_drag",
            "must be in (0, 1]",
        )?;
        check(
            p.ambient_margin >= 0.0,
            "particles.ambient_margin",
            "must be non-negative",
        )?;
        check(
            p.confetti_floor_margin >= 0.0,
            "particles.confetti_floor_margin",
            "must be non-negative",
        )?;
        check(
            p.max_frames_per_step > 0.0,
            "particles.max_frames_per_step",
            "must be positive",
        )?;

        check(self.max_frame_dt > 0.0, "max_frame_dt", "must be positive")?;
        Ok(())
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            motion: MotionTuning::default(),
            particles: ParticleTuning::default(),
            layers: Layers::default(),
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::Invalid { field, reason })
    }
}
