//! Frame-driven simulation module
//!
//! Everything the shell renders is computed here. This module must stay free
//! of platform code:
//! - Time arrives as timestamps or `dt`, never read from a system clock
//! - Seeded RNG only
//! - Bad numeric input is clamped, never reported as an error

pub mod bounds;
pub mod clock;
pub mod motion;
pub mod particles;
pub mod scene;

pub use bounds::Bounds;
pub use clock::FrameClock;
pub use motion::{Facing, MotionController, NEUTRAL_SCALE, RunState, SpriteState, step_sprite};
pub use particles::{
    AmbientParticle, CONFETTI_PALETTE, ConfettiPiece, ParticleEngine, ParticleFrame,
};
pub use scene::{Frame, Scene, SceneEvent};
