//! Variable-timestep frame clock

/// Converts animation-frame timestamps into elapsed seconds.
///
/// The first tick after construction or [`FrameClock::reset`] only records a
/// baseline and reports zero, so a loop that was stopped for a while never
/// sees the idle gap as one huge step.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick (0 on the first tick)
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        crate::sanitize_dt(dt)
    }

    /// Forget the baseline; the next tick starts fresh
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn has_baseline(&self) -> bool {
        self.last_ms.is_some()
    }
}
