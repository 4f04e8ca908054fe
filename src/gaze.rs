//! Pupil placement for the sprite's eyes
//!
//! Pure geometry; the shell measures the eye elements and applies the offset
//! as a CSS transform.

use glam::Vec2;

/// Largest pupil offset as a fraction of eye width
pub const MAX_PUPIL_OFFSET: f32 = 0.22;

/// Offset of a pupil from its eye centre so that it looks toward `pointer`.
///
/// The pupil moves straight toward the pointer but never further than
/// `MAX_PUPIL_OFFSET * eye_width`, which keeps it inside the eye.
pub fn pupil_offset(eye_center: Vec2, eye_width: f32, pointer: Vec2) -> Vec2 {
    let delta = pointer - eye_center;
    let max_offset = (eye_width * MAX_PUPIL_OFFSET).max(0.0);
    if !delta.is_finite() || !max_offset.is_finite() {
        return Vec2::ZERO;
    }
    delta.clamp_length_max(max_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_pointer_is_followed_exactly() {
        let offset = pupil_offset(Vec2::new(50.0, 50.0), 100.0, Vec2::new(53.0, 54.0));
        assert!((offset - Vec2::new(3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_far_pointer_is_clamped() {
        let offset = pupil_offset(Vec2::ZERO, 100.0, Vec2::new(0.0, -500.0));
        assert!((offset - Vec2::new(0.0, -22.0)).length() < 1e-4);
    }

    #[test]
    fn test_centered_pointer() {
        assert_eq!(pupil_offset(Vec2::ONE, 40.0, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(pupil_offset(Vec2::ZERO, 0.0, Vec2::new(10.0, 0.0)), Vec2::ZERO);
        assert_eq!(
            pupil_offset(Vec2::ZERO, 40.0, Vec2::new(f32::NAN, 0.0)),
            Vec2::ZERO
        );
    }
}
