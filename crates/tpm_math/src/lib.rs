// Re-export glam for convenience
pub use glam::*;

// TPM math helpers
mod rotation;
pub use rotation::{degrees_to_radians, radians_to_degrees};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec2_from_slice() {
        let v = Vec2::from_slice(&[0.25, 0.75]);
        assert_eq!(v, Vec2::new(0.25, 0.75));
    }
}
