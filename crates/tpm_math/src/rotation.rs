// Euler rotation unit conversion
//
// TPM files store rotations as XYZ Euler angles in degrees, while everything
// in memory works in radians. Both directions go through these helpers so the
// conversion happens exactly once at each edge.

use glam::Vec3;

/// Convert an Euler rotation from degrees to radians, component-wise.
pub fn degrees_to_radians(degrees: Vec3) -> Vec3 {
    Vec3::new(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Convert an Euler rotation from radians to degrees, component-wise.
pub fn radians_to_degrees(radians: Vec3) -> Vec3 {
    Vec3::new(
        radians.x.to_degrees(),
        radians.y.to_degrees(),
        radians.z.to_degrees(),
    )
}
