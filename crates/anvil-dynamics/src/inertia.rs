//! Inertia tensor constructors for common solids.
//!
//! All tensors are about the centre of mass, in body-local coordinates,
//! in kg·m².

use nalgebra::{Matrix3, Vector3};

/// Inertia tensor of a solid sphere: `I = (2/5) m r²` on each axis.
#[must_use]
pub fn solid_sphere(mass: f64, radius: f64) -> Matrix3<f64> {
    let i = 0.4 * mass * radius * radius;
    Matrix3::from_diagonal(&Vector3::new(i, i, i))
}

/// Inertia tensor of a solid cuboid with the given half-extents.
///
/// For full dimensions (x, y, z):
/// - Ixx = (1/12) m (y² + z²)
/// - Iyy = (1/12) m (x² + z²)
/// - Izz = (1/12) m (x² + y²)
#[must_use]
pub fn solid_cuboid(mass: f64, half_extents: Vector3<f64>) -> Matrix3<f64> {
    let x2 = 4.0 * half_extents.x * half_extents.x;
    let y2 = 4.0 * half_extents.y * half_extents.y;
    let z2 = 4.0 * half_extents.z * half_extents.z;

    Matrix3::from_diagonal(&Vector3::new(
        mass * (y2 + z2) / 12.0,
        mass * (x2 + z2) / 12.0,
        mass * (x2 + y2) / 12.0,
    ))
}

/// Inertia tensor of a solid cylinder aligned with the local Y axis.
///
/// - Ixx = Izz = (1/12) m (3r² + h²)
/// - Iyy = (1/2) m r²
#[must_use]
pub fn solid_cylinder(mass: f64, radius: f64, half_height: f64) -> Matrix3<f64> {
    let r2 = radius * radius;
    let h2 = 4.0 * half_height * half_height;

    let lateral = mass * (3.0 * r2 + h2) / 12.0;
    let axial = 0.5 * mass * r2;
    Matrix3::from_diagonal(&Vector3::new(lateral, axial, lateral))
}
