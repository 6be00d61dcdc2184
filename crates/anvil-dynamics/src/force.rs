//! Force generators and the explicit force registry.
//!
//! Generators are a closed tagged union rather than trait objects, so the
//! set of force kinds is known at compile time and dispatch is a plain
//! `match`. The registry is an ordinary value owned by the stepping driver;
//! there is no process-wide registry.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::body::{BodyHandle, BodySet};

/// A per-step force applied to one registered body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForceGenerator {
    /// Constant gravitational pull. Skips infinite-mass bodies.
    Gravity {
        /// Gravitational acceleration (m/s²).
        gravity: Vector3<f64>,
    },
    /// A spring anchored between a local point on the target body and a
    /// local point on another body.
    Spring {
        /// Connection point in the target body's local space.
        connection_point: Point3<f64>,
        /// The body at the other end of the spring.
        other: BodyHandle,
        /// Connection point in the other body's local space.
        other_connection_point: Point3<f64>,
        /// Spring constant (N/m).
        spring_constant: f64,
        /// Rest length of the spring (m).
        rest_length: f64,
    },
    /// Buoyancy against a horizontal water plane at `water_height` (Y up).
    Buoyancy {
        /// Centre of buoyancy in the target body's local space.
        centre_of_buoyancy: Point3<f64>,
        /// Submersion depth at which buoyancy saturates (m).
        max_depth: f64,
        /// Displaced volume when fully submerged (m³).
        volume: f64,
        /// Height of the water plane (m).
        water_height: f64,
        /// Density of the liquid (kg/m³).
        liquid_density: f64,
    },
}

impl ForceGenerator {
    /// Apply this generator's force to `target` for the coming step.
    pub fn update_force(&self, bodies: &mut BodySet, target: BodyHandle, _dt: f64) {
        match *self {
            Self::Gravity { gravity } => {
                let Some(body) = bodies.get_mut(target) else {
                    return;
                };
                if !body.has_finite_mass() {
                    return;
                }
                let mass = body.mass();
                body.add_force(gravity * mass);
            }
            Self::Spring {
                connection_point,
                other,
                other_connection_point,
                spring_constant,
                rest_length,
            } => {
                let Some(other_body) = bodies.get(other) else {
                    return;
                };
                let other_end = other_body.point_in_world_space(&other_connection_point);
                let Some(body) = bodies.get_mut(target) else {
                    return;
                };
                let this_end = body.point_in_world_space(&connection_point);

                let axis = this_end - other_end;
                let length = axis.norm();
                if length < 1e-12 {
                    return;
                }
                let magnitude = spring_constant * (length - rest_length);
                body.add_force_at_point(axis * (-magnitude / length), this_end);
            }
            Self::Buoyancy {
                centre_of_buoyancy,
                max_depth,
                volume,
                water_height,
                liquid_density,
            } => {
                let Some(body) = bodies.get_mut(target) else {
                    return;
                };
                let depth = body.point_in_world_space(&centre_of_buoyancy).y;

                // Entirely above the water line.
                if depth >= water_height + max_depth {
                    return;
                }

                let fraction = if depth <= water_height - max_depth {
                    1.0
                } else {
                    (water_height + max_depth - depth) / (2.0 * max_depth)
                };
                let force = Vector3::new(0.0, liquid_density * volume * fraction, 0.0);
                body.add_force_at_body_point(force, centre_of_buoyancy);
            }
        }
    }
}

/// One (body, generator) registration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForceRegistration {
    /// The body the generator acts on.
    pub body: BodyHandle,
    /// The generator itself.
    pub generator: ForceGenerator,
}

/// Caller-owned list of force registrations.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForceRegistry {
    registrations: Vec<ForceRegistration>,
}

impl ForceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator against a body.
    pub fn add(&mut self, body: BodyHandle, generator: ForceGenerator) {
        self.registrations.push(ForceRegistration { body, generator });
    }

    /// Remove every registration for the given body.
    pub fn remove_body(&mut self, body: BodyHandle) {
        self.registrations.retain(|r| r.body != body);
    }

    /// Drop all registrations.
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Run every generator, accumulating forces for the coming step.
    pub fn update_forces(&self, bodies: &mut BodySet, dt: f64) {
        for registration in &self.registrations {
            registration.generator.update_force(bodies, registration.body, dt);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use crate::inertia;
    use approx::assert_relative_eq;

    fn body_set_with_one() -> (BodySet, BodyHandle) {
        let mut bodies = BodySet::new();
        let handle = bodies.insert(RigidBody::new(2.0, inertia::solid_sphere(2.0, 1.0)).unwrap());
        (bodies, handle)
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let (mut bodies, handle) = body_set_with_one();
        let gravity = ForceGenerator::Gravity {
            gravity: Vector3::new(0.0, -10.0, 0.0),
        };
        gravity.update_force(&mut bodies, handle, 0.01);
        bodies[handle].integrate(1.0);
        // F = m g, a = g regardless of mass.
        assert_relative_eq!(bodies[handle].velocity().y, -10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_gravity_skips_fixed_bodies() {
        let mut bodies = BodySet::new();
        let handle = bodies.insert(RigidBody::fixed());
        let gravity = ForceGenerator::Gravity {
            gravity: Vector3::new(0.0, -10.0, 0.0),
        };
        gravity.update_force(&mut bodies, handle, 0.01);
        bodies[handle].integrate(1.0);
        assert_eq!(bodies[handle].velocity(), Vector3::zeros());
    }

    #[test]
    fn test_spring_pulls_toward_anchor() {
        let mut bodies = BodySet::new();
        let anchor = bodies.insert(RigidBody::fixed());
        let target = bodies.insert(
            RigidBody::new(1.0, inertia::solid_sphere(1.0, 0.5))
                .unwrap()
                .with_position(Point3::new(3.0, 0.0, 0.0)),
        );

        let spring = ForceGenerator::Spring {
            connection_point: Point3::origin(),
            other: anchor,
            other_connection_point: Point3::origin(),
            spring_constant: 10.0,
            rest_length: 1.0,
        };
        spring.update_force(&mut bodies, target, 0.01);
        bodies[target].integrate(0.1);

        // Stretched by 2 m at k = 10: force 20 N back toward the anchor.
        assert!(bodies[target].velocity().x < 0.0);
    }

    #[test]
    fn test_buoyancy_fractional_submersion() {
        let mut bodies = BodySet::new();
        // Centre of buoyancy exactly at the water line: half submerged.
        let handle = bodies.insert(RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0)).unwrap());
        let buoyancy = ForceGenerator::Buoyancy {
            centre_of_buoyancy: Point3::origin(),
            max_depth: 1.0,
            volume: 0.5,
            water_height: 0.0,
            liquid_density: 1000.0,
        };
        buoyancy.update_force(&mut bodies, handle, 0.01);
        bodies[handle].integrate(1.0);
        // Half of density * volume = 250 N on a 1 kg body.
        assert_relative_eq!(bodies[handle].velocity().y, 250.0, epsilon = 1e-10);
    }

    #[test]
    fn test_registry_update_and_remove() {
        let (mut bodies, handle) = body_set_with_one();
        let mut registry = ForceRegistry::new();
        registry.add(
            handle,
            ForceGenerator::Gravity {
                gravity: Vector3::new(0.0, -10.0, 0.0),
            },
        );
        assert_eq!(registry.len(), 1);

        registry.update_forces(&mut bodies, 0.01);
        bodies[handle].integrate(1.0);
        assert_relative_eq!(bodies[handle].velocity().y, -10.0, epsilon = 1e-10);

        registry.remove_body(handle);
        assert!(registry.is_empty());
    }
}
