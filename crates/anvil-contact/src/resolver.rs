//! Sequential-impulse contact resolver.
//!
//! Both passes are greedy Gauss–Seidel relaxations: each iteration picks
//! the single worst violation (largest penetration, then largest desired
//! velocity change), resolves it, and propagates the applied correction
//! into every other contact that shares a body. Iteration budgets bound the
//! work per frame; under-resolved contacts are simply picked up again next
//! step.

use tracing::{debug, trace};

use anvil_dynamics::{BodySet, ConfigError};

use crate::contact::Contact;

/// Iterative resolver for a step's worth of contacts.
///
/// # Example
///
/// ```
/// use anvil_contact::ContactResolver;
///
/// let resolver = ContactResolver::new(8, 4, 0.01, 0.01).unwrap();
/// assert_eq!(resolver.velocity_iterations(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct ContactResolver {
    velocity_iterations: usize,
    position_iterations: usize,
    velocity_epsilon: f64,
    position_epsilon: f64,
    velocity_iterations_used: usize,
    position_iterations_used: usize,
}

impl Default for ContactResolver {
    /// A resolver with automatic iteration budgets (proportional to the
    /// contact count) and the standard epsilons.
    fn default() -> Self {
        Self {
            velocity_iterations: 0,
            position_iterations: 0,
            velocity_epsilon: 0.01,
            position_epsilon: 0.01,
            velocity_iterations_used: 0,
            position_iterations_used: 0,
        }
    }
}

impl ContactResolver {
    /// Create a resolver with explicit iteration budgets and epsilons.
    ///
    /// An iteration budget of 0 means "automatic": four iterations per
    /// contact, decided at resolve time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidResolver`] if either epsilon is not
    /// positive and finite.
    pub fn new(
        velocity_iterations: usize,
        position_iterations: usize,
        velocity_epsilon: f64,
        position_epsilon: f64,
    ) -> Result<Self, ConfigError> {
        if !(velocity_epsilon.is_finite() && velocity_epsilon > 0.0) {
            return Err(ConfigError::invalid_resolver(
                "velocity epsilon must be positive and finite",
            ));
        }
        if !(position_epsilon.is_finite() && position_epsilon > 0.0) {
            return Err(ConfigError::invalid_resolver(
                "position epsilon must be positive and finite",
            ));
        }
        Ok(Self {
            velocity_iterations,
            position_iterations,
            velocity_epsilon,
            position_epsilon,
            velocity_iterations_used: 0,
            position_iterations_used: 0,
        })
    }

    /// Configured velocity iteration budget (0 = automatic).
    #[must_use]
    pub fn velocity_iterations(&self) -> usize {
        self.velocity_iterations
    }

    /// Configured position iteration budget (0 = automatic).
    #[must_use]
    pub fn position_iterations(&self) -> usize {
        self.position_iterations
    }

    /// Velocity iterations consumed by the last resolve.
    #[must_use]
    pub fn velocity_iterations_used(&self) -> usize {
        self.velocity_iterations_used
    }

    /// Position iterations consumed by the last resolve.
    #[must_use]
    pub fn position_iterations_used(&self) -> usize {
        self.position_iterations_used
    }

    /// Resolve a batch of contacts: prepare, remove interpenetration, then
    /// resolve closing velocities.
    pub fn resolve_contacts(&mut self, bodies: &mut BodySet, contacts: &mut [Contact], dt: f64) {
        self.velocity_iterations_used = 0;
        self.position_iterations_used = 0;
        if contacts.is_empty() {
            return;
        }
        trace!(contacts = contacts.len(), "resolving contact batch");

        Self::prepare_contacts(bodies, contacts, dt);
        self.adjust_positions(bodies, contacts);
        self.adjust_velocities(bodies, contacts, dt);
    }

    /// Fill in the solver caches (basis, closing velocity, desired change)
    /// for every contact.
    fn prepare_contacts(bodies: &mut BodySet, contacts: &mut [Contact], dt: f64) {
        for contact in contacts.iter_mut() {
            contact.calculate_internals(bodies, dt);
        }
    }

    /// Remove interpenetration, worst contact first.
    fn adjust_positions(&mut self, bodies: &mut BodySet, contacts: &mut [Contact]) {
        let budget = if self.position_iterations == 0 {
            4 * contacts.len()
        } else {
            self.position_iterations
        };

        while self.position_iterations_used < budget {
            // Find the deepest remaining penetration.
            let mut max = self.position_epsilon;
            let mut index = None;
            for (i, contact) in contacts.iter().enumerate() {
                if contact.penetration > max {
                    max = contact.penetration;
                    index = Some(i);
                }
            }
            let Some(index) = index else {
                return;
            };

            contacts[index].match_awake_state(bodies);
            let (linear_change, angular_change) =
                contacts[index].apply_position_change(bodies, max);
            let resolved_bodies = contacts[index].bodies;

            // The correction moved up to two bodies, which changes the
            // penetration of every other contact that shares them.
            for contact in contacts.iter_mut() {
                for slot in 0..2 {
                    let Some(handle) = contact.bodies[slot] else {
                        continue;
                    };
                    for d in 0..2 {
                        if resolved_bodies[d] != Some(handle) {
                            continue;
                        }
                        let delta = linear_change[d]
                            + angular_change[d].cross(&contact.relative_contact_position[slot]);
                        let sign = if slot == 1 { 1.0 } else { -1.0 };
                        contact.penetration += delta.dot(&contact.normal) * sign;
                    }
                }
            }
            self.position_iterations_used += 1;
        }

        if contacts.iter().any(|c| c.penetration > self.position_epsilon) {
            debug!(
                iterations = self.position_iterations_used,
                "position budget exhausted with residual penetration"
            );
        }
    }

    /// Resolve closing velocities, worst contact first.
    fn adjust_velocities(&mut self, bodies: &mut BodySet, contacts: &mut [Contact], dt: f64) {
        let budget = if self.velocity_iterations == 0 {
            4 * contacts.len()
        } else {
            self.velocity_iterations
        };

        while self.velocity_iterations_used < budget {
            // Find the contact wanting the largest velocity change.
            let mut max = self.velocity_epsilon;
            let mut index = None;
            for (i, contact) in contacts.iter().enumerate() {
                if contact.desired_delta_velocity > max {
                    max = contact.desired_delta_velocity;
                    index = Some(i);
                }
            }
            let Some(index) = index else {
                return;
            };

            contacts[index].match_awake_state(bodies);
            let (velocity_change, rotation_change) = contacts[index].apply_velocity_change(bodies);
            let resolved_bodies = contacts[index].bodies;

            // Closing velocities of contacts sharing a body have changed;
            // recompute them and their desired deltas.
            for contact in contacts.iter_mut() {
                for slot in 0..2 {
                    let Some(handle) = contact.bodies[slot] else {
                        continue;
                    };
                    for d in 0..2 {
                        if resolved_bodies[d] != Some(handle) {
                            continue;
                        }
                        let delta = velocity_change[d]
                            + rotation_change[d].cross(&contact.relative_contact_position[slot]);
                        let sign = if slot == 1 { -1.0 } else { 1.0 };
                        contact.contact_velocity +=
                            contact.contact_to_world.transpose() * delta * sign;
                        contact.calculate_desired_delta_velocity(bodies, dt);
                    }
                }
            }
            self.velocity_iterations_used += 1;
        }

        if contacts
            .iter()
            .any(|c| c.desired_delta_velocity > self.velocity_epsilon)
        {
            debug!(
                iterations = self.velocity_iterations_used,
                "velocity budget exhausted with residual closing velocity"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::contact::ContactSet;
    use anvil_dynamics::{inertia, Point3, RigidBody, Vector3};
    use approx::assert_relative_eq;

    fn unit_sphere(bodies: &mut BodySet, position: Point3<f64>) -> anvil_dynamics::BodyHandle {
        bodies.insert(
            RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0))
                .unwrap()
                .with_position(position),
        )
    }

    #[test]
    fn test_resolver_rejects_bad_epsilon() {
        assert!(ContactResolver::new(4, 4, 0.0, 0.01).is_err());
        assert!(ContactResolver::new(4, 4, 0.01, f64::NAN).is_err());
        assert!(ContactResolver::new(0, 0, 0.01, 0.01).is_ok());
    }

    #[test]
    fn test_resolved_set_is_untouched() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 1.0, 0.0));
        let before = bodies[a].clone();

        // A contact with no penetration and no closing velocity.
        let mut set = ContactSet::new(4);
        set.add([Some(a), None], Point3::origin(), Vector3::y(), 0.0);

        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        assert_eq!(resolver.velocity_iterations_used(), 0);
        assert_eq!(resolver.position_iterations_used(), 0);
        assert_eq!(bodies[a], before);
    }

    #[test]
    fn test_penetration_is_removed() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 0.9, 0.0));

        let mut set = ContactSet::new(4);
        set.add([Some(a), None], Point3::origin(), Vector3::y(), 0.1);

        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        // The body is pushed up along the normal by the full penetration.
        assert_relative_eq!(bodies[a].position().y, 1.0, epsilon = 1e-10);
        assert!(set.contacts()[0].penetration <= 0.01);
    }

    #[test]
    fn test_impulse_stops_closing_velocity() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 1.0, 0.0));
        bodies[a].set_velocity(Vector3::new(0.0, -5.0, 0.0));

        let mut set = ContactSet::new(4);
        set.add([Some(a), None], Point3::origin(), Vector3::y(), 0.0);

        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        // Zero restitution: the approach is cancelled, nothing more.
        assert_relative_eq!(bodies[a].velocity().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_restitution_bounces() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 1.0, 0.0));
        bodies[a].set_velocity(Vector3::new(0.0, -5.0, 0.0));

        let mut set = ContactSet::new(4).with_materials(0.0, 0.5);
        set.add([Some(a), None], Point3::origin(), Vector3::y(), 0.0);

        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        assert_relative_eq!(bodies[a].velocity().y, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_momentum_split_between_two_free_bodies() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(-1.0, 0.0, 0.0));
        let b = unit_sphere(&mut bodies, Point3::new(1.0, 0.0, 0.0));
        bodies[a].set_velocity(Vector3::new(2.0, 0.0, 0.0));

        let mut set = ContactSet::new(4);
        // Normal points from b toward a.
        set.add([Some(a), Some(b)], Point3::origin(), -Vector3::x(), 0.0);

        let mut resolver = ContactResolver::default();
        let momentum_before =
            bodies[a].velocity() + bodies[b].velocity();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);
        let momentum_after = bodies[a].velocity() + bodies[b].velocity();

        // Momentum is conserved and the closing velocity is gone.
        assert_relative_eq!(momentum_before, momentum_after, epsilon = 1e-9);
        let closing = (bodies[a].velocity() - bodies[b].velocity()).x;
        assert_relative_eq!(closing, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_kinetic_energy_never_increases_without_restitution() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(-1.0, 0.0, 0.0));
        let b = unit_sphere(&mut bodies, Point3::new(1.0, 0.0, 0.0));
        bodies[a].set_velocity(Vector3::new(3.0, 0.5, 0.0));
        bodies[b].set_velocity(Vector3::new(-1.0, 0.0, 0.25));

        let energy = |bodies: &BodySet| -> f64 {
            bodies
                .iter()
                .map(|body| 0.5 * body.mass() * body.velocity().norm_squared())
                .sum()
        };

        let mut set = ContactSet::new(4);
        set.add([Some(a), Some(b)], Point3::origin(), -Vector3::x(), 0.0);

        let before = energy(&bodies);
        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);
        let after = energy(&bodies);

        assert!(after <= before + 1e-9);
    }

    #[test]
    fn test_resolving_wakes_sleeping_body() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 1.0, 0.0));
        let b = unit_sphere(&mut bodies, Point3::new(0.0, -1.0, 0.0));
        bodies[a].set_velocity(Vector3::new(0.0, -2.0, 0.0));
        bodies[b].set_awake(false);

        let mut set = ContactSet::new(4);
        set.add([Some(a), Some(b)], Point3::origin(), Vector3::y(), 0.0);

        let mut resolver = ContactResolver::default();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        assert!(bodies[b].is_awake());
    }

    #[test]
    fn test_budget_bounds_iterations() {
        let mut bodies = BodySet::new();
        let a = unit_sphere(&mut bodies, Point3::new(0.0, 0.5, 0.0));
        bodies[a].set_velocity(Vector3::new(0.0, -5.0, 0.0));

        let mut set = ContactSet::new(8);
        // Several contacts all wanting large corrections.
        for x in [-1.0, 0.0, 1.0] {
            set.add(
                [Some(a), None],
                Point3::new(x, 0.0, 0.0),
                Vector3::y(),
                0.5,
            );
        }

        let mut resolver = ContactResolver::new(2, 2, 0.01, 0.01).unwrap();
        resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);

        assert!(resolver.velocity_iterations_used() <= 2);
        assert!(resolver.position_iterations_used() <= 2);
    }
}
