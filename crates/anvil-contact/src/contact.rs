//! Contact data and per-contact solver maths.
//!
//! A [`Contact`] carries the geometry the narrow phase produced (point,
//! normal, penetration) plus the state the resolver caches during
//! preparation: the contact-space basis, the relative contact positions,
//! the closing velocity and the desired velocity change. Contacts live in a
//! fixed-capacity [`ContactSet`] for exactly one simulation step.

use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use anvil_dynamics::{BodyHandle, BodySet};

/// Normal closing speeds below this limit have their restitution suppressed
/// to avoid micro-bounce jitter on resting contacts.
const VELOCITY_LIMIT: f64 = 0.25;

/// A single contact between two bodies, or between a body and static
/// geometry (second slot empty).
///
/// The contact normal points, by convention, from the second body's surface
/// toward the first body. Contacts are created fresh each step and never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    /// The bodies in contact; the second slot is empty for contacts against
    /// static geometry.
    pub bodies: [Option<BodyHandle>; 2],
    /// World-space contact point.
    pub point: Point3<f64>,
    /// Unit contact normal.
    pub normal: Vector3<f64>,
    /// Interpenetration depth; non-negative while the contact is active.
    pub penetration: f64,
    /// Coulomb friction coefficient for this contact.
    pub friction: f64,
    /// Restitution coefficient for this contact.
    pub restitution: f64,

    pub(crate) contact_to_world: Matrix3<f64>,
    pub(crate) contact_velocity: Vector3<f64>,
    pub(crate) desired_delta_velocity: f64,
    pub(crate) relative_contact_position: [Vector3<f64>; 2],
}

impl Contact {
    /// Create a contact from narrow-phase output.
    #[must_use]
    pub fn new(
        bodies: [Option<BodyHandle>; 2],
        point: Point3<f64>,
        normal: Vector3<f64>,
        penetration: f64,
        friction: f64,
        restitution: f64,
    ) -> Self {
        Self {
            bodies,
            point,
            normal,
            penetration,
            friction,
            restitution,
            contact_to_world: Matrix3::identity(),
            contact_velocity: Vector3::zeros(),
            desired_delta_velocity: 0.0,
            relative_contact_position: [Vector3::zeros(); 2],
        }
    }

    /// The cached contact-space basis (columns: normal, tangent, tangent).
    #[must_use]
    pub fn contact_to_world(&self) -> &Matrix3<f64> {
        &self.contact_to_world
    }

    /// Closing velocity at the contact point, in contact space.
    #[must_use]
    pub fn closing_velocity(&self) -> Vector3<f64> {
        self.contact_velocity
    }

    /// The velocity change the resolver wants to apply along the normal.
    #[must_use]
    pub fn desired_delta_velocity(&self) -> f64 {
        self.desired_delta_velocity
    }

    /// Relative position of the contact point from the given body's centre.
    #[must_use]
    pub fn relative_contact_position(&self, index: usize) -> Vector3<f64> {
        self.relative_contact_position[index]
    }

    /// Swap the two body slots, flipping the normal to keep it pointing
    /// toward the (new) first body.
    pub(crate) fn swap_bodies(&mut self) {
        self.normal = -self.normal;
        self.bodies.swap(0, 1);
    }

    /// Wake the sleeping side of a sleeping/awake contact.
    ///
    /// Contacts against static geometry never wake anything.
    pub(crate) fn match_awake_state(&self, bodies: &mut BodySet) {
        let (Some(first), Some(second)) = (self.bodies[0], self.bodies[1]) else {
            return;
        };

        let awake0 = bodies[first].is_awake();
        let awake1 = bodies[second].is_awake();

        if awake0 ^ awake1 {
            if awake0 {
                bodies[second].set_awake(true);
            } else {
                bodies[first].set_awake(true);
            }
        }
    }

    /// Fill in all cached solver state for this step.
    pub(crate) fn calculate_internals(&mut self, bodies: &BodySet, dt: f64) {
        if self.bodies[0].is_none() {
            self.swap_bodies();
        }
        debug_assert!(self.bodies[0].is_some(), "contact with no bodies");
        let Some(first) = self.bodies[0] else {
            return;
        };

        self.calculate_contact_basis();

        self.relative_contact_position[0] = self.point - bodies[first].position();
        if let Some(second) = self.bodies[1] {
            self.relative_contact_position[1] = self.point - bodies[second].position();
        }

        self.contact_velocity = self.local_velocity(0, first, bodies, dt);
        if let Some(second) = self.bodies[1] {
            self.contact_velocity -= self.local_velocity(1, second, bodies, dt);
        }

        self.calculate_desired_delta_velocity(bodies, dt);
    }

    /// Build an orthonormal basis with the contact normal as its x-axis.
    ///
    /// The first tangent is made perpendicular to whichever world axis
    /// (X or Y) is further from the normal, so the cross product can never
    /// degenerate.
    fn calculate_contact_basis(&mut self) {
        let n = self.normal;
        let mut tangent = [Vector3::zeros(); 2];

        if n.x.abs() > n.y.abs() {
            let s = 1.0 / (n.z * n.z + n.x * n.x).sqrt();

            tangent[0].x = n.z * s;
            tangent[0].y = 0.0;
            tangent[0].z = -n.x * s;

            tangent[1].x = n.y * tangent[0].x;
            tangent[1].y = n.z * tangent[0].x - n.x * tangent[0].z;
            tangent[1].z = -n.y * tangent[0].x;
        } else {
            let s = 1.0 / (n.z * n.z + n.y * n.y).sqrt();

            tangent[0].x = 0.0;
            tangent[0].y = -n.z * s;
            tangent[0].z = n.y * s;

            tangent[1].x = n.y * tangent[0].z - n.z * tangent[0].y;
            tangent[1].y = -n.x * tangent[0].z;
            tangent[1].z = n.x * tangent[0].y;
        }

        self.contact_to_world = Matrix3::from_columns(&[n, tangent[0], tangent[1]]);
    }

    /// Contact-space velocity of the contact point on one body, including
    /// the planar part of this frame's acceleration-induced velocity.
    fn local_velocity(
        &self,
        index: usize,
        handle: BodyHandle,
        bodies: &BodySet,
        dt: f64,
    ) -> Vector3<f64> {
        let body = &bodies[handle];

        let velocity = body
            .angular_velocity()
            .cross(&self.relative_contact_position[index])
            + body.velocity();
        let contact_velocity = self.contact_to_world.transpose() * velocity;

        // Velocity accumulated from forces this frame; only its planar part
        // matters (the normal component is handled via restitution).
        let mut acc_velocity =
            self.contact_to_world.transpose() * (body.last_frame_acceleration() * dt);
        acc_velocity.x = 0.0;

        contact_velocity + acc_velocity
    }

    /// Compute the velocity change the velocity pass should produce.
    pub(crate) fn calculate_desired_delta_velocity(&mut self, bodies: &BodySet, dt: f64) {
        // Normal-direction velocity accumulated from this frame's forces;
        // it must be cancelled rather than bounced.
        let mut velocity_from_acc = 0.0;

        if let Some(first) = self.bodies[0] {
            let body = &bodies[first];
            if body.is_awake() {
                velocity_from_acc += body.last_frame_acceleration().dot(&self.normal) * dt;
            }
        }
        if let Some(second) = self.bodies[1] {
            let body = &bodies[second];
            if body.is_awake() {
                velocity_from_acc -= body.last_frame_acceleration().dot(&self.normal) * dt;
            }
        }

        let restitution = if self.contact_velocity.x.abs() < VELOCITY_LIMIT {
            0.0
        } else {
            self.restitution
        };

        self.desired_delta_velocity =
            -self.contact_velocity.x - restitution * (self.contact_velocity.x - velocity_from_acc);
    }

    /// Impulse (contact space) for a frictionless contact: a 1-D solve
    /// along the normal against the combined effective mass.
    fn frictionless_impulse(
        &self,
        inverse_mass: f64,
        inverse_inertia: &[Matrix3<f64>; 2],
    ) -> Vector3<f64> {
        // Velocity change per unit impulse: the summed inverse masses plus
        // each body's inverse-inertia contribution projected along the normal.
        let mut delta_velocity = inverse_mass;

        for index in 0..2 {
            if self.bodies[index].is_none() {
                continue;
            }
            let torque_per_impulse = self.relative_contact_position[index].cross(&self.normal);
            let rotation_per_impulse = inverse_inertia[index] * torque_per_impulse;
            let velocity_per_impulse =
                rotation_per_impulse.cross(&self.relative_contact_position[index]);
            delta_velocity += velocity_per_impulse.dot(&self.normal);
        }

        Vector3::new(self.desired_delta_velocity / delta_velocity, 0.0, 0.0)
    }

    /// Impulse (contact space) for a frictional contact: a full 3×3 solve
    /// that zeroes the desired normal change and both tangential velocities,
    /// clamped to the Coulomb cone.
    fn friction_impulse(
        &self,
        inverse_mass: f64,
        inverse_inertia: &[Matrix3<f64>; 2],
    ) -> Vector3<f64> {
        // Impulse → world velocity change, composed from each body's
        // skew-symmetric arm matrix and inverse inertia tensor.
        let impulse_to_torque = self.relative_contact_position[0].cross_matrix();
        let mut delta_velocity_world =
            -(impulse_to_torque * inverse_inertia[0] * impulse_to_torque);

        if self.bodies[1].is_some() {
            let impulse_to_torque = self.relative_contact_position[1].cross_matrix();
            delta_velocity_world += -(impulse_to_torque * inverse_inertia[1] * impulse_to_torque);
        }

        // Change of basis into contact coordinates, plus the linear term.
        let mut delta_velocity =
            self.contact_to_world.transpose() * delta_velocity_world * self.contact_to_world;
        delta_velocity[(0, 0)] += inverse_mass;
        delta_velocity[(1, 1)] += inverse_mass;
        delta_velocity[(2, 2)] += inverse_mass;

        // A near-singular compliance matrix means the full solve is not
        // trustworthy; fall back to the 1-D normal solve.
        let Some(impulse_matrix) = delta_velocity.try_inverse() else {
            return self.frictionless_impulse(inverse_mass, inverse_inertia);
        };

        let velocity_kill = Vector3::new(
            self.desired_delta_velocity,
            -self.contact_velocity.y,
            -self.contact_velocity.z,
        );
        let mut impulse_contact = impulse_matrix * velocity_kill;

        let planar_impulse =
            (impulse_contact.y * impulse_contact.y + impulse_contact.z * impulse_contact.z).sqrt();
        if planar_impulse > impulse_contact.x * self.friction {
            // Outside the friction cone: fix the tangential direction to the
            // unit vector of the unconstrained tangential impulse and solve
            // the remaining 1-D equation along the normal.
            let tangent_y = impulse_contact.y / planar_impulse;
            let tangent_z = impulse_contact.z / planar_impulse;

            let effective = delta_velocity[(0, 0)]
                + self.friction
                    * (delta_velocity[(0, 1)] * tangent_y + delta_velocity[(0, 2)] * tangent_z);
            let normal_impulse = self.desired_delta_velocity / effective;

            impulse_contact = Vector3::new(
                normal_impulse,
                self.friction * normal_impulse * tangent_y,
                self.friction * normal_impulse * tangent_z,
            );
        }

        impulse_contact
    }

    /// Apply the impulse resolving this contact's desired velocity change.
    ///
    /// Returns the linear and angular velocity deltas applied to each body
    /// slot, which the resolver propagates into dependent contacts.
    pub(crate) fn apply_velocity_change(
        &self,
        bodies: &mut BodySet,
    ) -> ([Vector3<f64>; 2], [Vector3<f64>; 2]) {
        let mut velocity_change = [Vector3::zeros(); 2];
        let mut rotation_change = [Vector3::zeros(); 2];

        let Some(first) = self.bodies[0] else {
            return (velocity_change, rotation_change);
        };

        let mut inverse_inertia = [Matrix3::zeros(); 2];
        let mut inverse_mass = bodies[first].inverse_mass();
        inverse_inertia[0] = *bodies[first].inverse_inertia_tensor_world();
        if let Some(second) = self.bodies[1] {
            inverse_inertia[1] = *bodies[second].inverse_inertia_tensor_world();
            inverse_mass += bodies[second].inverse_mass();
        }

        let impulse_contact = if self.friction == 0.0 {
            self.frictionless_impulse(inverse_mass, &inverse_inertia)
        } else {
            self.friction_impulse(inverse_mass, &inverse_inertia)
        };

        let impulse = self.contact_to_world * impulse_contact;

        let impulsive_torque = self.relative_contact_position[0].cross(&impulse);
        rotation_change[0] = inverse_inertia[0] * impulsive_torque;
        velocity_change[0] = impulse * bodies[first].inverse_mass();

        {
            let body = &mut bodies[first];
            body.add_velocity(velocity_change[0]);
            body.add_rotation(rotation_change[0]);
        }

        if let Some(second) = self.bodies[1] {
            let impulsive_torque = impulse.cross(&self.relative_contact_position[1]);
            rotation_change[1] = inverse_inertia[1] * impulsive_torque;
            velocity_change[1] = impulse * -bodies[second].inverse_mass();

            let body = &mut bodies[second];
            body.add_velocity(velocity_change[1]);
            body.add_rotation(rotation_change[1]);
        }

        (velocity_change, rotation_change)
    }

    /// Move and rotate the bodies to remove `penetration` metres of overlap.
    ///
    /// The correction is split between the bodies in proportion to their
    /// linear plus angular inertia along the contact normal; the angular
    /// share is clamped by a small-angle limit, with the excess folded back
    /// into the linear share. Returns the applied linear and angular deltas
    /// per body slot.
    pub(crate) fn apply_position_change(
        &self,
        bodies: &mut BodySet,
        penetration: f64,
    ) -> ([Vector3<f64>; 2], [Vector3<f64>; 2]) {
        const ANGULAR_LIMIT: f64 = 0.2;

        let mut linear_change = [Vector3::zeros(); 2];
        let mut angular_change = [Vector3::zeros(); 2];

        let mut linear_inertia = [0.0_f64; 2];
        let mut angular_inertia = [0.0_f64; 2];
        let mut total_inertia = 0.0;

        // Both inertias must be known before any correction is applied, so
        // the shares are computed against the same total.
        for index in 0..2 {
            let Some(handle) = self.bodies[index] else {
                continue;
            };
            let body = &bodies[handle];
            let inverse_inertia = body.inverse_inertia_tensor_world();

            let torque_per_move = self.relative_contact_position[index].cross(&self.normal);
            let rotation_per_move = inverse_inertia * torque_per_move;
            let velocity_per_move =
                rotation_per_move.cross(&self.relative_contact_position[index]);
            angular_inertia[index] = velocity_per_move.dot(&self.normal);
            linear_inertia[index] = body.inverse_mass();

            total_inertia += linear_inertia[index] + angular_inertia[index];
        }

        if total_inertia <= 0.0 {
            return (linear_change, angular_change);
        }

        for index in 0..2 {
            let Some(handle) = self.bodies[index] else {
                continue;
            };

            let sign = if index == 0 { 1.0 } else { -1.0 };
            let mut angular_move = sign * penetration * (angular_inertia[index] / total_inertia);
            let mut linear_move = sign * penetration * (linear_inertia[index] / total_inertia);

            // Limit the rotational part when the body's inertia is small
            // relative to its mass, using the small-angle approximation for
            // the reachable arc length.
            let projection = self.relative_contact_position[index]
                - self.normal * self.relative_contact_position[index].dot(&self.normal);
            let max_magnitude = ANGULAR_LIMIT * projection.norm();

            if angular_move < -max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = -max_magnitude;
                linear_move = total_move - angular_move;
            } else if angular_move > max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = max_magnitude;
                linear_move = total_move - angular_move;
            }

            angular_change[index] = if angular_move.abs() < f64::EPSILON {
                Vector3::zeros()
            } else {
                let target_direction = self.relative_contact_position[index].cross(&self.normal);
                (bodies[handle].inverse_inertia_tensor_world() * target_direction)
                    * (angular_move / angular_inertia[index])
            };
            linear_change[index] = self.normal * linear_move;

            let body = &mut bodies[handle];
            body.add_position(self.normal * linear_move);
            body.add_orientation(angular_change[index]);

            // Asleep bodies do not integrate, so their derived data must be
            // refreshed here for the correction to be observable.
            if !body.is_awake() {
                body.calculate_derived_data();
            }
        }

        (linear_change, angular_change)
    }
}

/// Fixed-capacity pool of contacts for one simulation step.
///
/// The narrow phase fills the set, the resolver consumes it, and
/// [`ContactSet::clear`] resets it for the next step. `add` silently
/// refuses writes once the capacity is reached.
#[derive(Debug, Clone)]
pub struct ContactSet {
    contacts: Vec<Contact>,
    capacity: usize,
    /// Friction coefficient stamped onto generated contacts.
    pub friction: f64,
    /// Restitution coefficient stamped onto generated contacts.
    pub restitution: f64,
}

impl ContactSet {
    /// Create a pool with room for `capacity` contacts and zero friction
    /// and restitution.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            contacts: Vec::with_capacity(capacity),
            capacity,
            friction: 0.0,
            restitution: 0.0,
        }
    }

    /// Set the material coefficients stamped onto generated contacts.
    #[must_use]
    pub fn with_materials(mut self, friction: f64, restitution: f64) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    /// Contacts written so far.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Mutable access for the resolver.
    pub fn contacts_mut(&mut self) -> &mut [Contact] {
        &mut self.contacts
    }

    /// Remaining capacity.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.contacts.len()
    }

    /// Whether the pool has room for more contacts.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    /// Number of contacts written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Append one contact; returns the number written (0 when full).
    pub fn add(
        &mut self,
        bodies: [Option<BodyHandle>; 2],
        point: Point3<f64>,
        normal: Vector3<f64>,
        penetration: f64,
    ) -> usize {
        if self.contacts.len() >= self.capacity {
            return 0;
        }
        self.contacts.push(Contact::new(
            bodies,
            point,
            normal,
            penetration,
            self.friction,
            self.restitution,
        ));
        1
    }

    /// Reset the pool for the next step.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use anvil_dynamics::{inertia, RigidBody};
    use approx::assert_relative_eq;

    fn unit_body(bodies: &mut BodySet, position: Point3<f64>) -> BodyHandle {
        bodies.insert(
            RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0))
                .unwrap()
                .with_position(position),
        )
    }

    #[test]
    fn test_basis_is_orthonormal() {
        for normal in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Vector3::new(-0.3, 0.9, 0.1).normalize(),
        ] {
            let mut contact = Contact::new(
                [None, None],
                Point3::origin(),
                normal,
                0.0,
                0.0,
                0.0,
            );
            contact.calculate_contact_basis();
            let basis = contact.contact_to_world();

            // Columns are unit length and mutually perpendicular.
            for col in 0..3 {
                assert_relative_eq!(basis.column(col).norm(), 1.0, epsilon = 1e-10);
            }
            assert_relative_eq!(basis.column(0).dot(&basis.column(1)), 0.0, epsilon = 1e-10);
            assert_relative_eq!(basis.column(0).dot(&basis.column(2)), 0.0, epsilon = 1e-10);
            assert_relative_eq!(basis.column(1).dot(&basis.column(2)), 0.0, epsilon = 1e-10);
            // First column is the normal.
            assert_relative_eq!(basis.column(0).into_owned(), normal, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_swap_on_missing_first_body() {
        let mut bodies = BodySet::new();
        let ball = unit_body(&mut bodies, Point3::new(0.0, 1.0, 0.0));

        let mut contact = Contact::new(
            [None, Some(ball)],
            Point3::origin(),
            Vector3::y(),
            0.1,
            0.0,
            0.0,
        );
        contact.calculate_internals(&bodies, 0.01);

        assert_eq!(contact.bodies[0], Some(ball));
        assert_eq!(contact.bodies[1], None);
        assert_relative_eq!(contact.normal, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_closing_velocity_head_on() {
        let mut bodies = BodySet::new();
        let a = unit_body(&mut bodies, Point3::new(-1.0, 0.0, 0.0));
        let b = unit_body(&mut bodies, Point3::new(1.0, 0.0, 0.0));
        bodies[a].set_velocity(Vector3::new(1.0, 0.0, 0.0));
        bodies[b].set_velocity(Vector3::new(-1.0, 0.0, 0.0));

        // Normal points from b toward a.
        let mut contact = Contact::new(
            [Some(a), Some(b)],
            Point3::origin(),
            -Vector3::x(),
            0.0,
            0.0,
            0.0,
        );
        contact.calculate_internals(&bodies, 0.01);

        // Bodies approach at 2 m/s; along the normal that reads -2.
        assert_relative_eq!(contact.closing_velocity().x, -2.0, epsilon = 1e-10);
        // Desired change cancels the approach (restitution suppressed under
        // the velocity limit is not in play at 2 m/s with restitution 0).
        assert_relative_eq!(contact.desired_delta_velocity(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_restitution_suppressed_below_velocity_limit() {
        let mut bodies = BodySet::new();
        let a = unit_body(&mut bodies, Point3::new(0.0, 1.0, 0.0));
        bodies[a].set_velocity(Vector3::new(0.0, -0.1, 0.0));

        let mut contact = Contact::new(
            [Some(a), None],
            Point3::origin(),
            Vector3::y(),
            0.0,
            0.0,
            1.0,
        );
        contact.calculate_internals(&bodies, 0.01);

        // Fully elastic restitution, but the closing speed (0.1) is below
        // the limit: desired change only cancels the approach.
        assert_relative_eq!(contact.desired_delta_velocity(), 0.1, epsilon = 1e-10);
    }

    #[test]
    fn test_match_awake_state_wakes_sleeping_body() {
        let mut bodies = BodySet::new();
        let a = unit_body(&mut bodies, Point3::origin());
        let b = unit_body(&mut bodies, Point3::new(2.0, 0.0, 0.0));
        bodies[b].set_awake(false);

        let contact = Contact::new(
            [Some(a), Some(b)],
            Point3::new(1.0, 0.0, 0.0),
            Vector3::x(),
            0.0,
            0.0,
            0.0,
        );
        contact.match_awake_state(&mut bodies);
        assert!(bodies[b].is_awake());
    }

    #[test]
    fn test_static_contact_never_wakes() {
        let mut bodies = BodySet::new();
        let a = unit_body(&mut bodies, Point3::origin());
        bodies[a].set_awake(false);

        let contact = Contact::new(
            [Some(a), None],
            Point3::origin(),
            Vector3::y(),
            0.0,
            0.0,
            0.0,
        );
        contact.match_awake_state(&mut bodies);
        assert!(!bodies[a].is_awake());
    }

    #[test]
    fn test_contact_set_respects_capacity() {
        let mut set = ContactSet::new(2);
        for _ in 0..3 {
            set.add([None, None], Point3::origin(), Vector3::y(), 0.0);
        }
        assert_eq!(set.len(), 2);
        assert_eq!(set.remaining(), 0);
        assert_eq!(
            set.add([None, None], Point3::origin(), Vector3::y(), 0.0),
            0
        );

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.remaining(), 2);
    }

    #[test]
    fn test_contact_set_stamps_materials() {
        let mut set = ContactSet::new(4).with_materials(0.5, 0.3);
        set.add([None, None], Point3::origin(), Vector3::y(), 0.1);
        assert_relative_eq!(set.contacts()[0].friction, 0.5);
        assert_relative_eq!(set.contacts()[0].restitution, 0.3);
    }
}
