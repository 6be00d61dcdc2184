//! Rigid body state, integration and the sleep state machine.
//!
//! A [`RigidBody`] owns the full dynamic state of one simulated body: mass
//! and inertia (stored inverted, the form every consumer needs), pose,
//! velocities, force/torque accumulators and the cached derived data that
//! the collision pipeline reads every step.
//!
//! Force application and integration form a two-phase contract: callers
//! accumulate forces and torques first, then [`RigidBody::integrate`]
//! consumes the accumulators and clears them. Nothing else clears them.

use nalgebra::{Isometry3, Matrix3, Point3, Quaternion, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default sleep threshold for the recency-weighted motion estimate.
pub const DEFAULT_SLEEP_EPSILON: f64 = 0.01;

/// Handle identifying a rigid body inside a [`BodySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Create a handle from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The slot this handle addresses.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body({})", self.0)
    }
}

/// Full dynamic state of one rigid body.
///
/// Mass is stored as inverse mass together with a dedicated finite-mass
/// flag; an inverse mass of zero is only ever produced by [`RigidBody::fixed`],
/// never by passing zero to [`RigidBody::new`] (that is rejected).
///
/// # Example
///
/// ```
/// use anvil_dynamics::{inertia, RigidBody};
/// use nalgebra::Vector3;
///
/// let mut body = RigidBody::new(2.0, inertia::solid_sphere(2.0, 0.5)).unwrap();
/// body.set_acceleration(Vector3::new(0.0, -9.81, 0.0));
/// body.integrate(0.01);
/// assert!(body.velocity().y < 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    inverse_mass: f64,
    finite_mass: bool,
    inverse_inertia_body: Matrix3<f64>,
    inverse_inertia_world: Matrix3<f64>,
    linear_damping: f64,
    angular_damping: f64,
    position: Point3<f64>,
    orientation: UnitQuaternion<f64>,
    velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    transform: Isometry3<f64>,
    force_accum: Vector3<f64>,
    torque_accum: Vector3<f64>,
    acceleration: Vector3<f64>,
    last_frame_acceleration: Vector3<f64>,
    awake: bool,
    can_sleep: bool,
    motion: f64,
    sleep_epsilon: f64,
}

impl RigidBody {
    /// Create a body with the given mass and body-space inertia tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMass`] if the mass is not positive and
    /// finite, and [`ConfigError::SingularInertia`] if the inertia tensor
    /// cannot be inverted.
    pub fn new(mass: f64, inertia_tensor: Matrix3<f64>) -> Result<Self, ConfigError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::InvalidMass(mass));
        }
        let inverse_inertia = inertia_tensor
            .try_inverse()
            .ok_or(ConfigError::SingularInertia)?;
        if !inverse_inertia.iter().all(|x| x.is_finite()) {
            return Err(ConfigError::SingularInertia);
        }

        let mut body = Self {
            inverse_mass: 1.0 / mass,
            finite_mass: true,
            inverse_inertia_body: inverse_inertia,
            ..Self::fixed()
        };
        body.calculate_derived_data();
        Ok(body)
    }

    /// Create an immovable body of effectively infinite mass.
    ///
    /// Infinite-mass bodies never accelerate: their inverse mass and inverse
    /// inertia are zero, and the finite-mass flag distinguishes this from a
    /// misconfigured zero mass.
    #[must_use]
    pub fn fixed() -> Self {
        Self {
            inverse_mass: 0.0,
            finite_mass: false,
            inverse_inertia_body: Matrix3::zeros(),
            inverse_inertia_world: Matrix3::zeros(),
            linear_damping: 1.0,
            angular_damping: 1.0,
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            transform: Isometry3::identity(),
            force_accum: Vector3::zeros(),
            torque_accum: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            last_frame_acceleration: Vector3::zeros(),
            awake: true,
            can_sleep: true,
            motion: 2.0 * DEFAULT_SLEEP_EPSILON,
            sleep_epsilon: DEFAULT_SLEEP_EPSILON,
        }
    }

    /// Set the body's position (builder form).
    #[must_use]
    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.set_position(position);
        self
    }

    /// Set the body's velocity (builder form).
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set linear and angular damping (builder form).
    #[must_use]
    pub fn with_damping(mut self, linear: f64, angular: f64) -> Self {
        self.set_damping(linear, angular);
        self
    }

    /// Set the constant acceleration, typically gravity (builder form).
    #[must_use]
    pub fn with_acceleration(mut self, acceleration: Vector3<f64>) -> Self {
        self.acceleration = acceleration;
        self
    }

    // --- mass & inertia -------------------------------------------------

    /// Replace the body's mass.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMass`] for a non-positive or
    /// non-finite mass.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), ConfigError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::InvalidMass(mass));
        }
        self.inverse_mass = 1.0 / mass;
        self.finite_mass = true;
        Ok(())
    }

    /// The body's mass, `f64::INFINITY` for fixed bodies.
    #[must_use]
    pub fn mass(&self) -> f64 {
        if self.finite_mass {
            1.0 / self.inverse_mass
        } else {
            f64::INFINITY
        }
    }

    /// Inverse mass (zero for fixed bodies).
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Whether the body has finite mass and can be accelerated.
    #[must_use]
    pub fn has_finite_mass(&self) -> bool {
        self.finite_mass
    }

    /// Replace the body-space inertia tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SingularInertia`] if the tensor cannot be
    /// inverted.
    pub fn set_inertia_tensor(&mut self, inertia_tensor: Matrix3<f64>) -> Result<(), ConfigError> {
        let inverse = inertia_tensor
            .try_inverse()
            .ok_or(ConfigError::SingularInertia)?;
        if !inverse.iter().all(|x| x.is_finite()) {
            return Err(ConfigError::SingularInertia);
        }
        self.inverse_inertia_body = inverse;
        self.calculate_derived_data();
        Ok(())
    }

    /// Body-space inverse inertia tensor.
    #[must_use]
    pub fn inverse_inertia_tensor(&self) -> &Matrix3<f64> {
        &self.inverse_inertia_body
    }

    /// World-space inverse inertia tensor, cached by
    /// [`calculate_derived_data`](Self::calculate_derived_data).
    #[must_use]
    pub fn inverse_inertia_tensor_world(&self) -> &Matrix3<f64> {
        &self.inverse_inertia_world
    }

    // --- pose & velocity ------------------------------------------------

    /// World position of the body's origin.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Set the world position and refresh derived data.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
        self.calculate_derived_data();
    }

    /// Orientation as a unit quaternion.
    #[must_use]
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    /// Set the orientation (renormalized) and refresh derived data.
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.orientation = orientation;
        self.calculate_derived_data();
    }

    /// Linear velocity in world space.
    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    /// Set the linear velocity.
    pub fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.velocity = velocity;
    }

    /// Add to the linear velocity (used when applying impulses).
    pub fn add_velocity(&mut self, delta: Vector3<f64>) {
        self.velocity += delta;
    }

    /// Angular velocity in world space.
    #[must_use]
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Set the angular velocity.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3<f64>) {
        self.angular_velocity = angular_velocity;
    }

    /// Add to the angular velocity (used when applying impulsive torques).
    pub fn add_rotation(&mut self, delta: Vector3<f64>) {
        self.angular_velocity += delta;
    }

    /// Directly shift the position without touching derived data.
    ///
    /// The position-correction pass uses this together with
    /// [`add_orientation`](Self::add_orientation) and refreshes derived data
    /// itself once both deltas are in.
    pub fn add_position(&mut self, delta: Vector3<f64>) {
        self.position += delta;
    }

    /// Apply a small rotation `delta` (an axis-angle style increment) to the
    /// orientation without renormalizing; callers refresh derived data after.
    pub fn add_orientation(&mut self, delta: Vector3<f64>) {
        let spin = Quaternion::from_parts(0.0, delta);
        let q = self.orientation.into_inner();
        self.orientation = UnitQuaternion::new_unchecked(q + spin * q * 0.5);
    }

    /// Set linear and angular damping coefficients.
    ///
    /// Damping is applied as `damping^dt`, so it is frame-rate independent;
    /// `1.0` disables damping entirely.
    pub fn set_damping(&mut self, linear: f64, angular: f64) {
        self.linear_damping = linear;
        self.angular_damping = angular;
    }

    /// Linear damping coefficient.
    #[must_use]
    pub fn linear_damping(&self) -> f64 {
        self.linear_damping
    }

    /// Angular damping coefficient.
    #[must_use]
    pub fn angular_damping(&self) -> f64 {
        self.angular_damping
    }

    /// Set the constant acceleration applied every step (e.g. gravity).
    pub fn set_acceleration(&mut self, acceleration: Vector3<f64>) {
        self.acceleration = acceleration;
    }

    /// The constant acceleration applied every step.
    #[must_use]
    pub fn acceleration(&self) -> Vector3<f64> {
        self.acceleration
    }

    /// The total acceleration the body experienced during the last
    /// integration step. The contact resolver uses this to separate
    /// acceleration-induced velocity from genuine closing velocity.
    #[must_use]
    pub fn last_frame_acceleration(&self) -> Vector3<f64> {
        self.last_frame_acceleration
    }

    /// Cached world transform (position and orientation).
    #[must_use]
    pub fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    /// Transform a body-local point into world space.
    #[must_use]
    pub fn point_in_world_space(&self, point: &Point3<f64>) -> Point3<f64> {
        self.transform * point
    }

    /// Transform a world point into body-local space.
    #[must_use]
    pub fn point_in_local_space(&self, point: &Point3<f64>) -> Point3<f64> {
        self.transform.inverse_transform_point(point)
    }

    // --- force accumulation ---------------------------------------------

    /// Accumulate a force acting through the centre of mass.
    ///
    /// Wakes the body.
    pub fn add_force(&mut self, force: Vector3<f64>) {
        self.force_accum += force;
        self.awake = true;
    }

    /// Accumulate a force acting at a world-space point, inducing torque
    /// about the centre of mass. Wakes the body.
    pub fn add_force_at_point(&mut self, force: Vector3<f64>, point: Point3<f64>) {
        let arm = point - self.position;
        self.force_accum += force;
        self.torque_accum += arm.cross(&force);
        self.awake = true;
    }

    /// Accumulate a force acting at a body-local point. Wakes the body.
    pub fn add_force_at_body_point(&mut self, force: Vector3<f64>, point: Point3<f64>) {
        let world = self.point_in_world_space(&point);
        self.add_force_at_point(force, world);
    }

    /// Accumulate a torque about the centre of mass. Wakes the body.
    pub fn add_torque(&mut self, torque: Vector3<f64>) {
        self.torque_accum += torque;
        self.awake = true;
    }

    /// Zero the force and torque accumulators.
    pub fn clear_accumulators(&mut self) {
        self.force_accum = Vector3::zeros();
        self.torque_accum = Vector3::zeros();
    }

    // --- sleep state machine --------------------------------------------

    /// Whether the body is awake and participating in integration.
    #[must_use]
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Wake the body or put it to sleep.
    ///
    /// Sleeping zeroes both velocities; waking seeds the motion estimate
    /// above the sleep threshold so the body does not fall straight back
    /// asleep.
    pub fn set_awake(&mut self, awake: bool) {
        if awake {
            self.awake = true;
            self.motion = 2.0 * self.sleep_epsilon;
        } else {
            self.awake = false;
            self.velocity = Vector3::zeros();
            self.angular_velocity = Vector3::zeros();
        }
    }

    /// Whether the body is allowed to fall asleep.
    #[must_use]
    pub fn can_sleep(&self) -> bool {
        self.can_sleep
    }

    /// Allow or forbid sleeping. Forbidding wakes a sleeping body.
    pub fn set_can_sleep(&mut self, can_sleep: bool) {
        self.can_sleep = can_sleep;
        if !can_sleep && !self.awake {
            self.set_awake(true);
        }
    }

    /// Set the motion threshold below which this body falls asleep.
    pub fn set_sleep_epsilon(&mut self, epsilon: f64) {
        self.sleep_epsilon = epsilon;
    }

    /// The recency-weighted motion estimate driving the sleep decision.
    #[must_use]
    pub fn motion(&self) -> f64 {
        self.motion
    }

    // --- integration ----------------------------------------------------

    /// Rebuild the cached world transform and world-space inverse inertia
    /// tensor from the current position and orientation.
    ///
    /// The orientation is renormalized first, so repeated quaternion
    /// increments cannot drift it off the unit manifold.
    pub fn calculate_derived_data(&mut self) {
        self.orientation.renormalize();
        self.transform = Isometry3::from_parts(self.position.coords.into(), self.orientation);

        let r = self.orientation.to_rotation_matrix().into_inner();
        self.inverse_inertia_world = r * self.inverse_inertia_body * r.transpose();
    }

    /// Advance the body's state by `dt` seconds.
    ///
    /// No-op while asleep. Consumes and clears the force/torque
    /// accumulators, applies frame-rate independent damping, advances pose,
    /// refreshes derived data and evaluates the sleep condition.
    pub fn integrate(&mut self, dt: f64) {
        if !self.awake {
            return;
        }

        self.last_frame_acceleration = self.acceleration + self.force_accum * self.inverse_mass;
        let angular_acceleration = self.inverse_inertia_world * self.torque_accum;

        self.velocity += self.last_frame_acceleration * dt;
        self.angular_velocity += angular_acceleration * dt;

        self.velocity *= self.linear_damping.powf(dt);
        self.angular_velocity *= self.angular_damping.powf(dt);

        self.position += self.velocity * dt;
        self.add_orientation(self.angular_velocity * dt);

        self.calculate_derived_data();
        self.clear_accumulators();

        if self.can_sleep {
            let current = self.velocity.norm_squared() + self.angular_velocity.norm_squared();
            let bias = 0.5_f64.powf(dt);
            self.motion = bias * self.motion + (1.0 - bias) * current;

            if self.motion < self.sleep_epsilon {
                self.set_awake(false);
            } else if self.motion > 10.0 * self.sleep_epsilon {
                self.motion = 10.0 * self.sleep_epsilon;
            }
        }
    }
}

/// Exclusive owner of every rigid body in a simulation scene.
///
/// Everything else in the pipeline (collision primitives, BVH leaves,
/// contacts) refers to bodies only through [`BodyHandle`]s.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodySet {
    bodies: Vec<RigidBody>,
}

impl BodySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body, returning its handle.
    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle::new(self.bodies.len() as u32);
        self.bodies.push(body);
        handle
    }

    /// Borrow a body.
    #[must_use]
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.index())
    }

    /// Mutably borrow a body.
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.index())
    }

    /// Mutably borrow two distinct bodies at once.
    ///
    /// Needed by the contact resolver to apply equal-and-opposite impulses
    /// in one go. `a` and `b` must differ.
    pub fn pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> (&mut RigidBody, &mut RigidBody) {
        assert_ne!(a, b, "pair_mut requires two distinct handles");
        let (lo, hi) = (a.index().min(b.index()), a.index().max(b.index()));
        let (head, tail) = self.bodies.split_at_mut(hi);
        if a.index() < b.index() {
            (&mut head[lo], &mut tail[0])
        } else {
            (&mut tail[0], &mut head[lo])
        }
    }

    /// Iterate over all bodies.
    pub fn iter(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter()
    }

    /// Iterate mutably over all bodies.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> {
        self.bodies.iter_mut()
    }

    /// Iterate over handle/body pairs.
    pub fn iter_with_handles(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (BodyHandle::new(i as u32), b))
    }

    /// Number of bodies in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Integrate every awake body forward by `dt`.
    pub fn integrate_all(&mut self, dt: f64) {
        for body in &mut self.bodies {
            body.integrate(dt);
        }
    }
}

impl std::ops::Index<BodyHandle> for BodySet {
    type Output = RigidBody;

    fn index(&self, handle: BodyHandle) -> &RigidBody {
        &self.bodies[handle.index()]
    }
}

impl std::ops::IndexMut<BodyHandle> for BodySet {
    fn index_mut(&mut self, handle: BodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle.index()]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::inertia;
    use approx::assert_relative_eq;

    fn unit_sphere_body() -> RigidBody {
        RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_construction_rejects_bad_mass() {
        assert!(matches!(
            RigidBody::new(0.0, Matrix3::identity()),
            Err(ConfigError::InvalidMass(_))
        ));
        assert!(matches!(
            RigidBody::new(-2.0, Matrix3::identity()),
            Err(ConfigError::InvalidMass(_))
        ));
        assert!(matches!(
            RigidBody::new(f64::NAN, Matrix3::identity()),
            Err(ConfigError::InvalidMass(_))
        ));
    }

    #[test]
    fn test_construction_rejects_singular_inertia() {
        assert!(matches!(
            RigidBody::new(1.0, Matrix3::zeros()),
            Err(ConfigError::SingularInertia)
        ));
    }

    #[test]
    fn test_fixed_body_has_infinite_mass() {
        let body = RigidBody::fixed();
        assert!(!body.has_finite_mass());
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(body.mass().is_infinite());
    }

    #[test]
    fn test_integrate_constant_velocity() {
        let mut body = unit_sphere_body().with_velocity(Vector3::new(1.0, 0.0, 0.0));
        body.integrate(1.0);
        assert_relative_eq!(body.position().x, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_integrate_applies_gravity() {
        let mut body = unit_sphere_body().with_acceleration(Vector3::new(0.0, -10.0, 0.0));
        body.integrate(0.5);
        assert_relative_eq!(body.velocity().y, -5.0, epsilon = 1e-10);
        // Semi-implicit: position moves with the updated velocity.
        assert_relative_eq!(body.position().y, -2.5, epsilon = 1e-10);
    }

    #[test]
    fn test_force_accumulators_cleared_after_integrate() {
        let mut body = unit_sphere_body();
        body.add_force(Vector3::new(10.0, 0.0, 0.0));
        body.integrate(0.1);
        let v_after_first = body.velocity().x;
        body.integrate(0.1);
        // No further force: velocity unchanged apart from (unit) damping.
        assert_relative_eq!(body.velocity().x, v_after_first, epsilon = 1e-10);
    }

    #[test]
    fn test_force_at_point_induces_torque() {
        let mut body = unit_sphere_body();
        body.add_force_at_point(Vector3::new(0.0, 1.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        body.integrate(0.1);
        // r × F = (1,0,0) × (0,1,0) = (0,0,1)
        assert!(body.angular_velocity().z > 0.0);
    }

    #[test]
    fn test_damping_is_framerate_independent() {
        let mut one_step = unit_sphere_body()
            .with_velocity(Vector3::new(1.0, 0.0, 0.0))
            .with_damping(0.5, 0.5);
        let mut two_steps = one_step.clone();

        one_step.integrate(1.0);
        two_steps.integrate(0.5);
        two_steps.integrate(0.5);

        assert_relative_eq!(
            one_step.velocity().x,
            two_steps.velocity().x,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_orientation_stays_normalized() {
        let mut body = unit_sphere_body();
        body.set_angular_velocity(Vector3::new(3.0, 2.0, 1.0));
        body.set_can_sleep(false);
        for _ in 0..1000 {
            body.integrate(0.01);
        }
        assert_relative_eq!(body.orientation().into_inner().norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_world_inertia_follows_orientation() {
        // A box has distinct principal moments; rotating it 90 degrees about
        // Z swaps the world-space X and Y entries.
        let inertia = inertia::solid_cuboid(12.0, Vector3::new(1.0, 0.5, 0.25));
        let mut body = RigidBody::new(12.0, inertia).unwrap();
        let ixx = body.inverse_inertia_tensor_world()[(0, 0)];
        let iyy = body.inverse_inertia_tensor_world()[(1, 1)];

        body.set_orientation(UnitQuaternion::from_euler_angles(
            0.0,
            0.0,
            std::f64::consts::FRAC_PI_2,
        ));
        assert_relative_eq!(body.inverse_inertia_tensor_world()[(0, 0)], iyy, epsilon = 1e-10);
        assert_relative_eq!(body.inverse_inertia_tensor_world()[(1, 1)], ixx, epsilon = 1e-10);
    }

    #[test]
    fn test_slow_body_falls_asleep() {
        let mut body = unit_sphere_body().with_velocity(Vector3::new(1e-4, 0.0, 0.0));
        for _ in 0..2000 {
            body.integrate(0.01);
            if !body.is_awake() {
                break;
            }
        }
        assert!(!body.is_awake());
        assert_eq!(body.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_asleep_body_does_not_integrate() {
        let mut body = unit_sphere_body().with_acceleration(Vector3::new(0.0, -9.81, 0.0));
        body.set_awake(false);
        body.integrate(1.0);
        assert_eq!(body.position(), Point3::origin());
        assert_eq!(body.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_add_force_wakes_body() {
        let mut body = unit_sphere_body();
        body.set_awake(false);
        body.add_force(Vector3::new(1.0, 0.0, 0.0));
        assert!(body.is_awake());
    }

    #[test]
    fn test_forbidding_sleep_wakes_body() {
        let mut body = unit_sphere_body();
        body.set_awake(false);
        body.set_can_sleep(false);
        assert!(body.is_awake());
    }

    #[test]
    fn test_body_set_pair_mut() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(unit_sphere_body());
        let b = bodies.insert(unit_sphere_body().with_position(Point3::new(1.0, 0.0, 0.0)));

        let (body_a, body_b) = bodies.pair_mut(a, b);
        body_a.add_velocity(Vector3::new(1.0, 0.0, 0.0));
        body_b.add_velocity(Vector3::new(-1.0, 0.0, 0.0));

        assert_relative_eq!(bodies[a].velocity().x, 1.0);
        assert_relative_eq!(bodies[b].velocity().x, -1.0);

        // Order of handles must not matter.
        let (body_b, body_a) = bodies.pair_mut(b, a);
        body_b.add_velocity(Vector3::new(-1.0, 0.0, 0.0));
        body_a.add_velocity(Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(bodies[a].velocity().x, 2.0);
        assert_relative_eq!(bodies[b].velocity().x, -2.0);
    }

    #[test]
    fn test_point_space_round_trip() {
        let mut body = unit_sphere_body();
        body.set_position(Point3::new(1.0, 2.0, 3.0));
        body.set_orientation(UnitQuaternion::from_euler_angles(0.3, 0.2, 0.1));

        let local = Point3::new(0.5, -0.5, 0.25);
        let world = body.point_in_world_space(&local);
        let back = body.point_in_local_space(&world);
        assert_relative_eq!(back.coords, local.coords, epsilon = 1e-10);
    }
}
