//! Rigid body dynamics for the anvil physics pipeline.
//!
//! This crate owns the lowest layer of the pipeline: rigid body state, the
//! integrator with its sleep state machine, force accumulation, and the
//! configuration-time validation that keeps bad setups out of the hot path.
//!
//! - [`RigidBody`] — mass/inertia, pose, velocities, accumulators, sleep state
//! - [`BodySet`] — exclusive owner of all bodies; everything else uses
//!   [`BodyHandle`]s
//! - [`ForceGenerator`] / [`ForceRegistry`] — per-step applied loads
//! - [`inertia`] — inertia tensors for common solids
//!
//! # Two-phase stepping contract
//!
//! Forces and torques are accumulated first (`add_force*`, `add_torque`,
//! force generators), then [`RigidBody::integrate`] consumes the
//! accumulators and clears them. Accumulation between an `integrate` and the
//! next is part of the following step.
//!
//! # Example
//!
//! ```
//! use anvil_dynamics::{inertia, BodySet, RigidBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let ball = bodies.insert(
//!     RigidBody::new(1.0, inertia::solid_sphere(1.0, 0.5))
//!         .unwrap()
//!         .with_position(Point3::new(0.0, 10.0, 0.0))
//!         .with_acceleration(Vector3::new(0.0, -9.81, 0.0)),
//! );
//!
//! bodies.integrate_all(0.01);
//! assert!(bodies[ball].position().y < 10.0);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod body;
mod error;
mod force;
pub mod inertia;

pub use body::{BodyHandle, BodySet, RigidBody, DEFAULT_SLEEP_EPSILON};
pub use error::ConfigError;
pub use force::{ForceGenerator, ForceRegistration, ForceRegistry};

/// Result type for configuration-time operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// Re-export the math types used throughout the public API.
pub use nalgebra::{Isometry3, Matrix3, Point3, UnitQuaternion, Vector3};
