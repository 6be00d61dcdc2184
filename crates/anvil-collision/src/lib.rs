//! Collision detection for the anvil physics pipeline.
//!
//! Three layers, cheapest first:
//!
//! - **Broad phase** ([`BoundingVolumeTree`]) — a binary hierarchy of
//!   enclosing [`BoundingSphere`]s over the dynamic bodies, reporting
//!   candidate [`PotentialContact`] pairs.
//! - **Primitives** ([`CollisionPrimitive`], [`PrimitiveShape`]) — sphere,
//!   half-space and oriented box shapes bound to bodies through a local
//!   offset, with a cached per-step world transform.
//! - **Narrow phase** ([`narrow_phase`]) — exact per-pair intersection
//!   tests writing validated contacts into an `anvil_contact::ContactSet`.
//!
//! The driving loop each step: refresh primitive transforms, query the
//! hierarchy for candidate pairs (plus static half-space checks), run
//! [`narrow_phase::generate_contacts`] on each, then hand the contact set
//! to `anvil_contact::ContactResolver`.
//!
//! # Example
//!
//! ```
//! use anvil_collision::{narrow_phase, CollisionPrimitive};
//! use anvil_contact::ContactSet;
//! use anvil_dynamics::{inertia, BodySet, RigidBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let ball = bodies.insert(
//!     RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0))
//!         .unwrap()
//!         .with_position(Point3::new(0.0, 0.5, 0.0)),
//! );
//!
//! let mut sphere = CollisionPrimitive::sphere(1.0, ball).unwrap();
//! sphere.calculate_internals(&bodies);
//! let ground = CollisionPrimitive::plane(Vector3::y(), 0.0).unwrap();
//!
//! let mut contacts = ContactSet::new(16);
//! let written = narrow_phase::generate_contacts(&sphere, &ground, &mut contacts);
//! assert_eq!(written, 1);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod broad_phase;
pub mod narrow_phase;
mod primitive;

pub use broad_phase::{BoundingSphere, BoundingVolumeTree, NodeIndex, PotentialContact};
pub use primitive::{CollisionPrimitive, PrimitiveShape};

// Re-export the neighbouring layers for driver convenience.
pub use anvil_contact::{Contact, ContactResolver, ContactSet};
pub use anvil_dynamics::{BodyHandle, BodySet, ConfigError};
