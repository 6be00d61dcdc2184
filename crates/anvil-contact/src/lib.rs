//! Contact model and sequential-impulse resolver for the anvil physics
//! pipeline.
//!
//! The narrow phase (in `anvil-collision`) writes [`Contact`]s into a
//! fixed-capacity [`ContactSet`]; the [`ContactResolver`] then removes
//! interpenetration and closing velocity in two greedy Gauss–Seidel passes,
//! propagating every applied correction into the other contacts that share
//! a body. Contacts live for exactly one simulation step.
//!
//! # Example
//!
//! ```
//! use anvil_contact::{ContactResolver, ContactSet};
//! use anvil_dynamics::{inertia, BodySet, RigidBody};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let ball = bodies.insert(
//!     RigidBody::new(1.0, inertia::solid_sphere(1.0, 1.0))
//!         .unwrap()
//!         .with_position(Point3::new(0.0, 0.95, 0.0))
//!         .with_velocity(Vector3::new(0.0, -1.0, 0.0)),
//! );
//!
//! // One contact against the ground plane, 5 cm of penetration.
//! let mut set = ContactSet::new(16);
//! set.add([Some(ball), None], Point3::origin(), Vector3::y(), 0.05);
//!
//! let mut resolver = ContactResolver::default();
//! resolver.resolve_contacts(&mut bodies, set.contacts_mut(), 0.01);
//!
//! // Penetration removed, approach cancelled.
//! assert!(bodies[ball].position().y >= 1.0 - 1e-9);
//! assert!(bodies[ball].velocity().y >= -1e-9);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod contact;
mod resolver;

pub use contact::{Contact, ContactSet};
pub use resolver::ContactResolver;

// Re-export the body types contacts refer to.
pub use anvil_dynamics::{BodyHandle, BodySet};
