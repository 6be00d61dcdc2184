//! Collision primitives bound to rigid bodies.
//!
//! A [`CollisionPrimitive`] pairs a [`PrimitiveShape`] with the body it
//! follows and a local offset transform. The world transform is derived
//! once per step by [`CollisionPrimitive::calculate_internals`] and cached;
//! every narrow-phase test reads the cache, never the body.

use nalgebra::{Isometry3, Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use anvil_dynamics::{BodyHandle, BodySet, ConfigError};

use crate::broad_phase::BoundingSphere;

/// The closed set of collision shapes the narrow phase understands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimitiveShape {
    /// Sphere with the given radius.
    Sphere {
        /// Sphere radius in metres.
        radius: f64,
    },
    /// Infinite half-space; solid everywhere behind the plane
    /// `normal · x = offset`.
    Plane {
        /// Unit normal of the plane.
        normal: Vector3<f64>,
        /// Distance of the plane from the origin along the normal.
        offset: f64,
    },
    /// Oriented box with the given half-extents.
    Box {
        /// Half-extents along the box's local axes.
        half_extents: Vector3<f64>,
    },
}

impl PrimitiveShape {
    /// Validate shape parameters.
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Sphere { radius } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(ConfigError::invalid_shape("sphere radius must be positive"));
                }
            }
            Self::Plane { normal, offset } => {
                if normal.norm_squared() < 1e-12 {
                    return Err(ConfigError::invalid_shape("plane normal must be non-zero"));
                }
                if !offset.is_finite() {
                    return Err(ConfigError::invalid_shape("plane offset must be finite"));
                }
            }
            Self::Box { half_extents } => {
                if !half_extents.iter().all(|x| x.is_finite() && *x > 0.0) {
                    return Err(ConfigError::invalid_shape(
                        "box half-extents must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A collision shape attached to a rigid body (or free-standing, for static
/// geometry such as ground planes).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionPrimitive {
    body: Option<BodyHandle>,
    offset: Isometry3<f64>,
    shape: PrimitiveShape,
    transform: Isometry3<f64>,
}

impl CollisionPrimitive {
    /// Create a primitive with an explicit shape, owning body and offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] for malformed shape parameters
    /// (non-positive radius or extents, zero-length plane normal).
    pub fn new(
        shape: PrimitiveShape,
        body: Option<BodyHandle>,
        offset: Isometry3<f64>,
    ) -> Result<Self, ConfigError> {
        shape.validate()?;
        let shape = match shape {
            PrimitiveShape::Plane { normal, offset } => PrimitiveShape::Plane {
                normal: normal.normalize(),
                offset,
            },
            other => other,
        };
        Ok(Self {
            body,
            offset,
            shape,
            transform: offset,
        })
    }

    /// A sphere attached to a body with no local offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] for a non-positive radius.
    pub fn sphere(radius: f64, body: BodyHandle) -> Result<Self, ConfigError> {
        Self::new(
            PrimitiveShape::Sphere { radius },
            Some(body),
            Isometry3::identity(),
        )
    }

    /// A box attached to a body with no local offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] for non-positive half-extents.
    pub fn box_shape(half_extents: Vector3<f64>, body: BodyHandle) -> Result<Self, ConfigError> {
        Self::new(
            PrimitiveShape::Box { half_extents },
            Some(body),
            Isometry3::identity(),
        )
    }

    /// A free-standing half-space (static world geometry, no body).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] for a zero-length normal.
    pub fn plane(normal: Vector3<f64>, offset: f64) -> Result<Self, ConfigError> {
        Self::new(
            PrimitiveShape::Plane { normal, offset },
            None,
            Isometry3::identity(),
        )
    }

    /// Replace the local offset transform (builder form).
    #[must_use]
    pub fn with_offset(mut self, offset: Isometry3<f64>) -> Self {
        self.offset = offset;
        self.transform = offset;
        self
    }

    /// The body this primitive follows, if any.
    #[must_use]
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// The primitive's shape.
    #[must_use]
    pub fn shape(&self) -> &PrimitiveShape {
        &self.shape
    }

    /// The local offset from the owning body.
    #[must_use]
    pub fn offset(&self) -> &Isometry3<f64> {
        &self.offset
    }

    /// Refresh the cached world transform from the owning body's pose.
    ///
    /// Must be called once per step, after integration and before any
    /// narrow-phase test. Free-standing primitives keep their offset as
    /// their world transform.
    pub fn calculate_internals(&mut self, bodies: &BodySet) {
        self.transform = match self.body {
            Some(handle) => bodies[handle].transform() * self.offset,
            None => self.offset,
        };
    }

    /// The cached world transform.
    #[must_use]
    pub fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    /// The world rotation as a matrix; its columns are the primitive's axes.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.transform.rotation.to_rotation_matrix().into_inner()
    }

    /// The i-th world axis of the primitive (column `i` of the rotation).
    #[must_use]
    pub fn axis(&self, index: usize) -> Vector3<f64> {
        self.rotation_matrix().column(index).into_owned()
    }

    /// The primitive's world position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.transform.translation.vector)
    }

    /// An enclosing bounding sphere for broad-phase insertion.
    ///
    /// Half-spaces are unbounded and return `None`; they are tested against
    /// every dynamic body instead of being inserted into the hierarchy.
    #[must_use]
    pub fn bounding_volume(&self) -> Option<BoundingSphere> {
        let radius = match self.shape {
            PrimitiveShape::Sphere { radius } => radius,
            PrimitiveShape::Box { half_extents } => half_extents.norm(),
            PrimitiveShape::Plane { .. } => return None,
        };
        Some(BoundingSphere::new(self.position(), radius))
    }
}
