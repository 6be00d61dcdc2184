//! Error types for configuration-time validation.

use thiserror::Error;

/// Errors raised when constructing bodies, primitives or solver settings.
///
/// Runtime paths (integration, narrow phase, contact resolution) never
/// return errors; invalid setups are rejected here, at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Mass was zero, negative, or not finite.
    #[error("invalid mass: {0} (must be positive and finite)")]
    InvalidMass(f64),

    /// The inertia tensor could not be inverted.
    #[error("inertia tensor is singular or near-singular")]
    SingularInertia,

    /// A collision shape had malformed parameters.
    #[error("invalid shape: {reason}")]
    InvalidShape {
        /// Description of what's wrong with the shape.
        reason: String,
    },

    /// Resolver settings were out of range.
    #[error("invalid resolver settings: {reason}")]
    InvalidResolver {
        /// Description of the offending setting.
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-shape error.
    #[must_use]
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create an invalid-resolver error.
    #[must_use]
    pub fn invalid_resolver(reason: impl Into<String>) -> Self {
        Self::InvalidResolver {
            reason: reason.into(),
        }
    }
}
