//! Error types for body operations.

use thiserror::Error;

/// Errors raised by body setters and queries.
///
/// Every variant is reported before any state is touched, so a failed call
/// leaves the body exactly as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    /// Mass must be strictly positive.
    #[error("invalid mass: {0} (must be positive)")]
    InvalidMass(f64),

    /// Damping below the -1 floor.
    #[error("invalid {what}: {value} (must be >= -1)")]
    InvalidDamping {
        /// Which damping value was rejected.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A scalar parameter outside its allowed range.
    #[error("{what} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// Which parameter was rejected.
        what: &'static str,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// A character needs at least one slide iteration.
    #[error("invalid max slides: {0} (must be at least 1)")]
    InvalidMaxSlides(usize),

    /// The operation needs a non-zero up direction.
    #[error("up direction must not be zero")]
    ZeroUpDirection,

    /// The operation needs the node to be inside the scene tree.
    #[error("body is not inside the scene tree")]
    NotInTree,

    /// The contact monitor is dispatching events and cannot be changed now.
    #[error("contact monitor is locked while dispatching events; request the change deferred")]
    ContactMonitorLocked,

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl BodyError {
    /// Create an invalid mass error.
    #[must_use]
    pub fn invalid_mass(mass: f64) -> Self {
        Self::InvalidMass(mass)
    }

    /// Create an invalid damping error.
    #[must_use]
    pub fn invalid_damping(what: &'static str, value: f64) -> Self {
        Self::InvalidDamping { what, value }
    }

    /// Create an out of range error.
    #[must_use]
    pub fn out_of_range(what: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            what,
            value,
            min,
            max,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a rejected argument or a call made in the wrong state.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        !self.is_reentrancy()
    }

    /// Check if this is a re-entrant change of the contact monitor.
    #[must_use]
    pub fn is_reentrancy(&self) -> bool {
        matches!(self, Self::ContactMonitorLocked)
    }
}

impl BodyError {
    /// Validate a mass value: it must be strictly positive.
    pub fn check_mass(mass: f64) -> Result<(), Self> {
        if mass > 0.0 {
            Ok(())
        } else {
            Err(Self::invalid_mass(mass))
        }
    }

    /// Validate a linear or angular damping value: it must be at least -1.
    pub fn check_damping(what: &'static str, value: f64) -> Result<(), Self> {
        if value >= -1.0 {
            Ok(())
        } else {
            Err(Self::invalid_damping(what, value))
        }
    }

    /// Validate a value that must lie in `[0, 1]`.
    pub fn check_unit(what: &'static str, value: f64) -> Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::out_of_range(what, value, 0.0, 1.0))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BodyError::invalid_mass(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = BodyError::invalid_damping("linear damp", -2.0);
        assert!(err.to_string().contains("linear damp"));

        let err = BodyError::out_of_range("friction", 1.5, 0.0, 1.0);
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_checks() {
        assert!(BodyError::check_mass(0.1).is_ok());
        assert_eq!(BodyError::check_mass(0.0), Err(BodyError::InvalidMass(0.0)));
        assert!(BodyError::check_damping("angular damp", -1.0).is_ok());
        assert!(BodyError::check_damping("angular damp", -1.01).is_err());
        assert!(BodyError::check_unit("bounce", 0.0).is_ok());
        assert!(BodyError::check_unit("bounce", 1.0).is_ok());
        assert!(BodyError::check_unit("bounce", -0.1).is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(BodyError::ContactMonitorLocked.is_reentrancy());
        assert!(!BodyError::ContactMonitorLocked.is_precondition());
        assert!(BodyError::NotInTree.is_precondition());
        assert!(BodyError::invalid_config("x").is_precondition());
    }
}
