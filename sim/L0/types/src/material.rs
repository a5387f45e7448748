//! Surface material override for static and rigid bodies.

use crate::Result;
use crate::error::BodyError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Friction and bounce override applied to every shape of a body.
///
/// The server receives the *computed* values: a rough material sends its
/// friction negated and an absorbent material sends its bounce negated, which
/// the server reads as "take this value instead of combining with the other
/// surface".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsMaterial {
    /// Friction coefficient in `[0, 1]`.
    pub friction: f64,
    /// Use this friction instead of the combined one.
    pub rough: bool,
    /// Restitution in `[0, 1]`.
    pub bounce: f64,
    /// Use this bounce instead of the combined one.
    pub absorbent: bool,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 1.0,
            rough: false,
            bounce: 0.0,
            absorbent: false,
        }
    }
}

impl PhysicsMaterial {
    /// Create a material with the given friction and bounce.
    pub fn new(friction: f64, bounce: f64) -> Result<Self> {
        let material = Self {
            friction,
            bounce,
            ..Self::default()
        };
        material.validate()?;
        Ok(material)
    }

    /// Mark the material as rough.
    #[must_use]
    pub fn rough(mut self) -> Self {
        self.rough = true;
        self
    }

    /// Mark the material as absorbent.
    #[must_use]
    pub fn absorbent(mut self) -> Self {
        self.absorbent = true;
        self
    }

    /// Friction value sent to the server.
    #[must_use]
    pub fn computed_friction(&self) -> f64 {
        if self.rough {
            -self.friction
        } else {
            self.friction
        }
    }

    /// Bounce value sent to the server.
    #[must_use]
    pub fn computed_bounce(&self) -> f64 {
        if self.absorbent {
            -self.bounce
        } else {
            self.bounce
        }
    }

    /// Check that friction and bounce are in range.
    pub fn validate(&self) -> Result<()> {
        BodyError::check_unit("friction", self.friction)?;
        BodyError::check_unit("bounce", self.bounce)
    }
}
