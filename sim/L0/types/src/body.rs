//! Body simulation modes and axis locks.

use bitflags::bitflags;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the physics server simulates a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyMode {
    /// Never moves on its own.
    #[default]
    Static,
    /// Moved by user code; pushes dynamic bodies but is not pushed back.
    Kinematic,
    /// Fully simulated.
    Dynamic,
    /// Simulated without rotation.
    DynamicLocked,
}

impl BodyMode {
    /// Check if the server integrates forces for this mode.
    #[must_use]
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Dynamic | Self::DynamicLocked)
    }
}

bitflags! {
    /// Per-axis lock mask.
    ///
    /// Bits 0..=2 lock linear X/Y/Z motion, bits 3..=5 lock rotation about
    /// X/Y/Z.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct BodyAxis: u8 {
        /// Lock linear motion along X.
        const LINEAR_X = 1 << 0;
        /// Lock linear motion along Y.
        const LINEAR_Y = 1 << 1;
        /// Lock linear motion along Z.
        const LINEAR_Z = 1 << 2;
        /// Lock rotation about X.
        const ANGULAR_X = 1 << 3;
        /// Lock rotation about Y.
        const ANGULAR_Y = 1 << 4;
        /// Lock rotation about Z.
        const ANGULAR_Z = 1 << 5;
        /// All linear axes.
        const LINEAR = Self::LINEAR_X.bits() | Self::LINEAR_Y.bits() | Self::LINEAR_Z.bits();
        /// All angular axes.
        const ANGULAR = Self::ANGULAR_X.bits() | Self::ANGULAR_Y.bits() | Self::ANGULAR_Z.bits();
    }
}

impl BodyAxis {
    /// Zero the components of `v` whose linear axis is locked.
    #[must_use]
    pub fn zero_locked_linear(self, mut v: Vector3<f64>) -> Vector3<f64> {
        for (i, axis) in [Self::LINEAR_X, Self::LINEAR_Y, Self::LINEAR_Z]
            .into_iter()
            .enumerate()
        {
            if self.contains(axis) {
                v[i] = 0.0;
            }
        }
        v
    }
}
