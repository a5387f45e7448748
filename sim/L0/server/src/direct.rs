//! Post-step body state handed to a body's state-sync hook.

use body_types::{BodyHandle, InstanceId};
use nalgebra::{Isometry3, Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One contact between the synced body and another body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactReport {
    /// Server handle of the other body.
    pub collider: BodyHandle,
    /// Scene identity of the other body.
    pub collider_id: InstanceId,
    /// Shape index on the other body.
    pub collider_shape: usize,
    /// Shape index on the synced body.
    pub local_shape: usize,
}

/// Fully integrated state of a body after a physics step.
///
/// The server fills this in before invoking a body's state-sync hook. Writes
/// to the velocity fields during the hook are committed back to the server
/// once the hook returns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectBodyState {
    /// Body this state belongs to.
    pub body: BodyHandle,
    /// World transform.
    pub transform: Isometry3<f64>,
    /// Linear velocity.
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity.
    pub angular_velocity: Vector3<f64>,
    /// Inverse inertia tensor in world coordinates.
    pub inverse_inertia: Matrix3<f64>,
    /// Whether the body is asleep.
    pub sleeping: bool,
    /// Length of the step that produced this state (seconds).
    pub step: f64,
    /// Contacts reported for this step.
    pub contacts: Vec<ContactReport>,
}

impl DirectBodyState {
    /// State of a body at rest with the given transform.
    #[must_use]
    pub fn at_rest(body: BodyHandle, transform: Isometry3<f64>) -> Self {
        Self {
            body,
            transform,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            inverse_inertia: Matrix3::zeros(),
            sleeping: false,
            step: 0.0,
            contacts: Vec::new(),
        }
    }

    /// Velocity of a point given relative to the body origin, in world axes.
    #[must_use]
    pub fn velocity_at_local_position(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.linear_velocity + self.angular_velocity.cross(local)
    }

    /// Number of contacts reported this step.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }
}
