//! Swept-motion query results and the vector helpers used to slide them.

use nalgebra::{Point3, Vector3};

use crate::id::{BodyHandle, InstanceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of one swept-motion query against the physics server.
///
/// `travel + remainder` always equals the requested motion. When nothing was
/// hit the collision fields keep their defaults and `remainder` is zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionResult {
    /// Distance the body can actually move.
    pub travel: Vector3<f64>,
    /// Part of the requested motion left after the hit.
    pub remainder: Vector3<f64>,
    /// Contact point in world coordinates.
    pub collision_point: Point3<f64>,
    /// Contact normal, pointing from the collider toward the moving body.
    pub collision_normal: Vector3<f64>,
    /// Velocity of the collider at the contact point.
    pub collider_velocity: Vector3<f64>,
    /// Penetration depth at the unsafe fraction.
    pub collision_depth: f64,
    /// Largest fraction of the motion that is known not to collide.
    pub collision_safe_fraction: f64,
    /// Smallest fraction of the motion that is known to collide.
    pub collision_unsafe_fraction: f64,
    /// Shape index on the moving body.
    pub collision_local_shape: usize,
    /// Server handle of the collider, if any.
    pub collider: Option<BodyHandle>,
    /// Scene identity of the collider, if any.
    pub collider_id: Option<InstanceId>,
    /// Shape index on the collider.
    pub collider_shape: usize,
}

impl Default for MotionResult {
    fn default() -> Self {
        Self {
            travel: Vector3::zeros(),
            remainder: Vector3::zeros(),
            collision_point: Point3::origin(),
            collision_normal: Vector3::zeros(),
            collider_velocity: Vector3::zeros(),
            collision_depth: 0.0,
            collision_safe_fraction: 0.0,
            collision_unsafe_fraction: 0.0,
            collision_local_shape: 0,
            collider: None,
            collider_id: None,
            collider_shape: 0,
        }
    }
}

impl MotionResult {
    /// A result for an unobstructed motion: everything travels.
    #[must_use]
    pub fn unobstructed(motion: Vector3<f64>) -> Self {
        Self {
            travel: motion,
            collision_safe_fraction: 1.0,
            collision_unsafe_fraction: 1.0,
            ..Self::default()
        }
    }

    /// Angle in radians between the collision normal and `up`.
    ///
    /// Both vectors are expected to be normalized.
    #[must_use]
    pub fn angle(&self, up: &Vector3<f64>) -> f64 {
        self.collision_normal.dot(up).clamp(-1.0, 1.0).acos()
    }
}

/// Remove the component of `v` along the unit normal `n`.
#[must_use]
pub fn slide(v: &Vector3<f64>, n: &Vector3<f64>) -> Vector3<f64> {
    v - n * n.dot(v)
}

/// Project `v` onto `onto`. Returns zero when `onto` is zero.
#[must_use]
pub fn project(v: &Vector3<f64>, onto: &Vector3<f64>) -> Vector3<f64> {
    let len2 = onto.norm_squared();
    if len2 == 0.0 {
        return Vector3::zeros();
    }
    onto * (v.dot(onto) / len2)
}
