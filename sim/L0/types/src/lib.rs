//! Core data types for the physics-body layer.
//!
//! This crate provides the vocabulary shared by every body type:
//!
//! - [`BodyHandle`], [`JointHandle`], [`InstanceId`] - Opaque identities
//! - [`BodyMode`] - Static, kinematic, dynamic or dynamic-locked simulation
//! - [`BodyAxis`] - Per-axis lock mask
//! - [`MotionResult`] - Outcome of one swept-motion query
//! - [`PhysicsMaterial`] - Friction and bounce override
//! - [`CharacterConfig`] - Move-and-slide tuning
//! - [`BodyError`] - Precondition failures
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no server handles beyond opaque
//! ids and never call into a physics engine. The physics server facade
//! produces them, the body types consume them.
//!
//! # Coordinate System
//!
//! Bodies are Y-up by default ([`CharacterConfig::default`] uses `(0, 1, 0)`
//! as the up direction); nothing else in the layer assumes an axis.
//!
//! # Example
//!
//! ```
//! use body_types::{BodyAxis, MotionResult};
//! use nalgebra::Vector3;
//!
//! let result = MotionResult {
//!     collision_normal: Vector3::new(0.0, 1.0, 0.0),
//!     ..MotionResult::default()
//! };
//! assert!(result.angle(&Vector3::y()) < 1e-12);
//!
//! let locked = BodyAxis::LINEAR_Y;
//! let travel = locked.zero_locked_linear(Vector3::new(1.0, 2.0, 3.0));
//! assert_eq!(travel, Vector3::new(1.0, 0.0, 3.0));
//! ```

#![doc(html_root_url = "https://docs.rs/body-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
mod id;
mod material;
mod motion;

pub use body::{BodyAxis, BodyMode};
pub use config::CharacterConfig;
pub use error::BodyError;
pub use id::{BodyHandle, InstanceId, JointHandle};
pub use material::PhysicsMaterial;
pub use motion::{MotionResult, project, slide};

// Re-export math types for convenience
pub use nalgebra::{Isometry3, Matrix3, Point3, Translation3, UnitQuaternion, Vector3};

/// Result type for body operations.
pub type Result<T> = std::result::Result<T, BodyError>;

/// Tolerance added to the floor angle when classifying contacts (radians).
pub const FLOOR_ANGLE_THRESHOLD: f64 = 0.01;

/// Lengths at or below this are treated as zero.
pub const CMP_EPSILON: f64 = 0.00001;
