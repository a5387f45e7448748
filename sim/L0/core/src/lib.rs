//! Physics bodies on top of an injected physics server.
//!
//! This crate holds the node-side half of the body layer: every body owns one
//! server handle and mirrors the server's post-step state, while all
//! narrow-phase queries and integration happen behind
//! [`PhysicsServer`](body_server::PhysicsServer).
//!
//! - [`PhysicsBody`] - shared plumbing: transform, axis locks, collision
//!   exceptions and [`PhysicsBody::move_and_collide`]
//! - [`StaticBody`] - immovable, optionally driven by constant velocities
//! - [`RigidBody`] - dynamic, with an optional contact monitor that turns the
//!   server's per-step contact list into enter/exit events
//! - [`CharacterBody`] - kinematic [`CharacterBody::move_and_slide`] with
//!   floor, wall and ceiling detection
//! - [`PhysicalBone`] - a body that drives a [`Skeleton`] bone and joins its
//!   parent bone through a configurable joint
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StaticBody   RigidBody   CharacterBody   PhysicalBone      │
//! │        └──────────┴───────────┴───────────────┘             │
//! │                        PhysicsBody                          │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ &mut dyn PhysicsServer / &mut dyn SceneTree
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  step ──► DirectBodyState ──► body.direct_state_changed()   │
//! │        ──► server.commit_direct_state()                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and synchronous: a body's state sync always
//! sees the integrated transform and velocity before any contact event of the
//! same step is produced.
//!
//! # Quick Start
//!
//! ```
//! use body_core::CharacterBody;
//! use body_server::testing::TestServer;
//! use body_types::{InstanceId, Isometry3, Point3, Vector3};
//!
//! let mut server = TestServer::new();
//! server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
//!
//! let mut character = CharacterBody::new(&mut server, InstanceId(1));
//! character.set_global_transform(&mut server, Isometry3::translation(0.0, 0.501, 0.0));
//! character.set_linear_velocity(Vector3::new(0.0, -9.8, 0.0));
//!
//! assert!(character.move_and_slide(&mut server, 1.0 / 60.0));
//! assert!(character.is_on_floor());
//! ```

#![doc(html_root_url = "https://docs.rs/body-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,       // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,           // mul_add style changes aren't always clearer
    clippy::float_cmp,                  // Exact zero checks mirror the server's contract
    clippy::too_many_lines,             // move_and_slide is one state machine
    clippy::doc_markdown,               // Not all technical terms need backticks
)]

// Shared body plumbing and move-and-collide
mod body;
mod collision;

// Body kinds
mod character;
mod physical_bone;
mod rigid_body;
mod static_body;

// Node-side collaborators
mod callback;
mod notification;
mod skeleton;

pub use body::{DEFAULT_SAFE_MARGIN, PhysicsBody};
pub use callback::{ContactHandlerFn, IntegrateForcesFn};
pub use character::CharacterBody;
pub use collision::KinematicCollision;
pub use notification::Notification;
pub use physical_bone::{BONE_NAME_PROPERTY, BonePropertyValue, PhysicalBone};
pub use rigid_body::{ContactDispatch, RigidBody, RigidBodyEvent};
pub use skeleton::{Bone, PoseOverride, Skeleton};
pub use static_body::{DEFAULT_PHYSICS_DELTA, StaticBody};
