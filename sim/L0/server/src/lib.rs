//! Collaborator facades for the physics-body layer.
//!
//! Bodies talk to two external systems, both injected as trait objects:
//!
//! - [`PhysicsServer`] - the physics engine: body/joint handles, parameters,
//!   swept-motion queries, post-step state
//! - [`SceneTree`] - node existence, tree membership and tree-signal
//!   subscriptions
//!
//! ```text
//!  ┌──────────────┐  &mut dyn PhysicsServer   ┌──────────────────┐
//!  │  body-core   │ ────────────────────────► │  physics engine  │
//!  │  (bodies)    │                           └──────────────────┘
//!  │              │  &mut dyn SceneTree       ┌──────────────────┐
//!  │              │ ────────────────────────► │  scene graph     │
//!  └──────────────┘                           └──────────────────┘
//! ```
//!
//! With the `testing` feature, [`testing`] provides in-memory doubles for
//! both.

#![doc(html_root_url = "https://docs.rs/body-server/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::too_many_arguments,        // Joint constructors mirror the server API
)]

mod direct;
mod params;
mod scene;
mod server;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use direct::{ContactReport, DirectBodyState};
pub use params::{
    Axis, BodyParam, BodyState, BodyStateKind, ConeTwistJointParam, Generic6DofFlag,
    Generic6DofParam, HingeJointFlag, HingeJointParam, JointKind, PinJointParam,
    SliderJointParam,
};
pub use scene::SceneTree;
pub use server::PhysicsServer;
