//! Unified API for the physics-body layer.
//!
//! This crate re-exports the complete stack:
//!
//! - [`body_types`] - handles, modes, axis locks, motion results, errors
//! - [`body_server`] - the [`PhysicsServer`](body_server::PhysicsServer) and
//!   [`SceneTree`](body_server::SceneTree) facades (test doubles behind the
//!   `testing` feature)
//! - [`body_contact`] - contact monitor and enter/exit events
//! - [`body_joint`] - joint kinds and their named parameters
//! - [`body_core`] - static, rigid, character and physical-bone bodies
//!
//! # Quick Start
//!
//! ```
//! use body_physics::prelude::*;
//! use body_server::testing::{TestSceneTree, TestServer};
//!
//! let mut server = TestServer::new();
//! let mut tree = TestSceneTree::new();
//! let ball_id = tree.spawn();
//!
//! let mut ball = RigidBody::new(&mut server, ball_id);
//! ball.set_mass(&mut server, 2.0).unwrap();
//! ball.set_contact_monitor(&mut tree, true);
//!
//! for mut state in server.step(1.0 / 60.0) {
//!     ball.direct_state_changed(&mut tree, &mut state);
//!     server.commit_direct_state(&state);
//! }
//! assert!(ball.drain_events().is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/body-physics/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

// Re-export sub-crates
pub use body_contact;
pub use body_core;
pub use body_joint;
pub use body_server;
pub use body_types;

// Re-export nalgebra for convenience
pub use nalgebra;

/// Prelude module for convenient imports.
///
/// Import everything you need with a single line:
///
/// ```
/// use body_physics::prelude::*;
/// ```
pub mod prelude {
    // ========================================================================
    // Core types from body-types
    // ========================================================================

    // Handles and modes
    pub use body_types::{BodyAxis, BodyHandle, BodyMode, InstanceId, JointHandle};

    // Motion
    pub use body_types::{MotionResult, project, slide};

    // Configuration and materials
    pub use body_types::{CharacterConfig, PhysicsMaterial};

    // Errors
    pub use body_types::{BodyError, Result};

    // Math
    pub use body_types::{Isometry3, Point3, UnitQuaternion, Vector3};

    // ========================================================================
    // Collaborator facades from body-server
    // ========================================================================

    pub use body_server::{ContactReport, DirectBodyState, PhysicsServer, SceneTree};

    // ========================================================================
    // Contact monitor from body-contact
    // ========================================================================

    pub use body_contact::{ContactEvent, ContactMonitor};

    // ========================================================================
    // Joints from body-joint
    // ========================================================================

    pub use body_joint::{JointData, JointType, PropertyValue};

    // ========================================================================
    // Bodies from body-core
    // ========================================================================

    pub use body_core::{
        BonePropertyValue, CharacterBody, ContactDispatch, KinematicCollision, Notification,
        PhysicalBone, PhysicsBody, RigidBody, RigidBodyEvent, Skeleton, StaticBody,
    };
}
