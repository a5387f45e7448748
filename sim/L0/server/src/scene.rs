//! The scene tree facade.
//!
//! The contact monitor needs to know whether the nodes it tracks still exist
//! and whether they are inside the tree, and it subscribes to their
//! tree-entered / tree-exiting notifications while they touch the body. The
//! host forwards those notifications back through
//! `RigidBody::body_enter_tree` / `RigidBody::body_exit_tree`.

use body_types::InstanceId;

/// Scene-graph queries and subscriptions used by the body layer.
pub trait SceneTree {
    /// Whether the object still exists. Destroyed ids are never reused.
    fn instance_exists(&self, id: InstanceId) -> bool;

    /// Whether the object is a node currently inside the tree.
    fn is_inside_tree(&self, id: InstanceId) -> bool;

    /// Forward `target`'s tree-entered and tree-exiting notifications to
    /// `watcher`.
    fn connect_tree_signals(&mut self, watcher: InstanceId, target: InstanceId);

    /// Undo [`SceneTree::connect_tree_signals`].
    fn disconnect_tree_signals(&mut self, watcher: InstanceId, target: InstanceId);
}
