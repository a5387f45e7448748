//! Shared body plumbing: server handle, transform, axis locks and
//! move-and-collide.

use std::cell::RefCell;
use std::rc::Rc;

use body_server::{BodyState, PhysicsServer, SceneTree};
use body_types::{
    BodyAxis, BodyError, BodyHandle, BodyMode, CMP_EPSILON, InstanceId, Isometry3, MotionResult,
    Result, Vector3,
};
use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::collision::{KinematicCollision, ShapeOwners};

/// Margin used by the convenience move and test calls.
pub const DEFAULT_SAFE_MARGIN: f64 = 0.001;

/// Base every body kind is built on.
///
/// Owns exactly one server body handle, created in [`PhysicsBody::new`] and
/// released by [`PhysicsBody::free`]. The global transform lives here; writes
/// through [`PhysicsBody::set_global_transform`] are forwarded to the server,
/// silent writes are not.
#[derive(Debug)]
pub struct PhysicsBody {
    rid: BodyHandle,
    instance: InstanceId,
    mode: BodyMode,
    locked_axes: BodyAxis,
    transform: Isometry3<f64>,
    inside_tree: bool,
    top_level: bool,
    notify_local_transform: bool,
    only_update_transform_changes: bool,
    collision_layer: u32,
    collision_mask: u32,
    shape_owners: ShapeOwners,
    motion_cache: Option<KinematicCollision>,
}

impl PhysicsBody {
    /// Create the server body, attach `instance` to it and set `mode`.
    pub fn new(server: &mut dyn PhysicsServer, instance: InstanceId, mode: BodyMode) -> Self {
        let rid = server.body_create();
        server.body_attach_object_instance(rid, instance);
        server.body_set_mode(rid, mode);
        debug!(%rid, %instance, ?mode, "body created");
        Self {
            rid,
            instance,
            mode,
            locked_axes: BodyAxis::empty(),
            transform: Isometry3::identity(),
            inside_tree: false,
            top_level: false,
            notify_local_transform: false,
            only_update_transform_changes: false,
            collision_layer: 1,
            collision_mask: 1,
            shape_owners: Rc::new(RefCell::new(vec![instance])),
            motion_cache: None,
        }
    }

    /// Release the server body.
    pub fn free(self, server: &mut dyn PhysicsServer) {
        debug!(rid = %self.rid, "body freed");
        server.body_free(self.rid);
    }

    /// Server handle of this body.
    #[must_use]
    pub fn rid(&self) -> BodyHandle {
        self.rid
    }

    /// Scene identity of this body.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Current body mode.
    #[must_use]
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, server: &mut dyn PhysicsServer, mode: BodyMode) {
        if self.mode != mode {
            debug!(rid = %self.rid, from = ?self.mode, to = ?mode, "body mode changed");
        }
        self.mode = mode;
        server.body_set_mode(self.rid, mode);
    }

    // ========================================================================
    // Transform
    // ========================================================================

    /// Global transform of the node.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.transform
    }

    /// Set the global transform and forward it to the server.
    ///
    /// Nothing is forwarded while only transform changes are being observed
    /// (a kinematic static body syncing from the server).
    pub fn set_global_transform(&mut self, server: &mut dyn PhysicsServer, transform: Isometry3<f64>) {
        self.transform = transform;
        if !self.only_update_transform_changes {
            server.body_set_state(self.rid, BodyState::Transform(transform));
        }
    }

    /// Set the global transform without telling anyone.
    pub(crate) fn set_global_transform_silently(&mut self, transform: Isometry3<f64>) {
        self.transform = transform;
    }

    pub(crate) fn notify_local_transform(&self) -> bool {
        self.notify_local_transform
    }

    pub(crate) fn set_notify_local_transform(&mut self, enabled: bool) {
        self.notify_local_transform = enabled;
    }

    pub(crate) fn set_only_update_transform_changes(&mut self, enabled: bool) {
        self.only_update_transform_changes = enabled;
    }

    /// Whether the transform ignores parent nodes.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    pub(crate) fn set_top_level(&mut self, top_level: bool) {
        self.top_level = top_level;
    }

    // ========================================================================
    // Tree membership
    // ========================================================================

    /// Whether the node is inside the scene tree.
    #[must_use]
    pub fn is_inside_tree(&self) -> bool {
        self.inside_tree
    }

    pub(crate) fn set_inside_tree(&mut self, inside: bool) {
        self.inside_tree = inside;
    }

    // ========================================================================
    // Collision filtering
    // ========================================================================

    /// Collision layer bits.
    #[must_use]
    pub fn collision_layer(&self) -> u32 {
        self.collision_layer
    }

    /// Set the collision layer bits.
    pub fn set_collision_layer(&mut self, server: &mut dyn PhysicsServer, layer: u32) {
        self.collision_layer = layer;
        server.body_set_collision_layer(self.rid, layer);
    }

    /// Collision mask bits.
    #[must_use]
    pub fn collision_mask(&self) -> u32 {
        self.collision_mask
    }

    /// Set the collision mask bits.
    pub fn set_collision_mask(&mut self, server: &mut dyn PhysicsServer, mask: u32) {
        self.collision_mask = mask;
        server.body_set_collision_mask(self.rid, mask);
    }

    /// Stop this body from colliding with `other`.
    pub fn add_collision_exception_with(&mut self, server: &mut dyn PhysicsServer, other: BodyHandle) {
        server.body_add_collision_exception(self.rid, other);
    }

    /// Let this body collide with `other` again.
    pub fn remove_collision_exception_with(
        &mut self,
        server: &mut dyn PhysicsServer,
        other: BodyHandle,
    ) {
        server.body_remove_collision_exception(self.rid, other);
    }

    /// Nodes this body does not collide with. Stale ones are dropped.
    #[must_use]
    pub fn collision_exceptions(
        &self,
        server: &dyn PhysicsServer,
        tree: &dyn SceneTree,
    ) -> Vec<InstanceId> {
        server
            .body_get_collision_exceptions(self.rid)
            .into_iter()
            .filter_map(|h| server.body_get_object_instance(h))
            .filter(|id| tree.instance_exists(*id))
            .collect()
    }

    /// Set which node owns each collision shape, by shape index.
    ///
    /// Defaults to the body itself for shape 0.
    pub fn set_shape_owners(&mut self, owners: Vec<InstanceId>) {
        *self.shape_owners.borrow_mut() = owners;
    }

    // ========================================================================
    // Axis locks
    // ========================================================================

    /// Lock or unlock the given axes.
    pub fn set_axis_lock(&mut self, server: &mut dyn PhysicsServer, axis: BodyAxis, lock: bool) {
        self.locked_axes.set(axis, lock);
        server.body_set_axis_lock(self.rid, axis, lock);
    }

    /// Whether any of the given axes is locked.
    #[must_use]
    pub fn axis_lock(&self, axis: BodyAxis) -> bool {
        self.locked_axes.intersects(axis)
    }

    /// Every locked axis.
    #[must_use]
    pub fn locked_axes(&self) -> BodyAxis {
        self.locked_axes
    }

    // ========================================================================
    // Motion
    // ========================================================================

    /// Sweep the body along `motion` and move it unless `test_only`.
    ///
    /// Returns the collision, or `None` if the whole motion is free. With
    /// `cancel_sliding`, travel that only drifted sideways because of
    /// penetration recovery is projected back onto the motion direction, as
    /// long as the collision is shallow. Travel along locked linear axes is
    /// always dropped.
    pub fn move_and_collide(
        &mut self,
        server: &mut dyn PhysicsServer,
        motion: Vector3<f64>,
        margin: f64,
        test_only: bool,
        cancel_sliding: bool,
        exclude: &HashSet<BodyHandle>,
    ) -> Option<MotionResult> {
        let mut gt = self.transform;
        let hit = server.body_test_motion(self.rid, &gt, &motion, margin, exclude);
        let colliding = hit.is_some();
        let mut result = hit.unwrap_or_else(|| MotionResult::unobstructed(motion));

        let mut cancel_sliding = cancel_sliding;
        if cancel_sliding {
            let motion_length = motion.norm();
            let mut precision = 0.001;

            if colliding {
                // Depth is measured on the unsafe motion, so resting contacts
                // can sit slightly deeper than the margin.
                precision += motion_length
                    * (result.collision_unsafe_fraction - result.collision_safe_fraction);
                if result.collision_depth > margin + precision {
                    cancel_sliding = false;
                }
            }

            if cancel_sliding {
                let motion_normal = if motion_length > CMP_EPSILON {
                    motion / motion_length
                } else {
                    Vector3::zeros()
                };
                let projected_length = result.travel.dot(&motion_normal);
                let recovery = result.travel - motion_normal * projected_length;
                if recovery.norm() < margin + precision {
                    result.travel = motion_normal * projected_length;
                    result.remainder = motion - result.travel;
                }
            }
        }

        result.travel = self.locked_axes.zero_locked_linear(result.travel);

        trace!(
            rid = %self.rid,
            colliding,
            travel = ?result.travel,
            remainder = ?result.remainder,
            "move_and_collide"
        );

        if !test_only {
            gt.translation.vector += result.travel;
            self.set_global_transform(server, gt);
        }

        colliding.then_some(result)
    }

    /// Move along `motion` and report the collision as a cached
    /// [`KinematicCollision`].
    ///
    /// The same cached report is overwritten by every colliding call.
    pub fn move_and_collide_cached(
        &mut self,
        server: &mut dyn PhysicsServer,
        motion: Vector3<f64>,
        test_only: bool,
        margin: f64,
    ) -> Option<&KinematicCollision> {
        let result =
            self.move_and_collide(server, motion, margin, test_only, true, &HashSet::new())?;
        let collision = KinematicCollision::new(result, &self.shape_owners);
        Some(self.motion_cache.insert(collision))
    }

    /// Whether moving from `from` along `motion` would collide.
    ///
    /// Never moves the body.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::NotInTree`] if the body is outside the scene tree.
    pub fn test_move(
        &self,
        server: &mut dyn PhysicsServer,
        from: &Isometry3<f64>,
        motion: &Vector3<f64>,
        margin: f64,
    ) -> Result<Option<KinematicCollision>> {
        if !self.inside_tree {
            return Err(BodyError::NotInTree);
        }
        Ok(server
            .body_test_motion(self.rid, from, motion, margin, &HashSet::new())
            .map(|result| self.collision_report(result)))
    }

    pub(crate) fn collision_report(&self, result: MotionResult) -> KinematicCollision {
        KinematicCollision::new(result, &self.shape_owners)
    }
}
