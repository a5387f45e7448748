//! The physics server facade.
//!
//! Bodies never reach a physics engine directly. Every body method that needs
//! the engine takes a `&mut dyn PhysicsServer`, so the engine is injected by
//! the caller and can be swapped for a double in tests.
//!
//! Methods called with an unknown handle are no-ops (setters) or return
//! `None`/empty (queries). A handle goes stale when it is freed.

use body_types::{BodyAxis, BodyHandle, BodyMode, InstanceId, JointHandle, MotionResult};
use hashbrown::HashSet;
use nalgebra::{Isometry3, Point3, Vector3};

use crate::direct::DirectBodyState;
use crate::params::{
    Axis, BodyParam, BodyState, BodyStateKind, ConeTwistJointParam, Generic6DofFlag,
    Generic6DofParam, HingeJointFlag, HingeJointParam, PinJointParam, SliderJointParam,
};

/// Physics engine operations used by the body layer.
pub trait PhysicsServer {
    // ========================================================================
    // Body lifecycle
    // ========================================================================

    /// Allocate a new body in [`BodyMode::Static`].
    fn body_create(&mut self) -> BodyHandle;

    /// Release a body. The handle is stale afterwards.
    fn body_free(&mut self, body: BodyHandle);

    /// Set the simulation mode.
    fn body_set_mode(&mut self, body: BodyHandle, mode: BodyMode);

    /// Current simulation mode.
    fn body_get_mode(&self, body: BodyHandle) -> Option<BodyMode>;

    /// Associate the body with a scene object.
    fn body_attach_object_instance(&mut self, body: BodyHandle, instance: InstanceId);

    /// Scene object associated with the body.
    fn body_get_object_instance(&self, body: BodyHandle) -> Option<InstanceId>;

    // ========================================================================
    // State and parameters
    // ========================================================================

    /// Overwrite one piece of body state.
    fn body_set_state(&mut self, body: BodyHandle, state: BodyState);

    /// Read one piece of body state.
    fn body_get_state(&self, body: BodyHandle, kind: BodyStateKind) -> Option<BodyState>;

    /// Set a scalar parameter.
    fn body_set_param(&mut self, body: BodyHandle, param: BodyParam, value: f64);

    /// Read a scalar parameter.
    fn body_get_param(&self, body: BodyHandle, param: BodyParam) -> Option<f64>;

    /// Lock or unlock the given axes.
    fn body_set_axis_lock(&mut self, body: BodyHandle, axis: BodyAxis, locked: bool);

    /// Currently locked axes.
    fn body_get_axis_lock(&self, body: BodyHandle) -> BodyAxis;

    /// Collision layer bits.
    fn body_set_collision_layer(&mut self, body: BodyHandle, layer: u32);

    /// Collision mask bits.
    fn body_set_collision_mask(&mut self, body: BodyHandle, mask: u32);

    /// Skip the engine's own force integration (gravity, damping).
    fn body_set_omit_force_integration(&mut self, body: BodyHandle, omit: bool);

    /// How many contacts the server reports per step.
    fn body_set_max_contacts_reported(&mut self, body: BodyHandle, count: usize);

    /// Toggle continuous collision detection.
    fn body_set_continuous_collision_detection(&mut self, body: BodyHandle, enabled: bool);

    // ========================================================================
    // Collision exceptions
    // ========================================================================

    /// Never collide `body` with `excepted`.
    fn body_add_collision_exception(&mut self, body: BodyHandle, excepted: BodyHandle);

    /// Undo [`PhysicsServer::body_add_collision_exception`].
    fn body_remove_collision_exception(&mut self, body: BodyHandle, excepted: BodyHandle);

    /// Bodies `body` never collides with.
    fn body_get_collision_exceptions(&self, body: BodyHandle) -> Vec<BodyHandle>;

    // ========================================================================
    // Forces
    // ========================================================================

    /// Add a force through the center of mass for the next step.
    fn body_add_central_force(&mut self, body: BodyHandle, force: Vector3<f64>);

    /// Add a force at a position relative to the body origin.
    fn body_add_force(&mut self, body: BodyHandle, force: Vector3<f64>, position: Vector3<f64>);

    /// Add a torque for the next step.
    fn body_add_torque(&mut self, body: BodyHandle, torque: Vector3<f64>);

    /// Apply an impulse through the center of mass.
    fn body_apply_central_impulse(&mut self, body: BodyHandle, impulse: Vector3<f64>);

    /// Apply an impulse at a position relative to the body origin.
    fn body_apply_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vector3<f64>,
        position: Vector3<f64>,
    );

    /// Apply a rotational impulse.
    fn body_apply_torque_impulse(&mut self, body: BodyHandle, impulse: Vector3<f64>);

    /// Replace the velocity component along `axis_velocity` with it.
    fn body_set_axis_velocity(&mut self, body: BodyHandle, axis_velocity: Vector3<f64>);

    // ========================================================================
    // Per-step hook and queries
    // ========================================================================

    /// Install or remove the per-step state-sync hook.
    ///
    /// While installed the caller's stepping driver hands the body its
    /// [`DirectBodyState`] after every step.
    fn body_set_force_integration_callback(&mut self, body: BodyHandle, installed: bool);

    /// Whether the state-sync hook is installed.
    fn body_has_force_integration_callback(&self, body: BodyHandle) -> bool;

    /// Snapshot of the body's current integrated state.
    fn body_get_direct_state(&self, body: BodyHandle) -> Option<DirectBodyState>;

    /// Sweep `body` from `from` along `motion`.
    ///
    /// Returns `None` when nothing within `margin` is touched along the way.
    /// Bodies in `exclude` and in the collision exceptions are ignored.
    fn body_test_motion(
        &mut self,
        body: BodyHandle,
        from: &Isometry3<f64>,
        motion: &Vector3<f64>,
        margin: f64,
        exclude: &HashSet<BodyHandle>,
    ) -> Option<MotionResult>;

    // ========================================================================
    // Joints
    // ========================================================================

    /// Allocate an empty joint.
    fn joint_create(&mut self) -> JointHandle;

    /// Detach a joint from its bodies, keeping the handle.
    fn joint_clear(&mut self, joint: JointHandle);

    /// Release a joint. The handle is stale afterwards.
    fn joint_free(&mut self, joint: JointHandle);

    /// Make the joint a pin between two anchor points.
    fn joint_make_pin(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Point3<f64>,
        body_b: BodyHandle,
        local_b: Point3<f64>,
    );

    /// Make the joint a cone-twist between two frames.
    fn joint_make_cone_twist(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    );

    /// Make the joint a hinge between two frames.
    fn joint_make_hinge(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    );

    /// Make the joint a slider between two frames.
    fn joint_make_slider(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    );

    /// Make the joint a six-degree-of-freedom joint between two frames.
    fn joint_make_generic_6dof(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    );

    /// Set a pin joint parameter.
    fn pin_joint_set_param(&mut self, joint: JointHandle, param: PinJointParam, value: f64);

    /// Set a cone-twist joint parameter.
    fn cone_twist_joint_set_param(
        &mut self,
        joint: JointHandle,
        param: ConeTwistJointParam,
        value: f64,
    );

    /// Set a hinge joint parameter.
    fn hinge_joint_set_param(&mut self, joint: JointHandle, param: HingeJointParam, value: f64);

    /// Set a hinge joint flag.
    fn hinge_joint_set_flag(&mut self, joint: JointHandle, flag: HingeJointFlag, enabled: bool);

    /// Set a slider joint parameter.
    fn slider_joint_set_param(&mut self, joint: JointHandle, param: SliderJointParam, value: f64);

    /// Set a per-axis six-degree-of-freedom parameter.
    fn generic_6dof_joint_set_param(
        &mut self,
        joint: JointHandle,
        axis: Axis,
        param: Generic6DofParam,
        value: f64,
    );

    /// Set a per-axis six-degree-of-freedom flag.
    fn generic_6dof_joint_set_flag(
        &mut self,
        joint: JointHandle,
        axis: Axis,
        flag: Generic6DofFlag,
        enabled: bool,
    );

    // ========================================================================
    // Provided helpers
    // ========================================================================

    /// World transform of a body.
    fn body_get_transform(&self, body: BodyHandle) -> Option<Isometry3<f64>> {
        match self.body_get_state(body, BodyStateKind::Transform)? {
            BodyState::Transform(t) => Some(t),
            _ => None,
        }
    }

    /// Linear velocity of a body.
    fn body_get_linear_velocity(&self, body: BodyHandle) -> Option<Vector3<f64>> {
        match self.body_get_state(body, BodyStateKind::LinearVelocity)? {
            BodyState::LinearVelocity(v) => Some(v),
            _ => None,
        }
    }

    /// Angular velocity of a body.
    fn body_get_angular_velocity(&self, body: BodyHandle) -> Option<Vector3<f64>> {
        match self.body_get_state(body, BodyStateKind::AngularVelocity)? {
            BodyState::AngularVelocity(v) => Some(v),
            _ => None,
        }
    }
}
