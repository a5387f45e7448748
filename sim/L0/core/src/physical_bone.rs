//! Physical bones: bodies that drive a skeleton bone while simulating.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use body_joint::{JointData, JointType, PropertyValue};
use body_server::{BodyParam, BodyState, DirectBodyState, PhysicsServer};
use body_types::{
    BodyError, BodyMode, InstanceId, Isometry3, JointHandle, Result, UnitQuaternion, Vector3,
};
use tracing::{debug, trace};

use crate::body::PhysicsBody;
use crate::skeleton::Skeleton;

/// Property name of the bound bone.
pub const BONE_NAME_PROPERTY: &str = "bone_name";

/// Value of a named physical-bone property.
#[derive(Debug, Clone, PartialEq)]
pub enum BonePropertyValue {
    /// The `bone_name` property.
    Name(String),
    /// A `joint_constraints/...` property.
    Joint(PropertyValue),
}

/// A rigid body bound to one skeleton bone.
///
/// While simulating, the body is dynamic and every step writes its pose back
/// to the bone as a global pose override. The joint to the nearest ancestor
/// physical bone is owned for the bone's whole lifetime and rebuilt whenever
/// the joint type, the bone binding or the tree membership changes.
#[derive(Debug)]
pub struct PhysicalBone {
    body: PhysicsBody,
    joint: JointHandle,
    joint_data: JointData,
    joint_offset: Isometry3<f64>,
    body_offset: Isometry3<f64>,
    body_offset_inverse: Isometry3<f64>,
    skeleton: Weak<RefCell<Skeleton>>,
    bone_id: Option<usize>,
    bone_name: String,
    simulate_physics: bool,
    simulating: bool,
    mass: f64,
    friction: f64,
    bounce: f64,
    gravity_scale: f64,
    linear_damp: f64,
    angular_damp: f64,
    can_sleep: bool,
}

impl PhysicalBone {
    /// Create a static body and its joint for `instance`.
    pub fn new(server: &mut dyn PhysicsServer, instance: InstanceId) -> Self {
        let body = PhysicsBody::new(server, instance, BodyMode::Static);
        let joint = server.joint_create();
        Self {
            body,
            joint,
            joint_data: JointData::None,
            joint_offset: Isometry3::identity(),
            body_offset: Isometry3::identity(),
            body_offset_inverse: Isometry3::identity(),
            skeleton: Weak::new(),
            bone_id: None,
            bone_name: String::new(),
            simulate_physics: false,
            simulating: false,
            mass: 1.0,
            friction: 1.0,
            bounce: 0.0,
            gravity_scale: 1.0,
            linear_damp: -1.0,
            angular_damp: -1.0,
            can_sleep: true,
        }
    }

    /// Release the joint and the server body.
    pub fn free(self, server: &mut dyn PhysicsServer) {
        server.joint_free(self.joint);
        self.body.free(server);
    }

    /// Shared body state.
    #[must_use]
    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    /// Mutable shared body state.
    pub fn body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.body
    }

    /// Server joint owned by this bone.
    #[must_use]
    pub fn joint(&self) -> JointHandle {
        self.joint
    }

    /// Global transform of the body.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.body.global_transform()
    }

    /// Move the body.
    pub fn set_global_transform(&mut self, server: &mut dyn PhysicsServer, transform: Isometry3<f64>) {
        self.body.set_global_transform(server, transform);
    }

    /// Skeleton this bone is attached to, while it lives.
    #[must_use]
    pub fn skeleton(&self) -> Option<Rc<RefCell<Skeleton>>> {
        self.skeleton.upgrade()
    }

    /// Index of the bound bone.
    #[must_use]
    pub fn bone_id(&self) -> Option<usize> {
        self.bone_id
    }

    // ========================================================================
    // Tree lifecycle
    // ========================================================================

    /// Enter the scene tree under `skeleton`, the nearest skeleton ancestor.
    pub fn enter_tree(
        &mut self,
        server: &mut dyn PhysicsServer,
        skeleton: Option<&Rc<RefCell<Skeleton>>>,
    ) {
        self.body.set_inside_tree(true);
        self.skeleton = skeleton.map(Rc::downgrade).unwrap_or_default();
        self.update_bone_id(server);
        self.reset_to_rest_position(server);
        self.reset_physics_simulation_state(server);
        if self.joint_data.joint_type() != JointType::None {
            self.reload_joint(server);
        }
    }

    /// Leave the scene tree: unbind the bone and clear the joint.
    pub fn exit_tree(&mut self, server: &mut dyn PhysicsServer) {
        if let Some(skeleton) = self.skeleton.upgrade() {
            if let Some(bone) = self.bone_id.take() {
                skeleton.borrow_mut().unbind_physical_bone_from_bone(bone);
            }
        }
        self.bone_id = None;
        self.skeleton = Weak::new();
        server.joint_clear(self.joint);
        self.body.set_inside_tree(false);
    }

    // ========================================================================
    // Bone binding & offsets
    // ========================================================================

    /// Name of the bound bone.
    #[must_use]
    pub fn bone_name(&self) -> &str {
        &self.bone_name
    }

    /// Bind to the bone called `name` and snap to its rest position.
    pub fn set_bone_name(&mut self, server: &mut dyn PhysicsServer, name: impl Into<String>) {
        self.bone_name = name.into();
        self.update_bone_id(server);
        self.reset_to_rest_position(server);
    }

    fn update_bone_id(&mut self, server: &mut dyn PhysicsServer) {
        let Some(skeleton) = self.skeleton.upgrade() else {
            return;
        };
        let new_id = skeleton.borrow().find_bone(&self.bone_name);
        if new_id == self.bone_id {
            return;
        }
        {
            let mut skeleton = skeleton.borrow_mut();
            if let Some(old) = self.bone_id {
                skeleton.unbind_physical_bone_from_bone(old);
            }
            if let Some(new) = new_id {
                skeleton.bind_physical_bone_to_bone(new, self.body.rid());
            }
        }
        debug!(rid = %self.body.rid(), bone = ?new_id, name = %self.bone_name, "bone rebound");
        self.bone_id = new_id;
        self.fix_joint_offset();
        self.reset_physics_simulation_state(server);
    }

    /// Joint frame relative to this body.
    #[must_use]
    pub fn joint_offset(&self) -> Isometry3<f64> {
        self.joint_offset
    }

    /// Set the joint frame relative to this body.
    pub fn set_joint_offset(&mut self, offset: Isometry3<f64>) {
        self.joint_offset = offset;
        self.update_joint_offset();
    }

    /// Joint frame rotation as roll/pitch/yaw in radians.
    #[must_use]
    pub fn joint_rotation(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.joint_offset.rotation.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }

    /// Set the joint frame rotation from roll/pitch/yaw in radians.
    pub fn set_joint_rotation(&mut self, euler: Vector3<f64>) {
        self.joint_offset.rotation = UnitQuaternion::from_euler_angles(euler.x, euler.y, euler.z);
        self.update_joint_offset();
    }

    /// Body frame relative to the bone.
    #[must_use]
    pub fn body_offset(&self) -> Isometry3<f64> {
        self.body_offset
    }

    /// Set the body frame relative to the bone.
    pub fn set_body_offset(&mut self, offset: Isometry3<f64>) {
        self.body_offset = offset;
        self.body_offset_inverse = offset.inverse();
        self.update_joint_offset();
    }

    fn update_joint_offset(&mut self) {
        self.fix_joint_offset();
        if let Some(rest) = self.rest_transform() {
            self.body.set_global_transform_silently(rest);
        }
    }

    /// Pin the joint origin to the bone origin while attached.
    fn fix_joint_offset(&mut self) {
        if self.skeleton.upgrade().is_some() {
            self.joint_offset.translation = self.body_offset_inverse.translation;
        }
    }

    fn rest_transform(&self) -> Option<Isometry3<f64>> {
        let skeleton = self.skeleton.upgrade()?;
        let skeleton = skeleton.borrow();
        let bone_pose = self
            .bone_id
            .and_then(|b| skeleton.bone_global_pose(b))
            .unwrap_or_else(Isometry3::identity);
        Some(skeleton.global_transform() * bone_pose * self.body_offset)
    }

    /// Snap the body onto its bone's current pose.
    pub fn reset_to_rest_position(&mut self, server: &mut dyn PhysicsServer) {
        if let Some(rest) = self.rest_transform() {
            self.body.set_global_transform(server, rest);
        }
    }

    // ========================================================================
    // Joint
    // ========================================================================

    /// Current joint kind.
    #[must_use]
    pub fn joint_type(&self) -> JointType {
        self.joint_data.joint_type()
    }

    /// Joint parameter block.
    #[must_use]
    pub fn joint_data(&self) -> &JointData {
        &self.joint_data
    }

    /// Replace the joint with a fresh one of `kind` and rebuild it.
    pub fn set_joint_type(&mut self, server: &mut dyn PhysicsServer, kind: JointType) {
        if kind == self.joint_data.joint_type() {
            return;
        }
        debug!(rid = %self.body.rid(), from = %self.joint_data.joint_type(), to = %kind, "joint type changed");
        self.joint_data = JointData::new(kind);
        self.reload_joint(server);
    }

    fn reload_joint(&mut self, server: &mut dyn PhysicsServer) {
        let Some(skeleton) = self.skeleton.upgrade() else {
            server.joint_clear(self.joint);
            return;
        };
        let parent = self
            .bone_id
            .and_then(|b| skeleton.borrow().physical_bone_parent(b));
        let Some((parent, parent_transform)) =
            parent.and_then(|p| server.body_get_transform(p).map(|t| (p, t)))
        else {
            server.joint_clear(self.joint);
            return;
        };

        let joint_transform = self.body.global_transform() * self.joint_offset;
        let local_a = parent_transform.inverse() * joint_transform;
        trace!(rid = %self.body.rid(), %parent, kind = %self.joint_data.joint_type(), "joint rebuilt");
        self.joint_data.make_joint(
            self.joint,
            server,
            parent,
            local_a,
            self.body.rid(),
            self.joint_offset,
        );
    }

    // ========================================================================
    // Named properties
    // ========================================================================

    /// Every property name: the bone name, then the joint's.
    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        let mut names = vec![BONE_NAME_PROPERTY.to_owned()];
        names.extend(self.joint_data.property_names());
        names
    }

    /// Read a named property; `None` if not handled.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<BonePropertyValue> {
        if name == BONE_NAME_PROPERTY {
            return Some(BonePropertyValue::Name(self.bone_name.clone()));
        }
        self.joint_data
            .get_property(name)
            .map(BonePropertyValue::Joint)
    }

    /// Write a named property and push it to the server.
    ///
    /// Returns whether the name and value kind were handled.
    pub fn set_property(
        &mut self,
        server: &mut dyn PhysicsServer,
        name: &str,
        value: BonePropertyValue,
    ) -> bool {
        match value {
            BonePropertyValue::Name(bone) if name == BONE_NAME_PROPERTY => {
                self.set_bone_name(server, bone);
                true
            }
            BonePropertyValue::Joint(v) => match self.joint_data.set_property(name, v) {
                Some(field) => {
                    self.joint_data.push(field, self.joint, server);
                    true
                }
                None => false,
            },
            BonePropertyValue::Name(_) => false,
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Whether simulation was requested.
    #[must_use]
    pub fn simulate_physics(&self) -> bool {
        self.simulate_physics
    }

    /// Whether the body is currently simulating.
    #[must_use]
    pub fn is_simulating_physics(&self) -> bool {
        self.simulating
    }

    /// Request simulation on or off.
    pub fn set_simulate_physics(&mut self, server: &mut dyn PhysicsServer, simulate: bool) {
        if simulate == self.simulate_physics {
            return;
        }
        self.simulate_physics = simulate;
        self.reset_physics_simulation_state(server);
    }

    /// Re-apply the requested simulation state.
    pub fn reset_physics_simulation_state(&mut self, server: &mut dyn PhysicsServer) {
        if self.simulate_physics {
            self.start_physics_simulation(server);
        } else {
            self.stop_physics_simulation(server);
        }
    }

    fn start_physics_simulation(&mut self, server: &mut dyn PhysicsServer) {
        if self.simulating || self.skeleton.upgrade().is_none() {
            return;
        }
        self.reset_to_rest_position(server);
        self.body.set_mode(server, BodyMode::Dynamic);
        let rid = self.body.rid();
        server.body_set_collision_layer(rid, self.body.collision_layer());
        server.body_set_collision_mask(rid, self.body.collision_mask());
        server.body_set_force_integration_callback(rid, true);
        self.body.set_top_level(true);
        self.simulating = true;
        debug!(%rid, bone = ?self.bone_id, "bone simulation started");
    }

    fn stop_physics_simulation(&mut self, server: &mut dyn PhysicsServer) {
        let Some(skeleton) = self.skeleton.upgrade() else {
            return;
        };
        let rid = self.body.rid();
        if skeleton.borrow().animate_physical_bones() {
            self.body.set_mode(server, BodyMode::Kinematic);
            server.body_set_collision_layer(rid, self.body.collision_layer());
            server.body_set_collision_mask(rid, self.body.collision_mask());
        } else {
            self.body.set_mode(server, BodyMode::Static);
            server.body_set_collision_layer(rid, 0);
            server.body_set_collision_mask(rid, 0);
        }
        if self.simulating {
            server.body_set_force_integration_callback(rid, false);
            if let Some(bone) = self.bone_id {
                skeleton
                    .borrow_mut()
                    .set_bone_global_pose_override(bone, Isometry3::identity(), 0.0, false);
            }
            self.body.set_top_level(false);
            self.simulating = false;
            debug!(%rid, bone = ?self.bone_id, "bone simulation stopped");
        }
    }

    /// Post-step state sync: follow the body and drive the bone.
    pub fn direct_state_changed(&mut self, state: &DirectBodyState) {
        if !self.simulate_physics || !self.simulating {
            return;
        }
        self.body.set_global_transform_silently(state.transform);

        let (Some(skeleton), Some(bone)) = (self.skeleton.upgrade(), self.bone_id) else {
            return;
        };
        let skeleton_inverse = skeleton.borrow().global_transform().inverse();
        let pose = skeleton_inverse * (state.transform * self.body_offset_inverse);
        skeleton
            .borrow_mut()
            .set_bone_global_pose_override(bone, pose, 1.0, true);
    }

    // ========================================================================
    // Body parameters
    // ========================================================================

    /// Mass in kilograms.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the mass.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidMass`] unless `mass > 0`.
    pub fn set_mass(&mut self, server: &mut dyn PhysicsServer, mass: f64) -> Result<()> {
        BodyError::check_mass(mass)?;
        self.mass = mass;
        server.body_set_param(self.body.rid(), BodyParam::Mass, mass);
        Ok(())
    }

    /// Friction coefficient.
    #[must_use]
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Set friction.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::OutOfRange`] outside `[0, 1]`.
    pub fn set_friction(&mut self, server: &mut dyn PhysicsServer, friction: f64) -> Result<()> {
        BodyError::check_unit("friction", friction)?;
        self.friction = friction;
        server.body_set_param(self.body.rid(), BodyParam::Friction, friction);
        Ok(())
    }

    /// Bounciness.
    #[must_use]
    pub fn bounce(&self) -> f64 {
        self.bounce
    }

    /// Set bounciness.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::OutOfRange`] outside `[0, 1]`.
    pub fn set_bounce(&mut self, server: &mut dyn PhysicsServer, bounce: f64) -> Result<()> {
        BodyError::check_unit("bounce", bounce)?;
        self.bounce = bounce;
        server.body_set_param(self.body.rid(), BodyParam::Bounce, bounce);
        Ok(())
    }

    /// Scale applied to world gravity.
    #[must_use]
    pub fn gravity_scale(&self) -> f64 {
        self.gravity_scale
    }

    /// Set the gravity scale.
    pub fn set_gravity_scale(&mut self, server: &mut dyn PhysicsServer, scale: f64) {
        self.gravity_scale = scale;
        server.body_set_param(self.body.rid(), BodyParam::GravityScale, scale);
    }

    /// Linear damping; -1 means the world default.
    #[must_use]
    pub fn linear_damp(&self) -> f64 {
        self.linear_damp
    }

    /// Set linear damping.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidDamping`] if `damp < -1`.
    pub fn set_linear_damp(&mut self, server: &mut dyn PhysicsServer, damp: f64) -> Result<()> {
        BodyError::check_damping("linear damp", damp)?;
        self.linear_damp = damp;
        server.body_set_param(self.body.rid(), BodyParam::LinearDamp, damp);
        Ok(())
    }

    /// Angular damping; -1 means the world default.
    #[must_use]
    pub fn angular_damp(&self) -> f64 {
        self.angular_damp
    }

    /// Set angular damping.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidDamping`] if `damp < -1`.
    pub fn set_angular_damp(&mut self, server: &mut dyn PhysicsServer, damp: f64) -> Result<()> {
        BodyError::check_damping("angular damp", damp)?;
        self.angular_damp = damp;
        server.body_set_param(self.body.rid(), BodyParam::AngularDamp, damp);
        Ok(())
    }

    /// Whether the body may fall asleep.
    #[must_use]
    pub fn is_able_to_sleep(&self) -> bool {
        self.can_sleep
    }

    /// Allow or forbid falling asleep.
    pub fn set_can_sleep(&mut self, server: &mut dyn PhysicsServer, can_sleep: bool) {
        self.can_sleep = can_sleep;
        server.body_set_state(self.body.rid(), BodyState::CanSleep(can_sleep));
    }

    /// Apply an impulse through the center of mass.
    pub fn apply_central_impulse(&mut self, server: &mut dyn PhysicsServer, impulse: Vector3<f64>) {
        server.body_apply_central_impulse(self.body.rid(), impulse);
    }

    /// Apply an impulse at an offset from the center of mass.
    pub fn apply_impulse(
        &mut self,
        server: &mut dyn PhysicsServer,
        impulse: Vector3<f64>,
        position: Vector3<f64>,
    ) {
        server.body_apply_impulse(self.body.rid(), impulse, position);
    }
}
