//! In-memory physics server and scene tree.
//!
//! [`TestServer`] stores every body and joint parameter it is given so tests
//! can assert on exactly what a body sent. Swept-motion queries are answered
//! either from a scripted queue or, when the queue is empty, by sweeping
//! sphere bodies against plane bodies:
//!
//! ```text
//!   recover  ──►  cast  ──►  rest check
//!   (push out of   (first entry    (anything within
//!    penetration)   into margin)    margin at the end)
//! ```
//!
//! [`TestSceneTree`] tracks node existence, tree membership and tree-signal
//! subscriptions.

use std::collections::VecDeque;

use body_types::{BodyAxis, BodyHandle, BodyMode, InstanceId, JointHandle, MotionResult};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Isometry3, Matrix3, Point3, Translation3, UnitQuaternion, Vector3};
use tracing::trace;

use crate::direct::{ContactReport, DirectBodyState};
use crate::params::{
    Axis, BodyParam, BodyState, BodyStateKind, ConeTwistJointParam, Generic6DofFlag,
    Generic6DofParam, HingeJointFlag, HingeJointParam, JointKind, PinJointParam,
    SliderJointParam,
};
use crate::scene::SceneTree;
use crate::server::PhysicsServer;

/// Radius given to bodies created through [`PhysicsServer::body_create`].
pub const DEFAULT_SPHERE_RADIUS: f64 = 0.5;

// ============================================================================
// Bodies and joints
// ============================================================================

/// Collision shape of a test body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestShape {
    /// Collides with nothing.
    None,
    /// Sphere centered on the body origin. Only spheres can be swept.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
    /// Infinite plane through the body origin.
    Plane {
        /// Plane normal in body coordinates.
        normal: Vector3<f64>,
    },
}

/// Everything the test server knows about one body.
#[derive(Debug, Clone)]
pub struct TestBody {
    /// Simulation mode.
    pub mode: BodyMode,
    /// Attached scene object.
    pub instance: Option<InstanceId>,
    /// World transform.
    pub transform: Isometry3<f64>,
    /// Linear velocity.
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity.
    pub angular_velocity: Vector3<f64>,
    /// Asleep flag.
    pub sleeping: bool,
    /// May fall asleep.
    pub can_sleep: bool,
    /// Scalar parameters set so far.
    pub params: HashMap<BodyParam, f64>,
    /// Locked axes.
    pub axis_lock: BodyAxis,
    /// Bodies this one never collides with.
    pub exceptions: HashSet<BodyHandle>,
    /// Collision layer bits.
    pub collision_layer: u32,
    /// Collision mask bits.
    pub collision_mask: u32,
    /// Force integration disabled.
    pub omit_force_integration: bool,
    /// Contacts reported per step.
    pub max_contacts_reported: usize,
    /// Continuous collision detection.
    pub ccd: bool,
    /// State-sync hook installed.
    pub state_callback: bool,
    /// Collision shape.
    pub shape: TestShape,
    /// Contacts handed to the state-sync hook on the next step.
    pub contacts: Vec<ContactReport>,
    /// Force accumulated for the next step.
    pub force: Vector3<f64>,
    /// Torque accumulated for the next step.
    pub torque: Vector3<f64>,
}

impl Default for TestBody {
    fn default() -> Self {
        Self {
            mode: BodyMode::Static,
            instance: None,
            transform: Isometry3::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            sleeping: false,
            can_sleep: true,
            params: HashMap::new(),
            axis_lock: BodyAxis::empty(),
            exceptions: HashSet::new(),
            collision_layer: 1,
            collision_mask: 1,
            omit_force_integration: false,
            max_contacts_reported: 0,
            ccd: false,
            state_callback: false,
            shape: TestShape::Sphere {
                radius: DEFAULT_SPHERE_RADIUS,
            },
            contacts: Vec::new(),
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        }
    }
}

impl TestBody {
    /// Parameter value, falling back to the engine default.
    #[must_use]
    pub fn param(&self, param: BodyParam) -> f64 {
        self.params.get(&param).copied().unwrap_or(match param {
            BodyParam::Mass | BodyParam::Friction | BodyParam::GravityScale => 1.0,
            BodyParam::Bounce => 0.0,
            BodyParam::LinearDamp | BodyParam::AngularDamp => -1.0,
        })
    }

    fn inverse_mass(&self) -> f64 {
        if self.mode.is_dynamic() {
            1.0 / self.param(BodyParam::Mass)
        } else {
            0.0
        }
    }

    fn inverse_inertia(&self) -> Matrix3<f64> {
        let radius = match self.shape {
            TestShape::Sphere { radius } => radius,
            _ => DEFAULT_SPHERE_RADIUS,
        };
        if !self.mode.is_dynamic() || radius <= 0.0 {
            return Matrix3::zeros();
        }
        let inertia = 0.4 * self.param(BodyParam::Mass) * radius * radius;
        Matrix3::identity() / inertia
    }

    fn plane(&self) -> Option<(Point3<f64>, Vector3<f64>)> {
        match self.shape {
            TestShape::Plane { normal } => {
                let n = (self.transform.rotation * normal).try_normalize(0.0)?;
                Some((Point3::from(self.transform.translation.vector), n))
            }
            _ => None,
        }
    }
}

/// Key of a recorded joint parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointParamKey {
    /// Pin parameter.
    Pin(PinJointParam),
    /// Cone-twist parameter.
    ConeTwist(ConeTwistJointParam),
    /// Hinge parameter.
    Hinge(HingeJointParam),
    /// Slider parameter.
    Slider(SliderJointParam),
    /// Six-degree-of-freedom parameter.
    Generic6Dof(Axis, Generic6DofParam),
}

/// Key of a recorded joint flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointFlagKey {
    /// Hinge flag.
    Hinge(HingeJointFlag),
    /// Six-degree-of-freedom flag.
    Generic6Dof(Axis, Generic6DofFlag),
}

/// Everything the test server knows about one joint.
#[derive(Debug, Clone, Default)]
pub struct TestJoint {
    /// Kind the joint was last made into, `None` when cleared.
    pub kind: Option<JointKind>,
    /// First body (the parent).
    pub body_a: Option<BodyHandle>,
    /// Second body (the child).
    pub body_b: Option<BodyHandle>,
    /// Joint frame relative to the first body.
    pub local_a: Isometry3<f64>,
    /// Joint frame relative to the second body.
    pub local_b: Isometry3<f64>,
    /// Parameters set since the joint was last made.
    pub params: HashMap<JointParamKey, f64>,
    /// Flags set since the joint was last made.
    pub flags: HashMap<JointFlagKey, bool>,
}

impl TestJoint {
    /// Recorded parameter value.
    #[must_use]
    pub fn param(&self, key: JointParamKey) -> Option<f64> {
        self.params.get(&key).copied()
    }

    /// Recorded flag value.
    #[must_use]
    pub fn flag(&self, key: JointFlagKey) -> Option<bool> {
        self.flags.get(&key).copied()
    }

    fn make(
        &mut self,
        kind: JointKind,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        *self = Self {
            kind: Some(kind),
            body_a: Some(body_a),
            body_b: Some(body_b),
            local_a,
            local_b,
            ..Self::default()
        };
    }
}

/// One recorded swept-motion query.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionQuery {
    /// Moving body.
    pub body: BodyHandle,
    /// Start transform.
    pub from: Isometry3<f64>,
    /// Requested motion.
    pub motion: Vector3<f64>,
    /// Safe margin.
    pub margin: f64,
    /// Excluded bodies, sorted.
    pub exclude: Vec<BodyHandle>,
}

// ============================================================================
// Server
// ============================================================================

/// In-memory [`PhysicsServer`].
#[derive(Debug, Clone, Default)]
pub struct TestServer {
    next_id: u64,
    bodies: HashMap<BodyHandle, TestBody>,
    joints: HashMap<JointHandle, TestJoint>,
    scripted: VecDeque<Option<MotionResult>>,
    queries: Vec<MotionQuery>,
    gravity: Vector3<f64>,
}

impl TestServer {
    /// Create an empty server without gravity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set world gravity used by [`TestServer::step`].
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a static plane through `origin` facing `normal`.
    pub fn add_plane(
        &mut self,
        origin: Point3<f64>,
        normal: Vector3<f64>,
        instance: InstanceId,
    ) -> BodyHandle {
        let handle = BodyHandle(self.next_id());
        self.bodies.insert(
            handle,
            TestBody {
                instance: Some(instance),
                transform: Isometry3::from_parts(
                    Translation3::from(origin.coords),
                    UnitQuaternion::identity(),
                ),
                shape: TestShape::Plane { normal },
                ..TestBody::default()
            },
        );
        handle
    }

    /// Replace a body's collision shape.
    pub fn set_shape(&mut self, body: BodyHandle, shape: TestShape) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.shape = shape;
        }
    }

    /// Contacts reported to the body's state-sync hook on the next steps.
    pub fn set_contacts(&mut self, body: BodyHandle, contacts: Vec<ContactReport>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.contacts = contacts;
        }
    }

    /// Queue a canned answer for the next swept-motion query.
    pub fn push_motion_result(&mut self, result: Option<MotionResult>) {
        self.scripted.push_back(result);
    }

    /// Every swept-motion query so far.
    #[must_use]
    pub fn motion_queries(&self) -> &[MotionQuery] {
        &self.queries
    }

    /// Forget recorded swept-motion queries.
    pub fn clear_motion_queries(&mut self) {
        self.queries.clear();
    }

    /// Stored body, if the handle is live.
    #[must_use]
    pub fn body(&self, body: BodyHandle) -> Option<&TestBody> {
        self.bodies.get(&body)
    }

    /// Mutable stored body, if the handle is live.
    pub fn body_mut(&mut self, body: BodyHandle) -> Option<&mut TestBody> {
        self.bodies.get_mut(&body)
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Stored joint, if the handle is live.
    #[must_use]
    pub fn joint(&self, joint: JointHandle) -> Option<&TestJoint> {
        self.joints.get(&joint)
    }

    /// Number of live joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Advance every body by `delta` seconds.
    ///
    /// Returns the post-step state of each body with an installed state-sync
    /// hook, ordered by handle. Hand each one to its body, then pass it back
    /// to [`TestServer::commit_direct_state`].
    pub fn step(&mut self, delta: f64) -> Vec<DirectBodyState> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            let moving = match body.mode {
                BodyMode::Static => false,
                BodyMode::Kinematic => true,
                BodyMode::Dynamic | BodyMode::DynamicLocked => !body.sleeping,
            };
            if !moving {
                continue;
            }
            if body.mode.is_dynamic() && !body.omit_force_integration {
                let accel = gravity * body.param(BodyParam::GravityScale)
                    + body.force * body.inverse_mass();
                body.linear_velocity += accel * delta;
                if body.mode == BodyMode::Dynamic {
                    body.angular_velocity += body.inverse_inertia() * body.torque * delta;
                }
            }
            body.linear_velocity = body.axis_lock.zero_locked_linear(body.linear_velocity);
            for (i, axis) in [BodyAxis::ANGULAR_X, BodyAxis::ANGULAR_Y, BodyAxis::ANGULAR_Z]
                .into_iter()
                .enumerate()
            {
                if body.axis_lock.contains(axis) {
                    body.angular_velocity[i] = 0.0;
                }
            }
            body.transform.translation.vector += body.linear_velocity * delta;
            body.transform.rotation =
                UnitQuaternion::from_scaled_axis(body.angular_velocity * delta)
                    * body.transform.rotation;
            body.force = Vector3::zeros();
            body.torque = Vector3::zeros();
        }

        let mut hooked: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.state_callback)
            .map(|(h, _)| *h)
            .collect();
        hooked.sort();
        hooked
            .into_iter()
            .filter_map(|h| {
                let mut state = self.body_get_direct_state(h)?;
                state.step = delta;
                Some(state)
            })
            .collect()
    }

    /// Write velocities changed during a state-sync hook back to the body.
    pub fn commit_direct_state(&mut self, state: &DirectBodyState) {
        if let Some(b) = self.bodies.get_mut(&state.body) {
            b.linear_velocity = state.linear_velocity;
            b.angular_velocity = state.angular_velocity;
            b.sleeping = state.sleeping;
        }
    }

    fn collides_with(&self, mover: BodyHandle, m: &TestBody, other: BodyHandle, o: &TestBody) -> bool {
        mover != other
            && !m.exceptions.contains(&other)
            && !o.exceptions.contains(&mover)
            && m.collision_mask & o.collision_layer != 0
    }

    fn sweep(
        &self,
        body: BodyHandle,
        from: &Isometry3<f64>,
        motion: &Vector3<f64>,
        margin: f64,
        exclude: &HashSet<BodyHandle>,
    ) -> Option<MotionResult> {
        let mover = self.bodies.get(&body)?;
        let TestShape::Sphere { radius } = mover.shape else {
            trace!(%body, "only spheres can be swept");
            return None;
        };

        let mut planes: Vec<(BodyHandle, &TestBody, Point3<f64>, Vector3<f64>)> = self
            .bodies
            .iter()
            .filter(|(h, o)| !exclude.contains(*h) && self.collides_with(body, mover, **h, o))
            .filter_map(|(h, o)| o.plane().map(|(q, n)| (*h, o, q, n)))
            .collect();
        planes.sort_by_key(|(h, ..)| *h);

        let gap = |center: &Point3<f64>, q: &Point3<f64>, n: &Vector3<f64>| {
            n.dot(&(center - q)) - radius
        };

        // Recover from penetration.
        let start = Point3::from(from.translation.vector);
        let mut center = start;
        for (_, _, q, n) in &planes {
            let g = gap(&center, q, n);
            if g < 0.0 {
                center += n * -g;
            }
        }
        let recovery = center - start;

        // First entry into the margin shell along the motion.
        let mut hit: Option<(f64, usize)> = None;
        for (i, (_, _, q, n)) in planes.iter().enumerate() {
            let approach = -n.dot(motion);
            if approach <= 0.0 {
                continue;
            }
            let g0 = gap(&center, q, n);
            let t = ((g0 - margin) / approach).max(0.0);
            if t <= 1.0 && hit.is_none_or(|(best, _)| t < best) {
                hit = Some((t, i));
            }
        }

        let (fraction, index) = match hit {
            Some(found) => found,
            None => {
                // Rest contact: anything within margin after the full motion.
                let end = center + motion;
                let touching = planes
                    .iter()
                    .enumerate()
                    .map(|(i, (_, _, q, n))| (gap(&end, q, n), i))
                    .filter(|(g, _)| *g <= margin)
                    .min_by(|a, b| a.0.total_cmp(&b.0))?;
                (1.0, touching.1)
            }
        };

        let (handle, other, q, n) = &planes[index];
        let moved = center + motion * fraction;
        let point = moved - n * radius;
        let offset = point - Point3::from(other.transform.translation.vector);
        Some(MotionResult {
            travel: recovery + motion * fraction,
            remainder: motion * (1.0 - fraction),
            collision_point: point,
            collision_normal: *n,
            collider_velocity: other.linear_velocity + other.angular_velocity.cross(&offset),
            collision_depth: (margin - gap(&moved, q, n)).max(0.0),
            collision_safe_fraction: fraction,
            collision_unsafe_fraction: fraction,
            collision_local_shape: 0,
            collider: Some(*handle),
            collider_id: other.instance,
            collider_shape: 0,
        })
    }
}

impl PhysicsServer for TestServer {
    fn body_create(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_id());
        self.bodies.insert(handle, TestBody::default());
        handle
    }

    fn body_free(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
        for other in self.bodies.values_mut() {
            other.exceptions.remove(&body);
        }
    }

    fn body_set_mode(&mut self, body: BodyHandle, mode: BodyMode) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.mode = mode;
        }
    }

    fn body_get_mode(&self, body: BodyHandle) -> Option<BodyMode> {
        self.bodies.get(&body).map(|b| b.mode)
    }

    fn body_attach_object_instance(&mut self, body: BodyHandle, instance: InstanceId) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.instance = Some(instance);
        }
    }

    fn body_get_object_instance(&self, body: BodyHandle) -> Option<InstanceId> {
        self.bodies.get(&body).and_then(|b| b.instance)
    }

    fn body_set_state(&mut self, body: BodyHandle, state: BodyState) {
        let Some(b) = self.bodies.get_mut(&body) else {
            return;
        };
        match state {
            BodyState::Transform(t) => b.transform = t,
            BodyState::LinearVelocity(v) => b.linear_velocity = v,
            BodyState::AngularVelocity(v) => b.angular_velocity = v,
            BodyState::Sleeping(s) => b.sleeping = s,
            BodyState::CanSleep(s) => b.can_sleep = s,
        }
    }

    fn body_get_state(&self, body: BodyHandle, kind: BodyStateKind) -> Option<BodyState> {
        let b = self.bodies.get(&body)?;
        Some(match kind {
            BodyStateKind::Transform => BodyState::Transform(b.transform),
            BodyStateKind::LinearVelocity => BodyState::LinearVelocity(b.linear_velocity),
            BodyStateKind::AngularVelocity => BodyState::AngularVelocity(b.angular_velocity),
            BodyStateKind::Sleeping => BodyState::Sleeping(b.sleeping),
            BodyStateKind::CanSleep => BodyState::CanSleep(b.can_sleep),
        })
    }

    fn body_set_param(&mut self, body: BodyHandle, param: BodyParam, value: f64) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.params.insert(param, value);
        }
    }

    fn body_get_param(&self, body: BodyHandle, param: BodyParam) -> Option<f64> {
        self.bodies.get(&body).map(|b| b.param(param))
    }

    fn body_set_axis_lock(&mut self, body: BodyHandle, axis: BodyAxis, locked: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.axis_lock.set(axis, locked);
        }
    }

    fn body_get_axis_lock(&self, body: BodyHandle) -> BodyAxis {
        self.bodies
            .get(&body)
            .map_or(BodyAxis::empty(), |b| b.axis_lock)
    }

    fn body_set_collision_layer(&mut self, body: BodyHandle, layer: u32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.collision_layer = layer;
        }
    }

    fn body_set_collision_mask(&mut self, body: BodyHandle, mask: u32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.collision_mask = mask;
        }
    }

    fn body_set_omit_force_integration(&mut self, body: BodyHandle, omit: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.omit_force_integration = omit;
        }
    }

    fn body_set_max_contacts_reported(&mut self, body: BodyHandle, count: usize) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.max_contacts_reported = count;
        }
    }

    fn body_set_continuous_collision_detection(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.ccd = enabled;
        }
    }

    fn body_add_collision_exception(&mut self, body: BodyHandle, excepted: BodyHandle) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.exceptions.insert(excepted);
        }
    }

    fn body_remove_collision_exception(&mut self, body: BodyHandle, excepted: BodyHandle) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.exceptions.remove(&excepted);
        }
    }

    fn body_get_collision_exceptions(&self, body: BodyHandle) -> Vec<BodyHandle> {
        let mut out: Vec<BodyHandle> = self
            .bodies
            .get(&body)
            .map(|b| b.exceptions.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    fn body_add_central_force(&mut self, body: BodyHandle, force: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.force += force;
        }
    }

    fn body_add_force(&mut self, body: BodyHandle, force: Vector3<f64>, position: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.force += force;
            b.torque += position.cross(&force);
        }
    }

    fn body_add_torque(&mut self, body: BodyHandle, torque: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.torque += torque;
        }
    }

    fn body_apply_central_impulse(&mut self, body: BodyHandle, impulse: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.linear_velocity += impulse * b.inverse_mass();
        }
    }

    fn body_apply_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vector3<f64>,
        position: Vector3<f64>,
    ) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.linear_velocity += impulse * b.inverse_mass();
            b.angular_velocity += b.inverse_inertia() * position.cross(&impulse);
        }
    }

    fn body_apply_torque_impulse(&mut self, body: BodyHandle, impulse: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.angular_velocity += b.inverse_inertia() * impulse;
        }
    }

    fn body_set_axis_velocity(&mut self, body: BodyHandle, axis_velocity: Vector3<f64>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if let Some(axis) = axis_velocity.try_normalize(0.0) {
                b.linear_velocity -= axis * axis.dot(&b.linear_velocity);
                b.linear_velocity += axis_velocity;
            }
        }
    }

    fn body_set_force_integration_callback(&mut self, body: BodyHandle, installed: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.state_callback = installed;
        }
    }

    fn body_has_force_integration_callback(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).is_some_and(|b| b.state_callback)
    }

    fn body_get_direct_state(&self, body: BodyHandle) -> Option<DirectBodyState> {
        let b = self.bodies.get(&body)?;
        let mut contacts = b.contacts.clone();
        if b.max_contacts_reported > 0 {
            contacts.truncate(b.max_contacts_reported);
        }
        Some(DirectBodyState {
            body,
            transform: b.transform,
            linear_velocity: b.linear_velocity,
            angular_velocity: b.angular_velocity,
            inverse_inertia: b.inverse_inertia(),
            sleeping: b.sleeping,
            step: 0.0,
            contacts,
        })
    }

    fn body_test_motion(
        &mut self,
        body: BodyHandle,
        from: &Isometry3<f64>,
        motion: &Vector3<f64>,
        margin: f64,
        exclude: &HashSet<BodyHandle>,
    ) -> Option<MotionResult> {
        let mut excluded: Vec<BodyHandle> = exclude.iter().copied().collect();
        excluded.sort();
        self.queries.push(MotionQuery {
            body,
            from: *from,
            motion: *motion,
            margin,
            exclude: excluded,
        });
        if let Some(scripted) = self.scripted.pop_front() {
            return scripted;
        }
        self.sweep(body, from, motion, margin, exclude)
    }

    fn joint_create(&mut self) -> JointHandle {
        let handle = JointHandle(self.next_id());
        self.joints.insert(handle, TestJoint::default());
        handle
    }

    fn joint_clear(&mut self, joint: JointHandle) {
        if let Some(j) = self.joints.get_mut(&joint) {
            *j = TestJoint::default();
        }
    }

    fn joint_free(&mut self, joint: JointHandle) {
        self.joints.remove(&joint);
    }

    fn joint_make_pin(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Point3<f64>,
        body_b: BodyHandle,
        local_b: Point3<f64>,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.make(
                JointKind::Pin,
                body_a,
                Isometry3::from_parts(local_a.coords.into(), UnitQuaternion::identity()),
                body_b,
                Isometry3::from_parts(local_b.coords.into(), UnitQuaternion::identity()),
            );
        }
    }

    fn joint_make_cone_twist(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.make(JointKind::ConeTwist, body_a, local_a, body_b, local_b);
        }
    }

    fn joint_make_hinge(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.make(JointKind::Hinge, body_a, local_a, body_b, local_b);
        }
    }

    fn joint_make_slider(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.make(JointKind::Slider, body_a, local_a, body_b, local_b);
        }
    }

    fn joint_make_generic_6dof(
        &mut self,
        joint: JointHandle,
        body_a: BodyHandle,
        local_a: Isometry3<f64>,
        body_b: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.make(JointKind::Generic6Dof, body_a, local_a, body_b, local_b);
        }
    }

    fn pin_joint_set_param(&mut self, joint: JointHandle, param: PinJointParam, value: f64) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.params.insert(JointParamKey::Pin(param), value);
        }
    }

    fn cone_twist_joint_set_param(
        &mut self,
        joint: JointHandle,
        param: ConeTwistJointParam,
        value: f64,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.params.insert(JointParamKey::ConeTwist(param), value);
        }
    }

    fn hinge_joint_set_param(&mut self, joint: JointHandle, param: HingeJointParam, value: f64) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.params.insert(JointParamKey::Hinge(param), value);
        }
    }

    fn hinge_joint_set_flag(&mut self, joint: JointHandle, flag: HingeJointFlag, enabled: bool) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.flags.insert(JointFlagKey::Hinge(flag), enabled);
        }
    }

    fn slider_joint_set_param(&mut self, joint: JointHandle, param: SliderJointParam, value: f64) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.params.insert(JointParamKey::Slider(param), value);
        }
    }

    fn generic_6dof_joint_set_param(
        &mut self,
        joint: JointHandle,
        axis: Axis,
        param: Generic6DofParam,
        value: f64,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.params.insert(JointParamKey::Generic6Dof(axis, param), value);
        }
    }

    fn generic_6dof_joint_set_flag(
        &mut self,
        joint: JointHandle,
        axis: Axis,
        flag: Generic6DofFlag,
        enabled: bool,
    ) {
        if let Some(j) = self.joints.get_mut(&joint) {
            j.flags.insert(JointFlagKey::Generic6Dof(axis, flag), enabled);
        }
    }
}

// ============================================================================
// Scene tree
// ============================================================================

/// In-memory [`SceneTree`].
#[derive(Debug, Clone, Default)]
pub struct TestSceneTree {
    next_id: u64,
    nodes: HashMap<InstanceId, bool>,
    subscriptions: HashSet<(InstanceId, InstanceId)>,
}

impl TestSceneTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node inside the tree.
    pub fn spawn(&mut self) -> InstanceId {
        self.spawn_with(true)
    }

    /// Create a node outside the tree.
    pub fn spawn_detached(&mut self) -> InstanceId {
        self.spawn_with(false)
    }

    fn spawn_with(&mut self, inside_tree: bool) -> InstanceId {
        self.next_id += 1;
        let id = InstanceId(self.next_id);
        self.nodes.insert(id, inside_tree);
        id
    }

    /// Destroy a node and drop every subscription involving it.
    pub fn destroy(&mut self, id: InstanceId) {
        self.nodes.remove(&id);
        self.subscriptions
            .retain(|(watcher, target)| *watcher != id && *target != id);
    }

    /// Move a node in or out of the tree.
    ///
    /// Returns the watchers subscribed to the node, sorted, so the caller can
    /// forward the notification to them.
    pub fn set_inside_tree(&mut self, id: InstanceId, inside: bool) -> Vec<InstanceId> {
        if let Some(flag) = self.nodes.get_mut(&id) {
            *flag = inside;
        }
        let mut watchers: Vec<InstanceId> = self
            .subscriptions
            .iter()
            .filter(|(_, target)| *target == id)
            .map(|(watcher, _)| *watcher)
            .collect();
        watchers.sort();
        watchers
    }

    /// Whether `watcher` receives `target`'s tree notifications.
    #[must_use]
    pub fn is_subscribed(&self, watcher: InstanceId, target: InstanceId) -> bool {
        self.subscriptions.contains(&(watcher, target))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl SceneTree for TestSceneTree {
    fn instance_exists(&self, id: InstanceId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn is_inside_tree(&self, id: InstanceId) -> bool {
        self.nodes.get(&id).copied().unwrap_or(false)
    }

    fn connect_tree_signals(&mut self, watcher: InstanceId, target: InstanceId) {
        self.subscriptions.insert((watcher, target));
    }

    fn disconnect_tree_signals(&mut self, watcher: InstanceId, target: InstanceId) {
        self.subscriptions.remove(&(watcher, target));
    }
}
