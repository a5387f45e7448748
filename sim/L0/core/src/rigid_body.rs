//! Dynamic bodies driven by the physics server.

use body_contact::{ContactEvent, ContactMonitor};
use body_server::{BodyParam, BodyState, DirectBodyState, PhysicsServer, SceneTree};
use body_types::{
    BodyError, BodyHandle, BodyMode, InstanceId, Isometry3, Matrix3, PhysicsMaterial, Result, Vector3,
};
use tracing::{debug, error, trace, warn};

use crate::body::PhysicsBody;
use crate::callback::{ContactHandlerFn, IntegrateForcesFn};
use crate::notification::Notification;
use crate::static_body::reload_physics_characteristics;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Something a rigid body reports after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RigidBodyEvent {
    /// Contact monitor event.
    Contact(ContactEvent),
    /// The body fell asleep or woke up.
    SleepingStateChanged {
        /// New sleeping state.
        sleeping: bool,
    },
}

/// What a contact handler may do while events are being dispatched.
///
/// The monitor is locked for the whole dispatch: it can be read, but
/// disabling it has to be requested and is applied once every event of the
/// batch has been delivered.
#[derive(Debug)]
pub struct ContactDispatch<'a> {
    rid: BodyHandle,
    monitor: &'a ContactMonitor,
    pending: &'a mut Option<bool>,
}

impl ContactDispatch<'_> {
    /// The dispatching body.
    #[must_use]
    pub fn body(&self) -> BodyHandle {
        self.rid
    }

    /// The locked monitor.
    #[must_use]
    pub fn contact_monitor(&self) -> &ContactMonitor {
        self.monitor
    }

    /// Immediate monitor change.
    ///
    /// Enabling is a no-op since the monitor is already on.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::ContactMonitorLocked`] when disabling; use
    /// [`ContactDispatch::request_contact_monitor`] instead.
    pub fn set_contact_monitor(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            return Ok(());
        }
        error!(
            rid = %self.rid,
            "can't disable contact monitoring during in/out dispatch; request it deferred"
        );
        Err(BodyError::ContactMonitorLocked)
    }

    /// Change contact tracking once the dispatch ends.
    ///
    /// The last request of a batch wins.
    pub fn request_contact_monitor(&mut self, enabled: bool) {
        *self.pending = Some(enabled);
    }
}

/// A body moved by the simulation.
///
/// After each step the driver hands the post-step [`DirectBodyState`] to
/// [`RigidBody::direct_state_changed`], which mirrors transform and
/// velocities, runs the optional force-integration hook and diffs contacts.
/// Events are queued and taken with [`RigidBody::drain_events`]; an optional
/// contact handler sees contact events as they are dispatched.
#[derive(Debug)]
pub struct RigidBody {
    body: PhysicsBody,
    mass: f64,
    gravity_scale: f64,
    linear_damp: f64,
    angular_damp: f64,
    material_override: Option<PhysicsMaterial>,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    inverse_inertia: Matrix3<f64>,
    custom_integrator: bool,
    sleeping: bool,
    can_sleep: bool,
    max_contacts_reported: usize,
    ccd: bool,
    contact_monitor: Option<ContactMonitor>,
    pending_contact_monitor: Option<bool>,
    integrate_forces: Option<IntegrateForcesFn>,
    contact_handler: Option<ContactHandlerFn>,
    events: Vec<RigidBodyEvent>,
}

impl RigidBody {
    /// Create a dynamic body for `instance` with its state sync installed.
    pub fn new(server: &mut dyn PhysicsServer, instance: InstanceId) -> Self {
        let body = PhysicsBody::new(server, instance, BodyMode::Dynamic);
        server.body_set_force_integration_callback(body.rid(), true);
        Self {
            body,
            mass: 1.0,
            gravity_scale: 1.0,
            linear_damp: -1.0,
            angular_damp: -1.0,
            material_override: None,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            inverse_inertia: Matrix3::zeros(),
            custom_integrator: false,
            sleeping: false,
            can_sleep: true,
            max_contacts_reported: 0,
            ccd: false,
            contact_monitor: None,
            pending_contact_monitor: None,
            integrate_forces: None,
            contact_handler: None,
            events: Vec::new(),
        }
    }

    /// Release the server body.
    ///
    /// Tree subscriptions held by the contact monitor are dropped first.
    pub fn free(self, server: &mut dyn PhysicsServer, tree: &mut dyn SceneTree) {
        if let Some(monitor) = self.contact_monitor {
            monitor.disconnect_all(tree);
        }
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

    /// Global transform as of the last state sync.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.body.global_transform()
    }

    /// Teleport the body.
    pub fn set_global_transform(&mut self, server: &mut dyn PhysicsServer, transform: Isometry3<f64>) {
        self.body.set_global_transform(server, transform);
    }

    /// React to a scene notification.
    pub fn notification(&mut self, what: Notification) {
        match what {
            Notification::EnterTree => self.body.set_inside_tree(true),
            Notification::ExitTree => self.body.set_inside_tree(false),
            Notification::LocalTransformChanged | Notification::InternalPhysicsProcess { .. } => {}
        }
    }

    // ========================================================================
    // Mode & parameters
    // ========================================================================

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> BodyMode {
        self.body.mode()
    }

    /// Switch between dynamic, static, locked-rotation and kinematic.
    pub fn set_mode(&mut self, server: &mut dyn PhysicsServer, mode: BodyMode) {
        self.body.set_mode(server, mode);
    }

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

    /// Inverse mass; zero unless the body is dynamic.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        if self.body.mode().is_dynamic() {
            1.0 / self.mass
        } else {
            0.0
        }
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

    /// Material overriding the default friction and bounce.
    #[must_use]
    pub fn physics_material_override(&self) -> Option<&PhysicsMaterial> {
        self.material_override.as_ref()
    }

    /// Set or clear the material override and push its values.
    pub fn set_physics_material_override(
        &mut self,
        server: &mut dyn PhysicsServer,
        material: Option<PhysicsMaterial>,
    ) {
        self.material_override = material;
        reload_physics_characteristics(server, &self.body, self.material_override.as_ref());
    }

    /// Whether the server skips its own force integration.
    #[must_use]
    pub fn is_using_custom_integrator(&self) -> bool {
        self.custom_integrator
    }

    /// Skip the server's force integration; only the hook moves the body.
    pub fn set_use_custom_integrator(&mut self, server: &mut dyn PhysicsServer, enabled: bool) {
        self.custom_integrator = enabled;
        server.body_set_omit_force_integration(self.body.rid(), enabled);
    }

    /// Contacts the server reports per step.
    #[must_use]
    pub fn max_contacts_reported(&self) -> usize {
        self.max_contacts_reported
    }

    /// Set how many contacts the server reports per step.
    pub fn set_max_contacts_reported(&mut self, server: &mut dyn PhysicsServer, count: usize) {
        self.max_contacts_reported = count;
        server.body_set_max_contacts_reported(self.body.rid(), count);
    }

    /// Whether continuous collision detection is on.
    #[must_use]
    pub fn is_using_continuous_collision_detection(&self) -> bool {
        self.ccd
    }

    /// Toggle continuous collision detection.
    pub fn set_use_continuous_collision_detection(
        &mut self,
        server: &mut dyn PhysicsServer,
        enabled: bool,
    ) {
        self.ccd = enabled;
        server.body_set_continuous_collision_detection(self.body.rid(), enabled);
    }

    // ========================================================================
    // Velocities & sleeping
    // ========================================================================

    /// Linear velocity as of the last state sync or setter.
    #[must_use]
    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    /// Set the linear velocity.
    ///
    /// Inside the force-integration hook write the in-flight state instead.
    pub fn set_linear_velocity(&mut self, server: &mut dyn PhysicsServer, velocity: Vector3<f64>) {
        self.linear_velocity = velocity;
        server.body_set_state(self.body.rid(), BodyState::LinearVelocity(velocity));
    }

    /// Angular velocity as of the last state sync or setter.
    #[must_use]
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Set the angular velocity.
    ///
    /// Inside the force-integration hook write the in-flight state instead.
    pub fn set_angular_velocity(&mut self, server: &mut dyn PhysicsServer, velocity: Vector3<f64>) {
        self.angular_velocity = velocity;
        server.body_set_state(self.body.rid(), BodyState::AngularVelocity(velocity));
    }

    /// Replace the velocity component along `axis_velocity`'s direction with
    /// `axis_velocity`, keeping the rest.
    pub fn set_axis_velocity(&mut self, server: &mut dyn PhysicsServer, axis_velocity: Vector3<f64>) {
        self.linear_velocity = with_axis_velocity(self.linear_velocity, axis_velocity);
        server.body_set_axis_velocity(self.body.rid(), axis_velocity);
    }

    /// Inverse inertia tensor in world space, from the last state sync.
    #[must_use]
    pub fn inverse_inertia_tensor(&self) -> Matrix3<f64> {
        self.inverse_inertia
    }

    /// Whether the body is asleep.
    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Put the body to sleep or wake it.
    pub fn set_sleeping(&mut self, server: &mut dyn PhysicsServer, sleeping: bool) {
        self.sleeping = sleeping;
        server.body_set_state(self.body.rid(), BodyState::Sleeping(sleeping));
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

    // ========================================================================
    // Forces & impulses
    // ========================================================================

    /// Add a force through the center of mass for the next step.
    pub fn add_central_force(&mut self, server: &mut dyn PhysicsServer, force: Vector3<f64>) {
        server.body_add_central_force(self.body.rid(), force);
    }

    /// Add a force at an offset from the center of mass.
    pub fn add_force(
        &mut self,
        server: &mut dyn PhysicsServer,
        force: Vector3<f64>,
        position: Vector3<f64>,
    ) {
        server.body_add_force(self.body.rid(), force, position);
    }

    /// Add a torque for the next step.
    pub fn add_torque(&mut self, server: &mut dyn PhysicsServer, torque: Vector3<f64>) {
        server.body_add_torque(self.body.rid(), torque);
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

    /// Apply an angular impulse.
    pub fn apply_torque_impulse(&mut self, server: &mut dyn PhysicsServer, impulse: Vector3<f64>) {
        server.body_apply_torque_impulse(self.body.rid(), impulse);
    }

    /// Set the force-integration hook.
    pub fn set_integrate_forces<F>(&mut self, f: F)
    where
        F: Fn(&mut DirectBodyState) + Send + Sync + 'static,
    {
        self.integrate_forces = Some(IntegrateForcesFn::new(f));
    }

    /// Clear the force-integration hook.
    pub fn clear_integrate_forces(&mut self) {
        self.integrate_forces = None;
    }

    // ========================================================================
    // Contact monitor
    // ========================================================================

    /// Whether contacts are being tracked.
    #[must_use]
    pub fn is_contact_monitor_enabled(&self) -> bool {
        self.contact_monitor.is_some()
    }

    /// Start or stop tracking contacts.
    ///
    /// Disabling drops every tree subscription the monitor holds. From inside
    /// a contact handler go through [`ContactDispatch`] instead.
    pub fn set_contact_monitor(&mut self, tree: &mut dyn SceneTree, enabled: bool) {
        if enabled == self.is_contact_monitor_enabled() {
            return;
        }
        if enabled {
            debug!(rid = %self.body.rid(), "contact monitor enabled");
            self.contact_monitor = Some(ContactMonitor::new(self.body.instance()));
            return;
        }
        if let Some(monitor) = self.contact_monitor.take() {
            monitor.disconnect_all(tree);
        }
        debug!(rid = %self.body.rid(), "contact monitor disabled");
    }

    /// Set the handler run for each contact event during dispatch.
    pub fn set_contact_handler<F>(&mut self, f: F)
    where
        F: Fn(&ContactEvent, &mut ContactDispatch<'_>) + Send + Sync + 'static,
    {
        self.contact_handler = Some(ContactHandlerFn::new(f));
    }

    /// Clear the contact handler.
    pub fn clear_contact_handler(&mut self) {
        self.contact_handler = None;
    }

    /// The contact monitor, while enabled.
    #[must_use]
    pub fn contact_monitor(&self) -> Option<&ContactMonitor> {
        self.contact_monitor.as_ref()
    }

    /// Nodes currently touching this body.
    #[must_use]
    pub fn colliding_bodies(&self, tree: &dyn SceneTree) -> Vec<InstanceId> {
        match &self.contact_monitor {
            Some(monitor) => monitor.colliding_bodies(tree),
            None => {
                warn!(
                    rid = %self.body.rid(),
                    "colliding_bodies needs contact_monitor enabled and max_contacts_reported > 0"
                );
                Vec::new()
            }
        }
    }

    /// A tracked node entered the scene tree.
    pub fn body_enter_tree(&mut self, tree: &mut dyn SceneTree, id: InstanceId) {
        self.dispatch_tree_change(tree, id, true);
    }

    /// A tracked node is leaving the scene tree.
    pub fn body_exit_tree(&mut self, tree: &mut dyn SceneTree, id: InstanceId) {
        self.dispatch_tree_change(tree, id, false);
    }

    fn dispatch_tree_change(&mut self, tree: &mut dyn SceneTree, id: InstanceId, inside: bool) {
        let Some(monitor) = self.contact_monitor.as_mut() else {
            warn!(rid = %self.body.rid(), %id, "tree notification without a contact monitor");
            return;
        };
        let mut events = Vec::new();
        if inside {
            monitor.body_enter_tree(id, &mut events);
        } else {
            monitor.body_exit_tree(id, &mut events);
        }
        self.dispatch_contact_events(tree, events);
    }

    /// Run the handler over `events` with the monitor locked, queue them, then
    /// apply any monitor change requested meanwhile.
    fn dispatch_contact_events(&mut self, tree: &mut dyn SceneTree, events: Vec<ContactEvent>) {
        if let (Some(handler), Some(monitor)) = (&self.contact_handler, &self.contact_monitor) {
            let mut dispatch = ContactDispatch {
                rid: self.body.rid(),
                monitor,
                pending: &mut self.pending_contact_monitor,
            };
            for event in &events {
                handler.call(event, &mut dispatch);
            }
        }
        self.events.extend(events.into_iter().map(RigidBodyEvent::Contact));

        if let Some(enabled) = self.pending_contact_monitor.take() {
            debug!(rid = %self.body.rid(), enabled, "applying deferred contact monitor change");
            self.set_contact_monitor(tree, enabled);
        }
    }

    // ========================================================================
    // Per-step state sync
    // ========================================================================

    /// Mirror the post-step state, run the hook and diff contacts.
    ///
    /// Velocity writes the hook makes to `state` are mirrored here; the driver
    /// commits them back to the server. Contact events go through the contact
    /// handler before they are queued.
    pub fn direct_state_changed(&mut self, tree: &mut dyn SceneTree, state: &mut DirectBodyState) {
        self.body.set_global_transform_silently(state.transform);
        self.linear_velocity = state.linear_velocity;
        self.angular_velocity = state.angular_velocity;
        self.inverse_inertia = state.inverse_inertia;
        if self.sleeping != state.sleeping {
            self.sleeping = state.sleeping;
            self.events.push(RigidBodyEvent::SleepingStateChanged {
                sleeping: self.sleeping,
            });
        }

        if let Some(hook) = &self.integrate_forces {
            hook.call(state);
            self.linear_velocity = state.linear_velocity;
            self.angular_velocity = state.angular_velocity;
        }

        if let Some(monitor) = self.contact_monitor.as_mut() {
            let mut events = Vec::new();
            monitor.process_contacts(&state.contacts, tree, &mut events);
            trace!(rid = %self.body.rid(), events = events.len(), "contacts diffed");
            self.dispatch_contact_events(tree, events);
        }
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<RigidBodyEvent> {
        std::mem::take(&mut self.events)
    }
}

fn with_axis_velocity(velocity: Vector3<f64>, axis_velocity: Vector3<f64>) -> Vector3<f64> {
    let axis = axis_velocity.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    velocity - axis * axis.dot(&velocity) + axis_velocity
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use body_server::ContactReport;
    use body_server::testing::{TestSceneTree, TestServer};
    use body_types::BodyHandle;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (TestServer, TestSceneTree, RigidBody) {
        let mut server = TestServer::new().with_gravity(Vector3::new(0.0, -10.0, 0.0));
        let mut tree = TestSceneTree::new();
        let id = tree.spawn();
        let mut body = RigidBody::new(&mut server, id);
        body.notification(Notification::EnterTree);
        (server, tree, body)
    }

    fn step(server: &mut TestServer, tree: &mut TestSceneTree, body: &mut RigidBody) {
        for mut state in server.step(0.1) {
            if state.body == body.body().rid() {
                body.direct_state_changed(tree, &mut state);
            }
            server.commit_direct_state(&state);
        }
    }

    fn contact(collider: BodyHandle, id: InstanceId) -> ContactReport {
        ContactReport {
            collider,
            collider_id: id,
            collider_shape: 0,
            local_shape: 0,
        }
    }

    #[test]
    fn test_new_installs_state_sync() {
        let (server, _, body) = setup();
        let stored = server.body(body.body().rid()).unwrap();
        assert_eq!(stored.mode, BodyMode::Dynamic);
        assert!(stored.state_callback);
        assert_eq!(body.inverse_mass(), 1.0);
    }

    #[test]
    fn test_step_mirrors_state() {
        let (mut server, mut tree, mut body) = setup();
        step(&mut server, &mut tree, &mut body);
        assert_relative_eq!(body.linear_velocity(), Vector3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(body.global_transform().translation.y, -0.1);
        assert!(body.inverse_inertia_tensor()[(0, 0)] > 0.0);
    }

    #[test]
    fn test_parameter_validation() {
        let (mut server, _, mut body) = setup();
        assert!(matches!(body.set_mass(&mut server, 0.0), Err(BodyError::InvalidMass(_))));
        assert_eq!(body.mass(), 1.0);
        body.set_mass(&mut server, 4.0).unwrap();
        assert_eq!(server.body(body.body().rid()).unwrap().param(BodyParam::Mass), 4.0);

        assert!(body.set_linear_damp(&mut server, -1.5).is_err());
        assert!(body.set_angular_damp(&mut server, -2.0).is_err());
        body.set_linear_damp(&mut server, -1.0).unwrap();
        body.set_angular_damp(&mut server, 0.5).unwrap();
        assert_eq!(body.angular_damp(), 0.5);
    }

    #[test]
    fn test_inverse_mass_zero_when_not_dynamic() {
        let (mut server, _, mut body) = setup();
        body.set_mode(&mut server, BodyMode::Kinematic);
        assert_eq!(body.inverse_mass(), 0.0);
        body.set_mode(&mut server, BodyMode::DynamicLocked);
        assert_eq!(body.inverse_mass(), 1.0);
    }

    #[test]
    fn test_axis_velocity_replaces_component() {
        let (mut server, _, mut body) = setup();
        body.set_linear_velocity(&mut server, Vector3::new(3.0, -2.0, 1.0));
        body.set_axis_velocity(&mut server, Vector3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(body.linear_velocity(), Vector3::new(3.0, 5.0, 1.0));
        assert_relative_eq!(
            server.body(body.body().rid()).unwrap().linear_velocity,
            Vector3::new(3.0, 5.0, 1.0)
        );
    }

    #[test]
    fn test_velocity_setters_write_server() {
        let (mut server, mut tree, mut body) = setup();
        let rid = body.body().rid();
        body.set_linear_velocity(&mut server, Vector3::new(0.0, 0.0, 2.0));
        body.set_angular_velocity(&mut server, Vector3::new(0.0, 1.0, 0.0));
        let stored = server.body(rid).unwrap();
        assert_eq!(stored.linear_velocity, Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(stored.angular_velocity, Vector3::new(0.0, 1.0, 0.0));

        // The next step starts from what the setters wrote.
        step(&mut server, &mut tree, &mut body);
        assert_relative_eq!(body.linear_velocity(), Vector3::new(0.0, -1.0, 2.0));
        assert_relative_eq!(body.angular_velocity(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_integrate_forces_hook_overrides_velocity() {
        let (mut server, mut tree, mut body) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        body.set_integrate_forces(move |state: &mut DirectBodyState| {
            seen.fetch_add(1, Ordering::SeqCst);
            state.linear_velocity = Vector3::new(1.0, 0.0, 0.0);
        });

        step(&mut server, &mut tree, &mut body);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(body.linear_velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(
            server.body(body.body().rid()).unwrap().linear_velocity,
            Vector3::new(1.0, 0.0, 0.0)
        );

        body.clear_integrate_forces();
        step(&mut server, &mut tree, &mut body);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sleeping_change_emits_event() {
        let (mut server, mut tree, mut body) = setup();
        server.body_mut(body.body().rid()).unwrap().sleeping = true;
        step(&mut server, &mut tree, &mut body);
        assert_eq!(
            body.drain_events(),
            vec![RigidBodyEvent::SleepingStateChanged { sleeping: true }]
        );

        step(&mut server, &mut tree, &mut body);
        assert!(body.drain_events().is_empty());
    }

    #[test]
    fn test_colliding_bodies_needs_monitor() {
        let (_, tree, body) = setup();
        assert!(body.colliding_bodies(&tree).is_empty());
    }

    #[test]
    fn test_contact_monitor_events() {
        let (mut server, mut tree, mut body) = setup();
        let other = tree.spawn();
        let rid = body.body().rid();
        body.set_contact_monitor(&mut tree, true);

        server.set_contacts(rid, vec![contact(BodyHandle(50), other)]);
        step(&mut server, &mut tree, &mut body);
        let events = body.drain_events();
        assert!(events.contains(&RigidBodyEvent::Contact(ContactEvent::BodyEntered { id: other })));
        assert_eq!(body.colliding_bodies(&tree), vec![other]);
        assert!(tree.is_subscribed(body.body().instance(), other));

        server.set_contacts(rid, Vec::new());
        step(&mut server, &mut tree, &mut body);
        let events = body.drain_events();
        assert!(events.contains(&RigidBodyEvent::Contact(ContactEvent::BodyExited { id: other })));
        assert!(body.colliding_bodies(&tree).is_empty());
    }

    #[test]
    fn test_disable_monitor_disconnects() {
        let (mut server, mut tree, mut body) = setup();
        let other = tree.spawn();
        let rid = body.body().rid();
        body.set_contact_monitor(&mut tree, true);
        server.set_contacts(rid, vec![contact(BodyHandle(50), other)]);
        step(&mut server, &mut tree, &mut body);
        assert_eq!(tree.subscription_count(), 1);

        body.set_contact_monitor(&mut tree, false);
        assert!(!body.is_contact_monitor_enabled());
        assert_eq!(tree.subscription_count(), 0);
    }

    #[test]
    fn test_disable_from_handler_is_deferred() {
        let (mut server, mut tree, mut body) = setup();
        let other = tree.spawn();
        let rid = body.body().rid();
        body.set_contact_monitor(&mut tree, true);

        let handled = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&handled);
        body.set_contact_handler(move |event, dispatch| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(dispatch.body(), rid);
            assert!(event.is_enter());
            assert!(matches!(
                dispatch.set_contact_monitor(false),
                Err(BodyError::ContactMonitorLocked)
            ));
            assert!(dispatch.set_contact_monitor(true).is_ok());
            dispatch.request_contact_monitor(false);
        });

        server.set_contacts(rid, vec![contact(BodyHandle(50), other)]);
        step(&mut server, &mut tree, &mut body);

        // Every event of the batch was delivered before the change applied.
        let events = body.drain_events();
        assert_eq!(handled.load(Ordering::SeqCst), events.len());
        assert!(events.contains(&RigidBodyEvent::Contact(ContactEvent::BodyEntered { id: other })));
        assert!(!body.is_contact_monitor_enabled());
        assert_eq!(tree.subscription_count(), 0);
    }

    #[test]
    fn test_handler_sees_tree_changes() {
        let (mut server, mut tree, mut body) = setup();
        let other = tree.spawn();
        let rid = body.body().rid();
        body.set_contact_monitor(&mut tree, true);
        server.set_contacts(rid, vec![contact(BodyHandle(50), other)]);
        step(&mut server, &mut tree, &mut body);
        body.drain_events();

        body.set_contact_handler(|event, dispatch| {
            if matches!(event, ContactEvent::BodyExited { .. }) {
                dispatch.request_contact_monitor(false);
            }
        });
        for watcher in tree.set_inside_tree(other, false) {
            assert_eq!(watcher, body.body().instance());
            body.body_exit_tree(&mut tree, other);
        }
        assert_eq!(body.drain_events().len(), 2);
        assert!(!body.is_contact_monitor_enabled());

        body.clear_contact_handler();
        body.set_contact_monitor(&mut tree, true);
        assert!(body.is_contact_monitor_enabled());
    }

    #[test]
    fn test_tree_changes_redispatch() {
        let (mut server, mut tree, mut body) = setup();
        let other = tree.spawn();
        let rid = body.body().rid();
        body.set_contact_monitor(&mut tree, true);
        server.set_contacts(rid, vec![contact(BodyHandle(50), other)]);
        step(&mut server, &mut tree, &mut body);
        body.drain_events();

        for watcher in tree.set_inside_tree(other, false) {
            assert_eq!(watcher, body.body().instance());
            body.body_exit_tree(&mut tree, other);
        }
        assert_eq!(
            body.drain_events(),
            vec![
                RigidBodyEvent::Contact(ContactEvent::BodyExited { id: other }),
                RigidBodyEvent::Contact(ContactEvent::BodyShapeExited {
                    collider: BodyHandle(50),
                    id: other,
                    body_shape: 0,
                    local_shape: 0,
                }),
            ]
        );
    }

    #[test]
    fn test_forces_reach_server() {
        let (mut server, _, mut body) = setup();
        let rid = body.body().rid();
        body.add_central_force(&mut server, Vector3::new(0.0, 10.0, 0.0));
        body.add_torque(&mut server, Vector3::new(0.0, 0.0, 1.0));
        let stored = server.body(rid).unwrap();
        assert_eq!(stored.force, Vector3::new(0.0, 10.0, 0.0));
        assert_eq!(stored.torque, Vector3::new(0.0, 0.0, 1.0));

        body.apply_central_impulse(&mut server, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(server.body(rid).unwrap().linear_velocity, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_flags_reach_server() {
        let (mut server, _, mut body) = setup();
        let rid = body.body().rid();
        body.set_use_custom_integrator(&mut server, true);
        body.set_max_contacts_reported(&mut server, 4);
        body.set_use_continuous_collision_detection(&mut server, true);
        body.set_can_sleep(&mut server, false);
        let stored = server.body(rid).unwrap();
        assert!(stored.omit_force_integration);
        assert_eq!(stored.max_contacts_reported, 4);
        assert!(stored.ccd);
        assert!(!stored.can_sleep);
    }
}
