//! Static bodies, optionally driven kinematically by constant velocities.

use body_server::{BodyParam, BodyState, DirectBodyState, PhysicsServer};
use body_types::{
    BodyMode, CMP_EPSILON, InstanceId, Isometry3, PhysicsMaterial, UnitQuaternion, Vector3,
};
use nalgebra::Unit;
use tracing::{debug, warn};

use crate::body::PhysicsBody;
use crate::notification::Notification;

/// Default fixed step used before the first internal tick.
pub const DEFAULT_PHYSICS_DELTA: f64 = 1.0 / 60.0;

const SYNC_WITHOUT_KINEMATIC: &str = "Sync to physics works only when kinematic motion is enabled.";

/// A body that does not move on its own.
///
/// Constant velocities are reported to touching bodies (a conveyor belt).
/// With kinematic motion enabled the body also advances by those velocities
/// every internal tick; with sync-to-physics additionally enabled the node
/// follows the transform the server reports instead of leading it.
#[derive(Debug)]
pub struct StaticBody {
    body: PhysicsBody,
    constant_linear_velocity: Vector3<f64>,
    constant_angular_velocity: Vector3<f64>,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    kinematic_motion: bool,
    sync_to_physics: bool,
    physics_process: bool,
    physics_delta: f64,
    material_override: Option<PhysicsMaterial>,
    last_valid_transform: Isometry3<f64>,
}

impl StaticBody {
    /// Create a static body for `instance`.
    pub fn new(server: &mut dyn PhysicsServer, instance: InstanceId) -> Self {
        Self {
            body: PhysicsBody::new(server, instance, BodyMode::Static),
            constant_linear_velocity: Vector3::zeros(),
            constant_angular_velocity: Vector3::zeros(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            kinematic_motion: false,
            sync_to_physics: false,
            physics_process: false,
            physics_delta: DEFAULT_PHYSICS_DELTA,
            material_override: None,
            last_valid_transform: Isometry3::identity(),
        }
    }

    /// Release the server body.
    pub fn free(self, server: &mut dyn PhysicsServer) {
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

    // ========================================================================
    // Velocities
    // ========================================================================

    /// Velocity reported to touching bodies.
    #[must_use]
    pub fn constant_linear_velocity(&self) -> Vector3<f64> {
        self.constant_linear_velocity
    }

    /// Set the velocity reported to touching bodies.
    pub fn set_constant_linear_velocity(
        &mut self,
        server: &mut dyn PhysicsServer,
        velocity: Vector3<f64>,
    ) {
        self.constant_linear_velocity = velocity;
        if self.kinematic_motion {
            self.update_kinematic_motion(server);
        } else {
            server.body_set_state(self.body.rid(), BodyState::LinearVelocity(velocity));
        }
    }

    /// Angular velocity reported to touching bodies.
    #[must_use]
    pub fn constant_angular_velocity(&self) -> Vector3<f64> {
        self.constant_angular_velocity
    }

    /// Set the angular velocity reported to touching bodies.
    pub fn set_constant_angular_velocity(
        &mut self,
        server: &mut dyn PhysicsServer,
        velocity: Vector3<f64>,
    ) {
        self.constant_angular_velocity = velocity;
        if self.kinematic_motion {
            self.update_kinematic_motion(server);
        } else {
            server.body_set_state(self.body.rid(), BodyState::AngularVelocity(velocity));
        }
    }

    /// Linear velocity last reported by the server.
    #[must_use]
    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    /// Angular velocity last reported by the server.
    #[must_use]
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    // ========================================================================
    // Kinematic motion
    // ========================================================================

    /// Whether the body advances by its constant velocities.
    #[must_use]
    pub fn is_kinematic_motion_enabled(&self) -> bool {
        self.kinematic_motion
    }

    /// Switch between a static and a kinematic server body.
    pub fn set_kinematic_motion_enabled(&mut self, server: &mut dyn PhysicsServer, enabled: bool) {
        if enabled == self.kinematic_motion {
            return;
        }
        self.kinematic_motion = enabled;
        let mode = if enabled {
            BodyMode::Kinematic
        } else {
            BodyMode::Static
        };
        self.body.set_mode(server, mode);
        self.update_kinematic_motion(server);
    }

    /// Whether the node follows the server transform.
    #[must_use]
    pub fn is_sync_to_physics_enabled(&self) -> bool {
        self.sync_to_physics
    }

    /// Make the node follow the server transform. Needs kinematic motion.
    pub fn set_sync_to_physics(&mut self, server: &mut dyn PhysicsServer, enabled: bool) {
        if enabled == self.sync_to_physics {
            return;
        }
        self.sync_to_physics = enabled;
        if self.kinematic_motion {
            self.update_kinematic_motion(server);
        }
    }

    /// Whether internal ticks are currently wanted.
    #[must_use]
    pub fn is_physics_processing_internal(&self) -> bool {
        self.physics_process
    }

    /// Step length used to advance the body.
    #[must_use]
    pub fn physics_delta(&self) -> f64 {
        self.physics_delta
    }

    fn update_kinematic_motion(&mut self, server: &mut dyn PhysicsServer) {
        let syncing = self.kinematic_motion && self.sync_to_physics;
        self.body.set_only_update_transform_changes(syncing);
        self.body.set_notify_local_transform(syncing);

        let mut needs_physics_process = false;
        if self.kinematic_motion {
            server.body_set_force_integration_callback(self.body.rid(), true);
            if self.constant_linear_velocity != Vector3::zeros()
                || self.constant_angular_velocity != Vector3::zeros()
            {
                needs_physics_process = true;
            }
        } else {
            server.body_set_force_integration_callback(self.body.rid(), false);
        }
        if needs_physics_process != self.physics_process {
            debug!(rid = %self.body.rid(), needs_physics_process, "static body processing toggled");
        }
        self.physics_process = needs_physics_process;
    }

    /// Configuration problems worth showing to a user.
    #[must_use]
    pub fn configuration_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.sync_to_physics && !self.kinematic_motion {
            warnings.push(SYNC_WITHOUT_KINEMATIC.to_owned());
        }
        warnings
    }

    // ========================================================================
    // Material
    // ========================================================================

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

    // ========================================================================
    // Transform & notifications
    // ========================================================================

    /// Global transform of the node.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.body.global_transform()
    }

    /// Move the node from outside.
    ///
    /// While syncing to physics this only proposes the transform to the
    /// server; the node keeps its last server-confirmed transform.
    pub fn set_global_transform(&mut self, server: &mut dyn PhysicsServer, transform: Isometry3<f64>) {
        self.body.set_global_transform(server, transform);
        if self.body.notify_local_transform() {
            self.notification(server, Notification::LocalTransformChanged);
        }
    }

    /// React to a scene notification.
    pub fn notification(&mut self, server: &mut dyn PhysicsServer, what: Notification) {
        match what {
            Notification::EnterTree => {
                self.body.set_inside_tree(true);
                self.last_valid_transform = self.body.global_transform();
            }
            Notification::ExitTree => self.body.set_inside_tree(false),
            Notification::LocalTransformChanged => {
                // Propose the advanced transform to the server, then revert.
                let proposed = self.advance(self.body.global_transform(), self.physics_delta);
                server.body_set_state(self.body.rid(), BodyState::Transform(proposed));
                self.body.set_global_transform_silently(self.last_valid_transform);
            }
            Notification::InternalPhysicsProcess { delta } => {
                self.physics_delta = delta;
                if !self.kinematic_motion {
                    warn!(rid = %self.body.rid(), "internal tick on a non-kinematic static body");
                    return;
                }
                let next = self.advance(self.body.global_transform(), delta);
                if self.sync_to_physics {
                    self.set_global_transform(server, next);
                } else {
                    server.body_set_state(self.body.rid(), BodyState::Transform(next));
                    self.body.set_global_transform_silently(next);
                }
            }
        }
    }

    /// Post-step state sync, installed while kinematic motion is enabled.
    pub fn direct_state_changed(&mut self, state: &DirectBodyState) {
        self.linear_velocity = state.linear_velocity;
        self.angular_velocity = state.angular_velocity;
        if !self.sync_to_physics {
            return;
        }
        self.last_valid_transform = state.transform;
        self.body.set_global_transform_silently(state.transform);
    }

    fn advance(&self, from: Isometry3<f64>, delta: f64) -> Isometry3<f64> {
        let mut next = from;
        next.translation.vector += self.constant_linear_velocity * delta;
        let angular_speed = self.constant_angular_velocity.norm();
        if angular_speed > CMP_EPSILON {
            let axis = Unit::new_normalize(self.constant_angular_velocity);
            let rotation = UnitQuaternion::from_axis_angle(&axis, angular_speed * delta);
            next.rotation = UnitQuaternion::new_normalize((rotation * next.rotation).into_inner());
        }
        next
    }
}

/// Push friction and bounce for `material`, or the defaults without one.
pub(crate) fn reload_physics_characteristics(
    server: &mut dyn PhysicsServer,
    body: &PhysicsBody,
    material: Option<&PhysicsMaterial>,
) {
    let (bounce, friction) = material.map_or((0.0, 1.0), |m| {
        (m.computed_bounce(), m.computed_friction())
    });
    server.body_set_param(body.rid(), BodyParam::Bounce, bounce);
    server.body_set_param(body.rid(), BodyParam::Friction, friction);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use body_server::testing::TestServer;
    use std::f64::consts::FRAC_PI_2;

    fn conveyor(server: &mut TestServer) -> StaticBody {
        let mut body = StaticBody::new(server, InstanceId(1));
        body.notification(server, Notification::EnterTree);
        body
    }

    #[test]
    fn test_constant_velocity_reported_to_server() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        body.set_constant_linear_velocity(&mut server, Vector3::new(2.0, 0.0, 0.0));
        body.set_constant_angular_velocity(&mut server, Vector3::new(0.0, 1.0, 0.0));

        let stored = server.body(body.body().rid()).unwrap();
        assert_eq!(stored.linear_velocity, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(stored.angular_velocity, Vector3::new(0.0, 1.0, 0.0));
        assert!(!body.is_physics_processing_internal());
    }

    #[test]
    fn test_kinematic_toggle_switches_mode_and_hook() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        let rid = body.body().rid();

        body.set_constant_linear_velocity(&mut server, Vector3::x());
        body.set_kinematic_motion_enabled(&mut server, true);
        assert_eq!(server.body(rid).unwrap().mode, BodyMode::Kinematic);
        assert!(server.body(rid).unwrap().state_callback);
        assert!(body.is_physics_processing_internal());

        body.set_kinematic_motion_enabled(&mut server, false);
        assert_eq!(server.body(rid).unwrap().mode, BodyMode::Static);
        assert!(!server.body(rid).unwrap().state_callback);
        assert!(!body.is_physics_processing_internal());
    }

    #[test]
    fn test_internal_tick_advances_transform() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        body.set_kinematic_motion_enabled(&mut server, true);
        body.set_constant_linear_velocity(&mut server, Vector3::new(1.0, 0.0, 0.0));
        body.set_constant_angular_velocity(&mut server, Vector3::new(0.0, FRAC_PI_2, 0.0));

        body.notification(&mut server, Notification::InternalPhysicsProcess { delta: 1.0 });

        let gt = body.global_transform();
        assert_relative_eq!(gt.translation.vector, Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(gt.rotation.angle(), FRAC_PI_2, epsilon = 1e-12);
        let stored = server.body(body.body().rid()).unwrap();
        assert_relative_eq!(stored.transform.translation.vector, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(body.physics_delta(), 1.0);
    }

    #[test]
    fn test_sync_to_physics_reverts_local_moves() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        let rid = body.body().rid();
        body.set_kinematic_motion_enabled(&mut server, true);
        body.set_sync_to_physics(&mut server, true);
        body.set_constant_linear_velocity(&mut server, Vector3::new(0.0, 0.0, 6.0));

        body.set_global_transform(&mut server, Isometry3::translation(5.0, 0.0, 0.0));

        // The server got the proposal advanced by one default step.
        let stored = server.body(rid).unwrap();
        assert_relative_eq!(
            stored.transform.translation.vector,
            Vector3::new(5.0, 0.0, 6.0 * DEFAULT_PHYSICS_DELTA),
            epsilon = 1e-12
        );
        // The node kept its last confirmed transform.
        assert_eq!(body.global_transform(), Isometry3::identity());
    }

    #[test]
    fn test_state_sync_follows_server() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        body.set_kinematic_motion_enabled(&mut server, true);
        body.set_sync_to_physics(&mut server, true);

        let mut state = DirectBodyState::at_rest(body.body().rid(), Isometry3::translation(0.0, 3.0, 0.0));
        state.linear_velocity = Vector3::new(0.0, 1.0, 0.0);
        body.direct_state_changed(&state);

        assert_eq!(body.linear_velocity(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(body.global_transform(), Isometry3::translation(0.0, 3.0, 0.0));

        // Without sync only the velocities are mirrored.
        body.set_sync_to_physics(&mut server, false);
        state.transform = Isometry3::translation(9.0, 9.0, 9.0);
        body.direct_state_changed(&state);
        assert_eq!(body.global_transform(), Isometry3::translation(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_sync_warning_without_kinematic() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        assert!(body.configuration_warnings().is_empty());

        body.set_sync_to_physics(&mut server, true);
        assert_eq!(body.configuration_warnings(), vec![SYNC_WITHOUT_KINEMATIC.to_owned()]);

        body.set_kinematic_motion_enabled(&mut server, true);
        assert!(body.configuration_warnings().is_empty());
    }

    #[test]
    fn test_material_override_pushes_computed_values() {
        let mut server = TestServer::new();
        let mut body = conveyor(&mut server);
        let rid = body.body().rid();

        let material = PhysicsMaterial::new(0.4, 0.6).unwrap().rough();
        body.set_physics_material_override(&mut server, Some(material));
        assert_eq!(server.body(rid).unwrap().param(BodyParam::Friction), -0.4);
        assert_eq!(server.body(rid).unwrap().param(BodyParam::Bounce), 0.6);

        body.set_physics_material_override(&mut server, None);
        assert_eq!(server.body(rid).unwrap().param(BodyParam::Friction), 1.0);
        assert_eq!(server.body(rid).unwrap().param(BodyParam::Bounce), 0.0);
    }
}
