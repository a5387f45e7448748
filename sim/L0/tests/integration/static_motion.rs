//! Static bodies as conveyors and kinematic platforms.

use approx::assert_relative_eq;
use body_core::{CharacterBody, Notification, StaticBody};
use body_server::testing::{TestServer, TestShape};
use body_types::{BodyMode, InstanceId, Isometry3, Vector3};

const DT: f64 = 1.0 / 60.0;

fn spawn_static(server: &mut TestServer, id: u64) -> StaticBody {
    let mut body = StaticBody::new(server, InstanceId(id));
    body.notification(server, Notification::EnterTree);
    body
}

fn tick(server: &mut TestServer, body: &mut StaticBody) {
    body.notification(server, Notification::InternalPhysicsProcess { delta: DT });
}

/// Run one server step and hand the platform its post-step state.
fn step(server: &mut TestServer, body: &mut StaticBody) {
    for state in server.step(DT) {
        if state.body == body.body().rid() {
            body.direct_state_changed(&state);
        }
        server.commit_direct_state(&state);
    }
}

/// Test: a kinematic platform climbs by its constant velocity every tick and
/// keeps the server in step with the node.
#[test]
fn kinematic_platform_advances_each_tick() {
    let mut server = TestServer::new();
    let mut lift = spawn_static(&mut server, 1);
    let rid = lift.body().rid();
    lift.set_kinematic_motion_enabled(&mut server, true);
    lift.set_constant_linear_velocity(&mut server, Vector3::new(0.0, 1.0, 0.0));
    assert!(lift.is_physics_processing_internal());
    assert_eq!(server.body(rid).map(|b| b.mode), Some(BodyMode::Kinematic));

    for _ in 0..60 {
        tick(&mut server, &mut lift);
    }

    let gt = lift.global_transform();
    assert_relative_eq!(gt.translation.vector, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    let stored = server.body(rid).expect("lift body").transform;
    assert_relative_eq!(stored.translation.vector, gt.translation.vector, epsilon = 1e-12);
}

/// Test: a conveyor that never moves still carries a character standing on
/// it at the belt speed.
#[test]
fn conveyor_carries_character() {
    let mut server = TestServer::new();
    let mut belt = spawn_static(&mut server, 100);
    let rid = belt.body().rid();
    server.set_shape(rid, TestShape::Plane { normal: Vector3::y() });
    belt.set_constant_linear_velocity(&mut server, Vector3::new(1.0, 0.0, 0.0));

    let mut character = CharacterBody::new(&mut server, InstanceId(1));
    character.set_global_transform(&mut server, Isometry3::translation(0.0, 0.501, 0.0));
    character.notification(Notification::EnterTree);

    for _ in 0..61 {
        let mut velocity = character.linear_velocity();
        velocity.y -= 9.8 * DT;
        character.set_linear_velocity(velocity);
        character.move_and_slide(&mut server, DT);
        assert!(character.is_on_floor());
        assert_eq!(character.platform_body(), Some(rid));
    }

    assert_eq!(character.platform_velocity(), Vector3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(character.global_transform().translation.x, 1.0, epsilon = 1e-9);
    assert_eq!(belt.global_transform(), Isometry3::identity());
    assert_eq!(server.body(rid).map(|b| b.transform), Some(Isometry3::identity()));
}

/// Test: with sync-to-physics the node only moves once the server reports
/// the new transform back.
#[test]
fn synced_platform_follows_server() {
    let mut server = TestServer::new();
    let mut door = spawn_static(&mut server, 1);
    let rid = door.body().rid();
    door.set_kinematic_motion_enabled(&mut server, true);
    door.set_sync_to_physics(&mut server, true);
    door.set_constant_linear_velocity(&mut server, Vector3::new(0.0, 0.0, 6.0));
    assert!(door.configuration_warnings().is_empty());

    tick(&mut server, &mut door);
    assert_eq!(door.global_transform(), Isometry3::identity());
    let proposed = server.body(rid).expect("door body").transform;
    assert!(proposed.translation.z > 0.0);

    step(&mut server, &mut door);
    assert_eq!(door.global_transform(), proposed);

    // The next tick starts from the confirmed transform.
    tick(&mut server, &mut door);
    assert_eq!(door.global_transform(), proposed);
    let next = server.body(rid).expect("door body").transform;
    assert!(next.translation.z > proposed.translation.z);
}

/// Test: turning kinematic motion off while syncing is flagged, and ticks
/// on such a body are ignored.
#[test]
fn sync_without_kinematic_motion_is_flagged() {
    let mut server = TestServer::new();
    let mut body = spawn_static(&mut server, 1);
    body.set_constant_linear_velocity(&mut server, Vector3::new(1.0, 0.0, 0.0));
    body.set_sync_to_physics(&mut server, true);

    let warnings = body.configuration_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("kinematic motion"));
    assert!(!body.is_physics_processing_internal());

    tick(&mut server, &mut body);
    assert_eq!(body.global_transform(), Isometry3::identity());
}
