//! Character movement scenarios.
//!
//! Characters are spheres of radius 0.5 swept against infinite planes by the
//! in-memory server. Gravity is applied by the test loop the way a game
//! script would before each `move_and_slide`.

use approx::assert_relative_eq;
use body_core::{CharacterBody, Notification};
use body_server::testing::TestServer;
use body_server::{BodyState, PhysicsServer};
use body_types::{BodyHandle, BodyMode, InstanceId, Isometry3, Point3, Vector3};

const DT: f64 = 1.0 / 60.0;
const GRAVITY: f64 = 9.8;

fn spawn_character(server: &mut TestServer, position: Vector3<f64>) -> CharacterBody {
    let mut character = CharacterBody::new(server, InstanceId(1));
    character.set_global_transform(server, Isometry3::translation(position.x, position.y, position.z));
    character.notification(Notification::EnterTree);
    character
}

fn fall_and_slide(server: &mut TestServer, character: &mut CharacterBody) -> bool {
    let mut velocity = character.linear_velocity();
    velocity.y -= GRAVITY * DT;
    character.set_linear_velocity(velocity);
    character.move_and_slide(server, DT)
}

/// Plane through the origin tilted `degrees` away from +y toward +x.
fn slope(server: &mut TestServer, degrees: f64) -> (BodyHandle, Vector3<f64>) {
    let angle = degrees.to_radians();
    let normal = Vector3::new(angle.sin(), angle.cos(), 0.0);
    (server.add_plane(Point3::origin(), normal, InstanceId(100)), normal)
}

/// Test: walking across a flat floor under gravity keeps the character on
/// the floor at a constant height.
#[test]
fn walking_on_flat_floor() {
    let mut server = TestServer::new();
    let floor = server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
    let mut character = spawn_character(&mut server, Vector3::new(0.0, 0.501, 0.0));
    character.set_linear_velocity(Vector3::new(3.0, 0.0, 0.0));

    for step in 0..60 {
        assert!(fall_and_slide(&mut server, &mut character), "step {step} should touch the floor");
        assert!(character.is_on_floor_only(), "step {step}: expected floor only");
        assert_eq!(character.platform_body(), Some(floor));
    }

    let gt = character.global_transform();
    assert_relative_eq!(gt.translation.y, 0.501, epsilon = 1e-12);
    assert_relative_eq!(gt.translation.x, 3.0, epsilon = 1e-9);
    assert_relative_eq!(character.linear_velocity(), Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
}

/// Test: a character riding a moving platform inherits its velocity exactly
/// once when it jumps off.
#[test]
fn platform_momentum_hand_off() {
    let mut server = TestServer::new();
    let platform = server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
    server.body_set_mode(platform, BodyMode::Kinematic);
    server.body_set_state(platform, BodyState::LinearVelocity(Vector3::new(2.0, 0.0, 0.0)));
    let mut character = spawn_character(&mut server, Vector3::new(0.0, 0.501, 0.0));

    // Land, then ride for a second.
    for _ in 0..61 {
        server.step(DT);
        fall_and_slide(&mut server, &mut character);
        assert!(character.is_on_floor());
    }
    assert_eq!(character.platform_velocity(), Vector3::new(2.0, 0.0, 0.0));
    assert_relative_eq!(character.global_transform().translation.x, 2.0, epsilon = 1e-9);
    assert_eq!(character.linear_velocity().x, 0.0);

    // Jump.
    character.set_linear_velocity(Vector3::new(0.0, 5.0, 0.0));
    character.move_and_slide(&mut server, DT);
    assert!(!character.is_on_floor());
    assert_eq!(character.linear_velocity(), Vector3::new(2.0, 5.0, 0.0));

    // Airborne: no second hand-off.
    character.move_and_slide(&mut server, DT);
    assert_eq!(character.linear_velocity(), Vector3::new(2.0, 5.0, 0.0));
}

/// Test: motion wedged into a V-shaped corner keeps colliding and stops
/// after exactly `max_slides` sweeps.
#[test]
fn max_slides_exhaustion_in_corner() {
    let mut server = TestServer::new();
    let angle = 30f64.to_radians();
    server.add_plane(Point3::origin(), Vector3::new(angle.sin(), angle.cos(), 0.0), InstanceId(100));
    server.add_plane(Point3::origin(), Vector3::new(-angle.sin(), angle.cos(), 0.0), InstanceId(101));

    let height = (0.5 + 0.001) / angle.cos();
    let mut character = spawn_character(&mut server, Vector3::new(0.0, height, 0.0));
    character.set_max_slides(4).expect("non-zero max slides");
    character.set_linear_velocity(Vector3::new(0.0, -60.0, 0.0));
    server.clear_motion_queries();

    assert!(character.move_and_slide(&mut server, DT));
    assert_eq!(character.slide_collision_count(), 4);
    assert_eq!(server.motion_queries().len(), 4);
    assert!(character.is_on_floor());
}

/// Test: standing still on a slope with stop-on-slope enabled never drifts,
/// while the same slope without it carries the character downhill.
#[test]
fn stop_on_slope_holds_position() {
    let run = |stop_on_slope: bool| {
        let mut server = TestServer::new();
        let (_, normal) = slope(&mut server, 30.0);
        let start = normal * 0.501;
        let mut character = spawn_character(&mut server, start);
        character.set_floor_stop_on_slope(stop_on_slope);
        for _ in 0..30 {
            fall_and_slide(&mut server, &mut character);
        }
        (character.global_transform().translation.vector - start, character.is_on_floor())
    };

    let (drift, on_floor) = run(true);
    assert!(on_floor);
    assert!(drift.norm() < 1e-9, "stop-on-slope drifted by {drift:?}");

    let (drift, _) = run(false);
    assert!(drift.x > 0.1, "expected downhill slide, got {drift:?}");
    assert!(drift.y < 0.0);
}

/// Test: a wall stops motion into it but keeps motion along it.
#[test]
fn sliding_along_a_wall() {
    let mut server = TestServer::new();
    server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
    server.add_plane(Point3::new(1.0, 0.0, 0.0), -Vector3::x(), InstanceId(101));
    let mut character = spawn_character(&mut server, Vector3::new(0.0, 0.501, 0.0));

    for _ in 0..60 {
        character.set_linear_velocity(Vector3::new(4.0, character.linear_velocity().y, 2.0));
        fall_and_slide(&mut server, &mut character);
    }

    let gt = character.global_transform();
    assert!(character.is_on_floor());
    assert!(character.is_on_wall());
    assert!(gt.translation.x <= 0.5, "passed through the wall: {}", gt.translation.x);
    assert!(gt.translation.z > 1.5);
    assert_relative_eq!(gt.translation.y, 0.501, epsilon = 1e-9);
}

/// Test: snap keeps a character on a floor it is about to step off of.
#[test]
fn snap_pulls_onto_lower_ledge() {
    let mut server = TestServer::new();
    let upper = server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
    let lower = server.add_plane(Point3::new(0.0, -0.2, 0.0), Vector3::y(), InstanceId(101));
    let mut character = spawn_character(&mut server, Vector3::new(0.0, 0.501, 0.0));
    character.set_snap(Vector3::new(0.0, -0.5, 0.0)).expect("finite snap");

    fall_and_slide(&mut server, &mut character);
    assert_eq!(character.platform_body(), Some(upper));

    // The upper floor vanishes from under the character.
    server.body_free(upper);
    character.set_linear_velocity(Vector3::new(1.0, 0.0, 0.0));
    character.move_and_slide(&mut server, DT);

    assert!(character.is_on_floor());
    assert_eq!(character.platform_body(), Some(lower));
    assert_relative_eq!(character.global_transform().translation.y, 0.301, epsilon = 1e-9);
}
