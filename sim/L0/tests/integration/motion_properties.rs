//! Property tests for sweeps and slides.

use body_core::{CharacterBody, Notification, PhysicsBody};
use body_server::testing::TestServer;
use body_types::{
    BodyAxis, BodyMode, FLOOR_ANGLE_THRESHOLD, InstanceId, Isometry3, MotionResult, Point3,
    Vector3,
};
use hashbrown::HashSet;
use proptest::prelude::*;

const DT: f64 = 1.0 / 60.0;

fn vector(range: f64) -> impl Strategy<Value = Vector3<f64>> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn unit_normal() -> impl Strategy<Value = Vector3<f64>> {
    vector(1.0).prop_filter_map("degenerate normal", |v| v.try_normalize(1e-3))
}

/// Body hovering above a floor plane, close enough that some motions hit.
fn hovering(server: &mut TestServer, height: f64) -> PhysicsBody {
    server.add_plane(Point3::origin(), Vector3::y(), InstanceId(100));
    let mut body = PhysicsBody::new(server, InstanceId(1), BodyMode::Kinematic);
    body.set_global_transform(server, Isometry3::translation(0.0, height, 0.0));
    body
}

proptest! {
    /// Test: a test-only sweep never moves the body and answers the same
    /// way twice.
    #[test]
    fn test_only_sweeps_are_idempotent(
        motion in vector(3.0),
        height in 0.3..2.0f64,
        cancel_sliding in any::<bool>(),
    ) {
        let mut server = TestServer::new();
        let mut body = hovering(&mut server, height);
        let before = body.global_transform();
        let exclude = HashSet::new();

        let first = body.move_and_collide(&mut server, motion, 0.001, true, cancel_sliding, &exclude);
        let second = body.move_and_collide(&mut server, motion, 0.001, true, cancel_sliding, &exclude);

        prop_assert_eq!(body.global_transform(), before);
        prop_assert_eq!(
            server.body(body.rid()).map(|b| b.transform),
            Some(before)
        );
        prop_assert_eq!(first, second);
    }

    /// Test: travel along a locked axis is always zero.
    #[test]
    fn locked_axes_never_travel(
        motion in vector(3.0),
        height in 0.3..2.0f64,
        locks in 0u8..8,
    ) {
        let mut server = TestServer::new();
        let mut body = hovering(&mut server, height);
        let axes = [BodyAxis::LINEAR_X, BodyAxis::LINEAR_Y, BodyAxis::LINEAR_Z];
        for (i, axis) in axes.into_iter().enumerate() {
            if locks & (1 << i) != 0 {
                body.set_axis_lock(&mut server, axis, true);
            }
        }
        let before = body.global_transform().translation.vector;

        let result = body.move_and_collide(&mut server, motion, 0.001, false, false, &HashSet::new());
        let after = body.global_transform().translation.vector;

        for (i, axis) in axes.into_iter().enumerate() {
            if body.axis_lock(axis) {
                prop_assert_eq!(after[i], before[i]);
                if let Some(hit) = &result {
                    prop_assert_eq!(hit.travel[i], 0.0);
                }
            }
        }
    }

    /// Test: after one collision the motion carried into the next sweep has
    /// no component along the collision normal.
    #[test]
    fn slid_remainder_is_tangential(
        normal in unit_normal(),
        velocity in vector(20.0),
    ) {
        let mut server = TestServer::new();
        let mut character = CharacterBody::new(&mut server, InstanceId(1));
        character.notification(Notification::EnterTree);
        server.push_motion_result(Some(MotionResult {
            remainder: velocity * DT,
            collision_normal: normal,
            ..MotionResult::default()
        }));
        server.push_motion_result(None);
        character.set_linear_velocity(velocity);

        character.move_and_slide(&mut server, DT);

        let queries = server.motion_queries();
        if queries.len() > 1 {
            prop_assert!(queries[1].motion.dot(&normal).abs() < 1e-9);
        }
        prop_assert!(character.linear_velocity().dot(&normal).abs() < 1e-9);
    }

    /// Test: contacts up to the floor angle plus threshold are floors;
    /// anything steeper than that (but not facing down) is a wall.
    #[test]
    fn floor_threshold_classification(
        floor_max_angle in 0.1..1.2f64,
        offset in -0.1..0.3f64,
    ) {
        let angle = floor_max_angle + offset;
        prop_assume!((angle - floor_max_angle - FLOOR_ANGLE_THRESHOLD).abs() > 1e-6);

        let mut server = TestServer::new();
        let mut character = CharacterBody::new(&mut server, InstanceId(1));
        character.set_floor_max_angle(floor_max_angle).expect("angle in range");
        server.push_motion_result(Some(MotionResult {
            collision_normal: Vector3::new(angle.sin(), angle.cos(), 0.0),
            ..MotionResult::default()
        }));
        character.set_linear_velocity(Vector3::new(0.0, -1.0, 0.0));
        character.move_and_slide(&mut server, DT);

        let expect_floor = angle <= floor_max_angle + FLOOR_ANGLE_THRESHOLD;
        prop_assert_eq!(character.is_on_floor(), expect_floor);
        prop_assert_eq!(character.is_on_wall(), !expect_floor);
        prop_assert!(!character.is_on_ceiling());
    }
}
