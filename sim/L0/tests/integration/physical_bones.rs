//! Physical bones bound to a small skeleton.
//!
//! The skeleton is `hips -> spine -> arm`. Only the hips and the arm carry
//! physical bones, so the arm's joint reaches past the spine to the hips.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use body_core::{BONE_NAME_PROPERTY, BonePropertyValue, PhysicalBone, Skeleton};
use body_joint::{JointType, PropertyValue};
use body_server::testing::{JointParamKey, TestServer};
use body_server::{HingeJointParam, JointKind, PinJointParam};
use body_types::{BodyMode, InstanceId, Isometry3, Vector3};

const DT: f64 = 1.0 / 60.0;

const HIPS: usize = 0;
const ARM: usize = 2;

fn skeleton_at(transform: Isometry3<f64>) -> Rc<RefCell<Skeleton>> {
    let mut skeleton = Skeleton::new().with_transform(transform);
    let hips = skeleton.add_bone("hips", None, Isometry3::translation(0.0, 1.0, 0.0));
    let spine = skeleton.add_bone("spine", Some(hips), Isometry3::translation(0.0, 1.5, 0.0));
    skeleton.add_bone("arm", Some(spine), Isometry3::translation(0.0, 2.0, 0.0));
    Rc::new(RefCell::new(skeleton))
}

fn attach(
    server: &mut TestServer,
    skeleton: &Rc<RefCell<Skeleton>>,
    id: u64,
    bone: &str,
) -> PhysicalBone {
    let mut physical = PhysicalBone::new(server, InstanceId(id));
    physical.set_bone_name(server, bone);
    physical.enter_tree(server, Some(skeleton));
    physical
}

/// Test: a joint chosen before entering the tree is built against the
/// nearest ancestor with a physical bone.
#[test]
fn joint_binds_to_nearest_physical_ancestor() {
    let mut server = TestServer::new();
    let skeleton = skeleton_at(Isometry3::identity());
    let mut hips = attach(&mut server, &skeleton, 1, "hips");

    let mut arm = PhysicalBone::new(&mut server, InstanceId(2));
    arm.set_bone_name(&mut server, "arm");
    arm.set_joint_type(&mut server, JointType::Pin);
    assert_eq!(server.joint(arm.joint()).and_then(|j| j.kind), None);

    arm.enter_tree(&mut server, Some(&skeleton));
    assert_eq!(arm.bone_id(), Some(ARM));
    assert_eq!(skeleton.borrow().physical_bone(ARM), Some(arm.body().rid()));
    assert_eq!(
        arm.global_transform().translation.vector,
        Vector3::new(0.0, 2.0, 0.0)
    );

    let joint = server.joint(arm.joint()).expect("arm joint");
    assert_eq!(joint.kind, Some(JointKind::Pin));
    assert_eq!(joint.body_a, Some(hips.body().rid()));
    assert_eq!(joint.body_b, Some(arm.body().rid()));
    assert_relative_eq!(joint.local_a.translation.vector, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(joint.param(JointParamKey::Pin(PinJointParam::Bias)), Some(0.3));

    // The root bone has nothing to attach to.
    hips.set_joint_type(&mut server, JointType::Pin);
    assert_eq!(server.joint(hips.joint()).and_then(|j| j.kind), None);
}

/// Test: switching the joint kind replaces both the server joint and the
/// exposed property set.
#[test]
fn joint_type_switch_replaces_properties() {
    let mut server = TestServer::new();
    let skeleton = skeleton_at(Isometry3::identity());
    let _hips = attach(&mut server, &skeleton, 1, "hips");
    let mut arm = attach(&mut server, &skeleton, 2, "arm");

    arm.set_joint_type(&mut server, JointType::Pin);
    let names = arm.property_names();
    assert_eq!(names[0], BONE_NAME_PROPERTY);
    assert!(names.iter().any(|n| n == "joint_constraints/bias"));

    arm.set_joint_type(&mut server, JointType::Hinge);
    let names = arm.property_names();
    assert!(!names.iter().any(|n| n == "joint_constraints/bias"));
    assert!(names.iter().any(|n| n == "joint_constraints/angular_limit_bias"));
    assert!(arm.get_property("joint_constraints/bias").is_none());

    let joint = server.joint(arm.joint()).expect("arm joint");
    assert_eq!(joint.kind, Some(JointKind::Hinge));
    assert_eq!(joint.param(JointParamKey::Pin(PinJointParam::Bias)), None);
    assert_eq!(joint.param(JointParamKey::Hinge(HingeJointParam::LimitBias)), Some(0.3));

    // Degrees in, radians on the server.
    assert!(arm.set_property(
        &mut server,
        "joint_constraints/angular_limit_upper",
        BonePropertyValue::Joint(PropertyValue::Float(30.0)),
    ));
    let upper = server
        .joint(arm.joint())
        .and_then(|j| j.param(JointParamKey::Hinge(HingeJointParam::LimitUpper)))
        .expect("upper limit pushed");
    assert_relative_eq!(upper, 30f64.to_radians(), epsilon = 1e-12);
    match arm.get_property("joint_constraints/angular_limit_upper") {
        Some(BonePropertyValue::Joint(value)) => {
            assert_relative_eq!(value.as_f64(), 30.0, epsilon = 1e-9);
        }
        other => panic!("unexpected property value {other:?}"),
    }

    // Properties of the old kind are refused.
    assert!(!arm.set_property(
        &mut server,
        "joint_constraints/impulse_clamp",
        BonePropertyValue::Joint(PropertyValue::Float(1.0)),
    ));
}

/// Test: a simulating bone falls and drives its bone through a persistent
/// override expressed in skeleton space; stopping clears the override.
#[test]
fn simulation_drives_bone_pose() {
    let mut server = TestServer::new().with_gravity(Vector3::new(0.0, -9.8, 0.0));
    let skeleton = skeleton_at(Isometry3::translation(5.0, 0.0, 0.0));
    let _hips = attach(&mut server, &skeleton, 1, "hips");
    let mut arm = attach(&mut server, &skeleton, 2, "arm");
    let rid = arm.body().rid();
    assert_eq!(arm.global_transform().translation.vector, Vector3::new(5.0, 2.0, 0.0));

    arm.set_simulate_physics(&mut server, true);
    assert!(arm.is_simulating_physics());
    assert!(arm.body().is_top_level());
    assert_eq!(server.body(rid).map(|b| b.mode), Some(BodyMode::Dynamic));

    for _ in 0..30 {
        for state in server.step(DT) {
            if state.body == rid {
                arm.direct_state_changed(&state);
            }
            server.commit_direct_state(&state);
        }
    }

    let fallen = arm.global_transform();
    assert!(fallen.translation.y < 2.0);
    let pose_override = skeleton
        .borrow()
        .bone_global_pose_override(ARM)
        .expect("override while simulating");
    assert_eq!(pose_override.amount, 1.0);
    assert!(pose_override.persistent);
    assert_relative_eq!(pose_override.pose.translation.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(pose_override.pose.translation.y, fallen.translation.y, epsilon = 1e-12);
    assert!(skeleton.borrow().bone_global_pose_override(HIPS).is_none());

    arm.set_simulate_physics(&mut server, false);
    assert!(!arm.is_simulating_physics());
    assert!(skeleton.borrow().bone_global_pose_override(ARM).is_none());
    let stored = server.body(rid).expect("arm body");
    assert_eq!(stored.mode, BodyMode::Static);
    assert_eq!(stored.collision_layer, 0);
    assert!(!stored.state_callback);
}

/// Test: with animated physical bones a stopped bone stays kinematic and
/// keeps colliding.
#[test]
fn animated_bones_stop_as_kinematic() {
    let mut server = TestServer::new();
    let skeleton = skeleton_at(Isometry3::identity());
    skeleton.borrow_mut().set_animate_physical_bones(true);
    let mut arm = attach(&mut server, &skeleton, 2, "arm");
    let rid = arm.body().rid();

    arm.set_simulate_physics(&mut server, true);
    arm.set_simulate_physics(&mut server, false);

    let stored = server.body(rid).expect("arm body");
    assert_eq!(stored.mode, BodyMode::Kinematic);
    assert_eq!(stored.collision_layer, arm.body().collision_layer());
}

/// Test: leaving the tree releases the bone and clears the joint; freeing
/// releases the server objects.
#[test]
fn exit_tree_releases_bone_and_joint() {
    let mut server = TestServer::new();
    let skeleton = skeleton_at(Isometry3::identity());
    let hips = attach(&mut server, &skeleton, 1, "hips");
    let mut arm = attach(&mut server, &skeleton, 2, "arm");
    arm.set_joint_type(&mut server, JointType::Cone);
    assert_eq!(server.joint(arm.joint()).and_then(|j| j.kind), Some(JointKind::ConeTwist));

    arm.exit_tree(&mut server);
    assert_eq!(arm.bone_id(), None);
    assert!(arm.skeleton().is_none());
    assert_eq!(skeleton.borrow().physical_bone(ARM), None);
    assert_eq!(server.joint(arm.joint()).and_then(|j| j.kind), None);
    assert_eq!(arm.joint_type(), JointType::Cone);

    let (bodies, joints) = (server.body_count(), server.joint_count());
    arm.free(&mut server);
    hips.free(&mut server);
    assert_eq!(server.body_count(), bodies - 2);
    assert_eq!(server.joint_count(), joints - 2);
}
