//! Rigid bodies stepped with contact monitoring.

use body_contact::ContactEvent;
use std::sync::{Arc, Mutex};

use body_core::{Notification, RigidBody, RigidBodyEvent};
use body_server::ContactReport;
use body_server::testing::{TestSceneTree, TestServer};
use body_types::{BodyError, BodyHandle, InstanceId, Vector3};

const DT: f64 = 1.0 / 60.0;

struct Scene {
    server: TestServer,
    tree: TestSceneTree,
    ball: RigidBody,
}

impl Scene {
    fn new() -> Self {
        let mut server = TestServer::new().with_gravity(Vector3::new(0.0, -9.8, 0.0));
        let mut tree = TestSceneTree::new();
        let id = tree.spawn();
        let mut ball = RigidBody::new(&mut server, id);
        ball.notification(Notification::EnterTree);
        ball.set_contact_monitor(&mut tree, true);
        Self { server, tree, ball }
    }

    fn touch(&mut self, contacts: Vec<ContactReport>) {
        let rid = self.ball.body().rid();
        self.server.set_contacts(rid, contacts);
    }

    fn step(&mut self) -> Vec<RigidBodyEvent> {
        for mut state in self.server.step(DT) {
            if state.body == self.ball.body().rid() {
                self.ball.direct_state_changed(&mut self.tree, &mut state);
            }
            self.server.commit_direct_state(&state);
        }
        self.ball.drain_events()
    }
}

fn contact(collider: u64, id: InstanceId, collider_shape: usize, local_shape: usize) -> ContactReport {
    ContactReport {
        collider: BodyHandle(collider),
        collider_id: id,
        collider_shape,
        local_shape,
    }
}

fn contact_events(events: &[RigidBodyEvent]) -> Vec<ContactEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            RigidBodyEvent::Contact(c) => Some(*c),
            RigidBodyEvent::SleepingStateChanged { .. } => None,
        })
        .collect()
}

/// Test: a stable contact set fires its events once and then nothing.
#[test]
fn identical_contacts_converge() {
    let mut scene = Scene::new();
    let crate_id = scene.tree.spawn();
    scene.touch(vec![contact(40, crate_id, 0, 0), contact(40, crate_id, 1, 0)]);

    let first = contact_events(&scene.step());
    assert_eq!(
        first,
        vec![
            ContactEvent::BodyEntered { id: crate_id },
            ContactEvent::BodyShapeEntered {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 0,
                local_shape: 0,
            },
            ContactEvent::BodyShapeEntered {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 1,
                local_shape: 0,
            },
        ]
    );

    for step in 0..20 {
        let events = contact_events(&scene.step());
        assert!(events.is_empty(), "step {step} fired {events:?}");
        let monitor = scene.ball.contact_monitor().expect("monitor");
        assert_eq!(monitor.len(), 1);
        assert_eq!(monitor.tracked(crate_id).map(|t| t.shape_count()), Some(2));
    }
}

/// Test: shapes leave one by one; the body exits together with its last
/// shape.
#[test]
fn shapes_leave_before_body_exits() {
    let mut scene = Scene::new();
    let crate_id = scene.tree.spawn();
    scene.touch(vec![contact(40, crate_id, 0, 0), contact(40, crate_id, 1, 0)]);
    scene.step();

    scene.touch(vec![contact(40, crate_id, 1, 0)]);
    let events = contact_events(&scene.step());
    assert_eq!(
        events,
        vec![ContactEvent::BodyShapeExited {
            collider: BodyHandle(40),
            id: crate_id,
            body_shape: 0,
            local_shape: 0,
        }]
    );
    assert_eq!(scene.ball.colliding_bodies(&scene.tree), vec![crate_id]);

    scene.touch(Vec::new());
    let events = contact_events(&scene.step());
    assert_eq!(
        events,
        vec![
            ContactEvent::BodyExited { id: crate_id },
            ContactEvent::BodyShapeExited {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 1,
                local_shape: 0,
            },
        ]
    );
    assert!(scene.ball.colliding_bodies(&scene.tree).is_empty());
    assert!(!scene.tree.is_subscribed(scene.ball.body().instance(), crate_id));
}

/// Test: a shape pair swapped for another in the same step reports the
/// removal before the addition and ends with the body tracked.
#[test]
fn removals_dispatch_before_additions() {
    let mut scene = Scene::new();
    let crate_id = scene.tree.spawn();
    scene.touch(vec![contact(40, crate_id, 0, 0)]);
    scene.step();

    scene.touch(vec![contact(40, crate_id, 2, 0)]);
    let events = contact_events(&scene.step());
    assert_eq!(
        events,
        vec![
            ContactEvent::BodyExited { id: crate_id },
            ContactEvent::BodyShapeExited {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 0,
                local_shape: 0,
            },
            ContactEvent::BodyEntered { id: crate_id },
            ContactEvent::BodyShapeEntered {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 2,
                local_shape: 0,
            },
        ]
    );
    assert_eq!(scene.ball.contact_monitor().map(|m| m.len()), Some(1));
}

/// Test: a destroyed collider is dropped silently.
#[test]
fn destroyed_collider_is_forgotten() {
    let mut scene = Scene::new();
    let crate_id = scene.tree.spawn();
    scene.touch(vec![contact(40, crate_id, 0, 0)]);
    scene.step();

    scene.tree.destroy(crate_id);
    assert!(scene.ball.colliding_bodies(&scene.tree).is_empty());

    scene.touch(Vec::new());
    assert!(contact_events(&scene.step()).is_empty());
    assert_eq!(scene.ball.contact_monitor().map(|m| m.len()), Some(0));
}

/// Test: a tracked body leaving and re-entering the tree replays its
/// enter/exit events without touching the contact set.
#[test]
fn tracked_body_tree_round_trip() {
    let mut scene = Scene::new();
    let crate_id = scene.tree.spawn();
    scene.touch(vec![contact(40, crate_id, 0, 1)]);
    scene.step();

    let watchers = scene.tree.set_inside_tree(crate_id, false);
    assert_eq!(watchers, vec![scene.ball.body().instance()]);
    scene.ball.body_exit_tree(&mut scene.tree, crate_id);
    assert_eq!(
        contact_events(&scene.ball.drain_events()),
        vec![
            ContactEvent::BodyExited { id: crate_id },
            ContactEvent::BodyShapeExited {
                collider: BodyHandle(40),
                id: crate_id,
                body_shape: 0,
                local_shape: 1,
            },
        ]
    );

    scene.tree.set_inside_tree(crate_id, true);
    scene.ball.body_enter_tree(&mut scene.tree, crate_id);
    assert_eq!(contact_events(&scene.ball.drain_events()).len(), 2);

    // Still touching: nothing new on the next step.
    assert!(contact_events(&scene.step()).is_empty());
}

/// Test: turning the monitor off unsubscribes every tracked body.
#[test]
fn disabling_monitor_unsubscribes() {
    let mut scene = Scene::new();
    let a = scene.tree.spawn();
    let b = scene.tree.spawn();
    scene.touch(vec![contact(40, a, 0, 0), contact(41, b, 0, 0)]);
    scene.step();
    assert_eq!(scene.tree.subscription_count(), 2);

    scene.ball.set_contact_monitor(&mut scene.tree, false);
    assert_eq!(scene.tree.subscription_count(), 0);
    assert!(scene.ball.contact_monitor().is_none());

    // Contacts keep arriving; nothing is tracked or reported.
    assert!(contact_events(&scene.step()).is_empty());
}

/// Test: a handler that wants the monitor off mid-dispatch is refused,
/// queues the change instead, and still sees the rest of the batch.
#[test]
fn handler_defers_disable_until_batch_ends() {
    let mut scene = Scene::new();
    let a = scene.tree.spawn();
    let b = scene.tree.spawn();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    scene.ball.set_contact_handler(move |event, dispatch| {
        log.lock().unwrap().push(*event);
        if *event == (ContactEvent::BodyEntered { id: a }) {
            assert!(matches!(
                dispatch.set_contact_monitor(false),
                Err(BodyError::ContactMonitorLocked)
            ));
            assert!(dispatch.contact_monitor().tracked(a).is_some());
            dispatch.request_contact_monitor(false);
        }
    });

    scene.touch(vec![contact(40, a, 0, 0), contact(41, b, 0, 0)]);
    let events = contact_events(&scene.step());

    assert_eq!(events.len(), 4);
    assert_eq!(*seen.lock().unwrap(), events);
    assert!(events.contains(&ContactEvent::BodyEntered { id: b }));
    assert!(scene.ball.contact_monitor().is_none());
    assert_eq!(scene.tree.subscription_count(), 0);

    // Nothing reaches the handler once the monitor is off.
    assert!(contact_events(&scene.step()).is_empty());
    assert_eq!(seen.lock().unwrap().len(), 4);
}

/// Test: the ball falls under gravity while being monitored.
#[test]
fn monitored_ball_still_falls() {
    let mut scene = Scene::new();
    for _ in 0..60 {
        scene.step();
    }
    assert!(scene.ball.linear_velocity().y < -9.0);
    assert!(scene.ball.global_transform().translation.y < -4.0);
}
