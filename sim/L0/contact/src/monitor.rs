//! The contact monitor and its diffing protocol.

use std::collections::BTreeMap;

use body_server::{ContactReport, SceneTree};
use body_types::{BodyHandle, InstanceId};
use tracing::{trace, warn};

use crate::event::ContactEvent;
use crate::pair::{ShapePair, TrackedBody};

/// A queued in/out transition for one shape pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InOut {
    collider: BodyHandle,
    id: InstanceId,
    pair: ShapePair,
}

/// Tracks the bodies touching a monitoring body.
///
/// Invariant: a body has an entry if and only if at least one of its shape
/// pairs is touching. An entry is dropped the moment its last pair goes.
#[derive(Debug, Clone)]
pub struct ContactMonitor {
    watcher: InstanceId,
    bodies: BTreeMap<InstanceId, TrackedBody>,
}

impl ContactMonitor {
    /// Create an empty monitor owned by the node `watcher`.
    #[must_use]
    pub fn new(watcher: InstanceId) -> Self {
        Self {
            watcher,
            bodies: BTreeMap::new(),
        }
    }

    /// The monitoring node.
    #[must_use]
    pub fn watcher(&self) -> InstanceId {
        self.watcher
    }

    /// Number of tracked bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no body is touching.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Tracked state of one body.
    #[must_use]
    pub fn tracked(&self, id: InstanceId) -> Option<&TrackedBody> {
        self.bodies.get(&id)
    }

    /// Every tracked body in id order.
    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &TrackedBody)> + '_ {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    /// Touching bodies whose nodes still exist, in id order.
    #[must_use]
    pub fn colliding_bodies(&self, tree: &dyn SceneTree) -> Vec<InstanceId> {
        self.bodies
            .keys()
            .copied()
            .filter(|id| tree.instance_exists(*id))
            .collect()
    }

    // ========================================================================
    // Per-step diff
    // ========================================================================

    /// Diff this step's contacts against the tracked set and emit events.
    pub fn process_contacts(
        &mut self,
        contacts: &[ContactReport],
        tree: &mut dyn SceneTree,
        events: &mut Vec<ContactEvent>,
    ) {
        for body in self.bodies.values_mut() {
            for shape in &mut body.shapes {
                shape.tagged = false;
            }
        }

        let mut toadd: Vec<InOut> = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let entry = InOut {
                collider: contact.collider,
                id: contact.collider_id,
                pair: ShapePair::new(contact.collider_shape, contact.local_shape),
            };
            let known = self
                .bodies
                .get_mut(&entry.id)
                .and_then(|body| body.find(entry.pair).ok().map(|at| (body, at)));
            match known {
                Some((body, at)) => body.shapes[at].tagged = true,
                None if !toadd.contains(&entry) => toadd.push(entry),
                None => {}
            }
        }

        let mut toremove: Vec<InOut> = Vec::new();
        for (id, body) in &self.bodies {
            for shape in body.shapes.iter().filter(|s| !s.tagged) {
                toremove.push(InOut {
                    collider: body.collider,
                    id: *id,
                    pair: shape.pair,
                });
            }
        }

        trace!(
            watcher = %self.watcher,
            contacts = contacts.len(),
            added = toadd.len(),
            removed = toremove.len(),
            "contact diff"
        );

        for out in toremove {
            self.body_inout(false, out.collider, out.id, out.pair, tree, events);
        }
        for add in toadd {
            self.body_inout(true, add.collider, add.id, add.pair, tree, events);
        }
    }

    fn body_inout(
        &mut self,
        entering: bool,
        collider: BodyHandle,
        id: InstanceId,
        pair: ShapePair,
        tree: &mut dyn SceneTree,
        events: &mut Vec<ContactEvent>,
    ) {
        let exists = tree.instance_exists(id);
        let watcher = self.watcher;

        if entering {
            let body = self.bodies.entry(id).or_insert_with(|| {
                let in_tree = exists && tree.is_inside_tree(id);
                if exists {
                    tree.connect_tree_signals(watcher, id);
                    if in_tree {
                        events.push(ContactEvent::BodyEntered { id });
                    }
                }
                TrackedBody::new(collider, in_tree)
            });
            body.insert(pair);
            if body.in_tree {
                events.push(ContactEvent::BodyShapeEntered {
                    collider,
                    id,
                    body_shape: pair.body_shape,
                    local_shape: pair.local_shape,
                });
            }
        } else {
            let Some(body) = self.bodies.get_mut(&id) else {
                warn!(%watcher, %id, "removing contact with an untracked body");
                return;
            };
            body.remove(pair);
            let in_tree = body.in_tree;
            if body.shapes.is_empty() {
                if exists {
                    tree.disconnect_tree_signals(watcher, id);
                    if in_tree {
                        events.push(ContactEvent::BodyExited { id });
                    }
                }
                self.bodies.remove(&id);
            }
            if exists && in_tree {
                events.push(ContactEvent::BodyShapeExited {
                    collider,
                    id,
                    body_shape: pair.body_shape,
                    local_shape: pair.local_shape,
                });
            }
        }
    }

    // ========================================================================
    // Tree notifications for tracked bodies
    // ========================================================================

    /// A tracked node entered the scene tree.
    pub fn body_enter_tree(&mut self, id: InstanceId, events: &mut Vec<ContactEvent>) {
        self.set_in_tree(id, true, events);
    }

    /// A tracked node is leaving the scene tree.
    pub fn body_exit_tree(&mut self, id: InstanceId, events: &mut Vec<ContactEvent>) {
        self.set_in_tree(id, false, events);
    }

    fn set_in_tree(&mut self, id: InstanceId, inside: bool, events: &mut Vec<ContactEvent>) {
        let Some(body) = self.bodies.get_mut(&id) else {
            warn!(watcher = %self.watcher, %id, "tree notification for an untracked body");
            return;
        };
        body.in_tree = inside;
        events.push(if inside {
            ContactEvent::BodyEntered { id }
        } else {
            ContactEvent::BodyExited { id }
        });
        for shape in &body.shapes {
            let (collider, body_shape, local_shape) =
                (body.collider, shape.pair.body_shape, shape.pair.local_shape);
            events.push(if inside {
                ContactEvent::BodyShapeEntered {
                    collider,
                    id,
                    body_shape,
                    local_shape,
                }
            } else {
                ContactEvent::BodyShapeExited {
                    collider,
                    id,
                    body_shape,
                    local_shape,
                }
            });
        }
    }

    /// Drop every tracked body and its tree subscription.
    ///
    /// Called when contact monitoring is switched off. No events fire.
    pub fn disconnect_all(self, tree: &mut dyn SceneTree) {
        for id in self.bodies.keys() {
            if tree.instance_exists(*id) {
                tree.disconnect_tree_signals(self.watcher, *id);
            }
        }
    }
}
