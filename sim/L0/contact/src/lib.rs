//! Contact monitoring for dynamic bodies.
//!
//! A [`ContactMonitor`] remembers which other bodies (and which of their
//! shapes) touch its owner, and turns the physics server's per-step contact
//! list into enter/exit [`ContactEvent`]s:
//!
//! ```text
//!  contacts this step ──► untag all ──► tag / queue add ──► queue untagged
//!                                                               │
//!        events ◄── additions ◄── removals ◄────────────────────┘
//! ```
//!
//! Removals are always processed before additions, so a shape pair that is
//! lost and regained within one diff never produces a transient duplicate.
//!
//! # Example
//!
//! ```
//! use body_contact::{ContactEvent, ContactMonitor};
//! use body_server::ContactReport;
//! use body_server::testing::TestSceneTree;
//! use body_types::BodyHandle;
//!
//! let mut tree = TestSceneTree::new();
//! let me = tree.spawn();
//! let other = tree.spawn();
//! let mut monitor = ContactMonitor::new(me);
//!
//! let contacts = [ContactReport {
//!     collider: BodyHandle(7),
//!     collider_id: other,
//!     collider_shape: 0,
//!     local_shape: 0,
//! }];
//! let mut events = Vec::new();
//! monitor.process_contacts(&contacts, &mut tree, &mut events);
//! assert_eq!(events[0], ContactEvent::BodyEntered { id: other });
//!
//! // Same contacts again: nothing changes.
//! events.clear();
//! monitor.process_contacts(&contacts, &mut tree, &mut events);
//! assert!(events.is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/body-contact/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod event;
mod monitor;
mod pair;

pub use event::ContactEvent;
pub use monitor::ContactMonitor;
pub use pair::{ShapePair, TrackedBody};
