//! Scene notifications delivered to bodies by their host.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle and per-frame notifications a body reacts to.
///
/// The host scene delivers these; bodies never poll for them. Programmatic
/// transform writes made by a body itself never produce
/// [`Notification::LocalTransformChanged`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Notification {
    /// The node entered the scene tree.
    EnterTree,
    /// The node is about to leave the scene tree.
    ExitTree,
    /// The node's transform was changed from outside the body.
    LocalTransformChanged,
    /// Internal fixed-step tick.
    InternalPhysicsProcess {
        /// Step length in seconds.
        delta: f64,
    },
}

impl Notification {
    /// Whether this notification concerns tree membership.
    #[must_use]
    pub fn is_lifecycle(self) -> bool {
        matches!(self, Self::EnterTree | Self::ExitTree)
    }
}
