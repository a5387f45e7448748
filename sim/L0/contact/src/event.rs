//! Events produced by the contact monitor.

use body_types::{BodyHandle, InstanceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Enter/exit notification for a body or one of its shapes.
///
/// Body-level events fire only while the other node is inside the scene tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactEvent {
    /// First shape of another body started touching.
    BodyEntered {
        /// The other node.
        id: InstanceId,
    },
    /// Last shape of another body stopped touching.
    BodyExited {
        /// The other node.
        id: InstanceId,
    },
    /// A shape pair started touching.
    BodyShapeEntered {
        /// Server handle of the other body.
        collider: BodyHandle,
        /// The other node.
        id: InstanceId,
        /// Shape index on the other body.
        body_shape: usize,
        /// Shape index on the monitoring body.
        local_shape: usize,
    },
    /// A shape pair stopped touching.
    BodyShapeExited {
        /// Server handle of the other body.
        collider: BodyHandle,
        /// The other node.
        id: InstanceId,
        /// Shape index on the other body.
        body_shape: usize,
        /// Shape index on the monitoring body.
        local_shape: usize,
    },
}

impl ContactEvent {
    /// The other node the event is about.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        match *self {
            Self::BodyEntered { id }
            | Self::BodyExited { id }
            | Self::BodyShapeEntered { id, .. }
            | Self::BodyShapeExited { id, .. } => id,
        }
    }

    /// Whether this is an "entered" event.
    #[must_use]
    pub fn is_enter(&self) -> bool {
        matches!(self, Self::BodyEntered { .. } | Self::BodyShapeEntered { .. })
    }
}
