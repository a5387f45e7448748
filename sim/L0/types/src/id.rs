//! Opaque identities handed out by the physics server and the scene tree.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

opaque_id!(
    /// Handle of a body owned by the physics server.
    ///
    /// A body node holds exactly one of these for its whole lifetime.
    BodyHandle,
    "Body"
);

opaque_id!(
    /// Handle of a joint owned by the physics server.
    JointHandle,
    "Joint"
);

opaque_id!(
    /// Identity of a scene object (node).
    ///
    /// Ids are never reused, so a lookup of a destroyed object reports
    /// "not found" instead of aliasing a newer object.
    InstanceId,
    "Instance"
);
