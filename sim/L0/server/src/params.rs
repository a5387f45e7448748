//! Parameter, state and flag selectors understood by the physics server.

use nalgebra::{Isometry3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar body parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyParam {
    /// Restitution.
    Bounce,
    /// Friction coefficient.
    Friction,
    /// Mass in kilograms.
    Mass,
    /// Multiplier on the world gravity.
    GravityScale,
    /// Linear damping (-1 uses the world default).
    LinearDamp,
    /// Angular damping (-1 uses the world default).
    AngularDamp,
}

/// Selector for [`BodyState`] queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyStateKind {
    /// World transform.
    Transform,
    /// Linear velocity.
    LinearVelocity,
    /// Angular velocity.
    AngularVelocity,
    /// Whether the body is asleep.
    Sleeping,
    /// Whether the body may fall asleep.
    CanSleep,
}

/// A body state value, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyState {
    /// World transform.
    Transform(Isometry3<f64>),
    /// Linear velocity.
    LinearVelocity(Vector3<f64>),
    /// Angular velocity.
    AngularVelocity(Vector3<f64>),
    /// Whether the body is asleep.
    Sleeping(bool),
    /// Whether the body may fall asleep.
    CanSleep(bool),
}

impl BodyState {
    /// The selector matching this value.
    #[must_use]
    pub fn kind(&self) -> BodyStateKind {
        match self {
            Self::Transform(_) => BodyStateKind::Transform,
            Self::LinearVelocity(_) => BodyStateKind::LinearVelocity,
            Self::AngularVelocity(_) => BodyStateKind::AngularVelocity,
            Self::Sleeping(_) => BodyStateKind::Sleeping,
            Self::CanSleep(_) => BodyStateKind::CanSleep,
        }
    }
}

/// Kind of joint a server joint handle was last made into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointKind {
    /// Ball-and-socket pin.
    Pin,
    /// Cone with twist.
    ConeTwist,
    /// Single rotation axis.
    Hinge,
    /// Translation and rotation along one axis.
    Slider,
    /// Six degrees of freedom, configured per axis.
    Generic6Dof,
}

/// Axis selector for six-degree-of-freedom joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Lower-case name used in property paths.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Parse a lower-case axis name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }

    /// Index into a three-element array.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Pin joint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinJointParam {
    /// Speed at which the pinned bodies are pulled together.
    Bias,
    /// Resistance to relative velocity.
    Damping,
    /// Largest impulse the joint may apply (0 for unlimited).
    ImpulseClamp,
}

/// Cone-twist joint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConeTwistJointParam {
    /// Swing cone half-angle (radians).
    SwingSpan,
    /// Twist limit (radians).
    TwistSpan,
    /// Correction speed.
    Bias,
    /// Limit softness.
    Softness,
    /// Limit relaxation.
    Relaxation,
}

/// Hinge joint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HingeJointParam {
    /// Upper rotation limit (radians).
    LimitUpper,
    /// Lower rotation limit (radians).
    LimitLower,
    /// Limit correction speed.
    LimitBias,
    /// Limit softness.
    LimitSoftness,
    /// Limit relaxation.
    LimitRelaxation,
}

/// Hinge joint flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HingeJointFlag {
    /// Enforce the rotation limits.
    UseLimit,
}

/// Slider joint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SliderJointParam {
    /// Upper translation limit.
    LinearLimitUpper,
    /// Lower translation limit.
    LinearLimitLower,
    /// Translation limit softness.
    LinearLimitSoftness,
    /// Translation limit restitution.
    LinearLimitRestitution,
    /// Translation limit damping.
    LinearLimitDamping,
    /// Upper rotation limit (radians).
    AngularLimitUpper,
    /// Lower rotation limit (radians).
    AngularLimitLower,
    /// Rotation limit softness.
    AngularLimitSoftness,
    /// Rotation limit restitution.
    AngularLimitRestitution,
    /// Rotation limit damping.
    AngularLimitDamping,
}

/// Per-axis parameters of a six-degree-of-freedom joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Generic6DofParam {
    /// Lower translation limit.
    LinearLowerLimit,
    /// Upper translation limit.
    LinearUpperLimit,
    /// Translation limit softness.
    LinearLimitSoftness,
    /// Translation restitution.
    LinearRestitution,
    /// Translation damping.
    LinearDamping,
    /// Translation spring stiffness.
    LinearSpringStiffness,
    /// Translation spring damping.
    LinearSpringDamping,
    /// Translation spring rest point.
    LinearSpringEquilibriumPoint,
    /// Lower rotation limit (radians).
    AngularLowerLimit,
    /// Upper rotation limit (radians).
    AngularUpperLimit,
    /// Rotation limit softness.
    AngularLimitSoftness,
    /// Rotation damping.
    AngularDamping,
    /// Rotation restitution.
    AngularRestitution,
    /// Rotation error reduction.
    AngularErp,
    /// Rotation spring stiffness.
    AngularSpringStiffness,
    /// Rotation spring damping.
    AngularSpringDamping,
    /// Rotation spring rest point.
    AngularSpringEquilibriumPoint,
}

/// Per-axis flags of a six-degree-of-freedom joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Generic6DofFlag {
    /// Enforce the translation limits.
    EnableLinearLimit,
    /// Enforce the rotation limits.
    EnableAngularLimit,
    /// Enable the translation spring.
    EnableLinearSpring,
    /// Enable the rotation spring.
    EnableAngularSpring,
}
