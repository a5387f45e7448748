//! The joint tagged union.

use body_server::{Axis, PhysicsServer};
use body_types::{BodyHandle, JointHandle};
use nalgebra::{Isometry3, Point3};
use tracing::debug;

use crate::cone::{ConeField, ConeJointData};
use crate::hinge::{HingeField, HingeJointData};
use crate::pin::{PinField, PinJointData};
use crate::property::{JointParams, PROPERTY_PREFIX, PropertyValue};
use crate::six_dof::{SIX_DOF_AXIS_PROPERTIES, SixDofField, SixDofJointData};
use crate::slider::{SliderField, SliderJointData};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of joint connecting a bone to its parent bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointType {
    /// Not connected.
    #[default]
    None,
    /// Ball-and-socket.
    Pin,
    /// Cone with twist.
    Cone,
    /// Single rotation axis.
    Hinge,
    /// Translation and rotation along one axis.
    Slider,
    /// Six degrees of freedom.
    SixDof,
}

impl JointType {
    /// All joint types in declaration order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Pin,
        Self::Cone,
        Self::Hinge,
        Self::Slider,
        Self::SixDof,
    ];

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Pin => "PinJoint",
            Self::Cone => "ConeJoint",
            Self::Hinge => "HingeJoint",
            Self::Slider => "SliderJoint",
            Self::SixDof => "6DOFJoint",
        }
    }

    /// Parse a display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for JointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed reference to one field of a [`JointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointField {
    /// Pin field.
    Pin(PinField),
    /// Cone-twist field.
    Cone(ConeField),
    /// Hinge field.
    Hinge(HingeField),
    /// Slider field.
    Slider(SliderField),
    /// Six-degree-of-freedom field of one axis.
    SixDof(Axis, SixDofField),
}

/// Parameters of the joint connecting a bone to its parent bone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointData {
    /// Not connected.
    #[default]
    None,
    /// Ball-and-socket.
    Pin(PinJointData),
    /// Cone with twist.
    Cone(ConeJointData),
    /// Single rotation axis.
    Hinge(HingeJointData),
    /// Translation and rotation along one axis.
    Slider(SliderJointData),
    /// Six degrees of freedom.
    SixDof(SixDofJointData),
}

fn names_of<P: JointParams>(out: &mut Vec<String>) {
    out.extend(
        P::PROPERTIES
            .iter()
            .map(|p| format!("{PROPERTY_PREFIX}{}", p.name)),
    );
}

impl JointData {
    /// Fresh parameters with defaults for the given type.
    #[must_use]
    pub fn new(kind: JointType) -> Self {
        match kind {
            JointType::None => Self::None,
            JointType::Pin => Self::Pin(PinJointData::default()),
            JointType::Cone => Self::Cone(ConeJointData::default()),
            JointType::Hinge => Self::Hinge(HingeJointData::default()),
            JointType::Slider => Self::Slider(SliderJointData::default()),
            JointType::SixDof => Self::SixDof(SixDofJointData::default()),
        }
    }

    /// The joint type.
    #[must_use]
    pub fn joint_type(&self) -> JointType {
        match self {
            Self::None => JointType::None,
            Self::Pin(_) => JointType::Pin,
            Self::Cone(_) => JointType::Cone,
            Self::Hinge(_) => JointType::Hinge,
            Self::Slider(_) => JointType::Slider,
            Self::SixDof(_) => JointType::SixDof,
        }
    }

    // ========================================================================
    // Named properties
    // ========================================================================

    /// Full property paths exposed by this joint type.
    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        match self {
            Self::None => {}
            Self::Pin(_) => names_of::<PinJointData>(&mut out),
            Self::Cone(_) => names_of::<ConeJointData>(&mut out),
            Self::Hinge(_) => names_of::<HingeJointData>(&mut out),
            Self::Slider(_) => names_of::<SliderJointData>(&mut out),
            Self::SixDof(_) => {
                for axis in Axis::ALL {
                    out.extend(SIX_DOF_AXIS_PROPERTIES.iter().map(|p| {
                        format!("{PROPERTY_PREFIX}{}/{}", axis.name(), p.name)
                    }));
                }
            }
        }
        out
    }

    /// Read a property by path, in display units.
    ///
    /// Returns `None` for names this joint type does not have.
    #[must_use]
    pub fn get_property(&self, path: &str) -> Option<PropertyValue> {
        let name = path.strip_prefix(PROPERTY_PREFIX)?;
        match self {
            Self::None => None,
            Self::Pin(d) => d.get_named(name),
            Self::Cone(d) => d.get_named(name),
            Self::Hinge(d) => d.get_named(name),
            Self::Slider(d) => d.get_named(name),
            Self::SixDof(d) => {
                let (axis, name) = split_axis(name)?;
                d.get_named(axis, name)
            }
        }
    }

    /// Write a property by path, from display units.
    ///
    /// Returns the field written, or `None` ("not handled") for names this
    /// joint type does not have.
    pub fn set_property(&mut self, path: &str, value: PropertyValue) -> Option<JointField> {
        let name = path.strip_prefix(PROPERTY_PREFIX)?;
        match self {
            Self::None => None,
            Self::Pin(d) => d.set_named(name, value).map(JointField::Pin),
            Self::Cone(d) => d.set_named(name, value).map(JointField::Cone),
            Self::Hinge(d) => d.set_named(name, value).map(JointField::Hinge),
            Self::Slider(d) => d.set_named(name, value).map(JointField::Slider),
            Self::SixDof(d) => {
                let (axis, name) = split_axis(name)?;
                d.set_named(axis, name, value)
                    .map(|field| JointField::SixDof(axis, field))
            }
        }
    }

    // ========================================================================
    // Server sync
    // ========================================================================

    /// Send one field to the server joint. Mismatched fields are ignored.
    pub fn push(&self, field: JointField, joint: JointHandle, server: &mut dyn PhysicsServer) {
        match (self, field) {
            (Self::Pin(d), JointField::Pin(f)) => d.push(f, joint, server),
            (Self::Cone(d), JointField::Cone(f)) => d.push(f, joint, server),
            (Self::Hinge(d), JointField::Hinge(f)) => d.push(f, joint, server),
            (Self::Slider(d), JointField::Slider(f)) => d.push(f, joint, server),
            (Self::SixDof(d), JointField::SixDof(axis, f)) => d.push(axis, f, joint, server),
            _ => debug!(?field, kind = %self.joint_type(), "field does not belong to joint"),
        }
    }

    /// Make the server joint this type between two bodies and send every
    /// parameter. [`JointData::None`] clears the joint.
    ///
    /// `local_a` is the joint frame relative to `parent`, `local_b` relative
    /// to `child`.
    pub fn make_joint(
        &self,
        joint: JointHandle,
        server: &mut dyn PhysicsServer,
        parent: BodyHandle,
        local_a: Isometry3<f64>,
        child: BodyHandle,
        local_b: Isometry3<f64>,
    ) {
        match self {
            Self::None => server.joint_clear(joint),
            Self::Pin(d) => {
                server.joint_make_pin(
                    joint,
                    parent,
                    Point3::from(local_a.translation.vector),
                    child,
                    Point3::from(local_b.translation.vector),
                );
                d.push_all(joint, server);
            }
            Self::Cone(d) => {
                server.joint_make_cone_twist(joint, parent, local_a, child, local_b);
                d.push_all(joint, server);
            }
            Self::Hinge(d) => {
                server.joint_make_hinge(joint, parent, local_a, child, local_b);
                d.push_all(joint, server);
            }
            Self::Slider(d) => {
                server.joint_make_slider(joint, parent, local_a, child, local_b);
                d.push_all(joint, server);
            }
            Self::SixDof(d) => {
                server.joint_make_generic_6dof(joint, parent, local_a, child, local_b);
                d.push_all(joint, server);
            }
        }
    }
}

fn split_axis(name: &str) -> Option<(Axis, &str)> {
    let (axis, rest) = name.split_once('/')?;
    Some((Axis::from_name(axis)?, rest))
}
