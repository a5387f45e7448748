//! Named-property tables.
//!
//! Core code addresses joint parameters through typed field enums. Names
//! only appear here, at the boundary where parameters are read or written by
//! path (`joint_constraints/bias`, `joint_constraints/x/erp`, ...).

use body_server::PhysicsServer;
use body_types::JointHandle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Path prefix shared by every joint property.
pub const PROPERTY_PREFIX: &str = "joint_constraints/";

/// A property value at the naming boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Scalar.
    Float(f64),
}

impl PropertyValue {
    /// Read as a scalar; `true` is 1.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Float(v) => v,
        }
    }

    /// Read as a flag; any non-zero scalar is `true`.
    #[must_use]
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Float(v) => v != 0.0,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// How a scalar is shown at the naming boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Stored and shown as-is.
    Raw,
    /// Stored in radians, shown in degrees.
    Degrees,
    /// Boolean flag.
    Flag,
}

/// One row of a property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<F> {
    /// Name below the prefix (and axis, for six-degree-of-freedom joints).
    pub name: &'static str,
    /// Display unit.
    pub unit: Unit,
    /// Typed field the name maps to.
    pub field: F,
}

impl Unit {
    /// Convert a stored value to display units.
    #[must_use]
    pub fn to_display(self, value: PropertyValue) -> PropertyValue {
        match self {
            Self::Degrees => PropertyValue::Float(value.as_f64().to_degrees()),
            Self::Raw => PropertyValue::Float(value.as_f64()),
            Self::Flag => PropertyValue::Bool(value.as_bool()),
        }
    }

    /// Convert a display value to storage units.
    #[must_use]
    pub fn to_stored(self, value: PropertyValue) -> PropertyValue {
        match self {
            Self::Degrees => PropertyValue::Float(value.as_f64().to_radians()),
            Self::Raw => PropertyValue::Float(value.as_f64()),
            Self::Flag => PropertyValue::Bool(value.as_bool()),
        }
    }
}

impl<F> Property<F> {
    pub(crate) const fn raw(name: &'static str, field: F) -> Self {
        Self {
            name,
            unit: Unit::Raw,
            field,
        }
    }

    pub(crate) const fn degrees(name: &'static str, field: F) -> Self {
        Self {
            name,
            unit: Unit::Degrees,
            field,
        }
    }

    pub(crate) const fn flag(name: &'static str, field: F) -> Self {
        Self {
            name,
            unit: Unit::Flag,
            field,
        }
    }
}

/// A parameter block addressed through typed fields.
pub trait JointParams {
    /// Field selector.
    type Field: Copy + PartialEq + 'static;

    /// Name table, in display order.
    const PROPERTIES: &'static [Property<Self::Field>];

    /// Read a field in storage units (radians for angles).
    fn get(&self, field: Self::Field) -> PropertyValue;

    /// Write a field in storage units.
    fn set(&mut self, field: Self::Field, value: PropertyValue);

    /// Send one field to the server joint.
    fn push(&self, field: Self::Field, joint: JointHandle, server: &mut dyn PhysicsServer);

    /// Send every field to the server joint.
    fn push_all(&self, joint: JointHandle, server: &mut dyn PhysicsServer) {
        for property in Self::PROPERTIES {
            self.push(property.field, joint, server);
        }
    }

    /// Look a name up in [`JointParams::PROPERTIES`].
    fn lookup(name: &str) -> Option<&'static Property<Self::Field>> {
        Self::PROPERTIES.iter().find(|p| p.name == name)
    }

    /// Read a property by name, converting to display units.
    fn get_named(&self, name: &str) -> Option<PropertyValue> {
        let property = Self::lookup(name)?;
        Some(property.unit.to_display(self.get(property.field)))
    }

    /// Write a property by name from display units.
    ///
    /// Returns the field written, or `None` if the name is unknown.
    fn set_named(&mut self, name: &str, value: PropertyValue) -> Option<Self::Field> {
        let property = Self::lookup(name)?;
        self.set(property.field, property.unit.to_stored(value));
        Some(property.field)
    }
}
