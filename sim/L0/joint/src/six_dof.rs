//! Six-degree-of-freedom joint parameters, configured per axis.

use body_server::{Axis, Generic6DofFlag, Generic6DofParam, PhysicsServer};
use body_types::JointHandle;

use crate::property::{Property, PropertyValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of one axis. Angular limits are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub struct SixDofAxisData {
    pub linear_limit_enabled: bool,
    pub linear_limit_upper: f64,
    pub linear_limit_lower: f64,
    pub linear_limit_softness: f64,
    pub linear_spring_enabled: bool,
    pub linear_spring_stiffness: f64,
    pub linear_spring_damping: f64,
    pub linear_equilibrium_point: f64,
    pub linear_restitution: f64,
    pub linear_damping: f64,
    pub angular_limit_enabled: bool,
    pub angular_limit_upper: f64,
    pub angular_limit_lower: f64,
    pub angular_limit_softness: f64,
    pub angular_restitution: f64,
    pub angular_damping: f64,
    pub erp: f64,
    pub angular_spring_enabled: bool,
    pub angular_spring_stiffness: f64,
    pub angular_spring_damping: f64,
    pub angular_equilibrium_point: f64,
}

impl Default for SixDofAxisData {
    fn default() -> Self {
        Self {
            linear_limit_enabled: true,
            linear_limit_upper: 0.0,
            linear_limit_lower: 0.0,
            linear_limit_softness: 0.7,
            linear_spring_enabled: false,
            linear_spring_stiffness: 0.0,
            linear_spring_damping: 0.0,
            linear_equilibrium_point: 0.0,
            linear_restitution: 0.5,
            linear_damping: 1.0,
            angular_limit_enabled: true,
            angular_limit_upper: 0.0,
            angular_limit_lower: 0.0,
            angular_limit_softness: 0.5,
            angular_restitution: 0.0,
            angular_damping: 1.0,
            erp: 0.5,
            angular_spring_enabled: false,
            angular_spring_stiffness: 0.0,
            angular_spring_damping: 0.0,
            angular_equilibrium_point: 0.0,
        }
    }
}

/// Field selector for [`SixDofAxisData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SixDofField {
    LinearLimitEnabled,
    LinearLimitUpper,
    LinearLimitLower,
    LinearLimitSoftness,
    LinearSpringEnabled,
    LinearSpringStiffness,
    LinearSpringDamping,
    LinearEquilibriumPoint,
    LinearRestitution,
    LinearDamping,
    AngularLimitEnabled,
    AngularLimitUpper,
    AngularLimitLower,
    AngularLimitSoftness,
    AngularRestitution,
    AngularDamping,
    Erp,
    AngularSpringEnabled,
    AngularSpringStiffness,
    AngularSpringDamping,
    AngularEquilibriumPoint,
}

/// Server selector a field is sent through.
enum Target {
    Param(Generic6DofParam),
    Flag(Generic6DofFlag),
}

impl SixDofField {
    fn target(self) -> Target {
        use Generic6DofFlag as F;
        use Generic6DofParam as P;
        match self {
            Self::LinearLimitEnabled => Target::Flag(F::EnableLinearLimit),
            Self::LinearLimitUpper => Target::Param(P::LinearUpperLimit),
            Self::LinearLimitLower => Target::Param(P::LinearLowerLimit),
            Self::LinearLimitSoftness => Target::Param(P::LinearLimitSoftness),
            Self::LinearSpringEnabled => Target::Flag(F::EnableLinearSpring),
            Self::LinearSpringStiffness => Target::Param(P::LinearSpringStiffness),
            Self::LinearSpringDamping => Target::Param(P::LinearSpringDamping),
            Self::LinearEquilibriumPoint => Target::Param(P::LinearSpringEquilibriumPoint),
            Self::LinearRestitution => Target::Param(P::LinearRestitution),
            Self::LinearDamping => Target::Param(P::LinearDamping),
            Self::AngularLimitEnabled => Target::Flag(F::EnableAngularLimit),
            Self::AngularLimitUpper => Target::Param(P::AngularUpperLimit),
            Self::AngularLimitLower => Target::Param(P::AngularLowerLimit),
            Self::AngularLimitSoftness => Target::Param(P::AngularLimitSoftness),
            Self::AngularRestitution => Target::Param(P::AngularRestitution),
            Self::AngularDamping => Target::Param(P::AngularDamping),
            Self::Erp => Target::Param(P::AngularErp),
            Self::AngularSpringEnabled => Target::Flag(F::EnableAngularSpring),
            Self::AngularSpringStiffness => Target::Param(P::AngularSpringStiffness),
            Self::AngularSpringDamping => Target::Param(P::AngularSpringDamping),
            Self::AngularEquilibriumPoint => Target::Param(P::AngularSpringEquilibriumPoint),
        }
    }
}

/// Per-axis name table, below `joint_constraints/<axis>/`.
pub const SIX_DOF_AXIS_PROPERTIES: &[Property<SixDofField>] = &[
    Property::flag("linear_limit_enabled", SixDofField::LinearLimitEnabled),
    Property::raw("linear_limit_upper", SixDofField::LinearLimitUpper),
    Property::raw("linear_limit_lower", SixDofField::LinearLimitLower),
    Property::raw("linear_limit_softness", SixDofField::LinearLimitSoftness),
    Property::flag("linear_spring_enabled", SixDofField::LinearSpringEnabled),
    Property::raw("linear_spring_stiffness", SixDofField::LinearSpringStiffness),
    Property::raw("linear_spring_damping", SixDofField::LinearSpringDamping),
    Property::raw("linear_equilibrium_point", SixDofField::LinearEquilibriumPoint),
    Property::raw("linear_restitution", SixDofField::LinearRestitution),
    Property::raw("linear_damping", SixDofField::LinearDamping),
    Property::flag("angular_limit_enabled", SixDofField::AngularLimitEnabled),
    Property::degrees("angular_limit_upper", SixDofField::AngularLimitUpper),
    Property::degrees("angular_limit_lower", SixDofField::AngularLimitLower),
    Property::raw("angular_limit_softness", SixDofField::AngularLimitSoftness),
    Property::raw("angular_restitution", SixDofField::AngularRestitution),
    Property::raw("angular_damping", SixDofField::AngularDamping),
    Property::raw("erp", SixDofField::Erp),
    Property::flag("angular_spring_enabled", SixDofField::AngularSpringEnabled),
    Property::raw("angular_spring_stiffness", SixDofField::AngularSpringStiffness),
    Property::raw("angular_spring_damping", SixDofField::AngularSpringDamping),
    Property::raw("angular_equilibrium_point", SixDofField::AngularEquilibriumPoint),
];

impl SixDofAxisData {
    fn flag_slot(&mut self, field: SixDofField) -> Option<&mut bool> {
        Some(match field {
            SixDofField::LinearLimitEnabled => &mut self.linear_limit_enabled,
            SixDofField::LinearSpringEnabled => &mut self.linear_spring_enabled,
            SixDofField::AngularLimitEnabled => &mut self.angular_limit_enabled,
            SixDofField::AngularSpringEnabled => &mut self.angular_spring_enabled,
            _ => return None,
        })
    }

    fn scalar_slot(&mut self, field: SixDofField) -> Option<&mut f64> {
        Some(match field {
            SixDofField::LinearLimitUpper => &mut self.linear_limit_upper,
            SixDofField::LinearLimitLower => &mut self.linear_limit_lower,
            SixDofField::LinearLimitSoftness => &mut self.linear_limit_softness,
            SixDofField::LinearSpringStiffness => &mut self.linear_spring_stiffness,
            SixDofField::LinearSpringDamping => &mut self.linear_spring_damping,
            SixDofField::LinearEquilibriumPoint => &mut self.linear_equilibrium_point,
            SixDofField::LinearRestitution => &mut self.linear_restitution,
            SixDofField::LinearDamping => &mut self.linear_damping,
            SixDofField::AngularLimitUpper => &mut self.angular_limit_upper,
            SixDofField::AngularLimitLower => &mut self.angular_limit_lower,
            SixDofField::AngularLimitSoftness => &mut self.angular_limit_softness,
            SixDofField::AngularRestitution => &mut self.angular_restitution,
            SixDofField::AngularDamping => &mut self.angular_damping,
            SixDofField::Erp => &mut self.erp,
            SixDofField::AngularSpringStiffness => &mut self.angular_spring_stiffness,
            SixDofField::AngularSpringDamping => &mut self.angular_spring_damping,
            SixDofField::AngularEquilibriumPoint => &mut self.angular_equilibrium_point,
            _ => return None,
        })
    }

    /// Read a field in storage units.
    #[must_use]
    pub fn get(&self, field: SixDofField) -> PropertyValue {
        use PropertyValue::{Bool, Float};
        match field {
            SixDofField::LinearLimitEnabled => Bool(self.linear_limit_enabled),
            SixDofField::LinearLimitUpper => Float(self.linear_limit_upper),
            SixDofField::LinearLimitLower => Float(self.linear_limit_lower),
            SixDofField::LinearLimitSoftness => Float(self.linear_limit_softness),
            SixDofField::LinearSpringEnabled => Bool(self.linear_spring_enabled),
            SixDofField::LinearSpringStiffness => Float(self.linear_spring_stiffness),
            SixDofField::LinearSpringDamping => Float(self.linear_spring_damping),
            SixDofField::LinearEquilibriumPoint => Float(self.linear_equilibrium_point),
            SixDofField::LinearRestitution => Float(self.linear_restitution),
            SixDofField::LinearDamping => Float(self.linear_damping),
            SixDofField::AngularLimitEnabled => Bool(self.angular_limit_enabled),
            SixDofField::AngularLimitUpper => Float(self.angular_limit_upper),
            SixDofField::AngularLimitLower => Float(self.angular_limit_lower),
            SixDofField::AngularLimitSoftness => Float(self.angular_limit_softness),
            SixDofField::AngularRestitution => Float(self.angular_restitution),
            SixDofField::AngularDamping => Float(self.angular_damping),
            SixDofField::Erp => Float(self.erp),
            SixDofField::AngularSpringEnabled => Bool(self.angular_spring_enabled),
            SixDofField::AngularSpringStiffness => Float(self.angular_spring_stiffness),
            SixDofField::AngularSpringDamping => Float(self.angular_spring_damping),
            SixDofField::AngularEquilibriumPoint => Float(self.angular_equilibrium_point),
        }
    }

    /// Write a field in storage units.
    pub fn set(&mut self, field: SixDofField, value: PropertyValue) {
        if let Some(flag) = self.flag_slot(field) {
            *flag = value.as_bool();
        } else if let Some(slot) = self.scalar_slot(field) {
            *slot = value.as_f64();
        }
    }
}

/// Six-degree-of-freedom joint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SixDofJointData {
    /// Per-axis parameters, indexed by [`Axis::index`].
    pub axis_data: [SixDofAxisData; 3],
}

impl SixDofJointData {
    /// Parameters of one axis.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> &SixDofAxisData {
        &self.axis_data[axis.index()]
    }

    /// Mutable parameters of one axis.
    pub fn axis_mut(&mut self, axis: Axis) -> &mut SixDofAxisData {
        &mut self.axis_data[axis.index()]
    }

    /// Look a per-axis name up.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Property<SixDofField>> {
        SIX_DOF_AXIS_PROPERTIES.iter().find(|p| p.name == name)
    }

    /// Read `<axis>/<name>` in display units.
    #[must_use]
    pub fn get_named(&self, axis: Axis, name: &str) -> Option<PropertyValue> {
        let property = Self::lookup(name)?;
        Some(property.unit.to_display(self.axis(axis).get(property.field)))
    }

    /// Write `<axis>/<name>` from display units.
    pub fn set_named(&mut self, axis: Axis, name: &str, value: PropertyValue) -> Option<SixDofField> {
        let property = Self::lookup(name)?;
        self.axis_mut(axis)
            .set(property.field, property.unit.to_stored(value));
        Some(property.field)
    }

    /// Send one field of one axis to the server joint.
    pub fn push(
        &self,
        axis: Axis,
        field: SixDofField,
        joint: JointHandle,
        server: &mut dyn PhysicsServer,
    ) {
        let value = self.axis(axis).get(field);
        match field.target() {
            Target::Param(param) => {
                server.generic_6dof_joint_set_param(joint, axis, param, value.as_f64());
            }
            Target::Flag(flag) => {
                server.generic_6dof_joint_set_flag(joint, axis, flag, value.as_bool());
            }
        }
    }

    /// Send every field of every axis to the server joint.
    pub fn push_all(&self, joint: JointHandle, server: &mut dyn PhysicsServer) {
        for axis in Axis::ALL {
            for property in SIX_DOF_AXIS_PROPERTIES {
                self.push(axis, property.field, joint, server);
            }
        }
    }
}
