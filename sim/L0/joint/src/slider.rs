//! Slider joint parameters.

use body_server::{PhysicsServer, SliderJointParam};
use body_types::JointHandle;

use crate::property::{JointParams, Property, PropertyValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slider joint parameters. Angular limits are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliderJointData {
    /// Upper translation limit.
    pub linear_limit_upper: f64,
    /// Lower translation limit.
    pub linear_limit_lower: f64,
    /// Translation limit softness.
    pub linear_limit_softness: f64,
    /// Translation limit restitution.
    pub linear_limit_restitution: f64,
    /// Translation limit damping.
    pub linear_limit_damping: f64,
    /// Upper rotation limit.
    pub angular_limit_upper: f64,
    /// Lower rotation limit.
    pub angular_limit_lower: f64,
    /// Rotation limit softness.
    pub angular_limit_softness: f64,
    /// Rotation limit restitution.
    pub angular_limit_restitution: f64,
    /// Rotation limit damping.
    pub angular_limit_damping: f64,
}

impl Default for SliderJointData {
    fn default() -> Self {
        Self {
            linear_limit_upper: 1.0,
            linear_limit_lower: -1.0,
            linear_limit_softness: 1.0,
            linear_limit_restitution: 0.7,
            linear_limit_damping: 1.0,
            angular_limit_upper: 0.0,
            angular_limit_lower: 0.0,
            angular_limit_softness: 1.0,
            angular_limit_restitution: 0.7,
            angular_limit_damping: 1.0,
        }
    }
}

/// Field selector for [`SliderJointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SliderField {
    LinearLimitUpper,
    LinearLimitLower,
    LinearLimitSoftness,
    LinearLimitRestitution,
    LinearLimitDamping,
    AngularLimitUpper,
    AngularLimitLower,
    AngularLimitSoftness,
    AngularLimitRestitution,
    AngularLimitDamping,
}

impl SliderField {
    fn param(self) -> SliderJointParam {
        match self {
            Self::LinearLimitUpper => SliderJointParam::LinearLimitUpper,
            Self::LinearLimitLower => SliderJointParam::LinearLimitLower,
            Self::LinearLimitSoftness => SliderJointParam::LinearLimitSoftness,
            Self::LinearLimitRestitution => SliderJointParam::LinearLimitRestitution,
            Self::LinearLimitDamping => SliderJointParam::LinearLimitDamping,
            Self::AngularLimitUpper => SliderJointParam::AngularLimitUpper,
            Self::AngularLimitLower => SliderJointParam::AngularLimitLower,
            Self::AngularLimitSoftness => SliderJointParam::AngularLimitSoftness,
            Self::AngularLimitRestitution => SliderJointParam::AngularLimitRestitution,
            Self::AngularLimitDamping => SliderJointParam::AngularLimitDamping,
        }
    }
}

impl JointParams for SliderJointData {
    type Field = SliderField;

    const PROPERTIES: &'static [Property<SliderField>] = &[
        Property::raw("linear_limit_upper", SliderField::LinearLimitUpper),
        Property::raw("linear_limit_lower", SliderField::LinearLimitLower),
        Property::raw("linear_limit_softness", SliderField::LinearLimitSoftness),
        Property::raw("linear_limit_restitution", SliderField::LinearLimitRestitution),
        Property::raw("linear_limit_damping", SliderField::LinearLimitDamping),
        Property::degrees("angular_limit_upper", SliderField::AngularLimitUpper),
        Property::degrees("angular_limit_lower", SliderField::AngularLimitLower),
        Property::raw("angular_limit_softness", SliderField::AngularLimitSoftness),
        Property::raw("angular_limit_restitution", SliderField::AngularLimitRestitution),
        Property::raw("angular_limit_damping", SliderField::AngularLimitDamping),
    ];

    fn get(&self, field: SliderField) -> PropertyValue {
        PropertyValue::Float(match field {
            SliderField::LinearLimitUpper => self.linear_limit_upper,
            SliderField::LinearLimitLower => self.linear_limit_lower,
            SliderField::LinearLimitSoftness => self.linear_limit_softness,
            SliderField::LinearLimitRestitution => self.linear_limit_restitution,
            SliderField::LinearLimitDamping => self.linear_limit_damping,
            SliderField::AngularLimitUpper => self.angular_limit_upper,
            SliderField::AngularLimitLower => self.angular_limit_lower,
            SliderField::AngularLimitSoftness => self.angular_limit_softness,
            SliderField::AngularLimitRestitution => self.angular_limit_restitution,
            SliderField::AngularLimitDamping => self.angular_limit_damping,
        })
    }

    fn set(&mut self, field: SliderField, value: PropertyValue) {
        let v = value.as_f64();
        let slot = match field {
            SliderField::LinearLimitUpper => &mut self.linear_limit_upper,
            SliderField::LinearLimitLower => &mut self.linear_limit_lower,
            SliderField::LinearLimitSoftness => &mut self.linear_limit_softness,
            SliderField::LinearLimitRestitution => &mut self.linear_limit_restitution,
            SliderField::LinearLimitDamping => &mut self.linear_limit_damping,
            SliderField::AngularLimitUpper => &mut self.angular_limit_upper,
            SliderField::AngularLimitLower => &mut self.angular_limit_lower,
            SliderField::AngularLimitSoftness => &mut self.angular_limit_softness,
            SliderField::AngularLimitRestitution => &mut self.angular_limit_restitution,
            SliderField::AngularLimitDamping => &mut self.angular_limit_damping,
        };
        *slot = v;
    }

    fn push(&self, field: SliderField, joint: JointHandle, server: &mut dyn PhysicsServer) {
        server.slider_joint_set_param(joint, field.param(), self.get(field).as_f64());
    }
}
