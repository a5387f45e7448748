//! Hinge joint parameters.

use body_server::{HingeJointFlag, HingeJointParam, PhysicsServer};
use body_types::JointHandle;

use crate::property::{JointParams, Property, PropertyValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hinge joint parameters. Limits are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HingeJointData {
    /// Enforce the rotation limits.
    pub angular_limit_enabled: bool,
    /// Upper rotation limit.
    pub angular_limit_upper: f64,
    /// Lower rotation limit.
    pub angular_limit_lower: f64,
    /// Limit correction speed.
    pub angular_limit_bias: f64,
    /// Limit softness.
    pub angular_limit_softness: f64,
    /// Limit relaxation.
    pub angular_limit_relaxation: f64,
}

impl Default for HingeJointData {
    fn default() -> Self {
        Self {
            angular_limit_enabled: false,
            angular_limit_upper: std::f64::consts::FRAC_PI_2,
            angular_limit_lower: -std::f64::consts::FRAC_PI_2,
            angular_limit_bias: 0.3,
            angular_limit_softness: 0.9,
            angular_limit_relaxation: 1.0,
        }
    }
}

/// Field selector for [`HingeJointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HingeField {
    /// [`HingeJointData::angular_limit_enabled`].
    AngularLimitEnabled,
    /// [`HingeJointData::angular_limit_upper`].
    AngularLimitUpper,
    /// [`HingeJointData::angular_limit_lower`].
    AngularLimitLower,
    /// [`HingeJointData::angular_limit_bias`].
    AngularLimitBias,
    /// [`HingeJointData::angular_limit_softness`].
    AngularLimitSoftness,
    /// [`HingeJointData::angular_limit_relaxation`].
    AngularLimitRelaxation,
}

impl JointParams for HingeJointData {
    type Field = HingeField;

    const PROPERTIES: &'static [Property<HingeField>] = &[
        Property::flag("angular_limit_enabled", HingeField::AngularLimitEnabled),
        Property::degrees("angular_limit_upper", HingeField::AngularLimitUpper),
        Property::degrees("angular_limit_lower", HingeField::AngularLimitLower),
        Property::raw("angular_limit_bias", HingeField::AngularLimitBias),
        Property::raw("angular_limit_softness", HingeField::AngularLimitSoftness),
        Property::raw("angular_limit_relaxation", HingeField::AngularLimitRelaxation),
    ];

    fn get(&self, field: HingeField) -> PropertyValue {
        match field {
            HingeField::AngularLimitEnabled => PropertyValue::Bool(self.angular_limit_enabled),
            HingeField::AngularLimitUpper => PropertyValue::Float(self.angular_limit_upper),
            HingeField::AngularLimitLower => PropertyValue::Float(self.angular_limit_lower),
            HingeField::AngularLimitBias => PropertyValue::Float(self.angular_limit_bias),
            HingeField::AngularLimitSoftness => PropertyValue::Float(self.angular_limit_softness),
            HingeField::AngularLimitRelaxation => {
                PropertyValue::Float(self.angular_limit_relaxation)
            }
        }
    }

    fn set(&mut self, field: HingeField, value: PropertyValue) {
        match field {
            HingeField::AngularLimitEnabled => self.angular_limit_enabled = value.as_bool(),
            HingeField::AngularLimitUpper => self.angular_limit_upper = value.as_f64(),
            HingeField::AngularLimitLower => self.angular_limit_lower = value.as_f64(),
            HingeField::AngularLimitBias => self.angular_limit_bias = value.as_f64(),
            HingeField::AngularLimitSoftness => self.angular_limit_softness = value.as_f64(),
            HingeField::AngularLimitRelaxation => {
                self.angular_limit_relaxation = value.as_f64();
            }
        }
    }

    fn push(&self, field: HingeField, joint: JointHandle, server: &mut dyn PhysicsServer) {
        let param = match field {
            HingeField::AngularLimitEnabled => {
                server.hinge_joint_set_flag(
                    joint,
                    HingeJointFlag::UseLimit,
                    self.angular_limit_enabled,
                );
                return;
            }
            HingeField::AngularLimitUpper => HingeJointParam::LimitUpper,
            HingeField::AngularLimitLower => HingeJointParam::LimitLower,
            HingeField::AngularLimitBias => HingeJointParam::LimitBias,
            HingeField::AngularLimitSoftness => HingeJointParam::LimitSoftness,
            HingeField::AngularLimitRelaxation => HingeJointParam::LimitRelaxation,
        };
        server.hinge_joint_set_param(joint, param, self.get(field).as_f64());
    }
}
