//! Cone-twist joint parameters.

use body_server::{ConeTwistJointParam, PhysicsServer};
use body_types::JointHandle;

use crate::property::{JointParams, Property, PropertyValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cone-twist joint parameters. Spans are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConeJointData {
    /// Swing cone half-angle.
    pub swing_span: f64,
    /// Twist limit.
    pub twist_span: f64,
    /// Correction speed.
    pub bias: f64,
    /// Limit softness.
    pub softness: f64,
    /// Limit relaxation.
    pub relaxation: f64,
}

impl Default for ConeJointData {
    fn default() -> Self {
        Self {
            swing_span: std::f64::consts::FRAC_PI_4,
            twist_span: std::f64::consts::PI,
            bias: 0.3,
            softness: 0.8,
            relaxation: 1.0,
        }
    }
}

/// Field selector for [`ConeJointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConeField {
    /// [`ConeJointData::swing_span`].
    SwingSpan,
    /// [`ConeJointData::twist_span`].
    TwistSpan,
    /// [`ConeJointData::bias`].
    Bias,
    /// [`ConeJointData::softness`].
    Softness,
    /// [`ConeJointData::relaxation`].
    Relaxation,
}

impl JointParams for ConeJointData {
    type Field = ConeField;

    const PROPERTIES: &'static [Property<ConeField>] = &[
        Property::degrees("swing_span", ConeField::SwingSpan),
        Property::degrees("twist_span", ConeField::TwistSpan),
        Property::raw("bias", ConeField::Bias),
        Property::raw("softness", ConeField::Softness),
        Property::raw("relaxation", ConeField::Relaxation),
    ];

    fn get(&self, field: ConeField) -> PropertyValue {
        PropertyValue::Float(match field {
            ConeField::SwingSpan => self.swing_span,
            ConeField::TwistSpan => self.twist_span,
            ConeField::Bias => self.bias,
            ConeField::Softness => self.softness,
            ConeField::Relaxation => self.relaxation,
        })
    }

    fn set(&mut self, field: ConeField, value: PropertyValue) {
        let v = value.as_f64();
        match field {
            ConeField::SwingSpan => self.swing_span = v,
            ConeField::TwistSpan => self.twist_span = v,
            ConeField::Bias => self.bias = v,
            ConeField::Softness => self.softness = v,
            ConeField::Relaxation => self.relaxation = v,
        }
    }

    fn push(&self, field: ConeField, joint: JointHandle, server: &mut dyn PhysicsServer) {
        let param = match field {
            ConeField::SwingSpan => ConeTwistJointParam::SwingSpan,
            ConeField::TwistSpan => ConeTwistJointParam::TwistSpan,
            ConeField::Bias => ConeTwistJointParam::Bias,
            ConeField::Softness => ConeTwistJointParam::Softness,
            ConeField::Relaxation => ConeTwistJointParam::Relaxation,
        };
        server.cone_twist_joint_set_param(joint, param, self.get(field).as_f64());
    }
}
