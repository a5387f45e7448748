//! Pin (ball-and-socket) joint parameters.

use body_server::{PhysicsServer, PinJointParam};
use body_types::JointHandle;

use crate::property::{JointParams, Property, PropertyValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin joint parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinJointData {
    /// Speed at which the anchors are pulled together.
    pub bias: f64,
    /// Resistance to relative velocity.
    pub damping: f64,
    /// Largest impulse applied per step (0 for unlimited).
    pub impulse_clamp: f64,
}

impl Default for PinJointData {
    fn default() -> Self {
        Self {
            bias: 0.3,
            damping: 1.0,
            impulse_clamp: 0.0,
        }
    }
}

/// Field selector for [`PinJointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinField {
    /// [`PinJointData::bias`].
    Bias,
    /// [`PinJointData::damping`].
    Damping,
    /// [`PinJointData::impulse_clamp`].
    ImpulseClamp,
}

impl JointParams for PinJointData {
    type Field = PinField;

    const PROPERTIES: &'static [Property<PinField>] = &[
        Property::raw("bias", PinField::Bias),
        Property::raw("damping", PinField::Damping),
        Property::raw("impulse_clamp", PinField::ImpulseClamp),
    ];

    fn get(&self, field: PinField) -> PropertyValue {
        PropertyValue::Float(match field {
            PinField::Bias => self.bias,
            PinField::Damping => self.damping,
            PinField::ImpulseClamp => self.impulse_clamp,
        })
    }

    fn set(&mut self, field: PinField, value: PropertyValue) {
        let v = value.as_f64();
        match field {
            PinField::Bias => self.bias = v,
            PinField::Damping => self.damping = v,
            PinField::ImpulseClamp => self.impulse_clamp = v,
        }
    }

    fn push(&self, field: PinField, joint: JointHandle, server: &mut dyn PhysicsServer) {
        let param = match field {
            PinField::Bias => PinJointParam::Bias,
            PinField::Damping => PinJointParam::Damping,
            PinField::ImpulseClamp => PinJointParam::ImpulseClamp,
        };
        server.pin_joint_set_param(joint, param, self.get(field).as_f64());
    }
}
