//! Joint parameter blocks for physical bones.
//!
//! A physical bone is connected to its parent bone by one joint whose kind
//! can change at runtime. [`JointData`] is a tagged union over the kinds,
//! each variant carrying its own parameter block:
//!
//! | Kind | Block | Server joint |
//! |------|-------|--------------|
//! | Pin | [`PinJointData`] | pin |
//! | Cone | [`ConeJointData`] | cone-twist |
//! | Hinge | [`HingeJointData`] | hinge |
//! | Slider | [`SliderJointData`] | slider |
//! | 6DOF | [`SixDofJointData`] | generic 6DOF, per axis |
//!
//! Core code works with typed fields ([`JointField`]). String paths such as
//! `joint_constraints/angular_limit_upper` or `joint_constraints/x/erp` are
//! resolved through per-variant tables only at the property boundary; names a
//! variant does not have are reported as "not handled" (`None`). Angular
//! spans and limits are shown in degrees and stored in radians.
//!
//! # Example
//!
//! ```
//! use body_joint::{JointData, JointType, PropertyValue};
//!
//! let mut joint = JointData::new(JointType::Hinge);
//! let field = joint.set_property("joint_constraints/angular_limit_upper", 30.0.into());
//! assert!(field.is_some());
//!
//! // Pin-only names are not handled by a hinge.
//! assert!(joint.set_property("joint_constraints/impulse_clamp", 1.0.into()).is_none());
//! ```

#![doc(html_root_url = "https://docs.rs/body-joint/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::too_many_arguments,        // Joint constructors mirror the server API
)]

mod cone;
mod data;
mod hinge;
mod pin;
mod property;
mod six_dof;
mod slider;

pub use cone::{ConeField, ConeJointData};
pub use data::{JointData, JointField, JointType};
pub use hinge::{HingeField, HingeJointData};
pub use pin::{PinField, PinJointData};
pub use property::{JointParams, PROPERTY_PREFIX, Property, PropertyValue, Unit};
pub use six_dof::{SIX_DOF_AXIS_PROPERTIES, SixDofAxisData, SixDofField, SixDofJointData};
pub use slider::{SliderField, SliderJointData};
