//! Minimal bone hierarchy that physical bones attach to.

use body_types::{BodyHandle, Isometry3};
use tracing::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pose forced onto a bone, blended with its own pose by `amount`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseOverride {
    /// Override pose, relative to the skeleton.
    pub pose: Isometry3<f64>,
    /// Blend weight in `[0, 1]`; 0 disables the override.
    pub amount: f64,
    /// Whether the override survives the next animation update.
    pub persistent: bool,
}

/// One bone of a [`Skeleton`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bone {
    /// Unique bone name.
    pub name: String,
    /// Parent bone index.
    pub parent: Option<usize>,
    /// Global pose relative to the skeleton, without overrides.
    pub pose: Isometry3<f64>,
    physical_bone: Option<BodyHandle>,
    pose_override: Option<PoseOverride>,
}

/// Bone hierarchy with physical-bone bindings and pose overrides.
///
/// Physical bones keep only a weak reference to their skeleton and write
/// their simulated pose back through [`Skeleton::set_bone_global_pose_override`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skeleton {
    transform: Isometry3<f64>,
    bones: Vec<Bone>,
    animate_physical_bones: bool,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self {
            transform: Isometry3::identity(),
            bones: Vec::new(),
            animate_physical_bones: true,
        }
    }
}

impl Skeleton {
    /// Empty skeleton at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the skeleton.
    #[must_use]
    pub fn with_transform(mut self, transform: Isometry3<f64>) -> Self {
        self.transform = transform;
        self
    }

    /// Append a bone and return its index.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        pose: Isometry3<f64>,
    ) -> usize {
        self.bones.push(Bone {
            name: name.into(),
            parent,
            pose,
            physical_bone: None,
            pose_override: None,
        });
        self.bones.len() - 1
    }

    /// Global transform of the skeleton node.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.transform
    }

    /// Move the skeleton node.
    pub fn set_global_transform(&mut self, transform: Isometry3<f64>) {
        self.transform = transform;
    }

    /// Number of bones.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Bone at `index`.
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Index of the bone called `name`.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Global pose of a bone relative to the skeleton, overrides applied.
    #[must_use]
    pub fn bone_global_pose(&self, index: usize) -> Option<Isometry3<f64>> {
        let bone = self.bones.get(index)?;
        Some(match bone.pose_override {
            Some(o) if o.amount > 0.0 => bone.pose.lerp_slerp(&o.pose, o.amount.min(1.0)),
            _ => bone.pose,
        })
    }

    /// Current override of a bone.
    #[must_use]
    pub fn bone_global_pose_override(&self, index: usize) -> Option<PoseOverride> {
        self.bones.get(index)?.pose_override
    }

    /// Force a pose onto a bone. An `amount` of 0 clears the override.
    pub fn set_bone_global_pose_override(
        &mut self,
        index: usize,
        pose: Isometry3<f64>,
        amount: f64,
        persistent: bool,
    ) {
        let Some(bone) = self.bones.get_mut(index) else {
            warn!(index, "pose override for a missing bone");
            return;
        };
        bone.pose_override = (amount > 0.0).then_some(PoseOverride {
            pose,
            amount,
            persistent,
        });
    }

    /// Whether physical bones follow the animation while not simulating.
    #[must_use]
    pub fn animate_physical_bones(&self) -> bool {
        self.animate_physical_bones
    }

    /// Set whether physical bones follow the animation while not simulating.
    pub fn set_animate_physical_bones(&mut self, animate: bool) {
        self.animate_physical_bones = animate;
    }

    // ========================================================================
    // Physical bone bindings
    // ========================================================================

    /// Bind a physical bone's body to a bone.
    pub fn bind_physical_bone_to_bone(&mut self, index: usize, body: BodyHandle) {
        match self.bones.get_mut(index) {
            Some(bone) => {
                if bone.physical_bone.is_some() {
                    warn!(index, %body, "bone already has a physical bone; rebinding");
                }
                trace!(index, %body, "physical bone bound");
                bone.physical_bone = Some(body);
            }
            None => warn!(index, "bind to a missing bone"),
        }
    }

    /// Release a bone's physical bone binding.
    pub fn unbind_physical_bone_from_bone(&mut self, index: usize) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.physical_bone = None;
        }
    }

    /// Physical bone bound to a bone.
    #[must_use]
    pub fn physical_bone(&self, index: usize) -> Option<BodyHandle> {
        self.bones.get(index)?.physical_bone
    }

    /// Nearest ancestor bone's physical bone, excluding the bone itself.
    #[must_use]
    pub fn physical_bone_parent(&self, index: usize) -> Option<BodyHandle> {
        let mut current = self.bones.get(index)?.parent;
        while let Some(i) = current {
            let bone = self.bones.get(i)?;
            if bone.physical_bone.is_some() {
                return bone.physical_bone;
            }
            current = bone.parent;
        }
        None
    }
}
