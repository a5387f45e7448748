//! Collision report returned by a single body move.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use body_server::SceneTree;
use body_types::{BodyError, BodyHandle, InstanceId, MotionResult, Point3, Result, Vector3};

/// Node owning each of a body's collision shapes, indexed by shape.
pub(crate) type ShapeOwners = Rc<RefCell<Vec<InstanceId>>>;

/// One collision found while moving a body.
///
/// Holds a non-owning link back to the moving body's shape-owner table, so
/// [`KinematicCollision::local_shape`] reports `None` once the body is gone
/// instead of dangling.
#[derive(Debug, Clone)]
pub struct KinematicCollision {
    result: MotionResult,
    owner: Weak<RefCell<Vec<InstanceId>>>,
}

impl KinematicCollision {
    pub(crate) fn new(result: MotionResult, owner: &ShapeOwners) -> Self {
        Self {
            result,
            owner: Rc::downgrade(owner),
        }
    }

    /// Raw sweep result.
    #[must_use]
    pub fn result(&self) -> &MotionResult {
        &self.result
    }

    /// World-space contact point.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.result.collision_point
    }

    /// Contact normal, pointing away from the collider.
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        self.result.collision_normal
    }

    /// Distance actually moved.
    #[must_use]
    pub fn travel(&self) -> Vector3<f64> {
        self.result.travel
    }

    /// Motion left over after the collision.
    #[must_use]
    pub fn remainder(&self) -> Vector3<f64> {
        self.result.remainder
    }

    /// Angle between the contact normal and `up`, in radians.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::ZeroUpDirection`] if `up` is zero.
    pub fn angle(&self, up: &Vector3<f64>) -> Result<f64> {
        if *up == Vector3::zeros() {
            return Err(BodyError::ZeroUpDirection);
        }
        Ok(self.result.angle(up))
    }

    /// Node owning the moving body's shape that touched, while the body lives.
    #[must_use]
    pub fn local_shape(&self) -> Option<InstanceId> {
        let owners = self.owner.upgrade()?;
        let owner = owners.borrow().get(self.result.collision_local_shape).copied();
        owner
    }

    /// Collider node, if it still exists.
    #[must_use]
    pub fn collider(&self, tree: &dyn SceneTree) -> Option<InstanceId> {
        self.result
            .collider_id
            .filter(|id| tree.instance_exists(*id))
    }

    /// Collider identity as recorded, whether or not it still exists.
    #[must_use]
    pub fn collider_id(&self) -> Option<InstanceId> {
        self.result.collider_id
    }

    /// Collider body handle.
    #[must_use]
    pub fn collider_rid(&self) -> Option<BodyHandle> {
        self.result.collider
    }

    /// Index of the collider's shape that was hit.
    #[must_use]
    pub fn collider_shape_index(&self) -> usize {
        self.result.collider_shape
    }

    /// Collider velocity at the contact point.
    #[must_use]
    pub fn collider_velocity(&self) -> Vector3<f64> {
        self.result.collider_velocity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use body_server::testing::TestSceneTree;

    fn sample() -> MotionResult {
        MotionResult {
            collision_normal: Vector3::y(),
            collision_local_shape: 1,
            collider: Some(BodyHandle(7)),
            collider_shape: 2,
            ..MotionResult::default()
        }
    }

    #[test]
    fn test_local_shape_follows_owner() {
        let owners: ShapeOwners = Rc::new(RefCell::new(vec![InstanceId(10), InstanceId(11)]));
        let collision = KinematicCollision::new(sample(), &owners);
        assert_eq!(collision.local_shape(), Some(InstanceId(11)));

        drop(owners);
        assert_eq!(collision.local_shape(), None);
        assert_eq!(collision.collider_rid(), Some(BodyHandle(7)));
        assert_eq!(collision.collider_shape_index(), 2);
    }

    #[test]
    fn test_angle_rejects_zero_up() {
        let owners: ShapeOwners = Rc::default();
        let collision = KinematicCollision::new(sample(), &owners);
        assert_eq!(collision.angle(&Vector3::y()).unwrap(), 0.0);
        assert!(matches!(
            collision.angle(&Vector3::zeros()),
            Err(BodyError::ZeroUpDirection)
        ));
    }

    #[test]
    fn test_collider_checks_existence() {
        let mut tree = TestSceneTree::new();
        let id = tree.spawn();
        let owners: ShapeOwners = Rc::default();
        let collision = KinematicCollision::new(
            MotionResult {
                collider_id: Some(id),
                ..sample()
            },
            &owners,
        );
        assert_eq!(collision.collider(&tree), Some(id));

        tree.destroy(id);
        assert_eq!(collision.collider(&tree), None);
        assert_eq!(collision.collider_id(), Some(id));
    }
}
