//! Per-body shape-pair bookkeeping.

use body_types::BodyHandle;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One touching pair: a shape of the other body and a shape of ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapePair {
    /// Shape index on the other body.
    pub body_shape: usize,
    /// Shape index on the monitoring body.
    pub local_shape: usize,
}

impl ShapePair {
    /// Create a shape pair.
    #[must_use]
    pub const fn new(body_shape: usize, local_shape: usize) -> Self {
        Self {
            body_shape,
            local_shape,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TaggedPair {
    pub(crate) pair: ShapePair,
    pub(crate) tagged: bool,
}

/// Everything tracked about one touching body.
#[derive(Debug, Clone)]
pub struct TrackedBody {
    pub(crate) collider: BodyHandle,
    pub(crate) in_tree: bool,
    /// Sorted by pair, no duplicates.
    pub(crate) shapes: SmallVec<[TaggedPair; 4]>,
}

impl TrackedBody {
    pub(crate) fn new(collider: BodyHandle, in_tree: bool) -> Self {
        Self {
            collider,
            in_tree,
            shapes: SmallVec::new(),
        }
    }

    /// Server handle of the tracked body.
    #[must_use]
    pub fn collider(&self) -> BodyHandle {
        self.collider
    }

    /// Whether the tracked node is inside the scene tree.
    #[must_use]
    pub fn in_tree(&self) -> bool {
        self.in_tree
    }

    /// Touching shape pairs in order.
    pub fn shape_pairs(&self) -> impl Iterator<Item = ShapePair> + '_ {
        self.shapes.iter().map(|s| s.pair)
    }

    /// Number of touching shape pairs.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub(crate) fn find(&self, pair: ShapePair) -> Result<usize, usize> {
        self.shapes.binary_search_by(|s| s.pair.cmp(&pair))
    }

    /// Insert a pair, tagged. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, pair: ShapePair) -> bool {
        match self.find(pair) {
            Ok(_) => false,
            Err(at) => {
                self.shapes.insert(at, TaggedPair { pair, tagged: true });
                true
            }
        }
    }

    /// Remove a pair. Returns `false` if it was absent.
    pub(crate) fn remove(&mut self, pair: ShapePair) -> bool {
        match self.find(pair) {
            Ok(at) => {
                self.shapes.remove(at);
                true
            }
            Err(_) => false,
        }
    }
}
