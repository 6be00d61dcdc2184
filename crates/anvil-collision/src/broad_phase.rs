//! Broad-phase collision detection over a bounding-sphere hierarchy.
//!
//! The hierarchy is a binary tree of enclosing spheres with one dynamic
//! body per leaf. Static geometry (half-spaces) is not inserted; the driver
//! tests it against every dynamic body directly.
//!
//! Nodes live in an arena and are addressed by [`NodeIndex`]; parent and
//! child links are plain index fields and removal is a single atomic
//! sibling-promotion routine with free-list recycling, so no sequence of
//! edits can leave a dangling or doubly-owned node.

use nalgebra::Point3;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use anvil_dynamics::BodyHandle;

/// A sphere enclosing some portion of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingSphere {
    /// Centre of the sphere in world space.
    pub center: Point3<f64>,
    /// Radius of the sphere.
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a sphere from centre and radius.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The smallest sphere enclosing both inputs.
    ///
    /// When one sphere already contains the other, the larger is returned
    /// unchanged; otherwise the result spans both, its centre interpolated
    /// from the first centre toward the second in proportion to the radius
    /// change.
    #[must_use]
    pub fn enclosing(one: &Self, two: &Self) -> Self {
        let center_offset = two.center - one.center;
        let distance_squared = center_offset.norm_squared();
        let radius_diff = two.radius - one.radius;

        if radius_diff * radius_diff >= distance_squared {
            if one.radius > two.radius {
                *one
            } else {
                *two
            }
        } else {
            let distance = distance_squared.sqrt();
            let radius = (distance + one.radius + two.radius) * 0.5;

            let mut center = one.center;
            if distance > 0.0 {
                center += center_offset * ((radius - one.radius) / distance);
            }
            Self { center, radius }
        }
    }

    /// Whether the two spheres overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radii = self.radius + other.radius;
        distance_squared < radii * radii
    }

    /// How much this sphere would have to grow to enclose `other`.
    ///
    /// Proportional to the change in surface area (after the
    /// Goldsmith–Salmon insertion heuristic), not to the change in volume.
    #[must_use]
    pub fn growth(&self, other: &Self) -> f64 {
        let merged = Self::enclosing(self, other);
        merged.radius * merged.radius - self.radius * self.radius
    }

    /// Volume of the sphere, used to pick which branch to descend.
    #[must_use]
    pub fn size(&self) -> f64 {
        std::f64::consts::FRAC_PI_3 * 4.0 * self.radius * self.radius * self.radius
    }
}

/// A candidate body pair reported by the broad phase.
///
/// Not yet geometrically validated; the narrow phase decides whether the
/// pair actually touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PotentialContact {
    /// The two bodies whose bounding volumes overlap.
    pub bodies: [BodyHandle; 2],
}

/// Index of a node in the hierarchy's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Node {
    parent: Option<NodeIndex>,
    children: Option<[NodeIndex; 2]>,
    volume: BoundingSphere,
    body: Option<BodyHandle>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.body.is_some()
    }
}

/// Binary bounding-sphere hierarchy over the dynamic bodies of a scene.
///
/// # Example
///
/// ```
/// use anvil_collision::{BoundingSphere, BoundingVolumeTree};
/// use anvil_dynamics::BodyHandle;
/// use nalgebra::Point3;
///
/// let mut tree = BoundingVolumeTree::new();
/// tree.insert(
///     BodyHandle::new(0),
///     BoundingSphere::new(Point3::origin(), 1.0),
/// );
/// tree.insert(
///     BodyHandle::new(1),
///     BoundingSphere::new(Point3::new(1.0, 0.0, 0.0), 1.0),
/// );
///
/// let mut pairs = Vec::new();
/// assert_eq!(tree.potential_contacts(&mut pairs, 16), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingVolumeTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeIndex>,
    root: Option<NodeIndex>,
}

impl BoundingVolumeTree {
    /// Create an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes (leaves plus internal nodes).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of leaves, i.e. bodies currently in the hierarchy.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.is_leaf())
            .count()
    }

    /// Number of recycled slots awaiting reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Whether the hierarchy holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// The bounding volume of a node.
    #[must_use]
    pub fn volume(&self, index: NodeIndex) -> &BoundingSphere {
        &self.node(index).volume
    }

    /// The leaf currently holding `body`, if the body is in the hierarchy.
    ///
    /// Inserting splits leaves, so a leaf's index is only stable until the
    /// next insert; drivers should look bodies up through this rather than
    /// caching the index an earlier [`insert`](Self::insert) returned.
    #[must_use]
    pub fn leaf_for(&self, body: BodyHandle) -> Option<NodeIndex> {
        self.nodes.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|node| node.body == Some(body))
                .map(|_| NodeIndex(i as u32))
        })
    }

    fn node(&self, index: NodeIndex) -> &Node {
        match &self.nodes[index.index()] {
            Some(node) => node,
            None => unreachable!("stale node index {index:?}"),
        }
    }

    fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        match &mut self.nodes[index.index()] {
            Some(node) => node,
            None => unreachable!("stale node index {index:?}"),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeIndex {
        if let Some(index) = self.free.pop() {
            debug_assert!(self.nodes[index.index()].is_none());
            self.nodes[index.index()] = Some(node);
            index
        } else {
            let index = NodeIndex(self.nodes.len() as u32);
            self.nodes.push(Some(node));
            index
        }
    }

    fn release(&mut self, index: NodeIndex) {
        debug_assert!(self.nodes[index.index()].is_some(), "double release");
        self.nodes[index.index()] = None;
        self.free.push(index);
    }

    /// Insert a body with its bounding volume, returning the new leaf.
    ///
    /// Descends into whichever child would grow least to absorb the new
    /// volume, splits the reached leaf into two children (old contents and
    /// the new body) and refreshes every ancestor's bounding sphere.
    pub fn insert(&mut self, body: BodyHandle, volume: BoundingSphere) -> NodeIndex {
        let Some(root) = self.root else {
            let index = self.alloc(Node {
                parent: None,
                children: None,
                volume,
                body: Some(body),
            });
            self.root = Some(index);
            return index;
        };

        // Walk down to the leaf that grows least.
        let mut current = root;
        while let Some([left, right]) = self.node(current).children {
            current = if self.node(left).volume.growth(&volume)
                < self.node(right).volume.growth(&volume)
            {
                left
            } else {
                right
            };
        }

        // Split the leaf: one child keeps its old contents, the other holds
        // the new body; the split node stops being a leaf.
        let old_volume = self.node(current).volume;
        let old_body = self.node(current).body;
        let left = self.alloc(Node {
            parent: Some(current),
            children: None,
            volume: old_volume,
            body: old_body,
        });
        let right = self.alloc(Node {
            parent: Some(current),
            children: None,
            volume,
            body: Some(body),
        });

        let split = self.node_mut(current);
        split.children = Some([left, right]);
        split.body = None;

        self.recalculate_upward(current);
        right
    }

    /// Remove a node (and its whole subtree) from the hierarchy.
    ///
    /// A single atomic edit: the removed subtree is freed, the sibling's
    /// contents are promoted into the parent slot, the promoted children
    /// are re-parented, the sibling slot is freed, and the ancestor chain's
    /// volumes are recomputed. Both child positions are handled by the same
    /// code path.
    pub fn remove(&mut self, index: NodeIndex) {
        let parent = self.node(index).parent;
        self.release_subtree(index);

        let Some(parent) = parent else {
            self.root = None;
            return;
        };

        let [left, right] = match self.node(parent).children {
            Some(children) => children,
            None => unreachable!("parent of a removed node must be internal"),
        };
        let sibling = if left == index { right } else { left };

        // Promote the sibling's contents into the parent slot, then free
        // the sibling. Exactly two slots die here: the subtree root and the
        // displaced sibling.
        let promoted = match self.nodes[sibling.index()].take() {
            Some(node) => node,
            None => unreachable!("sibling of a live node cannot be free"),
        };
        self.free.push(sibling);

        let parent_node = self.node_mut(parent);
        parent_node.volume = promoted.volume;
        parent_node.body = promoted.body;
        parent_node.children = promoted.children;

        if let Some([a, b]) = promoted.children {
            self.node_mut(a).parent = Some(parent);
            self.node_mut(b).parent = Some(parent);
        }

        self.recalculate_upward(parent);
    }

    fn release_subtree(&mut self, index: NodeIndex) {
        if let Some([left, right]) = self.node(index).children {
            self.release_subtree(left);
            self.release_subtree(right);
        }
        self.release(index);
    }

    /// Recompute bounding volumes from `start` up to the root.
    fn recalculate_upward(&mut self, start: NodeIndex) {
        let mut current = Some(start);
        while let Some(index) = current {
            if let Some([left, right]) = self.node(index).children {
                let volume =
                    BoundingSphere::enclosing(&self.node(left).volume, &self.node(right).volume);
                self.node_mut(index).volume = volume;
            }
            current = self.node(index).parent;
        }
    }

    /// Collect up to `limit` candidate pairs of bodies whose bounding
    /// volumes overlap, appending them to `out`.
    ///
    /// The limit is an upper bound on broad-phase output, not an exact
    /// count; candidates may still fail narrow-phase validation.
    pub fn potential_contacts(&self, out: &mut Vec<PotentialContact>, limit: usize) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let count = self.gather(root, out, limit);
        if count == limit {
            trace!(limit, "broad-phase pair budget exhausted");
        }
        count
    }

    /// Pairs within one subtree: the cross-pairs between the two children
    /// plus, recursively, the pairs inside each child.
    fn gather(&self, index: NodeIndex, out: &mut Vec<PotentialContact>, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }
        let Some([left, right]) = self.node(index).children else {
            return 0;
        };

        let mut count = self.cross_pairs(left, right, out, limit);
        count += self.gather(left, out, limit - count);
        count += self.gather(right, out, limit - count);
        count
    }

    /// Pairs with one body from each of two disjoint subtrees.
    fn cross_pairs(
        &self,
        a: NodeIndex,
        b: NodeIndex,
        out: &mut Vec<PotentialContact>,
        limit: usize,
    ) -> usize {
        if limit == 0 {
            return 0;
        }
        let node_a = self.node(a);
        let node_b = self.node(b);
        if !node_a.volume.overlaps(&node_b.volume) {
            return 0;
        }

        if let (Some(body_a), Some(body_b)) = (node_a.body, node_b.body) {
            out.push(PotentialContact {
                bodies: [body_a, body_b],
            });
            return 1;
        }

        // Descend into the branch with the larger volume first, splitting
        // the remaining budget between the two recursive calls.
        if node_b.is_leaf() || (!node_a.is_leaf() && node_a.volume.size() >= node_b.volume.size()) {
            let Some([left, right]) = node_a.children else {
                return 0;
            };
            let count = self.cross_pairs(left, b, out, limit);
            if limit > count {
                count + self.cross_pairs(right, b, out, limit - count)
            } else {
                count
            }
        } else {
            let Some([left, right]) = node_b.children else {
                return 0;
            };
            let count = self.cross_pairs(a, left, out, limit);
            if limit > count {
                count + self.cross_pairs(a, right, out, limit - count)
            } else {
                count
            }
        }
    }
}
