// MIT License
//
// Copyright (c) 2024 Erik Holum
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Arena-backed tree of motions for sampling-based planners.
//!
//! Every motion (a state plus the edge that reached it) is owned by the
//! tree and addressed through a stable [`MotionId`] handle, so re-parenting
//! during rewiring never invalidates handles held elsewhere, e.g. by a
//! nearest-neighbor index. Parent links point towards the root; an explicit
//! child list per motion makes subtree traversals cheap without rescanning
//! the whole arena.

use crate::error::Error;

/// Stable handle to a motion stored in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionId(usize);

impl MotionId {
    /// Position of the motion in insertion order. The root is always 0.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single node in the exploration tree.
#[derive(Debug)]
struct Motion<S> {
    // The configuration this motion reached. Exclusively owned here.
    state: S,

    // Back-reference towards the root, or None for the root itself.
    parent: Option<MotionId>,

    // Handles of the motions whose parent is this one. Kept consistent on
    // every re-parenting so cost propagation can walk downwards.
    children: Vec<MotionId>,

    // Accumulated path cost from the root.
    cost: f64,
}

/// Rooted tree of motions with parent links and per-node child lists.
///
/// Construction always produces a tree with exactly one motion, the root,
/// at cost 0. Motions are only removed by dropping the whole tree.
#[derive(Debug)]
pub struct Tree<S> {
    motions: Vec<Motion<S>>,
}

impl<S> Tree<S> {
    /// Constructs a new tree rooted at the given start state.
    pub fn new(root_state: S) -> Self {
        Tree {
            motions: vec![Motion {
                state: root_state,
                parent: None,
                children: Vec::new(),
                cost: 0.0,
            }],
        }
    }

    /// Handle of the root motion.
    #[must_use]
    pub fn root(&self) -> MotionId {
        MotionId(0)
    }

    /// Number of motions currently in the tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    /// Always false: a tree holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Adds a motion under `parent` with the given accumulated cost and
    /// returns its handle.
    pub fn insert(&mut self, state: S, parent: MotionId, cost: f64) -> MotionId {
        debug_assert!(cost >= 0.0, "motion cost must be non-negative");
        let id = MotionId(self.motions.len());
        self.motions.push(Motion {
            state,
            parent: Some(parent),
            children: Vec::new(),
            cost,
        });
        self.motions[parent.0].children.push(id);
        id
    }

    /// The state owned by the given motion.
    #[must_use]
    pub fn state(&self, id: MotionId) -> &S {
        &self.motions[id.0].state
    }

    /// Accumulated path cost from the root to the given motion.
    #[must_use]
    pub fn cost(&self, id: MotionId) -> f64 {
        self.motions[id.0].cost
    }

    /// Parent handle, or None for the root.
    #[must_use]
    pub fn parent(&self, id: MotionId) -> Option<MotionId> {
        self.motions[id.0].parent
    }

    /// Handles of the motions currently parented to `id`.
    #[must_use]
    pub fn children(&self, id: MotionId) -> &[MotionId] {
        &self.motions[id.0].children
    }

    /// All motion handles in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = MotionId> {
        (0..self.motions.len()).map(MotionId)
    }

    /// Re-parents `id` under `new_parent` at the given cost, fixing both
    /// child lists. The root must never be re-parented.
    pub fn set_parent(&mut self, id: MotionId, new_parent: MotionId, new_cost: f64) {
        debug_assert!(id.0 != 0, "the root cannot be re-parented");
        debug_assert!(new_cost >= 0.0, "motion cost must be non-negative");
        if let Some(old_parent) = self.motions[id.0].parent {
            self.motions[old_parent.0].children.retain(|&c| c != id);
        }
        self.motions[id.0].parent = Some(new_parent);
        self.motions[id.0].cost = new_cost;
        self.motions[new_parent.0].children.push(id);
    }

    /// Subtracts `delta` from the cost of every descendant of `from`.
    ///
    /// A cost change at a motion shifts every descendant by the same amount
    /// since edge costs are fixed. Traversal is an explicit work-list over
    /// the child lists rather than recursion, so deep trees cannot overflow
    /// the stack.
    pub fn propagate_cost_delta(&mut self, from: MotionId, delta: f64) {
        let mut stack = self.motions[from.0].children.clone();
        while let Some(id) = stack.pop() {
            self.motions[id.0].cost -= delta;
            debug_assert!(
                self.motions[id.0].cost >= 0.0,
                "cost propagation produced a negative cost"
            );
            stack.extend_from_slice(&self.motions[id.0].children);
        }
    }

    /// Walks parent links from `from` to the root and returns the states in
    /// root-to-leaf order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if the walk takes more steps
    /// than there are motions, which means the parent links form a cycle.
    pub fn path_to_root(&self, from: MotionId) -> Result<Vec<S>, Error>
    where
        S: Clone,
    {
        let mut path = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            if path.len() >= self.motions.len() {
                return Err(Error::InvariantViolation("parent links form a cycle"));
            }
            path.push(self.motions[id.0].state.clone());
            current = self.motions[id.0].parent;
        }
        path.reverse();
        Ok(path)
    }
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_insert_and_children() {
        let mut tree: Tree<f64> = Tree::new(0.0);
        assert_eq!(tree.len(), 1);
        assert!((*tree.state(tree.root()) - 0.0).abs() < f64::EPSILON);
        assert_eq!(tree.cost(tree.root()), 0.0);
        assert!(tree.parent(tree.root()).is_none());

        let root = tree.root();
        let a = tree.insert(1.0, root, 1.0);
        let b = tree.insert(2.0, a, 2.0);
        let c = tree.insert(-1.0, root, 1.0);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children(root), &[a, c]);
        assert_eq!(tree.children(a), &[b]);
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.cost(b), 2.0);
    }

    #[test]
    fn test_tree_set_parent_fixes_child_lists() {
        // 0 -> a -> b, then re-parent b directly under the root.
        let mut tree: Tree<f64> = Tree::new(0.0);
        let root = tree.root();
        let a = tree.insert(1.0, root, 1.0);
        let b = tree.insert(2.0, a, 2.0);

        tree.set_parent(b, root, 1.5);
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.cost(b), 1.5);
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn test_tree_path_to_root_order() {
        let mut tree: Tree<i32> = Tree::new(1);
        let root = tree.root();
        let a = tree.insert(2, root, 1.0);
        let b = tree.insert(3, a, 2.0);
        let _ = tree.insert(4, root, 1.0);

        let path = tree.path_to_root(b).unwrap();
        assert_eq!(path, vec![1, 2, 3]);

        let root_path = tree.path_to_root(root).unwrap();
        assert_eq!(root_path, vec![1]);
    }

    #[test]
    fn test_tree_path_detects_cycles() {
        let mut tree: Tree<i32> = Tree::new(1);
        let root = tree.root();
        let a = tree.insert(2, root, 1.0);
        let b = tree.insert(3, a, 2.0);

        // Corrupt the parent links to form a cycle. This is a bug condition
        // that reconstruction must report instead of spinning forever.
        tree.motions[a.index()].parent = Some(b);
        let result = tree.path_to_root(b);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_tree_cost_propagation_hits_whole_subtree() {
        // root -> a -> b -> c and a -> d; lowering a must lower b, c, and d.
        let mut tree: Tree<f64> = Tree::new(0.0);
        let root = tree.root();
        let a = tree.insert(1.0, root, 4.0);
        let b = tree.insert(2.0, a, 5.0);
        let c = tree.insert(3.0, b, 6.0);
        let d = tree.insert(0.5, a, 4.5);
        let e = tree.insert(-1.0, root, 1.0);

        tree.motions[a.index()].cost = 1.0;
        tree.propagate_cost_delta(a, 3.0);

        assert_eq!(tree.cost(b), 2.0);
        assert_eq!(tree.cost(c), 3.0);
        assert_eq!(tree.cost(d), 1.5);
        // Siblings outside the subtree are untouched.
        assert_eq!(tree.cost(e), 1.0);
        assert_eq!(tree.cost(root), 0.0);
    }
}
