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

//! Nearest-neighbor lookup over the motions of a planning tree.
//!
//! The index stores non-owning [`MotionId`] handles keyed by a copy of the
//! motion's state, with the distance function supplied at construction.
//! Planners mirror every tree insertion into the index immediately, so
//! queries always reflect the tree's contents at call time.

use std::fmt;

use crate::tree::MotionId;

/// Nearest-neighbor queries over stored motion handles.
///
/// Implementations are parameterized over a distance function supplied at
/// construction, which must agree with the state space the planner runs in.
pub trait NearestNeighbors<S> {
    /// Stores a handle under the given key state.
    fn add(&mut self, id: MotionId, key: S);

    /// Returns the stored handle whose key minimizes distance to `query`,
    /// or None if the index is empty.
    fn nearest(&self, query: &S) -> Option<MotionId>;

    /// Returns all stored handles whose key is within `radius` of `query`,
    /// in no particular order. May be empty.
    fn within_radius(&self, query: &S, radius: f64) -> Vec<MotionId>;

    /// Removes every stored handle.
    fn clear(&mut self);

    /// Number of stored handles.
    fn len(&self) -> usize;

    /// True when nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force linear-scan index.
///
/// Both queries are O(n) in the number of stored motions. Adequate for
/// moderate tree sizes; the [`NearestNeighbors`] seam exists so a k-d tree
/// or similar structure can be substituted without touching the planner.
pub struct LinearNearestNeighbors<S> {
    entries: Vec<(MotionId, S)>,
    distance: Box<dyn Fn(&S, &S) -> f64>,
}

impl<S> LinearNearestNeighbors<S> {
    /// Constructs an empty index using the given distance function.
    pub fn new(distance: impl Fn(&S, &S) -> f64 + 'static) -> Self {
        LinearNearestNeighbors {
            entries: Vec::new(),
            distance: Box::new(distance),
        }
    }
}

impl<S> fmt::Debug for LinearNearestNeighbors<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearNearestNeighbors")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<S> NearestNeighbors<S> for LinearNearestNeighbors<S> {
    fn add(&mut self, id: MotionId, key: S) {
        self.entries.push((id, key));
    }

    fn nearest(&self, query: &S) -> Option<MotionId> {
        self.entries
            .iter()
            .min_by(|a, b| {
                let da = (self.distance)(query, &a.1);
                let db = (self.distance)(query, &b.1);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|&(id, _)| id)
    }

    fn within_radius(&self, query: &S, radius: f64) -> Vec<MotionId> {
        self.entries
            .iter()
            .filter(|(_, key)| (self.distance)(query, key) <= radius)
            .map(|&(id, _)| id)
            .collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

//
// Unit tests
//
