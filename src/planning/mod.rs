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

//! Sampling-based planning algorithms and the collaborator contracts they
//! depend on.
//!
//! The planners never enumerate the space they search. Everything they need
//! from the problem arrives through the [`StateSpace`] and [`Goal`] traits
//! plus two closures passed to `solve`: a segment validity check and a
//! termination predicate.

pub mod rrt_star;

pub use rrt_star::{Outcome, PlanResult, PlannerData, PlannerVertex, RrtStar, RrtStarConfig};

/// The configuration space a planner searches.
///
/// `distance` must be symmetric and satisfy the triangle inequality;
/// `steer` must return a state at most `max_step` from `from` along the
/// direction of `toward`.
pub trait StateSpace {
    /// A point in the space, e.g. a robot pose.
    type State: Clone;

    /// Draws a uniformly random state.
    fn sample(&mut self) -> Self::State;

    /// Metric distance between two states. Non-negative and symmetric.
    fn distance(&self, a: &Self::State, b: &Self::State) -> f64;

    /// Returns an intermediate state exactly `max_step` along the segment
    /// from `from` towards `toward`.
    fn steer(&self, from: &Self::State, toward: &Self::State, max_step: f64) -> Self::State;

    /// Dimensionality of the space. Must be at least 1.
    fn dimension(&self) -> usize;
}

/// The region a planner is trying to reach.
pub trait Goal<S> {
    /// Whether the state satisfies the goal condition.
    fn is_satisfied(&self, state: &S) -> bool;

    /// Heuristic distance from the state to the goal region, used to track
    /// the best approximate solution. Zero for satisfying states.
    fn distance_to_goal(&self, state: &S) -> f64;

    /// Draws a state from the goal region for biased sampling, or None if
    /// the goal cannot produce explicit samples.
    fn sample_goal(&mut self) -> Option<S>;
}
