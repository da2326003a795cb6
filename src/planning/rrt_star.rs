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

//! Anytime optimizing RRT.
//!
//! Grows a tree of feasible motions by sampling the space, steering from
//! the nearest existing motion towards the sample, and inserting the result
//! under the cheapest feasible parent in a shrinking-radius neighborhood.
//! After every insertion the same neighborhood is rewired: any motion that
//! now has a cheaper route through the new one is re-parented, and the cost
//! improvement is pushed to its entire subtree. Given enough time the best
//! recorded path converges towards the optimum for the space's metric.
//!
//! See Karaman & Frazzoli, "Incremental Sampling-based Algorithms for
//! Optimal Motion Planning", RSS 2010.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;
use crate::nearest::NearestNeighbors;
use crate::planning::{Goal, StateSpace};
use crate::tree::{MotionId, Tree};

/// Tunable parameters for [`RrtStar`], validated once at construction.
#[derive(Debug, Clone)]
pub struct RrtStarConfig {
    /// Probability of sampling the goal instead of the space, in [0, 1].
    pub goal_bias: f64,

    /// Maximum length of any steered edge. Greatly influences runtime and
    /// has no sensible default; it must be set to a positive value.
    pub max_distance: f64,

    /// Multiplicative factor in the rewiring radius computation.
    pub ball_radius_const: f64,

    /// Upper bound on the rewiring radius. Zero means unbounded.
    pub ball_radius_max: f64,

    /// Optional maximum acceptable path cost. When a recorded solution is
    /// at or below this, the run stops early and the solution is exact.
    pub max_path_cost: Option<f64>,

    /// Optional RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for RrtStarConfig {
    fn default() -> Self {
        RrtStarConfig {
            goal_bias: 0.05,
            max_distance: 0.0,
            ball_radius_const: 1.0,
            ball_radius_max: 0.0,
            max_path_cost: None,
            seed: None,
        }
    }
}

impl RrtStarConfig {
    fn validate(&self) -> Result<(), Error> {
        if !self.goal_bias.is_finite() || !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(Error::Config {
                param: "goal_bias",
                reason: "must be in [0, 1]",
            });
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::Config {
                param: "max_distance",
                reason: "must be set to a positive step length",
            });
        }
        if !self.ball_radius_const.is_finite() || self.ball_radius_const <= 0.0 {
            return Err(Error::Config {
                param: "ball_radius_const",
                reason: "must be positive",
            });
        }
        if !self.ball_radius_max.is_finite() || self.ball_radius_max < 0.0 {
            return Err(Error::Config {
                param: "ball_radius_max",
                reason: "must be non-negative (0 means unbounded)",
            });
        }
        if let Some(cost) = self.max_path_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(Error::Config {
                    param: "max_path_cost",
                    reason: "must be non-negative when set",
                });
            }
        }
        Ok(())
    }
}

/// Classification of a finished run.
#[derive(Debug, Clone)]
pub enum Outcome<S> {
    /// A goal-satisfying path within the configured cost threshold, if any.
    Exact {
        /// States in root-to-goal order.
        path: Vec<S>,
        /// Accumulated path cost.
        cost: f64,
    },

    /// A best-effort path: either goal-satisfying but over the configured
    /// cost threshold (`goal_distance` is 0), or the path to the motion
    /// that got closest to the goal (`goal_distance` is positive).
    Approximate {
        /// States in root-to-leaf order.
        path: Vec<S>,
        /// Accumulated path cost.
        cost: f64,
        /// Remaining distance from the path's end to the goal region.
        goal_distance: f64,
    },

    /// Nothing beyond the root was ever inserted.
    NoSolution,
}

/// Result of a planning run.
#[derive(Debug, Clone)]
pub struct PlanResult<S> {
    /// The reported path, if any, and its classification.
    pub outcome: Outcome<S>,

    /// Cost of the reported path, or None when no path was produced.
    pub best_cost: Option<f64>,

    /// Number of loop iterations executed, including discarded ones.
    pub iterations: u64,

    /// Number of motions in the tree when the run stopped.
    pub tree_size: usize,
}

/// One exported tree vertex, for diagnostics and visualization.
#[derive(Debug, Clone)]
pub struct PlannerVertex<S> {
    /// The vertex's state.
    pub state: S,
    /// Index of the parent vertex, or None for the root.
    pub parent: Option<usize>,
    /// Accumulated path cost from the root.
    pub cost: f64,
}

/// Flat export of the exploration tree.
#[derive(Debug, Clone)]
pub struct PlannerData<S> {
    /// Every motion in insertion order; parent fields index this vector.
    pub vertices: Vec<PlannerVertex<S>>,
}

/// Anytime optimizing RRT planner.
///
/// Owns the exploration tree, the nearest-neighbor index, and the solution
/// bookkeeping. A single `solve` call runs the whole loop synchronously
/// until the termination predicate fires or a recorded solution beats the
/// configured cost threshold; calling `solve` again without [`clear`]
/// keeps growing the same tree, so planning can be resumed for a better
/// path.
///
/// [`clear`]: RrtStar::clear
pub struct RrtStar<S, N> {
    config: RrtStarConfig,
    nn: N,
    rng: StdRng,
    tree: Option<Tree<S>>,
    goal_motions: Vec<MotionId>,
    closest_to_goal: Option<(MotionId, f64)>,
}

impl<S, N> RrtStar<S, N>
where
    S: Clone,
    N: NearestNeighbors<S>,
{
    /// Constructs a planner from a validated configuration and an empty
    /// nearest-neighbor index. The index's distance function must agree
    /// with the state space passed to [`solve`](RrtStar::solve).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any parameter is out of range, in
    /// particular if `max_distance` was left unset.
    pub fn new(config: RrtStarConfig, nn: N) -> Result<Self, Error> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(RrtStar {
            config,
            nn,
            rng,
            tree: None,
            goal_motions: Vec::new(),
            closest_to_goal: None,
        })
    }

    /// The configuration the planner was built with.
    #[must_use]
    pub fn config(&self) -> &RrtStarConfig {
        &self.config
    }

    /// Drops every motion, empties the nearest-neighbor index, and forgets
    /// all recorded solutions. The next `solve` call starts from a fresh
    /// root. Safe to call on an already-cleared planner.
    pub fn clear(&mut self) {
        self.tree = None;
        self.nn.clear();
        self.goal_motions.clear();
        self.closest_to_goal = None;
    }

    /// Exports the current tree for diagnostics. Empty after [`clear`]
    /// (or before the first solve).
    ///
    /// [`clear`]: RrtStar::clear
    #[must_use]
    pub fn planner_data(&self) -> PlannerData<S> {
        let vertices = match &self.tree {
            Some(tree) => tree
                .ids()
                .map(|id| PlannerVertex {
                    state: tree.state(id).clone(),
                    parent: tree.parent(id).map(MotionId::index),
                    cost: tree.cost(id),
                })
                .collect(),
            None => Vec::new(),
        };
        PlannerData { vertices }
    }

    /// Runs the sample/steer/validate/insert/rewire loop until the
    /// termination predicate returns true or a recorded solution's cost is
    /// at or below the configured `max_path_cost`.
    ///
    /// The predicate is polled exactly once per iteration boundary, so an
    /// iteration in progress always completes. `start` is only consulted
    /// when the tree is empty; repeated calls continue the previous run.
    ///
    /// # Parameters
    ///
    /// - `space`: the configuration space to search
    /// - `goal`: the goal region, also used for biased sampling
    /// - `start`: the root configuration for a fresh tree
    /// - `is_valid_segment`: whether the straight-line motion between two
    ///   states is collision-free
    /// - `should_stop`: external termination predicate
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the space reports a zero dimension,
    /// and [`Error::InvariantViolation`] if the tree bookkeeping is ever
    /// found broken (a defect, not a property of the problem).
    #[allow(clippy::too_many_lines)]
    pub fn solve<Sp, G, FV, FT>(
        &mut self,
        space: &mut Sp,
        goal: &mut G,
        start: &S,
        mut is_valid_segment: FV,
        mut should_stop: FT,
    ) -> Result<PlanResult<S>, Error>
    where
        Sp: StateSpace<State = S>,
        G: Goal<S>,
        FV: FnMut(&S, &S) -> bool,
        FT: FnMut() -> bool,
    {
        let dimension = space.dimension();
        if dimension == 0 {
            return Err(Error::Config {
                param: "dimension",
                reason: "state space must have at least one dimension",
            });
        }

        // Root the tree on the first run and mirror the root into the
        // index; later calls keep growing the same tree.
        if self.tree.is_none() {
            let tree = Tree::new(start.clone());
            self.nn.add(tree.root(), start.clone());
            self.closest_to_goal = Some((tree.root(), goal.distance_to_goal(start)));
            if goal.is_satisfied(start) {
                self.goal_motions.push(tree.root());
            }
            self.tree = Some(tree);
        }
        let Some(tree) = self.tree.as_mut() else {
            return Err(Error::InvariantViolation("tree missing after rooting"));
        };

        log::debug!(
            "starting solve with {} motions, goal_bias {}, max_distance {}",
            tree.len(),
            self.config.goal_bias,
            self.config.max_distance
        );

        let mut iterations: u64 = 0;
        while !should_stop() {
            iterations += 1;

            // Sample the space, or the goal with probability goal_bias. A
            // goal that cannot produce a sample skips the iteration.
            let sampled = if self.rng.gen::<f64>() < self.config.goal_bias {
                match goal.sample_goal() {
                    Some(state) => state,
                    None => {
                        log::trace!("goal bias drawn but goal has no sample; skipping");
                        continue;
                    }
                }
            } else {
                space.sample()
            };

            // Nearest existing motion, then bound the edge length.
            let Some(nearest) = self.nn.nearest(&sampled) else {
                return Err(Error::InvariantViolation("nearest queried on empty index"));
            };
            let nearest_state = tree.state(nearest).clone();
            let new_state = if space.distance(&nearest_state, &sampled) > self.config.max_distance {
                space.steer(&nearest_state, &sampled, self.config.max_distance)
            } else {
                sampled
            };

            // Discard infeasible extensions and zero-length edges.
            if !is_valid_segment(&nearest_state, &new_state) {
                continue;
            }
            if let Some(existing) = self.nn.nearest(&new_state) {
                if space.distance(tree.state(existing), &new_state) <= 0.0 {
                    continue;
                }
            }

            // Shrinking-radius neighborhood around the candidate. With a
            // single motion the radius formula degenerates to zero, so the
            // nearest motion stands in for the whole neighborhood.
            let near: Vec<MotionId> = if tree.len() <= 1 {
                vec![nearest]
            } else {
                let radius = neighborhood_radius(&self.config, tree.len(), dimension);
                let mut near = self.nn.within_radius(&new_state, radius);
                if near.is_empty() {
                    near.push(nearest);
                }
                near
            };

            // Pick the cheapest feasible parent. The nearest motion is the
            // candidate of last resort; its segment was validated above, so
            // a neighbor only replaces it when strictly cheaper and itself
            // feasible.
            let mut parent = nearest;
            let mut new_cost = tree.cost(nearest) + space.distance(&nearest_state, &new_state);
            for &q in &near {
                if q == nearest {
                    continue;
                }
                let candidate = tree.cost(q) + space.distance(tree.state(q), &new_state);
                if candidate < new_cost && is_valid_segment(tree.state(q), &new_state) {
                    parent = q;
                    new_cost = candidate;
                }
            }

            let new_id = tree.insert(new_state.clone(), parent, new_cost);
            self.nn.add(new_id, new_state.clone());

            // Solution bookkeeping.
            let goal_distance = goal.distance_to_goal(&new_state);
            let improved = match self.closest_to_goal {
                Some((_, best)) => goal_distance < best,
                None => true,
            };
            if improved {
                self.closest_to_goal = Some((new_id, goal_distance));
            }
            if goal.is_satisfied(&new_state) {
                self.goal_motions.push(new_id);
                log::info!(
                    "goal reached with cost {:.4} after {} motions",
                    new_cost,
                    tree.len()
                );
            }

            // Rewire the neighborhood through the new motion, pushing any
            // cost improvement down the re-parented subtree.
            for &q in &near {
                if q == parent {
                    continue;
                }
                let candidate = new_cost + space.distance(&new_state, tree.state(q));
                if candidate < tree.cost(q) && is_valid_segment(&new_state, tree.state(q)) {
                    let delta = tree.cost(q) - candidate;
                    tree.set_parent(q, new_id, candidate);
                    tree.propagate_cost_delta(q, delta);
                    if tree.cost(q) < 0.0 {
                        return Err(Error::InvariantViolation("negative cost after rewiring"));
                    }
                    log::trace!("rewired motion {} saving {:.4}", q.index(), delta);
                }
            }

            if let Some(threshold) = self.config.max_path_cost {
                let best = best_goal_motion(&self.goal_motions, tree);
                if best.map_or(false, |(_, cost)| cost <= threshold) {
                    log::debug!("solution within max_path_cost {threshold}; stopping early");
                    break;
                }
            }
        }

        let result = match best_goal_motion(&self.goal_motions, tree) {
            Some((id, cost)) => {
                let path = tree.path_to_root(id)?;
                let exact = self.config.max_path_cost.map_or(true, |t| cost <= t);
                let outcome = if exact {
                    Outcome::Exact { path, cost }
                } else {
                    Outcome::Approximate {
                        path,
                        cost,
                        goal_distance: 0.0,
                    }
                };
                PlanResult {
                    outcome,
                    best_cost: Some(cost),
                    iterations,
                    tree_size: tree.len(),
                }
            }
            None if tree.len() <= 1 => PlanResult {
                outcome: Outcome::NoSolution,
                best_cost: None,
                iterations,
                tree_size: tree.len(),
            },
            None => match self.closest_to_goal {
                Some((id, goal_distance)) => {
                    let cost = tree.cost(id);
                    let path = tree.path_to_root(id)?;
                    PlanResult {
                        outcome: Outcome::Approximate {
                            path,
                            cost,
                            goal_distance,
                        },
                        best_cost: Some(cost),
                        iterations,
                        tree_size: tree.len(),
                    }
                }
                None => PlanResult {
                    outcome: Outcome::NoSolution,
                    best_cost: None,
                    iterations,
                    tree_size: tree.len(),
                },
            },
        };

        log::debug!(
            "solve finished: {} iterations, {} motions, best cost {:?}",
            iterations,
            tree.len(),
            result.best_cost
        );
        Ok(result)
    }
}

impl<S, N: std::fmt::Debug> std::fmt::Debug for RrtStar<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RrtStar")
            .field("config", &self.config)
            .field("nn", &self.nn)
            .field("tree_size", &self.tree.as_ref().map(Tree::len))
            .field("goal_motions", &self.goal_motions.len())
            .finish()
    }
}

/// Rewiring radius for a tree of `n` motions in a `d`-dimensional space:
/// `min(r_max, c * (ln n / n)^(1/d))`, with `r_max == 0` meaning no bound.
#[allow(clippy::cast_precision_loss)]
fn neighborhood_radius(config: &RrtStarConfig, n: usize, dimension: usize) -> f64 {
    debug_assert!(n > 1, "radius is undefined for trees of one motion");
    let n = n as f64;
    let d = dimension as f64;
    let radius = config.ball_radius_const * (n.ln() / n).powf(1.0 / d);
    if config.ball_radius_max > 0.0 {
        radius.min(config.ball_radius_max)
    } else {
        radius
    }
}

fn best_goal_motion<S>(goal_motions: &[MotionId], tree: &Tree<S>) -> Option<(MotionId, f64)> {
    goal_motions
        .iter()
        .map(|&id| (id, tree.cost(id)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

//
// Unit tests
//
