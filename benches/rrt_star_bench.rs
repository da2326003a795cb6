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

use codspeed_criterion_compat::{criterion_group, criterion_main, Criterion};
use optrrt::nearest::LinearNearestNeighbors;
use optrrt::planning::{Goal, RrtStar, RrtStarConfig, StateSpace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Basic 2D point for representing poses in the plane.
#[derive(Debug, PartialEq, Clone, Copy)]
struct Point2D {
    x: f64,
    y: f64,
}

impl Point2D {
    fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }

    fn distance(&self, other: &Point2D) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Open square world with seeded sampling for stable benchmarks.
struct Plane {
    rng: StdRng,
    size: f64,
}

impl StateSpace for Plane {
    type State = Point2D;

    fn sample(&mut self) -> Point2D {
        Point2D::new(
            self.rng.gen_range(0.0..=self.size),
            self.rng.gen_range(0.0..=self.size),
        )
    }

    fn distance(&self, a: &Point2D, b: &Point2D) -> f64 {
        a.distance(b)
    }

    fn steer(&self, from: &Point2D, toward: &Point2D, max_step: f64) -> Point2D {
        let length = from.distance(toward);
        let (dx, dy) = (toward.x - from.x, toward.y - from.y);
        Point2D::new(
            from.x + dx / length * max_step,
            from.y + dy / length * max_step,
        )
    }

    fn dimension(&self) -> usize {
        2
    }
}

struct DiscGoal {
    center: Point2D,
    radius: f64,
}

impl Goal<Point2D> for DiscGoal {
    fn is_satisfied(&self, state: &Point2D) -> bool {
        state.distance(&self.center) <= self.radius
    }

    fn distance_to_goal(&self, state: &Point2D) -> f64 {
        (state.distance(&self.center) - self.radius).max(0.0)
    }

    fn sample_goal(&mut self) -> Option<Point2D> {
        Some(self.center)
    }
}

fn run_planner(ball_radius_max: f64, iterations: u64) {
    let config = RrtStarConfig {
        max_distance: 1.0,
        ball_radius_const: 10.0,
        ball_radius_max,
        seed: Some(1),
        ..RrtStarConfig::default()
    };
    let nn = LinearNearestNeighbors::new(Point2D::distance);
    let mut planner = RrtStar::new(config, nn).expect("configuration should be valid");
    let mut space = Plane {
        rng: StdRng::seed_from_u64(1),
        size: 20.0,
    };
    let mut goal = DiscGoal {
        center: Point2D::new(18.0, 18.0),
        radius: 1.0,
    };

    let mut polls = 0;
    let result = planner.solve(
        &mut space,
        &mut goal,
        &Point2D::new(1.0, 1.0),
        |_, _| true,
        move || {
            polls += 1;
            polls > iterations
        },
    );
    assert!(result.is_ok(), "Expected Ok result, got Err");
}

fn bench_rrt_star(c: &mut Criterion) {
    c.bench_function("rrt_star", |b| b.iter(|| run_planner(2.0, 1000)));
}

fn bench_rrt_star_unbounded(c: &mut Criterion) {
    c.bench_function("rrt_star_unbounded", |b| b.iter(|| run_planner(0.0, 1000)));
}

criterion_group!(benches, bench_rrt_star, bench_rrt_star_unbounded);
criterion_main!(benches);
