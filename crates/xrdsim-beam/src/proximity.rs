//! Closed-form proximity filter between a swept beam and bounding spheres.
//!
//! For an `s = 0` beam face `n . x <= d` the moving plane at time `s` has
//! normal `R(s) n` and offset `d + s n . T`. A sphere `(c, r)` can reach
//! into that halfspace only while
//!
//! ```text
//! f(s) = q0 sin(s a) + q1 cos(s a) + q2 s + q3 < 0
//! ```
//!
//! with `q0 = c . K n`, `q1 = -c . K^2 n`, `q2 = -n . T` and
//! `q3 = c . n - q1 - r - d`. The sphere can meet the beam only where this
//! holds for every face at once.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xrdsim_math::trig::{bisect, solve_half_angle};
use xrdsim_math::{Point3, Vec3};
use xrdsim_polytope::Halfspace;

use crate::{Beam, IntervalSet};

/// `|q2|` below this fraction of the sinusoidal coefficients counts as zero.
const DRIFT_EPS: f64 = 1e-12;

/// Bracket width at which bisection stops.
const ROOT_XTOL: f64 = 1e-14;

/// A bounding sphere standing in for a sample element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Centre.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Sphere around the vertex mean that reaches every point.
    ///
    /// Returns `None` for an empty point set.
    pub fn enclosing(points: &[Point3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords);
        let center = Point3::from(sum / points.len() as f64);
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f64, f64::max);
        Some(Self { center, radius })
    }
}

/// Signed clearance of a sphere from one moving beam face.
struct FaceClearance {
    q0: f64,
    q1: f64,
    q2: f64,
    q3: f64,
    alpha: f64,
}

impl FaceClearance {
    fn eval(&self, s: f64) -> f64 {
        let (sin, cos) = (s * self.alpha).sin_cos();
        self.q0 * sin + self.q1 * cos + self.q2 * s + self.q3
    }

    /// Roots of `f` in `(0, 1]`, ascending.
    fn roots(&self, max_iterations: usize) -> Vec<f64> {
        let scale = self.q0.abs().max(self.q1.abs()).max(self.q3.abs());
        if self.q2.abs() <= DRIFT_EPS * scale {
            let (a, b) = solve_half_angle(self.q1, self.q0, self.q3, self.alpha);
            return [a, b].into_iter().flatten().collect();
        }

        // f is monotone between its stationary points, so each sign change
        // between consecutive knots brackets exactly one root.
        let (a, b) = solve_half_angle(self.alpha * self.q0, -self.alpha * self.q1, self.q2, self.alpha);
        let knots: Vec<f64> = std::iter::once(0.0)
            .chain(a)
            .chain(b)
            .chain(std::iter::once(1.0))
            .collect();
        knots
            .windows(2)
            .filter(|w| self.eval(w[0]) * self.eval(w[1]) < 0.0)
            .filter_map(|w| bisect(|s| self.eval(s), w[0], w[1], max_iterations, ROOT_XTOL))
            .collect()
    }

    /// Sweep times at which `f < 0`.
    fn negative_set(&self, max_iterations: usize) -> IntervalSet {
        let mut ends = vec![0.0];
        ends.extend(self.roots(max_iterations));
        ends.push(1.0);
        ends.sort_by(f64::total_cmp);
        ends.dedup();

        let runs: Vec<(f64, f64)> = ends
            .windows(2)
            .filter(|w| self.eval(0.5 * (w[0] + w[1])) < 0.0)
            .map(|w| (w[0], w[1]))
            .collect();
        IntervalSet::from_sorted_runs(runs)
    }
}

impl Beam {
    /// Sweep times at which `sphere` may intersect the beam.
    ///
    /// Conservative: outside the returned set the sphere is certainly clear
    /// of the beam. Each root refinement is capped at `max_iterations`
    /// bisection steps. The result is a pure function of the inputs.
    pub fn proximity_intervals(&self, sphere: &Sphere, max_iterations: usize) -> IntervalSet {
        let mut merged = IntervalSet::full();
        for face in self.hull.faces() {
            let inside = self.face_clearance(&face.plane, sphere).negative_set(max_iterations);
            merged = merged.merge(&inside);
            if merged.is_empty() {
                log::trace!(
                    "sphere at {:?} r={} never reaches the beam",
                    sphere.center,
                    sphere.radius
                );
                return merged;
            }
        }
        merged
    }

    /// [`Beam::proximity_intervals`] for many spheres, in parallel.
    pub fn proximity_intervals_batch(
        &self,
        spheres: &[Sphere],
        max_iterations: usize,
    ) -> Vec<IntervalSet> {
        spheres
            .par_iter()
            .map(|sphere| self.proximity_intervals(sphere, max_iterations))
            .collect()
    }

    fn face_clearance(&self, plane: &Halfspace, sphere: &Sphere) -> FaceClearance {
        let form = self.sweep.decompose(&plane.normal, &sphere.center.coords);
        let d = -plane.offset;
        FaceClearance {
            q0: form.sin,
            q1: form.cos,
            q2: -plane.normal.dot(self.sweep.translation()),
            q3: form.constant - sphere.radius - d,
            alpha: self.sweep.angle(),
        }
    }
}
