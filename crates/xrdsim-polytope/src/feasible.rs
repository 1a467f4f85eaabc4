//! Interior points of halfspace sets.
//!
//! The Chebyshev centre is the centre of the largest ball inside every
//! halfspace. It solves the linear program
//!
//! ```text
//! maximize    r
//! subject to  n_i . x + |n_i| r <= -o_i      for every halfspace i
//! ```
//!
//! with `x` and `r` free. Writing `x = u - v` and `r = r0 + rho` with
//! `r0 = min_i(-o_i / |n_i|) - 1` makes `u = v = rho = 0` strictly feasible,
//! so a single-phase tableau simplex (Bland's rule, capped iterations)
//! starts directly from the slack basis.

use xrdsim_math::{Point3, Vec3};

use crate::Halfspace;

/// Pivot elements smaller than this are treated as zero.
const PIVOT_EPS: f64 = 1e-12;

/// Centre and radius of the largest inscribed ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChebyshevCenter {
    /// Ball centre.
    pub point: Point3,
    /// Ball radius: the smallest distance from `point` to any plane.
    /// Non-positive when the halfspaces have no common interior.
    pub radius: f64,
}

/// Find the Chebyshev centre of `halfspaces`.
///
/// Returns `None` for an empty set, when the region is unbounded, or when
/// the input is non-finite. If `max_iterations` pivots are exhausted the
/// current (feasible but possibly not optimal) vertex is returned.
pub fn chebyshev_center(halfspaces: &[Halfspace], max_iterations: usize) -> Option<ChebyshevCenter> {
    if halfspaces.is_empty() {
        return None;
    }
    let norms: Vec<f64> = halfspaces.iter().map(|h| h.normal.norm()).collect();
    if norms.iter().any(|n| !(*n > 0.0) || !n.is_finite())
        || halfspaces.iter().any(|h| !h.offset.is_finite())
    {
        return None;
    }
    let r0 = halfspaces
        .iter()
        .zip(&norms)
        .map(|(h, n)| -h.offset / n)
        .fold(f64::INFINITY, f64::min)
        - 1.0;

    let mut tableau = Tableau::new(halfspaces, &norms, r0);
    match tableau.maximize(max_iterations) {
        Outcome::Optimal => {}
        Outcome::IterationCap => {
            log::warn!(
                "chebyshev centre: simplex stopped after {} pivots, using current vertex",
                max_iterations
            );
        }
        Outcome::Unbounded => {
            log::debug!("chebyshev centre: halfspace region is unbounded");
            return None;
        }
    }

    let vars = tableau.solution();
    let point = Point3::new(vars[0] - vars[3], vars[1] - vars[4], vars[2] - vars[5]);

    // Re-measure the margin directly so the reported radius does not
    // carry the tableau's accumulated rounding.
    let radius = halfspaces
        .iter()
        .zip(&norms)
        .map(|(h, n)| -(h.normal.dot(&point.coords) + h.offset) / n)
        .fold(f64::INFINITY, f64::min);
    Some(ChebyshevCenter { point, radius })
}

enum Outcome {
    Optimal,
    Unbounded,
    IterationCap,
}

/// Dense tableau for `max c.z s.t. A z <= b, z >= 0` with `b >= 0`.
///
/// Columns: `u (3) | v (3) | rho (1) | slacks (m) | rhs`.
struct Tableau {
    rows: Vec<Vec<f64>>,
    objective: Vec<f64>,
    basis: Vec<usize>,
    columns: usize,
}

const STRUCTURAL: usize = 7;

impl Tableau {
    fn new(halfspaces: &[Halfspace], norms: &[f64], r0: f64) -> Self {
        let m = halfspaces.len();
        let columns = STRUCTURAL + m;
        let rows = halfspaces
            .iter()
            .zip(norms)
            .enumerate()
            .map(|(i, (h, &norm))| {
                let n: &Vec3 = &h.normal;
                let mut row = vec![0.0; columns + 1];
                row[0] = n.x;
                row[1] = n.y;
                row[2] = n.z;
                row[3] = -n.x;
                row[4] = -n.y;
                row[5] = -n.z;
                row[6] = norm;
                row[STRUCTURAL + i] = 1.0;
                row[columns] = -h.offset - norm * r0;
                row
            })
            .collect();

        // Reduced costs of the maximization: -c, with c = e_rho.
        let mut objective = vec![0.0; columns + 1];
        objective[6] = -1.0;

        Self {
            rows,
            objective,
            basis: (STRUCTURAL..columns).collect(),
            columns,
        }
    }

    fn maximize(&mut self, max_iterations: usize) -> Outcome {
        for _ in 0..max_iterations {
            // Bland's rule: lowest-index improving column.
            let Some(entering) = (0..self.columns).find(|&j| self.objective[j] < -PIVOT_EPS) else {
                return Outcome::Optimal;
            };

            // Ratio test, ties broken by lowest basic variable index.
            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[entering];
                if a <= PIVOT_EPS {
                    continue;
                }
                let ratio = row[self.columns] / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - PIVOT_EPS
                            || (ratio <= best_ratio + PIVOT_EPS && self.basis[i] < self.basis[best])
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            let Some((pivot_row, _)) = leaving else {
                return Outcome::Unbounded;
            };
            self.pivot(pivot_row, entering);
        }
        if (0..self.columns).any(|j| self.objective[j] < -PIVOT_EPS) {
            Outcome::IterationCap
        } else {
            Outcome::Optimal
        }
    }

    fn pivot(&mut self, pivot_row: usize, entering: usize) {
        let pivot = self.rows[pivot_row][entering];
        for value in self.rows[pivot_row].iter_mut() {
            *value /= pivot;
        }
        let pivot_values = self.rows[pivot_row].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            eliminate(row, &pivot_values, entering);
        }
        eliminate(&mut self.objective, &pivot_values, entering);
        self.basis[pivot_row] = entering;
    }

    /// Values of the structural variables at the current vertex.
    fn solution(&self) -> [f64; STRUCTURAL] {
        let mut vars = [0.0; STRUCTURAL];
        for (row, &var) in self.rows.iter().zip(&self.basis) {
            if var < STRUCTURAL {
                vars[var] = row[self.columns];
            }
        }
        vars
    }
}

/// Subtract the multiple of the pivot row that zeroes `row[entering]`.
fn eliminate(row: &mut [f64], pivot_values: &[f64], entering: usize) {
    let factor = row[entering];
    if factor == 0.0 {
        return;
    }
    for (value, p) in row.iter_mut().zip(pivot_values) {
        *value -= factor * p;
    }
}
