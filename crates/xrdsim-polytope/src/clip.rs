//! Clipping of parallel lines by a convex polyhedron (Cyrus-Beck).
//!
//! Each line `p + t d` meets every face plane at
//! `t_i = (q_i - p) . n_i / (d . n_i)`. Faces whose outward normal opposes
//! `d` are potential entries, faces along `d` potential exits; the line is
//! inside between the largest entry and the smallest exit parameter.

use rayon::prelude::*;
use xrdsim_math::{Point3, Vec3};

/// Relative threshold on `|d . n| / (|d| |n|)` for a face parallel to the lines.
const PARALLEL_EPS: f64 = 1e-12;

/// Lengths of the segments of parallel lines inside a convex polyhedron.
///
/// * `line_points` - one point on each line
/// * `direction` - common unit direction of all lines
/// * `plane_points` - a point on each face plane
/// * `plane_normals` - outward normal of each face
///
/// Lines are unbounded in both directions. A line that misses the
/// interior (including one running parallel outside a face) gets exactly
/// `0.0`, as does every line when `direction` is zero or non-finite. The
/// batch is processed in parallel.
pub fn clip_lengths(
    line_points: &[Point3],
    direction: &Vec3,
    plane_points: &[Point3],
    plane_normals: &[Vec3],
) -> Vec<f64> {
    let faces: Vec<(Point3, Vec3, f64)> = plane_points
        .iter()
        .zip(plane_normals)
        .map(|(q, n)| (*q, *n, direction.dot(n)))
        .collect();
    let d_norm = direction.norm();
    if !(d_norm > 0.0 && d_norm.is_finite()) {
        return vec![0.0; line_points.len()];
    }

    line_points
        .par_iter()
        .map(|p| clip_one(p, &faces, d_norm))
        .collect()
}

fn clip_one(p: &Point3, faces: &[(Point3, Vec3, f64)], d_norm: f64) -> f64 {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;

    for (q, n, along) in faces {
        let t_num = (q - p).dot(n);
        if along.abs() <= PARALLEL_EPS * d_norm * n.norm() {
            // Parallel face: the whole line is either inside or outside it.
            if t_num < 0.0 {
                return 0.0;
            }
            continue;
        }
        let t = t_num / along;
        if *along < 0.0 {
            t_enter = t_enter.max(t);
        } else {
            t_exit = t_exit.min(t);
        }
    }

    if t_exit > t_enter {
        t_exit - t_enter
    } else {
        0.0
    }
}
