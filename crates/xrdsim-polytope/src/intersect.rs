//! Exact intersection of convex polytopes given as halfspace sets.

use nalgebra::Matrix3;
use xrdsim_math::{Point3, Tolerance, Vec3};

use crate::feasible::chebyshev_center;
use crate::hull::mean_point;
use crate::{ConvexHull, Halfspace};

/// Determinant below which three planes do not meet in a single point.
const SINGULAR_EPS: f64 = 1e-12;

/// Upper bound of the overlap tolerance relative to its inscribed radius.
const RADIUS_FRACTION: f64 = 1e-3;

/// Parameters of the overlap test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectOptions {
    /// Pivot cap for the interior-point linear program.
    pub max_lp_iterations: usize,
    /// Smallest inscribed-ball radius that counts as a real overlap.
    pub min_margin: f64,
    /// Geometric tolerance for vertex classification.
    pub tolerance: Tolerance,
}

impl Default for IntersectOptions {
    fn default() -> Self {
        Self {
            max_lp_iterations: 200,
            min_margin: 1e-9,
            tolerance: Tolerance::DEFAULT,
        }
    }
}

/// Intersect the regions of all `halfspaces`.
///
/// `reference` should be a point near the expected overlap; the
/// computation runs in coordinates centred on it. Returns `None` when
/// the largest ball fitting in every halfspace has radius at most
/// `options.min_margin` (disjoint, touching, or infeasible).
///
/// Vertex merging and the overlap hull use a tolerance bounded by a small
/// fraction of that radius, so overlaps much thinner than the solids they
/// come from keep their shape. An overlap that passes the margin test but
/// still yields no usable hull is logged and reported as `None`.
pub fn intersect_halfspaces(
    halfspaces: &[Halfspace],
    reference: &Point3,
    options: &IntersectOptions,
) -> Option<ConvexHull> {
    let local: Vec<Halfspace> = halfspaces.iter().map(|h| h.translated(reference)).collect();
    let center = chebyshev_center(&local, options.max_lp_iterations)?;
    if center.radius <= options.min_margin {
        return None;
    }

    let eps = overlap_eps(&options.tolerance, center.radius);
    let vertices: Vec<Point3> = halfspace_intersection(&local, &center.point, eps)
        .into_iter()
        .map(|p| p + reference.coords)
        .collect();
    match ConvexHull::with_eps(&vertices, eps) {
        Ok(hull) => Some(hull),
        Err(err) => {
            log::warn!(
                "overlap with inscribed radius {:e} dropped: {}",
                center.radius,
                err
            );
            None
        }
    }
}

/// Distance tolerance for an overlap whose inscribed ball has `radius`.
fn overlap_eps(tolerance: &Tolerance, radius: f64) -> f64 {
    tolerance.scaled(radius).min(radius * RADIUS_FRACTION)
}

/// Vertices of the polytope `{x : h.normal . x + h.offset <= 0 for all h}`.
///
/// `interior` must lie strictly inside every halfspace; vertices are found
/// as the feasible meeting points of plane triples, computed relative to
/// `interior`. Points closer than `eps` are merged.
pub fn halfspace_intersection(halfspaces: &[Halfspace], interior: &Point3, eps: f64) -> Vec<Point3> {
    let local: Vec<Halfspace> = halfspaces.iter().map(|h| h.translated(interior)).collect();
    let n = local.len();
    let mut vertices: Vec<Point3> = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (&local[i], &local[j], &local[k]);
                let m = Matrix3::from_rows(&[
                    a.normal.transpose(),
                    b.normal.transpose(),
                    c.normal.transpose(),
                ]);
                if m.determinant().abs() < SINGULAR_EPS {
                    continue;
                }
                let Some(inverse) = m.try_inverse() else {
                    continue;
                };
                let y = inverse * Vec3::new(-a.offset, -b.offset, -c.offset);
                let p = Point3::from(y);
                if !local.iter().all(|h| h.signed_distance(&p) <= eps) {
                    continue;
                }
                if vertices.iter().all(|v| (v - p).norm() > eps) {
                    vertices.push(p);
                }
            }
        }
    }

    vertices
        .into_iter()
        .map(|p| p + interior.coords)
        .collect()
}

/// Overlap of two convex hulls, `None` when they do not share interior.
pub fn intersect_hulls(
    a: &ConvexHull,
    b: &ConvexHull,
    options: &IntersectOptions,
) -> Option<ConvexHull> {
    let mut halfspaces = a.halfspaces();
    halfspaces.extend(b.halfspaces());
    let reference = mean_point(&[a.centroid(), b.centroid()]);
    intersect_halfspaces(&halfspaces, &reference, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cuboid(min: Point3, max: Point3) -> ConvexHull {
        let mut pts = Vec::new();
        for &x in &[min.x, max.x] {
            for &y in &[min.y, max.y] {
                for &z in &[min.z, max.z] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        ConvexHull::new_strict(&pts, &Tolerance::DEFAULT).unwrap()
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = cuboid(Point3::new(1.0, 0.5, -1.0), Point3::new(3.0, 1.5, 1.0));
        let overlap = intersect_hulls(&a, &b, &IntersectOptions::default()).unwrap();
        // [1,2] x [0.5,1.5] x [0,1]
        assert_relative_eq!(overlap.volume(), 1.0, epsilon = 1e-9);
        assert_eq!(overlap.vertices().len(), 8);
        assert!((overlap.centroid() - Point3::new(1.5, 1.0, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn test_nested_boxes() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));
        let b = cuboid(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 3.0, 2.5));
        let overlap = intersect_hulls(&a, &b, &IntersectOptions::default()).unwrap();
        assert_relative_eq!(overlap.volume(), b.volume(), epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = cuboid(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        assert!(intersect_hulls(&a, &b, &IntersectOptions::default()).is_none());
    }

    #[test]
    fn test_face_contact_is_not_an_overlap() {
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(intersect_hulls(&a, &b, &IntersectOptions::default()).is_none());
    }

    #[test]
    fn test_tetrahedron_cut_by_box() {
        let tet = ConvexHull::new_strict(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(0.0, 0.0, 2.0),
            ],
            &Tolerance::DEFAULT,
        )
        .unwrap();
        // Slab z <= 1 keeps the tetrahedron minus its top corner tetrahedron.
        let slab = cuboid(Point3::new(-5.0, -5.0, -5.0), Point3::new(5.0, 5.0, 1.0));
        let overlap = intersect_hulls(&tet, &slab, &IntersectOptions::default()).unwrap();
        let full = 8.0 / 6.0;
        let top = 1.0 / 6.0;
        assert_relative_eq!(overlap.volume(), full - top, epsilon = 1e-9);
        assert_eq!(overlap.vertices().len(), 6);
        // corner mean and centre of mass differ for this solid
        let mean = Point3::new(2.0 / 3.0, 2.0 / 3.0, 0.5);
        let com = Point3::new(15.0 / 28.0, 15.0 / 28.0, 11.0 / 28.0);
        assert!((overlap.centroid() - mean).norm() < 1e-9);
        assert!((overlap.center_of_mass() - com).norm() < 1e-9);
    }

    fn long_box() -> ConvexHull {
        cuboid(Point3::new(-20.0, -1.0, -1.0), Point3::new(20.0, 1.0, 1.0))
    }

    fn lid(depth: f64) -> ConvexHull {
        cuboid(Point3::new(-30.0, -0.3, 1.0 - depth), Point3::new(30.0, 0.3, 3.0))
    }

    #[test]
    fn test_thin_overlap_keeps_volume() {
        let options = IntersectOptions::default();
        for depth in [4e-8, 2e-8] {
            let overlap = intersect_hulls(&long_box(), &lid(depth), &options).unwrap();
            assert_eq!(overlap.vertices().len(), 8);
            assert_eq!(overlap.faces().len(), 6);
            assert_relative_eq!(overlap.volume(), 40.0 * 0.6 * depth, max_relative = 1e-6);
            assert!((overlap.centroid() - Point3::new(0.0, 0.0, 1.0 - depth / 2.0)).norm() < 1e-9);
            assert!(overlap.eps() < depth);
        }
    }

    #[test]
    fn test_overlap_below_margin_is_none() {
        assert!(intersect_hulls(&long_box(), &lid(1e-9), &IntersectOptions::default()).is_none());
    }

    #[test]
    fn test_overlap_eps_bounded_by_radius() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(overlap_eps(&tol, 0.5), 1e-9);
        assert_relative_eq!(overlap_eps(&tol, 2e-8), 2e-11, max_relative = 1e-12);
        assert_relative_eq!(overlap_eps(&tol, 100.0), 1e-7, max_relative = 1e-12);
    }

    #[test]
    fn test_default_lp_iterations() {
        assert_eq!(IntersectOptions::default().max_lp_iterations, 200);
    }

    #[test]
    fn test_halfspace_intersection_vertices() {
        let cube = cuboid(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let vertices = halfspace_intersection(&cube.halfspaces(), &Point3::origin(), 1e-9);
        assert_eq!(vertices.len(), 8);
        for v in &vertices {
            assert!((v.x.abs() - 1.0).abs() < 1e-12);
            assert!((v.y.abs() - 1.0).abs() < 1e-12);
            assert!((v.z.abs() - 1.0).abs() < 1e-12);
        }
    }
}
