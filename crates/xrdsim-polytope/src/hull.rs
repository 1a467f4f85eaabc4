//! Convex hulls of small 3D point sets.
//!
//! The triangulated hull comes from parry's quickhull, run on a copy of the
//! points mapped onto their principal axes so that long thin solids are as
//! well conditioned as cubes. Coplanar triangles are then merged back into
//! polygonal faces in the original coordinates.

use nalgebra::SymmetricEigen;
use parry3d_f64::mass_properties::MassProperties;
use parry3d_f64::transformation::try_convex_hull;
use xrdsim_math::{Mat3, Point3, Tolerance, Vec3};

use crate::{Halfspace, PolytopeError, Result};

/// A face of a convex hull.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Outward face plane.
    pub plane: Halfspace,
    /// Indices into [`ConvexHull::vertices`], counter-clockwise seen from outside.
    pub vertices: Vec<usize>,
}

/// A full-dimensional convex polytope.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point3>,
    faces: Vec<Face>,
    volume: f64,
    centroid: Point3,
    center_of_mass: Point3,
    eps: f64,
}

impl ConvexHull {
    /// Build the hull of `points`, discarding points that are not corners.
    ///
    /// # Errors
    ///
    /// [`PolytopeError::DegenerateGeometry`] if fewer than four points are
    /// given, any point is non-finite, or the points are coplanar.
    pub fn new(points: &[Point3], tol: &Tolerance) -> Result<Self> {
        Self::build(points, tol.scaled(spread(points)), false)
    }

    /// Build the hull of `points`, requiring every point to be a corner.
    ///
    /// # Errors
    ///
    /// As [`ConvexHull::new`], and additionally when a point is duplicated
    /// or lies inside the hull, on a face or on an edge.
    pub fn new_strict(points: &[Point3], tol: &Tolerance) -> Result<Self> {
        Self::build(points, tol.scaled(spread(points)), true)
    }

    /// Build the hull of `points` with an absolute distance tolerance.
    ///
    /// Use this when the caller knows a length scale tighter than the
    /// extent of the points, such as the inscribed radius of a thin region.
    ///
    /// # Errors
    ///
    /// As [`ConvexHull::new`], and when `eps` is not positive and finite.
    pub fn with_eps(points: &[Point3], eps: f64) -> Result<Self> {
        Self::build(points, eps, false)
    }

    fn build(points: &[Point3], eps: f64, strict: bool) -> Result<Self> {
        if points.len() < 4 {
            return Err(PolytopeError::DegenerateGeometry(format!(
                "a convex hull needs at least 4 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(PolytopeError::DegenerateGeometry(
                "non-finite point coordinates".to_string(),
            ));
        }
        if !(eps > 0.0 && eps.is_finite()) {
            return Err(PolytopeError::DegenerateGeometry(format!(
                "invalid hull tolerance {}",
                eps
            )));
        }

        let mut unique: Vec<Point3> = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            match unique.iter().position(|q| (q - p).norm() <= eps) {
                Some(j) if strict => {
                    return Err(PolytopeError::DegenerateGeometry(format!(
                        "points {} and {} coincide",
                        j, i
                    )));
                }
                Some(_) => {}
                None => unique.push(*p),
            }
        }

        let frame = PrincipalFrame::new(&unique, eps)?;
        let local: Vec<Point3> = unique.iter().map(|p| frame.apply(p)).collect();
        let (hull_points, triangles) = try_convex_hull(&local).map_err(|err| {
            PolytopeError::DegenerateGeometry(format!("convex hull failed: {:?}", err))
        })?;
        let hull_indices: Vec<usize> = hull_points.iter().map(|q| nearest(&local, q)).collect();

        let interior = mean_point(&unique);
        let planes = merge_face_planes(&unique, &hull_indices, &triangles, &interior, eps);
        if planes.len() < 4 {
            return Err(PolytopeError::DegenerateGeometry(
                "points are coplanar".to_string(),
            ));
        }

        // Corners lie on at least three distinct face planes; hull points on
        // one plane are face interiors, on two planes edge interiors.
        let mut corners: Vec<Point3> = Vec::new();
        for &i in &hull_indices {
            let p = unique[i];
            let on_planes = planes
                .iter()
                .filter(|h| h.signed_distance(&p).abs() <= eps)
                .count();
            if on_planes >= 3 && corners.iter().all(|c| (c - p).norm() > eps) {
                corners.push(p);
            }
        }
        if strict && corners.len() != points.len() {
            return Err(PolytopeError::DegenerateGeometry(format!(
                "only {} of {} points are in strictly convex position",
                corners.len(),
                points.len()
            )));
        }

        let faces: Vec<Face> = planes
            .into_iter()
            .map(|plane| Face {
                vertices: ordered_face_loop(&corners, &plane, eps),
                plane,
            })
            .filter(|f| f.vertices.len() >= 3)
            .collect();
        if faces.len() < 4 {
            return Err(PolytopeError::DegenerateGeometry(
                "points are coplanar".to_string(),
            ));
        }

        let fan: Vec<[u32; 3]> = faces
            .iter()
            .flat_map(|f| {
                let a = f.vertices[0] as u32;
                f.vertices[1..]
                    .windows(2)
                    .map(move |w| [a, w[0] as u32, w[1] as u32])
            })
            .collect();
        let mass = MassProperties::from_convex_polyhedron(1.0, &corners, &fan);
        let volume = mass.mass();
        if !(volume > 0.0 && volume.is_finite()) {
            return Err(PolytopeError::DegenerateGeometry(
                "hull encloses no volume".to_string(),
            ));
        }

        Ok(Self {
            centroid: mean_point(&corners),
            center_of_mass: mass.local_com,
            vertices: corners,
            faces,
            volume,
            eps,
        })
    }

    /// Corner points of the hull.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Faces with outward planes and ordered vertex loops.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Outward halfspaces, one per face.
    pub fn halfspaces(&self) -> Vec<Halfspace> {
        self.faces.iter().map(|f| f.plane).collect()
    }

    /// One point and the outward normal of every face plane.
    pub fn face_planes(&self) -> (Vec<Point3>, Vec<Vec3>) {
        self.faces
            .iter()
            .map(|f| (self.vertices[f.vertices[0]], f.plane.normal))
            .unzip()
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Mean of the corner points.
    pub fn centroid(&self) -> Point3 {
        self.centroid
    }

    /// Centre of mass of the enclosed uniform solid.
    pub fn center_of_mass(&self) -> Point3 {
        self.center_of_mass
    }

    /// Distance tolerance the hull was built with.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: &Point3) -> bool {
        self.faces.iter().all(|f| f.plane.contains(p, self.eps))
    }
}

pub(crate) fn mean_point(points: &[Point3]) -> Point3 {
    let sum = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f64)
}

/// Largest distance of a point from the mean; NaN for non-finite input.
fn spread(points: &[Point3]) -> f64 {
    let mean = mean_point(points);
    points.iter().map(|p| (p - mean).norm()).fold(0.0, f64::max)
}

fn nearest(points: &[Point3], q: &Point3) -> usize {
    let mut best = (0, f64::INFINITY);
    for (i, p) in points.iter().enumerate() {
        let d = (p - q).norm_squared();
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0
}

/// Affine map onto the principal axes, each axis scaled to unit range.
struct PrincipalFrame {
    origin: Point3,
    axes: Mat3,
    range: Vec3,
}

impl PrincipalFrame {
    fn new(points: &[Point3], eps: f64) -> Result<Self> {
        let origin = mean_point(points);
        let covariance = points.iter().fold(Mat3::zeros(), |acc, p| {
            let d = p - origin;
            acc + d * d.transpose()
        });
        let axes = SymmetricEigen::new(covariance).eigenvectors;

        let mut lo = Vec3::repeat(f64::INFINITY);
        let mut hi = Vec3::repeat(f64::NEG_INFINITY);
        for p in points {
            let q = axes.tr_mul(&(p - origin));
            lo = lo.inf(&q);
            hi = hi.sup(&q);
        }
        let range = hi - lo;
        if !(range.min() > eps) {
            return Err(PolytopeError::DegenerateGeometry(
                "points are coplanar".to_string(),
            ));
        }
        Ok(Self { origin, axes, range })
    }

    fn apply(&self, p: &Point3) -> Point3 {
        Point3::from(self.axes.tr_mul(&(p - self.origin)).component_div(&self.range))
    }
}

/// Outward face planes of a triangulated hull, merging triangles that lie
/// within `eps` of a plane already found.
fn merge_face_planes(
    points: &[Point3],
    hull_indices: &[usize],
    triangles: &[[u32; 3]],
    interior: &Point3,
    eps: f64,
) -> Vec<Halfspace> {
    let mut candidates: Vec<(f64, [Point3; 3], Halfspace)> = triangles
        .iter()
        .filter_map(|t| {
            let [a, b, c] = t.map(|i| points[hull_indices[i as usize]]);
            let normal = (b - a).cross(&(c - a));
            let plane = Halfspace::from_point_normal(&a, &normal)?;
            let plane = if plane.signed_distance(interior) > 0.0 {
                Halfspace {
                    normal: -plane.normal,
                    offset: -plane.offset,
                }
            } else {
                plane
            };
            Some((normal.norm(), [a, b, c], plane))
        })
        .collect();
    // Large triangles first so each face plane is fixed by its best-conditioned piece.
    candidates.sort_by(|x, y| y.0.partial_cmp(&x.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut planes: Vec<Halfspace> = Vec::new();
    for (_, corners, plane) in candidates {
        let merged = planes.iter().any(|h| {
            h.normal.dot(&plane.normal) > 0.0
                && corners.iter().all(|p| h.signed_distance(p).abs() <= eps)
        });
        if !merged {
            planes.push(plane);
        }
    }
    planes
}

/// Corners on `plane`, sorted counter-clockwise around the outward normal.
fn ordered_face_loop(corners: &[Point3], plane: &Halfspace, eps: f64) -> Vec<usize> {
    let mut on_face: Vec<usize> = (0..corners.len())
        .filter(|&i| plane.signed_distance(&corners[i]).abs() <= eps)
        .collect();
    if on_face.len() < 3 {
        return on_face;
    }

    let center = mean_point(&on_face.iter().map(|&i| corners[i]).collect::<Vec<_>>());
    let u = (corners[on_face[0]] - center).normalize();
    let v = plane.normal.cross(&u);
    let angle = |i: usize| {
        let d = corners[i] - center;
        d.dot(&v).atan2(d.dot(&u))
    };
    on_face.sort_by(|&a, &b| {
        angle(a)
            .partial_cmp(&angle(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    on_face
}
