//! Oriented planes.

use xrdsim_math::{Point3, Vec3};

/// The closed region `{x : normal . x + offset <= 0}`.
///
/// The normal has unit length and points out of the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halfspace {
    /// Outward unit normal.
    pub normal: Vec3,
    /// Plane offset; `-offset` is the signed distance of the plane from the origin.
    pub offset: f64,
}

impl Halfspace {
    /// Create a halfspace from a normal (normalized here) and an offset scaled to match.
    ///
    /// Returns `None` for a zero or non-finite normal.
    pub fn new(normal: Vec3, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if norm == 0.0 || !norm.is_finite() || !offset.is_finite() {
            return None;
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Halfspace bounded by the plane through `point` with outward `normal`.
    pub fn from_point_normal(point: &Point3, normal: &Vec3) -> Option<Self> {
        Self::new(*normal, -normal.dot(&point.coords))
    }

    /// Signed distance from the plane; negative inside.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) + self.offset
    }

    /// Whether `p` lies inside or within `eps` of the boundary.
    pub fn contains(&self, p: &Point3, eps: f64) -> bool {
        self.signed_distance(p) <= eps
    }

    /// The same region expressed in coordinates relative to `origin`
    /// (`y = x - origin`).
    pub fn translated(&self, origin: &Point3) -> Self {
        Self {
            normal: self.normal,
            offset: self.offset + self.normal.dot(&origin.coords),
        }
    }

    /// A point on the boundary plane (the foot of the origin).
    pub fn point_on_plane(&self) -> Point3 {
        Point3::from(-self.offset * self.normal)
    }
}
