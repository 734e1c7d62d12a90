//! Plane equations.

use crate::{Point3, Vec3};

/// A plane `normal · p = d` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneEq {
    /// Unit normal.
    pub normal: Vec3,
    /// Offset along the normal from the origin.
    pub d: f64,
}

impl PlaneEq {
    /// Build from a (not necessarily unit) normal and a point on the plane.
    ///
    /// Returns `None` when the normal has zero length.
    pub fn from_point_normal(point: &Point3, normal: &Vec3) -> Option<Self> {
        let len = normal.norm();
        if len <= f64::EPSILON || !len.is_finite() {
            return None;
        }
        let n = normal / len;
        Some(Self {
            normal: n,
            d: n.dot(&point.coords),
        })
    }

    /// Fit a plane through a closed polygon using Newell's method.
    ///
    /// The normal follows the right-hand rule over the point order.
    /// Returns `None` for fewer than three points or a polygon with no area.
    pub fn from_polygon(points: &[Point3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut normal = Vec3::zeros();
        let mut centroid = Vec3::zeros();
        for (i, p) in points.iter().enumerate() {
            let q = &points[(i + 1) % points.len()];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
            centroid += p.coords;
        }
        centroid /= points.len() as f64;

        // Scale-relative area check so tiny but valid faces still fit.
        let extent = points
            .iter()
            .map(|p| (p.coords - centroid).norm())
            .fold(0.0f64, f64::max);
        if normal.norm() <= extent * extent * 1e-12 {
            return None;
        }
        Self::from_point_normal(&Point3::from(centroid), &normal)
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    pub fn dist(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.d
    }

    /// The same plane with the normal reversed.
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project(&self, p: &Point3) -> Point3 {
        p - self.normal * self.dist(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_newell_square() {
        let pts = [
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        ];
        let pl = PlaneEq::from_polygon(&pts).unwrap();
        assert_relative_eq!(pl.normal, Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(pl.d, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pl.dist(&Point3::new(5.0, 5.0, 3.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_newell_clockwise_flips_normal() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let pl = PlaneEq::from_polygon(&pts).unwrap();
        assert_relative_eq!(pl.normal, -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_has_no_plane() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(PlaneEq::from_polygon(&pts).is_none());
        assert!(PlaneEq::from_polygon(&pts[..2]).is_none());
    }

    #[test]
    fn test_reverse_and_project() {
        let pl = PlaneEq::from_point_normal(&Point3::new(0.0, 0.0, 1.0), &Vec3::new(0.0, 0.0, 3.0))
            .unwrap();
        let r = pl.reversed();
        let p = Point3::new(2.0, 3.0, 4.0);
        assert_relative_eq!(r.dist(&p), -pl.dist(&p), epsilon = 1e-12);
        assert_relative_eq!(pl.project(&p), Point3::new(2.0, 3.0, 1.0), epsilon = 1e-12);
    }
}
