//! Axis-aligned bounding boxes used as broadphase filters by the fusers
//! and as the cheap early exit of the point classifier.

use crate::Point3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box holding every point of `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True if nothing has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grow this AABB to cover another one.
    pub fn include_box(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Overlap test with both boxes grown by `tol`.
    pub fn overlaps_tol(&self, other: &Aabb3, tol: f64) -> bool {
        self.min.x - tol <= other.max.x
            && self.max.x + tol >= other.min.x
            && self.min.y - tol <= other.max.y
            && self.max.y + tol >= other.min.y
            && self.min.z - tol <= other.max.z
            && self.max.z + tol >= other.min.z
    }

    /// Point containment with the box grown by `tol`.
    pub fn contains_tol(&self, p: &Point3, tol: f64) -> bool {
        p.x >= self.min.x - tol
            && p.x <= self.max.x + tol
            && p.y >= self.min.y - tol
            && p.y <= self.max.y + tol
            && p.z >= self.min.z - tol
            && p.z <= self.max.z + tol
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_and_contains() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        let b = Aabb3::from_points(&pts);
        assert!(!b.is_empty());
        assert!(b.contains_tol(&Point3::new(0.5, 1.0, 0.0), 0.0));
        assert!(!b.contains_tol(&Point3::new(0.5, 1.0, 0.1), 0.01));
        assert!(b.contains_tol(&Point3::new(0.5, 1.0, 0.005), 0.01));
    }

    #[test]
    fn test_overlap_with_tolerance() {
        let a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(1.001, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps_tol(&b, 0.01));
    }

    #[test]
    fn test_empty_box() {
        let mut b = Aabb3::empty();
        assert!(b.is_empty());
        b.include_box(&Aabb3::empty());
        assert!(b.is_empty());
        b.include_point(&Point3::new(3.0, 3.0, 3.0));
        assert_eq!(b.min, b.max);
    }
}
