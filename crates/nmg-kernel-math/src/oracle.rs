//! Tolerance-aware equality oracle.
//!
//! Every "are these the same?" decision in the fusers and the point
//! classifier goes through these primitives, so they all agree on what
//! coincident means. Squared distances are compared against
//! `tol.dist_sq` wherever possible.

use crate::{PlaneEq, Point3, Tolerance, Vec3};

/// Where a point lies relative to a line segment `a → b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentProximity {
    /// Within tolerance of the segment interior. `param` is the
    /// parametric position of the PCA along `a → b`, in `(0, 1)`.
    OnSegment {
        /// Parametric position of the PCA.
        param: f64,
    },
    /// Within tolerance of endpoint `a`.
    NearA,
    /// Within tolerance of endpoint `b`.
    NearB,
    /// Off the segment; the PCA clamps to `a` (the point is "left" of `a`).
    PcaNearA {
        /// Squared distance from the point to `a`.
        dist_sq: f64,
    },
    /// Off the segment; the PCA clamps to `b` (the point is "right" of `b`).
    PcaNearB {
        /// Squared distance from the point to `b`.
        dist_sq: f64,
    },
    /// Off the segment; the PCA lies in the segment interior.
    Offset {
        /// Squared perpendicular distance.
        dist_sq: f64,
    },
}

impl SegmentProximity {
    /// True for the three statuses that put the point on the segment.
    pub fn is_on(&self) -> bool {
        matches!(self, Self::OnSegment { .. } | Self::NearA | Self::NearB)
    }

    /// Squared distance from the point to the segment. Zero when on it.
    pub fn dist_sq(&self) -> f64 {
        match *self {
            Self::OnSegment { .. } | Self::NearA | Self::NearB => 0.0,
            Self::PcaNearA { dist_sq } | Self::PcaNearB { dist_sq } | Self::Offset { dist_sq } => {
                dist_sq
            }
        }
    }
}

/// Result of [`distance_point_to_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance {
    /// Classification of the point against the segment.
    pub status: SegmentProximity,
    /// Point of closest approach on the segment.
    pub pca: Point3,
}

/// Classify point `p` against segment `a → b`.
///
/// Endpoint proximity is tested before the interior, so a point within
/// tolerance of both an endpoint and the interior reports the endpoint.
/// A zero-length segment reports `NearA` or `PcaNearA`. Non-finite input
/// reports `Offset` with infinite distance.
pub fn distance_point_to_segment(
    p: &Point3,
    a: &Point3,
    b: &Point3,
    tol: &Tolerance,
) -> SegmentDistance {
    if !(finite(p) && finite(a) && finite(b)) {
        return SegmentDistance {
            status: SegmentProximity::Offset {
                dist_sq: f64::INFINITY,
            },
            pca: *a,
        };
    }

    let a_to_p = p - a;
    let pa_sq = a_to_p.norm_squared();
    if pa_sq < tol.dist_sq {
        return SegmentDistance {
            status: SegmentProximity::NearA,
            pca: *a,
        };
    }
    let pb_sq = (p - b).norm_squared();
    if pb_sq < tol.dist_sq {
        return SegmentDistance {
            status: SegmentProximity::NearB,
            pca: *b,
        };
    }

    let a_to_b = b - a;
    let ab_sq = a_to_b.norm_squared();
    if ab_sq <= f64::EPSILON * f64::EPSILON {
        return SegmentDistance {
            status: SegmentProximity::PcaNearA { dist_sq: pa_sq },
            pca: *a,
        };
    }

    // Projection of A->P onto A->B, as a fraction of |AB|.
    let t = a_to_p.dot(&a_to_b) / ab_sq;
    if t <= 0.0 {
        return SegmentDistance {
            status: SegmentProximity::PcaNearA { dist_sq: pa_sq },
            pca: *a,
        };
    }
    if t >= 1.0 {
        return SegmentDistance {
            status: SegmentProximity::PcaNearB { dist_sq: pb_sq },
            pca: *b,
        };
    }

    let pca = a + a_to_b * t;
    let d_sq = (p - pca).norm_squared();
    let status = if d_sq < tol.dist_sq {
        SegmentProximity::OnSegment { param: t }
    } else {
        SegmentProximity::Offset { dist_sq: d_sq }
    };
    SegmentDistance { status, pca }
}

fn finite(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// True if two points are within `tol.dist` of each other.
pub fn points_coincide(a: &Point3, b: &Point3, tol: &Tolerance) -> bool {
    (a - b).norm_squared() < tol.dist_sq
}

/// Squared distance from `p` to the infinite line through `origin` along `dir`.
///
/// `dir` need not be unit length; a zero `dir` degrades to point distance.
pub fn dist_sq_point_line(p: &Point3, origin: &Point3, dir: &Vec3) -> f64 {
    let v = p - origin;
    let len_sq = dir.norm_squared();
    if len_sq <= f64::EPSILON * f64::EPSILON {
        return v.norm_squared();
    }
    let along = v.dot(dir);
    (v.norm_squared() - along * along / len_sq).max(0.0)
}

/// Signed distance from `p` to a plane.
pub fn dist_point_plane(p: &Point3, plane: &PlaneEq) -> f64 {
    plane.dist(p)
}

/// True if `p` lies within `tol.dist` of the plane.
pub fn point_on_plane(p: &Point3, plane: &PlaneEq, tol: &Tolerance) -> bool {
    tol.is_zero(plane.dist(p))
}

/// True if two infinite lines coincide within tolerance: the directions
/// are parallel and each origin lies on the other line.
pub fn lines_coincide(
    origin_a: &Point3,
    dir_a: &Vec3,
    origin_b: &Point3,
    dir_b: &Vec3,
    tol: &Tolerance,
) -> bool {
    let (la, lb) = (dir_a.norm(), dir_b.norm());
    if la <= f64::EPSILON || lb <= f64::EPSILON {
        return false;
    }
    let cos = dir_a.dot(dir_b) / (la * lb);
    if !tol.is_parallel(cos) {
        return false;
    }
    dist_sq_point_line(origin_b, origin_a, dir_a) < tol.dist_sq
        && dist_sq_point_line(origin_a, origin_b, dir_b) < tol.dist_sq
}

/// How two plane equations relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coplanarity {
    /// Same plane, normals agree.
    Aligned,
    /// Same plane, normals opposed.
    AntiAligned,
    /// Parallel but offset by more than tolerance.
    Parallel,
    /// Not parallel.
    Skew,
}

/// Compare two planes by normal direction and offset.
pub fn planes_coplanar(a: &PlaneEq, b: &PlaneEq, tol: &Tolerance) -> Coplanarity {
    let cos = a.normal.dot(&b.normal);
    if !tol.is_parallel(cos) {
        return Coplanarity::Skew;
    }
    if cos > 0.0 {
        if tol.is_zero(a.d - b.d) {
            Coplanarity::Aligned
        } else {
            Coplanarity::Parallel
        }
    } else if tol.is_zero(a.d + b.d) {
        Coplanarity::AntiAligned
    } else {
        Coplanarity::Parallel
    }
}

/// Angle of `v` in the frame `(x, y)`, normalized to `[0, 2π)`.
pub fn angle_in_frame(v: &Vec3, x: &Vec3, y: &Vec3) -> f64 {
    let ang = v.dot(y).atan2(v.dot(x));
    if ang < 0.0 {
        let wrapped = ang + std::f64::consts::TAU;
        // -0.0 and tiny negatives round up to exactly TAU; fold them to 0.
        if wrapped >= std::f64::consts::TAU {
            0.0
        } else {
            wrapped
        }
    } else {
        ang
    }
}
