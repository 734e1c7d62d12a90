#![warn(missing_docs)]

//! Math types for the NMG kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! boundary-representation work: points, vectors, plane equations,
//! bounding boxes, and the tolerance record every comparison is made
//! against. The [`oracle`] module holds the distance primitives that
//! the fusers and the point classifier all funnel through.

use nalgebra::Vector3;
use thiserror::Error;

mod bbox;
pub mod oracle;
mod plane;

pub use bbox::Aabb3;
pub use plane::PlaneEq;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Errors raised when a tolerance record is unusable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToleranceError {
    /// Distance tolerance is zero, negative or not finite.
    #[error("distance tolerance must be positive and finite, got {0}")]
    BadDistance(f64),

    /// Perpendicularity threshold is outside `[0, 1)`.
    #[error("perpendicular tolerance must lie in [0, 1), got {0}")]
    BadPerp(f64),

    /// `dist_sq` or `para` disagree with `dist` / `perp`.
    #[error("tolerance record is inconsistent: {0}")]
    Inconsistent(String),
}

/// Distance and angle thresholds below which entities are treated as equal.
///
/// `dist_sq` and `para` are carried alongside `dist` and `perp` so the hot
/// comparisons never take a square root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub dist: f64,
    /// `dist * dist`.
    pub dist_sq: f64,
    /// Cosine threshold under which two directions count as perpendicular.
    pub perp: f64,
    /// Cosine threshold above which two directions count as parallel (`1 - perp`).
    pub para: f64,
}

impl Tolerance {
    /// Default NMG tolerances (0.0005 linear, 1e-6 perpendicular).
    pub const DEFAULT: Self = Self {
        dist: 0.0005,
        dist_sq: 0.0005 * 0.0005,
        perp: 1e-6,
        para: 1.0 - 1e-6,
    };

    /// Build a tolerance from a distance and a perpendicularity threshold,
    /// deriving `dist_sq` and `para`.
    pub fn new(dist: f64, perp: f64) -> Result<Self, ToleranceError> {
        let tol = Self {
            dist,
            dist_sq: dist * dist,
            perp,
            para: 1.0 - perp,
        };
        tol.validate()?;
        Ok(tol)
    }

    /// Check that the record is usable.
    pub fn validate(&self) -> Result<(), ToleranceError> {
        if !self.dist.is_finite() || self.dist <= 0.0 {
            return Err(ToleranceError::BadDistance(self.dist));
        }
        if !self.perp.is_finite() || !(0.0..1.0).contains(&self.perp) {
            return Err(ToleranceError::BadPerp(self.perp));
        }
        let want_sq = self.dist * self.dist;
        if (self.dist_sq - want_sq).abs() > want_sq * 1e-9 {
            return Err(ToleranceError::Inconsistent(format!(
                "dist_sq {} != dist^2 {}",
                self.dist_sq, want_sq
            )));
        }
        if (self.para - (1.0 - self.perp)).abs() > 1e-12 {
            return Err(ToleranceError::Inconsistent(format!(
                "para {} != 1 - perp {}",
                self.para,
                1.0 - self.perp
            )));
        }
        Ok(())
    }

    /// True if a squared distance is within tolerance.
    pub fn is_zero_sq(&self, d_sq: f64) -> bool {
        d_sq < self.dist_sq
    }

    /// True if a (signed) distance is within tolerance.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.dist
    }

    /// True if the cosine of the angle between two unit directions
    /// says they are parallel or anti-parallel.
    pub fn is_parallel(&self, cos_angle: f64) -> bool {
        cos_angle.abs() >= self.para
    }

    /// True if the cosine of the angle between two unit directions
    /// says they are perpendicular.
    pub fn is_perpendicular(&self, cos_angle: f64) -> bool {
        cos_angle.abs() <= self.perp
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
