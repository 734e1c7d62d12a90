#![warn(missing_docs)]

//! Point classification for the NMG kernel.
//!
//! A point is classified against each loop of a face by its nearest
//! boundary feature: the side of the nearest edge interior (via the
//! edgeuse's left vector), or the wedge between the edges meeting at the
//! nearest vertex. Loop results are then combined with a parity rule
//! (outer loops minus holes). The same loop classifier decides whether a
//! crack in a loop is an "innie" or an "outie" for the radial harmonizer.

mod crack;
mod face;
mod loops;

pub use crack::{classify_crack, crack_partner, CrackKind};
pub use face::classify_point_vs_face;
pub use loops::{classify_point_vs_loop, classify_point_vs_loop_except};

/// Where a point lies relative to a loop or face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Inside the material bounded by the loop or face.
    In,
    /// Outside it.
    Out,
    /// On the boundary of an outer (`Same`) loop.
    OnSharedBoundary,
    /// On the boundary of a hole (`Opposite`) loop.
    OnAntiBoundary,
    /// Every candidate was geometrically degenerate.
    Unknown,
}

impl Classification {
    /// True for either boundary classification.
    pub fn is_on(self) -> bool {
        matches!(
            self,
            Classification::OnSharedBoundary | Classification::OnAntiBoundary
        )
    }
}

/// Classifier knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyOptions {
    /// Report [`NmgError::ToleranceAmbiguity`](nmg_kernel_topo::NmgError)
    /// when equidistant candidates disagree, instead of taking the first.
    pub strict_ties: bool,
    /// Distance, in multiples of `tol.dist`, a crack midpoint is nudged
    /// along the left vector when it first lands on the boundary.
    pub crack_perturbation: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            strict_ties: false,
            crack_perturbation: 10.0,
        }
    }
}
