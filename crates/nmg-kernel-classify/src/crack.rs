//! Crack classification.
//!
//! A crack is an edgeuse whose loop also runs between the same two
//! vertices the other way. An innie crack cuts into the area its loop
//! bounds; an outie sticks out of it and bounds nothing.

use nmg_kernel_math::{Point3, Tolerance};
use nmg_kernel_topo::{EdgeuseId, Model, NmgError, Result};
use tracing::debug;

use crate::loops::classify_point_vs_loop_except;
use crate::{Classification, ClassifyOptions};

/// Which side of its loop a crack lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrackKind {
    /// Inside the area bounded by the rest of the loop.
    Innie,
    /// Outside it.
    Outie,
}

/// The edgeuse in `eu`'s loop running between the same vertices in the
/// opposite direction, if there is one.
pub fn crack_partner(model: &Model, eu: EdgeuseId) -> Option<EdgeuseId> {
    let lu = model.loopuse_of_eu(eu)?;
    let (a, b) = model.eu_vertices(eu);
    model
        .loop_edgeuses(lu)
        .iter()
        .copied()
        .find(|&other| other != eu && model.eu_vertices(other) == (b, a))
}

/// Decide whether the crack through `eu` is an innie or an outie.
///
/// The crack midpoint is classified against the loop with both crack
/// edgeuses left out. A midpoint on the boundary is nudged along the
/// left vector by `opts.crack_perturbation * tol.dist` and tried again.
pub fn classify_crack(
    model: &Model,
    eu: EdgeuseId,
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<CrackKind> {
    model.edgeuse(eu)?;
    let lu = model
        .loopuse_of_eu(eu)
        .ok_or_else(|| NmgError::InvalidTopology("wire edgeuses cannot be cracks".into()))?;
    let partner = crack_partner(model, eu)
        .ok_or_else(|| NmgError::InvalidTopology("edgeuse is not part of a crack".into()))?;
    let except = [eu, partner];

    let (a, b) = model.eu_points(eu);
    let mid = Point3::from((a.coords + b.coords) * 0.5);
    let first = classify_point_vs_loop_except(model, &mid, lu, &except, tol, opts)?;
    if let Some(kind) = kind_of(first) {
        debug!(?eu, ?kind, "crack classified");
        return Ok(kind);
    }

    let left = model
        .eu_left_vec(eu)?
        .ok_or_else(|| NmgError::InvalidTopology("crack edgeuse has no face".into()))?;
    let nudged = mid + left * (opts.crack_perturbation * tol.dist);
    let second = classify_point_vs_loop_except(model, &nudged, lu, &except, tol, opts)?;
    match kind_of(second) {
        Some(kind) => {
            debug!(?eu, ?kind, "crack classified after perturbation");
            Ok(kind)
        }
        None => Err(NmgError::UnknownClassification(format!(
            "crack midpoint is {:?}, then {:?} after perturbation",
            first, second
        ))),
    }
}

fn kind_of(class: Classification) -> Option<CrackKind> {
    match class {
        Classification::In => Some(CrackKind::Innie),
        Classification::Out => Some(CrackKind::Outie),
        _ => None,
    }
}
