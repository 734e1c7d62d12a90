//! Point-vs-loop classification.

use std::f64::consts::TAU;

use nmg_kernel_math::oracle::{
    angle_in_frame, distance_point_to_segment, points_coincide, SegmentProximity,
};
use nmg_kernel_math::{Point3, Tolerance, Vec3};
use nmg_kernel_topo::{
    EdgeuseId, LoopContents, LoopuseId, Model, NmgError, Orientation, Result, VertexId,
};
use tracing::{debug, trace};

use crate::{Classification, ClassifyOptions};

/// One boundary feature near the point.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    eu: EdgeuseId,
    status: SegmentProximity,
    pca: Point3,
    dist_sq: f64,
}

/// Classify `pt` against one loop of a face.
///
/// `In` means the point is on the material side of the loop: inside an
/// outer loop, or outside the hole of an `Opposite` loop.
pub fn classify_point_vs_loop(
    model: &Model,
    pt: &Point3,
    lu: LoopuseId,
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<Classification> {
    classify_point_vs_loop_except(model, pt, lu, &[], tol, opts)
}

/// [`classify_point_vs_loop`] with some edgeuses of the loop ignored.
/// Used to classify a crack against the rest of its loop.
pub fn classify_point_vs_loop_except(
    model: &Model,
    pt: &Point3,
    lu: LoopuseId,
    except: &[EdgeuseId],
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<Classification> {
    let loopuse = model.loopuse(lu)?;
    let fu = model
        .faceuse_of_lu(lu)
        .ok_or_else(|| NmgError::InvalidTopology("wire loops bound no area".into()))?;
    let (far, on) = match loopuse.orientation {
        Orientation::Opposite => (Classification::In, Classification::OnAntiBoundary),
        _ => (Classification::Out, Classification::OnSharedBoundary),
    };

    if !model.loop_bbox(lu).contains_tol(pt, tol.dist) {
        trace!(?lu, "point outside loop bounding box");
        return Ok(far);
    }

    if let LoopContents::Vertex(vu) = &loopuse.contents {
        let p = model.vertices[model.vertexuses[*vu].vertex].point;
        return Ok(if points_coincide(pt, &p, tol) { on } else { far });
    }

    let eus = drop_pleats(
        model,
        model
            .loop_edgeuses(lu)
            .iter()
            .copied()
            .filter(|eu| !except.contains(eu))
            .collect(),
    );
    if eus.is_empty() {
        return Ok(far);
    }

    let mut candidates = Vec::with_capacity(eus.len());
    for &eu in &eus {
        let (a, b) = model.eu_points(eu);
        let d = distance_point_to_segment(pt, &a, &b, tol);
        if d.status.is_on() {
            return Ok(on);
        }
        candidates.push(Candidate {
            eu,
            status: d.status,
            pca: d.pca,
            dist_sq: d.status.dist_sq(),
        });
    }
    // Stable, so equidistant candidates keep loop order.
    candidates.sort_by(|a, b| a.dist_sq.total_cmp(&b.dist_sq));

    let normal = model.faceuse_normal(fu)?;
    let mut winner: Option<(bool, f64, EdgeuseId)> = None;
    for c in &candidates {
        let dist = c.dist_sq.sqrt();
        if let Some((_, best, _)) = winner {
            if dist - best > tol.dist {
                break;
            }
        }
        let verdict = match c.status {
            SegmentProximity::Offset { .. } => offset_side(model, pt, c)?,
            SegmentProximity::PcaNearA { .. } => {
                wedge_side(model, pt, model.eu_start(c.eu), &eus, &normal, tol)
            }
            SegmentProximity::PcaNearB { .. } => {
                wedge_side(model, pt, model.eu_end(c.eu), &eus, &normal, tol)
            }
            SegmentProximity::OnSegment { .. }
            | SegmentProximity::NearA
            | SegmentProximity::NearB => return Ok(on),
        };
        let Some(inside) = verdict else {
            // Demoted to the back of the queue; the next candidate decides.
            debug!(eu = ?c.eu, dist, "degenerate wedge, demoting candidate");
            continue;
        };
        match winner {
            None => {
                winner = Some((inside, dist, c.eu));
                if !opts.strict_ties {
                    break;
                }
            }
            Some((first, _, first_eu)) if first != inside => {
                return Err(NmgError::ToleranceAmbiguity(format!(
                    "edgeuses {:?} and {:?} are equidistant from the point but disagree",
                    first_eu, c.eu
                )));
            }
            Some(_) => {}
        }
    }

    match winner {
        Some((true, _, _)) => Ok(Classification::In),
        Some((false, _, _)) => Ok(Classification::Out),
        None => {
            debug!(?lu, "every candidate degenerate, loop classification unknown");
            Ok(Classification::Unknown)
        }
    }
}

/// Drop accordion pleats: pairs of edgeuses in the loop running between
/// the same two vertices in opposite directions.
fn drop_pleats(model: &Model, eus: Vec<EdgeuseId>) -> Vec<EdgeuseId> {
    let ends: Vec<_> = eus.iter().map(|&eu| model.eu_vertices(eu)).collect();
    let mut dropped = vec![false; eus.len()];
    for i in 0..eus.len() {
        if dropped[i] {
            continue;
        }
        let (a, b) = ends[i];
        if let Some(j) = (i + 1..eus.len()).find(|&j| !dropped[j] && ends[j] == (b, a)) {
            dropped[i] = true;
            dropped[j] = true;
        }
    }
    eus.into_iter()
        .zip(dropped)
        .filter_map(|(eu, gone)| (!gone).then_some(eu))
        .collect()
}

fn offset_side(model: &Model, pt: &Point3, c: &Candidate) -> Result<Option<bool>> {
    let left = model
        .eu_left_vec(c.eu)?
        .ok_or_else(|| NmgError::InvalidTopology("loop edgeuse has no face".into()))?;
    let side = (pt - c.pca).dot(&left);
    Ok(if side.abs() <= f64::EPSILON {
        None
    } else {
        Some(side > 0.0)
    })
}

/// Is the point inside one of the corners the loop makes at `v`?
///
/// Each corner is measured in a frame whose X axis runs along the outgoing
/// edge; the material wedge sweeps counter-clockwise (about the faceuse
/// normal) from there to the incoming edge. `None` if a corner is
/// degenerate or the point lies along one of its rays.
fn wedge_side(
    model: &Model,
    pt: &Point3,
    v: VertexId,
    eus: &[EdgeuseId],
    normal: &Vec3,
    tol: &Tolerance,
) -> Option<bool> {
    let in_plane = |w: Vec3| w - normal * w.dot(normal);
    let vp = model.vertices[v].point;
    let to_pt = in_plane(pt - vp);
    let near_zero = |ang: f64| ang < tol.perp || TAU - ang < tol.perp;

    let n = eus.len();
    let mut any_out = false;
    for i in 0..n {
        let (incoming, outgoing) = (eus[i], eus[(i + 1) % n]);
        if model.eu_end(incoming) != v || model.eu_start(outgoing) != v {
            continue;
        }
        let prev = model.vertices[model.eu_start(incoming)].point;
        let next = model.vertices[model.eu_end(outgoing)].point;
        let x = in_plane(next - vp);
        let len = x.norm();
        if len <= f64::EPSILON {
            return None;
        }
        let x = x / len;
        let y = normal.cross(&x);

        let ang_back = angle_in_frame(&in_plane(prev - vp), &x, &y);
        let ang_pt = angle_in_frame(&to_pt, &x, &y);
        if near_zero(ang_back) || near_zero(ang_pt) || (ang_pt - ang_back).abs() < tol.perp {
            return None;
        }
        if ang_pt < ang_back {
            return Some(true);
        }
        any_out = true;
    }
    // No corner at `v` means the loop was broken there by exclusions.
    any_out.then_some(false)
}
