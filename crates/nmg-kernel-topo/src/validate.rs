//! Structural and geometric consistency checks.

use nmg_kernel_math::Tolerance;

use crate::entity::*;
use crate::error::{NmgError, Result};
use crate::model::Model;
use crate::VertexId;

fn invalid(msg: impl Into<String>) -> NmgError {
    NmgError::InvalidTopology(msg.into())
}

/// Check every structural invariant of the arena.
///
/// Returns the first violation found as [`NmgError::InvalidTopology`].
pub fn check_model(model: &Model) -> Result<()> {
    check_edgeuses(model)?;
    check_endpoints(model)?;
    check_loopuses(model)?;
    check_faceuses(model)?;
    check_vertices(model)?;
    Ok(())
}

fn check_edgeuses(model: &Model) -> Result<()> {
    for (id, eu) in &model.edgeuses {
        for (what, partner) in [("mate", eu.mate), ("radial", eu.radial)] {
            let p = model
                .edgeuses
                .get(partner)
                .ok_or_else(|| invalid(format!("edgeuse {id:?} has a dangling {what}")))?;
            let back = if what == "mate" { p.mate } else { p.radial };
            if back != id {
                return Err(invalid(format!("{what} of edgeuse {id:?} is not an involution")));
            }
            if p.edge != eu.edge {
                return Err(invalid(format!("{what} of edgeuse {id:?} is on another edge")));
            }
        }
        if eu.mate == id {
            return Err(invalid(format!("edgeuse {id:?} is its own mate")));
        }

        let vu = model
            .vertexuses
            .get(eu.vu)
            .ok_or_else(|| invalid(format!("edgeuse {id:?} has a dangling vertexuse")))?;
        if vu.parent != VertexuseParent::Edgeuse(id) {
            return Err(invalid(format!("vertexuse of edgeuse {id:?} has the wrong parent")));
        }
        let v = model
            .vertices
            .get(vu.vertex)
            .ok_or_else(|| invalid(format!("edgeuse {id:?} starts at a dead vertex")))?;
        if !v.uses.contains(&eu.vu) {
            return Err(invalid(format!("vertex does not list the use by edgeuse {id:?}")));
        }

        let edge = model
            .edges
            .get(eu.edge)
            .ok_or_else(|| invalid(format!("edgeuse {id:?} references a dead edge")))?;
        match model.edgeuses.get(edge.edgeuse) {
            Some(rep) if rep.edge == eu.edge => {}
            _ => return Err(invalid(format!("edge of edgeuse {id:?} has a bad representative"))),
        }

        let listed = match eu.parent {
            EdgeuseParent::Loopuse(lu) => model
                .loopuses
                .get(lu)
                .is_some_and(|l| matches!(&l.contents, LoopContents::Edges(e) if e.contains(&id))),
            EdgeuseParent::Shell(s) => model
                .shells
                .get(s)
                .is_some_and(|sh| sh.wire_edgeuses.contains(&id)),
        };
        if !listed {
            return Err(invalid(format!("parent of edgeuse {id:?} does not list it")));
        }

        if let Some(g) = eu.geom {
            match model.edge_geoms.get(g) {
                Some(geom) if geom.edgeuses.contains(&id) => {}
                _ => return Err(invalid(format!("edge geometry does not list edgeuse {id:?}"))),
            }
        }
    }
    Ok(())
}

// Runs after every edgeuse's vertexuse is known to be live. A radial
// partner may run either way once a join has exchanged a flipped use
// with its mate; a mate always runs backwards.
fn check_endpoints(model: &Model) -> Result<()> {
    for (id, eu) in &model.edgeuses {
        let (a, b) = model.eu_vertices(id);
        if model.eu_vertices(eu.mate) != (b, a) {
            return Err(invalid(format!("mate of edgeuse {id:?} does not run backwards")));
        }
        let r = model.eu_vertices(eu.radial);
        if r != (b, a) && r != (a, b) {
            return Err(invalid(format!(
                "radial partner of edgeuse {id:?} spans other vertices"
            )));
        }
    }
    Ok(())
}

fn check_loopuses(model: &Model) -> Result<()> {
    for (id, lu) in &model.loopuses {
        match model.loopuses.get(lu.mate) {
            Some(m) if m.mate == id && m.loop_id == lu.loop_id => {}
            _ => return Err(invalid(format!("mate of loopuse {id:?} is inconsistent"))),
        }
        if !model.loops.contains_key(lu.loop_id) {
            return Err(invalid(format!("loopuse {id:?} references a dead loop")));
        }
        let listed = match lu.parent {
            LoopuseParent::Faceuse(fu) => model
                .faceuses
                .get(fu)
                .is_some_and(|f| f.loopuses.contains(&id)),
            LoopuseParent::Shell(s) => model
                .shells
                .get(s)
                .is_some_and(|sh| sh.wire_loopuses.contains(&id)),
        };
        if !listed {
            return Err(invalid(format!("parent of loopuse {id:?} does not list it")));
        }
        match &lu.contents {
            LoopContents::Edges(eus) => {
                if eus.is_empty() {
                    return Err(invalid(format!("loopuse {id:?} is empty")));
                }
                for &eu in eus {
                    match model.edgeuses.get(eu) {
                        Some(e) if e.parent == EdgeuseParent::Loopuse(id) => {}
                        _ => {
                            return Err(invalid(format!(
                                "loopuse {id:?} lists a dead or foreign edgeuse"
                            )))
                        }
                    }
                }
                for (i, &eu) in eus.iter().enumerate() {
                    let next = eus[(i + 1) % eus.len()];
                    if model.eu_end(eu) != model.eu_start(next) {
                        return Err(invalid(format!("loopuse {id:?} is broken at position {i}")));
                    }
                }
            }
            LoopContents::Vertex(vu) => match model.vertexuses.get(*vu) {
                Some(u) if u.parent == VertexuseParent::Loopuse(id) => {}
                _ => return Err(invalid(format!("point loopuse {id:?} has a bad vertexuse"))),
            },
        }
    }
    Ok(())
}

fn check_faceuses(model: &Model) -> Result<()> {
    for (id, fu) in &model.faceuses {
        match model.faceuses.get(fu.mate) {
            Some(m)
                if m.mate == id
                    && m.face == fu.face
                    && m.orientation == fu.orientation.flipped()
                    && fu.orientation != Orientation::Unspecified => {}
            _ => return Err(invalid(format!("mate of faceuse {id:?} is inconsistent"))),
        }
        if !model.shells.get(fu.shell).is_some_and(|s| s.faceuses.contains(&id)) {
            return Err(invalid(format!("shell does not list faceuse {id:?}")));
        }
        let face = model
            .faces
            .get(fu.face)
            .ok_or_else(|| invalid(format!("faceuse {id:?} references a dead face")))?;
        if face.faceuse != id && face.faceuse != fu.mate {
            return Err(invalid(format!("face of faceuse {id:?} points elsewhere")));
        }
        match model.face_geoms.get(face.geom) {
            Some(g) if g.faces.contains(&fu.face) => {}
            _ => return Err(invalid(format!("face geometry does not list the face of {id:?}"))),
        }
    }
    Ok(())
}

fn check_vertices(model: &Model) -> Result<()> {
    for (id, v) in &model.vertices {
        for &vu in &v.uses {
            if model.vertexuses.get(vu).map(|u| u.vertex) != Some(id) {
                return Err(invalid(format!("vertex {id:?} lists a foreign vertexuse")));
            }
        }
    }
    Ok(())
}

/// Pairs of distinct vertices closer than `tol.dist`, found by an X sweep.
pub fn coincident_vertex_pairs(model: &Model, tol: &Tolerance) -> Vec<(VertexId, VertexId)> {
    let mut sorted: Vec<_> = model.vertices.iter().map(|(id, v)| (id, v.point)).collect();
    sorted.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));

    let mut pairs = Vec::new();
    for (i, &(va, pa)) in sorted.iter().enumerate() {
        for &(vb, pb) in &sorted[i + 1..] {
            if pb.x - pa.x > tol.dist {
                break;
            }
            if tol.is_zero_sq((pb - pa).norm_squared()) {
                pairs.push((va, vb));
            }
        }
    }
    pairs
}

/// Fail if any two distinct vertices lie within tolerance of each other.
pub fn verify_vertex_uniqueness(model: &Model, tol: &Tolerance) -> Result<()> {
    match coincident_vertex_pairs(model, tol).first() {
        None => Ok(()),
        Some(&(a, b)) => Err(NmgError::ToleranceAmbiguity(format!(
            "vertices {a:?} and {b:?} coincide within tolerance"
        ))),
    }
}
