//! Point-vs-face classification.

use nmg_kernel_math::{Point3, Tolerance};
use nmg_kernel_topo::{FaceId, Model, NmgError, Orientation, Result};
use tracing::{debug, warn};

use crate::loops::classify_point_vs_loop;
use crate::{Classification, ClassifyOptions};

/// Classify `pt` against every loop of `face` and combine the results.
///
/// A point farther than `tol.dist` from the face plane is `Out`. The first
/// loop that puts the point on its boundary decides. Otherwise the point is
/// `In` when it is inside exactly one more outer loop than holes.
pub fn classify_point_vs_face(
    model: &Model,
    pt: &Point3,
    face: FaceId,
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<Classification> {
    let plane = model.face_plane(face)?;
    if !tol.is_zero(plane.dist(pt)) {
        return Ok(Classification::Out);
    }

    let fu = model.same_faceuse(face);
    let mut same_in = 0usize;
    let mut opp_out = 0usize;
    let mut unknown = false;
    for &lu in &model.faceuses[fu].loopuses {
        let orientation = model.loopuses[lu].orientation;
        let class = classify_point_vs_loop(model, pt, lu, tol, opts)?;
        match class {
            Classification::OnSharedBoundary | Classification::OnAntiBoundary => return Ok(class),
            Classification::Unknown => unknown = true,
            Classification::In if orientation == Orientation::Same => same_in += 1,
            Classification::Out if orientation == Orientation::Opposite => opp_out += 1,
            Classification::In | Classification::Out => {}
        }
    }

    if unknown {
        debug!(?face, "a loop could not be classified");
        return Ok(Classification::Unknown);
    }
    if opp_out > same_in || same_in - opp_out > 1 {
        warn!(?face, same_in, opp_out, "loop parity violated");
        return Err(NmgError::ParityViolation(format!(
            "point inside {} outer loops and {} holes",
            same_in, opp_out
        )));
    }
    Ok(if same_in > opp_out {
        Classification::In
    } else {
        Classification::Out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nmg_kernel_topo::{FaceuseId, ShellId, VertexId};

    fn verts(model: &mut Model, pts: &[(f64, f64)]) -> Vec<VertexId> {
        pts.iter()
            .map(|&(x, y)| model.add_vertex(Point3::new(x, y, 0.0)))
            .collect()
    }

    fn square_face(model: &mut Model, s: ShellId, lo: f64, hi: f64) -> FaceuseId {
        let v = verts(model, &[(lo, lo), (hi, lo), (hi, hi), (lo, hi)]);
        model.add_face(s, &v).unwrap()
    }

    fn setup() -> (Model, ShellId) {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        (model, s)
    }

    fn at(model: &Model, fu: FaceuseId, x: f64, y: f64, z: f64) -> Result<Classification> {
        classify_point_vs_face(
            model,
            &Point3::new(x, y, z),
            model.faceuses[fu].face,
            &Tolerance::default(),
            &ClassifyOptions::default(),
        )
    }

    #[test]
    fn test_unit_square_face() {
        let (mut model, s) = setup();
        let fu = square_face(&mut model, s, 0.0, 1.0);
        assert_eq!(at(&model, fu, 0.5, 0.5, 0.0).unwrap(), Classification::In);
        assert_eq!(at(&model, fu, 5.0, 5.0, 0.0).unwrap(), Classification::Out);
        assert_eq!(
            at(&model, fu, 0.0, 0.5, 0.0).unwrap(),
            Classification::OnSharedBoundary
        );
        assert_eq!(at(&model, fu, 0.5, 0.5, 1.0).unwrap(), Classification::Out);
    }

    #[test]
    fn test_face_with_hole() {
        let (mut model, s) = setup();
        let fu = square_face(&mut model, s, 0.0, 4.0);
        let hole = verts(&mut model, &[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        model.add_hole(fu, &hole).unwrap();

        assert_eq!(at(&model, fu, 0.5, 0.5, 0.0).unwrap(), Classification::In);
        assert_eq!(at(&model, fu, 2.0, 2.0, 0.0).unwrap(), Classification::Out);
        assert_eq!(
            at(&model, fu, 1.0, 2.0, 0.0).unwrap(),
            Classification::OnAntiBoundary
        );
        assert_eq!(at(&model, fu, 6.0, 2.0, 0.0).unwrap(), Classification::Out);
    }

    #[test]
    fn test_hole_outside_outer_loop_is_parity_violation() {
        let (mut model, s) = setup();
        let fu = square_face(&mut model, s, 0.0, 1.0);
        let hole = verts(&mut model, &[(2.0, 0.0), (2.0, 1.0), (3.0, 1.0), (3.0, 0.0)]);
        model.add_hole(fu, &hole).unwrap();
        assert!(matches!(
            at(&model, fu, 2.5, 0.5, 0.0),
            Err(NmgError::ParityViolation(_))
        ));
    }

    #[test]
    fn test_shared_anti_aligned_geometry() {
        let (mut model, s) = setup();
        let top = square_face(&mut model, s, 0.0, 1.0);
        let v = verts(&mut model, &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let bottom = model.add_face(s, &v).unwrap();

        let keep = model.faces[model.faceuses[top].face].geom;
        let bottom_face = model.faceuses[bottom].face;
        let gone = model.faces[bottom_face].geom;
        model.share_face_geometry(keep, gone, true).unwrap();

        assert!(model.faces[bottom_face].flip);
        // The shared plane faces up; the flip keeps this face pointing down.
        let normal = model.faceuse_normal(bottom).unwrap();
        assert_relative_eq!(normal.z, -1.0, epsilon = 1e-12);
        assert_relative_eq!(model.face_plane(bottom_face).unwrap().normal.z, -1.0, epsilon = 1e-12);
        assert_eq!(at(&model, bottom, 0.5, 0.5, 0.0).unwrap(), Classification::In);
        assert_eq!(at(&model, bottom, 1.5, 0.5, 0.0).unwrap(), Classification::Out);
    }
}
