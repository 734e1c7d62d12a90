//! Face-geometry fuser.

use nmg_kernel_math::oracle::{planes_coplanar, point_on_plane, Coplanarity};
use nmg_kernel_math::{Aabb3, PlaneEq, Tolerance};
use nmg_kernel_topo::{FaceGeomId, FaceGeometry, FaceId, Model, Result};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::progress::{poll, Progress};
use crate::Scope;

/// Share plane equations between coplanar faces in `scope`.
///
/// Anti-aligned planes are shared too; the absorbed faces toggle their
/// flip bit so their own normals are unchanged. Returns the number of
/// geometry records absorbed.
pub fn fuse_face_geometry(
    model: &mut Model,
    scope: Scope,
    tol: &Tolerance,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let faces = scope.faces(model)?;
    let boxes: Vec<Aabb3> = {
        let model = &*model;
        faces.par_iter().map(|&f| model.face_bbox(f)).collect()
    };

    let mut count = 0;
    for i in 0..faces.len() {
        poll(progress, "fuse face geometry", i, faces.len())?;
        for j in i + 1..faces.len() {
            let (ga, gb) = (model.faces[faces[i]].geom, model.faces[faces[j]].geom);
            if ga == gb || !boxes[i].overlaps_tol(&boxes[j], tol.dist) {
                continue;
            }
            let (Some(pa), Some(pb)) = (plane_of(model, ga), plane_of(model, gb)) else {
                continue;
            };
            let flip = match planes_coplanar(&pa, &pb, tol) {
                Coplanarity::Aligned => false,
                Coplanarity::AntiAligned => true,
                Coplanarity::Parallel | Coplanarity::Skew => continue,
            };
            if !geom_faces_on(model, ga, &pb, tol) || !geom_faces_on(model, gb, &pa, tol) {
                continue;
            }
            trace!(a = ?faces[i], b = ?faces[j], flip, "coplanar faces");
            model.share_face_geometry(ga, gb, flip)?;
            count += 1;
        }
    }
    debug!(count, faces = faces.len(), "face geometry fuse");
    Ok(count)
}

fn plane_of(model: &Model, geom: FaceGeomId) -> Option<PlaneEq> {
    match model.face_geoms[geom].geometry {
        FaceGeometry::Plane(pl) => Some(pl),
        FaceGeometry::Surface(_) => None,
    }
}

/// Every vertex of every face using `geom` lies on `plane`.
fn geom_faces_on(model: &Model, geom: FaceGeomId, plane: &PlaneEq, tol: &Tolerance) -> bool {
    model.face_geoms[geom]
        .faces
        .iter()
        .all(|&f: &FaceId| {
            model
                .face_vertices(f)
                .into_iter()
                .all(|v| point_on_plane(&model.vertices[v].point, plane, tol))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testutil, NoProgress};
    use approx::assert_relative_eq;
    use nmg_kernel_math::Vec3;
    use nmg_kernel_topo::validate;

    #[test]
    fn test_coplanar_neighbours_share() {
        let (mut model, s) = testutil::empty();
        let a = testutil::face(&mut model, s, &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]]);
        let b = testutil::face(&mut model, s, &[[1., 0., 0.], [2., 0., 0.], [2., 1., 0.], [1., 1., 0.]]);
        // Touches the others' boxes but is tilted.
        testutil::face(&mut model, s, &[[1., 0., 0.], [1., 1., 0.], [1., 1., 1.]]);

        let n = fuse_face_geometry(&mut model, Scope::Model, &Tolerance::default(), &mut NoProgress).unwrap();
        assert_eq!(n, 1);
        let fa = model.faceuses[a].face;
        let fb = model.faceuses[b].face;
        assert_eq!(model.faces[fa].geom, model.faces[fb].geom);
        assert_eq!(model.face_geoms.len(), 2);
        validate::check_model(&model).unwrap();
    }

    #[test]
    fn test_anti_aligned_keeps_normals() {
        let (mut model, s) = testutil::empty();
        let up = testutil::face(&mut model, s, &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]]);
        let down = testutil::face(&mut model, s, &[[0., 0., 0.], [0., 1., 0.], [1., 1., 0.], [1., 0., 0.]]);

        let n = fuse_face_geometry(&mut model, Scope::Shell(s), &Tolerance::default(), &mut NoProgress).unwrap();
        assert_eq!(n, 1);
        assert_relative_eq!(model.faceuse_normal(up).unwrap(), Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(model.faceuse_normal(down).unwrap(), -Vec3::z(), epsilon = 1e-12);
        let flips: Vec<_> = model.faces.values().map(|f| f.flip).collect();
        assert_eq!(flips.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn test_offset_planes_kept_apart() {
        let (mut model, s) = testutil::empty();
        testutil::face(&mut model, s, &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]]);
        testutil::face(&mut model, s, &[[0., 0., 1e-3], [1., 0., 1e-3], [1., 1., 1e-3], [0., 1., 1e-3]]);
        let n = fuse_face_geometry(&mut model, Scope::Model, &Tolerance::default(), &mut NoProgress).unwrap();
        assert_eq!(n, 0);
        assert_eq!(model.face_geoms.len(), 2);
    }
}
