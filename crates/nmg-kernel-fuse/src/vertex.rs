//! Vertex fuser.

use std::collections::HashSet;

use nmg_kernel_math::Tolerance;
use nmg_kernel_topo::{Model, Result};
use tracing::debug;

use crate::progress::{poll, Progress};
use crate::Scope;

/// Merge every pair of vertices in `scope` closer than `tol.dist`.
///
/// Vertices are swept in X order; the scan for partners of a vertex stops
/// at the first one more than `tol.dist` further along X. Of a coincident
/// pair the vertex earlier in the sweep survives. Returns the merge count.
pub fn fuse_vertices(
    model: &mut Model,
    scope: Scope,
    tol: &Tolerance,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let mut verts: Vec<_> = scope
        .vertices(model)?
        .into_iter()
        .map(|v| (v, model.vertices[v].point))
        .collect();
    verts.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));

    let mut absorbed = HashSet::new();
    let mut count = 0;
    for i in 0..verts.len() {
        poll(progress, "fuse vertices", i, verts.len())?;
        let (keep, pk) = verts[i];
        if absorbed.contains(&keep) {
            continue;
        }
        for &(other, po) in &verts[i + 1..] {
            if po.x - pk.x > tol.dist {
                break;
            }
            if absorbed.contains(&other) {
                continue;
            }
            if tol.is_zero_sq((po - pk).norm_squared()) {
                model.join_vertices(keep, other)?;
                absorbed.insert(other);
                count += 1;
            }
        }
    }
    debug!(count, scanned = verts.len(), "vertex fuse");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use crate::NoProgress;
    use nmg_kernel_math::Point3;
    use nmg_kernel_topo::{validate, NmgError};
    use std::ops::ControlFlow;

    fn column(dist: f64) -> usize {
        let (mut model, s) = testutil::empty();
        for z in [0.0, 1e-7, 2e-7] {
            let v = model.add_vertex(Point3::new(0.0, 0.0, z));
            let w = model.add_vertex(Point3::new(1.0, 0.0, z));
            model.add_wire_edge(s, v, w).unwrap();
        }
        let tol = Tolerance::new(dist, 1e-6).unwrap();
        fuse_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        validate::check_model(&model).unwrap();
        model.vertices.len()
    }

    #[test]
    fn test_close_column_collapses() {
        // Two survivors: one at x = 0, one at x = 1.
        assert_eq!(column(1e-4), 2);
        assert_eq!(column(1e-9), 6);
    }

    #[test]
    fn test_cube_corners_fuse() {
        let (mut model, s) = testutil::empty();
        testutil::loose_cube(&mut model, s, 10.0);
        assert_eq!(model.vertices.len(), 24);
        let tol = Tolerance::default();
        let n = fuse_vertices(&mut model, Scope::Shell(s), &tol, &mut NoProgress).unwrap();
        assert_eq!(n, 16);
        assert_eq!(model.vertices.len(), 8);
        validate::verify_vertex_uniqueness(&model, &tol).unwrap();

        let again = fuse_vertices(&mut model, Scope::Shell(s), &tol, &mut NoProgress).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_cancel() {
        let (mut model, s) = testutil::empty();
        testutil::loose_cube(&mut model, s, 1.0);
        let mut stop = |_: &'static str, done: usize, _: usize| {
            if done >= 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let err = fuse_vertices(&mut model, Scope::Model, &Tolerance::default(), &mut stop);
        assert!(matches!(err, Err(NmgError::Cancelled { .. })));
    }
}
