//! Edge-geometry fuser.

use std::collections::HashMap;

use nmg_kernel_math::oracle::{dist_sq_point_line, lines_coincide};
use nmg_kernel_math::{Point3, Tolerance, Vec3};
use nmg_kernel_topo::{EdgeGeomId, EdgeGeometry, EdgeId, Model, Result, VertexId};
use tracing::{debug, trace};

use crate::progress::{poll, Progress};
use crate::Scope;

/// Share line geometry between collinear edges in `scope` that meet at a
/// vertex. Returns the number of geometry records absorbed.
pub fn fuse_edge_geometry(
    model: &mut Model,
    scope: Scope,
    tol: &Tolerance,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let edges = scope.edges(model)?;
    let mut at_vertex: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
    for &e in &edges {
        let (a, b) = model.try_edge_vertices(e)?;
        at_vertex.entry(a).or_default().push(e);
        at_vertex.entry(b).or_default().push(e);
    }

    let mut count = 0;
    for (i, &e1) in edges.iter().enumerate() {
        poll(progress, "fuse edge geometry", i, edges.len())?;
        let (a, b) = model.edge_vertices(e1);
        let mut partners: Vec<EdgeId> = at_vertex[&a]
            .iter()
            .chain(&at_vertex[&b])
            .copied()
            .filter(|&e2| e2 > e1)
            .collect();
        partners.sort();
        partners.dedup();
        for e2 in partners {
            let (Some(g1), Some(g2)) = (edge_line_geom(model, e1), edge_line_geom(model, e2)) else {
                continue;
            };
            if g1 == g2 || !collinear(model, g1, g2, tol) {
                continue;
            }
            trace!(?e1, ?e2, "collinear edges");
            model.share_edge_geometry(g1, g2)?;
            count += 1;
        }
    }
    debug!(count, edges = edges.len(), "edge geometry fuse");
    Ok(count)
}

/// Line geometry of an edge's representative use.
fn edge_line_geom(model: &Model, edge: EdgeId) -> Option<EdgeGeomId> {
    let g = model.edgeuses[model.edges[edge].edgeuse].geom?;
    matches!(model.edge_geoms[g].geometry, EdgeGeometry::Line { .. }).then_some(g)
}

fn line(model: &Model, g: EdgeGeomId) -> Option<(Point3, Vec3)> {
    match model.edge_geoms[g].geometry {
        EdgeGeometry::Line { point, dir } => Some((point, dir)),
        EdgeGeometry::Curve(_) => None,
    }
}

/// The two lines coincide and every endpoint of every use of either lies
/// on both.
fn collinear(model: &Model, g1: EdgeGeomId, g2: EdgeGeomId, tol: &Tolerance) -> bool {
    let (Some((p1, d1)), Some((p2, d2))) = (line(model, g1), line(model, g2)) else {
        return false;
    };
    if !lines_coincide(&p1, &d1, &p2, &d2, tol) {
        return false;
    }
    model.edge_geoms[g1]
        .edgeuses
        .iter()
        .chain(&model.edge_geoms[g2].edgeuses)
        .all(|&eu| {
            let (a, b) = model.eu_points(eu);
            [a, b].iter().all(|p| {
                dist_sq_point_line(p, &p1, &d1) < tol.dist_sq
                    && dist_sq_point_line(p, &p2, &d2) < tol.dist_sq
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{break_edges_on_vertices, testutil, NoProgress};
    use nmg_kernel_topo::validate;

    fn wire_path(pts: &[[f64; 3]]) -> Model {
        let (mut model, s) = testutil::empty();
        let v: Vec<_> = pts
            .iter()
            .map(|p| model.add_vertex(Point3::new(p[0], p[1], p[2])))
            .collect();
        for w in v.windows(2) {
            model.add_wire_edge(s, w[0], w[1]).unwrap();
        }
        model
    }

    #[test]
    fn test_collinear_wires_share_line() {
        let mut model = wire_path(&[[0., 0., 0.], [1., 0., 0.], [3., 0., 0.]]);
        let tol = Tolerance::default();
        let n = fuse_edge_geometry(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        assert_eq!(n, 1);
        assert_eq!(model.edge_geoms.len(), 1);
        validate::check_model(&model).unwrap();
    }

    #[test]
    fn test_corner_keeps_lines() {
        let mut model = wire_path(&[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.]]);
        let n = fuse_edge_geometry(&mut model, Scope::Model, &Tolerance::default(), &mut NoProgress)
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(model.edge_geoms.len(), 2);
    }

    #[test]
    fn test_split_halves_already_share() {
        let (mut model, s) = testutil::empty();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let m = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let top = model.add_vertex(Point3::new(1.0, 1.0, 0.0));
        model.add_wire_edge(s, a, b).unwrap();
        model.add_wire_edge(s, m, top).unwrap();
        let tol = Tolerance::default();
        break_edges_on_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        let n = fuse_edge_geometry(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        assert_eq!(n, 0);
    }
}
