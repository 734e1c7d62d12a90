//! Edge-on-vertex breaker.

use std::collections::VecDeque;

use nmg_kernel_math::oracle::{distance_point_to_segment, SegmentProximity};
use nmg_kernel_math::{Aabb3, Tolerance};
use nmg_kernel_topo::{Model, Result};
use tracing::{debug, trace};

use crate::progress::{poll, Progress};
use crate::Scope;

/// Split every edge in `scope` at each vertex lying on its interior.
///
/// Both halves of a split go back on the queue, since one vertex run can
/// cross several collinear sub-edges. Returns the number of splits.
pub fn break_edges_on_vertices(
    model: &mut Model,
    scope: Scope,
    tol: &Tolerance,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let verts: Vec<_> = scope
        .vertices(model)?
        .into_iter()
        .map(|v| (v, model.vertices[v].point))
        .collect();
    let mut queue: VecDeque<_> = scope.edges(model)?.into();
    let mut count = 0;
    let mut done = 0;

    while let Some(edge) = queue.pop_front() {
        poll(progress, "break edges", done, done + queue.len() + 1)?;
        done += 1;
        let Some(e) = model.edges.get(edge) else {
            continue;
        };
        let eu = e.edgeuse;
        let (a, b) = model.eu_vertices(eu);
        let (pa, pb) = model.eu_points(eu);
        let bbox = Aabb3::from_points([&pa, &pb]);

        let hit = verts.iter().find(|&&(v, p)| {
            v != a
                && v != b
                && bbox.contains_tol(&p, tol.dist)
                && matches!(
                    distance_point_to_segment(&p, &pa, &pb, tol).status,
                    SegmentProximity::OnSegment { .. }
                )
        });
        if let Some(&(v, _)) = hit {
            let new_eu = model.split_edge(eu, v)?;
            trace!(?edge, ?v, "edge broken on vertex");
            queue.push_back(edge);
            queue.push_back(model.edgeuses[new_eu].edge);
            count += 1;
        }
    }
    debug!(count, "edge-on-vertex breaks");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testutil, NoProgress};
    use nmg_kernel_math::Point3;
    use nmg_kernel_topo::validate;

    #[test]
    fn test_t_junction_is_broken() {
        // Square [0,2]x[0,1] and two unit squares above it: the middle
        // vertex (1, 1) of the top row lies on the lower square's top edge.
        let (mut model, s) = testutil::empty();
        let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
        let v: Vec<_> = [p(0., 0.), p(2., 0.), p(2., 1.), p(0., 1.), p(1., 1.), p(2., 2.), p(1., 2.), p(0., 2.)]
            .into_iter()
            .map(|pt| model.add_vertex(pt))
            .collect();
        model.add_face(s, &[v[0], v[1], v[2], v[3]]).unwrap();
        model.add_face(s, &[v[3], v[4], v[6], v[7]]).unwrap();
        model.add_face(s, &[v[4], v[2], v[5], v[6]]).unwrap();

        let tol = Tolerance::default();
        let n = break_edges_on_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        assert_eq!(n, 1);
        validate::check_model(&model).unwrap();

        let again = break_edges_on_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_several_vertices_on_one_wire() {
        // Spurs hang off (1,0), (2,0) and (3,0), all on the wire 0 → 4.
        let (mut model, s) = testutil::empty();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(4.0, 0.0, 0.0));
        model.add_wire_edge(s, a, b).unwrap();
        for x in [3.0, 1.0, 2.0] {
            let v = model.add_vertex(Point3::new(x, 0.0, 0.0));
            let w = model.add_vertex(Point3::new(x, 1.0, 0.0));
            model.add_wire_edge(s, v, w).unwrap();
        }
        let tol = Tolerance::default();
        let n = break_edges_on_vertices(&mut model, Scope::Shell(s), &tol, &mut NoProgress).unwrap();
        assert_eq!(n, 3);
        assert_eq!(model.edges.len(), 7);
        validate::check_model(&model).unwrap();
    }
}
