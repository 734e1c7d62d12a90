//! Edge fuser.

use nmg_kernel_classify::ClassifyOptions;
use nmg_kernel_math::Tolerance;
use nmg_kernel_topo::{Model, NmgError, Result};
use tracing::debug;

use crate::progress::{poll, Progress};
use crate::radial::radial_join_eu;
use crate::vertex::fuse_vertices;
use crate::Scope;

/// What [`fuse_edges`] merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFuseCounts {
    /// Vertices merged by the preliminary vertex pass.
    pub vertices: usize,
    /// Edges radially joined into another.
    pub edges: usize,
}

/// Join every pair of edges in `scope` running between the same two vertices.
///
/// Vertices are fused first so that coincident endpoints compare equal.
/// Edges are keyed by their unordered endpoint pair; each run of equal keys
/// is joined into its first edge with [`radial_join_eu`].
pub fn fuse_edges(
    model: &mut Model,
    scope: Scope,
    tol: &Tolerance,
    opts: &ClassifyOptions,
    progress: &mut dyn Progress,
) -> Result<EdgeFuseCounts> {
    let vertices = fuse_vertices(model, scope, tol, progress)?;

    let mut keys = Vec::new();
    for edge in scope.edges(model)? {
        let (a, b) = model.try_edge_vertices(edge)?;
        if a == b {
            return Err(NmgError::DegenerateTopology(format!(
                "edge {:?} starts and ends on one vertex",
                edge
            )));
        }
        keys.push((a.min(b), a.max(b), edge));
    }
    keys.sort();

    let mut edges = 0;
    let mut start = 0;
    while start < keys.len() {
        poll(progress, "fuse edges", start, keys.len())?;
        let (a, b, keep) = keys[start];
        let mut end = start + 1;
        while end < keys.len() && (keys[end].0, keys[end].1) == (a, b) {
            end += 1;
        }
        for &(_, _, other) in &keys[start + 1..end] {
            // An earlier join in this run may already have absorbed it.
            if !model.edges.contains_key(other) {
                continue;
            }
            let keep_eu = model.edge(keep)?.edgeuse;
            let other_eu = model.edge(other)?.edgeuse;
            radial_join_eu(model, keep_eu, other_eu, tol, opts)?;
            edges += 1;
        }
        start = end;
    }
    debug!(vertices, edges, "edge fuse");
    Ok(EdgeFuseCounts { vertices, edges })
}
