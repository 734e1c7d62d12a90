#![warn(missing_docs)]

//! Tolerance-driven fusing for the NMG kernel.
//!
//! Topology arrives from independent construction steps with near-duplicate
//! vertices, edges running through foreign vertices and coplanar faces
//! carrying separate plane equations. The passes here merge those, in the
//! order the pipeline runs them:
//!
//! 1. [`fuse_vertices`]: merge vertices closer than `tol.dist`.
//! 2. [`break_edges_on_vertices`]: split edges at vertices lying on them.
//! 3. [`fuse_face_geometry`]: share plane equations between coplanar faces.
//! 4. [`fuse_edges`]: join edges with the same endpoints into one radial
//!    cycle, ordered by angle around the edge ([`radial`]).
//! 5. [`fuse_edge_geometry`]: share line equations between collinear edges.
//!
//! Every pass returns how many merges it made and polls a [`Progress`]
//! hook inside its pair scan.

mod breaker;
mod edge;
mod edge_geom;
mod face;
mod progress;
pub mod radial;
mod vertex;

pub use breaker::break_edges_on_vertices;
pub use edge::{fuse_edges, EdgeFuseCounts};
pub use edge_geom::fuse_edge_geometry;
pub use face::fuse_face_geometry;
pub use progress::{NoProgress, Progress};
pub use radial::{radial_join_eu, verify_radial_order, verify_radial_orders};
pub use vertex::fuse_vertices;

use nmg_kernel_topo::{EdgeId, FaceId, Model, Result, ShellId, VertexId};

/// What a fuse pass looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Everything in the model.
    Model,
    /// One shell.
    Shell(ShellId),
}

impl Scope {
    pub(crate) fn vertices(self, model: &Model) -> Result<Vec<VertexId>> {
        match self {
            Scope::Model => Ok(model.model_vertices()),
            Scope::Shell(s) => model.shell_vertices(s),
        }
    }

    pub(crate) fn edges(self, model: &Model) -> Result<Vec<EdgeId>> {
        match self {
            Scope::Model => Ok(model.edges.keys().collect()),
            Scope::Shell(s) => model.shell_edges(s),
        }
    }

    pub(crate) fn faces(self, model: &Model) -> Result<Vec<FaceId>> {
        match self {
            Scope::Model => Ok(model.faces.keys().collect()),
            Scope::Shell(s) => model.shell_faces(s),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use nmg_kernel_math::Point3;
    use nmg_kernel_topo::{FaceuseId, Model, ShellId};

    /// A model with one region and one shell.
    pub fn empty() -> (Model, ShellId) {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        (model, s)
    }

    /// Add a face over fresh vertices (no sharing with existing ones).
    pub fn face(model: &mut Model, s: ShellId, pts: &[[f64; 3]]) -> FaceuseId {
        let v: Vec<_> = pts
            .iter()
            .map(|p| model.add_vertex(Point3::new(p[0], p[1], p[2])))
            .collect();
        model.add_face(s, &v).unwrap()
    }

    /// Six independent faces of the cube `[0, size]³`, outward normals.
    pub fn loose_cube(model: &mut Model, s: ShellId, size: f64) {
        loose_box(model, s, [0.0; 3], [size; 3]);
    }

    /// Six independent faces of the box `[lo, hi]`, outward normals.
    pub fn loose_box(model: &mut Model, s: ShellId, lo: [f64; 3], hi: [f64; 3]) {
        let pick = |t: f64, i: usize| if t == 0.0 { lo[i] } else { hi[i] };
        let c = |x: f64, y: f64, z: f64| [pick(x, 0), pick(y, 1), pick(z, 2)];
        let faces = [
            [c(0., 0., 0.), c(0., 1., 0.), c(1., 1., 0.), c(1., 0., 0.)],
            [c(0., 0., 1.), c(1., 0., 1.), c(1., 1., 1.), c(0., 1., 1.)],
            [c(0., 0., 0.), c(1., 0., 0.), c(1., 0., 1.), c(0., 0., 1.)],
            [c(0., 1., 0.), c(0., 1., 1.), c(1., 1., 1.), c(1., 1., 0.)],
            [c(0., 0., 0.), c(0., 0., 1.), c(0., 1., 1.), c(0., 1., 0.)],
            [c(1., 0., 0.), c(1., 1., 0.), c(1., 1., 1.), c(1., 0., 1.)],
        ];
        for f in &faces {
            face(model, s, f);
        }
    }
}
