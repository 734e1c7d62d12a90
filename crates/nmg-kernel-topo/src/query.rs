//! Read-only navigation over the arena.
//!
//! The plain accessors here (`eu_start`, `eu_vertices`, `edge_vertices`,
//! `loop_edgeuses` and friends) index the arena directly and expect keys
//! taken from the live model. They panic on a stale key. Code holding a
//! key from outside the current pass should go through the `Result`
//! lookups on [`Model`] or the `try_` variants below.

use std::collections::HashSet;

use nmg_kernel_math::{Aabb3, PlaneEq, Point3, Vec3};

use crate::entity::*;
use crate::error::{NmgError, Result};
use crate::model::Model;
use crate::{EdgeId, EdgeuseId, FaceId, FaceuseId, LoopuseId, ShellId, VertexId, VertexuseId};

impl Model {
    /// Start vertex of an edgeuse.
    ///
    /// # Panics
    ///
    /// If `eu` or its vertexuse is no longer in the model.
    pub fn eu_start(&self, eu: EdgeuseId) -> VertexId {
        self.vertexuses[self.edgeuses[eu].vu].vertex
    }

    /// End vertex of an edgeuse (the start of its mate).
    pub fn eu_end(&self, eu: EdgeuseId) -> VertexId {
        self.eu_start(self.edgeuses[eu].mate)
    }

    /// `(start, end)` vertices of an edgeuse.
    ///
    /// # Panics
    ///
    /// If `eu` is stale. See [`Model::try_eu_vertices`].
    pub fn eu_vertices(&self, eu: EdgeuseId) -> (VertexId, VertexId) {
        (self.eu_start(eu), self.eu_end(eu))
    }

    /// `(start, end)` vertices of an edgeuse, or `StaleHandle` if it or
    /// anything it points at has been killed.
    pub fn try_eu_vertices(&self, eu: EdgeuseId) -> Result<(VertexId, VertexId)> {
        let e = self.edgeuse(eu)?;
        let start = self.vu_vertex(e.vu)?;
        let end = self.vu_vertex(self.edgeuse(e.mate)?.vu)?;
        Ok((start, end))
    }

    fn vu_vertex(&self, vu: VertexuseId) -> Result<VertexId> {
        let v = self
            .vertexuses
            .get(vu)
            .ok_or(NmgError::StaleHandle("vertexuse"))?
            .vertex;
        self.vertex(v)?;
        Ok(v)
    }

    /// `(start, end)` coordinates of an edgeuse.
    pub fn eu_points(&self, eu: EdgeuseId) -> (Point3, Point3) {
        let (a, b) = self.eu_vertices(eu);
        (self.vertices[a].point, self.vertices[b].point)
    }

    /// The loopuse an edgeuse belongs to, if it is not a wire.
    pub fn loopuse_of_eu(&self, eu: EdgeuseId) -> Option<LoopuseId> {
        match self.edgeuses[eu].parent {
            EdgeuseParent::Loopuse(lu) => Some(lu),
            EdgeuseParent::Shell(_) => None,
        }
    }

    /// The faceuse a loopuse bounds, if it is not a wire loop.
    pub fn faceuse_of_lu(&self, lu: LoopuseId) -> Option<FaceuseId> {
        match self.loopuses[lu].parent {
            LoopuseParent::Faceuse(fu) => Some(fu),
            LoopuseParent::Shell(_) => None,
        }
    }

    /// The faceuse an edgeuse belongs to, if any.
    pub fn faceuse_of_eu(&self, eu: EdgeuseId) -> Option<FaceuseId> {
        self.loopuse_of_eu(eu).and_then(|lu| self.faceuse_of_lu(lu))
    }

    /// Shell owning a loopuse.
    pub fn shell_of_lu(&self, lu: LoopuseId) -> ShellId {
        match self.loopuses[lu].parent {
            LoopuseParent::Faceuse(fu) => self.faceuses[fu].shell,
            LoopuseParent::Shell(s) => s,
        }
    }

    /// Shell owning an edgeuse.
    pub fn shell_of_eu(&self, eu: EdgeuseId) -> ShellId {
        match self.edgeuses[eu].parent {
            EdgeuseParent::Loopuse(lu) => self.shell_of_lu(lu),
            EdgeuseParent::Shell(s) => s,
        }
    }

    /// Edgeuses of a loopuse in traversal order. Empty for point loops.
    pub fn loop_edgeuses(&self, lu: LoopuseId) -> &[EdgeuseId] {
        match &self.loopuses[lu].contents {
            LoopContents::Edges(eus) => eus,
            LoopContents::Vertex(_) => &[],
        }
    }

    /// Vertices of a loopuse in traversal order.
    pub fn loop_vertices(&self, lu: LoopuseId) -> Vec<VertexId> {
        match &self.loopuses[lu].contents {
            LoopContents::Edges(eus) => eus.iter().map(|&eu| self.eu_start(eu)).collect(),
            LoopContents::Vertex(vu) => vec![self.vertexuses[*vu].vertex],
        }
    }

    /// Coordinates of a loopuse's vertices in traversal order.
    pub fn loop_points(&self, lu: LoopuseId) -> Vec<Point3> {
        self.loop_vertices(lu)
            .into_iter()
            .map(|v| self.vertices[v].point)
            .collect()
    }

    /// The edgeuse following `eu` in its loop (wraps). `None` for wires.
    pub fn eu_next(&self, eu: EdgeuseId) -> Option<EdgeuseId> {
        let lu = self.loopuse_of_eu(eu)?;
        let eus = self.loop_edgeuses(lu);
        let i = eus.iter().position(|&e| e == eu)?;
        Some(eus[(i + 1) % eus.len()])
    }

    /// The edgeuse preceding `eu` in its loop (wraps). `None` for wires.
    pub fn eu_prev(&self, eu: EdgeuseId) -> Option<EdgeuseId> {
        let lu = self.loopuse_of_eu(eu)?;
        let eus = self.loop_edgeuses(lu);
        let i = eus.iter().position(|&e| e == eu)?;
        Some(eus[(i + eus.len() - 1) % eus.len()])
    }

    /// The `Same`-oriented faceuse of a face. Panics if `face` is stale.
    pub fn same_faceuse(&self, face: FaceId) -> FaceuseId {
        let fu = self.faces[face].faceuse;
        if self.faceuses[fu].orientation == Orientation::Same {
            fu
        } else {
            self.faceuses[fu].mate
        }
    }

    /// Plane of a face, with the face's flip applied.
    pub fn face_plane(&self, face: FaceId) -> Result<PlaneEq> {
        let f = self.face(face)?;
        match &self.face_geoms[f.geom].geometry {
            FaceGeometry::Plane(pl) => Ok(if f.flip { pl.reversed() } else { *pl }),
            FaceGeometry::Surface(h) => Err(NmgError::UnsupportedGeometry(format!(
                "face uses spline surface {:?}, a plane is required",
                h
            ))),
        }
    }

    /// Plane of a faceuse: the face plane, reversed for the `Opposite` side.
    pub fn faceuse_plane(&self, fu: FaceuseId) -> Result<PlaneEq> {
        let f = self.faceuse(fu)?;
        let plane = self.face_plane(f.face)?;
        Ok(match f.orientation {
            Orientation::Opposite => plane.reversed(),
            _ => plane,
        })
    }

    /// Outward normal of a faceuse.
    pub fn faceuse_normal(&self, fu: FaceuseId) -> Result<Vec3> {
        Ok(self.faceuse_plane(fu)?.normal)
    }

    /// Unit vector in the plane of the edgeuse's face, perpendicular to the
    /// edgeuse and pointing into the face (faceuse normal × direction).
    ///
    /// `None` for wire edgeuses.
    pub fn eu_left_vec(&self, eu: EdgeuseId) -> Result<Option<Vec3>> {
        self.edgeuse(eu)?;
        let Some(fu) = self.faceuse_of_eu(eu) else {
            return Ok(None);
        };
        let normal = self.faceuse_normal(fu)?;
        let (a, b) = self.eu_points(eu);
        let left = normal.cross(&(b - a));
        let len = left.norm();
        if len <= f64::EPSILON {
            return Err(NmgError::DegenerateTopology(
                "edgeuse has no left vector (zero length or along the face normal)".into(),
            ));
        }
        Ok(Some(left / len))
    }

    /// The radial walk from `eu`: `eu`, then `mate(radial(eu))`, and so on
    /// until the cycle closes. One entry per face (or wire) on the edge.
    pub fn radial_walk(&self, eu: EdgeuseId) -> Result<Vec<EdgeuseId>> {
        self.edgeuse(eu)?;
        let mut out = Vec::new();
        let mut cur = eu;
        loop {
            out.push(cur);
            let r = self.edgeuse(cur)?.radial;
            cur = self.edgeuse(r)?.mate;
            if cur == eu {
                return Ok(out);
            }
            if out.len() > self.edgeuses.len() {
                return Err(NmgError::InvalidTopology(
                    "radial cycle does not close".into(),
                ));
            }
        }
    }

    /// Every edgeuse of an edge (both of each mate pair), in radial order.
    pub fn edge_uses(&self, edge: EdgeId) -> Result<Vec<EdgeuseId>> {
        let start = self.edge(edge)?.edgeuse;
        let walk = self.radial_walk(start)?;
        let mut out = Vec::with_capacity(walk.len() * 2);
        for eu in walk {
            out.push(eu);
            out.push(self.edgeuses[eu].radial);
        }
        Ok(out)
    }

    /// `(start, end)` of an edge's representative edgeuse.
    ///
    /// # Panics
    ///
    /// If `edge` is stale. See [`Model::try_edge_vertices`].
    pub fn edge_vertices(&self, edge: EdgeId) -> (VertexId, VertexId) {
        self.eu_vertices(self.edges[edge].edgeuse)
    }

    /// Checked form of [`Model::edge_vertices`].
    pub fn try_edge_vertices(&self, edge: EdgeId) -> Result<(VertexId, VertexId)> {
        self.try_eu_vertices(self.edge(edge)?.edgeuse)
    }

    /// Line geometry of an edgeuse, if it has any.
    pub fn eu_line(&self, eu: EdgeuseId) -> Option<(Point3, Vec3)> {
        let g = self.edgeuses[eu].geom?;
        match &self.edge_geoms[g].geometry {
            EdgeGeometry::Line { point, dir } => Some((*point, *dir)),
            EdgeGeometry::Curve(_) => None,
        }
    }

    /// Distinct vertices of a face, taken from its `Same` faceuse.
    pub fn face_vertices(&self, face: FaceId) -> Vec<VertexId> {
        let fu = self.same_faceuse(face);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &lu in &self.faceuses[fu].loopuses {
            for v in self.loop_vertices(lu) {
                if seen.insert(v) {
                    out.push(v);
                }
            }
        }
        out
    }

    /// Bounding box of a loopuse's vertices.
    pub fn loop_bbox(&self, lu: LoopuseId) -> Aabb3 {
        Aabb3::from_points(&self.loop_points(lu))
    }

    /// Bounding box of a face's vertices. Panics if `face` is stale.
    pub fn face_bbox(&self, face: FaceId) -> Aabb3 {
        let fu = self.same_faceuse(face);
        let mut aabb = Aabb3::empty();
        for &lu in &self.faceuses[fu].loopuses {
            aabb.include_box(&self.loop_bbox(lu));
        }
        aabb
    }

    /// Distinct vertices used anywhere in a shell.
    pub fn shell_vertices(&self, shell: ShellId) -> Result<Vec<VertexId>> {
        let s = self.shell(shell)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |v: VertexId| {
            if seen.insert(v) {
                out.push(v);
            }
        };
        for &fu in &s.faceuses {
            for &lu in &self.faceuses[fu].loopuses {
                self.loop_vertices(lu).into_iter().for_each(&mut push);
            }
        }
        for &lu in &s.wire_loopuses {
            self.loop_vertices(lu).into_iter().for_each(&mut push);
        }
        for &eu in &s.wire_edgeuses {
            push(self.eu_start(eu));
        }
        if let Some(vu) = s.lone_vertexuse {
            push(self.vertexuses[vu].vertex);
        }
        Ok(out)
    }

    /// Every live vertex in the model.
    pub fn model_vertices(&self) -> Vec<VertexId> {
        self.vertices.keys().collect()
    }

    /// Distinct edges used anywhere in a shell.
    pub fn shell_edges(&self, shell: ShellId) -> Result<Vec<EdgeId>> {
        let s = self.shell(shell)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let loop_eus = s
            .faceuses
            .iter()
            .flat_map(|&fu| self.faceuses[fu].loopuses.iter())
            .chain(s.wire_loopuses.iter())
            .flat_map(|&lu| self.loop_edgeuses(lu).iter());
        for &eu in loop_eus.chain(s.wire_edgeuses.iter()) {
            let e = self.edgeuses[eu].edge;
            if seen.insert(e) {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Distinct faces of a shell.
    pub fn shell_faces(&self, shell: ShellId) -> Result<Vec<FaceId>> {
        let s = self.shell(shell)?;
        let mut seen = HashSet::new();
        Ok(s.faceuses
            .iter()
            .map(|&fu| self.faceuses[fu].face)
            .filter(|f| seen.insert(*f))
            .collect())
    }
}
