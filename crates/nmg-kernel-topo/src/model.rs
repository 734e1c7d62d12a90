//! The arena and its construction API.

use nmg_kernel_math::PlaneEq;
use slotmap::SlotMap;

use crate::entity::*;
use crate::error::{NmgError, Result};
use crate::{
    EdgeGeomId, EdgeId, EdgeuseId, FaceGeomId, FaceId, FaceuseId, LoopId, LoopuseId, RegionId,
    ShellId, VertexId, VertexuseId,
};

/// The complete topology graph: one slotmap table per node kind.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// All regions.
    pub regions: SlotMap<RegionId, Region>,
    /// All shells.
    pub shells: SlotMap<ShellId, Shell>,
    /// All faceuses.
    pub faceuses: SlotMap<FaceuseId, Faceuse>,
    /// All faces.
    pub faces: SlotMap<FaceId, Face>,
    /// All face geometry.
    pub face_geoms: SlotMap<FaceGeomId, FaceGeom>,
    /// All loopuses.
    pub loopuses: SlotMap<LoopuseId, Loopuse>,
    /// All loops.
    pub loops: SlotMap<LoopId, Loop>,
    /// All edgeuses.
    pub edgeuses: SlotMap<EdgeuseId, Edgeuse>,
    /// All edges.
    pub edges: SlotMap<EdgeId, Edge>,
    /// All edge geometry.
    pub edge_geoms: SlotMap<EdgeGeomId, EdgeGeom>,
    /// All vertexuses.
    pub vertexuses: SlotMap<VertexuseId, Vertexuse>,
    /// All vertices.
    pub vertices: SlotMap<VertexId, Vertex>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Checked lookups
    // =========================================================================

    /// Look up a shell.
    pub fn shell(&self, id: ShellId) -> Result<&Shell> {
        self.shells.get(id).ok_or(NmgError::StaleHandle("shell"))
    }

    /// Look up a faceuse.
    pub fn faceuse(&self, id: FaceuseId) -> Result<&Faceuse> {
        self.faceuses.get(id).ok_or(NmgError::StaleHandle("faceuse"))
    }

    /// Look up a face.
    pub fn face(&self, id: FaceId) -> Result<&Face> {
        self.faces.get(id).ok_or(NmgError::StaleHandle("face"))
    }

    /// Look up a loopuse.
    pub fn loopuse(&self, id: LoopuseId) -> Result<&Loopuse> {
        self.loopuses.get(id).ok_or(NmgError::StaleHandle("loopuse"))
    }

    /// Look up an edgeuse.
    pub fn edgeuse(&self, id: EdgeuseId) -> Result<&Edgeuse> {
        self.edgeuses.get(id).ok_or(NmgError::StaleHandle("edgeuse"))
    }

    /// Look up an edge.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(id).ok_or(NmgError::StaleHandle("edge"))
    }

    /// Look up a vertex.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices.get(id).ok_or(NmgError::StaleHandle("vertex"))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add an empty region.
    pub fn add_region(&mut self) -> RegionId {
        self.regions.insert(Region::default())
    }

    /// Add an empty shell to a region.
    pub fn add_shell(&mut self, region: RegionId) -> Result<ShellId> {
        if !self.regions.contains_key(region) {
            return Err(NmgError::StaleHandle("region"));
        }
        let shell = self.shells.insert(Shell {
            region,
            faceuses: Vec::new(),
            wire_loopuses: Vec::new(),
            wire_edgeuses: Vec::new(),
            lone_vertexuse: None,
        });
        self.regions[region].shells.push(shell);
        Ok(shell)
    }

    /// Add a vertex with no uses.
    pub fn add_vertex(&mut self, point: nmg_kernel_math::Point3) -> VertexId {
        self.vertices.insert(Vertex {
            point,
            uses: Vec::new(),
        })
    }

    /// Add a planar face bounded by `verts` (counter-clockwise about the
    /// outward normal). The plane is fitted with Newell's method.
    ///
    /// Returns the `Same`-oriented faceuse. Every boundary edge is new;
    /// sharing edges with neighbors is the edge fuser's job.
    pub fn add_face(&mut self, shell: ShellId, verts: &[VertexId]) -> Result<FaceuseId> {
        self.check_loop_vertices(verts, 3)?;
        let points: Vec<_> = verts.iter().map(|&v| self.vertices[v].point).collect();
        let plane = PlaneEq::from_polygon(&points).ok_or_else(|| {
            NmgError::DegenerateTopology(format!(
                "singular plane fit for {}-vertex loop",
                verts.len()
            ))
        })?;
        self.add_face_with_plane(shell, verts, plane)
    }

    /// Add a face with an explicit plane. Two-vertex (crack) loops are allowed.
    pub fn add_face_with_plane(
        &mut self,
        shell: ShellId,
        verts: &[VertexId],
        plane: PlaneEq,
    ) -> Result<FaceuseId> {
        self.add_face_with_geometry(shell, verts, FaceGeometry::Plane(plane))
    }

    /// Add a face over arbitrary surface geometry.
    pub fn add_face_with_geometry(
        &mut self,
        shell: ShellId,
        verts: &[VertexId],
        geometry: FaceGeometry,
    ) -> Result<FaceuseId> {
        if !self.shells.contains_key(shell) {
            return Err(NmgError::StaleHandle("shell"));
        }
        self.check_loop_vertices(verts, 2)?;

        let geom = self.face_geoms.insert(FaceGeom {
            geometry,
            faces: Vec::new(),
        });
        let face = self.faces.insert(Face {
            faceuse: FaceuseId::default(),
            geom,
            flip: false,
        });
        self.face_geoms[geom].faces.push(face);

        let fu = self.faceuses.insert(Faceuse {
            shell,
            mate: FaceuseId::default(),
            face,
            orientation: Orientation::Same,
            loopuses: Vec::new(),
        });
        let fumate = self.faceuses.insert(Faceuse {
            shell,
            mate: fu,
            face,
            orientation: Orientation::Opposite,
            loopuses: Vec::new(),
        });
        self.faceuses[fu].mate = fumate;
        self.faces[face].faceuse = fu;
        self.shells[shell].faceuses.extend([fu, fumate]);

        self.add_loop_pair(
            LoopuseParent::Faceuse(fu),
            LoopuseParent::Faceuse(fumate),
            Orientation::Same,
            verts,
        );
        Ok(fu)
    }

    /// Add a hole (an `Opposite` loop) to a face. `verts` should run
    /// clockwise about `fu`'s normal.
    pub fn add_hole(&mut self, fu: FaceuseId, verts: &[VertexId]) -> Result<LoopuseId> {
        let mate = self.faceuse(fu)?.mate;
        self.check_loop_vertices(verts, 2)?;
        Ok(self.add_loop_pair(
            LoopuseParent::Faceuse(fu),
            LoopuseParent::Faceuse(mate),
            Orientation::Opposite,
            verts,
        ))
    }

    /// Add a point loop on vertex `v` to a face.
    pub fn add_vertex_loop(
        &mut self,
        fu: FaceuseId,
        v: VertexId,
        orientation: Orientation,
    ) -> Result<LoopuseId> {
        let mate = self.faceuse(fu)?.mate;
        self.vertex(v)?;
        let lp = self.loops.insert(Loop {
            loopuse: LoopuseId::default(),
        });
        let lu = self.insert_vertex_loopuse(LoopuseParent::Faceuse(fu), lp, orientation, v);
        let lumate = self.insert_vertex_loopuse(LoopuseParent::Faceuse(mate), lp, orientation, v);
        self.loopuses[lu].mate = lumate;
        self.loopuses[lumate].mate = lu;
        self.loops[lp].loopuse = lu;
        self.faceuses[fu].loopuses.push(lu);
        self.faceuses[mate].loopuses.push(lumate);
        Ok(lu)
    }

    /// Add a wire edge `a → b` to a shell. Returns the `a → b` edgeuse.
    pub fn add_wire_edge(&mut self, shell: ShellId, a: VertexId, b: VertexId) -> Result<EdgeuseId> {
        self.shell(shell)?;
        self.check_loop_vertices(&[a, b], 2)?;
        let (eu, eumate) = self.insert_edge_pair(
            EdgeuseParent::Shell(shell),
            EdgeuseParent::Shell(shell),
            a,
            b,
        );
        self.shells[shell].wire_edgeuses.extend([eu, eumate]);
        Ok(eu)
    }

    /// Add a closed wire loop to a shell.
    pub fn add_wire_loop(&mut self, shell: ShellId, verts: &[VertexId]) -> Result<LoopuseId> {
        self.shell(shell)?;
        self.check_loop_vertices(verts, 2)?;
        let lu = self.add_loop_pair(
            LoopuseParent::Shell(shell),
            LoopuseParent::Shell(shell),
            Orientation::Unspecified,
            verts,
        );
        let lumate = self.loopuses[lu].mate;
        self.shells[shell].wire_loopuses.extend([lu, lumate]);
        Ok(lu)
    }

    /// Give a shell a lone vertex.
    pub fn add_lone_vertex(&mut self, shell: ShellId, v: VertexId) -> Result<VertexuseId> {
        if self.shell(shell)?.lone_vertexuse.is_some() {
            return Err(NmgError::DegenerateTopology(
                "shell already has a lone vertex".into(),
            ));
        }
        self.vertex(v)?;
        let vu = self.new_vertexuse(v, VertexuseParent::Shell(shell));
        self.shells[shell].lone_vertexuse = Some(vu);
        Ok(vu)
    }

    // =========================================================================
    // Internal builders
    // =========================================================================

    fn check_loop_vertices(&self, verts: &[VertexId], min: usize) -> Result<()> {
        if verts.len() < min {
            return Err(NmgError::DegenerateTopology(format!(
                "loop needs at least {} vertices, got {}",
                min,
                verts.len()
            )));
        }
        for (i, &v) in verts.iter().enumerate() {
            self.vertex(v)?;
            if v == verts[(i + 1) % verts.len()] {
                return Err(NmgError::DegenerateTopology(format!(
                    "zero-length edge at loop position {}",
                    i
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn new_vertexuse(&mut self, v: VertexId, parent: VertexuseParent) -> VertexuseId {
        let vu = self.vertexuses.insert(Vertexuse { parent, vertex: v });
        self.vertices[v].uses.push(vu);
        vu
    }

    fn insert_vertex_loopuse(
        &mut self,
        parent: LoopuseParent,
        loop_id: LoopId,
        orientation: Orientation,
        v: VertexId,
    ) -> LoopuseId {
        let lu = self.loopuses.insert(Loopuse {
            parent,
            mate: LoopuseId::default(),
            loop_id,
            orientation,
            contents: LoopContents::Edges(Vec::new()),
        });
        let vu = self.new_vertexuse(v, VertexuseParent::Loopuse(lu));
        self.loopuses[lu].contents = LoopContents::Vertex(vu);
        lu
    }

    /// Insert an edgeuse starting at `start` with no links yet.
    pub(crate) fn insert_bare_edgeuse(
        &mut self,
        parent: EdgeuseParent,
        start: VertexId,
        edge: EdgeId,
        geom: Option<EdgeGeomId>,
    ) -> EdgeuseId {
        let eu = self.edgeuses.insert(Edgeuse {
            parent,
            mate: EdgeuseId::default(),
            radial: EdgeuseId::default(),
            edge,
            vu: VertexuseId::default(),
            geom,
        });
        let vu = self.new_vertexuse(start, VertexuseParent::Edgeuse(eu));
        self.edgeuses[eu].vu = vu;
        if let Some(g) = geom {
            self.edge_geoms[g].edgeuses.push(eu);
        }
        eu
    }

    /// New edge `a → b` with line geometry, one use in each parent.
    /// The pair is mate- and radial-linked to itself.
    fn insert_edge_pair(
        &mut self,
        parent: EdgeuseParent,
        mate_parent: EdgeuseParent,
        a: VertexId,
        b: VertexId,
    ) -> (EdgeuseId, EdgeuseId) {
        let pa = self.vertices[a].point;
        let pb = self.vertices[b].point;
        let geom = self.edge_geoms.insert(EdgeGeom {
            geometry: EdgeGeometry::Line {
                point: pa,
                dir: pb - pa,
            },
            edgeuses: Vec::new(),
        });
        let edge = self.edges.insert(Edge {
            edgeuse: EdgeuseId::default(),
        });
        let eu = self.insert_bare_edgeuse(parent, a, edge, Some(geom));
        let eumate = self.insert_bare_edgeuse(mate_parent, b, edge, Some(geom));
        self.edgeuses[eu].mate = eumate;
        self.edgeuses[eu].radial = eumate;
        self.edgeuses[eumate].mate = eu;
        self.edgeuses[eumate].radial = eu;
        self.edges[edge].edgeuse = eu;
        (eu, eumate)
    }

    /// Build a loop and its mate over `verts`. The mate runs the reverse way.
    fn add_loop_pair(
        &mut self,
        parent: LoopuseParent,
        mate_parent: LoopuseParent,
        orientation: Orientation,
        verts: &[VertexId],
    ) -> LoopuseId {
        let lp = self.loops.insert(Loop {
            loopuse: LoopuseId::default(),
        });
        let lu = self.loopuses.insert(Loopuse {
            parent,
            mate: LoopuseId::default(),
            loop_id: lp,
            orientation,
            contents: LoopContents::Edges(Vec::new()),
        });
        let lumate = self.loopuses.insert(Loopuse {
            parent: mate_parent,
            mate: lu,
            loop_id: lp,
            orientation,
            contents: LoopContents::Edges(Vec::new()),
        });
        self.loopuses[lu].mate = lumate;
        self.loops[lp].loopuse = lu;

        let n = verts.len();
        let mut forward = Vec::with_capacity(n);
        let mut backward = Vec::with_capacity(n);
        for i in 0..n {
            let (eu, eumate) = self.insert_edge_pair(
                EdgeuseParent::Loopuse(lu),
                EdgeuseParent::Loopuse(lumate),
                verts[i],
                verts[(i + 1) % n],
            );
            forward.push(eu);
            backward.push(eumate);
        }
        backward.reverse();
        self.loopuses[lu].contents = LoopContents::Edges(forward);
        self.loopuses[lumate].contents = LoopContents::Edges(backward);

        if let LoopuseParent::Faceuse(fu) = parent {
            self.faceuses[fu].loopuses.push(lu);
        }
        if let LoopuseParent::Faceuse(fu) = mate_parent {
            self.faceuses[fu].loopuses.push(lumate);
        }
        lu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmg_kernel_math::Point3;

    fn square(model: &mut Model, shell: ShellId) -> (FaceuseId, [VertexId; 4]) {
        let v = [
            model.add_vertex(Point3::new(0.0, 0.0, 0.0)),
            model.add_vertex(Point3::new(1.0, 0.0, 0.0)),
            model.add_vertex(Point3::new(1.0, 1.0, 0.0)),
            model.add_vertex(Point3::new(0.0, 1.0, 0.0)),
        ];
        (model.add_face(shell, &v).unwrap(), v)
    }

    #[test]
    fn test_add_face_counts() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let (fu, _) = square(&mut model, s);

        assert_eq!(model.faces.len(), 1);
        assert_eq!(model.faceuses.len(), 2);
        assert_eq!(model.loopuses.len(), 2);
        assert_eq!(model.edges.len(), 4);
        assert_eq!(model.edgeuses.len(), 8);
        assert_eq!(model.vertexuses.len(), 8);
        assert_eq!(model.faceuses[fu].orientation, Orientation::Same);
        let mate = model.faceuses[fu].mate;
        assert_eq!(model.faceuses[mate].orientation, Orientation::Opposite);
        assert_eq!(model.faceuses[mate].mate, fu);
    }

    #[test]
    fn test_mate_loop_runs_backwards() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let (fu, v) = square(&mut model, s);
        let lu = model.faceuses[fu].loopuses[0];
        let lumate = model.loopuses[lu].mate;
        assert_eq!(model.loop_vertices(lu), v.to_vec());
        assert_eq!(model.loop_vertices(lumate), vec![v[0], v[3], v[2], v[1]]);
    }

    #[test]
    fn test_degenerate_faces_rejected() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = model.add_vertex(Point3::new(2.0, 0.0, 0.0));
        assert!(matches!(
            model.add_face(s, &[a, b, c]),
            Err(NmgError::DegenerateTopology(_))
        ));
        assert!(matches!(
            model.add_face(s, &[a, b, b]),
            Err(NmgError::DegenerateTopology(_))
        ));
        assert!(matches!(
            model.add_face(s, &[a, b]),
            Err(NmgError::DegenerateTopology(_))
        ));
    }

    #[test]
    fn test_stale_vertex_rejected() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = model.add_vertex(Point3::new(1.0, 1.0, 0.0));
        model.vertices.remove(c);
        assert_eq!(
            model.add_face(s, &[a, b, c]),
            Err(NmgError::StaleHandle("vertex"))
        );
    }

    #[test]
    fn test_wire_and_lone_vertex() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let eu = model.add_wire_edge(s, a, b).unwrap();
        assert_eq!(model.eu_vertices(eu), (a, b));
        assert_eq!(model.edgeuses[eu].radial, model.edgeuses[eu].mate);
        assert_eq!(model.shells[s].wire_edgeuses.len(), 2);

        model.add_lone_vertex(s, a).unwrap();
        assert!(model.add_lone_vertex(s, b).is_err());
    }
}
