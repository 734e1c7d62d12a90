//! Low-level mutation primitives used by the fusers.
//!
//! These keep the arena structurally consistent (mate, radial, parent and
//! geometry back-lists) but make no geometric judgements; deciding *when*
//! to merge is the caller's job.

use slotmap::SecondaryMap;
use tracing::trace;

use crate::entity::*;
use crate::error::{NmgError, Result};
use crate::model::Model;
use crate::{EdgeGeomId, EdgeId, EdgeuseId, FaceGeomId, VertexId};

impl Model {
    /// Move every use of `absorb` onto `keep` and remove `absorb`.
    pub fn join_vertices(&mut self, keep: VertexId, absorb: VertexId) -> Result<()> {
        if keep == absorb {
            return Ok(());
        }
        self.vertex(keep)?;
        let gone = self
            .vertices
            .remove(absorb)
            .ok_or(NmgError::StaleHandle("vertex"))?;
        for &vu in &gone.uses {
            self.vertexuses[vu].vertex = keep;
        }
        self.vertices[keep].uses.extend(gone.uses);
        Ok(())
    }

    /// Split the edge of `eu` at `v` in every loop and wire using it.
    ///
    /// With `eu` running `a → b`, the old edge keeps the `a – v` half and a
    /// new edge takes `v – b`. Returns the new edgeuse `v → b` that follows
    /// `eu` in its loop.
    pub fn split_edge(&mut self, eu: EdgeuseId, v: VertexId) -> Result<EdgeuseId> {
        self.vertex(v)?;
        let (a, b) = self.eu_vertices(eu);
        if v == a || v == b {
            return Err(NmgError::DegenerateTopology(
                "split vertex is an endpoint of the edge".into(),
            ));
        }
        let old_edge = self.edgeuses[eu].edge;
        let uses = self.edge_uses(old_edge)?;
        let new_edge = self.edges.insert(Edge {
            edgeuse: EdgeuseId::default(),
        });

        let mut old_mate = SecondaryMap::new();
        let mut old_radial = SecondaryMap::new();
        for &u in &uses {
            old_mate.insert(u, self.edgeuses[u].mate);
            old_radial.insert(u, self.edgeuses[u].radial);
        }

        // piece_a: the half touching `a`, piece_b: the half touching `b`.
        let mut piece_a = SecondaryMap::new();
        let mut piece_b = SecondaryMap::new();
        for &u in &uses {
            let parent = self.edgeuses[u].parent;
            let geom = self.edgeuses[u].geom;
            let from_a = self.eu_start(u) == a;
            let (u_edge, nu_edge) = if from_a {
                (old_edge, new_edge)
            } else {
                (new_edge, old_edge)
            };
            let nu = self.insert_bare_edgeuse(parent, v, nu_edge, geom);
            self.edgeuses[u].edge = u_edge;
            self.insert_after(parent, u, nu);
            if from_a {
                piece_a.insert(u, u);
                piece_b.insert(u, nu);
            } else {
                piece_a.insert(u, nu);
                piece_b.insert(u, u);
            }
        }

        for &u in &uses {
            let (m, r) = (old_mate[u], old_radial[u]);
            for pieces in [&piece_a, &piece_b] {
                let p = pieces[u];
                self.edgeuses[p].mate = pieces[m];
                self.edgeuses[p].radial = pieces[r];
            }
        }
        self.edges[old_edge].edgeuse = piece_a[eu];
        self.edges[new_edge].edgeuse = piece_b[eu];
        trace!(uses = uses.len(), ?old_edge, ?new_edge, "split edge");
        Ok(piece_b[eu])
    }

    fn insert_after(&mut self, parent: EdgeuseParent, after: EdgeuseId, eu: EdgeuseId) {
        let list = match parent {
            EdgeuseParent::Loopuse(lu) => match &mut self.loopuses[lu].contents {
                LoopContents::Edges(eus) => eus,
                LoopContents::Vertex(_) => return,
            },
            EdgeuseParent::Shell(s) => &mut self.shells[s].wire_edgeuses,
        };
        match list.iter().position(|&e| e == after) {
            Some(i) => list.insert(i + 1, eu),
            None => list.push(eu),
        }
    }

    /// Make `a` and `b` radial neighbours of each other.
    pub fn set_radial_pair(&mut self, a: EdgeuseId, b: EdgeuseId) {
        self.edgeuses[a].radial = b;
        self.edgeuses[b].radial = a;
    }

    /// Re-point every use of `gone` at `keep` and remove `gone`.
    ///
    /// The radial links must already have been spliced so that the uses of
    /// both edges form one cycle; only that cycle is visited.
    pub fn absorb_edge(&mut self, keep: EdgeId, gone: EdgeId) -> Result<()> {
        if keep == gone {
            return Ok(());
        }
        let uses = self.edge_uses(keep)?;
        self.edges
            .remove(gone)
            .ok_or(NmgError::StaleHandle("edge"))?;
        for eu in uses {
            let eu = &mut self.edgeuses[eu];
            if eu.edge == gone {
                eu.edge = keep;
            }
        }
        Ok(())
    }

    /// Point every face using `gone` at `keep` and remove `gone`.
    ///
    /// With `flip` set (the planes are anti-aligned) each moved face toggles
    /// its flip bit so its own normal is unchanged.
    pub fn share_face_geometry(&mut self, keep: FaceGeomId, gone: FaceGeomId, flip: bool) -> Result<()> {
        if keep == gone {
            return Ok(());
        }
        if !self.face_geoms.contains_key(keep) {
            return Err(NmgError::StaleHandle("face geometry"));
        }
        let removed = self
            .face_geoms
            .remove(gone)
            .ok_or(NmgError::StaleHandle("face geometry"))?;
        for &f in &removed.faces {
            let face = &mut self.faces[f];
            face.geom = keep;
            if flip {
                face.flip = !face.flip;
            }
        }
        self.face_geoms[keep].faces.extend(removed.faces);
        Ok(())
    }

    /// Point every edgeuse using `gone` at `keep` and remove `gone`.
    pub fn share_edge_geometry(&mut self, keep: EdgeGeomId, gone: EdgeGeomId) -> Result<()> {
        if keep == gone {
            return Ok(());
        }
        if !self.edge_geoms.contains_key(keep) {
            return Err(NmgError::StaleHandle("edge geometry"));
        }
        let removed = self
            .edge_geoms
            .remove(gone)
            .ok_or(NmgError::StaleHandle("edge geometry"))?;
        for &eu in &removed.edgeuses {
            self.edgeuses[eu].geom = Some(keep);
        }
        self.edge_geoms[keep].edgeuses.extend(removed.edgeuses);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::check_model;
    use nmg_kernel_math::Point3;

    #[test]
    fn test_join_vertices_moves_uses() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let d = model.add_vertex(Point3::new(2.0, 0.0, 0.0));
        model.add_wire_edge(s, a, b).unwrap();
        model.add_wire_edge(s, c, d).unwrap();

        model.join_vertices(b, c).unwrap();
        assert!(model.vertex(c).is_err());
        assert_eq!(model.vertices[b].uses.len(), 2);
        assert_eq!(model.shell_vertices(s).unwrap().len(), 3);
        check_model(&model).unwrap();
    }

    #[test]
    fn test_split_edge_in_face() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let v = [
            model.add_vertex(Point3::new(0.0, 0.0, 0.0)),
            model.add_vertex(Point3::new(2.0, 0.0, 0.0)),
            model.add_vertex(Point3::new(2.0, 2.0, 0.0)),
        ];
        let fu = model.add_face(s, &v).unwrap();
        let mid = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let lu = model.faceuses[fu].loopuses[0];
        let eu = model.loop_edgeuses(lu)[0];

        let new_eu = model.split_edge(eu, mid).unwrap();
        assert_eq!(model.eu_vertices(eu), (v[0], mid));
        assert_eq!(model.eu_vertices(new_eu), (mid, v[1]));
        assert_eq!(model.loop_vertices(lu), vec![v[0], mid, v[1], v[2]]);

        let lumate = model.loopuses[lu].mate;
        assert_eq!(model.loop_edgeuses(lumate).len(), 4);
        assert_eq!(model.edges.len(), 4);
        assert_ne!(model.edgeuses[eu].edge, model.edgeuses[new_eu].edge);
        check_model(&model).unwrap();
    }

    #[test]
    fn test_split_edge_rejects_endpoint() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let eu = model.add_wire_edge(s, a, b).unwrap();
        assert!(matches!(
            model.split_edge(eu, a),
            Err(NmgError::DegenerateTopology(_))
        ));
    }

    #[test]
    fn test_absorb_edge_follows_spliced_cycle() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let eu1 = model.add_wire_edge(s, a, b).unwrap();
        let eu2 = model.add_wire_edge(s, a, b).unwrap();
        let (e1, e2) = (model.edgeuses[eu1].edge, model.edgeuses[eu2].edge);

        let (m1, m2) = (model.edgeuses[eu1].mate, model.edgeuses[eu2].mate);
        model.set_radial_pair(eu1, m2);
        model.set_radial_pair(eu2, m1);
        model.absorb_edge(e1, e2).unwrap();

        assert_eq!(model.edges.len(), 1);
        for eu in [eu1, eu2, m1, m2] {
            assert_eq!(model.edgeuses[eu].edge, e1);
        }
        assert_eq!(model.edge_uses(e1).unwrap().len(), 4);
        check_model(&model).unwrap();
    }

    #[test]
    fn test_absorb_stale_edge_rejected() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let eu = model.add_wire_edge(s, a, b).unwrap();
        let keep = model.edgeuses[eu].edge;
        let err = model.absorb_edge(keep, EdgeId::default());
        assert_eq!(err, Err(NmgError::StaleHandle("edge")));
        assert_eq!(model.edges.len(), 1);
    }

    #[test]
    fn test_split_wire_edge() {
        let mut model = Model::new();
        let r = model.add_region();
        let s = model.add_shell(r).unwrap();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(4.0, 0.0, 0.0));
        let m = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let eu = model.add_wire_edge(s, a, b).unwrap();
        let nu = model.split_edge(eu, m).unwrap();
        assert_eq!(model.shells[s].wire_edgeuses.len(), 4);
        assert_eq!(model.eu_vertices(nu), (m, b));
        let numate = model.edgeuses[nu].mate;
        assert_eq!(model.eu_vertices(numate), (b, m));
        check_model(&model).unwrap();
    }
}
