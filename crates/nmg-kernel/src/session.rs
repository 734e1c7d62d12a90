//! The fuse pipeline over one owned model.

use nmg_kernel_classify::{classify_point_vs_face, Classification, ClassifyOptions};
use nmg_kernel_fuse::{
    break_edges_on_vertices, fuse_edge_geometry, fuse_edges, fuse_face_geometry, fuse_vertices,
    verify_radial_orders, NoProgress, Progress, Scope,
};
use nmg_kernel_math::{Point3, Tolerance};
use nmg_kernel_topo::{validate, FaceId, Model, Result, ShellId};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::NmgConfig;

/// Merge counts from one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FuseReport {
    /// Vertices merged, both passes.
    pub vertices: usize,
    /// Edges split at vertices.
    pub edge_breaks: usize,
    /// Face geometry records shared.
    pub face_geometry: usize,
    /// Edges radially joined.
    pub edges: usize,
    /// Edge geometry records shared.
    pub edge_geometry: usize,
}

impl FuseReport {
    /// Sum of all merges.
    pub fn total(&self) -> usize {
        self.vertices + self.edge_breaks + self.face_geometry + self.edges + self.edge_geometry
    }

    /// Nothing was merged.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A model plus the tolerance and options it is fused and classified with.
#[derive(Debug, Clone)]
pub struct Session {
    model: Model,
    config: NmgConfig,
    tol: Tolerance,
    opts: ClassifyOptions,
}

impl Session {
    /// Take ownership of `model`. Fails if the config's tolerance or
    /// classifier settings are unusable.
    pub fn new(model: Model, config: NmgConfig) -> crate::error::Result<Self> {
        let tol = config.tolerance()?;
        let opts = config.classify_options()?;
        Ok(Self {
            model,
            config,
            tol,
            opts,
        })
    }

    /// The model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The model, for construction between fuse runs.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Give the model back.
    pub fn into_model(self) -> Model {
        self.model
    }

    /// The validated tolerance.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// The config the session was built from.
    pub fn config(&self) -> &NmgConfig {
        &self.config
    }

    /// Run the pipeline over the whole model.
    pub fn fuse_model(&mut self) -> Result<FuseReport> {
        self.fuse_with_progress(Scope::Model, &mut NoProgress)
    }

    /// Run the pipeline over one shell.
    pub fn fuse_shell(&mut self, shell: ShellId) -> Result<FuseReport> {
        self.model.shell(shell)?;
        self.fuse_with_progress(Scope::Shell(shell), &mut NoProgress)
    }

    /// Run the pipeline, polling `progress` inside every pass.
    ///
    /// A cancelled run leaves the merges made so far in place and returns
    /// [`NmgError::Cancelled`](nmg_kernel_topo::NmgError::Cancelled).
    pub fn fuse_with_progress(
        &mut self,
        scope: Scope,
        progress: &mut dyn Progress,
    ) -> Result<FuseReport> {
        let tol = self.tol;
        let stages = self.config.fuse;
        let model = &mut self.model;
        let mut report = FuseReport {
            vertices: fuse_vertices(model, scope, &tol, progress)?,
            ..FuseReport::default()
        };
        if stages.break_edges {
            report.edge_breaks = break_edges_on_vertices(model, scope, &tol, progress)?;
        }
        if stages.fuse_faces {
            report.face_geometry = fuse_face_geometry(model, scope, &tol, progress)?;
        }
        let edges = fuse_edges(model, scope, &tol, &self.opts, progress)?;
        report.vertices += edges.vertices;
        report.edges = edges.edges;
        if stages.fuse_edge_geometry {
            report.edge_geometry = fuse_edge_geometry(model, scope, &tol, progress)?;
        }
        if stages.verify {
            self.verify(scope)?;
        }
        info!(
            vertices = report.vertices,
            edge_breaks = report.edge_breaks,
            face_geometry = report.face_geometry,
            edges = report.edges,
            edge_geometry = report.edge_geometry,
            "fuse pipeline complete"
        );
        Ok(report)
    }

    /// Structural check, vertex uniqueness and radial order of every edge
    /// in `scope`.
    pub fn verify(&self, scope: Scope) -> Result<()> {
        validate::check_model(&self.model)?;
        validate::verify_vertex_uniqueness(&self.model, &self.tol)?;
        let edges = match scope {
            Scope::Model => self.model.edges.keys().collect(),
            Scope::Shell(s) => self.model.shell_edges(s)?,
        };
        verify_radial_orders(&self.model, &edges, &self.tol)?;
        debug!(edges = edges.len(), "model verified");
        Ok(())
    }

    /// Classify `pt` against `face`.
    pub fn classify_point(&self, pt: &Point3, face: FaceId) -> Result<Classification> {
        classify_point_vs_face(&self.model, pt, face, &self.tol, &self.opts)
    }
}
