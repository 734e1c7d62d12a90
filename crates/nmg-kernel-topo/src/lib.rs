#![warn(missing_docs)]

//! Radial-edge topology for the NMG kernel.
//!
//! The whole graph (Model → Region → Shell → Faceuse/Loopuse/Edgeuse/
//! Vertexuse, plus the shared Face/Loop/Edge/Vertex records and their
//! geometry) lives in one [`Model`] arena of `slotmap` tables. Every
//! cross-link is a typed, generation-checked key, so destroying a node
//! during a merge invalidates stale references instead of aliasing them.
//!
//! Conventions:
//! - `mate(mate(eu)) == eu` and `radial(radial(eu)) == eu`.
//! - The radial cycle around an edge is walked `eu → radial → mate`.
//! - A faceuse and its mate have opposite orientations; a loopuse and
//!   its mate share one. Outer loops are `Same`, holes `Opposite`.

mod entity;
mod error;
mod model;
mod mutate;
mod query;
pub mod validate;

pub use entity::*;
pub use error::{NmgError, Result};
pub use model::Model;

use slotmap::new_key_type;

new_key_type! {
    /// Key of a [`Region`].
    pub struct RegionId;
    /// Key of a [`Shell`].
    pub struct ShellId;
    /// Key of a [`Faceuse`].
    pub struct FaceuseId;
    /// Key of a [`Face`].
    pub struct FaceId;
    /// Key of a [`FaceGeom`].
    pub struct FaceGeomId;
    /// Key of a [`Loopuse`].
    pub struct LoopuseId;
    /// Key of a [`Loop`].
    pub struct LoopId;
    /// Key of an [`Edgeuse`].
    pub struct EdgeuseId;
    /// Key of an [`Edge`].
    pub struct EdgeId;
    /// Key of an [`EdgeGeom`].
    pub struct EdgeGeomId;
    /// Key of a [`Vertexuse`].
    pub struct VertexuseId;
    /// Key of a [`Vertex`].
    pub struct VertexId;
}
