//! Node records stored in the [`Model`](crate::Model) arena.

use nmg_kernel_math::{PlaneEq, Point3, Vec3};

use crate::{
    EdgeGeomId, EdgeId, EdgeuseId, FaceGeomId, FaceId, FaceuseId, LoopId, LoopuseId, RegionId,
    ShellId, VertexId, VertexuseId,
};

/// Orientation of a faceuse or loopuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Agrees with the underlying geometry (outer loops, outward faceuses).
    Same,
    /// Opposes the underlying geometry (holes, inward faceuses).
    Opposite,
    /// Wire loops, which have no face to be relative to.
    Unspecified,
}

impl Orientation {
    /// `Same` ↔ `Opposite`; `Unspecified` is unchanged.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Same => Orientation::Opposite,
            Orientation::Opposite => Orientation::Same,
            Orientation::Unspecified => Orientation::Unspecified,
        }
    }
}

/// A region: a set of shells.
#[derive(Debug, Clone, Default)]
pub struct Region {
    /// Shells owned by this region.
    pub shells: Vec<ShellId>,
}

/// A shell: faces, wires and possibly a lone vertex.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Owning region.
    pub region: RegionId,
    /// Faceuses (both orientations of every face).
    pub faceuses: Vec<FaceuseId>,
    /// Wire loopuses (both of each mate pair).
    pub wire_loopuses: Vec<LoopuseId>,
    /// Wire edgeuses (both of each mate pair).
    pub wire_edgeuses: Vec<EdgeuseId>,
    /// A single vertex with no edges, if any.
    pub lone_vertexuse: Option<VertexuseId>,
}

/// One oriented side of a face.
#[derive(Debug, Clone)]
pub struct Faceuse {
    /// Owning shell.
    pub shell: ShellId,
    /// The other side of the same face.
    pub mate: FaceuseId,
    /// The shared face record.
    pub face: FaceId,
    /// `Same` if this side's normal agrees with the face normal.
    pub orientation: Orientation,
    /// Loops bounding this side.
    pub loopuses: Vec<LoopuseId>,
}

/// A face, shared by its two faceuses.
#[derive(Debug, Clone)]
pub struct Face {
    /// One of the two faceuses.
    pub faceuse: FaceuseId,
    /// Shared surface geometry.
    pub geom: FaceGeomId,
    /// True if this face's normal is the reverse of its geometry's normal.
    pub flip: bool,
}

/// Opaque handle to a surface owned by an external evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Opaque handle to a curve owned by an external evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveHandle(pub u64);

/// Surface geometry of a face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceGeometry {
    /// A plane equation.
    Plane(PlaneEq),
    /// A spline surface evaluated elsewhere.
    Surface(SurfaceHandle),
}

/// Shared face geometry and the faces using it.
#[derive(Debug, Clone)]
pub struct FaceGeom {
    /// The surface.
    pub geometry: FaceGeometry,
    /// Faces referencing this geometry.
    pub faces: Vec<FaceId>,
}

/// What a loopuse hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopuseParent {
    /// A loop bounding a faceuse.
    Faceuse(FaceuseId),
    /// A wire loop directly in a shell.
    Shell(ShellId),
}

/// Contents of a loopuse.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopContents {
    /// Edgeuses in traversal order; each ends where the next begins.
    Edges(Vec<EdgeuseId>),
    /// A point loop.
    Vertex(VertexuseId),
}

/// One use of a loop.
#[derive(Debug, Clone)]
pub struct Loopuse {
    /// Owner.
    pub parent: LoopuseParent,
    /// The use of the same loop in the mate faceuse.
    pub mate: LoopuseId,
    /// Shared loop record.
    pub loop_id: LoopId,
    /// Outer boundary (`Same`) or hole (`Opposite`).
    pub orientation: Orientation,
    /// Edgeuses or a single vertexuse.
    pub contents: LoopContents,
}

/// A loop, shared by its two loopuses.
#[derive(Debug, Clone)]
pub struct Loop {
    /// One of the two loopuses.
    pub loopuse: LoopuseId,
}

/// What an edgeuse hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeuseParent {
    /// Part of a loop.
    Loopuse(LoopuseId),
    /// A wire edge directly in a shell.
    Shell(ShellId),
}

/// One directed use of an edge.
#[derive(Debug, Clone)]
pub struct Edgeuse {
    /// Owner.
    pub parent: EdgeuseParent,
    /// The opposite-direction use paired with this one.
    pub mate: EdgeuseId,
    /// Neighbor across the wedge of space on this use's side.
    pub radial: EdgeuseId,
    /// The shared edge.
    pub edge: EdgeId,
    /// Vertexuse at the start of this use.
    pub vu: VertexuseId,
    /// Shared line or curve geometry.
    pub geom: Option<EdgeGeomId>,
}

/// An edge, shared by every edgeuse in its radial cycle.
#[derive(Debug, Clone)]
pub struct Edge {
    /// One of the edgeuses.
    pub edgeuse: EdgeuseId,
}

/// Curve geometry of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeGeometry {
    /// Infinite line through `point` along `dir`.
    Line {
        /// A point on the line.
        point: Point3,
        /// Direction (not necessarily unit).
        dir: Vec3,
    },
    /// A curve evaluated elsewhere.
    Curve(CurveHandle),
}

/// Shared edge geometry and the edgeuses using it.
#[derive(Debug, Clone)]
pub struct EdgeGeom {
    /// The curve.
    pub geometry: EdgeGeometry,
    /// Edgeuses referencing this geometry.
    pub edgeuses: Vec<EdgeuseId>,
}

/// What a vertexuse hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexuseParent {
    /// Start of an edgeuse.
    Edgeuse(EdgeuseId),
    /// A point loop.
    Loopuse(LoopuseId),
    /// A lone vertex in a shell.
    Shell(ShellId),
}

/// One use of a vertex.
#[derive(Debug, Clone)]
pub struct Vertexuse {
    /// Owner.
    pub parent: VertexuseParent,
    /// The used vertex.
    pub vertex: VertexId,
}

/// A vertex with its coordinate.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position.
    pub point: Point3,
    /// Every use of this vertex.
    pub uses: Vec<VertexuseId>,
}
