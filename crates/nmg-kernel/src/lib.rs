#![warn(missing_docs)]

//! Tolerance-driven fusing and point classification for non-manifold
//! boundary-representation models.
//!
//! A [`Session`] owns a [`Model`] and runs the fuse pipeline over it:
//! vertex fuse, edge break, face-geometry fuse, edge fuse with radial
//! reconciliation, edge-geometry fuse, then verification. Tolerances and
//! stage switches come from an [`NmgConfig`].
//!
//! # Example
//!
//! ```
//! use nmg_kernel::{Model, NmgConfig, Point3, Session};
//!
//! let mut model = Model::new();
//! let r = model.add_region();
//! let s = model.add_shell(r).unwrap();
//! // Two triangles over their own copies of the shared diagonal.
//! for tri in [[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], [(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]] {
//!     let v: Vec<_> = tri
//!         .iter()
//!         .map(|&(x, y)| model.add_vertex(Point3::new(x, y, 0.0)))
//!         .collect();
//!     model.add_face(s, &v).unwrap();
//! }
//!
//! let mut session = Session::new(model, NmgConfig::default()).unwrap();
//! let report = session.fuse_model().unwrap();
//! assert_eq!(report.vertices, 2);
//! assert_eq!(report.edges, 1);
//! ```

mod config;
mod error;
mod session;

pub use config::{ClassifySettings, FuseSettings, NmgConfig, ToleranceSettings};
pub use error::ConfigError;
pub use session::{FuseReport, Session};

pub use nmg_kernel_classify;
pub use nmg_kernel_fuse;
pub use nmg_kernel_math;
pub use nmg_kernel_topo;

pub use nmg_kernel_classify::{Classification, ClassifyOptions};
pub use nmg_kernel_fuse::{NoProgress, Progress, Scope};
pub use nmg_kernel_math::{Point3, Tolerance, Vec3};
pub use nmg_kernel_topo::{Model, NmgError, Result};
