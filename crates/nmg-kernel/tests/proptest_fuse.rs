//! Property-based tests for the fuse pipeline.
//!
//! Run with: cargo test -p nmg-kernel -- proptest

use nmg_kernel::nmg_kernel_fuse::fuse_vertices;
use nmg_kernel::nmg_kernel_topo::validate;
use nmg_kernel::{Model, NmgConfig, NoProgress, Point3, Scope, Session, Tolerance};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Clusters of points: a few centres, each with copies nudged by less than
/// half the default tolerance, plus points scattered anywhere.
fn arb_cloud() -> impl Strategy<Value = Vec<[f64; 3]>> {
    let nudge = Tolerance::DEFAULT.dist * 0.45;
    let cluster = (
        prop::array::uniform3(-10.0..10.0f64),
        prop::collection::vec(prop::array::uniform3(-nudge..nudge), 1..5),
    )
        .prop_map(|(c, offsets)| {
            offsets
                .into_iter()
                .map(|o| [c[0] + o[0], c[1] + o[1], c[2] + o[2]])
                .collect::<Vec<_>>()
        });
    (
        prop::collection::vec(cluster, 0..8),
        prop::collection::vec(prop::array::uniform3(-10.0..10.0f64), 0..20),
    )
        .prop_map(|(clusters, scattered)| clusters.into_iter().flatten().chain(scattered).collect())
}

/// Per-corner in-plane nudges for an `n × n` grid of loose quads.
fn arb_grid() -> impl Strategy<Value = (usize, Vec<[f64; 2]>)> {
    let nudge = Tolerance::DEFAULT.dist / 50.0;
    (1usize..4).prop_flat_map(move |n| {
        (
            Just(n),
            prop::collection::vec(prop::array::uniform2(-nudge..nudge), n * n * 4),
        )
    })
}

fn loose_grid(n: usize, nudges: &[[f64; 2]]) -> Model {
    let mut model = Model::new();
    let r = model.add_region();
    let s = model.add_shell(r).unwrap();
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i as f64, j as f64);
            let corners = [(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)];
            let base = (i * n + j) * 4;
            let verts: Vec<_> = corners
                .iter()
                .enumerate()
                .map(|(k, &(cx, cy))| {
                    let d = nudges[base + k];
                    model.add_vertex(Point3::new(cx + d[0], cy + d[1], 0.0))
                })
                .collect();
            model.add_face(s, &verts).unwrap();
        }
    }
    model
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_vertex_fuse_leaves_unique_vertices(cloud in arb_cloud()) {
        let mut model = Model::new();
        for p in &cloud {
            model.add_vertex(Point3::new(p[0], p[1], p[2]));
        }
        let tol = Tolerance::default();
        let merged = fuse_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        prop_assert_eq!(merged + model.vertices.len(), cloud.len());
        prop_assert!(validate::verify_vertex_uniqueness(&model, &tol).is_ok());

        let again = fuse_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).unwrap();
        prop_assert_eq!(again, 0);
    }

    #[test]
    fn proptest_grid_pipeline_is_idempotent((n, nudges) in arb_grid()) {
        let mut session = Session::new(loose_grid(n, &nudges), NmgConfig::default()).unwrap();
        let first = session.fuse_model().unwrap();
        prop_assert_eq!(session.model().vertices.len(), (n + 1) * (n + 1));
        // Interior grid lines: n - 1 in each direction, n edges long.
        prop_assert_eq!(first.edges, 2 * n * (n - 1));
        prop_assert_eq!(session.model().face_geoms.len(), 1);

        let second = session.fuse_model().unwrap();
        prop_assert!(second.is_empty(), "second pass merged {:?}", second);
        prop_assert!(validate::check_model(session.model()).is_ok());
    }
}
