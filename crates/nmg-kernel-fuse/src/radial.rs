//! Radial list builder and harmonizer.
//!
//! Every face on an edge contributes one entry to the edge's radial list:
//! the edgeuse of that face running in the reference direction, walked
//! `eu → radial → mate`. Entries are ordered by the angle of their left
//! vector about the edge. Around a sound edge the entries of each shell
//! alternate `Same`/`Opposite`, since consecutive faces bound a wedge that
//! is either all outside or all inside the shell.

use std::collections::HashMap;
use std::f64::consts::TAU;

use nmg_kernel_classify::{classify_crack, crack_partner, ClassifyOptions, CrackKind};
use nmg_kernel_math::oracle::angle_in_frame;
use nmg_kernel_math::{Tolerance, Vec3};
use nmg_kernel_topo::{
    EdgeGeometry, EdgeId, EdgeuseId, FaceuseId, Model, NmgError, Orientation, Result, ShellId,
};
use tracing::{debug, trace, warn};

// =============================================================================
// Frame
// =============================================================================

/// Local frame about an edgeuse: `z` along it, `x` its left vector, `y = z × x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialFrame {
    /// Unit direction of the reference edgeuse.
    pub z: Vec3,
    /// Angle zero.
    pub x: Vec3,
    /// Angle π/2.
    pub y: Vec3,
}

impl RadialFrame {
    /// Frame about `eu`. Wire edgeuses get an arbitrary perpendicular for `x`.
    pub fn new(model: &Model, eu: EdgeuseId, tol: &Tolerance) -> Result<Self> {
        model.edgeuse(eu)?;
        let (a, b) = model.eu_points(eu);
        let d = b - a;
        let len = d.norm();
        if tol.is_zero(len) {
            return Err(NmgError::DegenerateTopology(format!(
                "zero-length edge ({:e}) has no radial frame",
                len
            )));
        }
        let z = d / len;
        let x = match model.eu_left_vec(eu)? {
            Some(left) => left,
            None => any_perpendicular(&z),
        };
        Ok(Self { z, x, y: z.cross(&x) })
    }
}

fn any_perpendicular(z: &Vec3) -> Vec3 {
    let axis = if z.x.abs() <= z.y.abs() && z.x.abs() <= z.z.abs() {
        Vec3::x()
    } else if z.y.abs() <= z.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };
    z.cross(&axis).normalize()
}

/// Angle of `eu`'s face about the frame axis, in `[0, 2π)`. Wires are at 0.
pub fn measure_face_angle(model: &Model, eu: EdgeuseId, frame: &RadialFrame) -> Result<f64> {
    Ok(match model.eu_left_vec(eu)? {
        Some(left) => angle_in_frame(&left, &frame.x, &frame.y),
        None => 0.0,
    })
}

// =============================================================================
// Radial list
// =============================================================================

/// One face (or wire) around an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialEntry {
    /// Edgeuse representing the face, running in the reference direction.
    pub eu: EdgeuseId,
    /// Its faceuse; `None` for wires.
    pub fu: Option<FaceuseId>,
    /// Owning shell.
    pub shell: ShellId,
    /// Faceuse orientation; `Unspecified` for wires.
    pub orientation: Orientation,
    /// Angle in the reference frame.
    pub angle: f64,
    /// The edgeuse's loop traverses this edge twice.
    pub is_crack: bool,
    /// Crack that bounds no area; ignored by the parity walk.
    pub is_outie: bool,
    /// Was on the reference edge before the join.
    pub is_original: bool,
    /// Must be exchanged with its mate before relinking.
    pub needs_flip: bool,
}

impl RadialEntry {
    fn counts_for_parity(&self) -> bool {
        self.fu.is_some() && !self.is_outie
    }
}

/// Walk the radial cycle from `eu`, one entry per face, in walk order.
pub fn build_radial_list(
    model: &Model,
    eu: EdgeuseId,
    frame: &RadialFrame,
    original: bool,
) -> Result<Vec<RadialEntry>> {
    model
        .radial_walk(eu)?
        .into_iter()
        .map(|e| -> Result<RadialEntry> {
            let fu = model.faceuse_of_eu(e);
            let orientation = match fu {
                Some(fu) => model.faceuse(fu)?.orientation,
                None => Orientation::Unspecified,
            };
            Ok(RadialEntry {
                eu: e,
                fu,
                shell: model.shell_of_eu(e),
                orientation,
                angle: measure_face_angle(model, e, frame)?,
                is_crack: crack_partner(model, e).is_some(),
                is_outie: false,
                is_original: original,
                needs_flip: false,
            })
        })
        .collect()
}

/// Distinct shells in order of first appearance.
fn shells_of(entries: &[RadialEntry]) -> Vec<ShellId> {
    let mut shells = Vec::new();
    for e in entries {
        if !shells.contains(&e.shell) {
            shells.push(e.shell);
        }
    }
    shells
}

/// Angles within `tol.perp` below 2π belong with those at zero.
fn fold_wrap(angle: f64, tol: &Tolerance) -> f64 {
    if TAU - angle <= tol.perp {
        0.0
    } else {
        angle
    }
}

/// Stable sort by angle, then order each run of equal angles with
/// [`order_ties`].
pub fn sort_radial(entries: &mut [RadialEntry], tol: &Tolerance) {
    for e in entries.iter_mut() {
        e.angle = fold_wrap(e.angle, tol);
    }
    entries.sort_by(|a, b| a.angle.total_cmp(&b.angle));
    order_ties(entries, tol);
}

/// Reorder every run of equal angles (within `tol.perp`) of an
/// angle-sorted list.
///
/// Each shell's entries become contiguous, keeping their relative order,
/// so per-shell alternation is unchanged. Shells whose first counted entry
/// in the run is `Same` close their interior there and come first, then
/// shells with nothing counted, then shells whose interior opens there.
/// The zero-width wedges between shells are then outside all of them, and
/// coincident outward faceuses end up radial partners.
pub fn order_ties(entries: &mut [RadialEntry], tol: &Tolerance) {
    let mut start = 0;
    while start < entries.len() {
        let mut end = start + 1;
        while end < entries.len() && entries[end].angle - entries[end - 1].angle <= tol.perp {
            end += 1;
        }
        let run = &mut entries[start..end];
        let shells = shells_of(run);
        if shells.len() > 1 {
            let ranks: Vec<(ShellId, (u8, usize))> = shells
                .iter()
                .enumerate()
                .map(|(pos, &shell)| {
                    let first = run
                        .iter()
                        .find(|e| e.shell == shell && e.counts_for_parity());
                    let side = match first.map(|e| e.orientation) {
                        Some(Orientation::Same) => 0,
                        Some(_) => 2,
                        None => 1,
                    };
                    (shell, (side, pos))
                })
                .collect();
            run.sort_by_key(|e| {
                ranks
                    .iter()
                    .find(|(s, _)| *s == e.shell)
                    .map(|&(_, rank)| rank)
            });
        }
        start = end;
    }
}

/// Decide innie/outie for every crack entry, per shell.
pub fn mark_cracks(
    model: &Model,
    entries: &mut [RadialEntry],
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<()> {
    for shell in shells_of(entries) {
        let cracks: Vec<usize> = (0..entries.len())
            .filter(|&i| entries[i].shell == shell && entries[i].is_crack && entries[i].fu.is_some())
            .collect();
        if cracks.len() % 2 == 0 {
            for &i in &cracks {
                let kind = classify_crack(model, entries[i].eu, tol, opts)?;
                entries[i].is_outie = kind == CrackKind::Outie;
                debug!(eu = ?entries[i].eu, ?kind, "radial crack");
            }
        } else if let Some((_, rest)) = cracks.split_last() {
            warn!(?shell, count = cracks.len(), "odd crack count on edge");
            for &i in rest {
                entries[i].is_outie = true;
            }
        }
    }
    Ok(())
}

fn parity_entries(entries: &[RadialEntry], shell: ShellId) -> Vec<usize> {
    (0..entries.len())
        .filter(|&i| entries[i].shell == shell && entries[i].counts_for_parity())
        .collect()
}

/// Flag new entries that break `Same`/`Opposite` alternation.
///
/// Each shell is walked cyclically from its first original entry (or its
/// first entry when it has none). An original entry out of step is a
/// [`NmgError::ParityViolation`].
pub fn mark_flips(entries: &mut [RadialEntry]) -> Result<()> {
    for shell in shells_of(entries) {
        let idx = parity_entries(entries, shell);
        if idx.is_empty() {
            continue;
        }
        let first = idx
            .iter()
            .position(|&i| entries[i].is_original)
            .unwrap_or(0);
        let mut expected = entries[idx[first]].orientation;
        for k in 1..idx.len() {
            let i = idx[(first + k) % idx.len()];
            expected = expected.flipped();
            if entries[i].orientation == expected {
                continue;
            }
            if entries[i].is_original {
                return Err(NmgError::ParityViolation(format!(
                    "original {:?} faceuse at {:.6} rad breaks alternation in shell {:?}",
                    entries[i].orientation, entries[i].angle, shell
                )));
            }
            entries[i].needs_flip = true;
        }
    }
    Ok(())
}

/// Exchange every flagged entry's edgeuse with its mate.
pub fn apply_flips(model: &Model, entries: &mut [RadialEntry]) -> Result<usize> {
    let mut count = 0;
    for e in entries.iter_mut().filter(|e| e.needs_flip) {
        let mate = model.edgeuse(e.eu)?.mate;
        trace!(from = ?e.eu, to = ?mate, "radial flip");
        e.eu = mate;
        e.fu = model.faceuse_of_eu(mate);
        e.orientation = e.orientation.flipped();
        e.needs_flip = false;
        count += 1;
    }
    Ok(count)
}

/// Every shell's counted entries must alternate `Same`/`Opposite`
/// cyclically. A shell with at most one counted entry passes.
pub fn check_parity(entries: &[RadialEntry]) -> Result<()> {
    for shell in shells_of(entries) {
        let idx = parity_entries(entries, shell);
        if idx.len() <= 1 {
            continue;
        }
        for (k, &i) in idx.iter().enumerate() {
            let j = idx[(k + 1) % idx.len()];
            if entries[i].orientation == entries[j].orientation {
                warn!(?shell, count = idx.len(), "radial parity violation");
                return Err(NmgError::ParityViolation(format!(
                    "adjacent {:?} faceuses at {:.6} and {:.6} rad in shell {:?}",
                    entries[i].orientation, entries[i].angle, entries[j].angle, shell
                )));
            }
        }
    }
    Ok(())
}

/// `radial(e_i) = mate(e_{i+1})`, cyclically.
fn relink(model: &mut Model, entries: &[RadialEntry]) -> Result<()> {
    for (i, e) in entries.iter().enumerate() {
        let next = entries[(i + 1) % entries.len()].eu;
        let mate = model.edgeuse(next)?.mate;
        model.set_radial_pair(e.eu, mate);
    }
    Ok(())
}

// =============================================================================
// Join
// =============================================================================

/// Splice the edge of `eu2` into the radial cycle of `eu1`'s edge.
///
/// Both edges must span the same two vertices. On success every use of
/// `eu2`'s edge belongs to `eu1`'s edge, the absorbed edge is gone and
/// parity holds around the result. Parity failures are detected before
/// anything is relinked.
pub fn radial_join_eu(
    model: &mut Model,
    eu1: EdgeuseId,
    eu2: EdgeuseId,
    tol: &Tolerance,
    opts: &ClassifyOptions,
) -> Result<()> {
    let e1 = model.edgeuse(eu1)?.edge;
    let e2 = model.edgeuse(eu2)?.edge;
    if e1 == e2 {
        return Ok(());
    }
    let (a, b) = model.try_eu_vertices(eu1)?;
    if a == b {
        return Err(NmgError::DegenerateTopology(
            "edge starts and ends on the same vertex".into(),
        ));
    }
    let eu2 = match model.try_eu_vertices(eu2)? {
        (s, t) if (s, t) == (a, b) => eu2,
        (s, t) if (s, t) == (b, a) => model.edgeuses[eu2].mate,
        _ => {
            return Err(NmgError::InvalidTopology(
                "radial join of edges with different endpoints".into(),
            ))
        }
    };

    let frame = RadialFrame::new(model, eu1, tol)?;
    let mut entries = build_radial_list(model, eu1, &frame, true)?;
    entries.extend(build_radial_list(model, eu2, &frame, false)?);
    sort_radial(&mut entries, tol);
    mark_cracks(model, &mut entries, tol, opts)?;
    mark_flips(&mut entries)?;
    let flips = apply_flips(model, &mut entries)?;
    // Flips change orientations, so tied shells may now rank differently.
    order_ties(&mut entries, tol);
    check_parity(&entries)?;

    relink(model, &entries)?;
    share_line_geometry(model, eu1, e2)?;
    model.absorb_edge(e1, e2)?;

    let mut rebuilt = build_radial_list(model, eu1, &frame, true)?;
    for r in &mut rebuilt {
        r.is_outie = entries.iter().any(|e| e.eu == r.eu && e.is_outie);
    }
    check_parity(&rebuilt)?;
    debug!(edge = ?e1, absorbed = ?e2, faces = rebuilt.len(), flips, "radial join");
    Ok(())
}

/// Move the uses of `gone`'s line geometry onto `eu`'s. The radial cycle
/// through `eu` must already include `gone`'s uses.
fn share_line_geometry(model: &mut Model, eu: EdgeuseId, gone: EdgeId) -> Result<()> {
    let Some(keep) = model.edgeuse(eu)?.geom else {
        return Ok(());
    };
    if !matches!(model.edge_geoms[keep].geometry, EdgeGeometry::Line { .. }) {
        return Ok(());
    }
    let mut others: Vec<_> = model
        .edge_uses(model.edgeuses[eu].edge)?
        .into_iter()
        .filter(|&u| model.edgeuses[u].edge == gone)
        .filter_map(|u| model.edgeuses[u].geom)
        .filter(|&g| g != keep)
        .collect();
    others.sort();
    others.dedup();
    for g in others {
        if matches!(model.edge_geoms[g].geometry, EdgeGeometry::Line { .. }) {
            model.share_edge_geometry(keep, g)?;
        }
    }
    Ok(())
}

/// Check the stored cycle around `eu`'s edge without sorting it.
///
/// Walk angles may descend at most once (the wrap through 2π), and the
/// walk must reach every edgeuse pair that references the edge. Counting
/// those scans the whole arena; use [`verify_radial_orders`] for many edges.
pub fn verify_radial_order(model: &Model, eu: EdgeuseId, tol: &Tolerance) -> Result<()> {
    let edge = model.edgeuse(eu)?.edge;
    let uses = model.edgeuses.values().filter(|u| u.edge == edge).count();
    check_radial_cycle(model, eu, tol, uses)
}

/// [`verify_radial_order`] for every edge in `edges`, with the edgeuses
/// per edge counted in a single pass.
pub fn verify_radial_orders(model: &Model, edges: &[EdgeId], tol: &Tolerance) -> Result<()> {
    let mut uses: HashMap<EdgeId, usize> = HashMap::with_capacity(model.edges.len());
    for u in model.edgeuses.values() {
        *uses.entry(u.edge).or_default() += 1;
    }
    for &edge in edges {
        let eu = model.edge(edge)?.edgeuse;
        check_radial_cycle(model, eu, tol, uses.get(&edge).copied().unwrap_or(0))?;
    }
    Ok(())
}

fn check_radial_cycle(model: &Model, eu: EdgeuseId, tol: &Tolerance, uses: usize) -> Result<()> {
    let frame = RadialFrame::new(model, eu, tol)?;
    let walk = model.radial_walk(eu)?;
    let angles = walk
        .iter()
        .map(|&e| -> Result<f64> { Ok(fold_wrap(measure_face_angle(model, e, &frame)?, tol)) })
        .collect::<Result<Vec<_>>>()?;

    let descents = (0..angles.len())
        .filter(|&i| {
            let next = angles[(i + 1) % angles.len()];
            angles[i] - next > tol.perp
        })
        .count();
    if descents > 1 {
        return Err(NmgError::InvalidTopology(format!(
            "radial cycle wraps {} times (angles {:?})",
            descents,
            angles
                .iter()
                .map(|a| (a / TAU * 360.0).round())
                .collect::<Vec<_>>()
        )));
    }

    if uses != 2 * walk.len() {
        return Err(NmgError::InvalidTopology(format!(
            "edge has {} edgeuses but its radial cycle reaches {}",
            uses,
            2 * walk.len()
        )));
    }
    Ok(())
}
