//! Downslope drainage, flow accumulation and river extraction.
//!
//! Every triangle drains to its strictly lowest neighbor. Land triangles
//! with no lower neighbor are sinks; each sink is breached by an
//! elevation-ordered search that carves a neighbor-to-neighbor spill
//! path to the nearest triangle already draining somewhere else, so the
//! finished drainage graph is acyclic and every land cell reaches water
//! or the map rim. Rainfall is then routed downhill in descending
//! elevation order and rivers are traced from high-flow sources.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::debug;

use crate::mesh::{TriMesh, NONE};

/// Configuration for the hydrology stage.
#[derive(Debug, Clone)]
pub struct HydrologyConfig {
    pub sea_level: f64,
    /// Global flow scale; 0 disables rivers entirely.
    pub rivers: f64,
    /// Minimum accumulated flow for a river source.
    pub river_min_flow: f64,
}

impl Default for HydrologyConfig {
    fn default() -> Self {
        Self {
            sea_level: 0.4,
            rivers: 1.0,
            river_min_flow: 0.1,
        }
    }
}

/// An extracted river: an ordered run of neighboring triangles plus the
/// accumulated flow at its source.
#[derive(Debug, Clone)]
pub struct RiverPath {
    pub triangles: Vec<usize>,
    pub flow: f64,
}

/// Hydrology stage output.
#[derive(Debug, Clone)]
pub struct Hydrology {
    /// Drainage target per triangle, `NONE` for unresolved minima.
    pub downslope: Vec<usize>,
    /// Accumulated flow per triangle.
    pub flow: Vec<f64>,
    /// Retained river paths, strongest first.
    pub rivers: Vec<RiverPath>,
}

/// Run the full hydrology stage.
pub fn generate_hydrology(
    mesh: &TriMesh,
    elevation: &[f64],
    rainfall: &[f64],
    config: &HydrologyConfig,
) -> Hydrology {
    let mut downslope = compute_downslope(mesh, elevation);
    resolve_sinks(mesh, elevation, &mut downslope, config.sea_level);
    let flow = accumulate_flow(mesh, elevation, rainfall, &downslope, config);
    let rivers = extract_rivers(mesh, elevation, &flow, &downslope, config);

    debug!(
        "hydrology: {} rivers retained, peak flow {:.3}",
        rivers.len(),
        flow.iter().copied().fold(0.0f64, f64::max)
    );

    Hydrology { downslope, flow, rivers }
}

/// Point each triangle at its strictly lowest neighbor, or `NONE`.
fn compute_downslope(mesh: &TriMesh, elevation: &[f64]) -> Vec<usize> {
    let mut downslope = vec![NONE; mesh.len()];
    for t in 0..mesh.len() {
        let mut lowest = elevation[t];
        for u in mesh.neighbors_of(t) {
            if elevation[u] < lowest {
                lowest = elevation[u];
                downslope[t] = u;
            }
        }
    }
    downslope
}

#[derive(Clone, Copy, Debug)]
struct SearchItem {
    elevation: f64,
    tri: usize,
}

impl PartialEq for SearchItem {
    fn eq(&self, other: &Self) -> bool {
        self.elevation == other.elevation && self.tri == other.tri
    }
}

impl Eq for SearchItem {}

// Min-heap by elevation; ties break on the lower triangle index.
impl PartialOrd for SearchItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .elevation
            .partial_cmp(&self.elevation)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tri.cmp(&self.tri))
    }
}

/// Breach every land sink so its drainage reaches a triangle that
/// already drains elsewhere.
fn resolve_sinks(mesh: &TriMesh, elevation: &[f64], downslope: &mut [usize], sea_level: f64) {
    let sinks: Vec<usize> = (0..mesh.len())
        .filter(|&t| {
            downslope[t] == NONE && !mesh.is_boundary(t) && elevation[t] >= sea_level
        })
        .collect();

    let mut breached = 0usize;
    for &sink in &sinks {
        // A sink may already be resolved by an earlier carve through it.
        if downslope[sink] != NONE {
            breached += 1;
            continue;
        }
        if breach_sink(mesh, elevation, downslope, sink) {
            breached += 1;
        }
    }
    debug!("hydrology: {} sinks, {} breached", sinks.len(), breached);
}

/// Elevation-ordered search outward from `sink` for the nearest triangle
/// whose downslope is set and whose drainage does not lead back through
/// the spill path; carves the path so consecutive drainage hops stay
/// mesh neighbors. Returns false when no acceptable spill exists.
fn breach_sink(mesh: &TriMesh, elevation: &[f64], downslope: &mut [usize], sink: usize) -> bool {
    let mut parent_of = vec![NONE; mesh.len()];
    let mut visited = HashSet::new();
    let mut heap = BinaryHeap::new();

    visited.insert(sink);
    for u in mesh.neighbors_of(sink) {
        visited.insert(u);
        parent_of[u] = sink;
        heap.push(SearchItem { elevation: elevation[u], tri: u });
    }

    while let Some(SearchItem { tri: t, .. }) = heap.pop() {
        if downslope[t] != NONE {
            // Spill path from the sink to this candidate.
            let mut path = vec![t];
            let mut back = t;
            while parent_of[back] != sink {
                back = parent_of[back];
                path.push(back);
            }
            path.push(sink);
            path.reverse();

            if chain_escapes(downslope, t, &path) {
                for hop in path.windows(2) {
                    downslope[hop[0]] = hop[1];
                }
                return true;
            }
        }

        for u in mesh.neighbors_of(t) {
            if visited.insert(u) {
                parent_of[u] = t;
                heap.push(SearchItem { elevation: elevation[u], tri: u });
            }
        }
    }
    false
}

/// Follow the drainage chain from `start`; true iff it terminates
/// without re-entering any triangle of `path`.
fn chain_escapes(downslope: &[usize], start: usize, path: &[usize]) -> bool {
    let blocked: HashSet<usize> = path.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut cur = downslope[start];
    while cur != NONE {
        if blocked.contains(&cur) || !seen.insert(cur) {
            return false;
        }
        cur = downslope[cur];
    }
    true
}

/// Seed flow from rainfall on land (with a snowmelt bonus at altitude)
/// and route it downhill in descending elevation order.
fn accumulate_flow(
    mesh: &TriMesh,
    elevation: &[f64],
    rainfall: &[f64],
    downslope: &[usize],
    config: &HydrologyConfig,
) -> Vec<f64> {
    let mut flow: Vec<f64> = (0..mesh.len())
        .map(|t| {
            if elevation[t] >= config.sea_level {
                rainfall[t] * config.rivers
            } else {
                0.0
            }
        })
        .collect();

    for t in 0..mesh.len() {
        let above_sea = elevation[t] - config.sea_level;
        if above_sea > 0.5 {
            flow[t] *= 1.0 + (above_sea - 0.5);
        }
    }

    let mut order: Vec<usize> = (0..mesh.len()).collect();
    order.sort_by(|&a, &b| {
        elevation[b]
            .partial_cmp(&elevation[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    for &t in &order {
        let d = downslope[t];
        if d != NONE && !mesh.is_boundary(t) {
            flow[d] += flow[t];
        }
    }
    flow
}

/// Trace rivers from every qualifying source; keep the 100 strongest.
fn extract_rivers(
    mesh: &TriMesh,
    elevation: &[f64],
    flow: &[f64],
    downslope: &[usize],
    config: &HydrologyConfig,
) -> Vec<RiverPath> {
    if config.rivers <= 0.0 {
        return Vec::new();
    }

    let mut rivers = Vec::new();
    for t in 0..mesh.len() {
        let is_source =
            elevation[t] >= config.sea_level && elevation[t] > 0.5 && flow[t] >= config.river_min_flow;
        if !is_source {
            continue;
        }
        if let Some(triangles) = trace_river(mesh, elevation, downslope, config.sea_level, t) {
            if triangles.len() > 3 {
                rivers.push(RiverPath { triangles, flow: flow[t] });
            }
        }
    }

    rivers.sort_by(|a, b| {
        b.flow
            .partial_cmp(&a.flow)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.triangles[0].cmp(&b.triangles[0]))
    });
    rivers.truncate(100);
    rivers
}

/// Follow downslope until water, the map rim, or a sink; a path that
/// would revisit a triangle is dropped.
fn trace_river(
    mesh: &TriMesh,
    elevation: &[f64],
    downslope: &[usize],
    sea_level: f64,
    source: usize,
) -> Option<Vec<usize>> {
    let mut path = vec![source];
    let mut visited = HashSet::new();
    visited.insert(source);

    let mut current = source;
    loop {
        let next = downslope[current];
        if next == NONE {
            break;
        }
        if !visited.insert(next) {
            return None;
        }
        path.push(next);
        if elevation[next] < sea_level || mesh.is_boundary(next) {
            break;
        }
        current = next;
    }
    Some(path)
}
