//! Region boundary extraction
//!
//! Selects the cells whose effective height exceeds a threshold and traces
//! the outline of the selected region into ordered paths (coastlines when the
//! threshold is sea level).
//!
//! Edges shared by two selected cells appear twice in the combined edge list
//! and cancel out; edges appearing exactly once form the region's outline,
//! including the rims of any holes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::geometry::{Edge, Point, VertexKey};
use crate::mesh::Mesh;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// An ordered outline of part of a region
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryPath {
    /// Ordered vertices; a closed path repeats its first vertex at the end
    points: Vec<Point>,
    /// Whether the path returns to its start
    closed: bool,
}

impl BoundaryPath {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length of the path's segments.
    pub fn perimeter(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

// =============================================================================
// BOUNDARY EDGES
// =============================================================================

/// Edges on the outline of the cells with `effective_height > threshold`.
///
/// Returned in canonical edge order.
pub fn boundary_edges(mesh: &Mesh, threshold: f64) -> Vec<Edge> {
    let mut counts: BTreeMap<Edge, usize> = BTreeMap::new();

    for cell in mesh.cells().iter().filter(|c| c.effective_height() > threshold) {
        for edge in cell.edges() {
            *counts.entry(*edge).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(edge, _)| edge)
        .collect()
}

/// Total length of a set of boundary edges.
pub fn boundary_length(edges: &[Edge]) -> f64 {
    edges.iter().map(Edge::length).sum()
}

/// Outline paths of the cells with `effective_height > threshold`.
///
/// No selected cells means no paths. Disconnected regions and holes each
/// produce their own path.
pub fn extract_boundary_paths(mesh: &Mesh, threshold: f64) -> Vec<BoundaryPath> {
    let edges = boundary_edges(mesh, threshold);
    let paths = trace_boundary_paths(&edges);

    let open = paths.iter().filter(|p| !p.is_closed()).count();
    if open > 0 {
        log::warn!("{} of {} boundary paths are open", open, paths.len());
    }
    log::info!(
        "Extracted {} boundary paths from {} edges (length {:.1}) at threshold {:.1}",
        paths.len(),
        edges.len(),
        boundary_length(&edges),
        threshold
    );

    paths
}

// =============================================================================
// PATH TRACING
// =============================================================================

/// Vertex adjacency of a set of boundary edges
struct BoundaryGraph {
    neighbors: BTreeMap<VertexKey, Vec<VertexKey>>,
    positions: HashMap<VertexKey, Point>,
}

impl BoundaryGraph {
    fn new(edges: &[Edge]) -> Self {
        let mut neighbors: BTreeMap<VertexKey, Vec<VertexKey>> = BTreeMap::new();
        let mut positions = HashMap::new();

        for edge in edges {
            let (a, b) = edge.keys();
            if a == b {
                continue;
            }
            positions.entry(a).or_insert(edge.start());
            positions.entry(b).or_insert(edge.end());

            let from_a = neighbors.entry(a).or_default();
            if !from_a.contains(&b) {
                from_a.push(b);
            }
            let from_b = neighbors.entry(b).or_default();
            if !from_b.contains(&a) {
                from_b.push(a);
            }
        }

        // Sorted adjacency keeps the walk independent of edge order
        for list in neighbors.values_mut() {
            list.sort_unstable();
        }

        Self { neighbors, positions }
    }

    fn neighbors(&self, key: &VertexKey) -> &[VertexKey] {
        self.neighbors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walk from `start` through unvisited vertices, never stepping straight
    /// back. Consumed vertices are removed from `unvisited`. Returns the
    /// vertex sequence and whether it closed back onto `start`.
    fn walk(&self, start: VertexKey, unvisited: &mut BTreeSet<VertexKey>, allow_close: bool) -> (Vec<VertexKey>, bool) {
        let mut path = vec![start];
        let mut previous: Option<VertexKey> = None;
        let mut current = start;

        loop {
            let candidates = self.neighbors(&current);
            let next = candidates
                .iter()
                .copied()
                .find(|n| Some(*n) != previous && unvisited.contains(n));

            match next {
                Some(next) => {
                    unvisited.remove(&next);
                    path.push(next);
                    previous = Some(current);
                    current = next;
                }
                None => {
                    let closes = allow_close && path.len() > 2 && candidates.contains(&start);
                    if closes {
                        path.push(start);
                    }
                    return (path, closes);
                }
            }
        }
    }
}

/// Chain boundary edges into ordered paths.
///
/// Each path starts at the smallest unvisited vertex. A walk that returns to
/// its start is closed; one that runs out of vertices first is extended
/// backwards from the start and emitted open.
pub fn trace_boundary_paths(edges: &[Edge]) -> Vec<BoundaryPath> {
    let graph = BoundaryGraph::new(edges);
    let mut unvisited: BTreeSet<VertexKey> = graph.neighbors.keys().copied().collect();
    let mut paths = Vec::new();

    while let Some(start) = unvisited.pop_first() {
        let (forward, closed) = graph.walk(start, &mut unvisited, true);

        let keys = if closed {
            forward
        } else {
            let (backward, _) = graph.walk(start, &mut unvisited, false);
            backward.into_iter().skip(1).rev().chain(forward).collect()
        };

        if keys.len() < 2 {
            continue;
        }

        let points = keys.iter().map(|k| graph.positions[k]).collect();
        paths.push(BoundaryPath { points, closed });
    }

    paths
}
