//! Voronoi cell mesh
//!
//! A `Mesh` owns one `Cell` per seed point, in seed order. Cell topology
//! (centroid, boundary, edges) is fixed at construction; only the height and
//! erosion fields change afterwards.

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::error::Result;
use crate::geometry::{polygon_area, polygon_edges, Edge, Extent, Point};
use crate::voronoi::voronoi_cells;

// =============================================================================
// CELLS
// =============================================================================

/// A single Voronoi cell with its terrain values
#[derive(Clone, Debug, Serialize)]
pub struct Cell {
    /// Seed point of the cell
    centroid: Point,
    /// Polygon vertices in order; the last vertex connects to the first
    boundary: Vec<Point>,
    /// Canonical edges derived from `boundary`
    #[serde(skip)]
    edges: Vec<Edge>,
    /// Terrain height, kept within the active height range
    pub(crate) height: f64,
    /// Accumulated erosion, kept within the active height range
    pub(crate) erosion: f64,
}

impl Cell {
    pub fn new(centroid: Point, boundary: Vec<Point>) -> Self {
        let edges = polygon_edges(&boundary);
        Self {
            centroid,
            boundary,
            edges,
            height: 0.0,
            erosion: 0.0,
        }
    }

    /// Same cell with a starting height.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn erosion(&self) -> f64 {
        self.erosion
    }

    /// Height minus erosion; what region filtering compares against.
    pub fn effective_height(&self) -> f64 {
        self.height - self.erosion
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.boundary).abs()
    }
}

// =============================================================================
// SPATIAL INDEX
// =============================================================================

#[derive(Clone, Debug)]
struct CentroidEntry {
    index: usize,
    pos: [f64; 2],
}

impl RTreeObject for CentroidEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for CentroidEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over cell centroids for radius and nearest-cell queries.
struct CentroidIndex {
    tree: RTree<CentroidEntry>,
}

impl CentroidIndex {
    fn new(cells: &[Cell]) -> Self {
        let entries = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| CentroidEntry {
                index,
                pos: [cell.centroid.x, cell.centroid.y],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl Clone for CentroidIndex {
    fn clone(&self) -> Self {
        Self {
            tree: RTree::bulk_load(self.tree.iter().cloned().collect()),
        }
    }
}

impl fmt::Debug for CentroidIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CentroidIndex({} entries)", self.tree.size())
    }
}

// =============================================================================
// MESH
// =============================================================================

/// An index-addressable collection of cells covering the extent
#[derive(Clone, Debug)]
pub struct Mesh {
    extent: Extent,
    cells: Vec<Cell>,
    index: CentroidIndex,
}

impl Mesh {
    /// Assemble a mesh from pre-built cells.
    pub fn from_cells(extent: Extent, cells: Vec<Cell>) -> Self {
        let index = CentroidIndex::new(&cells);
        Self { extent, cells, index }
    }

    pub fn empty(extent: Extent) -> Self {
        Self::from_cells(extent, Vec::new())
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Cells whose centroid lies within `radius` of cell `index`'s centroid,
    /// excluding the cell itself. Returns `(index, distance)` pairs sorted by
    /// index.
    pub fn cells_within(&self, index: usize, radius: f64) -> Vec<(usize, f64)> {
        let Some(origin) = self.cells.get(index).map(Cell::centroid) else {
            return Vec::new();
        };
        if !(radius >= 0.0) {
            return Vec::new();
        }

        let mut found: Vec<(usize, f64)> = self
            .index
            .tree
            .locate_within_distance([origin.x, origin.y], radius * radius)
            .filter(|entry| entry.index != index)
            .map(|entry| (entry.index, entry.distance_2(&[origin.x, origin.y]).sqrt()))
            .collect();
        found.sort_unstable_by_key(|&(i, _)| i);
        found
    }

    /// Index of the cell whose centroid is closest to `p`, i.e. the cell containing it.
    pub fn nearest_cell(&self, p: Point) -> Option<usize> {
        self.index.tree.nearest_neighbor(&[p.x, p.y]).map(|entry| entry.index)
    }

    /// Reset every erosion accumulator to zero.
    pub fn clear_erosion(&mut self) {
        for cell in &mut self.cells {
            cell.erosion = 0.0;
        }
    }

    /// Lowest and highest cell height, if the mesh has cells.
    pub fn height_bounds(&self) -> Option<(f64, f64)> {
        self.cells.iter().map(Cell::height).fold(None, |acc, h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Build a mesh with one cell per point, in point order.
///
/// Each cell's centroid is its seed point and its boundary is the seed's
/// Voronoi polygon clipped to the extent. A degenerate extent yields an empty
/// mesh.
pub fn build_mesh(points: &[Point], extent: Extent) -> Result<Mesh> {
    let polygons = voronoi_cells(points, extent)?;

    let cells: Vec<Cell> = points
        .iter()
        .zip(polygons)
        .map(|(&site, polygon)| Cell::new(site, polygon))
        .collect();

    log::debug!("Built mesh with {} cells", cells.len());
    Ok(Mesh::from_cells(extent, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::generate_points;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn line_mesh() -> Mesh {
        let points: Vec<Point> = (0..5).map(|i| Point::new(10.0 + 20.0 * i as f64, 10.0)).collect();
        build_mesh(&points, Extent::new(100.0, 20.0)).unwrap()
    }

    #[test]
    fn test_cell_count_matches_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let extent = Extent::new(1000.0, 1000.0);
        for n in [1, 2, 17, 150] {
            let points = generate_points(n, extent, 2, &mut rng).unwrap();
            let mesh = build_mesh(&points, extent).unwrap();
            assert_eq!(mesh.len(), n);
            for (cell, p) in mesh.cells().iter().zip(&points) {
                assert_eq!(cell.centroid(), *p);
                assert!(cell.boundary().len() >= 3);
                assert_eq!(cell.edges().len(), cell.boundary().len());
            }
        }
    }

    #[test]
    fn test_cells_cover_extent() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let extent = Extent::new(400.0, 300.0);
        let points = generate_points(60, extent, 2, &mut rng).unwrap();
        let mesh = build_mesh(&points, extent).unwrap();
        let area: f64 = mesh.cells().iter().map(Cell::area).sum();
        assert!((area - extent.area()).abs() < 1e-4);
    }

    #[test]
    fn test_empty_mesh_for_degenerate_extent() {
        let mesh = build_mesh(&[Point::new(1.0, 1.0)], Extent::new(0.0, 0.0)).unwrap();
        assert!(mesh.is_empty());
        let mesh = build_mesh(&[], Extent::new(10.0, 10.0)).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_cells_within_excludes_self() {
        let mesh = line_mesh();
        let near = mesh.cells_within(2, 20.0);
        assert_eq!(near.iter().map(|&(i, _)| i).collect::<Vec<_>>(), vec![1, 3]);
        assert!(near.iter().all(|&(_, d)| (d - 20.0).abs() < 1e-9));

        let wider = mesh.cells_within(0, 45.0);
        assert_eq!(wider.iter().map(|&(i, _)| i).collect::<Vec<_>>(), vec![1, 2]);
        assert!(mesh.cells_within(99, 10.0).is_empty());
    }

    #[test]
    fn test_nearest_cell() {
        let mesh = line_mesh();
        assert_eq!(mesh.nearest_cell(Point::new(52.0, 3.0)), Some(2));
        assert_eq!(mesh.nearest_cell(Point::new(99.0, 19.0)), Some(4));
    }

    #[test]
    fn test_clone_keeps_index() {
        let mesh = line_mesh();
        let copy = mesh.clone();
        assert_eq!(copy.cells_within(2, 20.0).len(), 2);
    }
}
