//! Clipped Voronoi diagrams built on a Delaunay triangulation
//!
//! Each cell is the extent rectangle cut down by the bisector half-planes of
//! its Delaunay neighbors. Afterwards all cell vertices are welded so the
//! vertices two cells share are bit-identical, which the boundary extraction
//! relies on when it counts edges.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rayon::prelude::*;
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::error::{MapError, Result};
use crate::geometry::{clip_half_plane, Extent, Point, VertexKey, VERTEX_QUANTUM};

/// Compute the Voronoi polygon of every point, clipped to `extent`.
///
/// The result is index-aligned with `points`. Coincident points produce
/// identical cells. A degenerate extent or an empty point set gives an empty
/// result.
pub fn voronoi_cells(points: &[Point], extent: Extent) -> Result<Vec<Vec<Point>>> {
    if points.is_empty() || extent.is_degenerate() {
        return Ok(Vec::new());
    }

    if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
        return Err(MapError::invalid(format!(
            "point {} has non-finite coordinates ({}, {})",
            bad, points[bad].x, points[bad].y
        )));
    }

    let neighbors = delaunay_neighbors(points)?;
    let rect = extent.to_polygon();

    let raw_cells: Vec<Vec<Point>> = points
        .par_iter()
        .zip(neighbors.par_iter())
        .map(|(site, site_neighbors)| clip_cell(&rect, *site, site_neighbors))
        .collect();

    let mut welder = VertexWelder::default();
    let cells = raw_cells
        .into_iter()
        .map(|cell| welder.weld_polygon(&cell))
        .collect();

    log::debug!(
        "Built {} Voronoi cells ({} distinct vertices)",
        points.len(),
        welder.len()
    );

    Ok(cells)
}

/// Positions of each point's Delaunay neighbors, index-aligned with `points`.
fn delaunay_neighbors(points: &[Point]) -> Result<Vec<Vec<Point>>> {
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        // Inserting an existing position returns the existing handle
        handles.push(triangulation.insert(Point2::new(p.x, p.y))?);
    }

    let neighbors = handles
        .iter()
        .map(|&handle| {
            triangulation
                .vertex(handle)
                .out_edges()
                .map(|edge| {
                    let pos = edge.to().position();
                    Point::new(pos.x, pos.y)
                })
                .collect()
        })
        .collect();

    Ok(neighbors)
}

/// Intersect the extent rectangle with the half-planes closer to `site` than
/// to each neighbor.
fn clip_cell(rect: &[Point], site: Point, neighbors: &[Point]) -> Vec<Point> {
    let mut polygon = rect.to_vec();

    for other in neighbors {
        if other.key() == site.key() {
            continue;
        }

        let midpoint = Point::new((site.x + other.x) * 0.5, (site.y + other.y) * 0.5);
        let normal = (other.x - site.x, other.y - site.y);
        polygon = clip_half_plane(&polygon, midpoint, normal);

        if polygon.is_empty() {
            break;
        }
    }

    polygon
}

/// Snaps nearly-equal vertices onto a single representative.
#[derive(Default)]
struct VertexWelder {
    buckets: HashMap<VertexKey, Point>,
}

impl VertexWelder {
    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn weld(&mut self, p: Point) -> Point {
        let key = p.key();
        for k in key.neighborhood() {
            if let Some(existing) = self.buckets.get(&k) {
                if existing.distance(&p) <= VERTEX_QUANTUM {
                    return *existing;
                }
            }
        }

        // A bucket holds one representative, so each key maps to a single point
        match self.buckets.entry(key) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => *slot.insert(p),
        }
    }

    /// Weld every vertex and drop the consecutive duplicates this creates.
    fn weld_polygon(&mut self, polygon: &[Point]) -> Vec<Point> {
        let mut welded: Vec<Point> = Vec::with_capacity(polygon.len());
        for &p in polygon {
            let w = self.weld(p);
            if welded.last() != Some(&w) {
                welded.push(w);
            }
        }

        while welded.len() > 1 && welded.first() == welded.last() {
            welded.pop();
        }
        welded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{polygon_area, polygon_edges};

    #[test]
    fn test_single_point_covers_extent() {
        let extent = Extent::new(100.0, 50.0);
        let cells = voronoi_cells(&[Point::new(10.0, 10.0)], extent).unwrap();
        assert_eq!(cells.len(), 1);
        assert!((polygon_area(&cells[0]) - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_points_split_along_bisector() {
        let extent = Extent::new(100.0, 100.0);
        let points = [Point::new(25.0, 50.0), Point::new(75.0, 50.0)];
        let cells = voronoi_cells(&points, extent).unwrap();

        assert_eq!(cells.len(), 2);
        assert!((polygon_area(&cells[0]) - 5000.0).abs() < 1e-6);
        assert!((polygon_area(&cells[1]) - 5000.0).abs() < 1e-6);
        assert!(cells[0].iter().all(|p| p.x <= 50.0 + 1e-9));
        assert!(cells[1].iter().all(|p| p.x >= 50.0 - 1e-9));
    }

    #[test]
    fn test_cells_tile_the_extent() {
        let extent = Extent::new(200.0, 120.0);
        let points = [
            Point::new(20.0, 30.0),
            Point::new(150.0, 20.0),
            Point::new(90.0, 80.0),
            Point::new(40.0, 100.0),
            Point::new(180.0, 110.0),
            Point::new(100.0, 10.0),
        ];
        let cells = voronoi_cells(&points, extent).unwrap();
        let total: f64 = cells.iter().map(|c| polygon_area(c)).sum();
        assert!((total - extent.area()).abs() < 1e-6);
    }

    #[test]
    fn test_shared_vertices_are_welded() {
        let extent = Extent::new(100.0, 100.0);
        let points = [
            Point::new(25.0, 25.0),
            Point::new(75.0, 25.0),
            Point::new(25.0, 75.0),
            Point::new(75.0, 75.0),
        ];
        let cells = voronoi_cells(&points, extent).unwrap();
        for cell in &cells {
            assert_eq!(cell.len(), 4);
            assert!((polygon_area(cell) - 2500.0).abs() < 1e-6);
        }

        // Four interior edges meet at the centre, eight edges run along the border
        let mut counts: HashMap<_, usize> = HashMap::new();
        for cell in &cells {
            for edge in polygon_edges(cell) {
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.values().filter(|&&c| c == 2).count(), 4);
        assert_eq!(counts.values().filter(|&&c| c == 1).count(), 8);
    }

    #[test]
    fn test_coincident_points_share_a_cell() {
        let extent = Extent::new(10.0, 10.0);
        let points = [Point::new(2.0, 2.0), Point::new(2.0, 2.0), Point::new(8.0, 8.0)];
        let cells = voronoi_cells(&points, extent).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], cells[1]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(voronoi_cells(&[], Extent::new(10.0, 10.0)).unwrap().is_empty());
        assert!(voronoi_cells(&[Point::new(1.0, 1.0)], Extent::new(0.0, 10.0))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let result = voronoi_cells(&[Point::new(f64::NAN, 1.0)], Extent::new(10.0, 10.0));
        assert!(matches!(result, Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_same_bucket_welds_to_representative() {
        // Same key, but further apart than the tolerance
        let a = Point::new(-0.45e-6, -0.45e-6);
        let b = Point::new(0.45e-6, 0.45e-6);
        assert_eq!(a.key(), b.key());
        assert!(a.distance(&b) > VERTEX_QUANTUM);

        let mut welder = VertexWelder::default();
        assert_eq!(welder.weld(a), a);
        assert_eq!(welder.weld(b), a);
        assert_eq!(welder.len(), 1);
    }
}
