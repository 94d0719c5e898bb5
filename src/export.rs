use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::boundary::BoundaryPath;
use crate::color::{to_hex, ColorRamp};
use crate::error::{MapError, Result};
use crate::geometry::{Extent, Point};
use crate::map::MapData;
use crate::seeds::MapSeeds;

const PATH_COLOR: [u8; 3] = [20, 20, 20];

/// Largest preview the renderer will allocate
pub const MAX_PREVIEW_PIXELS: u64 = 64_000_000;

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
struct CellRecord<'a> {
    centroid: Point,
    boundary: &'a [Point],
    height: f64,
    erosion: f64,
    color: String,
}

#[derive(Serialize)]
struct MapRecord<'a> {
    extent: Extent,
    seeds: &'a MapSeeds,
    height_threshold: f64,
    cells: Vec<CellRecord<'a>>,
    paths: &'a [BoundaryPath],
}

fn map_record(map: &MapData) -> MapRecord<'_> {
    let max_height = map.config.heights.range.max;
    let cells = map
        .mesh
        .cells()
        .iter()
        .map(|cell| CellRecord {
            centroid: cell.centroid(),
            boundary: cell.boundary(),
            height: cell.height(),
            erosion: cell.erosion(),
            color: to_hex(ColorRamp::default().color(cell.effective_height(), max_height)),
        })
        .collect();

    MapRecord {
        extent: map.mesh.extent(),
        seeds: &map.seeds,
        height_threshold: map.config.height_threshold,
        cells,
        paths: &map.paths,
    }
}

/// Serialize cells (centroid, boundary, height, erosion, grey color) and
/// boundary paths as pretty JSON.
pub fn to_json(map: &MapData) -> Result<String> {
    Ok(serde_json::to_string_pretty(&map_record(map))?)
}

/// Write the JSON export to a file.
pub fn write_json(map: &MapData, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &map_record(map))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// PNG preview
// =============================================================================

/// Rasterize the map: each pixel takes the color of the nearest cell's
/// effective height, then boundary paths are drawn on top.
///
/// `scale` is pixels per map unit.
pub fn render_preview(map: &MapData, scale: f64) -> Result<RgbImage> {
    if !(scale > 0.0) || !scale.is_finite() {
        return Err(MapError::invalid(format!("preview scale must be positive, got {}", scale)));
    }

    let extent = map.mesh.extent();
    if extent.is_degenerate() {
        return Err(MapError::invalid(format!(
            "cannot preview a degenerate extent {}x{}",
            extent.width, extent.height
        )));
    }

    let width = (extent.width * scale).ceil().max(1.0);
    let height = (extent.height * scale).ceil().max(1.0);
    if width * height > MAX_PREVIEW_PIXELS as f64 {
        return Err(MapError::invalid(format!(
            "preview of {}x{} pixels exceeds the {} pixel limit",
            width, height, MAX_PREVIEW_PIXELS
        )));
    }
    let (width, height) = (width as u32, height as u32);

    let ramp = ColorRamp::terrain();
    let range = map.config.heights.range;
    let max_height = range.max.abs().max(range.min.abs());
    let threshold = map.config.height_threshold;

    let mut img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        let p = Point::new((x as f64 + 0.5) / scale, (y as f64 + 0.5) / scale);
        let h = map
            .mesh
            .nearest_cell(p)
            .and_then(|i| map.mesh.cell(i))
            .map(|c| c.effective_height() - threshold)
            .unwrap_or(range.min);
        Rgb(ramp.color(h, max_height))
    });

    for path in &map.paths {
        for pair in path.points().windows(2) {
            draw_line(&mut img, pair[0], pair[1], scale, PATH_COLOR);
        }
    }

    Ok(img)
}

/// Render and save the preview (format from the file extension).
pub fn save_preview(map: &MapData, scale: f64, path: impl AsRef<Path>) -> Result<()> {
    render_preview(map, scale)?.save(path)?;
    Ok(())
}

/// Bresenham line between two map-space points.
fn draw_line(img: &mut RgbImage, a: Point, b: Point, scale: f64, color: [u8; 3]) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let mut x0 = (a.x * scale).floor() as i64;
    let mut y0 = (a.y * scale).floor() as i64;
    let x1 = (b.x * scale).floor() as i64;
    let y1 = (b.y * scale).floor() as i64;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        // Points on the far extent edge land one pixel outside
        let px = x0.clamp(0, w - 1);
        let py = y0.clamp(0, h - 1);
        img.put_pixel(px as u32, py as u32, Rgb(color));

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
