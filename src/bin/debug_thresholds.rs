//! Debug tool for comparing coastline thresholds and erosion visually
//! Generates a grid of previews of one mesh under different settings

use image::{ImageBuffer, Rgb, RgbImage};
use voronoi_terrain::boundary::extract_boundary_paths;
use voronoi_terrain::erosion::{apply_erosion, ErosionParams};
use voronoi_terrain::export::render_preview;
use voronoi_terrain::{generate_map, MapConfig, MapData, MapSeeds};

const SIZE: f64 = 512.0;
const POINTS: usize = 800;
const SEED: u64 = 42;

fn main() {
    env_logger::init();
    println!("Generating threshold comparison grid...");

    // Generate base terrain once, without erosion
    let config = MapConfig {
        width: SIZE,
        height: SIZE,
        point_count: POINTS,
        erode: false,
        ..MapConfig::default()
    };
    let base = match generate_map(&config, &MapSeeds::from_master(SEED)) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };

    // (label, threshold, erosion radius; None skips erosion)
    let variants: [(&str, f64, Option<f64>); 9] = [
        ("1. t=-200", -200.0, None),
        ("2. t=0", 0.0, None),
        ("3. t=200", 200.0, None),
        ("4. t=-200 r=75", -200.0, Some(75.0)),
        ("5. t=0 r=75", 0.0, Some(75.0)),
        ("6. t=200 r=75", 200.0, Some(75.0)),
        ("7. t=-200 r=150", -200.0, Some(150.0)),
        ("8. t=0 r=150", 0.0, Some(150.0)),
        ("9. t=200 r=150", 200.0, Some(150.0)),
    ];

    let mut images: Vec<RgbImage> = Vec::new();
    for (name, threshold, radius) in variants {
        match render_variant(&base, threshold, radius) {
            Ok((img, paths)) => {
                println!("  {:<18} {} paths", name, paths);
                images.push(img);
            }
            Err(e) => {
                eprintln!("  {:<18} failed: {}", name, e);
                images.push(ImageBuffer::new(SIZE as u32, SIZE as u32));
            }
        }
    }

    let grid = create_grid(&images, 3, 3);
    match grid.save("threshold_comparison.png") {
        Ok(()) => println!("Saved threshold_comparison.png"),
        Err(e) => eprintln!("Failed to save grid: {}", e),
    }
}

fn render_variant(
    base: &MapData,
    threshold: f64,
    radius: Option<f64>,
) -> voronoi_terrain::Result<(RgbImage, usize)> {
    let mut map = base.clone();
    map.config.height_threshold = threshold;

    if let Some(radius) = radius {
        let params = ErosionParams {
            radius,
            ..ErosionParams::default()
        };
        apply_erosion(&mut map.mesh, &params, &map.config.heights.range)?;
    }

    map.paths = extract_boundary_paths(&map.mesh, threshold);
    let img = render_preview(&map, 1.0)?;
    Ok((img, map.paths.len()))
}

fn create_grid(images: &[RgbImage], cols: usize, rows: usize) -> RgbImage {
    if images.is_empty() {
        return ImageBuffer::new(1, 1);
    }

    let cell_width = images[0].width();
    let cell_height = images[0].height();
    let gap = 4u32;

    let grid_width = (cell_width + gap) * cols as u32 - gap;
    let grid_height = (cell_height + gap) * rows as u32 - gap;

    let mut grid: RgbImage = ImageBuffer::from_pixel(grid_width, grid_height, Rgb([40, 40, 40]));

    for (idx, img) in images.iter().enumerate() {
        let col = idx % cols;
        let row = idx / cols;
        if row >= rows {
            break;
        }

        let x_offset = col as u32 * (cell_width + gap);
        let y_offset = row as u32 * (cell_height + gap);

        for y in 0..cell_height.min(img.height()) {
            for x in 0..cell_width.min(img.width()) {
                grid.put_pixel(x_offset + x, y_offset + y, *img.get_pixel(x, y));
            }
        }
    }

    grid
}
