use std::path::PathBuf;
use std::process;

use clap::Parser;

use voronoi_terrain::{export, generate_map, MapConfig, MapPreset, MapSeeds};

#[derive(Parser, Debug)]
#[command(name = "voronoi_terrain")]
#[command(about = "Generate procedural Voronoi terrain and trace its coastlines")]
struct Args {
    /// Width of the generation area
    #[arg(short = 'W', long)]
    width: Option<f64>,

    /// Height of the generation area
    #[arg(short = 'H', long)]
    height: Option<f64>,

    /// Number of seed points (cells)
    #[arg(short = 'n', long)]
    points: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain preset
    #[arg(short, long, value_enum, default_value_t = MapPreset::Standard)]
    preset: MapPreset,

    /// Load configuration from a JSON file (overrides the preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of height bumps
    #[arg(long)]
    bumps: Option<usize>,

    /// Smallest bump radius
    #[arg(long)]
    min_radius: Option<f64>,

    /// Largest bump radius
    #[arg(long)]
    max_radius: Option<f64>,

    /// Height threshold for coastline extraction
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Lloyd relaxation passes
    #[arg(long)]
    relax: Option<usize>,

    /// Skip the erosion pass
    #[arg(long)]
    no_erosion: bool,

    /// List presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Write the effective config to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Export cells and paths to a JSON file
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Export a PNG preview
    #[arg(long)]
    export_png: Option<PathBuf>,

    /// Preview pixels per map unit
    #[arg(long, default_value = "1.0")]
    png_scale: f64,
}

fn build_config(args: &Args) -> voronoi_terrain::Result<MapConfig> {
    let mut config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => args.preset.config(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(points) = args.points {
        config.point_count = points;
    }
    if let Some(bumps) = args.bumps {
        config.heights.bumps = bumps;
    }
    if let Some(radius) = args.min_radius {
        config.heights.min_radius = radius;
    }
    if let Some(radius) = args.max_radius {
        config.heights.max_radius = radius;
    }
    if let Some(threshold) = args.threshold {
        config.height_threshold = threshold;
    }
    if let Some(relax) = args.relax {
        config.relax_iterations = relax;
    }
    if args.no_erosion {
        config.erode = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> voronoi_terrain::Result<()> {
    let config = build_config(args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = MapSeeds::from_master(seed);

    println!("Generating map with seed: {}", seed);
    println!("Map size: {}x{}, {} points", config.width, config.height, config.point_count);

    if let Some(path) = &args.save_config {
        config.save(path)?;
        println!("Saved config to: {}", path.display());
    }

    let map = generate_map(&config, &seeds)?;

    let stats = &map.height_stats;
    println!(
        "Heights: {:.1} to {:.1} ({} of {} cells above sea level)",
        stats.min_height,
        stats.max_height,
        stats.cells_above_sea_level,
        map.mesh.len()
    );
    if let Some(erosion) = &map.erosion_stats {
        println!(
            "Erosion: {} cells eroded, max {:.1}",
            erosion.cells_eroded, erosion.max_erosion
        );
    }

    let closed = map.paths.iter().filter(|p| p.is_closed()).count();
    println!(
        "Coastline: {} paths ({} closed), {:.1}% land",
        map.paths.len(),
        closed,
        100.0 * map.land_fraction()
    );

    if let Some(path) = &args.export_json {
        export::write_json(&map, path)?;
        println!("Exported JSON to: {}", path.display());
    }
    if let Some(path) = &args.export_png {
        export::save_preview(&map, args.png_scale, path)?;
        println!("Exported preview to: {}", path.display());
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.list_presets {
        for preset in MapPreset::all() {
            println!("{:<12} {}", preset.to_string(), preset.description());
        }
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
