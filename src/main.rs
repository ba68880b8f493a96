use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use city_generator::ascii::{self, AsciiMode};
use city_generator::export;
use city_generator::{
    CityConfig, CityGenerator, DistanceMetric, HeightJitter, PlacementLog, SiteCount,
};

#[derive(Parser, Debug)]
#[command(name = "city_generator")]
#[command(about = "Generate procedural city layouts from district sites and road lattices")]
struct Args {
    /// JSON config file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the city grid in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the city grid in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified and no config file is given)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Exact number of district sites
    #[arg(short = 'n', long, conflicts_with_all = ["min_sites", "max_sites"])]
    sites: Option<usize>,

    /// Minimum number of district sites (inclusive)
    #[arg(long, requires = "max_sites")]
    min_sites: Option<usize>,

    /// Maximum number of district sites (exclusive)
    #[arg(long, requires = "min_sites")]
    max_sites: Option<usize>,

    /// Distance metric: euclidean or manhattan
    #[arg(short, long)]
    metric: Option<String>,

    /// Spacing of the block-road lattice
    #[arg(short, long)]
    block_size: Option<usize>,

    /// Extra passes widening district-border roads
    #[arg(long)]
    road_thickness: Option<usize>,

    /// Never place park districts
    #[arg(long)]
    no_parks: bool,

    /// Skip border roads next to cells that are already road
    #[arg(long)]
    suppress_border_roads: bool,

    /// Emit nothing for road cells
    #[arg(long)]
    silent_roads: bool,

    /// Minimum building height multiplier
    #[arg(long, requires = "height_max")]
    height_min: Option<f32>,

    /// Maximum building height multiplier
    #[arg(long, requires = "height_min")]
    height_max: Option<f32>,

    /// Disable building height variation
    #[arg(long, conflicts_with_all = ["height_min", "height_max"])]
    flat: bool,

    /// Uniform scale divisor applied to every placement
    #[arg(long)]
    scale_divisor: Option<f32>,

    /// Number of generation passes to run
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    passes: u64,

    /// Switch the distance metric between passes
    #[arg(long)]
    toggle_metric: bool,

    /// Print the final city as ASCII (category, district or archetype)
    #[arg(long)]
    print: Option<Option<String>>,

    /// Export the category map to PNG
    #[arg(long)]
    export_png: Option<PathBuf>,

    /// Export the district map with site markers to PNG
    #[arg(long)]
    export_districts: Option<PathBuf>,

    /// Pixels per cell for PNG exports
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..))]
    png_scale: u32,

    /// Export a text report with the ASCII map
    #[arg(long)]
    export_ascii: Option<PathBuf>,

    /// Export the placement list as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Write the effective config as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn build_config(args: &Args) -> Result<CityConfig, String> {
    let mut config = match &args.config {
        Some(path) => CityConfig::load(path).map_err(|e| e.to_string())?,
        None => CityConfig {
            seed: rand::random(),
            ..Default::default()
        },
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n) = args.sites {
        config.sites = SiteCount::Fixed(n);
    }
    if let (Some(min), Some(max)) = (args.min_sites, args.max_sites) {
        config.sites = SiteCount::Range { min, max };
    }
    if let Some(ref metric) = args.metric {
        config.metric = DistanceMetric::from_str(metric)
            .ok_or_else(|| format!("Unknown metric '{}' (expected euclidean or manhattan)", metric))?;
    }
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }
    if let Some(thickness) = args.road_thickness {
        config.major_road_thickness = thickness;
    }
    if args.no_parks {
        config.allow_parks = false;
    }
    if args.suppress_border_roads {
        config.suppress_border_road_near_road = true;
    }
    if args.silent_roads {
        config.emit_roads = false;
    }
    if let (Some(min), Some(max)) = (args.height_min, args.height_max) {
        config.height_jitter = Some(HeightJitter { min, max });
    }
    if args.flat {
        config.height_jitter = None;
    }
    if let Some(divisor) = args.scale_divisor {
        config.scale_divisor = Some(divisor);
    }

    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match args.log_level.parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => {
            eprintln!("Invalid log level '{}'", args.log_level);
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let print_mode = match &args.print {
        None => None,
        Some(None) => Some(AsciiMode::Category),
        Some(Some(mode)) => match AsciiMode::from_str(mode) {
            Some(m) => Some(m),
            None => {
                eprintln!("Unknown ASCII mode '{}' (expected category, district or archetype)", mode);
                return ExitCode::FAILURE;
            }
        },
    };

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref path) = args.save_config {
        if let Err(e) = config.save(path) {
            eprintln!("{}", e);
        }
    }

    println!("Generating city with seed: {}", config.seed);
    println!("Map size: {}x{}", config.width, config.height);

    let mut generator = match CityGenerator::configure(config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut placed = PlacementLog::default();
    for pass in 0..args.passes {
        if pass > 0 && args.toggle_metric {
            generator.toggle_metric();
        }

        let city = match generator.generate_into(&mut placed) {
            Ok(city) => city,
            Err(e) => {
                eprintln!("Generation failed: {}", e);
                return ExitCode::FAILURE;
            }
        };

        println!(
            "Pass {}: {} sites ({} metric), {} road cells, {} placements",
            city.generation,
            city.sites.len(),
            city.metric,
            city.road_count(),
            placed.placements.len()
        );
    }

    let Some(city) = generator.city() else {
        return ExitCode::FAILURE;
    };

    if let Some(mode) = print_mode {
        print!("{}", ascii::render_ascii_map(city, mode));
    }

    if let Some(ref path) = args.export_png {
        match export::export_city_map(city, path, args.png_scale) {
            Ok((w, h)) => println!("Exported city map to: {} ({}x{} pixels)", path.display(), w, h),
            Err(e) => eprintln!("Failed to export city map: {}", e),
        }
    }

    if let Some(ref path) = args.export_districts {
        match export::export_district_map(city, path, args.png_scale) {
            Ok((w, h)) => println!("Exported district map to: {} ({}x{} pixels)", path.display(), w, h),
            Err(e) => eprintln!("Failed to export district map: {}", e),
        }
    }

    if let Some(ref path) = args.export_ascii {
        let mode = print_mode.unwrap_or(AsciiMode::Category);
        match ascii::export_city_report(city, path, mode) {
            Ok(()) => println!("Exported report to: {}", path.display()),
            Err(e) => eprintln!("Failed to export report: {}", e),
        }
    }

    if let Some(ref path) = args.export_json {
        match export::export_placements_json(&placed.placements, path) {
            Ok(()) => println!("Exported {} placements to: {}", placed.placements.len(), path.display()),
            Err(e) => eprintln!("Failed to export placements: {}", e),
        }
    }

    ExitCode::SUCCESS
}
