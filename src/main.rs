use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use roadsearch::api::{TransportKind, build_transport, geocode_city, reverse_geocode};
use roadsearch::config::{FileConfig, require_positive};
use roadsearch::domain::Query;
use roadsearch::geometry::BoundingBox;
use roadsearch::output::{render_places, render_results, write_report};
use roadsearch::search::run_search;

/// Find OpenStreetMap road segments by name near a US city
///
/// Results are printed and saved as JSON in the current directory, named
/// after the inputs (e.g. I_95_Miami_Florida.json).
///
/// Examples:
///   # Interstate 95 around Miami
///   roadsearch "I 95" Miami Florida
///
///   # Use the GET transport and a custom mirror
///   roadsearch "US 1" "Key West" FL --transport get --mirror https://overpass.example/api/interpreter
///
///   # Also list cities and towns within 1 km of the road
///   roadsearch "I 4" Orlando FL --places --buffer 1000
#[derive(Parser, Debug)]
#[command(name = "roadsearch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Roadway name or reference, e.g. "I 95"
    roadway: Option<String>,

    /// City to search around
    city: Option<String>,

    /// US state name or postal code
    state: Option<String>,

    /// Path to config file (optional, auto-searches roadsearch.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON file path (defaults to {roadway}_{city}_{state}.json)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// How queries are sent to Overpass
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Primary Overpass endpoint
    #[arg(long)]
    primary: Option<String>,

    /// Mirror Overpass endpoint, tried once if the primary times out
    #[arg(long)]
    mirror: Option<String>,

    /// Client-side request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Also report cities and towns near the roadway
    #[arg(long)]
    places: bool,

    /// Distance in meters a place may lie from the roadway (with --places)
    #[arg(long)]
    buffer: Option<f64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config: FileConfig = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };
    file_config.validate().context("Invalid config file")?;

    // Inputs are checked before anything touches the network
    let query = Query::new(
        args.roadway.as_deref(),
        args.city.as_deref(),
        args.state.as_deref(),
    )?;

    let mut overpass_config = file_config.overpass.clone().unwrap_or_default();
    if let Some(primary) = args.primary.clone() {
        overpass_config.primary = primary;
    }
    if let Some(mirror) = args.mirror.clone() {
        overpass_config.mirror = mirror;
    }
    if let Some(transport) = args.transport {
        overpass_config.transport = transport;
    }
    if let Some(timeout) = args.timeout {
        overpass_config.timeout_secs = timeout;
    }
    let nominatim_config = file_config.nominatim.clone().unwrap_or_default();

    let verbose = args.verbose || file_config.verbose;
    let places = args.places || file_config.places;
    let buffer_m = require_positive("--buffer", args.buffer.unwrap_or(file_config.buffer_m))?;
    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from(query.output_file_name()));

    if verbose {
        println!("Configuration:");
        println!("  Roadway: {}", query.roadway_name());
        println!("  City: {}", query.city());
        println!("  State: {}", query.state_name());
        println!("  Search half-size: {}°", file_config.area_half_size_deg);
        println!("  Transport: {:?}", overpass_config.transport);
        println!("  Primary: {}", overpass_config.primary);
        println!("  Mirror: {}", overpass_config.mirror);
        println!("  Timeout: {}s", overpass_config.timeout_secs);
        if places {
            println!("  Places buffer: {}m", buffer_m);
        }
        println!("  Output: {}", output_path.display());
        println!();
    }

    println!(
        "Searching for '{}' near {}, {}",
        query.roadway_name(),
        query.city(),
        query.state_name()
    );

    let spinner = create_spinner("Geocoding city...");
    let start = Instant::now();
    let center = geocode_city(&nominatim_config, &query.location_text())
        .context("Failed to geocode city")?;
    let area = BoundingBox::around(center, file_config.area_half_size_deg);
    spinner.finish_with_message(format!(
        "Geocoded: {} -> ({:.4}, {:.4}) [{:.1}s]",
        query.location_text(),
        center.lat,
        center.lon,
        start.elapsed().as_secs_f32()
    ));

    let transport = build_transport(
        overpass_config.transport,
        Duration::from_secs(overpass_config.timeout_secs),
    )
    .context("Failed to create HTTP client")?;

    if verbose {
        println!(
            "Overpass query:\n{}\n",
            roadsearch::api::build_road_query(
                query.roadway_name(),
                &area,
                overpass_config.server_timeout_secs
            )
        );
    }

    // Both searches finish before anything is written
    let spinner = create_spinner(if places {
        "Querying Overpass for road segments and nearby places..."
    } else {
        "Querying Overpass for road segments..."
    });
    let start = Instant::now();
    let report = run_search(
        transport.as_ref(),
        &overpass_config,
        &query,
        &area,
        places.then_some(buffer_m),
        |point| reverse_geocode(&nominatim_config, point),
    )
    .context("Failed to fetch data from Overpass API")?;
    spinner.finish_with_message(format!(
        "Fetched {} road segments [{:.1}s]",
        report.results.len(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    print!("{}", render_results(&query, &report.results));
    if verbose {
        println!("{}", serde_json::to_string_pretty(report.results.segments())?);
    }
    if let Some(ref nearby) = report.places {
        println!();
        print!("{}", render_places(nearby));
    }

    let places_file = write_report(&output_path, &report)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    println!();
    println!("Results saved to {}", output_path.display());
    if let Some(path) = places_file {
        println!("Places saved to {}", path.display());
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
