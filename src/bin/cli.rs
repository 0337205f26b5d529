//! tripclean CLI - fetch raw tracker points and clean them into trips
//!
//! Usage:
//!   tripclean-cli fetch --start <DDMMYYYY> [--end <DDMMYYYY>] [--output <file>]
//!   tripclean-cli clean <raw.json> [--output <file>] [--trips <file>] [--elevations]
//!
//! `fetch` talks to the vendor API and saves the raw point batches; `clean`
//! runs the cleaning pipeline over a saved file and writes the map data the
//! front end renders.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tripclean::{
    clean, fetch_elevation_grid, normalize, write_json, write_trips_json, Bounds, CleanConfig,
    CleanError, ElevationGrid, PointBatch, Result, VendorClient,
};

#[derive(Parser)]
#[command(name = "tripclean-cli")]
#[command(about = "Fetch and clean GPS tracker trips", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch raw point batches from the vendor API
    Fetch {
        /// Start date, DDMMYYYY (vendor convention)
        #[arg(long)]
        start: String,

        /// End date, DDMMYYYY; defaults to now
        #[arg(long)]
        end: Option<String>,

        /// Vendor account; falls back to $SINO_USER
        #[arg(long)]
        user: Option<String>,

        /// Vendor server URL
        #[arg(long, default_value = tripclean::http::DEFAULT_SERVER_URL)]
        server: String,

        /// Timezone the dates are interpreted in
        #[arg(long, default_value = "Europe/Paris")]
        timezone: String,

        /// Output file for the raw batches
        #[arg(short, long, default_value = "raw_points.json")]
        output: PathBuf,
    },

    /// Clean saved raw batches into trips and write map data
    Clean {
        /// Raw batches JSON produced by `fetch`
        input: PathBuf,

        /// Map data output file
        #[arg(short, long, default_value = "data.json")]
        output: PathBuf,

        /// Optional trip-summary output file
        #[arg(long)]
        trips: Option<PathBuf>,

        /// Minutes of silence that split two trips
        #[arg(long, default_value_t = 10.0)]
        tracks_delta: f64,

        /// Drop trips whose max speed is below this (km/h)
        #[arg(long, default_value_t = 5)]
        min_max_speed: u32,

        /// Drop trips whose max speed is above this (km/h)
        #[arg(long, default_value_t = 55)]
        max_max_speed: u32,

        /// Trim leading/trailing points at or below this speed (km/h)
        #[arg(long, default_value_t = 5)]
        trim_speed: u32,

        /// Drop trips shorter than this many minutes
        #[arg(long, default_value_t = 3.0)]
        min_duration: f64,

        /// Keep only points on or after this date (YYYY-MM-DD)
        #[arg(long)]
        min_date: Option<NaiveDate>,

        /// Keep only points on or before this date (YYYY-MM-DD)
        #[arg(long)]
        max_date: Option<NaiveDate>,

        /// Look up an elevation grid and add per-point gain metrics
        #[arg(long)]
        elevations: bool,

        /// Elevation grid resolution per axis
        #[arg(long, default_value_t = 64)]
        elevation_precision: usize,

        /// Target timezone for localization and formatting
        #[arg(long, default_value = "Europe/Paris")]
        timezone: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; --verbose surfaces the pipeline's debug lines
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch {
            start,
            end,
            user,
            server,
            timezone,
            output,
        } => run_fetch(&start, end.as_deref(), user, &server, &timezone, &output),
        Commands::Clean {
            input,
            output,
            trips,
            tracks_delta,
            min_max_speed,
            max_max_speed,
            trim_speed,
            min_duration,
            min_date,
            max_date,
            elevations,
            elevation_precision,
            timezone,
        } => {
            let config = CleanConfig {
                tracks_delta,
                min_max_speed_for_valid_tracks: min_max_speed,
                max_max_speed_for_valid_tracks: max_max_speed,
                remove_start_end_points_speed: trim_speed,
                min_duration,
                min_date,
                max_date,
                get_elevations: elevations,
                timezone: parse_timezone(&timezone)?,
            };
            run_clean(&input, &output, trips.as_deref(), &config, elevation_precision)
        }
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| CleanError::Config(format!("unknown timezone `{name}`: {e}")))
}

/// Interpret a vendor-convention DDMMYYYY date as local midnight in `tz`.
fn parse_vendor_date(date: &str, tz: &Tz) -> Result<i64> {
    let date = NaiveDate::parse_from_str(date, "%d%m%Y")
        .map_err(|e| CleanError::Config(format!("invalid date `{date}`: {e}")))?;
    let midnight = date
        .and_time(NaiveTime::MIN)
        .and_local_timezone(*tz)
        .earliest()
        .ok_or_else(|| CleanError::Config(format!("no midnight for `{date}` in {tz}")))?;
    Ok(midnight.timestamp())
}

fn run_fetch(
    start: &str,
    end: Option<&str>,
    user: Option<String>,
    server: &str,
    timezone: &str,
    output: &Path,
) -> Result<()> {
    let tz = parse_timezone(timezone)?;
    let start = parse_vendor_date(start, &tz)?;
    let end = match end {
        Some(date) => parse_vendor_date(date, &tz)?,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64,
    };

    let client = match user {
        Some(user) => VendorClient::new(server, user),
        None => VendorClient::from_env()?,
    };

    println!("Fetching points from {start} to {end}...");
    let batches = client.fetch_points(start, end)?;
    let total: usize = batches.iter().map(|b| b.records.len()).sum();

    let file = File::create(output)?;
    serde_json::to_writer(BufWriter::new(file), &batches)?;
    println!(
        "Saved {} batches ({} records) to {}",
        batches.len(),
        total,
        output.display()
    );
    Ok(())
}

fn run_clean(
    input: &Path,
    output: &Path,
    trips_output: Option<&Path>,
    config: &CleanConfig,
    elevation_precision: usize,
) -> Result<()> {
    let file = File::open(input)?;
    let batches: Vec<PointBatch> = serde_json::from_reader(BufReader::new(file))?;
    println!("Loaded {} batches from {}", batches.len(), input.display());

    let grid = if config.get_elevations {
        Some(lookup_grid(&batches, config, elevation_precision)?)
    } else {
        None
    };

    let result = clean(&batches, config, grid.as_ref())?;

    println!("\n{}", "=".repeat(60));
    println!("RESULTS: {} trips kept", result.trips.len());
    println!("{}", "=".repeat(60));
    for trip in &result.trips {
        println!(
            "  [{:3}] {}  {:6.1} km  {:5.0} min  max {:2} km/h  mean {:4.1} km/h",
            trip.trip_id,
            trip.formatted_start_date,
            trip.dist_total_km,
            trip.duration_min,
            trip.max_speed,
            trip.mean_speed_kmh,
        );
    }

    write_json(output, &result)?;
    println!("\nWrote map data to {}", output.display());
    if let Some(path) = trips_output {
        write_trips_json(path, &result)?;
        println!("Wrote trip summaries to {}", path.display());
    }
    Ok(())
}

/// Fetch the elevation raster covering the normalized points.
///
/// The pipeline core never performs I/O; the CLI is the layer that pairs
/// `--elevations` with an actual grid fetch.
fn lookup_grid(
    batches: &[PointBatch],
    config: &CleanConfig,
    precision: usize,
) -> Result<ElevationGrid> {
    let pings = normalize(batches, config)?;
    let bounds = Bounds::from_pings(&pings).ok_or_else(|| {
        CleanError::Elevation("no points in range to build an elevation grid for".to_string())
    })?;
    fetch_elevation_grid(bounds, precision)
}
