//! Command-line tool for OGC TileMatrixSet tile grids.
//!
//! Looks up tiles for points, tile bounds and geometry coverage in a
//! built-in or custom TileMatrixSet, and validates TileMatrixSet and TileSet
//! documents.

mod commands;
mod geometry;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tms_validate::DocumentKind;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tms")]
#[command(about = "Inspect OGC TileMatrixSet tile grids")]
struct Args {
    /// TileMatrixSet name from the registry, or path to a JSON document
    #[arg(long, global = true, env = "TMS_DEFAULT_SET", default_value = "WebMercatorQuad")]
    tms: String,

    /// Output format
    #[arg(
        long,
        global = true,
        env = "TMS_OUTPUT",
        value_enum,
        default_value_t = OutputFormat::Text
    )]
    output: OutputFormat,

    /// Log level
    #[arg(long, global = true, env = "TMS_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "TMS_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in TileMatrixSets
    List,

    /// Describe a TileMatrixSet
    Info,

    /// Tile containing a WGS84 longitude/latitude
    Tile {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long)]
        zoom: u32,
    },

    /// Bounds of a tile
    Bounds {
        #[arg(long)]
        zoom: u32,

        #[arg(long)]
        col: u32,

        #[arg(long)]
        row: u32,

        /// Report bounds in WGS84 degrees instead of the set's CRS
        #[arg(long)]
        geographic: bool,
    },

    /// Tiles covering a GeoJSON geometry
    Cover {
        /// GeoJSON text, or @FILE to read it from a file
        #[arg(long)]
        geometry: String,

        /// CRS of the input geometry
        #[arg(long, default_value = "EPSG:4326")]
        crs: String,

        #[arg(long)]
        min_zoom: u32,

        #[arg(long)]
        max_zoom: u32,

        /// Buffer around the geometry in units of the set's CRS
        #[arg(long, default_value_t = 0.0)]
        buffer: f64,
    },

    /// Validate a TileMatrixSet or TileSet JSON document
    Validate {
        file: PathBuf,

        /// Document kind: tile-matrix-set or tile-set
        #[arg(long, default_value = "tile-matrix-set")]
        kind: DocumentKind,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;
    debug!(command = ?args.command, tms = %args.tms, "starting");

    let format = args.output;
    match args.command {
        Command::List => commands::list(format),
        Command::Info => commands::info(&args.tms, format),
        Command::Tile { lon, lat, zoom } => commands::tile(&args.tms, lon, lat, zoom, format),
        Command::Bounds {
            zoom,
            col,
            row,
            geographic,
        } => commands::bounds(&args.tms, zoom, col, row, geographic, format),
        Command::Cover {
            geometry,
            crs,
            min_zoom,
            max_zoom,
            buffer,
        } => {
            let request = commands::CoverRequest {
                geometry: &geometry,
                crs: &crs,
                min_zoom,
                max_zoom,
                buffer,
            };
            commands::cover(&args.tms, &request, format)
        }
        Command::Validate { file, kind } => commands::validate(&file, kind, format),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Install the global subscriber. Logs go to stderr so that command output
/// on stdout stays machine readable.
fn init_tracing(level: &str, json: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
