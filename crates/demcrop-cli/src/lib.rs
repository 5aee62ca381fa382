//! Command-line front end for `demcrop-extract`.
//!
//! ```text
//! demcrop asc LAT_MIN LNG_MIN LAT_MAX LNG_MAX DATA_FOLDER [OUT_FILE]
//! demcrop hgt LAT_MIN LNG_MIN LAT_MAX LNG_MAX HGT_FILE [OUT_FILE]
//! ```
//!
//! The artifact goes to `OUT_FILE`, or to `out.xyz` when it is omitted, in
//! which case the data is also printed to stdout. Status messages are logged
//! to stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use demcrop_extract::{extract_grid, extract_hgt, ExtractConfig, ExtractionReport, GeoBoundingBox};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Artifact written when no output file is given.
pub const DEFAULT_OUT_FILE: &str = "out.xyz";

#[derive(Parser, Debug)]
#[command(name = "demcrop")]
#[command(version, about = "Crop elevation tiles to a bounding box as XYZ points")]
pub struct Cli {
    /// YAML file with extraction settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract from a folder of Lambert-93 ASCII grid tiles (BD ALTI)
    Asc {
        #[command(flatten)]
        bbox: BboxArgs,

        /// Folder holding the .asc tiles
        data_folder: PathBuf,

        /// Output file (default: out.xyz, also printed to stdout)
        out_file: Option<PathBuf>,
    },

    /// Extract from one SRTM3 .hgt tile
    Hgt {
        #[command(flatten)]
        bbox: BboxArgs,

        /// The .hgt file, e.g. N45E006.hgt
        hgt_file: PathBuf,

        /// Output file (default: out.xyz, also printed to stdout)
        out_file: Option<PathBuf>,
    },
}

/// Two opposing corners of the query box, in any order.
#[derive(Args, Debug, Clone, Copy, PartialEq)]
pub struct BboxArgs {
    /// Latitude of the first corner
    #[arg(allow_negative_numbers = true)]
    pub lat_min: f64,

    /// Longitude of the first corner
    #[arg(allow_negative_numbers = true)]
    pub lng_min: f64,

    /// Latitude of the second corner
    #[arg(allow_negative_numbers = true)]
    pub lat_max: f64,

    /// Longitude of the second corner
    #[arg(allow_negative_numbers = true)]
    pub lng_max: f64,
}

impl BboxArgs {
    fn to_bbox(self) -> Result<GeoBoundingBox> {
        Ok(GeoBoundingBox::new(
            self.lat_min,
            self.lng_min,
            self.lat_max,
            self.lng_max,
        )?)
    }
}

/// Install the stderr log subscriber.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one extraction and write its artifact.
pub fn run(cli: &Cli) -> Result<ExtractionReport> {
    let config = match &cli.config {
        Some(path) => ExtractConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExtractConfig::default(),
    };

    let mut out = Vec::<u8>::new();
    let (report, out_file) = match &cli.command {
        Command::Asc {
            bbox,
            data_folder,
            out_file,
        } => {
            let bbox = bbox.to_bbox()?;
            let folder = expand_home(data_folder);
            let report = extract_grid(&folder, &bbox, &config, &mut out)
                .with_context(|| format!("extraction from {} failed", folder.display()))?;
            (report, out_file)
        }
        Command::Hgt {
            bbox,
            hgt_file,
            out_file,
        } => {
            let bbox = bbox.to_bbox()?;
            let report = extract_hgt(hgt_file, &bbox, &config, &mut out)
                .with_context(|| format!("extraction from {} failed", hgt_file.display()))?;
            (report, out_file)
        }
    };

    if report.no_matching_data() {
        warn!("No matching dataset found, writing header only");
    }

    let path = output_path(out_file.as_deref());
    std::fs::write(&path, &out).with_context(|| format!("failed to write {}", path.display()))?;

    if out_file.is_none() {
        info!("Found data (also exported to {}):", path.display());
        println!("{}", String::from_utf8_lossy(&out));
    } else {
        info!(samples = report.samples, "Found data exported to {}", path.display());
    }

    Ok(report)
}

/// Output file, falling back to [`DEFAULT_OUT_FILE`].
pub fn output_path(out_file: Option<&Path>) -> PathBuf {
    out_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_FILE))
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
