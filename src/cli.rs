//! `fieldkit` command line handling.
//!
//! ```text
//! fieldkit report <fields.json> [--json]
//! fieldkit measure <lat,lng> <lat,lng> [<lat,lng> ...]
//! fieldkit config [<config.toml|config.json>]
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldkit_core::geometry;
use fieldkit_core::{format_distance, AreaReport, GeoBounds, GeoPoint};
use fieldkit_editor::{FieldPolygon, FieldStore, JsonFileStore, MeasuredPath, PolygonRegistry};
use fieldkit_settings::Config;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Field boundary measurement.
#[derive(Parser, Debug)]
#[command(
    name = "fieldkit",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Area and perimeter of stored fields
    Report {
        #[arg(value_name = "FIELDS_JSON")]
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long = "json", action = clap::ArgAction::SetTrue)]
        json: bool,
    },
    /// Length of a path, and its area when closed
    Measure {
        #[arg(value_name = "LAT,LNG", num_args = 2.., required = true, allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
    /// Show the effective configuration
    Config {
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

/// Runs a command, returning the text to print.
pub async fn run(command: Command) -> Result<String> {
    match command {
        Command::Report { path, json } => {
            let store = JsonFileStore::new(&path);
            let fields = store
                .load_all()
                .await
                .with_context(|| format!("failed to load fields from {}", path.display()))?;

            let config = load_config(None)?;
            let mut registry = PolygonRegistry::with_config(&config);
            registry.load_fields(fields);
            let fields: Vec<&FieldPolygon> = registry.fields();

            if json {
                let summaries: Vec<FieldSummary> =
                    fields.iter().map(|field| FieldSummary::from(*field)).collect();
                Ok(serde_json::to_string_pretty(&summaries)?)
            } else {
                Ok(render_report(&fields))
            }
        }
        Command::Measure { points } => Ok(render_measure(&points)),
        Command::Config { path } => {
            let path = match path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = load_config(Some(path.clone()))?;
            Ok(format!(
                "# {}\n{}",
                path.display(),
                config.to_toml_string()?
            ))
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => match Config::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}, using default configuration", e);
                return Ok(Config::default());
            }
        },
    };
    Config::load_or_default(&path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Per-field numbers printed by `report --json`.
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub id: String,
    pub name: String,
    pub vertices: usize,
    pub perimeter_m: f64,
    pub area: AreaReport,
    pub bounds: Option<GeoBounds>,
}

impl From<&FieldPolygon> for FieldSummary {
    fn from(field: &FieldPolygon) -> Self {
        Self {
            id: field.id.as_uuid().to_string(),
            name: field.name.clone(),
            vertices: field.vertices.len(),
            perimeter_m: field.perimeter_m(),
            area: field.area_report(),
            bounds: geometry::bounds(&field.vertices),
        }
    }
}

/// Human readable report, one block per field.
pub fn render_report(fields: &[&FieldPolygon]) -> String {
    if fields.is_empty() {
        return "No fields.\n".to_string();
    }

    let mut out = String::new();
    for field in fields {
        let _ = writeln!(out, "{} ({})", field.name, field.id);
        let _ = writeln!(out, "  vertices:  {}", field.vertices.len());
        let _ = writeln!(out, "  perimeter: {}", format_distance(field.perimeter_m()));
        for line in field.area_report().lines() {
            let _ = writeln!(out, "  area:      {}", line);
        }
        if let Some(bounds) = geometry::bounds(&field.vertices) {
            let _ = writeln!(
                out,
                "  bounds:    {:.6},{:.6} .. {:.6},{:.6} (center {})",
                bounds.south,
                bounds.west,
                bounds.north,
                bounds.east,
                bounds.center()
            );
        }
    }
    out
}

/// Length of the open path through `points`, plus the enclosed area when
/// there are at least three points.
pub fn render_measure(points: &[GeoPoint]) -> String {
    let path = MeasuredPath::new(points.to_vec());
    let mut out = String::new();
    let _ = writeln!(out, "length: {}", format_distance(path.length_m));
    for (i, length) in geometry::edge_lengths(points, false).iter().enumerate() {
        let _ = writeln!(out, "  edge {}: {}", i + 1, format_distance(*length));
    }

    if points.len() >= 3 {
        let report = AreaReport::from_square_meters(geometry::polygon_area(points));
        let _ = writeln!(
            out,
            "closed perimeter: {}",
            format_distance(geometry::perimeter(points, true))
        );
        let _ = writeln!(out, "area: {}", report);
    }
    out
}
