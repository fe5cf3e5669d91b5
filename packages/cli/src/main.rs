#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for commercial activity feature extraction.
//!
//! Reads already-fetched snapshots from JSON files and writes feature
//! vectors, cluster grids, period histories, or training datasets as JSON.
//! Set `RUST_LOG=debug` to see per-step details.

mod io;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commerce_map_features::dataset::{build_dataset, dataset_file_name};
use commerce_map_features::engine::model_request;
use commerce_map_features::history::build_history;
use commerce_map_features::references::ReferenceConfig;
use commerce_map_features_models::{AreaObservations, DiffStrategy};
use commerce_map_geo_models::{BoundingBox, GeoObject, PeriodSummary, Snapshot};
use serde::Deserialize;

use crate::io::{read_json, write_json};

/// Directory datasets are written to when no `--output` is given.
const DEFAULT_DATASET_DIR: &str = "datasets";

#[derive(Parser)]
#[command(name = "commerce_map", about = "Commercial activity feature extraction")]
struct Cli {
    /// Reference filter TOML (overrides the `COMMERCE_MAP_REFERENCES` env var)
    #[arg(long, global = true)]
    references: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the feature vector for one area
    Extract {
        /// JSON bundle with `current`, `historical`, `transit` and `roads`
        #[arg(long)]
        input: PathBuf,
        /// Analysis window in years (overrides the bundle's `window_years`)
        #[arg(long)]
        window_years: Option<u32>,
        /// Object category; when set, output the prediction service payload
        #[arg(long)]
        category: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Split a bounding box into clusters
    Grid {
        /// Bounding box as "minLat,minLon,maxLat,maxLon"
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        /// Cluster edge length in kilometers
        #[arg(long)]
        cluster_size: f64,
        /// Emit a `GeoJSON` feature collection instead of a list of boxes
        #[arg(long)]
        geojson: bool,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize dated snapshots as a period history
    History {
        /// JSON array of snapshots
        #[arg(long)]
        input: PathBuf,
        /// Bounding box the snapshots cover, as "minLat,minLon,maxLat,maxLon"
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        /// How births and closures are attributed ("first-last" or "consecutive")
        #[arg(long, default_value_t = DiffStrategy::FirstLast)]
        strategy: DiffStrategy,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build a per-cluster, per-year training dataset
    Dataset {
        /// JSON area observations (`snapshots`, `transit`, `roads`)
        #[arg(long)]
        input: PathBuf,
        /// Bounding box to split, as "minLat,minLon,maxLat,maxLon"
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        /// Cluster edge length in kilometers
        #[arg(long)]
        cluster_size: f64,
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start_date: NaiveDate,
        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end_date: NaiveDate,
        /// Object category (overrides the input's `category`)
        #[arg(long)]
        category: Option<String>,
        /// Output file (default: datasets/dataset_<category>_<start>_to_<end>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Input bundle for the `extract` command.
#[derive(Deserialize)]
struct ExtractInput {
    current: Snapshot,
    #[serde(default)]
    historical: Vec<PeriodSummary>,
    #[serde(default)]
    transit: Vec<GeoObject>,
    #[serde(default)]
    roads: Vec<GeoObject>,
    #[serde(default)]
    window_years: u32,
    #[serde(default)]
    category: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            window_years,
            category,
            output,
        } => {
            let references = ReferenceConfig::load(cli.references.as_deref())?;
            let bundle: ExtractInput = read_json(&input)?;
            let window_years = window_years.unwrap_or(bundle.window_years);

            let transit = references.transit_stations(bundle.transit);
            let roads = references.qualifying_roads(bundle.roads);

            let vector = commerce_map_features::extract(
                bundle.current,
                &bundle.historical,
                window_years,
                &transit,
                &roads,
            );

            match category.or(bundle.category) {
                Some(category) => {
                    let request = model_request(vector, category, bundle.historical, window_years);
                    write_json(&request, output.as_deref())?;
                }
                None => write_json(&vector, output.as_deref())?,
            }
        }
        Commands::Grid {
            bbox,
            cluster_size,
            geojson,
            output,
        } => {
            let cells = commerce_map_geo::split(&bbox, cluster_size)?;
            log::info!("Split {bbox} into {} clusters", cells.len());

            if geojson {
                write_json(&commerce_map_geo::grid::to_geojson(&cells), output.as_deref())?;
            } else {
                write_json(&cells, output.as_deref())?;
            }
        }
        Commands::History {
            input,
            bbox,
            strategy,
            output,
        } => {
            let snapshots: Vec<Snapshot> = read_json(&input)?;
            let series = build_history(&snapshots, bbox, strategy);
            write_json(&series, output.as_deref())?;
        }
        Commands::Dataset {
            input,
            bbox,
            cluster_size,
            start_date,
            end_date,
            category,
            output,
        } => {
            let references = ReferenceConfig::load(cli.references.as_deref())?;
            let mut observations: AreaObservations = read_json(&input)?;
            if let Some(category) = category {
                observations.category = category;
            }
            if observations.category.is_empty() {
                observations.category = "all".to_string();
            }

            let dataset = build_dataset(
                &observations,
                &bbox,
                cluster_size,
                start_date,
                end_date,
                &references,
            )?;

            let path = output.unwrap_or_else(|| {
                PathBuf::from(DEFAULT_DATASET_DIR).join(dataset_file_name(
                    &observations.category,
                    start_date,
                    end_date,
                ))
            });

            log::info!(
                "Dataset has {} clusters; saving to {}",
                dataset.clusters.len(),
                path.display()
            );
            write_json(&dataset, Some(&path))?;
        }
    }

    Ok(())
}
