//! Shoreline CLI - coastline extraction from satellite imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shoreline_algorithms::imagery::IndexParams;
use shoreline_algorithms::pipeline::{extract_coastline, CoastlineParams, ExtractionStatus};
use shoreline_algorithms::segmentation::OtsuParams;
use shoreline_algorithms::vector::VectorizeParams;
use shoreline_core::io::{read_scene, Scene, SceneOptions};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "shoreline")]
#[command(author, version, about = "Coastline extraction from satellite imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a scene
    Info {
        /// Input GeoTIFF file
        input: PathBuf,

        /// 1-based index of the green band
        #[arg(long, default_value = "2")]
        green_band: usize,

        /// 1-based index of the near-infrared band
        #[arg(long, default_value = "4")]
        nir_band: usize,

        /// Fill/nodata value of the bands
        #[arg(long, default_value = "0")]
        nodata: f64,
    },
    /// Extract the coastline of a scene as GeoJSON polygons
    Extract {
        /// Input GeoTIFF file
        input: PathBuf,

        /// Output GeoJSON file
        output: PathBuf,

        /// 1-based index of the green band
        #[arg(long, default_value = "2")]
        green_band: usize,

        /// 1-based index of the near-infrared band
        #[arg(long, default_value = "4")]
        nir_band: usize,

        /// Fill/nodata value of the bands
        #[arg(long, default_value = "0")]
        nodata: f64,

        /// Minimum polygon area in squared CRS units
        #[arg(long, default_value = "500")]
        min_area: f64,

        /// Histogram bins for threshold selection
        #[arg(long, default_value = "256")]
        bins: usize,

        /// Division guard added to the index denominator
        #[arg(long, default_value = "1e-5")]
        epsilon: f64,

        /// Indent the output JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info {
            input,
            green_band,
            nir_band,
            nodata,
        } => {
            let scene = load_scene(&input, green_band, nir_band, nodata)?;
            let (rows, cols) = scene.shape();
            let bounds = scene.green.bounds();
            let stats = scene.green.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, rows * cols);
            println!("Cell size: {}", scene.green.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            println!("CRS: {}", scene.crs_name());
            println!(
                "Valid pixels: {} ({:.1}%)",
                scene.valid_count(),
                100.0 * scene.valid_count() as f64 / (rows * cols) as f64
            );
            println!("\nGreen band statistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
        }

        // ── Extract ──────────────────────────────────────────────────
        Commands::Extract {
            input,
            output,
            green_band,
            nir_band,
            nodata,
            min_area,
            bins,
            epsilon,
            pretty,
        } => {
            let scene = load_scene(&input, green_band, nir_band, nodata)?;

            let params = CoastlineParams {
                index: IndexParams { epsilon },
                otsu: OtsuParams { bins },
                vectorize: VectorizeParams { min_area },
            };

            let pb = spinner("Extracting coastline...");
            let start = Instant::now();
            let report =
                extract_coastline(&scene, &params).context("Coastline extraction failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            let json = if pretty {
                report.collection.to_json_pretty()
            } else {
                report.collection.to_json()
            }
            .context("Failed to serialize feature collection")?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("Coastline saved to: {}", output.display());
            println!("  Threshold: {:.6}", report.threshold);
            println!("  Water pixels: {}", report.water_pixels);
            println!("  Features: {}", report.collection.len());
            match report.status {
                ExtractionStatus::Empty => {
                    println!("  Note: no water polygons qualified for export");
                }
                ExtractionStatus::ExtractedWithDrops => {
                    println!(
                        "  Warning: {} boundary ring(s) discarded",
                        report.dropped_polygons
                    );
                }
                ExtractionStatus::Extracted => {}
            }
            println!("  Processing time: {:.2?}", elapsed);
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_scene(path: &PathBuf, green_band: usize, nir_band: usize, nodata: f64) -> Result<Scene> {
    let options = SceneOptions {
        green_band,
        nir_band,
        nodata: Some(nodata),
    };
    let pb = spinner("Reading scene...");
    let scene = read_scene(path, &options)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Input: {} x {}, {} valid pixels",
        scene.green.cols(),
        scene.green.rows(),
        scene.valid_count()
    );
    Ok(scene)
}
