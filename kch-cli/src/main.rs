//! KCH CLI — run the cleaning pass and write artifacts.
//!
//! Commands:
//! - `clean` — run the full pipeline from a TOML config or direct flags
//! - `manifest` — print the manifest of a previous run

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use kch_core::config::CleanConfig;
use kch_core::export::{load_manifest, save_artifacts};
use kch_core::pipeline::{run_pipeline, RunSummary};

#[derive(Parser)]
#[command(
    name = "kch",
    about = "King County housing data cleanup — dedup, derive, filter, export"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cleaning pipeline and write the two CSVs plus manifest.json.
    Clean {
        /// Path to a TOML config file. Mutually exclusive with --input.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Raw sales CSV. Mutually exclusive with --config.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory for the artifacts. Defaults to ./out.
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,

        /// Minimum at-or-below-median share (percent) for a zip code to be
        /// accepted.
        #[arg(long)]
        share_threshold: Option<f64>,

        /// Minimum property count for a zip code to enter the share
        /// computation.
        #[arg(long)]
        min_zip_support: Option<usize>,
    },
    /// Print the run manifest from an output directory.
    Manifest {
        /// Output directory of a previous run. Defaults to ./out.
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            config,
            input,
            output_dir,
            share_threshold,
            min_zip_support,
        } => run_clean(config, input, output_dir, share_threshold, min_zip_support),
        Commands::Manifest { output_dir } => run_manifest(output_dir),
    }
}

fn run_clean(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output_dir: PathBuf,
    share_threshold: Option<f64>,
    min_zip_support: Option<usize>,
) -> Result<()> {
    if config_path.is_some() && input.is_some() {
        bail!("--config and --input are mutually exclusive");
    }

    let mut config = match (config_path, input) {
        (Some(path), None) => CleanConfig::from_file(&path)?,
        (None, Some(input)) => CleanConfig::new(input, output_dir),
        (None, None) => bail!("one of --config or --input is required"),
        (Some(_), Some(_)) => unreachable!(),
    };

    if let Some(threshold) = share_threshold {
        config.filter.share_threshold = threshold;
    }
    if let Some(support) = min_zip_support {
        config.filter.min_zip_support = support;
    }

    let output = run_pipeline(&config)?;
    let written = save_artifacts(&output, &config.io.output_dir)?;

    print_summary(&output.summary);
    for path in &written {
        println!("Wrote: {}", path.display());
    }

    Ok(())
}

fn run_manifest(output_dir: PathBuf) -> Result<()> {
    let manifest = load_manifest(&output_dir)?;
    print_summary(&manifest.summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Cleaning Run ===");
    println!("Input:            {}", summary.input_path);
    println!("Dataset hash:     {}", summary.dataset_hash);
    println!();
    println!("--- Rows ---");
    println!("Raw:              {}", summary.raw_rows);
    println!("Superseded:       {}", summary.superseded_rows);
    println!("Surviving:        {}", summary.surviving_rows);
    println!("Multi-sold props: {}", summary.multi_sold_properties);
    println!("Target rows:      {}", summary.target_rows);
    println!();
    println!("--- Zip-code filter ---");
    println!(
        "Median $/sqft:    {:.2}",
        summary.median_price_sqft_living
    );
    println!(
        "Share threshold:  {:.1}% (support >= {})",
        summary.share_threshold, summary.min_zip_support
    );
    println!(
        "Accepted zips:    {} ({})",
        summary.accepted_zipcodes.len(),
        join_zips(&summary.accepted_zipcodes)
    );
    if !summary.excluded_zipcodes.is_empty() {
        println!(
            "Excluded (low support): {}",
            join_zips(&summary.excluded_zipcodes)
        );
    }
    println!();
}

fn join_zips(zips: &[u32]) -> String {
    zips.iter()
        .map(|z| z.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
