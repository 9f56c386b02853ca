use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::MergeConfig;
use crate::pipeline::{run_bulk, run_single, BulkRun, SingleRun};
use crate::report::{write_reports, RunMode};

mod config;
mod data_handling;
mod helper_functions;
mod merge;
mod models;
mod pipeline;
mod report;

#[derive(Parser)]
#[command(name = "annotation_merger", version, about = "Merge gene-to-ontology annotation tables into a genome")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a `gene<TAB>term` table for one ontology
    Single(SingleArgs),
    /// Merge a `description<TAB>ontology<TAB>gene<TAB>term` table, one event per group
    Bulk(BulkArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Directory holding the ontology dictionaries (or set ONTOLOGY_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Directory annotation files are read from (or set STAGING_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    staging_dir: Option<PathBuf>,
    /// JSON object mapping ontology namespace to dictionary file name
    #[arg(long, global = true, value_name = "PATH")]
    ontology_lookup: Option<PathBuf>,
    /// Read annotation files from <project root>/test/test_data
    #[arg(long, global = true)]
    debug: bool,
    /// Where summary.json and term_checks.tsv are written
    #[arg(long, global = true, default_value = "merge_report")]
    report_dir: PathBuf,
    /// Timestamp recorded on the ontology event (default: current UTC, RFC 3339)
    #[arg(long, global = true)]
    timestamp: Option<String>,
}

#[derive(Args)]
struct SingleArgs {
    /// Genome JSON (bare genome or genome-API envelope)
    #[arg(long, value_name = "PATH")]
    genome: PathBuf,
    /// Annotation file name inside the staging dir
    #[arg(long)]
    annotation_file: String,
    /// Ontology namespace, e.g. GO, META, EC
    #[arg(long)]
    ontology: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Merged genome output path
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

#[derive(Args)]
struct BulkArgs {
    #[arg(long, value_name = "PATH")]
    genome: PathBuf,
    #[arg(long)]
    annotation_file: String,
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

fn build_config(common: &CommonArgs) -> Result<MergeConfig> {
    let mut config = MergeConfig::from_env();
    if let Some(dir) = &common.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &common.staging_dir {
        config.staging_dir = dir.clone();
    }
    if let Some(path) = &common.ontology_lookup {
        config.load_ontology_lookup(path)?;
    }
    config.debug = common.debug;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli.common)?;
    let timestamp = cli
        .common
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    info!("Starting annotation merge");

    let mode = match cli.command {
        Commands::Single(_) => RunMode::Single,
        Commands::Bulk(_) => RunMode::Bulk,
    };
    let outcomes = match cli.command {
        Commands::Single(args) => {
            let run = SingleRun {
                genome: args.genome,
                annotation_file: args.annotation_file,
                ontology: args.ontology,
                description: args.description,
                output_genome: args.output,
                timestamp,
            };
            run_single(&config, &run).map(|outcome| vec![outcome])
        }
        Commands::Bulk(args) => {
            let run = BulkRun {
                genome: args.genome,
                annotation_file: args.annotation_file,
                output_genome: args.output,
                timestamp,
            };
            run_bulk(&config, &run)
        }
    };

    let outcomes = match outcomes {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("Merge failed: {:#}", e);
            return Err(e);
        }
    };

    write_reports(&outcomes, mode, &cli.common.report_dir)?;
    info!("Merged {} ontology event(s)", outcomes.len());
    Ok(())
}
