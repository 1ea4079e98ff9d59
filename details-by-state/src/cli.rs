//! Exécution de la préparation depuis la ligne de commande

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use details_by_state::{Config, Overrides, RunReport, Settings};

/// Arguments de la commande (tous optionnels)
#[derive(Debug, clap::Args)]
pub struct PrepareArgs {
    /// Directory holding the six input files (default: env COUNTYDATA_DIR / Data)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Output JSON file (default: env COUNTYDATA_OUTPUT / details_by_state.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON config file (per-file paths, encodings)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Keep matched sites that have empty cells
    #[arg(long)]
    pub keep_incomplete_sites: bool,
}

/// Résout la configuration, prépare l'agrégat et l'écrit
pub fn cmd_prepare(args: PrepareArgs) -> Result<RunReport> {
    let start = Instant::now();

    let config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    let settings = Settings::resolve(
        &config,
        Overrides {
            data_dir: args.data_dir,
            output: args.output,
            keep_incomplete_sites: args.keep_incomplete_sites,
        },
    )?;

    info!(
        states = %settings.inputs.states.display(),
        boundaries = %settings.inputs.boundaries.display(),
        output = %settings.output.display(),
        policy = ?settings.options.site_policy,
        "Starting preparation"
    );

    let result = countydata::prepare(&settings.inputs, &settings.options)
        .context("Failed to prepare county and site data")?;

    for diagnostic in result.diagnostics.iter().take(5) {
        warn!("{}", diagnostic);
    }

    countydata::write_aggregate(&result.aggregate, &settings.output)
        .context("Failed to write output")?;

    let mut report = RunReport::new(&settings.output, &result);
    report.record_checksum(&settings.output)?;
    report.set_duration(start.elapsed());

    if let Some(ref path) = args.report {
        save_report(&report, path)?;
    }

    Ok(report)
}

fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    report.save_to_file(path)?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}
