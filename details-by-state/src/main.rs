//! Point d'entrée CLI pour details-by-state

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::PrepareArgs;

/// Construire details_by_state.json à partir des données comtés, ensoleillement et sites
#[derive(Parser)]
#[command(name = "details-by-state")]
#[command(author, version)]
#[command(about = "Join county boundaries, county statistics and community-solar sites into one JSON lookup keyed by state")]
#[command(long_about = "Reads the six reference datasets (county boundaries, county statistics, sunlight averages, state reference, community-solar sites, city metadata) and writes details_by_state.json.\n\nWith no arguments, inputs are read from ./Data and the output is written to ./details_by_state.json.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    prepare: PrepareArgs,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let report = cli::cmd_prepare(cli.prepare)?;

    info!("{}", report.summary());
    if !quiet {
        report.display();
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
