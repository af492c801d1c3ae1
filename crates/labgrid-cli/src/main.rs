//! labgrid CLI - laboratory report document generation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use labgrid_engine::{sensitivity, stability, HostSession};
use labgrid_host::{DocumentFile, JsonSession};

#[derive(Parser)]
#[command(name = "labgrid")]
#[command(author, version, about = "Laboratory report template expansion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a stability report template in place
    Stability {
        /// Input document file (JSON)
        input: PathBuf,

        /// Output document file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Condition labels, in row order (repeatable)
        #[arg(short, long = "condition")]
        conditions: Vec<String>,

        /// Sample labels as "name, classification" records (repeatable)
        #[arg(short, long = "sample")]
        samples: Vec<String>,

        /// Number of impurities
        #[arg(short, long, default_value = "1")]
        impurities: u32,

        /// Number of impurity samples
        #[arg(long, default_value = "0")]
        impurity_samples: u32,
    },

    /// Produce a sensitivity results document from a template
    Sensitivity {
        /// Source template file (JSON)
        input: PathBuf,

        /// Number of replicates
        #[arg(short, long, default_value = "6")]
        replicates: u32,

        /// Number of impurities
        #[arg(short, long, default_value = "1")]
        impurities: u32,
    },

    /// Show the regions of a document
    Regions {
        /// Input document file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stability {
            input,
            output,
            conditions,
            samples,
            impurities,
            impurity_samples,
        } => run_stability(
            &input,
            output.as_deref(),
            &samples,
            &conditions,
            impurities,
            impurity_samples,
        ),
        Commands::Sensitivity {
            input,
            replicates,
            impurities,
        } => run_sensitivity(&input, replicates, impurities),
        Commands::Regions { input } => show_regions(&input),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_stability(
    input: &Path,
    output: Option<&Path>,
    samples: &[String],
    conditions: &[String],
    impurities: u32,
    impurity_samples: u32,
) -> Result<()> {
    let mut session = JsonSession::new();
    let mut doc = session
        .open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    stability::update_worksheet(&mut doc, samples, conditions, impurities, impurity_samples)
        .context("Stability update failed")?;

    let target = output.unwrap_or(input);
    session
        .save(&doc, target)
        .with_context(|| format!("Failed to save '{}'", target.display()))?;
    session.close(doc).context("Failed to close document")?;

    eprintln!("Wrote {}", target.display());
    Ok(())
}

fn run_sensitivity(input: &Path, replicates: u32, impurities: u32) -> Result<()> {
    let mut session = JsonSession::new();
    let produced = sensitivity::update_sensitivity_sheet(&mut session, input, replicates, impurities)
        .context("Sensitivity update failed")?;

    // the produced path is the tool's output, on stdout for scripting
    println!("{}", produced.display());
    Ok(())
}

fn show_regions(input: &Path) -> Result<()> {
    let file = DocumentFile::load(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!(
        "{} ({} cells, {})",
        file.name,
        file.cells.len(),
        if file.protected {
            "protected"
        } else {
            "unprotected"
        }
    );
    for region in &file.regions {
        println!(
            "  {:<40} r{} c{} {}x{}",
            region.name, region.row, region.col, region.rows, region.cols
        );
    }
    Ok(())
}
