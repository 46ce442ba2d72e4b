// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `cross-validate <DATASET>` — K-fold train/eval, prints the
//      per-epoch progress and the best-epoch summary
//   2. `embed <DATASET>`          — writes graph embeddings as JSON
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, CrossValidateArgs, EmbedArgs};

use crate::application::cross_validation_use_case::ExperimentConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gin-bench",
    version = "0.1.0",
    about = "GIN graph classification with K-fold cross-validation and embedding extraction."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. This layer only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::CrossValidate(args) => run_cross_validate(args),
            Commands::Embed(args)         => run_embed(args),
        }
    }
}

fn run_cross_validate(args: CrossValidateArgs) -> Result<()> {
    use crate::application::cross_validation_use_case::CrossValidationUseCase;

    let config: ExperimentConfig = args.into();
    let wait = config.wait_for_input;
    tracing::info!("Cross-validating on dataset: {}", config.dataset);

    let report = CrossValidationUseCase::new(config).execute()?;
    tracing::debug!(
        "Mean test accuracy per epoch over {} graphs: {:?}",
        report.info.num_graphs,
        report.table.epoch_means()
    );
    println!("{}", report.summary_line());

    // hold the terminal open until the operator presses Enter
    if wait {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
    }
    Ok(())
}

fn run_embed(args: EmbedArgs) -> Result<()> {
    use crate::application::embed_use_case::EmbedUseCase;

    let output = args.output.clone();
    let config: ExperimentConfig = args.into();
    tracing::info!("Extracting embeddings for dataset: {}", config.dataset);

    EmbedUseCase::new(config, output).execute()?;
    Ok(())
}
