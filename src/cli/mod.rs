// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `train`      — train a model on a dialog corpus
//   2. `evaluate`   — score a checkpoint against a test split
//   3. `chat`       — talk to a restored model interactively
//   4. `experiment` — run a named restore-or-train experiment

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ChatArgs, Commands, EvalArgs, ExperimentArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "memnet-dialog",
    version = "0.1.0",
    about = "Train and evaluate a profile-conditioned memory network for retrieval dialog."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use
    /// case. This layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
            Commands::Chat(args) => Self::run_chat(args),
            Commands::Experiment(args) => Self::run_experiment(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Started task: {}", args.task_id);

        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    fn run_evaluate(args: EvalArgs) -> Result<()> {
        use crate::application::eval_use_case::EvalUseCase;

        let use_case = EvalUseCase::new(args.model_dir, args.data_dir, args.task_id, args.oov)?;
        use_case.execute()
    }

    fn run_chat(args: ChatArgs) -> Result<()> {
        use crate::application::chat_use_case::ChatUseCase;

        let use_case = ChatUseCase::new(args.model_dir, args.data_dir, args.profile)?;
        use_case.execute()
    }

    fn run_experiment(args: ExperimentArgs) -> Result<()> {
        use crate::application::experiment::run_named_experiment;
        use crate::application::train_use_case::TrainConfig;

        tracing::info!("Running experiment '{}'", args.name);
        run_named_experiment(&args.name, &TrainConfig::default())?;
        Ok(())
    }
}
