// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags. clap's derive
// macros generate help text, error messages and the string →
// number conversions.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the dialog model on a transcript corpus
    Train(TrainArgs),

    /// Score a trained checkpoint against a test split
    Evaluate(EvalArgs),

    /// Talk to a trained model interactively
    Chat(ChatArgs),

    /// Run a named restore-or-train experiment
    Experiment(ExperimentArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the transcripts and candidates file
    #[arg(long, default_value = "data/personalized-dialog-dataset/full")]
    pub data_dir: String,

    /// Directory for checkpoints, config and artifacts
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Task id, 1 <= id <= 5
    #[arg(long, default_value_t = 1)]
    pub task_id: usize,

    /// Use the out-of-vocabulary test file
    #[arg(long)]
    pub oov: bool,

    /// Learning rate for the Adam optimizer
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Epsilon value for the Adam optimizer
    #[arg(long, default_value_t = 1e-8)]
    pub epsilon: f64,

    /// Clip gradients to this norm
    #[arg(long, default_value_t = 40.0)]
    pub max_grad_norm: f64,

    /// Evaluate and print accuracies every this many epochs
    #[arg(long, default_value_t = 10)]
    pub evaluation_interval: usize,

    /// Batch size for training
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of hops in the memory network
    #[arg(long, default_value_t = 3)]
    pub hops: usize,

    /// Number of epochs to train for
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Embedding size for the embedding matrices
    #[arg(long, default_value_t = 20)]
    pub embedding_size: usize,

    /// Maximum size of the memory
    #[arg(long, default_value_t = 250)]
    pub memory_size: usize,

    /// Weight of the response loss against the profile loss
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,

    /// Seed for the per-epoch batch shuffle
    #[arg(long)]
    pub random_state: Option<u64>,

    /// Save the built vocabulary to this path
    #[arg(long)]
    pub save_vocab: Option<String>,

    /// Load the vocabulary from this path instead of building it
    #[arg(long)]
    pub load_vocab: Option<String>,

    /// Save the built profile mapping to this path
    #[arg(long)]
    pub save_profiles: Option<String>,

    /// Load the profile mapping from this path instead of building it
    #[arg(long)]
    pub load_profiles: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir: a.data_dir,
            model_dir: a.model_dir,
            task_id: a.task_id,
            oov: a.oov,
            learning_rate: a.learning_rate,
            epsilon: a.epsilon,
            max_grad_norm: a.max_grad_norm,
            evaluation_interval: a.evaluation_interval,
            batch_size: a.batch_size,
            hops: a.hops,
            epochs: a.epochs,
            embedding_size: a.embedding_size,
            memory_size: a.memory_size,
            alpha: a.alpha,
            random_state: a.random_state,
            save_vocab: a.save_vocab,
            load_vocab: a.load_vocab,
            save_profiles: a.save_profiles,
            load_profiles: a.load_profiles,
        }
    }
}

/// All arguments for the `evaluate` command. Hyperparameters
/// come from the train_config.json next to the checkpoint.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Directory where the checkpoint and artifacts were saved
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Test data directory; defaults to the training data_dir
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Task id override
    #[arg(long)]
    pub task_id: Option<usize>,

    /// Score the out-of-vocabulary test file
    #[arg(long)]
    pub oov: bool,
}

/// All arguments for the `chat` command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Directory where the checkpoint and artifacts were saved
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Data directory for the candidate set; defaults to the
    /// training data_dir
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Profile line to chat as, e.g. "female middle-aged"
    #[arg(long, default_value = "female middle-aged")]
    pub profile: String,
}

/// All arguments for the `experiment` command.
#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// Which experiment to run: smoke, full-profile, split-by-profile
    #[arg(long)]
    pub name: String,
}
