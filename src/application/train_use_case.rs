// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Runs the full training pipeline in order:
//
//   Step 1: Load candidates              (Layer 4 - data)
//   Step 2: Load dialog splits           (Layer 4 - data)
//   Step 3: Build/load profile mapping   (Layer 4 - data)
//   Step 4: Build/load vocabulary        (Layer 4 - data)
//   Step 5: Vectorize train/validation   (Layer 4 - data)
//   Step 6: Save config                  (Layer 6 - infra)
//   Step 7: Run training loop            (Layer 5 - ml)
//
// Steps 1-5 and 7 live in `session::DialogSession::train`; this
// use case owns the configuration surface.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::session::DialogSession;

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a run. Serialisable so it can be saved next to
// the checkpoint and reloaded for evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory with the transcript and candidates files
    pub data_dir: String,

    /// Directory for checkpoint, config and artifacts
    pub model_dir: String,

    /// Which numbered task's transcripts to load
    pub task_id: usize,

    /// Evaluate on the out-of-vocabulary test file
    pub oov: bool,

    pub learning_rate: f64,

    /// Adam epsilon
    pub epsilon: f64,

    /// Gradients are clipped to this norm
    pub max_grad_norm: f64,

    /// Evaluate train/validation accuracy every this many epochs
    pub evaluation_interval: usize,

    pub batch_size: usize,

    /// Number of attention hops over the memory
    pub hops: usize,

    pub epochs: usize,

    pub embedding_size: usize,

    /// Upper bound on memory slots; the corpus may need fewer
    pub memory_size: usize,

    /// Response-loss weight; the profile loss gets 1 - alpha
    pub alpha: f64,

    /// Seed for the batch-order shuffle; None draws from entropy
    pub random_state: Option<u64>,

    /// Write the built vocabulary to this path
    pub save_vocab: Option<String>,

    /// Load the vocabulary from this path instead of building it
    pub load_vocab: Option<String>,

    /// Write the built profile mapping to this path
    pub save_profiles: Option<String>,

    /// Load the profile mapping instead of building it
    pub load_profiles: Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/personalized-dialog-dataset/full".to_string(),
            model_dir: "model".to_string(),
            task_id: 1,
            oov: false,
            learning_rate: 0.001,
            epsilon: 1e-8,
            max_grad_norm: 40.0,
            evaluation_interval: 10,
            batch_size: 32,
            hops: 3,
            epochs: 200,
            embedding_size: 20,
            memory_size: 250,
            alpha: 0.5,
            random_state: None,
            save_vocab: None,
            load_vocab: None,
            save_profiles: None,
            load_profiles: None,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end. The
    /// trained session is dropped here; the best weights and
    /// their paired artifacts are on disk for later use.
    pub fn execute(&self) -> Result<()> {
        let session = DialogSession::train(&self.config)?;
        tracing::info!(
            "Training finished; best checkpoint in '{}' ({} candidates)",
            self.config.model_dir,
            session.candidates().len(),
        );
        Ok(())
    }
}
