// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved in the model directory:
//   model_best.mpk.gz   — weights of the best validation epoch
//   best.json           — which epoch and accuracy that was
//   train_config.json   — full run configuration, so a later
//                         process can rebuild the exact model
//                         before loading the weights into it
//
// Only the best model is kept: a save happens when validation
// accuracy STRICTLY exceeds every previous evaluation point,
// so ties never churn the checkpoint.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::MemoryNet;

const WEIGHTS_STEM: &str = "model_best";

/// Decides when a validation accuracy warrants a checkpoint.
///
/// Starts at zero: an accuracy must strictly exceed the best
/// seen so far, so a run that never rises above zero never
/// saves, and repeating the best value does not re-save.
#[derive(Debug, Clone)]
pub struct BestTracker {
    best: f64,
}

impl BestTracker {
    pub fn new() -> Self {
        Self { best: 0.0 }
    }

    /// Record an accuracy; true means "new best, save now".
    pub fn observe(&mut self, accuracy: f64) -> bool {
        if accuracy > self.best {
            self.best = accuracy;
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> f64 {
        self.best
    }
}

impl Default for BestTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata written next to the weights on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestCheckpoint {
    pub epoch: usize,
    pub val_acc: f64,
}

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// True if a weights file is present in the directory.
    pub fn has_checkpoint(&self) -> bool {
        self.dir.join(format!("{WEIGHTS_STEM}.mpk.gz")).exists()
    }

    /// Save model weights plus the best-checkpoint metadata.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &MemoryNet<B>,
        epoch: usize,
        val_acc: f64,
    ) -> Result<()> {
        let path = self.dir.join(WEIGHTS_STEM);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("failed to save checkpoint to '{}'", path.display()))?;

        let meta = BestCheckpoint { epoch, val_acc };
        let meta_path = self.dir.join("best.json");
        fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("failed to write '{}'", meta_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {} (val_acc {:.4})", epoch, val_acc);
        Ok(())
    }

    /// Load the best weights into a freshly built model.
    /// The model must have the architecture the checkpoint was
    /// trained with, or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model: MemoryNet<B>,
        device: &B::Device,
    ) -> Result<MemoryNet<B>> {
        let meta = self.best()?;
        let path = self.dir.join(WEIGHTS_STEM);

        tracing::info!(
            "Loading checkpoint from epoch {} (val_acc {:.4})",
            meta.epoch,
            meta.val_acc,
        );

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "cannot load checkpoint '{}'. Has training saved a model here?",
                    path.display(),
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Best-checkpoint metadata; errors when no save has happened.
    pub fn best(&self) -> Result<BestCheckpoint> {
        let path = self.dir.join("best.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!("no checkpoint metadata at '{}'. Run training first.", path.display())
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the run configuration so a later process can rebuild
    /// the same model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "cannot read config from '{}'. Make sure this directory holds a trained model.",
                path.display(),
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_tracker_saves_only_strict_improvements() {
        let mut tracker = BestTracker::new();
        let accuracies = [0.1, 0.3, 0.2, 0.3, 0.5];
        let saved: Vec<bool> = accuracies.iter().map(|&a| tracker.observe(a)).collect();
        assert_eq!(saved, vec![true, true, false, false, true]);
        assert_eq!(tracker.best(), 0.5);
    }

    #[test]
    fn test_best_tracker_ignores_zero() {
        let mut tracker = BestTracker::new();
        assert!(!tracker.observe(0.0));
        assert!(tracker.observe(0.01));
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());

        let mut cfg = TrainConfig::default();
        cfg.task_id = 5;
        cfg.epochs = 3;
        ckpt.save_config(&cfg).unwrap();

        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.task_id, 5);
        assert_eq!(loaded.epochs, 3);
    }

    #[test]
    fn test_missing_checkpoint_is_descriptive() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert!(!ckpt.has_checkpoint());
        let err = ckpt.best().unwrap_err();
        assert!(err.to_string().contains("no checkpoint metadata"));
    }
}
