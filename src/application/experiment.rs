// ============================================================
// Layer 2 — Experiment Runner
// ============================================================
// Restore-or-train, then score every held-out test directory.
//
// An experiment directory bundles everything one run produces:
//
//   experiments/full_profile/
//     model_best.mpk.gz     ← best checkpoint
//     best.json
//     train_config.json
//     vocabulary.json       ← code spaces the checkpoint pairs with
//     profiles.json
//     attributes.json       ← the configuration that trained it
//     metrics.csv
//
// Restore is attempted first with explicit artifact paths; ANY
// failure falls back to training from scratch. The failure
// reason is logged, never inspected, so unrelated errors
// (corrupt artifacts, shape mismatches) also end in a retrain.
//
// Every test directory is vectorized with the experiment's own
// vocabulary and profile mapping, never its own.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::session::DialogSession;
use crate::application::train_use_case::TrainConfig;
use crate::infra::artifacts::ArtifactStore;

/// Run one experiment end to end. Returns the accuracy per test
/// directory, in the order supplied.
pub fn run_experiment(
    experiment_dir: &str,
    test_dirs: &[String],
    base: &TrainConfig,
) -> Result<Vec<(String, f64)>> {
    fs::create_dir_all(experiment_dir)
        .with_context(|| format!("cannot create experiment directory '{experiment_dir}'"))?;

    let store = ArtifactStore::new(experiment_dir);
    let vocab_path = store.vocabulary_path().display().to_string();
    let profiles_path = store.profiles_path().display().to_string();

    let mut cfg = base.clone();
    cfg.model_dir = experiment_dir.to_string();

    // Restore wants the persisted artifacts; a fresh run builds
    // and saves them instead.
    let mut load_cfg = cfg.clone();
    load_cfg.load_vocab = Some(vocab_path.clone());
    load_cfg.load_profiles = Some(profiles_path.clone());

    let mut save_cfg = cfg;
    save_cfg.save_vocab = Some(vocab_path);
    save_cfg.save_profiles = Some(profiles_path);

    let session = match DialogSession::restore(&load_cfg) {
        Ok(session) => {
            tracing::info!("Restored experiment from '{experiment_dir}'");
            session
        }
        Err(err) => {
            tracing::warn!("Did not load, generating: {err:#}");

            // Record what this experiment was trained with
            let attributes = Path::new(experiment_dir).join("attributes.json");
            fs::write(&attributes, serde_json::to_string_pretty(&save_cfg)?)
                .with_context(|| format!("cannot write '{}'", attributes.display()))?;

            DialogSession::train(&save_cfg)?
        }
    };

    let mut report = Vec::with_capacity(test_dirs.len());
    for test_dir in test_dirs {
        let accuracy = session.test_accuracy(test_dir)?;
        println!("Accuracy for {}: {:.5}%", test_dir, accuracy * 100.0);
        report.push((test_dir.clone(), accuracy));
    }

    Ok(report)
    // session drops here, releasing the model on both paths
}

// ─── Named experiment presets ─────────────────────────────────────────────────
// The hardcoded configurations reachable from the CLI selector.

const DATASET_ROOT: &str = "data/personalized-dialog-dataset";

/// Dispatch a named preset. `base` supplies the hyperparameters
/// the preset doesn't pin down.
pub fn run_named_experiment(name: &str, base: &TrainConfig) -> Result<Vec<(String, f64)>> {
    match name {
        // Three epochs on the small corpus against one profile
        // split — a pipeline shakedown, not a result
        "smoke" => {
            let mut cfg = base.clone();
            cfg.data_dir = format!("{DATASET_ROOT}/small");
            cfg.task_id = 5;
            cfg.epochs = 3;
            run_experiment(
                "experiments/smoke",
                &[format!("{DATASET_ROOT}/split-by-profile/female_elderly")],
                &cfg,
            )
        }
        "full-profile" => {
            let mut cfg = base.clone();
            cfg.data_dir = format!("{DATASET_ROOT}/small");
            cfg.task_id = 5;
            cfg.epochs = 200;
            let test_dirs = list_subdirs(&format!("{DATASET_ROOT}/split-by-profile"))?;
            run_experiment("experiments/full_profile", &test_dirs, &cfg)
        }
        "split-by-profile" => {
            let mut cfg = base.clone();
            cfg.data_dir = format!("{DATASET_ROOT}/merged-from-split-by-profile");
            cfg.task_id = 5;
            cfg.epochs = 200;
            let test_dirs = list_subdirs(&format!("{DATASET_ROOT}/split-by-profile"))?;
            run_experiment("experiments/split_by_profile", &test_dirs, &cfg)
        }
        other => anyhow::bail!(
            "unknown experiment '{other}' (known: smoke, full-profile, split-by-profile)"
        ),
    }
}

/// Immediate subdirectories of `root`, sorted for a stable
/// report order.
fn list_subdirs(root: &str) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("cannot read test-split root '{root}'"))?;

    let mut dirs: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .map(|p| p.display().to_string())
        .collect();
    dirs.sort();

    if dirs.is_empty() {
        anyhow::bail!("test-split root '{root}' has no subdirectories");
    }
    Ok(dirs)
}
