// ============================================================
// Layer 2 — Dialog Session
// ============================================================
// A usable model together with everything it is only valid
// alongside: the vocabulary, the profile mapping and the
// candidate set. Two ways to obtain one:
//
//   DialogSession::train    — build artifacts, run the full
//                             training loop, keep the
//                             final-epoch model in memory
//   DialogSession::restore  — rebuild the architecture from
//                             config, reload artifacts and the
//                             best checkpoint; fails if any
//                             piece is missing or mismatched
//
// Artifact resolution: an explicit load path in the config wins
// (and a missing file there is an error); otherwise the model
// directory's canonical files are used when present; otherwise
// the artifact is rebuilt deterministically from the data
// directory.
//
// The session exclusively owns the model; dropping the session
// releases it on every exit path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::module::AutodiffModule;

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::candidates_tensor;
use crate::data::loader::{tokenize, DialogSplits, TranscriptLoader};
use crate::data::profiles::ProfileMapping;
use crate::data::vectorizer::{vectorize_candidates, Vectorizer};
use crate::data::vocab::Vocabulary;
use crate::domain::candidates::CandidateSet;
use crate::domain::dialog::DialogExample;
use crate::infra::artifacts::ArtifactStore;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{evaluate, predict_all};
use crate::ml::model::{MemoryNet, MemoryNetConfig};
use crate::ml::trainer::run_training;
use crate::ml::InferBackend;

type Device = burn::backend::ndarray::NdArrayDevice;

pub struct DialogSession {
    model: MemoryNet<InferBackend>,
    device: Device,
    vocab: Vocabulary,
    profiles: ProfileMapping,
    candidates: CandidateSet,
    candidate_rows: Vec<Vec<usize>>,
    task_id: usize,
    oov: bool,
    batch_size: usize,
}

/// Everything the data layer yields before a model exists.
struct Prepared {
    candidates: CandidateSet,
    splits: DialogSplits,
    vocab: Vocabulary,
    profiles: ProfileMapping,
}

impl DialogSession {
    /// Train a fresh model end to end and wrap the final-epoch
    /// weights. The best-by-validation weights are on disk.
    pub fn train(cfg: &TrainConfig) -> Result<Self> {
        // A training run rebuilds artifacts unless explicitly told
        // to load them; stale files in the model directory do not
        // leak into a fresh run.
        let prepared = prepare(cfg, false)?;

        // Persist artifacts when asked, so a later restore pairs
        // with exactly this code space
        if let Some(path) = &cfg.save_vocab {
            prepared.vocab.save(Path::new(path))?;
        }
        if let Some(path) = &cfg.save_profiles {
            prepared.profiles.save(Path::new(path))?;
        }

        let vectorizer = Vectorizer::new(&prepared.vocab, &prepared.profiles);
        let train_samples = vectorizer.vectorize(&prepared.splits.train);
        let val_samples = vectorizer.vectorize(&prepared.splits.val);
        let candidate_rows = vectorize_candidates(&prepared.candidates, &prepared.vocab);

        let ckpt = CheckpointManager::new(&cfg.model_dir);
        ckpt.save_config(cfg)?;

        let model = run_training(
            cfg,
            &train_samples,
            &val_samples,
            &candidate_rows,
            prepared.vocab.vocab_size(),
            prepared.profiles.len(),
            &ckpt,
        )?;

        Ok(Self {
            model: model.valid(),
            device: Device::default(),
            vocab: prepared.vocab,
            profiles: prepared.profiles,
            candidates: prepared.candidates,
            candidate_rows,
            task_id: cfg.task_id,
            oov: cfg.oov,
            batch_size: cfg.batch_size,
        })
    }

    /// Restore a previously trained session: same artifacts,
    /// best checkpoint. Any missing piece or a shape mismatch
    /// surfaces as an error for the caller to handle.
    pub fn restore(cfg: &TrainConfig) -> Result<Self> {
        let ckpt = CheckpointManager::new(&cfg.model_dir);
        anyhow::ensure!(
            ckpt.has_checkpoint(),
            "'{}' holds no checkpoint to restore",
            cfg.model_dir,
        );

        let prepared = prepare(cfg, true)?;
        let candidate_rows = vectorize_candidates(&prepared.candidates, &prepared.vocab);

        let device = Device::default();
        let model_cfg = MemoryNetConfig::new(
            prepared.vocab.vocab_size(),
            cfg.embedding_size,
            cfg.hops,
            prepared.profiles.len().max(1),
        )
        .with_alpha(cfg.alpha);
        let model = model_cfg.init::<InferBackend>(&device);
        let model = ckpt.load_model(model, &device)?;
        tracing::info!("Restored model from '{}'", cfg.model_dir);

        Ok(Self {
            model,
            device,
            vocab: prepared.vocab,
            profiles: prepared.profiles,
            candidates: prepared.candidates,
            candidate_rows,
            task_id: cfg.task_id,
            oov: cfg.oov,
            batch_size: cfg.batch_size,
        })
    }

    /// Exact-match accuracy over the test split of `test_dir`,
    /// vectorized with this session's vocabulary and profile
    /// mapping — never rebuilt from the foreign directory.
    pub fn test_accuracy(&self, test_dir: &str) -> Result<f64> {
        let loader = TranscriptLoader::new(test_dir, self.task_id);
        let splits = loader.load_splits(&self.candidates, self.oov)?;

        let vectorizer = Vectorizer::new(&self.vocab, &self.profiles);
        let test_samples = vectorizer.vectorize(&splits.test);
        tracing::info!("Testing size: {} ({})", test_samples.len(), test_dir);

        let candidates = candidates_tensor::<InferBackend>(&self.candidate_rows, &self.device);
        Ok(evaluate(&self.model, &test_samples, &candidates, self.batch_size, &self.device))
    }

    /// Predict the bot's reply for one in-progress dialog.
    pub fn predict_reply(
        &self,
        profile: &[String],
        story: &[Vec<String>],
        user_line: &str,
    ) -> Result<String> {
        let example = DialogExample {
            profile: profile.to_vec(),
            story: story.to_vec(),
            query: tokenize(user_line),
            answer: 0,
        };

        let vectorizer = Vectorizer::new(&self.vocab, &self.profiles);
        let samples = vectorizer.vectorize(std::slice::from_ref(&example));
        let candidates = candidates_tensor::<InferBackend>(&self.candidate_rows, &self.device);

        let predictions = predict_all(&self.model, &samples, &candidates, 1, &self.device);
        let idx = predictions
            .first()
            .copied()
            .context("prediction produced no output")?;
        let reply = self
            .candidates
            .utterance(idx)
            .with_context(|| format!("predicted index {idx} is outside the candidate set"))?;
        Ok(reply.to_string())
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }
}

/// Steps 1-4 of the pipeline: load the corpus, resolve the
/// vocabulary and profile mapping. With `prefer_saved`, the
/// model directory's canonical artifact files are picked up
/// when present; otherwise only explicit load paths are
/// honored and everything else is rebuilt from the corpus.
fn prepare(cfg: &TrainConfig, prefer_saved: bool) -> Result<Prepared> {
    let loader = TranscriptLoader::new(&cfg.data_dir, cfg.task_id);
    let candidates = loader.load_candidates()?;
    let splits = loader.load_splits(&candidates, cfg.oov)?;

    let store = ArtifactStore::new(&cfg.model_dir);

    let profiles =
        match resolve_load_path(&cfg.load_profiles, store.profiles_path(), prefer_saved) {
            Some(path) => ProfileMapping::load(&path)?,
            None => ProfileMapping::build(&splits.train),
        };

    let vocab = match resolve_load_path(&cfg.load_vocab, store.vocabulary_path(), prefer_saved) {
        Some(path) => Vocabulary::load(&path)?,
        None => {
            let data: Vec<DialogExample> = splits.all().cloned().collect();
            Vocabulary::build(&data, &candidates, cfg.memory_size)
        }
    };

    Ok(Prepared { candidates, splits, vocab, profiles })
}

/// An explicit path always wins and must exist; the canonical
/// file is considered only when `prefer_saved` is set, and only
/// when it is actually present.
fn resolve_load_path(
    explicit: &Option<String>,
    canonical: PathBuf,
    prefer_saved: bool,
) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(PathBuf::from(path)),
        None if prefer_saved => canonical.exists().then_some(canonical),
        None => None,
    }
}
