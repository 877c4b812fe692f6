// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop over fixed mini-batches with periodic evaluation.
//
// Batching rule: batch membership is fixed once at setup as
// contiguous slices of the vectorized training set, and only the
// ORDER of batches is reshuffled each epoch. A trailing partial
// batch is not formed. Every `evaluation_interval` epochs (and
// on the final epoch) the full train and validation sets are
// predicted and scored; a strictly-better validation accuracy
// saves a checkpoint.
//
// Training runs on Autodiff<NdArray>; evaluation drops to the
// inner backend via model.valid().
//
// Reference: Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::{candidates_tensor, DialogBatcher};
use crate::data::vectorizer::DialogSample;
use crate::infra::checkpoint::{BestTracker, CheckpointManager};
use crate::infra::metrics::{accuracy_score, EpochSummary, MetricsLogger};
use crate::ml::inferencer::{expected_answers, predict_all};
use crate::ml::model::{MemoryNet, MemoryNetConfig};
use crate::ml::{InferBackend, TrainBackend};

/// Train a fresh model on the vectorized splits. Returns the
/// final-epoch model; the best-by-validation weights live in the
/// checkpoint directory.
pub fn run_training(
    cfg: &TrainConfig,
    train: &[DialogSample],
    val: &[DialogSample],
    candidate_rows: &[Vec<usize>],
    vocab_size: usize,
    profile_count: usize,
    ckpt: &CheckpointManager,
) -> Result<MemoryNet<TrainBackend>> {
    let device = burn::backend::ndarray::NdArrayDevice::default();

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = MemoryNetConfig::new(
        vocab_size,
        cfg.embedding_size,
        cfg.hops,
        profile_count.max(1),
    )
    .with_alpha(cfg.alpha);
    let mut model: MemoryNet<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} hops, embedding size {}, {} candidates",
        cfg.hops,
        cfg.embedding_size,
        candidate_rows.len(),
    );

    // ── Adam with norm clipping ───────────────────────────────────────────────
    let optim_cfg = AdamConfig::new()
        .with_epsilon(cfg.epsilon as f32)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.max_grad_norm as f32)));
    let mut optim = optim_cfg.init();

    let train_batcher = DialogBatcher::<TrainBackend>::new(device.clone());
    let candidates = candidates_tensor::<TrainBackend>(candidate_rows, &device);
    let eval_candidates = candidates_tensor::<InferBackend>(candidate_rows, &device);

    let metrics = MetricsLogger::new(&cfg.model_dir)?;
    let mut best = BestTracker::new();

    let mut rng: StdRng = match cfg.random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // ── Fixed contiguous batches ──────────────────────────────────────────────
    let n_train = train.len();
    let batch_size = cfg.batch_size.max(1);
    let mut batches: Vec<(usize, usize)> = (0..n_train.saturating_sub(batch_size))
        .step_by(batch_size)
        .map(|start| (start, start + batch_size))
        .collect();

    let train_answers = expected_answers(train);
    let val_answers = expected_answers(val);
    let eval_every = cfg.evaluation_interval.max(1);

    println!("Training size: {}", n_train);
    println!("Validation size: {}", val.len());
    println!("Number of epochs: {}", cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        batches.shuffle(&mut rng);

        let mut total_cost = 0.0f64;
        for &(start, end) in &batches {
            let batch = train_batcher.batch(train[start..end].to_vec());
            let (loss, _) = model.forward_loss(
                batch.stories,
                batch.queries,
                candidates.clone(),
                batch.answers,
                batch.profiles,
            );
            total_cost += loss.clone().into_scalar().elem::<f64>();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        if epoch % eval_every == 0 || epoch == cfg.epochs {
            // model.valid() → MemoryNet<InferBackend>
            let eval_model = model.valid();

            tracing::debug!("predicting full training set");
            let train_preds =
                predict_all(&eval_model, train, &eval_candidates, batch_size, &device);
            tracing::debug!("predicting full validation set");
            let val_preds = predict_all(&eval_model, val, &eval_candidates, batch_size, &device);

            let train_acc = accuracy_score(&train_preds, &train_answers);
            let val_acc = accuracy_score(&val_preds, &val_answers);

            println!("-----------------------");
            println!("Epoch {}", epoch);
            println!("Total cost: {:.4}", total_cost);
            println!("Training accuracy: {:.4}", train_acc);
            println!("Validation accuracy: {:.4}", val_acc);
            println!("-----------------------");

            metrics.log(&EpochSummary { epoch, total_cost, train_acc, val_acc })?;

            if best.observe(val_acc) {
                ckpt.save_model(&model, epoch, val_acc)?;
                tracing::info!(
                    "New best validation accuracy {:.4} at epoch {}, checkpoint saved",
                    val_acc,
                    epoch,
                );
            }
        }
    }

    Ok(model)
}
