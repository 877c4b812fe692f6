// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Full-dataset prediction in batch_size slices, plus the
// exact-match evaluation built on top of it. Used for the
// periodic train/validation scoring, for test reporting and
// for the interactive mode's single-example prediction.

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use crate::data::batcher::DialogBatcher;
use crate::data::vectorizer::DialogSample;
use crate::infra::metrics::accuracy_score;
use crate::ml::model::MemoryNet;

/// Predict a candidate index for every sample, in order.
pub fn predict_all<B: Backend>(
    model: &MemoryNet<B>,
    samples: &[DialogSample],
    candidates: &Tensor<B, 2, Int>,
    batch_size: usize,
    device: &B::Device,
) -> Vec<usize> {
    let batcher = DialogBatcher::<B>::new(device.clone());
    let mut predictions = Vec::with_capacity(samples.len());

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch = batcher.batch(chunk.to_vec());
        let output = model.forward(batch.stories, batch.queries, candidates.clone());

        // argmax(1) returns shape [batch, 1] — flatten to [batch]
        let indices = output.response_logits.argmax(1).flatten::<1>(0, 1);
        let values: Vec<i64> = indices.into_data().to_vec().unwrap_or_default();
        predictions.extend(values.into_iter().map(|v| v as usize));
    }

    predictions
}

/// Exact-match accuracy of the model over `samples`.
pub fn evaluate<B: Backend>(
    model: &MemoryNet<B>,
    samples: &[DialogSample],
    candidates: &Tensor<B, 2, Int>,
    batch_size: usize,
    device: &B::Device,
) -> f64 {
    let predictions = predict_all(model, samples, candidates, batch_size, device);
    accuracy_score(&predictions, &expected_answers(samples))
}

/// The true candidate indices of a vectorized set, aligned with
/// prediction order.
pub fn expected_answers(samples: &[DialogSample]) -> Vec<usize> {
    samples.iter().map(|s| s.answer).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::MemoryNetConfig;

    type TestBackend = burn::backend::NdArray;

    fn sample(query: Vec<usize>, answer: usize) -> DialogSample {
        DialogSample {
            profile: 0,
            story: vec![vec![0, 0, 0]; 2],
            query,
            answer,
        }
    }

    #[test]
    fn test_predict_all_is_aligned_with_input() {
        let device = Default::default();
        let model = MemoryNetConfig::new(10, 4, 1, 1).init::<TestBackend>(&device);
        let candidates = Tensor::<TestBackend, 1, Int>::from_ints(
            [1, 2, 3, 4, 5, 6].as_slice(),
            &device,
        )
        .reshape([3, 2]);

        let samples = vec![
            sample(vec![1, 2, 0], 0),
            sample(vec![3, 0, 0], 1),
            sample(vec![4, 5, 6], 2),
            sample(vec![7, 8, 0], 0),
            sample(vec![9, 0, 0], 1),
        ];

        // batch_size 2 forces a trailing partial chunk
        let predictions = predict_all(&model, &samples, &candidates, 2, &device);
        assert_eq!(predictions.len(), samples.len());
        assert!(predictions.iter().all(|&p| p < 3));
    }

    #[test]
    fn test_expected_answers_order() {
        let samples = vec![sample(vec![0], 2), sample(vec![0], 0)];
        assert_eq!(expected_answers(&samples), vec![2, 0]);
    }
}
