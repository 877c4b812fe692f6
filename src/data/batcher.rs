// ============================================================
// Layer 4 — Dialog Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<DialogSample>
// into tensors.
//
//   Input:  N samples, stories [memory][sentence], queries [sentence]
//   Output: DialogBatch with
//             profiles  [N]
//             stories   [N, memory, sentence]
//             queries   [N, sentence]
//             answers   [N]
//
// All rows are already padded to uniform shape by the
// vectorizer, so batching is flatten-then-reshape.
//
// Batch membership is decided by the training loop (contiguous
// slices of the vectorized set), not by a DataLoader — the
// batcher only does the tensor conversion.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::vectorizer::DialogSample;

/// A batch of dialog samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct DialogBatch<B: Backend> {
    /// Profile codes — shape: [batch_size]
    pub profiles: Tensor<B, 1, Int>,

    /// Story token indices — shape: [batch_size, memory_size, sentence_size]
    pub stories: Tensor<B, 3, Int>,

    /// Query token indices — shape: [batch_size, sentence_size]
    pub queries: Tensor<B, 2, Int>,

    /// Answer candidate indices — shape: [batch_size]
    pub answers: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct DialogBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DialogBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DialogSample, DialogBatch<B>> for DialogBatcher<B> {
    fn batch(&self, items: Vec<DialogSample>) -> DialogBatch<B> {
        let batch_size = items.len();
        // All samples share the vectorizer's fixed shape
        let memory_size = items[0].story.len();
        let sentence_size = items[0].query.len();

        let story_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.story.iter().flatten().map(|&idx| idx as i32))
            .collect();

        let query_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.query.iter().map(|&idx| idx as i32))
            .collect();

        let profiles: Vec<i32> = items.iter().map(|s| s.profile as i32).collect();
        let answers: Vec<i32> = items.iter().map(|s| s.answer as i32).collect();

        let stories = Tensor::<B, 1, Int>::from_ints(story_flat.as_slice(), &self.device)
            .reshape([batch_size, memory_size, sentence_size]);

        let queries = Tensor::<B, 1, Int>::from_ints(query_flat.as_slice(), &self.device)
            .reshape([batch_size, sentence_size]);

        let profiles = Tensor::<B, 1, Int>::from_ints(profiles.as_slice(), &self.device);
        let answers = Tensor::<B, 1, Int>::from_ints(answers.as_slice(), &self.device);

        DialogBatch { profiles, stories, queries, answers }
    }
}

/// Candidate rows → one [n_candidates, candidate_sentence_size]
/// tensor, built once and shared across every forward pass.
pub fn candidates_tensor<B: Backend>(rows: &[Vec<usize>], device: &B::Device) -> Tensor<B, 2, Int> {
    let n = rows.len();
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let flat: Vec<i32> = rows.iter().flatten().map(|&idx| idx as i32).collect();
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([n, width])
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn sample(profile: usize, answer: usize) -> DialogSample {
        DialogSample {
            profile,
            story: vec![vec![1, 2, 0], vec![3, 0, 0]],
            query: vec![4, 5, 0],
            answer,
        }
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = DialogBatcher::<TestBackend>::new(device);
        let batch = batcher.batch(vec![sample(0, 1), sample(1, 0), sample(0, 1)]);

        assert_eq!(batch.stories.dims(), [3, 2, 3]);
        assert_eq!(batch.queries.dims(), [3, 3]);
        assert_eq!(batch.profiles.dims(), [3]);
        assert_eq!(batch.answers.dims(), [3]);
    }

    #[test]
    fn test_batch_preserves_values() {
        let device = Default::default();
        let batcher = DialogBatcher::<TestBackend>::new(device);
        let batch = batcher.batch(vec![sample(2, 1)]);

        let answers: Vec<i64> = batch.answers.into_data().to_vec().unwrap();
        assert_eq!(answers, vec![1]);
        let profiles: Vec<i64> = batch.profiles.into_data().to_vec().unwrap();
        assert_eq!(profiles, vec![2]);
    }

    #[test]
    fn test_candidates_tensor_shape() {
        let device = Default::default();
        let rows = vec![vec![1, 0], vec![2, 3], vec![4, 0]];
        let tensor = candidates_tensor::<TestBackend>(&rows, &device);
        assert_eq!(tensor.dims(), [3, 2]);
    }
}
