use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
    tensor::backend::AutodiffBackend,
};

#[derive(Config, Debug)]
pub struct MemoryNetConfig {
    pub vocab_size: usize,
    pub embedding_size: usize,
    pub hops: usize,
    pub profile_count: usize,
    /// Weight of the response loss; the profile loss gets 1 - alpha
    #[config(default = 0.5)]
    pub alpha: f64,
}

impl MemoryNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MemoryNet<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device);
        let candidate_embedding =
            EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device);
        // One rotation shared across hops, as in the original
        // memory-network formulation
        let hop_map = LinearConfig::new(self.embedding_size, self.embedding_size)
            .with_bias(false)
            .init(device);
        let profile_head = LinearConfig::new(self.embedding_size, self.profile_count).init(device);
        MemoryNet {
            embedding,
            candidate_embedding,
            hop_map,
            profile_head,
            hops: self.hops,
            embedding_size: self.embedding_size,
            alpha: self.alpha,
        }
    }
}

#[derive(Module, Debug)]
pub struct MemoryNet<B: Backend> {
    /// Shared embedding for story sentences and queries
    embedding: Embedding<B>,

    /// Separate embedding for candidate utterances
    candidate_embedding: Embedding<B>,

    /// Controller update between hops
    hop_map: Linear<B>,

    /// Predicts the profile code from the initial query state
    profile_head: Linear<B>,

    hops: usize,
    embedding_size: usize,
    alpha: f64,
}

pub struct MemoryNetOutput<B: Backend> {
    /// [batch, n_candidates]
    pub response_logits: Tensor<B, 2>,

    /// [batch, profile_count]
    pub profile_logits: Tensor<B, 2>,
}

impl<B: Backend> MemoryNet<B> {
    /// stories: [batch, memory, sentence], queries: [batch, sentence],
    /// candidates: [n_candidates, candidate_sentence]
    pub fn forward(
        &self,
        stories: Tensor<B, 3, Int>,
        queries: Tensor<B, 2, Int>,
        candidates: Tensor<B, 2, Int>,
    ) -> MemoryNetOutput<B> {
        let [batch_size, memory_size, sentence_size] = stories.dims();
        let [n_candidates, _candidate_sentence] = candidates.dims();
        let emb = self.embedding_size;

        // Sentences embed as bags of words: embed every token,
        // sum over the token dimension.
        let query_emb = self
            .embedding
            .forward(queries)
            .sum_dim(1)
            .reshape([batch_size, emb]);

        let memory = self
            .embedding
            .forward(stories.reshape([batch_size, memory_size * sentence_size]))
            .reshape([batch_size, memory_size, sentence_size, emb])
            .sum_dim(2)
            .reshape([batch_size, memory_size, emb]);

        // The profile head reads the pre-hop query state, so the
        // auxiliary task grounds the embedding rather than the
        // hop machinery.
        let initial_state = query_emb.clone();

        let mut state = query_emb;
        for _ in 0..self.hops {
            // attention over memory sentences: [batch, memory]
            let scores = memory
                .clone()
                .matmul(state.clone().reshape([batch_size, emb, 1]))
                .reshape([batch_size, memory_size]);
            let attention = softmax(scores, 1);

            // weighted read: [batch, emb]
            let read = attention
                .reshape([batch_size, 1, memory_size])
                .matmul(memory.clone())
                .reshape([batch_size, emb]);

            state = self.hop_map.forward(state) + read;
        }

        let candidate_emb = self
            .candidate_embedding
            .forward(candidates)
            .sum_dim(1)
            .reshape([n_candidates, emb]);

        let response_logits = state.matmul(candidate_emb.transpose());
        let profile_logits = self.profile_head.forward(initial_state);

        MemoryNetOutput { response_logits, profile_logits }
    }

    /// One supervised step's loss: cross-entropy over candidates
    /// blended with cross-entropy over profile codes.
    pub fn forward_loss(
        &self,
        stories: Tensor<B, 3, Int>,
        queries: Tensor<B, 2, Int>,
        candidates: Tensor<B, 2, Int>,
        answers: Tensor<B, 1, Int>,
        profiles: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, MemoryNetOutput<B>)
    where
        B: AutodiffBackend,
    {
        let output = self.forward(stories, queries, candidates);
        let ce = CrossEntropyLossConfig::new().init(&output.response_logits.device());

        let response_loss = ce.forward(output.response_logits.clone(), answers);
        let profile_loss = ce.forward(output.profile_logits.clone(), profiles);

        // loss = alpha * response + (1 - alpha) * profile
        let loss = response_loss.mul_scalar(self.alpha) + profile_loss.mul_scalar(1.0 - self.alpha);
        (loss, output)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: MemoryNet<TestBackend> =
            MemoryNetConfig::new(20, 8, 2, 3).init(&device);

        let stories = Tensor::<TestBackend, 1, Int>::from_ints(
            [0; 2 * 4 * 5].as_slice(),
            &device,
        )
        .reshape([2, 4, 5]);
        let queries =
            Tensor::<TestBackend, 1, Int>::from_ints([1, 2, 0, 0, 0, 3, 4, 5, 0, 0].as_slice(), &device)
                .reshape([2, 5]);
        let candidates =
            Tensor::<TestBackend, 1, Int>::from_ints([6, 7, 8, 0, 9, 10].as_slice(), &device)
                .reshape([3, 2]);

        let output = model.forward(stories, queries, candidates);
        assert_eq!(output.response_logits.dims(), [2, 3]);
        assert_eq!(output.profile_logits.dims(), [2, 3]);
    }
}
