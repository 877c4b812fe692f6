// ============================================================
// Layer 4 — Vectorizer
// ============================================================
// Turns variable-length examples into fixed-shape padded
// integer arrays, using the vocabulary's derived limits:
//
//   profile  → one code                      (scalar)
//   story    → [memory_size][sentence_size]  (most recent first-in)
//   query    → [sentence_size]
//   answer   → one candidate index           (scalar)
//
// Sentences shorter than sentence_size are zero-padded on the
// right; stories shorter than memory_size are padded with empty
// sentences; a story longer than memory_size keeps its most
// recent sentences. Tokens outside the vocabulary map to the
// nil index 0 — with the vocabulary built over all splits this
// only happens for foreign evaluation directories, where nil is
// the out-of-vocabulary convention.

use crate::data::profiles::ProfileMapping;
use crate::data::vocab::Vocabulary;
use crate::domain::candidates::CandidateSet;
use crate::domain::dialog::DialogExample;

/// One vectorized example, ready for batching.
#[derive(Debug, Clone)]
pub struct DialogSample {
    pub profile: usize,
    pub story: Vec<Vec<usize>>,
    pub query: Vec<usize>,
    pub answer: usize,
}

pub struct Vectorizer<'a> {
    vocab: &'a Vocabulary,
    profiles: &'a ProfileMapping,
}

impl<'a> Vectorizer<'a> {
    pub fn new(vocab: &'a Vocabulary, profiles: &'a ProfileMapping) -> Self {
        Self { vocab, profiles }
    }

    /// Vectorize a list of examples. Output is aligned with the
    /// input: one sample per example, in order.
    pub fn vectorize(&self, examples: &[DialogExample]) -> Vec<DialogSample> {
        let mut unknown_tokens = 0usize;
        let mut unknown_profiles = 0usize;

        let samples = examples
            .iter()
            .map(|ex| self.vectorize_one(ex, &mut unknown_tokens, &mut unknown_profiles))
            .collect();

        if unknown_tokens > 0 {
            tracing::debug!("{} out-of-vocabulary tokens mapped to nil", unknown_tokens);
        }
        if unknown_profiles > 0 {
            tracing::warn!("{} examples carry an unseen profile, coded as 0", unknown_profiles);
        }

        samples
    }

    fn vectorize_one(
        &self,
        ex: &DialogExample,
        unknown_tokens: &mut usize,
        unknown_profiles: &mut usize,
    ) -> DialogSample {
        let memory_size = self.vocab.memory_size;

        // Keep the most recent sentences when the story overflows
        let skip = ex.story.len().saturating_sub(memory_size);
        let mut story: Vec<Vec<usize>> = ex.story[skip..]
            .iter()
            .map(|s| self.sentence(s, self.vocab.sentence_size, unknown_tokens))
            .collect();
        while story.len() < memory_size {
            story.push(vec![0; self.vocab.sentence_size]);
        }

        let profile = match self.profiles.code(&ex.profile) {
            Some(code) => code,
            None => {
                *unknown_profiles += 1;
                0
            }
        };

        DialogSample {
            profile,
            story,
            query: self.sentence(&ex.query, self.vocab.sentence_size, unknown_tokens),
            answer: ex.answer,
        }
    }

    /// One token sequence → fixed-length index row
    fn sentence(&self, tokens: &[String], size: usize, unknown: &mut usize) -> Vec<usize> {
        index_sentence(self.vocab, tokens, size, unknown)
    }
}

fn index_sentence(
    vocab: &Vocabulary,
    tokens: &[String],
    size: usize,
    unknown: &mut usize,
) -> Vec<usize> {
    let mut row: Vec<usize> = tokens
        .iter()
        .take(size)
        .map(|t| match vocab.token_index(t) {
            Some(idx) => idx,
            None => {
                *unknown += 1;
                0
            }
        })
        .collect();
    row.resize(size, 0);
    row
}

/// Vectorize the candidate set once, to candidate_sentence_size
/// rows; the result feeds the model's candidate embedding.
pub fn vectorize_candidates(candidates: &CandidateSet, vocab: &Vocabulary) -> Vec<Vec<usize>> {
    let mut unknown = 0usize;
    let rows = candidates
        .token_rows()
        .iter()
        .map(|row| index_sentence(vocab, row, vocab.candidate_sentence_size, &mut unknown))
        .collect();
    if unknown > 0 {
        tracing::debug!("{} candidate tokens were out of vocabulary", unknown);
    }
    rows
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn example(story: &[&[&str]], query: &[&str], answer: usize) -> DialogExample {
        DialogExample {
            profile: vec!["male".into(), "young".into()],
            story: story
                .iter()
                .map(|s| s.iter().map(|t| t.to_string()).collect())
                .collect(),
            query: query.iter().map(|t| t.to_string()).collect(),
            answer,
        }
    }

    fn fixture() -> (Vec<DialogExample>, CandidateSet) {
        let data = vec![
            example(&[&["hi", "$u", "#1"], &["hello", "$r", "#1"]], &["book", "a", "table"], 1),
            example(&[], &["hi"], 0),
        ];
        let candidates = CandidateSet::new(vec!["hello".to_string(), "i'm on it".to_string()]);
        (data, candidates)
    }

    #[test]
    fn test_output_is_aligned_and_shaped() {
        let (data, candidates) = fixture();
        let vocab = Vocabulary::build(&data, &candidates, 250);
        let profiles = ProfileMapping::build(&data);
        let samples = Vectorizer::new(&vocab, &profiles).vectorize(&data);

        assert_eq!(samples.len(), data.len());
        for sample in &samples {
            assert_eq!(sample.story.len(), vocab.memory_size);
            for sentence in &sample.story {
                assert_eq!(sentence.len(), vocab.sentence_size);
            }
            assert_eq!(sample.query.len(), vocab.sentence_size);
        }
        assert_eq!(samples[0].answer, 1);
        assert_eq!(samples[1].answer, 0);
    }

    #[test]
    fn test_padding_is_zero() {
        let (data, candidates) = fixture();
        let vocab = Vocabulary::build(&data, &candidates, 250);
        let profiles = ProfileMapping::build(&data);
        let samples = Vectorizer::new(&vocab, &profiles).vectorize(&data);

        // query "hi" is shorter than sentence_size: padded with 0
        let query = &samples[1].query;
        assert!(query[0] > 0);
        assert!(query[1..].iter().all(|&idx| idx == 0));

        // the empty story of the second example is all-nil rows
        for sentence in &samples[1].story {
            assert!(sentence.iter().all(|&idx| idx == 0));
        }
    }

    #[test]
    fn test_long_story_keeps_most_recent_sentences() {
        let sentences: Vec<Vec<String>> = (0..6).map(|i| vec![format!("w{i}")]).collect();
        let data = vec![DialogExample {
            profile: vec!["male".into(), "young".into()],
            story: sentences,
            query: vec!["w5".into()],
            answer: 0,
        }];
        let candidates = CandidateSet::new(vec!["w0".to_string()]);
        // cap memory at 2: only w4 and w5 survive
        let vocab = Vocabulary::build(&data, &candidates, 2);
        let profiles = ProfileMapping::build(&data);
        let samples = Vectorizer::new(&vocab, &profiles).vectorize(&data);

        let story = &samples[0].story;
        assert_eq!(story.len(), 2);
        assert_eq!(story[0][0], vocab.token_index("w4").unwrap());
        assert_eq!(story[1][0], vocab.token_index("w5").unwrap());
    }

    #[test]
    fn test_unknown_tokens_map_to_nil() {
        let (data, candidates) = fixture();
        let vocab = Vocabulary::build(&data, &candidates, 250);
        let profiles = ProfileMapping::build(&data);

        let foreign = vec![example(&[], &["completely_unseen_token"], 0)];
        let samples = Vectorizer::new(&vocab, &profiles).vectorize(&foreign);
        assert_eq!(samples[0].query[0], 0);
    }

    #[test]
    fn test_candidate_rows_are_uniform() {
        let (data, candidates) = fixture();
        let vocab = Vocabulary::build(&data, &candidates, 250);
        let rows = vectorize_candidates(&candidates, &vocab);

        assert_eq!(rows.len(), candidates.len());
        for row in &rows {
            assert_eq!(row.len(), vocab.candidate_sentence_size);
        }
        // "hello" pads out to the longest candidate's length
        assert!(rows[0][0] > 0);
        assert!(rows[0][1..].iter().all(|&idx| idx == 0));
    }
}
