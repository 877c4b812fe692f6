use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::loader::tokenize;

/// The ordered, index-addressable set of possible bot utterances.
///
/// Answers are stored as indices into this set, so it must stay
/// fixed for the lifetime of a trained model: a checkpoint is only
/// meaningful together with the candidate set it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSet {
    /// Raw utterance text, in file order
    utterances: Vec<String>,

    /// Tokenised form of every utterance, aligned with `utterances`
    tokens: Vec<Vec<String>>,

    /// Reverse lookup: raw utterance text → index
    index: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new(utterances: Vec<String>) -> Self {
        let tokens = utterances.iter().map(|u| tokenize(u)).collect();
        let index = utterances
            .iter()
            .enumerate()
            .map(|(i, u)| (u.clone(), i))
            .collect();
        Self { utterances, tokens, index }
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Raw text of the candidate at `idx`
    pub fn utterance(&self, idx: usize) -> Option<&str> {
        self.utterances.get(idx).map(String::as_str)
    }

    /// Index of an exact raw utterance, if it is a known candidate
    pub fn index_of(&self, utterance: &str) -> Option<usize> {
        self.index.get(utterance).copied()
    }

    /// Tokenised candidates, aligned with their indices
    pub fn token_rows(&self) -> &[Vec<String>] {
        &self.tokens
    }

    /// Length in tokens of the longest candidate
    pub fn longest(&self) -> usize {
        self.tokens.iter().map(Vec::len).max().unwrap_or(0)
    }
}
