// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// The token vocabulary plus every size limit derived from the
// corpus. Built once over the union of all splits and the
// candidate set, then reused unchanged for vectorizing train,
// validation and test data.
//
// Index 0 is reserved as the nil/padding word, so token indices
// are 1-based and vocab_size = distinct tokens + 1.
//
// Determinism matters: the token list is sorted, so building
// twice over the same corpus yields byte-identical mappings,
// and a saved vocabulary reloads to exactly what was built.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::candidates::CandidateSet;
use crate::domain::dialog::DialogExample;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Distinct tokens, sorted
    tokens: Vec<String>,

    /// token → 1-based index; 0 is the nil word
    index: BTreeMap<String, usize>,

    /// Longest sentence over all stories and queries, in tokens
    pub sentence_size: usize,

    /// min(configured cap, longest story in sentences)
    pub memory_size: usize,

    /// Longest candidate utterance, in tokens
    pub candidate_sentence_size: usize,
}

impl Vocabulary {
    /// Build the vocabulary over `data` (typically the union of
    /// train, validation and test) and the candidate set, with
    /// `memory_cap` bounding the memory size.
    pub fn build(data: &[DialogExample], candidates: &CandidateSet, memory_cap: usize) -> Self {
        let mut set: BTreeSet<String> = BTreeSet::new();
        for ex in data {
            for sentence in &ex.story {
                set.extend(sentence.iter().cloned());
            }
            set.extend(ex.query.iter().cloned());
        }
        for row in candidates.token_rows() {
            set.extend(row.iter().cloned());
        }

        let tokens: Vec<String> = set.into_iter().collect();
        let index: BTreeMap<String, usize> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i + 1))
            .collect();

        let max_story_size = data.iter().map(DialogExample::story_len).max().unwrap_or(0);
        let max_sentence = data
            .iter()
            .flat_map(|ex| ex.story.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        let max_query = data.iter().map(|ex| ex.query.len()).max().unwrap_or(0);

        let vocab = Self {
            tokens,
            index,
            sentence_size: max_sentence.max(max_query).max(1),
            memory_size: memory_cap.min(max_story_size).max(1),
            candidate_sentence_size: candidates.longest().max(1),
        };

        tracing::info!(
            "Vocab size: {} | sentence size: {} | memory size: {} | candidate sentence size: {}",
            vocab.vocab_size(),
            vocab.sentence_size,
            vocab.memory_size,
            vocab.candidate_sentence_size,
        );

        vocab
    }

    /// Distinct tokens + 1 for the nil word
    pub fn vocab_size(&self) -> usize {
        self.index.len() + 1
    }

    /// 1-based index of a token; None if the token is unknown
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// The sorted token list
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("cannot write vocabulary to '{}'", path.display()))?;
        tracing::debug!("Saved vocabulary to '{}'", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read vocabulary from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt vocabulary file '{}'", path.display()))
    }
}
