// ============================================================
// Layer 4 — Transcript Loader
// ============================================================
// Loads the personalized dialog corpus from a data directory.
//
// A data directory holds one candidates file plus task-numbered
// transcript files:
//
//   personalized-dialog-candidates.txt
//   personalized-dialog-task5-full-dialogs-trn.txt
//   personalized-dialog-task5-full-dialogs-dev.txt
//   personalized-dialog-task5-full-dialogs-tst.txt
//   personalized-dialog-task5-full-dialogs-tst-OOV.txt
//
// Files are matched by substring ("candidates", "task5" + one
// of trn/dev/tst), not by exact name, so sibling corpora with
// different prefixes load the same way.
//
// Transcript format, one dialog per blank-line-separated block:
//
//   1 female middle-aged          ← profile line (no tab)
//   2 hi\thello what can i help you with today
//   3 may i have a table\ti'm on it
//
// Every tab-separated line yields one example: the user side is
// the query, the bot side is looked up in the candidate set to
// become the answer index, and all preceding turns form the
// story. Lines without a tab after the first are knowledge-base
// facts and go straight into the story.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::domain::candidates::CandidateSet;
use crate::domain::dialog::DialogExample;

/// The three splits of one task, parsed into examples.
#[derive(Debug, Clone)]
pub struct DialogSplits {
    pub train: Vec<DialogExample>,
    pub val: Vec<DialogExample>,
    pub test: Vec<DialogExample>,
}

impl DialogSplits {
    /// All examples of all splits, train first — the vocabulary
    /// is built over this union.
    pub fn all(&self) -> impl Iterator<Item = &DialogExample> {
        self.train.iter().chain(self.val.iter()).chain(self.test.iter())
    }
}

/// Loads candidates and task transcripts from one data directory.
pub struct TranscriptLoader {
    dir: PathBuf,
    task_id: usize,
}

impl TranscriptLoader {
    pub fn new(dir: impl Into<PathBuf>, task_id: usize) -> Self {
        Self { dir: dir.into(), task_id }
    }

    /// Parse the candidates file into an ordered candidate set.
    /// Lines are "<id> <utterance>"; the id is positional noise
    /// and the line order defines the index space.
    pub fn load_candidates(&self) -> Result<CandidateSet> {
        let path = self.find_file("candidates", |name| name.contains("candidates"))?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("cannot read candidates file '{}'", path.display()))?;

        let mut utterances = Vec::new();
        let mut seen = HashSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let utterance = match line.split_once(' ') {
                Some((_id, rest)) => rest.trim().to_string(),
                None => line.to_string(),
            };
            // The file may repeat a candidate across tasks; the first
            // occurrence keeps its index.
            if seen.insert(utterance.clone()) {
                utterances.push(utterance);
            }
        }

        if utterances.is_empty() {
            bail!("candidates file '{}' contains no candidates", path.display());
        }

        tracing::info!("Candidate size: {}", utterances.len());
        Ok(CandidateSet::new(utterances))
    }

    /// Load the trn/dev/tst transcripts of this task. With `oov`
    /// set, the test split comes from the OOV test file instead.
    pub fn load_splits(&self, candidates: &CandidateSet, oov: bool) -> Result<DialogSplits> {
        let task = format!("task{}", self.task_id);

        let train_path = self.find_file("trn", |n| n.contains(&task) && n.contains("trn"))?;
        let val_path = self.find_file("dev", |n| n.contains(&task) && n.contains("dev"))?;
        let test_path = self.find_file(if oov { "tst-OOV" } else { "tst" }, |n| {
            n.contains(&task) && n.contains("tst") && (n.contains("OOV") == oov)
        })?;

        let train = parse_transcript(&train_path, candidates)?;
        let val = parse_transcript(&val_path, candidates)?;
        let test = parse_transcript(&test_path, candidates)?;

        tracing::info!(
            "Loaded task {}: {} train, {} val, {} test examples (oov={})",
            self.task_id,
            train.len(),
            val.len(),
            test.len(),
            oov,
        );

        Ok(DialogSplits { train, val, test })
    }

    /// First directory entry whose file name matches `pred`,
    /// in sorted order so ties resolve deterministically.
    fn find_file(&self, what: &str, pred: impl Fn(&str) -> bool) -> Result<PathBuf> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("cannot read data directory '{}'", self.dir.display()))?;

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(&pred)
                    .unwrap_or(false)
            })
            .collect();
        matches.sort();

        match matches.into_iter().next() {
            Some(path) => Ok(path),
            None => bail!("no '{}' file in '{}'", what, self.dir.display()),
        }
    }
}

/// Split a raw utterance into lowercase tokens.
/// Edge punctuation is stripped; inner characters like '_' and
/// '-' stay, since corpus entities look like "resto_paris_cheap"
/// and profile attributes like "middle-aged".
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, '.' | ',' | '?' | '!' | ';' | ':')))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Parse one transcript file into examples.
pub fn parse_transcript(path: &Path, candidates: &CandidateSet) -> Result<Vec<DialogExample>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read transcript '{}'", path.display()))?;

    let mut examples = Vec::new();

    let mut profile: Vec<String> = Vec::new();
    let mut story: Vec<Vec<String>> = Vec::new();
    let mut turn = 0usize;
    let mut in_dialog = false;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            // Blank line ends the current dialog
            profile.clear();
            story.clear();
            turn = 0;
            in_dialog = false;
            continue;
        }

        // Strip the leading line number
        let rest = match line.split_once(' ') {
            Some((_nid, rest)) => rest,
            None => line,
        };

        if !in_dialog {
            // First line of a dialog is the profile line
            profile = tokenize(rest);
            in_dialog = true;
            continue;
        }

        turn += 1;

        match rest.split_once('\t') {
            Some((user, bot)) => {
                let bot = bot.trim();
                let query = tokenize(user);
                let answer = candidates.index_of(bot).with_context(|| {
                    format!(
                        "bot utterance at {}:{} is not in the candidate set: '{}'",
                        path.display(),
                        line_no + 1,
                        bot,
                    )
                })?;

                examples.push(DialogExample {
                    profile: profile.clone(),
                    story: story.clone(),
                    query: query.clone(),
                    answer,
                });

                // Both turns join the memory, tagged with speaker and turn
                story.push(tag_turn(query, "$u", turn));
                story.push(tag_turn(tokenize(bot), "$r", turn));
            }
            None => {
                // Knowledge-base fact emitted by the backend mid-dialog
                story.push(tag_turn(tokenize(rest), "$r", turn));
            }
        }
    }

    Ok(examples)
}

/// Append the speaker and turn markers a memory sentence carries.
pub fn tag_turn(mut tokens: Vec<String>, speaker: &str, turn: usize) -> Vec<String> {
    tokens.push(speaker.to_string());
    tokens.push(format!("#{turn}"));
    tokens
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRANSCRIPT: &str = "\
1 female middle-aged
2 hi\thello what can i help you with today
3 may i have a table\ti'm on it

1 male young
2 resto_paris_cheap r_phone resto_paris_phone
3 hello\thello what can i help you with today
";

    fn candidate_fixture() -> CandidateSet {
        CandidateSet::new(vec![
            "hello what can i help you with today".to_string(),
            "i'm on it".to_string(),
        ])
    }

    fn write_tmp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_tokenize_strips_edge_punctuation() {
        assert_eq!(tokenize("Hello, there!"), vec!["hello", "there"]);
        assert_eq!(tokenize("resto_paris_cheap"), vec!["resto_paris_cheap"]);
        assert_eq!(tokenize("middle-aged"), vec!["middle-aged"]);
    }

    #[test]
    fn test_parse_extracts_profile_story_query_answer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "task1-trn.txt", TRANSCRIPT);
        let examples = parse_transcript(&path, &candidate_fixture()).unwrap();

        assert_eq!(examples.len(), 3);

        // First turn of the first dialog: empty story, profile attached
        assert_eq!(examples[0].profile, vec!["female", "middle-aged"]);
        assert!(examples[0].story.is_empty());
        assert_eq!(examples[0].query, vec!["hi"]);
        assert_eq!(examples[0].answer, 0);

        // Second turn: story holds both sides of turn 1, tagged
        assert_eq!(examples[1].answer, 1);
        assert_eq!(examples[1].story.len(), 2);
        assert_eq!(examples[1].story[0], vec!["hi", "$u", "#1"]);
        assert_eq!(
            examples[1].story[1],
            vec!["hello", "what", "can", "i", "help", "you", "with", "today", "$r", "#1"]
        );
    }

    #[test]
    fn test_parse_keeps_kb_facts_in_story() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "task1-trn.txt", TRANSCRIPT);
        let examples = parse_transcript(&path, &candidate_fixture()).unwrap();

        // Third example comes from the second dialog, whose first
        // turn is a KB fact that must sit in the story already.
        let ex = &examples[2];
        assert_eq!(ex.profile, vec!["male", "young"]);
        assert_eq!(ex.story.len(), 1);
        assert_eq!(
            ex.story[0],
            vec!["resto_paris_cheap", "r_phone", "resto_paris_phone", "$r", "#1"]
        );
        assert_eq!(ex.query, vec!["hello"]);
    }

    #[test]
    fn test_parse_rejects_unknown_bot_utterance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "task1-trn.txt", "1 male young\n2 hi\tnot a candidate\n");
        let err = parse_transcript(&path, &candidate_fixture()).unwrap_err();
        assert!(err.to_string().contains("not in the candidate set"));
    }

    #[test]
    fn test_oov_selects_the_oov_test_file() {
        let dir = tempfile::tempdir().unwrap();
        write_tmp(&dir, "dialog-candidates.txt", "1 i'm on it\n");
        write_tmp(&dir, "dialog-task1-trn.txt", "1 male young\n2 hi\ti'm on it\n");
        write_tmp(&dir, "dialog-task1-dev.txt", "1 male young\n2 hi\ti'm on it\n");
        write_tmp(&dir, "dialog-task1-tst.txt", "1 male young\n2 hi\ti'm on it\n");
        write_tmp(
            &dir,
            "dialog-task1-tst-OOV.txt",
            "1 male young\n2 hi\ti'm on it\n3 hi again\ti'm on it\n",
        );

        let loader = TranscriptLoader::new(dir.path(), 1);
        let candidates = loader.load_candidates().unwrap();

        let plain = loader.load_splits(&candidates, false).unwrap();
        let oov = loader.load_splits(&candidates, true).unwrap();
        assert_eq!(plain.test.len(), 1);
        assert_eq!(oov.test.len(), 2);
    }

    #[test]
    fn test_missing_task_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_tmp(&dir, "dialog-candidates.txt", "1 i'm on it\n");
        let loader = TranscriptLoader::new(dir.path(), 3);
        let candidates = loader.load_candidates().unwrap();
        assert!(loader.load_splits(&candidates, false).is_err());
    }
}
