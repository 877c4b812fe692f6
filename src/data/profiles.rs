// ============================================================
// Layer 4 — Profile Mapping
// ============================================================
// Maps each distinct profile line of the training data to a
// small dense integer code. The code space is what the model's
// profile head predicts over, so the mapping is built exactly
// once per experiment and persisted next to the checkpoint;
// evaluation on held-out profile splits reloads it instead of
// rebuilding.
//
// Codes are assigned in sorted order of the joined attribute
// string, so the mapping is deterministic for a fixed corpus.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::dialog::DialogExample;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMapping {
    codes: BTreeMap<String, usize>,
}

impl ProfileMapping {
    /// Scan training examples and assign one code per distinct
    /// profile line.
    pub fn build(train: &[DialogExample]) -> Self {
        let mut codes = BTreeMap::new();
        for ex in train {
            let key = ex.profile_key();
            if !key.is_empty() {
                codes.insert(key, 0);
            }
        }
        // BTreeMap iterates sorted; renumber in that order
        let keys: Vec<String> = codes.keys().cloned().collect();
        for (i, key) in keys.into_iter().enumerate() {
            codes.insert(key, i);
        }

        let mapping = Self { codes };
        tracing::info!("Profiles: {:?}", mapping.codes);
        mapping
    }

    /// Code of a profile line; None if it never occurred in training
    pub fn code(&self, profile: &[String]) -> Option<usize> {
        self.codes.get(&profile.join(" ")).copied()
    }

    /// Number of distinct profile codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("cannot write profile mapping to '{}'", path.display()))?;
        tracing::debug!("Saved profile mapping to '{}'", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read profile mapping from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt profile mapping file '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn example(profile: &[&str]) -> DialogExample {
        DialogExample {
            profile: profile.iter().map(|t| t.to_string()).collect(),
            story: vec![],
            query: vec!["hi".into()],
            answer: 0,
        }
    }

    #[test]
    fn test_codes_are_dense_and_sorted() {
        let train = vec![
            example(&["male", "young"]),
            example(&["female", "elderly"]),
            example(&["male", "young"]),
            example(&["female", "middle-aged"]),
        ];
        let mapping = ProfileMapping::build(&train);

        assert_eq!(mapping.len(), 3);
        // sorted by joined key: "female elderly" < "female middle-aged" < "male young"
        assert_eq!(mapping.code(&["female".into(), "elderly".into()]), Some(0));
        assert_eq!(mapping.code(&["female".into(), "middle-aged".into()]), Some(1));
        assert_eq!(mapping.code(&["male".into(), "young".into()]), Some(2));
    }

    #[test]
    fn test_unseen_profile_has_no_code() {
        let mapping = ProfileMapping::build(&[example(&["male", "young"])]);
        assert_eq!(mapping.code(&["female".into(), "elderly".into()]), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mapping = ProfileMapping::build(&[
            example(&["male", "young"]),
            example(&["female", "elderly"]),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        mapping.save(&path).unwrap();

        let loaded = ProfileMapping::load(&path).unwrap();
        assert_eq!(mapping, loaded);
    }

    #[test]
    fn test_load_missing_file_propagates() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProfileMapping::load(&dir.path().join("absent.json")).is_err());
    }
}
