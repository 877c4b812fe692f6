// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Vocabulary and profile-mapping persistence under their
// canonical names inside a model/experiment directory:
//
//   vocabulary.json
//   profiles.json
//
// These two files pair with the checkpoint saved next to them;
// evaluating with a different vocabulary or profile code space
// than the one trained against produces garbage silently, so
// the experiment runner always loads all three together.

use std::path::PathBuf;

use anyhow::Result;

use crate::data::profiles::ProfileMapping;
use crate::data::vocab::Vocabulary;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const PROFILES_FILE: &str = "profiles.json";

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.dir.join(VOCABULARY_FILE)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILE)
    }

    pub fn save_vocabulary(&self, vocab: &Vocabulary) -> Result<()> {
        vocab.save(&self.vocabulary_path())
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::load(&self.vocabulary_path())
    }

    pub fn save_profiles(&self, profiles: &ProfileMapping) -> Result<()> {
        profiles.save(&self.profiles_path())
    }

    pub fn load_profiles(&self) -> Result<ProfileMapping> {
        ProfileMapping::load(&self.profiles_path())
    }
}
