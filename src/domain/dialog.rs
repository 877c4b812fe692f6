use serde::{Deserialize, Serialize};

/// One supervised example extracted from a dialog transcript.
///
/// The story is every turn preceding the current user utterance,
/// already tokenised and tagged with speaker (`$u` / `$r`) and
/// turn (`#n`) markers. The answer is an index into the
/// candidate set, never raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogExample {
    /// Attribute tokens of the dialog's profile line, e.g. ["female", "middle-aged"]
    pub profile: Vec<String>,

    /// Ordered preceding turns, oldest first — the model's memory
    pub story: Vec<Vec<String>>,

    /// The user utterance the bot must respond to
    pub query: Vec<String>,

    /// Index of the correct bot utterance in the candidate set
    pub answer: usize,
}

impl DialogExample {
    /// The profile as a single lookup key.
    /// Attribute order is kept as written in the transcript, so
    /// "female middle-aged" and "middle-aged female" are distinct.
    pub fn profile_key(&self) -> String {
        self.profile.join(" ")
    }

    /// Number of sentences currently in the memory
    pub fn story_len(&self) -> usize {
        self.story.len()
    }
}
