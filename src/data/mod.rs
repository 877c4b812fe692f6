// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw dialog transcripts to tensor batches.
//
// The pipeline flows in this order:
//
//   transcript + candidates files
//       │
//       ▼
//   TranscriptLoader  → parses dialogs into (profile, story,
//       │               query, answer) examples
//       ▼
//   ProfileMapping    → profile line → small integer code
//       │
//       ▼
//   Vocabulary        → token → index, plus the derived
//       │               sentence / memory / candidate limits
//       ▼
//   Vectorizer        → examples → fixed-shape padded arrays
//       │
//       ▼
//   DialogBatcher     → stacks samples into tensor batches
//
// The vocabulary is built over the union of every split up
// front, so the vectorizer only meets unknown tokens when a
// foreign evaluation directory is involved; those map to the
// reserved nil index 0.

/// Parses candidates and task transcript files
pub mod loader;

/// Token vocabulary with derived size limits
pub mod vocab;

/// Profile line → integer code mapping
pub mod profiles;

/// Examples → fixed-shape padded integer arrays
pub mod vectorizer;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
