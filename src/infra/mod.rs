// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — Best-model checkpointing with Burn's
//                   CompactRecorder, the strictly-increasing
//                   best tracker, and TrainConfig save/load.
//                   A checkpoint is only valid together with
//                   the vocabulary and profile mapping it was
//                   trained against, so everything lives in the
//                   same directory.
//
//   artifacts.rs  — Vocabulary and profile-mapping persistence
//                   under their canonical file names, so a
//                   train/evaluate pair shares one code space.
//
//   metrics.rs    — Exact-match accuracy plus the epoch-level
//                   CSV log consumed by external monitoring.

/// Model checkpoint saving and loading, best-accuracy policy
pub mod checkpoint;

/// Vocabulary and profile-mapping store
pub mod artifacts;

/// Accuracy computation and the metrics CSV logger
pub mod metrics;
