// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// training a model, scoring a test directory, chatting with a
// restored model, or running a whole experiment.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// The shared heart is `session`: a model paired with the
// vocabulary, profile mapping and candidate set it was trained
// against. Every use case either builds one by training or
// restores one from disk.

/// Run configuration and the training workflow
pub mod train_use_case;

/// A usable model plus its paired artifacts
pub mod session;

/// Score a test directory with a restored model
pub mod eval_use_case;

/// Interactive dialog with a restored model
pub mod chat_use_case;

/// Restore-or-train, then report accuracy per test directory
pub mod experiment;
