// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code apart
// from the batcher. No other layer builds tensors or touches
// the autodiff graph.
//
// What's in this layer:
//
//   model.rs      — The end-to-end memory network:
//                   • shared story/query embedding
//                   • per-hop attention over memory sentences
//                   • candidate embedding scored by dot product
//                   • auxiliary profile-prediction head
//                   • alpha-blended two-task loss
//
//   trainer.rs    — The training loop: fixed contiguous batches
//                   shuffled per epoch, Adam with gradient
//                   clipping, periodic train/validation
//                   accuracy, best-checkpoint saving
//
//   inferencer.rs — Full-dataset batch prediction and
//                   exact-match evaluation
//
// Reference: Sukhbaatar et al. (2015) End-To-End Memory Networks
//            Joshi et al. (2017) Personalization in Goal-Oriented Dialog
//            Kingma & Ba (2015) Adam

/// Memory network architecture and blended loss
pub mod model;

/// Epoch loop with periodic evaluation and checkpointing
pub mod trainer;

/// Batch prediction and accuracy evaluation
pub mod inferencer;

/// Backend used for optimization steps
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Backend used for prediction — same device, no autodiff overhead
pub type InferBackend = burn::backend::NdArray;
