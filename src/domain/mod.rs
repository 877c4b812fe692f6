// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs that define the core concepts of the
// system, free of any framework types.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs and methods
//
// The task is retrieval dialog: the bot never generates free
// text, it selects one utterance out of a fixed candidate set.
// An example therefore carries a candidate *index* as its
// label, and the candidate set is a first-class domain object.
//
// Reference: Bordes & Weston (2017) Learning End-to-End
//            Goal-Oriented Dialog

// One supervised example cut out of a dialog transcript
pub mod dialog;

// The fixed, index-addressable set of possible bot utterances
pub mod candidates;
