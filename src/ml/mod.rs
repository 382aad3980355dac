// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All tensor code lives here.
//
//   backend.rs    : CPU/GPU backend aliases and device
//   model.rs      : the feed-forward classifier
//   schedule.rs   : step learning-rate decay
//   trainer.rs    : epoch loop with validation
//   evaluator.rs  : no-gradient evaluation, confusion matrix
//   importance.rs : permutation feature importance
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod backend;

pub mod model;

pub mod schedule;

pub mod trainer;

pub mod evaluator;

pub mod importance;
