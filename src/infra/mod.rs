// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   metrics.rs  : per-epoch learning curves and their CSV file
//   report.rs   : run artifacts (config, confusion matrix,
//                 importance ranking) and console tables
//   progress.rs : progress bars for the long loops
//
// Reference: Rust Book §7 (Modules)

/// Training metrics history and CSV logger
pub mod metrics;

/// Run artifacts and console tables
pub mod report;

/// indicatif progress bars
pub mod progress;
