// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns shared by the training and
// evaluation paths:
//
//   checkpoint.rs — model weights via Burn's CompactRecorder,
//                   plus the TrainConfig as JSON so evaluation
//                   can rebuild the exact architecture before
//                   loading weights into it
//
//   metrics.rs    — epoch-level training metrics appended to a
//                   CSV file for later plotting

/// Model checkpoint and config persistence
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
