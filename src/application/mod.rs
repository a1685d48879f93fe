// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (training a model or evaluating a trained one).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing or printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination

/// Shared run-id → training-example assembly pipeline
pub mod pipeline;

/// The training workflow
pub mod train_use_case;

/// The evaluation workflow
pub mod evaluate_use_case;
