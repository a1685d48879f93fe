// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-framework-specific code lives in this layer; no
// other layer imports burn except the data batcher/dataset.
//
// What's in this layer:
//
//   model.rs     — WeatherEncoder / TemperatureDecoder /
//                  WeatherModel: self-attention encoder over the
//                  NWP hour sequence, cross-attention decoder
//                  over the target time queries, and the
//                  differentiable smooth-rounding output stage
//
//   schedule.rs  — training discipline: smooth-rounding
//                  sharpness ramp, reduce-on-plateau learning
//                  rate, early stopping with best-snapshot policy
//
//   trainer.rs   — the epoch loop: mixed-precision forward, MSE
//                  loss with a fatal NaN guard, scaled backward,
//                  clipped AdamW step, validation pass,
//                  scheduler/stopper bookkeeping
//
//   evaluator.rs — gradient-free evaluation producing per-sample
//                  prediction tables and aggregate MAE / R²

/// Encoder–decoder forecast architecture with smooth rounding
pub mod model;

/// Sharpness ramp, plateau LR schedule, and early stopping
pub mod schedule;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Prediction reports and regression metrics
pub mod evaluator;
