// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw records on disk and GPU-ready tensor
// batches. The pipeline flows in this order:
//
//   run ids over the date range
//       │
//       ▼
//   RunFilter            → drops runs on the quality-gate ignore list
//       │
//       ▼
//   RunExtractLoader     → reads one CSV extract per surviving run
//   ObservationArchive   → time-sorted ground-truth index (loaded once)
//       │
//       ▼
//   ObservationAligner   → picks the target reports for each run window
//       │
//       ▼
//   FeatureTransformer   → sentinel math + cyclical encodings per hour
//       │
//       ▼
//   SampleAssembler      → one ForecastSample per run, or drops the run
//       │
//       ▼
//   ForecastDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ForecastBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader           → feeds batches to the training loop
//
// Each module is responsible for exactly one step, and the
// per-run steps are pure so the whole middle of the pipeline
// can run on a rayon worker pool with no shared state.

/// Unit conversions that propagate the missing-value sentinel
pub mod sentinel;

/// Sine/cosine encodings for periodic quantities
pub mod cyclical;

/// Excludes runs flagged by the external quality gate
pub mod filter;

/// Selects the ground-truth reports inside a run's target window
pub mod aligner;

/// Converts one raw extract row into a model feature vector
pub mod transform;

/// Combines inputs, encodings, and targets into training examples
pub mod assembler;

/// Reads run extracts and the observation archive from CSV
pub mod loader;

/// Implements Burn's Dataset trait for forecast samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
