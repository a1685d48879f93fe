// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Assesses a trained model on runs outside the training range:
//
//   Step 1: Load the saved training config  (Layer 6 - infra)
//   Step 2: Rebuild the model, load weights (Layer 5/6)
//   Step 3: Assemble evaluation examples    (Layer 2 - pipeline)
//   Step 4: Evaluate and print the report   (Layer 5 - ml)
//
// The architecture and alignment window come from the saved
// config, never from the command line — evaluating with a
// different window than the model was trained on would be a
// silent apples-to-oranges comparison. Only the data paths and
// the date range are evaluation-time choices.

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use burn::tensor::f16;

use crate::application::pipeline::assemble_examples;
use crate::data::{
    filter::{filter_runs, load_ignore_list},
    loader::{ObservationArchiveLoader, RunExtractLoader},
};
use crate::domain::run::generate_run_ids;
use crate::domain::schema::FEATURE_DIM;
use crate::domain::traits::ObservationSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{evaluate, print_report};
use crate::ml::model::{WeatherModel, WeatherModelConfig};

// Inference runs on the plain (non-autodiff) GPU backend
type InferBackend = burn::backend::Wgpu<f16, i32>;

// ─── Evaluation Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub checkpoint_dir: String,
    pub runs_dir:       String,
    pub observations:   String,
    pub ignore_file:    String,
    pub start_date:     String,
    pub end_date:       String,
}

impl EvaluateConfig {
    fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid start date '{}'", self.start_date))?;
        let end = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid end date '{}'", self.end_date))?;
        ensure!(start <= end, "Start date {start} is after end date {end}");
        Ok((start, end))
    }
}

// ─── EvaluateUseCase ──────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    /// Execute the evaluation pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let (start, end) = cfg.date_range()?;

        // ── Step 1: Load the saved training config ───────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        let train_cfg = ckpt_manager.load_config()?;

        // ── Step 2: Rebuild the model and load weights ───────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let model_cfg = WeatherModelConfig::new(
            FEATURE_DIM, train_cfg.d_model, train_cfg.num_heads,
            train_cfg.enc_layers, train_cfg.dec_layers, train_cfg.d_ff, train_cfg.dropout,
        );
        let model: WeatherModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Loaded trained model from '{}'", cfg.checkpoint_dir);

        // ── Step 3: Assemble evaluation examples ─────────────────────────────
        let candidates = generate_run_ids(start, end);
        let ignored = load_ignore_list(Path::new(&cfg.ignore_file))?;
        let (run_ids, _) = filter_runs(candidates, &ignored);

        let index = ObservationArchiveLoader::new(&cfg.observations).load()?;
        let source = RunExtractLoader::new(&cfg.runs_dir, train_cfg.forecast_hours as usize);
        let outcome = assemble_examples(&run_ids, &source, &index, train_cfg.window());
        tracing::info!(
            "Evaluating {} runs ({} dropped, {} failed)",
            outcome.samples.len(),
            outcome.dropped,
            outcome.failed,
        );
        ensure!(
            !outcome.samples.is_empty(),
            "No usable evaluation examples between {start} and {end}"
        );

        // ── Step 4: Evaluate and print the report ────────────────────────────
        let report = evaluate(&model, &outcome.samples, &device)?;
        print_report(&report);

        Ok(())
    }
}
