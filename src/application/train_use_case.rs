// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Enumerate candidate run ids     (Layer 3 - domain)
//   Step 2: Apply the ignore list           (Layer 4 - data)
//   Step 3: Load the observation archive    (Layer 4 - data)
//   Step 4: Assemble training examples      (Layer 2 - pipeline)
//   Step 5: Split train/validation          (Layer 4 - data)
//   Step 6: Build Burn datasets             (Layer 4 - data)
//   Step 7: Save config                     (Layer 6 - infra)
//   Step 8: Run training loop               (Layer 5 - ml)

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::pipeline::assemble_examples;
use crate::data::{
    aligner::AlignmentWindow,
    dataset::ForecastDataset,
    filter::{filter_runs, load_ignore_list},
    loader::{ObservationArchiveLoader, RunExtractLoader},
    splitter::split_train_val,
};
use crate::domain::run::generate_run_ids;
use crate::domain::traits::ObservationSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All paths and hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for
// evaluation — the evaluator rebuilds the exact architecture
// and alignment window from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub runs_dir:       String,
    pub observations:   String,
    pub ignore_file:    String,
    pub checkpoint_dir: String,
    pub start_date:     String,
    pub end_date:       String,

    pub forecast_hours: i64,
    pub padding:        i64,
    pub frame:          i64,

    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub weight_decay:   f32,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub enc_layers:     usize,
    pub dec_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub lr_patience:    usize,
    pub es_patience:    usize,
    pub split_seed:     u64,
    pub train_fraction: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            runs_dir:       "download/runs".to_string(),
            observations:   "download/station.csv".to_string(),
            ignore_file:    "download/runs.ignore".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            start_date:     "2023-06-01".to_string(),
            end_date:       "2025-05-31".to_string(),
            forecast_hours: 15,
            padding:        1,
            frame:          15,
            batch_size:     128,
            epochs:         500,
            lr:             1e-4,
            weight_decay:   1e-3,
            d_model:        256,
            num_heads:      8,
            enc_layers:     6,
            dec_layers:     4,
            d_ff:           1024,
            dropout:        0.1,
            lr_patience:    15,
            es_patience:    30,
            split_seed:     69,
            train_fraction: 0.9,
        }
    }
}

impl TrainConfig {
    /// Alignment window implied by the horizon settings.
    pub fn window(&self) -> AlignmentWindow {
        AlignmentWindow {
            padding:        self.padding,
            frame:          self.frame,
            forecast_hours: self.forecast_hours,
        }
    }

    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid start date '{}'", self.start_date))?;
        let end = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid end date '{}'", self.end_date))?;
        ensure!(start <= end, "Start date {start} is after end date {end}");
        Ok((start, end))
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let (start, end) = cfg.date_range()?;

        // ── Step 1: Enumerate candidate run ids ──────────────────────────────
        let candidates = generate_run_ids(start, end);
        tracing::info!("{} candidate runs between {} and {}", candidates.len(), start, end);

        // ── Step 2: Apply the ignore list ────────────────────────────────────
        let ignored = load_ignore_list(Path::new(&cfg.ignore_file))?;
        let (run_ids, skipped) = filter_runs(candidates, &ignored);
        if skipped > 0 {
            tracing::info!("Ignore list removed {} runs", skipped);
        }

        // ── Step 3: Load the observation archive ─────────────────────────────
        let index = ObservationArchiveLoader::new(&cfg.observations).load()?;
        tracing::info!("Observation archive: {} reports", index.len());

        // ── Step 4: Assemble training examples ───────────────────────────────
        let source = RunExtractLoader::new(&cfg.runs_dir, cfg.forecast_hours as usize);
        let outcome = assemble_examples(&run_ids, &source, &index, cfg.window());
        tracing::info!(
            "Assembled {} examples ({} dropped, {} failed)",
            outcome.samples.len(),
            outcome.dropped,
            outcome.failed,
        );
        ensure!(
            !outcome.samples.is_empty(),
            "No usable training examples — check the runs directory and date range"
        );

        // ── Step 5: Train / validation split ─────────────────────────────────
        let samples: Vec<_> = outcome.samples.into_iter().map(|(_, s)| s).collect();
        let (train_samples, val_samples) =
            split_train_val(samples, cfg.train_fraction, cfg.split_seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len(),
        );
        ensure!(
            !train_samples.is_empty() && !val_samples.is_empty(),
            "Split produced an empty partition — need more examples or a different fraction"
        );

        // ── Step 6: Build Burn datasets ──────────────────────────────────────
        let train_dataset = ForecastDataset::new(train_samples);
        let val_dataset = ForecastDataset::new(val_samples);

        // ── Step 7: Save config for evaluation ───────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 8: Run training loop (Layer 5) ──────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_yields_fourteen_targets() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.window().expected_len(), 14);
    }

    #[test]
    fn test_date_range_rejects_inversion() {
        let cfg = TrainConfig {
            start_date: "2024-01-02".to_string(),
            end_date:   "2024-01-01".to_string(),
            ..TrainConfig::default()
        };
        assert!(cfg.date_range().is_err());
    }

    #[test]
    fn test_date_range_rejects_malformed_dates() {
        let cfg = TrainConfig { start_date: "01/06/2023".to_string(), ..TrainConfig::default() };
        assert!(cfg.date_range().is_err());
    }
}
