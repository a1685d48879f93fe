// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists the trained model with Burn's CompactRecorder and the
// training configuration as JSON. Evaluation reads the config
// first to rebuild the exact architecture (d_model, layer
// counts), then loads the weights into it — loading fails loudly
// if the architectures don't match.
//
// Files in the checkpoint directory:
//   weather_model.mpk.gz — learned parameters
//   train_config.json    — everything needed to rebuild the model

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::WeatherModel;

const MODEL_FILE: &str = "weather_model";
const CONFIG_FILE: &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if
    /// it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the model weights. Written once, at the end of
    /// training, from the best-validation snapshot.
    pub fn save_model<B: AutodiffBackend>(&self, model: &WeatherModel<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// Load saved weights into a freshly built model of the same
    /// architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  WeatherModel<B>,
        device: &B::Device,
    ) -> Result<WeatherModel<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;
        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON. Called before
    /// training starts so a crashed run still leaves a record of
    /// its hyperparameters.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        Ok(())
    }

    /// Load the training configuration evaluation needs to
    /// rebuild the trained architecture.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());

        let cfg = TrainConfig { d_model: 64, epochs: 7, ..TrainConfig::default() };
        manager.save_config(&cfg).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.d_model, 64);
        assert_eq!(loaded.epochs, 7);
    }

    #[test]
    fn test_load_config_without_training_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());
        let err = manager.load_config().unwrap_err();
        assert!(err.to_string().contains("train"));
    }

    #[test]
    fn test_model_weights_round_trip() {
        use crate::domain::schema::FEATURE_DIM;
        use crate::ml::model::WeatherModelConfig;
        use burn::backend::{Autodiff, NdArray};

        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());
        let device = Default::default();

        let model_cfg = WeatherModelConfig::new(FEATURE_DIM, 8, 2, 1, 1, 16, 0.0);
        let trained: WeatherModel<Autodiff<NdArray>> = model_cfg.init(&device);
        manager.save_model(&trained).unwrap();

        let fresh: WeatherModel<NdArray> = model_cfg.init(&device);
        assert!(manager.load_model(fresh, &device).is_ok());
    }
}
