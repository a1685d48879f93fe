// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training epoch. The file survives
// across runs (header written only when the file is new), so a
// resumed training session keeps extending the same curve.
//
// Example output:
//   epoch,train_loss,val_loss,lr,stall
//   1,38.124500,35.089200,0.000100,0
//   2,29.890100,27.854300,0.000100,0

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number, starting at 1
    pub epoch: usize,

    /// Average MSE over all training batches
    pub train_loss: f64,

    /// Average MSE over the validation set
    pub val_loss: f64,

    /// Learning rate in force for the next epoch
    pub lr: f64,

    /// Consecutive epochs without a validation improvement
    pub stall: usize,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, lr: f64, stall: usize) -> Self {
        Self { epoch, train_loss, val_loss, lr, stall }
    }
}

/// Logs epoch metrics to `<dir>/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, the directory, and the CSV header if
    /// the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,lr,stall")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{}",
            m.epoch, m.train_loss, m.val_loss, m.lr, m.stall,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
