// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and all
// their configurable flags. clap's derive macros generate the
// help text, missing-argument errors, and type conversion.

use clap::{Args, Subcommand};

use crate::application::evaluate_use_case::EvaluateConfig;
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the forecast model on archived runs and observations
    Train(TrainArgs),

    /// Evaluate a trained checkpoint on a held-out date range
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing one <run_id>.csv extract per run
    #[arg(long, default_value = "download/runs")]
    pub runs_dir: String,

    /// Station observation archive CSV
    #[arg(long, default_value = "download/station.csv")]
    pub observations: String,

    /// File listing run ids to exclude, one per line
    #[arg(long, default_value = "download/runs.ignore")]
    pub ignore_file: String,

    /// Directory to save the model checkpoint and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// First init date of the training range (YYYY-MM-DD)
    #[arg(long, default_value = "2023-06-01")]
    pub start_date: String,

    /// Last init date of the training range (YYYY-MM-DD)
    #[arg(long, default_value = "2025-05-31")]
    pub end_date: String,

    /// Forecast horizon in hours — one extract row per hour
    #[arg(long, default_value_t = 15)]
    pub forecast_hours: i64,

    /// Hours trimmed from the run start before targets begin
    #[arg(long, default_value_t = 1)]
    pub padding: i64,

    /// Hours from run start to the end of the target window
    #[arg(long, default_value_t = 15)]
    pub frame: i64,

    /// Number of examples processed together in one forward pass
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Epoch budget — early stopping usually halts well before it
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,

    /// Initial learning rate, reduced on validation plateaus
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// AdamW weight decay
    #[arg(long, default_value_t = 1e-3)]
    pub weight_decay: f32,

    /// Hidden dimension of the transformer
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads — d_model must divide by this
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Stacked encoder layers over the NWP hour sequence
    #[arg(long, default_value_t = 6)]
    pub enc_layers: usize,

    /// Stacked decoder layers over the target time queries
    #[arg(long, default_value_t = 4)]
    pub dec_layers: usize,

    /// Inner dimension of the feed-forward networks
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Epochs without improvement before the learning rate halves
    #[arg(long, default_value_t = 15)]
    pub lr_patience: usize,

    /// Epochs without improvement before training stops
    #[arg(long, default_value_t = 30)]
    pub es_patience: usize,

    /// Seed for the train/validation shuffle
    #[arg(long, default_value_t = 69)]
    pub split_seed: u64,

    /// Fraction of examples kept for training
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 — the
/// application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            runs_dir:       a.runs_dir,
            observations:   a.observations,
            ignore_file:    a.ignore_file,
            checkpoint_dir: a.checkpoint_dir,
            start_date:     a.start_date,
            end_date:       a.end_date,
            forecast_hours: a.forecast_hours,
            padding:        a.padding,
            frame:          a.frame,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            weight_decay:   a.weight_decay,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            enc_layers:     a.enc_layers,
            dec_layers:     a.dec_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            lr_patience:    a.lr_patience,
            es_patience:    a.es_patience,
            split_seed:     a.split_seed,
            train_fraction: a.train_fraction,
        }
    }
}

/// All arguments for the `evaluate` command. Architecture and
/// alignment settings come from the saved training config, not
/// from here.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Directory containing one <run_id>.csv extract per run
    #[arg(long, default_value = "download/runs")]
    pub runs_dir: String,

    /// Station observation archive CSV
    #[arg(long, default_value = "download/station.csv")]
    pub observations: String,

    /// File listing run ids to exclude, one per line
    #[arg(long, default_value = "download/runs.ignore")]
    pub ignore_file: String,

    /// First init date of the evaluation range (YYYY-MM-DD)
    #[arg(long, default_value = "2025-06-01")]
    pub start_date: String,

    /// Last init date of the evaluation range (YYYY-MM-DD)
    #[arg(long, default_value = "2025-06-30")]
    pub end_date: String,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            checkpoint_dir: a.checkpoint_dir,
            runs_dir:       a.runs_dir,
            observations:   a.observations,
            ignore_file:    a.ignore_file,
            start_date:     a.start_date,
            end_date:       a.end_date,
        }
    }
}
