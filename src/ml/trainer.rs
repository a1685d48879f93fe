// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch state machine: Training → Validating → (Improved |
// NotImproved) → ... → Stopped. Per epoch:
//
//   - iterate mini-batches on the autodiff backend, forward with
//     the current smooth-rounding sharpness, MSE loss
//   - a non-finite loss is fatal — there is no sane way to keep
//     stepping once the parameters have gone NaN
//   - scale the loss before backward (half-precision gradients
//     underflow without it), then step AdamW with the current
//     learning rate; the optimizer clips the gradient norm, with
//     the ceiling scaled to match the loss scale — AdamW's
//     m/√v normalisation cancels the constant scale in the update
//   - full no-grad validation pass on the inner backend
//     (dropout disabled), then step the plateau scheduler and
//     the early stopper
//
// The terminal state always yields the best-seen parameter
// snapshot, whether training stopped early or ran out of epochs.

use anyhow::{bail, Result};
use std::sync::Arc;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, f16},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ForecastBatcher, batcher::ForecastBatch, dataset::ForecastDataset};
use crate::domain::schema::FEATURE_DIM;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{WeatherModel, WeatherModelConfig};
use crate::ml::schedule::{
    training_smooth_k, EarlyStopping, PlateauScheduler, Verdict, EVAL_SMOOTH_K, GRAD_CLIP_NORM,
};

// Mixed precision: forward/backward run in f16 on the GPU, the
// loss scale keeps small gradients representable
type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu<f16, i32>>;

const LOSS_SCALE: f32 = 1024.0;
const LR_FACTOR: f64 = 0.5;
const MIN_LR: f64 = 1e-6;

pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: ForecastDataset,
    val_dataset: ForecastDataset,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let model = train_loop::<TrainBackend>(cfg, train_dataset, val_dataset, &metrics, device)?;

    // Single checkpoint, written once at completion
    ckpt_manager.save_model(&model)?;
    tracing::info!("Training complete, checkpoint saved");
    Ok(())
}

/// The epoch loop, generic over the autodiff backend so the
/// whole control flow also runs on the ndarray backend in tests.
pub fn train_loop<B: AutodiffBackend>(
    cfg: &TrainConfig,
    train_dataset: ForecastDataset,
    val_dataset: ForecastDataset,
    metrics: &MetricsLogger,
    device: B::Device,
) -> Result<WeatherModel<B>> {
    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = WeatherModelConfig::new(
        FEATURE_DIM, cfg.d_model, cfg.num_heads,
        cfg.enc_layers, cfg.dec_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model: WeatherModel<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {}+{} layers, d_model={}",
        cfg.enc_layers, cfg.dec_layers, cfg.d_model,
    );

    // ── AdamW optimiser with clipped, scale-matched gradients ─────────────────
    let optim_cfg = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(GRAD_CLIP_NORM * LOSS_SCALE)));
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ForecastBatcher::<B>::new(device.clone());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.split_seed)
        .num_workers(2)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = ForecastBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(2)
        .build(val_dataset);

    let mut scheduler = PlateauScheduler::new(cfg.lr, LR_FACTOR, cfg.lr_patience, MIN_LR);
    let mut stopper = EarlyStopping::new(cfg.es_patience);
    let mut best_model: Option<WeatherModel<B>> = None;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        let k = training_smooth_k(epoch, cfg.epochs);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches = 0usize;

        for batch in train_loader.iter() {
            let preds = model.forward(batch.run_hour, batch.input, batch.target_times, k);
            let loss = MseLoss::new().forward(preds, batch.target_temps, Reduction::Mean);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                bail!("Non-finite training loss ({loss_val}) at epoch {}", epoch + 1);
            }
            train_loss_sum += loss_val;
            train_batches += 1;

            // Scale → backward → clipped AdamW step
            let grads = loss.mul_scalar(LOSS_SCALE).backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(scheduler.lr(), model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        let val_loss = validate(&model.valid(), &val_loader);
        if !val_loss.is_finite() {
            bail!("Non-finite validation loss at epoch {}", epoch + 1);
        }

        let lr_now = scheduler.step(val_loss);

        let verdict = stopper.observe(val_loss);
        if verdict == Verdict::Improved {
            best_model = Some(model.clone());
            tracing::info!(
                "New best model at epoch {} with val loss {:.4}",
                epoch + 1,
                stopper.best_loss(),
            );
        }

        metrics.log(&EpochMetrics::new(
            epoch + 1, avg_train_loss, val_loss, lr_now, stopper.stall(),
        ))?;

        if (epoch + 1) % 5 == 0 {
            tracing::info!(
                "Epoch [{}/{}], loss: {:.4}, val loss: {:.4}, lr: {:.6}, patience: {}/{}",
                epoch + 1, cfg.epochs, avg_train_loss, val_loss,
                lr_now, stopper.stall(), cfg.es_patience,
            );
        }

        if verdict == Verdict::Stop {
            tracing::warn!(
                "Early stopping at epoch {}. Best val loss: {:.4}",
                epoch + 1,
                stopper.best_loss(),
            );
            break;
        }
    }

    // Best-seen parameters, never merely the latest
    Ok(best_model.unwrap_or(model))
}

/// Full validation pass: no gradients, no parameter updates,
/// evaluation sharpness.
fn validate<B: Backend>(
    model: &WeatherModel<B>,
    loader: &Arc<dyn DataLoader<ForecastBatch<B>>>,
) -> f64 {
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;

    for batch in loader.iter() {
        let preds = model.forward(batch.run_hour, batch.input, batch.target_times, EVAL_SMOOTH_K);
        let loss = MseLoss::new().forward(preds, batch.target_temps, Reduction::Mean);
        loss_sum += loss.into_scalar().elem::<f64>();
        batches += 1;
    }

    if batches > 0 {
        loss_sum / batches as f64
    } else {
        f64::NAN
    }
}
