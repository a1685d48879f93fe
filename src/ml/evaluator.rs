// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Gradient-free assessment of a trained model against held-out
// runs. Produces a per-run prediction table (hour by hour:
// predicted vs observed, signed difference) plus MAE and R² per
// run and pooled across every forecast step.
//
// Rounding here uses the fixed evaluation sharpness, never the
// training ramp — reported numbers must not depend on which
// epoch training stopped at.

use anyhow::{anyhow, Result};
use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use crate::data::assembler::ForecastSample;
use crate::data::batcher::ForecastBatcher;
use crate::ml::model::WeatherModel;
use crate::ml::schedule::EVAL_SMOOTH_K;

/// Predictions and metrics for one forecast run.
pub struct SampleReport {
    pub label:     String,
    pub predicted: Vec<f32>,
    pub actual:    Vec<f32>,
    pub mae:       f64,
    pub r_squared: f64,
}

/// Full evaluation: one report per run plus pooled metrics.
pub struct EvaluationReport {
    pub samples:   Vec<SampleReport>,
    pub mae:       f64,
    pub r_squared: f64,
}

/// Mean absolute error between predictions and observations.
pub fn mae(predicted: &[f32], actual: &[f32]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (*p as f64 - *a as f64).abs())
        .sum();
    sum / predicted.len() as f64
}

/// Coefficient of determination, 1 − SS_res / SS_tot. A constant
/// observation series has no variance to explain; reported as 0.
pub fn r_squared(predicted: &[f32], actual: &[f32]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean: f64 = actual.iter().map(|a| *a as f64).sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (*a as f64 - mean).powi(2)).sum();
    let ss_res: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (*a as f64 - *p as f64).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Run the model over each labelled sample and collect metrics.
pub fn evaluate<B: Backend>(
    model: &WeatherModel<B>,
    samples: &[(String, ForecastSample)],
    device: &B::Device,
) -> Result<EvaluationReport> {
    let batcher = ForecastBatcher::<B>::new(device.clone());

    let mut reports = Vec::with_capacity(samples.len());
    let mut all_predicted = Vec::new();
    let mut all_actual = Vec::new();

    for (label, sample) in samples {
        let batch = batcher.batch(vec![sample.clone()]);
        let preds = model.forward(
            batch.run_hour,
            batch.input,
            batch.target_times,
            EVAL_SMOOTH_K,
        );

        let predicted: Vec<f32> = preds
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow!("Failed to read predictions for {label}: {e:?}"))?;
        let actual: Vec<f32> = sample.target_temps.iter().map(|t| *t as f32).collect();

        all_predicted.extend_from_slice(&predicted);
        all_actual.extend_from_slice(&actual);

        reports.push(SampleReport {
            label:     label.clone(),
            mae:       mae(&predicted, &actual),
            r_squared: r_squared(&predicted, &actual),
            predicted,
            actual,
        });
    }

    Ok(EvaluationReport {
        samples:   reports,
        mae:       mae(&all_predicted, &all_actual),
        r_squared: r_squared(&all_predicted, &all_actual),
    })
}

/// Human-readable dump of an evaluation report.
pub fn print_report(report: &EvaluationReport) {
    for sample in &report.samples {
        println!("\nRun {}", sample.label);
        println!("  {:>4}  {:>9}  {:>9}  {:>6}", "step", "predicted", "observed", "diff");
        for (step, (p, a)) in sample.predicted.iter().zip(&sample.actual).enumerate() {
            println!(
                "  {:>4}  {:>9.1}  {:>9.1}  {:>+6.1}",
                step + 1,
                p,
                a,
                p - a,
            );
        }
        println!("  MAE: {:.3}  R²: {:.3}", sample.mae, sample.r_squared);
    }

    println!("\n=== Aggregate over {} runs ===", report.samples.len());
    println!("MAE: {:.3}", report.mae);
    println!("R²:  {:.3}", report.r_squared);
}
