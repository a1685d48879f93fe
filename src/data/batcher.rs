// ============================================================
// Layer 4 — Forecast Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of
// ForecastSamples into device tensors. Every sample in a batch
// has identical dimensions by construction — the assembler's
// window invariant fixes the target length and the loader fixes
// the input row count — so batching is a flatten + reshape with
// no dynamic padding.
//
// Shapes, with N = batch size, H = forecast hours,
// F = FEATURE_DIM, S = target steps:
//
//   run_hour     [N, 2]
//   input        [N, H, F]
//   target_times [N, S, 2]
//   target_temps [N, S]

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::assembler::ForecastSample;

// ─── ForecastBatch ────────────────────────────────────────────────────────────
/// A batch of forecast samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ForecastBatch<B: Backend> {
    /// Run init-hour encodings — shape [N, 2]
    pub run_hour: Tensor<B, 2>,

    /// Per-hour NWP feature sequences — shape [N, H, F]
    pub input: Tensor<B, 3>,

    /// Target report time encodings — shape [N, S, 2]
    pub target_times: Tensor<B, 3>,

    /// Observed temperatures — shape [N, S]
    pub target_temps: Tensor<B, 2>,
}

// ─── ForecastBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct ForecastBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ForecastBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ForecastSample, ForecastBatch<B>> for ForecastBatcher<B> {
    fn batch(&self, items: Vec<ForecastSample>) -> ForecastBatch<B> {
        let batch_size = items.len();
        let hours = items[0].input.len();
        let features = items[0].input[0].len();
        let steps = items[0].steps();

        let run_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.run_hour.iter().map(|&x| x as f32))
            .collect();

        let input_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.input.iter().flatten().map(|&x| x as f32))
            .collect();

        let times_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.target_times.iter().flatten().map(|&x| x as f32))
            .collect();

        let temps_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.target_temps.iter().map(|&x| x as f32))
            .collect();

        let run_hour = Tensor::<B, 1>::from_floats(run_flat.as_slice(), &self.device)
            .reshape([batch_size, 2]);

        let input = Tensor::<B, 1>::from_floats(input_flat.as_slice(), &self.device)
            .reshape([batch_size, hours, features]);

        let target_times = Tensor::<B, 1>::from_floats(times_flat.as_slice(), &self.device)
            .reshape([batch_size, steps, 2]);

        let target_temps = Tensor::<B, 1>::from_floats(temps_flat.as_slice(), &self.device)
            .reshape([batch_size, steps]);

        ForecastBatch { run_hour, input, target_times, target_temps }
    }
}
