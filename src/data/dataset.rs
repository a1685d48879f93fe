use burn::data::dataset::Dataset;

use crate::data::assembler::ForecastSample;

/// In-memory dataset over assembled forecast samples.
/// Implements Burn's Dataset trait so the DataLoader can call
/// .get(index) and .len() on it.
pub struct ForecastDataset {
    samples: Vec<ForecastSample>,
}

impl ForecastDataset {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self { samples }
    }
}

impl Dataset<ForecastSample> for ForecastDataset {
    fn get(&self, index: usize) -> Option<ForecastSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
