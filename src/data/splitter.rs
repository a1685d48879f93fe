// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples and splits them into a training set (weight
// updates) and a validation set (generalisation measurement).
// Runs arrive in chronological order, so splitting without a
// shuffle would validate exclusively on the most recent season.
//
// The shuffle is seeded: a fixed seed makes the split — and
// therefore every reported validation number — reproducible
// across runs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// `train_fraction` is the proportion kept for training,
/// e.g. 0.9 = 90% train / 10% validation.
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle — every permutation equally likely
    samples.shuffle(&mut rng);

    let total = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes [n..] and returns it
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
