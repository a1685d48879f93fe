// ============================================================
// Layer 3 — Sentinel and Feature Schema
// ============================================================
// Two facts the whole pipeline must agree on:
//
//   1. The missing-value sentinel. Missing measurements are a
//      normal state of the domain, not an error — they travel
//      through the pipeline as this reserved constant and every
//      derived computation must propagate it.
//
//   2. The feature schema: the named, ordered list of per-hour
//      model inputs. The transform emits vectors in this order
//      and the model sizes its input projection from it, so the
//      field order cannot silently drift between the two.

/// Reserved out-of-range constant marking a missing measurement.
/// Deliberately not NaN — NaN poisons comparisons and would make
/// "is this value missing?" checks unreliable.
pub const SENTINEL: f64 = -999.0;

/// True if `value` is the missing-value sentinel.
pub fn is_missing(value: f64) -> bool {
    value == SENTINEL
}

/// Per-hour model input features, in tensor column order.
pub const FEATURE_SCHEMA: [&str; 19] = [
    "week_sin",
    "week_cos",
    "hour_sin",
    "hour_cos",
    "temp",
    "temp_min",
    "temp_max",
    "temp_dew",
    "temp_surf",
    "humidity_rel",
    "wind_speed",
    "wind_dir_sin",
    "wind_dir_cos",
    "cloud_low",
    "cloud_medium",
    "sea_press",
    "rad_sw_dir_down",
    "rad_lw_down",
    "heat_flux",
];

/// Width of one per-hour feature vector.
pub const FEATURE_DIM: usize = FEATURE_SCHEMA.len();

/// Width of one cyclical time encoding (sin, cos).
pub const TIME_ENCODING_DIM: usize = 2;
