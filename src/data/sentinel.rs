// ============================================================
// Layer 4 — Sentinel-Aware Unit Conversions
// ============================================================
// Every conversion here follows one contract: a sentinel in is
// a sentinel out, and a valid value is converted and rounded to
// two decimals. Two-argument conversions return the sentinel if
// EITHER input is the sentinel — missing status is infectious
// along a conversion chain.
//
// No Result types in this module on purpose. The sentinel IS
// the error channel for missing measurements; genuinely
// malformed numeric text fails loudly during CSV
// deserialisation long before these functions run.

use crate::domain::schema::{is_missing, SENTINEL};

/// Round to the fixed two-decimal precision used across the pipeline.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Kelvin → Celsius.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    if is_missing(kelvin) {
        return SENTINEL;
    }
    round2(kelvin - 273.15)
}

/// Metres per second → knots.
pub fn mps_to_knots(mps: f64) -> f64 {
    if is_missing(mps) {
        return SENTINEL;
    }
    round2(mps * 1.94384)
}

/// Fraction [0,1] → percent.
pub fn fraction_to_percent(fraction: f64) -> f64 {
    if is_missing(fraction) {
        return SENTINEL;
    }
    round2(fraction * 100.0)
}

/// Pascals → hectopascals.
pub fn pascal_to_hpa(pascal: f64) -> f64 {
    if is_missing(pascal) {
        return SENTINEL;
    }
    round2(pascal / 100.0)
}

/// Relative humidity in percent from temperature and dew point,
/// both in Celsius, via the Magnus approximation.
pub fn relative_humidity(temp_c: f64, dew_c: f64) -> f64 {
    if is_missing(temp_c) || is_missing(dew_c) {
        return SENTINEL;
    }
    let exp_dew = ((17.625 * dew_c) / (243.04 + dew_c)).exp();
    let exp_temp = ((17.625 * temp_c) / (243.04 + temp_c)).exp();
    round2(100.0 * exp_dew / exp_temp)
}

/// Identity with the pipeline's rounding, for fields already in
/// model units (radiation, heat flux).
pub fn passthrough(value: f64) -> f64 {
    if is_missing(value) {
        return SENTINEL;
    }
    round2(value)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius() {
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_eq!(kelvin_to_celsius(294.45), 21.3);
        assert_eq!(kelvin_to_celsius(SENTINEL), SENTINEL);
    }

    #[test]
    fn test_mps_to_knots() {
        assert_eq!(mps_to_knots(10.0), 19.44);
        assert_eq!(mps_to_knots(SENTINEL), SENTINEL);
    }

    #[test]
    fn test_fraction_to_percent() {
        assert_eq!(fraction_to_percent(0.375), 37.5);
        assert_eq!(fraction_to_percent(SENTINEL), SENTINEL);
    }

    #[test]
    fn test_pascal_to_hpa() {
        assert_eq!(pascal_to_hpa(101_325.0), 1013.25);
        assert_eq!(pascal_to_hpa(SENTINEL), SENTINEL);
    }

    #[test]
    fn test_relative_humidity() {
        // Saturated air: dew point equals temperature
        assert_eq!(relative_humidity(15.0, 15.0), 100.0);

        // Known Magnus value
        let rh = relative_humidity(20.0, 10.0);
        assert!(rh > 50.0 && rh < 55.0, "rh={rh}");
    }

    #[test]
    fn test_relative_humidity_sentinel_is_infectious() {
        // Either input missing means the derived value is missing
        assert_eq!(relative_humidity(SENTINEL, 10.0), SENTINEL);
        assert_eq!(relative_humidity(20.0, SENTINEL), SENTINEL);
        assert_eq!(relative_humidity(SENTINEL, SENTINEL), SENTINEL);
    }

    #[test]
    fn test_passthrough_rounds() {
        assert_eq!(passthrough(123.456), 123.46);
        assert_eq!(passthrough(SENTINEL), SENTINEL);
    }
}
