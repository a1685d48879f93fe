// ============================================================
// Layer 4 — Cyclical Encoder
// ============================================================
// Periodic quantities (week of year, hour of day, wind
// direction) have no meaningful linear ordering — hour 23 is
// next to hour 0. Mapping a value onto the unit circle as a
// (sin, cos) pair gives the model a representation where
// "close in the cycle" means "close in feature space".
//
// The encoding is invertible up to period ambiguity:
// atan2(sin, cos) mod period recovers the value within
// floating tolerance, which the tests below rely on.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

use crate::domain::schema::{is_missing, SENTINEL};

/// Encode `value` with the given `period` onto the unit circle.
pub fn encode(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

/// Invert `encode`: recover `value mod period` from a (sin, cos) pair.
pub fn decode(sin: f64, cos: f64, period: f64) -> f64 {
    let angle = sin.atan2(cos);
    (angle * period / (2.0 * PI)).rem_euclid(period)
}

/// Number of ISO weeks in `year` — 52 or 53 depending on the
/// year's last-week rule. Dec 28 is always in the final week.
pub fn weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .expect("Dec 28 exists in every year")
        .iso_week()
        .week()
}

/// Encode a date's ISO week number against that year's week count.
pub fn encode_week(date: NaiveDate) -> (f64, f64) {
    let week = f64::from(date.iso_week().week());
    let total = f64::from(weeks_in_year(date.year()));
    encode(week, total)
}

/// Encode a time of day as fractional hour over a 24h period.
pub fn encode_hour(hour: u32, minute: u32) -> (f64, f64) {
    let fractional = f64::from(hour) + f64::from(minute) / 60.0;
    encode(fractional, 24.0)
}

/// Encode a wind direction in degrees over a 360° period.
/// Sentinel-aware: a missing direction encodes as a sentinel pair.
pub fn encode_direction(degrees: f64) -> (f64, f64) {
    if is_missing(degrees) {
        return (SENTINEL, SENTINEL);
    }
    encode(degrees, 360.0)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_round_trip_recovers_value_mod_period() {
        for &(value, period) in &[(14.5, 24.0), (270.0, 360.0), (52.0, 52.0), (0.0, 24.0)] {
            let (s, c) = encode(value, period);
            let back = decode(s, c, period);
            assert!((back - value.rem_euclid(period)).abs() < TOL, "{value} mod {period} → {back}");
        }
    }

    #[test]
    fn test_hour_round_trip_half_past_two() {
        // 14:30 must decode back to fractional hour 14.5
        let (s, c) = encode_hour(14, 30);
        assert!((decode(s, c, 24.0) - 14.5).abs() < TOL);
    }

    #[test]
    fn test_hour_wraps_at_midnight() {
        // 00:00 and 24:00 are the same point on the circle
        let (s0, c0) = encode_hour(0, 0);
        let (s24, c24) = encode(24.0, 24.0);
        assert!((s0 - s24).abs() < TOL);
        assert!((c0 - c24).abs() < TOL);
    }

    #[test]
    fn test_weeks_in_year_follows_iso_rule() {
        // 2020 is a long ISO year, 2023 is not
        assert_eq!(weeks_in_year(2020), 53);
        assert_eq!(weeks_in_year(2023), 52);
        assert_eq!(weeks_in_year(2015), 53);
    }

    #[test]
    fn test_encode_week_uses_year_length() {
        // Final week of a 53-week year lands back at the top of the circle
        let date = NaiveDate::from_ymd_opt(2020, 12, 28).unwrap();
        assert_eq!(date.iso_week().week(), 53);
        let (s, c) = encode_week(date);
        assert!(s.abs() < TOL);
        assert!((c - 1.0).abs() < TOL);
    }

    #[test]
    fn test_direction_sentinel_aware() {
        assert_eq!(encode_direction(SENTINEL), (SENTINEL, SENTINEL));

        let (s, c) = encode_direction(90.0);
        assert!((s - 1.0).abs() < TOL);
        assert!(c.abs() < TOL);
    }
}
