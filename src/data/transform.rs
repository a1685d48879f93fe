// ============================================================
// Layer 4 — Feature Transformer
// ============================================================
// Converts one raw extract row into the model's per-hour
// feature vector, in the exact order of FEATURE_SCHEMA:
//
//   - temperatures Kelvin → Celsius
//   - relative humidity derived from temp + dew point
//   - wind speed m/s → knots, wind direction → (sin, cos)
//   - cloud fractions → percent, pressure Pa → hPa
//   - radiation/flux passed through (already model units)
//   - valid date/time → cyclical week and hour encodings
//
// Stateless across hours: each of a run's H rows transforms
// independently, which is what lets the assembly stage fan out
// across a worker pool with no coordination.
//
// Date/hour parse failures are real errors (malformed extract),
// not missing data — they propagate as Err and the caller skips
// that one run.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::data::cyclical;
use crate::data::sentinel;
use crate::domain::run::HourRow;
use crate::domain::schema::FEATURE_DIM;

/// Transform one extract row into a feature vector of
/// `FEATURE_DIM` values ordered per `FEATURE_SCHEMA`.
pub fn transform_row(row: &HourRow) -> Result<Vec<f64>> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y%m%d")
        .with_context(|| format!("Malformed extract date '{}'", row.date))?;
    let time = NaiveTime::parse_from_str(&row.hour, "%H%M")
        .with_context(|| format!("Malformed extract hour '{}'", row.hour))?;

    let (week_sin, week_cos) = cyclical::encode_week(date);
    let (hour_sin, hour_cos) = cyclical::encode_hour(time.hour(), time.minute());

    let temp = sentinel::kelvin_to_celsius(row.temp);
    let temp_min = sentinel::kelvin_to_celsius(row.temp_min);
    let temp_max = sentinel::kelvin_to_celsius(row.temp_max);
    let temp_dew = sentinel::kelvin_to_celsius(row.temp_dew);
    let temp_surf = sentinel::kelvin_to_celsius(row.temp_surf);

    // Derived AFTER conversion — humidity wants Celsius inputs,
    // and a sentinel in either temperature stays a sentinel here
    let humidity_rel = sentinel::relative_humidity(temp, temp_dew);

    let wind_speed = sentinel::mps_to_knots(row.wind_speed);
    let (wind_dir_sin, wind_dir_cos) = cyclical::encode_direction(row.wind_dir);

    let cloud_low = sentinel::fraction_to_percent(row.cloud_low);
    let cloud_medium = sentinel::fraction_to_percent(row.cloud_medium);
    let sea_press = sentinel::pascal_to_hpa(row.sea_press);

    let features = vec![
        week_sin,
        week_cos,
        hour_sin,
        hour_cos,
        temp,
        temp_min,
        temp_max,
        temp_dew,
        temp_surf,
        humidity_rel,
        wind_speed,
        wind_dir_sin,
        wind_dir_cos,
        cloud_low,
        cloud_medium,
        sea_press,
        sentinel::passthrough(row.rad_sw_dir_down),
        sentinel::passthrough(row.rad_lw_down),
        sentinel::passthrough(row.heat_flux),
    ];
    debug_assert_eq!(features.len(), FEATURE_DIM);

    Ok(features)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FEATURE_SCHEMA, SENTINEL};

    fn sample_row() -> HourRow {
        HourRow {
            date: "20230601".to_string(),
            hour: "0700".to_string(),
            temp: 288.15,
            temp_min: 287.15,
            temp_max: 289.15,
            temp_dew: 283.15,
            temp_surf: 290.15,
            wind_speed: 5.0,
            wind_dir: 180.0,
            cloud_low: 0.25,
            cloud_medium: 0.5,
            sea_press: 101_300.0,
            rad_sw_dir_down: 120.5,
            rad_lw_down: 310.2,
            heat_flux: -15.0,
        }
    }

    fn field(features: &[f64], name: &str) -> f64 {
        let idx = FEATURE_SCHEMA.iter().position(|&f| f == name).unwrap();
        features[idx]
    }

    #[test]
    fn test_vector_matches_schema_width() {
        let features = transform_row(&sample_row()).unwrap();
        assert_eq!(features.len(), FEATURE_DIM);
    }

    #[test]
    fn test_unit_conversions_land_in_model_units() {
        let features = transform_row(&sample_row()).unwrap();
        assert_eq!(field(&features, "temp"), 15.0);
        assert_eq!(field(&features, "temp_dew"), 10.0);
        assert_eq!(field(&features, "wind_speed"), 9.72);
        assert_eq!(field(&features, "cloud_low"), 25.0);
        assert_eq!(field(&features, "sea_press"), 1013.0);
        assert_eq!(field(&features, "rad_lw_down"), 310.2);
    }

    #[test]
    fn test_sentinel_propagates_into_derived_fields() {
        let mut row = sample_row();
        row.temp_dew = SENTINEL;
        let features = transform_row(&row).unwrap();
        assert_eq!(field(&features, "temp_dew"), SENTINEL);
        // Humidity depends on dew point, so it must be missing too
        assert_eq!(field(&features, "humidity_rel"), SENTINEL);
        // Unrelated fields are unaffected
        assert_eq!(field(&features, "temp"), 15.0);
    }

    #[test]
    fn test_missing_wind_direction_encodes_as_sentinel_pair() {
        let mut row = sample_row();
        row.wind_dir = SENTINEL;
        let features = transform_row(&row).unwrap();
        assert_eq!(field(&features, "wind_dir_sin"), SENTINEL);
        assert_eq!(field(&features, "wind_dir_cos"), SENTINEL);
    }

    #[test]
    fn test_malformed_date_fails_loudly() {
        let mut row = sample_row();
        row.date = "June 1st".to_string();
        assert!(transform_row(&row).is_err());
    }

    #[test]
    fn test_rows_transform_independently() {
        // Same row twice gives identical vectors — no hidden state
        let row = sample_row();
        assert_eq!(transform_row(&row).unwrap(), transform_row(&row).unwrap());
    }
}
