// ============================================================
// Layer 4 — Sample Assembler
// ============================================================
// Combines a run's transformed input sequence, run-time
// encoding, and aligned target sequence into one training
// example:
//
//   run_hour  — (sin, cos) of the run's init hour
//   input     — H × FEATURE_DIM matrix from the transform
//   targets   — per retained report: (sin, cos) of report time
//               plus the observed temperature
//
// The window-length invariant lives here: a run whose aligned
// window does not contain exactly frame − padding reports is
// not a usable example and assembles to None. That silently
// drops runs near archive boundaries or observation-feed gaps,
// which is the intended behaviour — the caller reports the
// aggregate drop count.

use anyhow::{ensure, Result};
use chrono::Timelike;

use crate::data::aligner::AlignmentWindow;
use crate::data::cyclical;
use crate::data::transform::transform_row;
use crate::domain::observation::Observation;
use crate::domain::run::Run;

/// One assembled training example. Plain serialisable data —
/// tensors only exist from the batcher onwards.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ForecastSample {
    /// Cyclical encoding of the run's init hour: [sin, cos]
    pub run_hour: [f64; 2],

    /// Per-hour feature vectors, H × FEATURE_DIM
    pub input: Vec<Vec<f64>>,

    /// Cyclical encoding of each target report's time, S × [sin, cos]
    pub target_times: Vec<[f64; 2]>,

    /// Observed temperature at each target step, length S
    pub target_temps: Vec<f64>,
}

impl ForecastSample {
    /// Number of forecast target steps in this example.
    pub fn steps(&self) -> usize {
        self.target_temps.len()
    }
}

/// Assemble one training example, or None when the aligned
/// window fails the length invariant.
pub fn assemble(
    run: &Run,
    aligned: &[Observation],
    window: AlignmentWindow,
) -> Result<Option<ForecastSample>> {
    if aligned.len() != window.expected_len() {
        return Ok(None);
    }

    ensure!(
        run.rows.len() == window.forecast_hours as usize,
        "Run {} has {} extract rows, expected {}",
        run.id,
        run.rows.len(),
        window.forecast_hours
    );

    let (run_sin, run_cos) = {
        let (h, m) = run.init_hour_minute();
        cyclical::encode_hour(h, m)
    };

    let input = run
        .rows
        .iter()
        .map(transform_row)
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let mut target_times = Vec::with_capacity(aligned.len());
    let mut target_temps = Vec::with_capacity(aligned.len());
    for obs in aligned {
        let (s, c) = cyclical::encode_hour(obs.time.hour(), obs.time.minute());
        target_times.push([s, c]);
        target_temps.push(obs.temp);
    }

    Ok(Some(ForecastSample {
        run_hour: [run_sin, run_cos],
        input,
        target_times,
        target_temps,
    }))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::HourRow;
    use chrono::{NaiveDate, NaiveTime};

    const WINDOW: AlignmentWindow = AlignmentWindow { padding: 1, frame: 15, forecast_hours: 15 };

    fn hour_row(hour: u32) -> HourRow {
        HourRow {
            date: "20230601".to_string(),
            hour: format!("{hour:02}00"),
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

    fn test_run() -> Run {
        let rows = (6..21).map(hour_row).collect();
        Run::new("20230601T0600Z", rows).unwrap()
    }

    fn window_of(n: usize) -> Vec<Observation> {
        (0..n)
            .map(|i| Observation {
                time: NaiveDate::from_ymd_opt(2023, 6, 1)
                    .unwrap()
                    .and_time(NaiveTime::from_hms_opt(7 + i as u32, 20, 0).unwrap()),
                temp: 14.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn test_complete_window_assembles() {
        let sample = assemble(&test_run(), &window_of(14), WINDOW).unwrap().unwrap();
        assert_eq!(sample.steps(), 14);
        assert_eq!(sample.input.len(), 15);
        assert_eq!(sample.target_temps[0], 14.0);

        // Run init 06:00 → encoding of fractional hour 6 over 24
        let (s, c) = cyclical::encode(6.0, 24.0);
        assert!((sample.run_hour[0] - s).abs() < 1e-12);
        assert!((sample.run_hour[1] - c).abs() < 1e-12);
    }

    #[test]
    fn test_short_window_drops_example() {
        assert!(assemble(&test_run(), &window_of(13), WINDOW).unwrap().is_none());
    }

    #[test]
    fn test_long_window_drops_example() {
        assert!(assemble(&test_run(), &window_of(15), WINDOW).unwrap().is_none());
    }

    #[test]
    fn test_wrong_row_count_is_an_error_not_a_drop() {
        let run = Run::new("20230601T0600Z", (6..18).map(hour_row).collect()).unwrap();
        assert!(assemble(&run, &window_of(14), WINDOW).is_err());
    }

    #[test]
    fn test_target_times_follow_reports() {
        let sample = assemble(&test_run(), &window_of(14), WINDOW).unwrap().unwrap();
        // First report at 07:20 → fractional hour 7 + 20/60
        let (s, c) = cyclical::encode(7.0 + 20.0 / 60.0, 24.0);
        assert!((sample.target_times[0][0] - s).abs() < 1e-12);
        assert!((sample.target_times[0][1] - c).abs() < 1e-12);
    }
}
