// ============================================================
// Layer 4 — Observation Aligner
// ============================================================
// Selects the ground-truth reports that serve as targets for
// one run, in three steps:
//
//   1. Fetch [run_time, run_time + forecast_hours] from the
//      archive index. This is deliberately WIDER than the final
//      target window: if the window ends at 14:00 the 13:50
//      report sits right on the fetch boundary, and trimming the
//      fetch to the target window first would lose reports near
//      archive edges. Do not "simplify" this to a single slice.
//   2. Keep only reports on the station's half-hourly cadence
//      (minute 20 or 50).
//   3. Keep only reports inside the target window
//      [run_time + padding, run_time + frame], both ends
//      inclusive.
//
// The caller enforces the length invariant (frame − padding
// retained reports) — a short or long window silently drops
// that run as a training example, which is the documented
// behaviour near archive boundaries and feed gaps.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::domain::observation::{Observation, ObservationIndex};

/// Minutes past the hour at which the station reports.
pub const REPORT_MINUTES: [u32; 2] = [20, 50];

/// Window bounds, in hours from run init time.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentWindow {
    /// Hours trimmed from the run start before targets begin
    pub padding: i64,

    /// Hours from run start to the end of the target window
    pub frame: i64,

    /// Forecast horizon — bounds the wide archive fetch
    pub forecast_hours: i64,
}

impl AlignmentWindow {
    /// Number of reports a complete target window must contain.
    pub fn expected_len(&self) -> usize {
        (self.frame - self.padding) as usize
    }
}

/// Ordered target reports for the run starting at `run_time`.
pub fn align(
    run_time: NaiveDateTime,
    index: &ObservationIndex,
    window: AlignmentWindow,
) -> Vec<Observation> {
    let init = run_time + Duration::hours(window.padding);
    let cutoff = run_time + Duration::hours(window.frame);

    // Wide fetch over the full horizon, then trim
    let fetch_end = run_time + Duration::hours(window.forecast_hours);

    index
        .between(run_time, fetch_end)
        .iter()
        .filter(|obs| REPORT_MINUTES.contains(&obs.time.minute()))
        .filter(|obs| obs.time >= init && obs.time <= cutoff)
        .copied()
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const WINDOW: AlignmentWindow = AlignmentWindow { padding: 1, frame: 15, forecast_hours: 15 };

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn obs(d: u32, h: u32, m: u32) -> Observation {
        Observation { time: at(d, h, m), temp: 15.0 }
    }

    #[test]
    fn test_window_bounds_inclusive() {
        // Run at 06:00, padding 1, frame 15 → window [07:00, 21:00]
        let index = ObservationIndex::new(vec![
            obs(1, 6, 50),  // before init — excluded
            obs(1, 7, 20),  // first valid report
            obs(1, 20, 50), // last valid report
            obs(1, 21, 10), // wrong minute AND past cutoff
        ]);
        let aligned = align(at(1, 6, 0), &index, WINDOW);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].time, at(1, 7, 20));
        assert_eq!(aligned[1].time, at(1, 20, 50));
    }

    #[test]
    fn test_cadence_minutes_only() {
        // 07:10 is off-cadence even though it is inside the window
        let index = ObservationIndex::new(vec![obs(1, 7, 10), obs(1, 7, 20), obs(1, 7, 50)]);
        let aligned = align(at(1, 6, 0), &index, WINDOW);
        assert_eq!(aligned.len(), 2);
        assert!(aligned.iter().all(|o| REPORT_MINUTES.contains(&o.time.minute())));
    }

    #[test]
    fn test_never_returns_outside_window() {
        let index = ObservationIndex::new(vec![
            obs(1, 5, 20),  // before run time entirely
            obs(1, 6, 20),  // inside fetch, before init
            obs(1, 21, 50), // on cadence but past cutoff... and past fetch
        ]);
        let aligned = align(at(1, 6, 0), &index, WINDOW);
        assert!(aligned.is_empty());
    }

    #[test]
    fn test_full_window_has_expected_length() {
        // One on-cadence report per hour for hours 07..=20 → 14 reports
        let reports: Vec<Observation> = (7..=20).map(|h| obs(1, h, 20)).collect();
        let index = ObservationIndex::new(reports);
        let aligned = align(at(1, 6, 0), &index, WINDOW);
        assert_eq!(aligned.len(), WINDOW.expected_len());
        assert_eq!(WINDOW.expected_len(), 14);
    }

    #[test]
    fn test_output_preserves_archive_order() {
        let index = ObservationIndex::new(vec![obs(1, 9, 50), obs(1, 8, 20), obs(1, 9, 20)]);
        let aligned = align(at(1, 6, 0), &index, WINDOW);
        assert!(aligned.windows(2).all(|w| w[0].time < w[1].time));
    }
}
