// ============================================================
// Layer 3 — Observation Domain Types
// ============================================================
// A surface observation is a timestamp and an already-parsed
// screen-level temperature. Raw report decoding happens in the
// (external) ingestion step; the core never sees report text.
//
// The ObservationIndex is the archive sorted by time, so the
// aligner can slice an arbitrary window with two binary
// searches instead of scanning the whole archive per run.

use chrono::NaiveDateTime;

/// One ground-truth temperature report. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Report time (UTC, minute precision)
    pub time: NaiveDateTime,

    /// Screen-level temperature, Celsius
    pub temp: f64,
}

/// The observation archive, sorted and indexed by time.
#[derive(Debug, Clone)]
pub struct ObservationIndex {
    observations: Vec<Observation>,
}

impl ObservationIndex {
    /// Build an index from unordered reports. Sorting once here
    /// keeps every later window query logarithmic.
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.time);
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations with `start <= time <= end`, in time order.
    ///
    /// Both bounds inclusive — the aligner's window rules are
    /// inclusive on both ends and the cadence filter runs later.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Observation] {
        let lo = self.observations.partition_point(|o| o.time < start);
        let hi = self.observations.partition_point(|o| o.time <= end);
        &self.observations[lo..hi]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn obs(h: u32, m: u32, temp: f64) -> Observation {
        Observation { time: at(h, m), temp }
    }

    #[test]
    fn test_sorted_on_construction() {
        let index = ObservationIndex::new(vec![obs(9, 20, 12.0), obs(7, 20, 10.0), obs(8, 50, 11.0)]);
        let all = index.between(at(0, 0), at(23, 59));
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_between_is_inclusive_on_both_ends() {
        let index = ObservationIndex::new(vec![obs(7, 0, 10.0), obs(8, 0, 11.0), obs(9, 0, 12.0)]);
        let slice = index.between(at(7, 0), at(9, 0));
        assert_eq!(slice.len(), 3);

        let slice = index.between(at(7, 1), at(8, 59));
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0].temp, 11.0);
    }

    #[test]
    fn test_empty_window() {
        let index = ObservationIndex::new(vec![obs(7, 20, 10.0)]);
        assert!(index.between(at(8, 0), at(9, 0)).is_empty());
    }
}
