// ============================================================
// Layer 2 — Assembly Pipeline
// ============================================================
// Turns a list of candidate run ids into training examples:
// load the extract, align observations, assemble. Shared by the
// training and evaluation workflows.
//
// Failure isolation is per run. A missing extract file, a
// malformed row, or an unparseable id skips that run with a
// warning; an incomplete observation window drops it silently.
// Either way the remaining runs proceed, and the caller gets
// aggregate counts for the log. Years of archive hold plenty of
// feed gaps — one bad run must never abort a training session.
//
// Runs are independent, so assembly fans out across cores. The
// collect preserves input order: sample order feeds the seeded
// shuffle, and a thread-scheduling-dependent order would break
// split reproducibility.

use rayon::prelude::*;

use crate::data::aligner::{align, AlignmentWindow};
use crate::data::assembler::{assemble, ForecastSample};
use crate::domain::observation::ObservationIndex;
use crate::domain::traits::RunSource;

/// Result of assembling a batch of candidate runs.
pub struct AssemblyOutcome {
    /// Usable examples, labelled with their run id, input order
    pub samples: Vec<(String, ForecastSample)>,

    /// Runs dropped for an incomplete observation window
    pub dropped: usize,

    /// Runs skipped because loading or assembly errored
    pub failed: usize,
}

enum RunOutcome {
    Sample(String, ForecastSample),
    Dropped,
    Failed,
}

/// Assemble every candidate run into a training example.
pub fn assemble_examples<S: RunSource + Sync>(
    run_ids: &[String],
    source: &S,
    index: &ObservationIndex,
    window: AlignmentWindow,
) -> AssemblyOutcome {
    let outcomes: Vec<RunOutcome> = run_ids
        .par_iter()
        .map(|run_id| match assemble_one(run_id, source, index, window) {
            Ok(Some(sample)) => RunOutcome::Sample(run_id.clone(), sample),
            Ok(None) => {
                tracing::debug!("Run {run_id}: incomplete observation window, dropped");
                RunOutcome::Dropped
            }
            Err(e) => {
                tracing::warn!("Skipping run {run_id}: {e:#}");
                RunOutcome::Failed
            }
        })
        .collect();

    let mut result = AssemblyOutcome { samples: Vec::new(), dropped: 0, failed: 0 };
    for outcome in outcomes {
        match outcome {
            RunOutcome::Sample(id, sample) => result.samples.push((id, sample)),
            RunOutcome::Dropped => result.dropped += 1,
            RunOutcome::Failed => result.failed += 1,
        }
    }
    result
}

fn assemble_one<S: RunSource>(
    run_id: &str,
    source: &S,
    index: &ObservationIndex,
    window: AlignmentWindow,
) -> anyhow::Result<Option<ForecastSample>> {
    let run = source.load_run(run_id)?;
    let aligned = align(run.init_time, index, window);
    assemble(&run, &aligned, window)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::Observation;
    use crate::domain::run::{HourRow, Run};
    use anyhow::bail;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashMap;

    const WINDOW: AlignmentWindow = AlignmentWindow { padding: 1, frame: 15, forecast_hours: 15 };

    /// In-memory run source: runs not in the map fail to load.
    struct FixtureSource {
        runs: HashMap<String, Run>,
    }

    impl RunSource for FixtureSource {
        fn load_run(&self, run_id: &str) -> anyhow::Result<Run> {
            match self.runs.get(run_id) {
                Some(run) => Ok(run.clone()),
                None => bail!("No extract for run '{run_id}'"),
            }
        }
    }

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

    fn fixture() -> (FixtureSource, ObservationIndex) {
        // Two runs on 2023-06-01, at 00:00 and 06:00
        let mut runs = HashMap::new();
        for (id, start) in [("20230601T0000Z", 0), ("20230601T0600Z", 6)] {
            let rows = (start..start + 15).map(|h| hour_row(h % 24)).collect();
            runs.insert(id.to_string(), Run::new(id, rows).unwrap());
        }

        // Observations cover only the 06:00 run's target window
        let day = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let observations = (7..=20)
            .map(|h| Observation {
                time: day.and_time(NaiveTime::from_hms_opt(h, 20, 0).unwrap()),
                temp: 15.0,
            })
            .collect();

        (FixtureSource { runs }, ObservationIndex::new(observations))
    }

    #[test]
    fn test_mixed_batch_counts() {
        let (source, index) = fixture();
        let run_ids = vec![
            "20230601T0000Z".to_string(), // loads, but window incomplete → dropped
            "20230601T0600Z".to_string(), // complete → sample
            "20230601T1200Z".to_string(), // no extract → failed
        ];

        let outcome = assemble_examples(&run_ids, &source, &index, WINDOW);
        assert_eq!(outcome.samples.len(), 1);
        assert_eq!(outcome.samples[0].0, "20230601T0600Z");
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[test]
    fn test_one_bad_run_does_not_abort_the_batch() {
        let (source, index) = fixture();
        let run_ids = vec![
            "not-a-run-id".to_string(),
            "20230601T0600Z".to_string(),
        ];
        let outcome = assemble_examples(&run_ids, &source, &index, WINDOW);
        assert_eq!(outcome.samples.len(), 1);
        assert_eq!(outcome.failed, 1);
    }

    #[test]
    fn test_sample_order_follows_input_order() {
        let (mut source, index) = fixture();
        // Give the 00:00 run a complete window too by shifting its id
        // to a third run mirroring the 06:00 one
        let run = source.runs["20230601T0600Z"].clone();
        source.runs.insert(
            "20230601T0600Z-copy".to_string(),
            Run { id: "20230601T0600Z".to_string(), ..run },
        );

        let run_ids = vec![
            "20230601T0600Z".to_string(),
            "20230601T0600Z-copy".to_string(),
        ];
        let outcome = assemble_examples(&run_ids, &source, &index, WINDOW);
        let labels: Vec<&str> = outcome.samples.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(labels, run_ids.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
