// ============================================================
// Layer 4 — Extract and Archive Loaders
// ============================================================
// The extraction and ingestion components are external: by the
// time files land here, grid values have been reduced to one
// station point per hour and raw reports have been parsed into
// plain temperatures. These loaders only deserialise those
// already-well-formed records.
//
// Error policy differs by source, per the system's contract:
//   - A missing OBSERVATION ARCHIVE is fatal — without ground
//     truth nothing can train, so fail fast with a clear message.
//   - A missing or malformed RUN EXTRACT is an error for that
//     run only; the caller logs the id and keeps going.

use anyhow::{bail, ensure, Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::observation::{Observation, ObservationIndex};
use crate::domain::run::{HourRow, Run};
use crate::domain::traits::{ObservationSource, RunSource};

// ─── RunExtractLoader ─────────────────────────────────────────────────────────
/// Reads per-run CSV extracts named `<run_id>.csv` from a directory.
pub struct RunExtractLoader {
    dir: PathBuf,

    /// Rows a complete extract must contain (the forecast horizon)
    expected_rows: usize,
}

impl RunExtractLoader {
    pub fn new(dir: impl Into<PathBuf>, expected_rows: usize) -> Self {
        Self { dir: dir.into(), expected_rows }
    }
}

impl RunSource for RunExtractLoader {
    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.dir.join(format!("{run_id}.csv"));
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Cannot read run extract '{}'", path.display()))?;

        let mut rows: Vec<HourRow> = Vec::with_capacity(self.expected_rows);
        for record in reader.deserialize() {
            // A malformed numeric field fails HERE, loudly —
            // it must never be mistaken for a sentinel
            let row: HourRow =
                record.with_context(|| format!("Malformed row in '{}'", path.display()))?;
            rows.push(row);
        }

        ensure!(
            rows.len() == self.expected_rows,
            "Run extract '{}' has {} rows, expected {}",
            path.display(),
            rows.len(),
            self.expected_rows
        );

        Run::new(run_id, rows)
    }
}

// ─── ObservationArchiveLoader ─────────────────────────────────────────────────
/// Archive CSV row: a report time and the parsed temperature.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    valid: String,
    temp: f64,
}

/// Reads the station's ground-truth archive CSV into a sorted index.
pub struct ObservationArchiveLoader {
    path: PathBuf,
}

impl ObservationArchiveLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObservationSource for ObservationArchiveLoader {
    fn load(&self) -> Result<ObservationIndex> {
        if !self.path.exists() {
            // Configuration error, not data quality — abort immediately
            bail!(
                "Observation archive not found at '{}'. \
                 Point --observations at the station archive CSV.",
                self.path.display()
            );
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Cannot read observation archive '{}'", self.path.display()))?;

        let mut observations = Vec::new();
        for record in reader.deserialize() {
            let rec: ObservationRecord = record
                .with_context(|| format!("Malformed row in '{}'", self.path.display()))?;
            let time = parse_observation_time(&rec.valid)?;
            observations.push(Observation { time, temp: rec.temp });
        }

        tracing::info!("Loaded {} observation records", observations.len());
        Ok(ObservationIndex::new(observations))
    }
}

fn parse_observation_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .with_context(|| format!("Invalid observation timestamp '{value}'"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    const EXTRACT_HEADER: &str = "date,hour,temp,temp_min,temp_max,temp_dew,temp_surf,\
        wind_speed,wind_dir,cloud_low,cloud_medium,sea_press,rad_sw_dir_down,rad_lw_down,heat_flux";

    fn write_extract(dir: &Path, run_id: &str, hours: usize) {
        let mut f = fs::File::create(dir.join(format!("{run_id}.csv"))).unwrap();
        writeln!(f, "{EXTRACT_HEADER}").unwrap();
        for h in 0..hours {
            writeln!(
                f,
                "20230601,{h:02}00,288.15,287.15,289.15,283.15,290.15,5.0,180.0,0.25,0.5,101300.0,120.5,310.2,-15.0"
            )
            .unwrap();
        }
    }

    #[test]
    fn test_load_run_extract() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), "20230601T0000Z", 15);

        let loader = RunExtractLoader::new(dir.path(), 15);
        let run = loader.load_run("20230601T0000Z").unwrap();
        assert_eq!(run.rows.len(), 15);
        assert_eq!(run.rows[3].hour, "0300");
        assert_eq!(run.rows[0].temp, 288.15);
    }

    #[test]
    fn test_wrong_row_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_extract(dir.path(), "20230601T0000Z", 12);

        let loader = RunExtractLoader::new(dir.path(), 15);
        assert!(loader.load_run("20230601T0000Z").is_err());
    }

    #[test]
    fn test_missing_extract_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RunExtractLoader::new(dir.path(), 15);
        assert!(loader.load_run("20230601T0000Z").is_err());
    }

    #[test]
    fn test_missing_archive_is_fatal() {
        let loader = ObservationArchiveLoader::new("/nonexistent/archive.csv");
        let err = loader.load().unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_archive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "valid,temp").unwrap();
        writeln!(f, "2023-06-01 09:20,16.0").unwrap();
        writeln!(f, "2023-06-01 07:20,14.0").unwrap();

        let index = ObservationArchiveLoader::new(&path).load().unwrap();
        assert_eq!(index.len(), 2);
        let all = index.between(
            parse_observation_time("2023-06-01 00:00").unwrap(),
            parse_observation_time("2023-06-01 23:59").unwrap(),
        );
        assert_eq!(all[0].temp, 14.0);
        assert_eq!(all[1].temp, 16.0);
    }
}
