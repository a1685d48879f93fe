// ============================================================
// Layer 3 — Run Domain Types
// ============================================================
// A Run is one NWP model initialization: an id encoding the
// init time plus one extract row per forecast hour. The rows
// arrive from the (external) grid-extraction step; by the time
// a Run exists here every field is either a real measurement
// or the missing-value sentinel. The core only ever reads runs.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Run ids look like `20230601T0600Z` — init time in UTC.
pub const RUN_ID_FORMAT: &str = "%Y%m%dT%H%MZ";

/// Hours of day (UTC) at which the NWP model initializes.
pub const RUN_HOURS: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 21];

/// Parse a run id into its initialization time.
pub fn parse_run_time(run_id: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(run_id, RUN_ID_FORMAT)
        .with_context(|| format!("Invalid run id '{run_id}'"))
}

/// Every run id in `[start, end]`, eight per day, in
/// chronological order. Which of them actually exist on disk is
/// the loader's problem, not ours.
pub fn generate_run_ids(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut ids = Vec::new();
    let mut day = start;
    while day <= end {
        for hour in RUN_HOURS {
            let init = day.and_hms_opt(hour, 0, 0).expect("run hours are valid times of day");
            ids.push(init.format(RUN_ID_FORMAT).to_string());
        }
        day += chrono::Duration::days(1);
    }
    ids
}

/// One hour of raw extract values for the station grid point.
///
/// Units are as the NWP model emits them (Kelvin, m/s, Pa,
/// cloud fractions); the radiation and flux fields are already
/// in model units and pass through the transform unconverted.
/// Any numeric field may hold the sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourRow {
    /// Valid date of this forecast hour, `YYYYMMDD`
    pub date: String,

    /// Valid time of this forecast hour, `HHMM`
    pub hour: String,

    /// Screen-level temperature, Kelvin
    pub temp: f64,
    /// Hourly minimum screen-level temperature, Kelvin
    pub temp_min: f64,
    /// Hourly maximum screen-level temperature, Kelvin
    pub temp_max: f64,
    /// Screen-level dew point, Kelvin
    pub temp_dew: f64,
    /// Surface temperature, Kelvin
    pub temp_surf: f64,

    /// 10m wind speed, m/s
    pub wind_speed: f64,
    /// 10m wind direction, degrees from north
    pub wind_dir: f64,

    /// Low cloud amount, fraction [0,1]
    pub cloud_low: f64,
    /// Medium cloud amount, fraction [0,1]
    pub cloud_medium: f64,

    /// Mean sea-level pressure, Pa
    pub sea_press: f64,

    /// Direct downward shortwave radiation flux, W/m²
    pub rad_sw_dir_down: f64,
    /// Downward longwave radiation flux, W/m²
    pub rad_lw_down: f64,
    /// Sensible heat flux at the surface, W/m²
    pub heat_flux: f64,
}

/// One forecast run: id, init time, and its hourly extract rows.
#[derive(Debug, Clone)]
pub struct Run {
    /// Run identifier, e.g. `20230601T0600Z`
    pub id: String,

    /// Initialization time parsed from the id
    pub init_time: NaiveDateTime,

    /// One row per forecast hour, in forecast order
    pub rows: Vec<HourRow>,
}

impl Run {
    /// Build a Run from an id and its extract rows.
    /// Fails on an unparseable id — that is a malformed input,
    /// not a missing measurement.
    pub fn new(id: impl Into<String>, rows: Vec<HourRow>) -> Result<Self> {
        let id = id.into();
        let init_time = parse_run_time(&id)?;
        Ok(Self { id, init_time, rows })
    }

    /// Init hour-of-day in `HHMM` split form, used for the
    /// run-time cyclical encoding.
    pub fn init_hour_minute(&self) -> (u32, u32) {
        (self.init_time.hour(), self.init_time.minute())
    }
}
