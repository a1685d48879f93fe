// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The extraction and ingestion components that feed this system
// are external collaborators — the core only depends on these
// interfaces, never on how the records were produced.
//
// By programming against traits instead of concrete types the
// application layer works identically whether runs come from
// the CSV extract on disk or (in tests) from fixtures built in
// memory.

use anyhow::Result;

use crate::domain::observation::ObservationIndex;
use crate::domain::run::Run;

// ─── RunSource ────────────────────────────────────────────────────────────────
/// Any component that can produce the extract rows for a run id.
///
/// Implementations:
///   - RunExtractLoader → reads per-run CSV extracts from a directory
///   - (tests) in-memory fixtures
pub trait RunSource {
    /// Load one run's extract by id. An unreadable or malformed
    /// extract is an error for that run only — callers isolate it
    /// and keep processing the batch.
    fn load_run(&self, run_id: &str) -> Result<Run>;
}

// ─── ObservationSource ────────────────────────────────────────────────────────
/// Any component that can produce the ground-truth archive.
///
/// Implementations:
///   - ObservationArchiveLoader → reads the station archive CSV
pub trait ObservationSource {
    /// Load the full archive into a time-sorted index.
    /// A missing archive is a configuration error and fatal.
    fn load(&self) -> Result<ObservationIndex>;
}
