// ============================================================
// Layer 4 — Run Filter
// ============================================================
// Some forecast runs are flagged as corrupted by an external
// quality gate, which publishes a flat file of run ids to skip.
// Filtering is a pure set difference — no state beyond the two
// input collections — and the absence of the ignore file means
// "skip no runs".

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Drop every run whose id appears in `known_bad`.
/// Returns the survivors in input order plus the excluded count.
pub fn filter_runs(runs: Vec<String>, known_bad: &HashSet<String>) -> (Vec<String>, usize) {
    let before = runs.len();
    let kept: Vec<String> = runs.into_iter().filter(|r| !known_bad.contains(r)).collect();
    let excluded = before - kept.len();
    (kept, excluded)
}

/// Read the quality-gate ignore list: one run id per line,
/// blank lines skipped. A missing file is not an error — the
/// gate simply has nothing to report yet.
pub fn load_ignore_list(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        tracing::debug!("No ignore list at '{}' — skipping no runs", path.display());
        return Ok(HashSet::new());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Cannot read ignore list '{}'", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn runs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_is_set_difference() {
        let bad: HashSet<String> = ["20230601T0600Z".to_string()].into_iter().collect();
        let (kept, excluded) = filter_runs(runs(&["20230601T0300Z", "20230601T0600Z", "20230601T0900Z"]), &bad);
        assert_eq!(kept, runs(&["20230601T0300Z", "20230601T0900Z"]));
        assert_eq!(excluded, 1);
    }

    #[test]
    fn test_empty_bad_set_keeps_everything() {
        let (kept, excluded) = filter_runs(runs(&["a", "b"]), &HashSet::new());
        assert_eq!(kept.len(), 2);
        assert_eq!(excluded, 0);
    }

    #[test]
    fn test_missing_ignore_file_means_empty_set() {
        let set = load_ignore_list(Path::new("/nonexistent/quality.ignore")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_ignore_list_trims_and_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.ignore");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "20230601T0600Z").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "  20230601T0900Z  ").unwrap();

        let set = load_ignore_list(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("20230601T0600Z"));
        assert!(set.contains("20230601T0900Z"));
    }
}
