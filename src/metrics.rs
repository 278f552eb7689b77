//! Controller-reported phase timings.
//!
//! The original source logs elapsed time for each phase to stdout and
//! nothing else. `SPEC_FULL.md` §10's ambient-stack expansion keeps that
//! human-readable report but also makes the timings structured (`serde`) so
//! a caller can persist them alongside a job's output.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct PhaseTimings {
    pub map_phase: Duration,
    pub reduce_phase: Duration,
    pub total: Duration,
}

impl PhaseTimings {
    pub fn new(map_phase: Duration, reduce_phase: Duration) -> Self {
        Self { map_phase, reduce_phase, total: map_phase + reduce_phase }
    }

    /// Human-readable summary to stdout, matching the original's
    /// end-of-job timing log.
    pub fn print(&self) {
        println!("map phase:    {:.3}s", self.map_phase.as_secs_f64());
        println!("reduce phase: {:.3}s", self.reduce_phase.as_secs_f64());
        println!("total:        {:.3}s", self.total.as_secs_f64());
    }

    /// Structured equivalent of [`Self::print`], logged at `info` level.
    pub fn log(&self) {
        tracing::info!(map_phase_secs = self.map_phase.as_secs_f64(), reduce_phase_secs = self.reduce_phase.as_secs_f64(), total_secs = self.total.as_secs_f64(), "job complete");
    }

    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Json {
            map_phase_secs: f64,
            reduce_phase_secs: f64,
            total_secs: f64,
        }
        let json = Json { map_phase_secs: self.map_phase.as_secs_f64(), reduce_phase_secs: self.reduce_phase.as_secs_f64(), total_secs: self.total.as_secs_f64() };
        serde_json::to_string_pretty(&json).context("serialize phase timings")
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(json.as_bytes()).with_context(|| format!("write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_sums_both_phases_into_total() {
        let timings = PhaseTimings::new(Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(timings.total, Duration::from_secs(15));
    }

    #[test]
    fn to_json_includes_all_three_fields() {
        let timings = PhaseTimings::new(Duration::from_secs(2), Duration::from_secs(3));
        let json = timings.to_json().unwrap();
        assert!(json.contains("map_phase_secs"));
        assert!(json.contains("reduce_phase_secs"));
        assert!(json.contains("total_secs"));
    }

    #[test]
    fn save_to_file_writes_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timings.json");
        let timings = PhaseTimings::new(Duration::from_secs(1), Duration::from_secs(1));
        timings.save_to_file(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("total_secs"));
    }
}
