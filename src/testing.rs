//! Test fixtures shared by this crate's own test suites.
//!
//! Grounded in the teacher's own `testing` support module: a handful of
//! small, composable helpers rather than a heavyweight test harness.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::launcher::{Launcher, TaskSpec, TaskStatus};

/// A scratch directory that cleans itself up on drop, with a couple of path
/// helpers matching this crate's on-disk layout conventions.
pub struct TempJobDir {
    root: TempDir,
}

impl TempJobDir {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { root: TempDir::new()? })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn subdir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

/// Reads a `key,value` text file into an ordered vector of pairs, skipping
/// lines without a comma. Used by tests asserting on partition/output file
/// contents without duplicating the merger's own parsing logic.
pub fn read_kv_lines(path: &Path) -> Vec<(String, String)> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .filter_map(|line| line.split_once(',').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect()
}

/// A [`Launcher`] that records submitted tasks and reports every task as
/// immediately [`TaskStatus::Succeeded`] — lets controller tests exercise
/// the phase-sequencing logic without spawning real processes.
pub struct MockLauncher {
    submitted: Mutex<Vec<TaskSpec>>,
    capacity: usize,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self { submitted: Mutex::new(Vec::new()), capacity: 8 }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { submitted: Mutex::new(Vec::new()), capacity }
    }

    pub fn submitted_labels(&self) -> Vec<String> {
        self.submitted.lock().unwrap().iter().map(|s| s.label.clone()).collect()
    }

    pub fn submitted_count(&self, label: &str) -> usize {
        self.submitted.lock().unwrap().iter().filter(|s| s.label == label).count()
    }

    pub fn submitted_specs(&self) -> Vec<TaskSpec> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for MockLauncher {
    fn capacity(&self) -> anyhow::Result<usize> {
        Ok(self.capacity)
    }

    fn submit(&self, spec: TaskSpec) -> anyhow::Result<()> {
        self.submitted.lock().unwrap().push(spec);
        Ok(())
    }

    fn list_by_label(&self, label: &str) -> anyhow::Result<Vec<TaskStatus>> {
        let submitted = self.submitted.lock().unwrap();
        Ok(submitted.iter().filter(|s| s.label == label).map(|_| TaskStatus::Succeeded).collect())
    }
}
