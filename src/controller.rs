//! Controller: validates the job, partitions inputs, launches mappers and
//! reducers in sequence, and reports phase timings.
//!
//! Mirrors the original source's `master.go` sequence: build a launcher,
//! query capacity, validate, partition inputs, launch the map phase, block
//! at the barrier, launch the reduce phase, block again.

use anyhow::{Context, Result};
use std::fs;
use std::time::{Duration, Instant};

use crate::config::{validate_master_config, MasterConfig};
use crate::job::{self, FileRange, Job};
use crate::launcher::{phase_complete, phase_failed, Launcher, TaskSpec};
use crate::metrics::PhaseTimings;

/// Default phase-barrier poll interval (spec.md §4.5.2).
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[cfg(unix)]
fn make_world_writable_dir(dir: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o777)).with_context(|| format!("chmod 0777 {}", dir.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_world_writable_dir(dir: &std::path::Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))
}

fn map_label(job_id: &str) -> String {
    format!("{job_id}-mapper")
}

fn reduce_label(job_id: &str) -> String {
    format!("{job_id}-reducer")
}

/// Block until every task under `label` has succeeded, polling every
/// `poll_interval`. A failed task is fatal immediately rather than waiting
/// out the rest of the phase.
fn await_phase(launcher: &dyn Launcher, label: &str, poll_interval: Duration) -> Result<()> {
    loop {
        if phase_failed(launcher, label)? {
            anyhow::bail!("a task in phase {label:?} failed");
        }
        if phase_complete(launcher, label)? {
            return Ok(());
        }
        tracing::info!(phase = %label, "waiting for phase to complete");
        std::thread::sleep(poll_interval);
    }
}

fn launch_mappers(job: &Job, ranges: &[FileRange], launcher: &dyn Launcher) -> Result<String> {
    let label = map_label(&job.job_id);
    for (i, range) in ranges.iter().enumerate() {
        let args = vec![
            "--mode".to_string(),
            "mapper".to_string(),
            "--input-dir".to_string(),
            job.input_dir.to_string_lossy().into_owned(),
            "--output-dir".to_string(),
            job.mapper_dir(i).to_string_lossy().into_owned(),
            "--file-range".to_string(),
            range.render(),
            "--num-reducers".to_string(),
            job.num_reducers.to_string(),
        ];
        launcher.submit(TaskSpec::new(job::mapper_id(i), label.clone(), args)).with_context(|| format!("submit mapper {i}"))?;
    }
    Ok(label)
}

fn launch_reducers(job: &Job, launcher: &dyn Launcher) -> Result<String> {
    let label = reduce_label(&job.job_id);
    for r in 0..job.num_reducers {
        let args = vec![
            "--mode".to_string(),
            "reducer".to_string(),
            "--nfs-path".to_string(),
            job.job_dir().to_string_lossy().into_owned(),
            "--output-dir".to_string(),
            job.job_dir().to_string_lossy().into_owned(),
            "--reducer-id".to_string(),
            r.to_string(),
            "--num-reducers".to_string(),
            job.num_reducers.to_string(),
        ];
        launcher.submit(TaskSpec::new(format!("reducer-{r}"), label.clone(), args)).with_context(|| format!("submit reducer {r}"))?;
    }
    Ok(label)
}

/// Run a job to completion. `timestamp` stamps the job id (`job-<timestamp>`)
/// and is supplied by the caller so this function stays pure and testable.
pub fn run(timestamp: &str, config: &MasterConfig, launcher: &dyn Launcher) -> Result<PhaseTimings> {
    run_with_poll_interval(timestamp, config, launcher, POLL_INTERVAL)
}

fn run_with_poll_interval(timestamp: &str, config: &MasterConfig, launcher: &dyn Launcher, poll_interval: Duration) -> Result<PhaseTimings> {
    let capacity = launcher.capacity().context("query cluster capacity")?;
    validate_master_config(config, capacity)?;

    let job = Job::new(timestamp, config.input_dir.clone(), config.nfs_path.clone(), config.image.clone(), config.num_mappers, config.num_reducers);
    make_world_writable_dir(&job.job_dir())?;

    let files = job::list_input_files(&config.input_dir)?;
    let ranges = job::partition_input_files(&files, job.num_mappers)?;

    let map_start = Instant::now();
    let label = launch_mappers(&job, &ranges, launcher)?;
    await_phase(launcher, &label, poll_interval)?;
    let map_phase = map_start.elapsed();

    let reduce_start = Instant::now();
    let label = launch_reducers(&job, launcher)?;
    await_phase(launcher, &label, poll_interval)?;
    let reduce_phase = reduce_start.elapsed();

    let timings = PhaseTimings::new(map_phase, reduce_phase);
    timings.log();
    Ok(timings)
}
