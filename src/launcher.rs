//! Task launching abstraction standing in for a real cluster scheduler.
//!
//! The original source submits mapper/reducer pods to a Kubernetes cluster
//! and polls pod status by label (`pkg/master/master.go`'s `launchJobs` /
//! `waitForJobsToComplete`). [`Launcher`] generalizes that "submit, then poll
//! by label" contract behind a trait (redesign flag: no Kubernetes client in
//! this crate), with [`LocalProcessLauncher`] as the only production
//! implementation — it spawns the same binary as a child process per task.

use anyhow::{Context, Result};
use std::process::{Child, Command};
use std::sync::Mutex;

/// One unit of work to launch: a mapper or reducer invocation of the binary
/// itself, identified by `label` (the phase, e.g. `"map"` or `"reduce"`) so
/// the controller can poll for completion of an entire phase at once.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub id: String,
    pub label: String,
    pub args: Vec<String>,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, args: Vec<String>) -> Self {
        Self { id: id.into(), label: label.into(), args }
    }
}

/// A task's last-observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

/// Submits [`TaskSpec`]s and reports their status by label. Implementations
/// need not be synchronous internally, but `list_by_label` must reflect the
/// latest known status at the time it's called — the controller's phase
/// barrier polls this in a loop (spec.md §4.1).
pub trait Launcher: Send + Sync {
    /// The orchestrator's reported node count, queried once at controller
    /// startup (spec.md §4.5 step 1) and used to bound `--num-mappers` /
    /// `--num-reducers`.
    fn capacity(&self) -> Result<usize>;
    fn submit(&self, spec: TaskSpec) -> Result<()>;
    fn list_by_label(&self, label: &str) -> Result<Vec<TaskStatus>>;
}

/// Returns true once every task submitted under `label` has succeeded, and
/// at least one was submitted.
pub fn phase_complete(launcher: &dyn Launcher, label: &str) -> Result<bool> {
    let statuses = launcher.list_by_label(label)?;
    Ok(!statuses.is_empty() && statuses.iter().all(|s| *s == TaskStatus::Succeeded))
}

/// True if any task under `label` has failed — the controller treats this as
/// fatal rather than waiting out the rest of the phase.
pub fn phase_failed(launcher: &dyn Launcher, label: &str) -> Result<bool> {
    let statuses = launcher.list_by_label(label)?;
    Ok(statuses.iter().any(|s| *s == TaskStatus::Failed))
}

struct Handle {
    label: String,
    child: Child,
    exit_status: Option<bool>,
}

/// Launches each task as a child process running the current binary with
/// `spec.args`, polling [`std::process::Child::try_wait`] for completion.
/// Exit code 0 is success; anything else is [`TaskStatus::Failed`].
pub struct LocalProcessLauncher {
    handles: Mutex<Vec<Handle>>,
}

impl LocalProcessLauncher {
    pub fn new() -> Self {
        Self { handles: Mutex::new(Vec::new()) }
    }
}

impl Default for LocalProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for LocalProcessLauncher {
    /// A single machine running this launcher is its own cluster; capacity
    /// is its available parallelism.
    fn capacity(&self) -> Result<usize> {
        Ok(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    fn submit(&self, spec: TaskSpec) -> Result<()> {
        let exe = std::env::current_exe().context("resolve current executable path")?;
        let child = Command::new(exe).args(&spec.args).spawn().with_context(|| format!("spawn task {}", spec.id))?;
        tracing::info!(task_id = %spec.id, label = %spec.label, "submitted task");
        self.handles.lock().unwrap().push(Handle { label: spec.label, child, exit_status: None });
        Ok(())
    }

    fn list_by_label(&self, label: &str) -> Result<Vec<TaskStatus>> {
        let mut handles = self.handles.lock().unwrap();
        let mut statuses = Vec::new();
        for handle in handles.iter_mut().filter(|h| h.label == label) {
            if handle.exit_status.is_none() {
                if let Some(status) = handle.child.try_wait().context("poll child process status")? {
                    handle.exit_status = Some(status.success());
                }
            }
            statuses.push(match handle.exit_status {
                Some(true) => TaskStatus::Succeeded,
                Some(false) => TaskStatus::Failed,
                None => TaskStatus::Running,
            });
        }
        Ok(statuses)
    }
}
