//! Debounced rebuild scheduling.
//!
//! Change notifications for icon sources arrive in bursts (editors save in
//! several steps, a `git checkout` touches many files). Each qualifying
//! change is applied to the catalog immediately, but the expensive rebuild
//! only runs once no further change has arrived for the debounce delay.
//!
//! State machine:
//!
//! ```text
//!            qualifying change                 qualifying change
//!   Idle ───────────────────────▶ PendingDebounce ◀──────┐ (deadline replaced)
//!    ▲                                  │ └──────────────┘
//!    │        deadline elapsed:         │
//!    └──── rebuild runs to completion ──┘
//! ```
//!
//! Everything runs on one task: a rebuild is awaited inside the event loop,
//! so changes that arrive meanwhile wait in the channel and can only
//! schedule a later cycle.

use crate::catalog::is_icon_path;
use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Kind of filesystem change reported for an icon source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A source file appeared
    Add,
    /// A source file was removed
    Unlink,
    /// A source file's contents changed
    Change,
}

/// A change notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconChange {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl IconChange {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// What the scheduler drives: catalog mutation per change and the rebuild.
// Driven from a single task; the futures need not be Send.
#[allow(async_fn_in_trait)]
pub trait RebuildTarget {
    /// Apply one qualifying change to the icon catalog. Returns `false`
    /// when the catalog was left untouched and no rebuild is needed.
    async fn apply_change(&mut self, change: &IconChange) -> Result<bool>;

    /// Run one full rebuild cycle.
    async fn rebuild(&mut self) -> Result<()>;
}

/// Decides which changes concern the icon sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    source_dir: PathBuf,
}

impl ChangeFilter {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// `true` for `.svg` paths inside the source directory, and for any
    /// unlink below it (a removed directory has no extension to go by).
    pub fn qualifies(&self, change: &IconChange) -> bool {
        let path = change.path.as_path();
        if !path.starts_with(&self.source_dir) {
            return false;
        }
        is_icon_path(path) || (change.kind == ChangeKind::Unlink && path != self.source_dir)
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing pending
    Idle,
    /// A rebuild runs at `deadline` unless another change arrives first
    PendingDebounce { deadline: Instant },
}

/// Coalesces change bursts into single rebuild cycles.
#[derive(Debug)]
pub struct RebuildScheduler<T> {
    target: T,
    filter: ChangeFilter,
    debounce: Duration,
    state: SchedulerState,
    cycles: u64,
    failures: u64,
}

impl<T: RebuildTarget> RebuildScheduler<T> {
    pub fn new(target: T, filter: ChangeFilter, debounce: Duration) -> Self {
        Self {
            target,
            filter,
            debounce,
            state: SchedulerState::Idle,
            cycles: 0,
            failures: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Deadline of the pending rebuild, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::PendingDebounce { deadline } => Some(deadline),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    /// Rebuild cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Rebuild cycles that failed.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Handle one change notification.
    ///
    /// Non-qualifying paths are ignored. A qualifying change is applied to
    /// the catalog and (re)starts the debounce delay; if applying it fails
    /// or touches nothing, the state is left as it was. Returns whether a
    /// rebuild was scheduled.
    pub async fn handle_change(&mut self, change: IconChange) -> bool {
        if !self.filter.qualifies(&change) {
            log::trace!("Ignoring change outside icon sources: {:?}", change.path);
            return false;
        }

        match self.target.apply_change(&change).await {
            Ok(true) => {
                self.schedule();
                true
            }
            Ok(false) => {
                log::trace!(
                    "{:?} for {} changed no icons",
                    change.kind,
                    change.path.display()
                );
                false
            }
            Err(e) => {
                log::error!(
                    "Failed to apply {:?} for {}: {:#}",
                    change.kind,
                    change.path.display(),
                    e
                );
                false
            }
        }
    }

    /// Enter (or stay in) `PendingDebounce` with a fresh deadline,
    /// superseding any pending one.
    pub fn schedule(&mut self) {
        let deadline = Instant::now() + self.debounce;
        if let SchedulerState::PendingDebounce { .. } = self.state {
            log::trace!("Debouncing icon font rebuild");
        }
        self.state = SchedulerState::PendingDebounce { deadline };
    }

    /// Run the pending rebuild now and return to `Idle`.
    ///
    /// Failures are logged and counted; there is no retry.
    pub async fn fire(&mut self) -> Result<()> {
        self.state = SchedulerState::Idle;
        self.cycles += 1;
        let started = std::time::Instant::now();

        let result = self.target.rebuild().await;
        match &result {
            Ok(()) => log::info!(
                "Icon font rebuild #{} finished in {:?}",
                self.cycles,
                started.elapsed()
            ),
            Err(e) => {
                self.failures += 1;
                log::error!("Icon font rebuild #{} failed: {:#}", self.cycles, e);
            }
        }
        result
    }

    /// Process change notifications until the channel closes or `shutdown`
    /// completes.
    ///
    /// When the channel closes with a rebuild pending, the scheduler waits
    /// for its deadline and runs it before returning. `shutdown` is only
    /// observed between cycles and discards a pending rebuild.
    pub async fn run(
        &mut self,
        mut changes: UnboundedReceiver<IconChange>,
        shutdown: impl Future<Output = ()>,
    ) {
        tokio::pin!(shutdown);

        loop {
            let deadline = self.deadline();
            let timer = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    if deadline.is_some() {
                        log::info!("Shutting down; discarding pending rebuild");
                    }
                    break;
                }
                change = changes.recv() => match change {
                    Some(change) => {
                        self.handle_change(change).await;
                    }
                    None => {
                        if let Some(deadline) = self.deadline() {
                            tokio::time::sleep_until(deadline).await;
                            let _ = self.fire().await;
                        }
                        log::debug!("Change stream closed");
                        break;
                    }
                },
                _ = timer, if deadline.is_some() => {
                    let _ = self.fire().await;
                }
            }
        }
    }
}
