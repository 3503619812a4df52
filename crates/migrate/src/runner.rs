//! Migration runner - executes hooks in order and records version
//! transitions.
//!
//! Execution is strictly sequential: one unit at a time, one hook at a time,
//! each awaited to completion before the version store is touched again.
//! There is no cancellation mid-run and the engine does not coordinate
//! concurrent runs against the same store; hosts that may race must hold an
//! external advisory lock.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};
use crate::registry::Registry;
use crate::request::RunRequest;
use crate::store::VersionStore;
use crate::unit::{Direction, HookKind, MigrationUnit, Scope};

/// Run-state for one unit, recomputed from the store at the start of every
/// pass. Never persisted on the unit itself.
#[derive(Debug, Clone, Copy, Default)]
struct RunState {
    pre_applied: bool,
    post_applied: bool,
}

impl RunState {
    fn applied(&self, scope: Scope) -> bool {
        match scope {
            Scope::Pre => self.pre_applied,
            Scope::Post => self.post_applied,
        }
    }
}

/// What happened to a single hook slot during a pass.
enum StepOutcome {
    /// The hook is absent; nothing executed and nothing was recorded.
    Skipped,
    /// The hook ran and the version transition (if any) was recorded.
    Completed,
}

/// Outcome of a successful pass.
#[derive(Debug)]
pub struct RunReport {
    pub direction: Direction,
    /// Ordering numbers whose pre-scope hook executed and was recorded.
    pub pre: Vec<i64>,
    /// Ordering numbers whose post-scope hook executed and was recorded.
    pub post: Vec<i64>,
    /// Scope steps skipped because the store already reported them done.
    pub skipped: usize,
    pub execution_time_ms: u128,
}

/// Applied/pending state of one registered unit, as reported by
/// [`MigrationRunner::status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStatus {
    pub number: i64,
    pub label: String,
    pub pre_applied: bool,
    pub post_applied: bool,
}

/// The orchestration state machine.
///
/// Owns the registry for the lifetime of the runner and a handle to the
/// version store; hooks receive clones of that handle.
pub struct MigrationRunner<S> {
    registry: Registry<S>,
    store: S,
}

impl<S> MigrationRunner<S>
where
    S: VersionStore + Clone + Send + Sync + 'static,
{
    pub fn new(registry: Registry<S>, store: S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute one orchestration pass.
    ///
    /// Failure anywhere is terminal for the whole run. A hook failure during
    /// `up` first triggers best-effort compensation scoped to the failing
    /// unit (never to previously-succeeded units). A version write that
    /// fails after its hook succeeded is handled the same way: compensate
    /// the unit, then surface the store error. The engine never retries;
    /// replay (optionally with `force`) is the operator's call.
    pub async fn run(&self, request: &RunRequest) -> MigrateResult<RunReport> {
        request.validate()?;
        let started = Instant::now();
        let states = self.snapshot_run_state().await?;

        let mut report = RunReport {
            direction: request.direction,
            pre: Vec::new(),
            post: Vec::new(),
            skipped: 0,
            execution_time_ms: 0,
        };

        match request.direction {
            Direction::Up => self.run_up(request, &states, &mut report).await?,
            Direction::Down => self.run_down(request, &states, &mut report).await?,
        }

        report.execution_time_ms = started.elapsed().as_millis();
        tracing::info!(
            direction = %report.direction,
            pre = report.pre.len(),
            post = report.post.len(),
            skipped = report.skipped,
            "migration pass complete"
        );
        Ok(report)
    }

    /// Applied/pending state for every registered unit, ascending.
    pub async fn status(&self) -> MigrateResult<Vec<UnitStatus>> {
        let states = self.snapshot_run_state().await?;
        Ok(self
            .registry
            .sorted_ascending()
            .into_iter()
            .map(|unit| {
                let state = states.get(&unit.number()).copied().unwrap_or_default();
                UnitStatus {
                    number: unit.number(),
                    label: unit.label().to_string(),
                    pre_applied: state.pre_applied,
                    post_applied: state.post_applied,
                }
            })
            .collect())
    }

    /// Run the verify hook of every unit applied in at least one scope,
    /// ascending, stopping at the first failure.
    ///
    /// Verification never writes the store. Returns the number of units
    /// whose verify hook ran.
    pub async fn verify(&self) -> MigrateResult<usize> {
        let states = self.snapshot_run_state().await?;
        let mut checked = 0;
        for unit in self.registry.sorted_ascending() {
            let state = states.get(&unit.number()).copied().unwrap_or_default();
            if !state.pre_applied && !state.post_applied {
                continue;
            }
            if let StepOutcome::Completed = self.run_step(unit, HookKind::Verify).await? {
                checked += 1;
            }
        }
        Ok(checked)
    }

    /// Compute per-unit run-state from one store read per scope.
    async fn snapshot_run_state(&self) -> MigrateResult<HashMap<i64, RunState>> {
        let pre = self.store.applied_versions(Scope::Pre).await?;
        let post = self.store.applied_versions(Scope::Post).await?;

        let mut states = HashMap::new();
        for unit in self.registry.sorted_ascending() {
            states.insert(
                unit.number(),
                RunState {
                    pre_applied: pre.contains(&unit.number()),
                    post_applied: post.contains(&unit.number()),
                },
            );
        }
        Ok(states)
    }

    async fn run_up(
        &self,
        request: &RunRequest,
        states: &HashMap<i64, RunState>,
        report: &mut RunReport,
    ) -> MigrateResult<()> {
        for unit in self.registry.sorted_ascending() {
            if let Some(target) = request.target {
                if unit.number() != target {
                    continue;
                }
            }
            let state = states.get(&unit.number()).copied().unwrap_or_default();

            if request.scopes.includes(Scope::Pre) {
                if !state.applied(Scope::Pre) || request.force {
                    match self.run_step(unit, HookKind::Up).await {
                        Ok(StepOutcome::Completed) => report.pre.push(unit.number()),
                        Ok(StepOutcome::Skipped) => {}
                        Err(err) => {
                            self.compensate(unit, HookKind::Down).await;
                            return Err(err);
                        }
                    }
                } else {
                    report.skipped += 1;
                }
            }

            if request.scopes.includes(Scope::Post) {
                if !state.applied(Scope::Post) || request.force {
                    match self.run_step(unit, HookKind::PostUp).await {
                        Ok(StepOutcome::Completed) => report.post.push(unit.number()),
                        Ok(StepOutcome::Skipped) => {}
                        Err(err) => {
                            self.compensate(unit, HookKind::PostDown).await;
                            if request.scopes.includes(Scope::Pre) {
                                self.compensate(unit, HookKind::Down).await;
                            }
                            return Err(err);
                        }
                    }
                } else {
                    report.skipped += 1;
                }
            }
        }
        Ok(())
    }

    async fn run_down(
        &self,
        request: &RunRequest,
        states: &HashMap<i64, RunState>,
        report: &mut RunReport,
    ) -> MigrateResult<()> {
        for unit in self.registry.sorted_descending() {
            if let Some(target) = request.target {
                if unit.number() != target {
                    continue;
                }
            }
            let state = states.get(&unit.number()).copied().unwrap_or_default();

            // Failing to tear down is terminal: no compensation on the way
            // down, the store keeps whatever was recorded.
            if request.scopes.includes(Scope::Post) {
                if state.applied(Scope::Post) || request.force {
                    match self.run_step(unit, HookKind::PostDown).await? {
                        StepOutcome::Completed => report.post.push(unit.number()),
                        StepOutcome::Skipped => {}
                    }
                } else {
                    report.skipped += 1;
                }
            }

            if request.scopes.includes(Scope::Pre) {
                if state.applied(Scope::Pre) || request.force {
                    match self.run_step(unit, HookKind::Down).await? {
                        StepOutcome::Completed => report.pre.push(unit.number()),
                        StepOutcome::Skipped => {}
                    }
                } else {
                    report.skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Run one hook slot and record its version transition.
    ///
    /// An absent hook skips the slot entirely: no execution and no version
    /// record for that scope.
    async fn run_step(&self, unit: &MigrationUnit<S>, kind: HookKind) -> MigrateResult<StepOutcome> {
        let Some(hook) = unit.hook(kind) else {
            tracing::debug!(migration = %unit.label(), hook = %kind, "hook absent, skipping");
            return Ok(StepOutcome::Skipped);
        };

        tracing::info!(migration = %unit.label(), hook = %kind, "running migration hook");
        if let Err(cause) = hook(self.store.clone()).await {
            tracing::error!(
                migration = %unit.label(),
                hook = %kind,
                error = %cause,
                "migration hook failed"
            );
            return Err(MigrateError::Hook {
                number: unit.number(),
                label: unit.label().to_string(),
                kind,
                cause,
            });
        }

        if let (Some(scope), Some(direction)) = (kind.scope(), kind.direction()) {
            match direction {
                Direction::Up => self.store.record_applied(scope, unit.number()).await?,
                Direction::Down => self.store.record_unapplied(scope, unit.number()).await?,
            }
        }
        Ok(StepOutcome::Completed)
    }

    /// Best-effort reversal of the hook that just failed. Failures here are
    /// logged and swallowed; the original error wins.
    async fn compensate(&self, unit: &MigrationUnit<S>, kind: HookKind) {
        if let Err(err) = self.run_step(unit, kind).await {
            tracing::warn!(
                migration = %unit.label(),
                hook = %kind,
                error = %err,
                "compensation hook failed"
            );
        }
    }
}
