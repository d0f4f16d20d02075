//! Task/solution/verification state machine.
//!
//! Owns the single active task slot. All mutation happens on the event-loop
//! task; network completions arrive as events and are applied through the
//! `complete_*` methods, which discard anything stale. Overlapping generate /
//! create-custom calls are serialized with a monotonically increasing
//! generation tag: a completion whose tag is older than the latest issued one
//! is dropped, so a slower first call can never overwrite the result of a
//! faster later one. Solution and verify completions are instead keyed by
//! task id, which changes whenever the active task is replaced.

use tracing::debug;

use crate::api::types::{Solution, Task, TaskId, VerificationResult};
use crate::api::ApiError;

/// Where the session is in its lifecycle. `Generating` and `Verifying` are
/// in-flight; the rest are stable and reachable again after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Ready,
    SolutionVisible,
    Verifying,
    Verified,
}

pub struct TaskSession {
    phase: Phase,
    task: Option<Task>,
    /// Cached solution, keyed by the task it was fetched for. The key is
    /// held here rather than read from the wire: some service builds omit
    /// `Solution.task_id`, and memoization must not depend on that.
    solution: Option<(TaskId, Solution)>,
    verification: Option<VerificationResult>,
    /// Inline error banner; at most one, replaced or cleared by the next
    /// attempted operation.
    error: Option<String>,
    next_generation: u64,
    /// Tag of the latest issued mutating call; older completions are stale.
    current_generation: u64,
    /// Task id of an in-flight solution fetch, if any.
    pending_fetch: Option<TaskId>,
    /// Task id an in-flight verify was issued against, if any.
    pending_verify: Option<TaskId>,
}

impl TaskSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            task: None,
            solution: None,
            verification: None,
            error: None,
            next_generation: 0,
            current_generation: 0,
            pending_fetch: None,
            pending_verify: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref().map(|(_, solution)| solution)
    }

    pub fn verification(&self) -> Option<&VerificationResult> {
        self.verification.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while any network operation is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Generating | Phase::Verifying) || self.pending_fetch.is_some()
    }

    pub fn is_fetching_solution(&self) -> bool {
        self.pending_fetch.is_some()
    }

    /// The stable state the session falls back to after a failed operation:
    /// whatever the already-committed data still supports.
    fn stable_phase(&self) -> Phase {
        if self.verification.is_some() {
            Phase::Verified
        } else if self.solution.is_some() {
            Phase::SolutionVisible
        } else if self.task.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    fn allocate_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.current_generation = self.next_generation;
        self.next_generation
    }

    /// Start a random-task request. Returns the generation tag the completion
    /// must carry.
    pub fn begin_generate(&mut self) -> u64 {
        self.error = None;
        self.phase = Phase::Generating;
        self.allocate_generation()
    }

    /// Start a custom-task submission. Same serialization discipline as
    /// `begin_generate`; the response already carries the full task, so no
    /// follow-up fetch is needed to display it.
    pub fn begin_create(&mut self) -> u64 {
        self.error = None;
        self.phase = Phase::Generating;
        self.allocate_generation()
    }

    /// Apply the completion of a generate/create call. Success adopts the new
    /// task and invalidates everything bound to the previous task id; failure
    /// leaves the previous task untouched and surfaces the error.
    pub fn complete_task(&mut self, generation: u64, result: Result<Task, ApiError>) {
        if generation != self.current_generation {
            debug!(
                generation,
                current = self.current_generation,
                "discarding stale task completion"
            );
            return;
        }
        match result {
            Ok(task) => {
                self.task = Some(task);
                self.solution = None;
                self.verification = None;
                self.pending_fetch = None;
                self.pending_verify = None;
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = self.stable_phase();
            }
        }
    }

    /// Start a solution fetch for the active task. Returns the task id to
    /// fetch, or `None` when there is nothing to do: no active task, a fetch
    /// already in flight, or the solution for this task already cached (a
    /// repeat call must not issue a second round-trip).
    pub fn begin_fetch_solution(&mut self) -> Option<TaskId> {
        let task_id = self.task.as_ref()?.task_id;
        if self.pending_fetch.is_some() {
            return None;
        }
        if self.solution.as_ref().is_some_and(|(held, _)| *held == task_id) {
            // Memoized: surface the cached solution again. Still an
            // attempted operation, so the error banner clears here too.
            self.error = None;
            self.phase = Phase::SolutionVisible;
            return None;
        }
        self.error = None;
        self.pending_fetch = Some(task_id);
        Some(task_id)
    }

    /// Apply a solution completion. Dropped when the active task has changed
    /// since the fetch was issued.
    pub fn complete_solution(&mut self, task_id: TaskId, result: Result<Solution, ApiError>) {
        if self.task.as_ref().map(|t| t.task_id) != Some(task_id) {
            debug!(task_id, "discarding solution for superseded task");
            return;
        }
        if self.pending_fetch != Some(task_id) {
            return;
        }
        self.pending_fetch = None;
        match result {
            Ok(solution) => {
                self.solution = Some((task_id, solution));
                self.phase = Phase::SolutionVisible;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = self.stable_phase();
            }
        }
    }

    /// Start a verification. No-op without an active task, a fetched
    /// solution, or an answer. Returns the (task_id, answer) pair to submit.
    pub fn begin_verify(&mut self, answer: Option<i64>) -> Option<(TaskId, i64)> {
        self.task.as_ref()?;
        let (_, solution) = self.solution.as_ref()?;
        let answer = answer?;
        if self.pending_verify.is_some() {
            return None;
        }
        // TODO: drop this fallback once the solution endpoint always echoes
        // task_id; inherited from the web client, which submits id 1 when the
        // field is missing.
        let task_id = solution.task_id.unwrap_or(1);
        self.error = None;
        self.phase = Phase::Verifying;
        self.pending_verify = Some(task_id);
        Some((task_id, answer))
    }

    /// Apply a verify completion. A result the active task no longer waits
    /// for is dropped; otherwise it overwrites the prior verification.
    pub fn complete_verify(&mut self, task_id: TaskId, result: Result<VerificationResult, ApiError>) {
        if self.pending_verify != Some(task_id) {
            debug!(task_id, "discarding verification for superseded task");
            return;
        }
        self.pending_verify = None;
        match result {
            Ok(verification) => {
                self.verification = Some(verification);
                self.phase = Phase::Verified;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = self.stable_phase();
            }
        }
    }
}

impl Default for TaskSession {
    fn default() -> Self {
        Self::new()
    }
}
