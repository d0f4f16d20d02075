use crossterm::event::Event as CrosstermEvent;

use crate::api::types::{Solution, Task, TaskId, VerificationResult};
use crate::api::ApiError;

/// Tag serializing overlapping generate/create-custom calls.
pub type Generation = u64;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Completion of a generate or create-custom round-trip. `custom`
    /// distinguishes the chained solution fetch the custom flow performs.
    TaskReady {
        generation: Generation,
        custom: bool,
        result: Result<Task, ApiError>,
    },

    /// Completion of a solution fetch, keyed by the task it was issued for.
    SolutionReady {
        task_id: TaskId,
        result: Result<Solution, ApiError>,
    },

    /// Completion of a verification round-trip.
    VerifyReady {
        task_id: TaskId,
        result: Result<VerificationResult, ApiError>,
    },

    /// Result of the startup auth probe.
    Auth {
        authenticated: bool,
        username: Option<String>,
    },

    /// Tick for polling schedules, transient feedback, and UI refresh
    Tick,
}
