use crate::api::types::{CustomTaskRequest, TaskId};
use crate::app::event::Generation;

/// Side effects the event loop performs after a state transition. Network
/// actions are spawned; their completions come back as `AppEvent`s.
#[derive(Debug, PartialEq)]
pub enum Action {
    Generate { generation: Generation },
    CreateCustom { generation: Generation, request: CustomTaskRequest },
    FetchSolution { task_id: TaskId },
    Verify { task_id: TaskId, solution: i64 },
    Quit,
}
