//! Wire types for the System-Solver challenge service.
//!
//! Field names mirror the JSON the service emits; everything here is a plain
//! data carrier owned by the session once deserialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side primary key of a challenge task.
pub type TaskId = i64;

/// 4x4 linear coefficient matrix, row-major. The service always produces
/// exactly four rows of four finite entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub linear: [[f64; 4]; 4],
}

/// Initial state of the system at t = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
    pub w0: f64,
}

impl InitialConditions {
    pub fn as_array(&self) -> [f64; 4] {
        [self.x0, self.y0, self.z0, self.w0]
    }
}

/// Per-row symbolic markup for the system, plus an optional combined form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquationPreview {
    #[serde(default)]
    pub dx_dt: String,
    #[serde(default)]
    pub dy_dt: String,
    #[serde(default)]
    pub dz_dt: String,
    #[serde(default)]
    pub dw_dt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_latex: Option<String>,
}

impl EquationPreview {
    /// Rows in display order.
    pub fn rows(&self) -> [&str; 4] {
        [&self.dx_dt, &self.dy_dt, &self.dz_dt, &self.dw_dt]
    }
}

/// A generated or custom-submitted challenge task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub coefficients: Coefficients,
    pub initial_conditions: InitialConditions,
    pub target_time: f64,
    #[serde(default)]
    pub equation_preview: EquationPreview,
}

/// Metrics the service recomputes from the final state vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetrics {
    #[serde(default)]
    pub weighted_sum: f64,
    #[serde(default)]
    pub arc_length: f64,
    #[serde(default)]
    pub curvature: f64,
    pub final_solution: i64,
}

/// Ordered symbolic derivation. Older service builds returned a single blob;
/// current ones return one string per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivationSteps {
    Many(Vec<String>),
    One(String),
}

impl DerivationSteps {
    pub fn steps(&self) -> &[String] {
        match self {
            DerivationSteps::Many(steps) => steps,
            DerivationSteps::One(step) => std::slice::from_ref(step),
        }
    }
}

impl Default for DerivationSteps {
    fn default() -> Self {
        DerivationSteps::Many(Vec::new())
    }
}

/// Computed solution for a task. Valid only while its `task_id` matches the
/// active task; the session discards it on task change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    // Some service builds omit this field; verification then falls back to
    // a default id (see TaskSession::begin_verify).
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub final_values: [f64; 4],
    pub recalculated_metrics: SolutionMetrics,
    #[serde(default)]
    pub latex_solution: DerivationSteps,
}

/// Outcome of comparing a submitted integer against the server ground truth.
/// Ephemeral: each verify call overwrites the previous result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub task_id: TaskId,
    pub submitted_solution: i64,
    pub ground_truth: Option<i64>,
    pub is_correct: bool,
    // The service does not send a timestamp; stamped at completion time.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

/// Body for POST /api/create_custom/.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTaskRequest {
    pub coefficients: Coefficients,
    pub initial_conditions: InitialConditions,
    pub target_time: f64,
}

/// Body for POST /api/verify/.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub task_id: TaskId,
    pub solution: i64,
}

/// Response of GET /api/user/. The auth subsystem is external; only the
/// boolean is consulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_response() {
        let json = r#"{
            "task_id": 42,
            "coefficients": {"linear": [[1,1,1,1],[1,1,1,1],[1,1,1,1],[1,1,1,1]]},
            "initial_conditions": {"x0": 0.5, "y0": 0.5, "z0": 0.5, "w0": 0.5},
            "target_time": 1.0,
            "equation_preview": {
                "dx_dt": "\\frac{dx}{dt} = x + y + z + w",
                "dy_dt": "\\frac{dy}{dt} = x + y + z + w",
                "dz_dt": "\\frac{dz}{dt} = x + y + z + w",
                "dw_dt": "\\frac{dw}{dt} = x + y + z + w"
            }
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.task_id, 42);
        assert_eq!(task.coefficients.linear[3][3], 1.0);
        assert_eq!(task.initial_conditions.as_array(), [0.5; 4]);
        assert!(task.equation_preview.rows()[0].contains("dx"));
        assert!(task.equation_preview.raw_latex.is_none());
    }

    #[test]
    fn parses_solution_with_step_list() {
        let json = r#"{
            "task_id": 7,
            "final_values": [1.25, -0.5, 3.0, 0.0],
            "recalculated_metrics": {
                "weighted_sum": 4.1, "arc_length": 2.0,
                "curvature": 0.3, "final_solution": 17
            },
            "latex_solution": ["step one", "step two"]
        }"#;
        let solution: Solution = serde_json::from_str(json).unwrap();
        assert_eq!(solution.task_id, Some(7));
        assert_eq!(solution.final_values.len(), 4);
        assert_eq!(solution.recalculated_metrics.final_solution, 17);
        assert_eq!(solution.latex_solution.steps().len(), 2);
    }

    #[test]
    fn parses_solution_with_single_blob_and_missing_task_id() {
        let json = r#"{
            "final_values": [0.0, 0.0, 0.0, 0.0],
            "recalculated_metrics": {"final_solution": 0},
            "latex_solution": "one big blob"
        }"#;
        let solution: Solution = serde_json::from_str(json).unwrap();
        assert_eq!(solution.task_id, None);
        assert_eq!(solution.latex_solution.steps(), ["one big blob"]);
    }

    #[test]
    fn parses_verification_result() {
        let json = r#"{
            "task_id": 7,
            "submitted_solution": 42,
            "ground_truth": 17,
            "is_correct": false
        }"#;
        let result: VerificationResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.submitted_solution, 42);
        assert_eq!(result.ground_truth, Some(17));
    }
}
