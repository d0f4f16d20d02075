use std::time::Instant;

use crate::api::types::{Coefficients, CustomTaskRequest, InitialConditions, Task};
use crate::config::AppConfig;
use crate::export::ClipboardExporter;
use crate::render::EquationRenderer;
use crate::session::TaskSession;

pub const INITIAL_LABELS: [&str; 4] = ["x0", "y0", "z0", "w0"];

/// One editable field of the task form, in navigation order: the 16 matrix
/// cells row-major, then the four initial conditions, then the target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Cell(usize, usize),
    Initial(usize),
    TargetTime,
}

impl FormField {
    fn index(self) -> usize {
        match self {
            FormField::Cell(row, col) => row * 4 + col,
            FormField::Initial(i) => 16 + i,
            FormField::TargetTime => 20,
        }
    }

    fn from_index(index: usize) -> FormField {
        match index {
            0..=15 => FormField::Cell(index / 4, index % 4),
            16..=19 => FormField::Initial(index - 16),
            _ => FormField::TargetTime,
        }
    }
}

/// The custom-task form. Cells hold raw text; numeric coercion happens only
/// when the form is submitted, and anything unparseable becomes 0 rather
/// than being rejected or propagated as NaN.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub cells: [[String; 4]; 4],
    pub initials: [String; 4],
    pub target_time: String,
    pub selected: FormField,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| "1".to_string())),
            initials: std::array::from_fn(|_| "0.5".to_string()),
            target_time: "1.0".to_string(),
            selected: FormField::Cell(0, 0),
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Cell(row, col) => &mut self.cells[row][col],
            FormField::Initial(i) => &mut self.initials[i],
            FormField::TargetTime => &mut self.target_time,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Cell(row, col) => &self.cells[row][col],
            FormField::Initial(i) => &self.initials[i],
            FormField::TargetTime => &self.target_time,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if c.is_ascii_digit() || matches!(c, '.' | '-' | 'e') {
            self.field_mut(self.selected).push(c);
        }
    }

    pub fn delete_back(&mut self) {
        self.field_mut(self.selected).pop();
    }

    pub fn clear_field(&mut self) {
        self.field_mut(self.selected).clear();
    }

    pub fn select_next(&mut self) {
        self.selected = FormField::from_index((self.selected.index() + 1) % 21);
    }

    pub fn select_prev(&mut self) {
        self.selected = FormField::from_index((self.selected.index() + 20) % 21);
    }

    /// Arrow movement within the matrix grid; outside the grid arrows fall
    /// back to linear navigation.
    pub fn move_selection(&mut self, drow: isize, dcol: isize) {
        match self.selected {
            FormField::Cell(row, col) => {
                let new_row = row.wrapping_add_signed(drow);
                let new_col = col.wrapping_add_signed(dcol);
                if new_row < 4 && new_col < 4 {
                    self.selected = FormField::Cell(new_row, new_col);
                } else if drow > 0 || dcol > 0 {
                    self.select_next();
                } else if row > 0 || col > 0 || drow < 0 || dcol < 0 {
                    self.select_prev();
                }
            }
            _ => {
                if drow > 0 || dcol > 0 {
                    self.select_next();
                } else {
                    self.select_prev();
                }
            }
        }
    }

    /// Overwrite the form with a task's values, the way the generate flow
    /// repopulates the editor.
    pub fn load_task(&mut self, task: &Task) {
        for (row, values) in task.coefficients.linear.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                self.cells[row][col] = format_number(*value);
            }
        }
        let initials = task.initial_conditions.as_array();
        for (i, value) in initials.iter().enumerate() {
            self.initials[i] = format_number(*value);
        }
        self.target_time = format_number(task.target_time);
    }

    /// Coerce the form into a request payload. Invalid or non-finite cells
    /// become 0. Target time keeps the web client's quirk: empty, invalid,
    /// or zero falls back to 1.0.
    pub fn to_request(&self) -> CustomTaskRequest {
        let linear =
            std::array::from_fn(|row| std::array::from_fn(|col| coerce(&self.cells[row][col])));
        let [x0, y0, z0, w0] = std::array::from_fn(|i| coerce(&self.initials[i]));
        let time = coerce(&self.target_time);
        CustomTaskRequest {
            coefficients: Coefficients { linear },
            initial_conditions: InitialConditions { x0, y0, z0, w0 },
            target_time: if time == 0.0 { 1.0 } else { time },
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

fn coerce(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn format_number(value: f64) -> String {
    // Shortest round-trip representation; "1" not "1.0000".
    format!("{}", value)
}

/// The integer-answer input of the verification panel.
#[derive(Debug, Clone, Default)]
pub struct AnswerInput {
    pub text: String,
}

impl AnswerInput {
    pub fn insert_char(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '-' && self.text.is_empty()) {
            self.text.push(c);
        }
    }

    pub fn delete_back(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The submitted value, or `None` when empty/invalid (verify is then a
    /// no-op).
    pub fn parse(&self) -> Option<i64> {
        self.text.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Editor,
    Derivation,
    Answer,
}

pub struct AppState {
    pub config: AppConfig,
    pub session: TaskSession,
    pub form: TaskForm,
    pub answer: AnswerInput,
    pub renderer: EquationRenderer,
    pub exporter: ClipboardExporter,
    pub focus: FocusPanel,
    pub derivation_scroll: usize,
    /// None until the startup auth probe completes.
    pub authenticated: Option<bool>,
    pub username: Option<String>,
    pub should_quit: bool,
    pub dirty: bool,
    /// Activity lines drained to the session logger by the event loop.
    pub pending_log: Vec<String>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        renderer: EquationRenderer,
        exporter: ClipboardExporter,
    ) -> Self {
        Self {
            config,
            session: TaskSession::new(),
            form: TaskForm::new(),
            answer: AnswerInput::default(),
            renderer,
            exporter,
            focus: FocusPanel::Editor,
            derivation_scroll: 0,
            authenticated: None,
            username: None,
            should_quit: false,
            dirty: true,
            pending_log: Vec::new(),
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPanel::Editor => FocusPanel::Derivation,
            FocusPanel::Derivation => FocusPanel::Answer,
            FocusPanel::Answer => FocusPanel::Editor,
        };
        self.dirty = true;
    }

    /// One-line summary for the status bar.
    pub fn status_line(&self) -> String {
        use crate::session::Phase;
        if self.session.is_fetching_solution() {
            return "Computing trajectories...".to_string();
        }
        match self.session.phase() {
            Phase::Idle => "No task. F5 generates, Ctrl+R runs the editor.".to_string(),
            Phase::Generating => "Requesting task...".to_string(),
            Phase::Ready => match self.session.task() {
                Some(task) => format!("Task #{} ready. Ctrl+S shows the solution.", task.task_id),
                None => "Task ready.".to_string(),
            },
            Phase::SolutionVisible => "Solution visible. Enter an answer to verify.".to_string(),
            Phase::Verifying => "Verifying...".to_string(),
            Phase::Verified => match self.session.verification() {
                Some(v) if v.is_correct => "Verified: correct.".to_string(),
                Some(_) => "Verified: incorrect.".to_string(),
                None => "Verified.".to_string(),
            },
        }
    }

    /// Advance time-driven pieces (render polling, copy feedback).
    pub fn on_tick(&mut self, now: Instant) {
        if self.renderer.poll_due(now) {
            self.dirty = true;
        }
        if self.exporter.tick(now) {
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_form_matches_the_blank_challenge() {
        let form = TaskForm::new();
        let request = form.to_request();
        assert_eq!(request.coefficients.linear, [[1.0; 4]; 4]);
        assert_eq!(request.initial_conditions.x0, 0.5);
        assert_eq!(request.target_time, 1.0);
    }

    #[test]
    fn invalid_cells_are_coerced_to_zero() {
        let mut form = TaskForm::new();
        form.cells[0][0] = String::new();
        form.cells[1][2] = "abc".to_string();
        form.cells[2][3] = "1.5e".to_string();
        form.initials[1] = "..".to_string();
        let request = form.to_request();
        assert_eq!(request.coefficients.linear[0][0], 0.0);
        assert_eq!(request.coefficients.linear[1][2], 0.0);
        assert_eq!(request.coefficients.linear[2][3], 0.0);
        assert_eq!(request.initial_conditions.y0, 0.0);
    }

    #[test]
    fn non_finite_input_is_coerced_to_zero() {
        let mut form = TaskForm::new();
        form.cells[0][0] = "inf".to_string();
        form.cells[0][1] = "NaN".to_string();
        let request = form.to_request();
        assert_eq!(request.coefficients.linear[0][0], 0.0);
        assert_eq!(request.coefficients.linear[0][1], 0.0);
    }

    #[test]
    fn empty_or_zero_target_time_falls_back_to_one() {
        let mut form = TaskForm::new();
        form.target_time = String::new();
        assert_eq!(form.to_request().target_time, 1.0);
        form.target_time = "0".to_string();
        assert_eq!(form.to_request().target_time, 1.0);
        form.target_time = "2.5".to_string();
        assert_eq!(form.to_request().target_time, 2.5);
    }

    #[test]
    fn selection_wraps_through_all_fields() {
        let mut form = TaskForm::new();
        assert_eq!(form.selected, FormField::Cell(0, 0));
        for _ in 0..20 {
            form.select_next();
        }
        assert_eq!(form.selected, FormField::TargetTime);
        form.select_next();
        assert_eq!(form.selected, FormField::Cell(0, 0));
        form.select_prev();
        assert_eq!(form.selected, FormField::TargetTime);
    }

    #[test]
    fn insert_rejects_non_numeric_characters() {
        let mut form = TaskForm::new();
        form.clear_field();
        form.insert_char('-');
        form.insert_char('3');
        form.insert_char('x');
        form.insert_char('.');
        form.insert_char('5');
        assert_eq!(form.field(FormField::Cell(0, 0)), "-3.5");
    }

    #[test]
    fn answer_input_parses_integers_only() {
        let mut answer = AnswerInput::default();
        assert_eq!(answer.parse(), None);
        answer.insert_char('-');
        answer.insert_char('4');
        answer.insert_char('2');
        assert_eq!(answer.parse(), Some(-42));
        // A second minus is ignored.
        answer.insert_char('-');
        assert_eq!(answer.text, "-42");
    }
}
