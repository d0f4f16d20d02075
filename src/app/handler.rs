use std::time::Instant;

use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::{Solution, Task, TaskId};
use crate::app::action::Action;
use crate::app::event::{AppEvent, Generation};
use crate::app::state::{AppState, FocusPanel};
use crate::render::Surface;

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::TaskReady {
            generation,
            custom,
            result,
        } => handle_task_ready(state, generation, custom, result),
        AppEvent::SolutionReady { task_id, result } => handle_solution_ready(state, task_id, result),
        AppEvent::VerifyReady { task_id, result } => {
            state.session.complete_verify(task_id, result);
            if let Some(v) = state.session.verification() {
                state.pending_log.push(format!(
                    "verify task {}: submitted {}, expected {}, {}",
                    v.task_id,
                    v.submitted_solution,
                    v.ground_truth.map_or_else(|| "?".to_string(), |g| g.to_string()),
                    if v.is_correct { "correct" } else { "incorrect" },
                ));
            }
            state.dirty = true;
            vec![]
        }
        AppEvent::Auth {
            authenticated,
            username,
        } => {
            state.authenticated = Some(authenticated);
            state.username = username;
            state.dirty = true;
            vec![]
        }
        AppEvent::Tick => {
            state.on_tick(Instant::now());
            vec![]
        }
    }
}

fn handle_task_ready(
    state: &mut AppState,
    generation: Generation,
    custom: bool,
    result: Result<Task, crate::api::ApiError>,
) -> Vec<Action> {
    let before = state.session.task().map(|t| t.task_id);
    state.session.complete_task(generation, result);
    state.dirty = true;

    let task = match state.session.task() {
        Some(t) if before != Some(t.task_id) => t.clone(),
        _ => return vec![],
    };

    // A new active task: refresh the editor and every render surface bound
    // to the previous task.
    state.form.load_task(&task);
    state.answer.clear();
    state.derivation_scroll = 0;
    assign_preview_surfaces(state, &task);
    state.pending_log.push(format!(
        "{} task {}",
        if custom { "created custom" } else { "generated" },
        task.task_id
    ));

    if custom {
        // The Run flow chains straight into the solution fetch.
        if let Some(task_id) = state.session.begin_fetch_solution() {
            return vec![Action::FetchSolution { task_id }];
        }
    }
    vec![]
}

fn handle_solution_ready(
    state: &mut AppState,
    task_id: TaskId,
    result: Result<Solution, crate::api::ApiError>,
) -> Vec<Action> {
    let had_solution = state.session.solution().is_some();
    state.session.complete_solution(task_id, result);
    state.dirty = true;

    if let Some(solution) = state.session.solution() {
        if !had_solution {
            let steps: Vec<String> = solution.latex_solution.steps().to_vec();
            state.derivation_scroll = 0;
            state.renderer.clear_steps();
            let now = Instant::now();
            for (i, step) in steps.iter().enumerate() {
                state.renderer.assign(Surface::Step(i), step, now);
            }
            state
                .pending_log
                .push(format!("solution fetched for task {}", task_id));
        }
    }
    vec![]
}

fn assign_preview_surfaces(state: &mut AppState, task: &Task) {
    state.renderer.clear();
    let now = Instant::now();
    let rows = task.equation_preview.rows().map(|r| r.to_string());
    for (i, row) in rows.iter().enumerate() {
        if !row.is_empty() {
            state.renderer.assign(Surface::Preview(i), row, now);
        }
    }
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) => handle_key(state, key),
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    // Global keybindings
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return vec![Action::Quit],
            KeyCode::Char('r') => return begin_create_custom(state),
            KeyCode::Char('s') => return begin_fetch_solution(state),
            KeyCode::Char('y') => {
                copy_derivation(state);
                return vec![];
            }
            _ => {}
        }
    }
    match key.code {
        KeyCode::F(5) => return begin_generate(state),
        KeyCode::Tab => {
            state.cycle_focus();
            return vec![];
        }
        _ => {}
    }

    match state.focus {
        FocusPanel::Editor => handle_editor_key(state, key),
        FocusPanel::Derivation => handle_derivation_key(state, key),
        FocusPanel::Answer => handle_answer_key(state, key),
    }
}

fn begin_generate(state: &mut AppState) -> Vec<Action> {
    let generation = state.session.begin_generate();
    vec![Action::Generate { generation }]
}

fn begin_create_custom(state: &mut AppState) -> Vec<Action> {
    let request = state.form.to_request();
    let generation = state.session.begin_create();
    vec![Action::CreateCustom {
        generation,
        request,
    }]
}

fn begin_fetch_solution(state: &mut AppState) -> Vec<Action> {
    match state.session.begin_fetch_solution() {
        Some(task_id) => vec![Action::FetchSolution { task_id }],
        None => {
            // Either nothing to do or the cached solution was re-surfaced.
            state.dirty = true;
            vec![]
        }
    }
}

fn begin_verify(state: &mut AppState) -> Vec<Action> {
    match state.session.begin_verify(state.answer.parse()) {
        Some((task_id, solution)) => vec![Action::Verify { task_id, solution }],
        None => vec![],
    }
}

fn copy_derivation(state: &mut AppState) {
    let Some(solution) = state.session.solution() else {
        return;
    };
    let steps: Vec<String> = solution.latex_solution.steps().to_vec();
    state.exporter.copy_steps(&steps, Instant::now());
    state.dirty = true;
}

fn handle_editor_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Char(c) => state.form.insert_char(c),
        KeyCode::Backspace => state.form.delete_back(),
        KeyCode::Delete => state.form.clear_field(),
        KeyCode::Left => state.form.move_selection(0, -1),
        KeyCode::Right => state.form.move_selection(0, 1),
        KeyCode::Up => state.form.move_selection(-1, 0),
        KeyCode::Down => state.form.move_selection(1, 0),
        KeyCode::Enter => state.form.select_next(),
        _ => {}
    }
    vec![]
}

fn handle_derivation_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let step_count = state
        .session
        .solution()
        .map(|s| s.latex_solution.steps().len())
        .unwrap_or(0);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.derivation_scroll = state.derivation_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.derivation_scroll + 1 < step_count {
                state.derivation_scroll += 1;
            }
        }
        KeyCode::Home => state.derivation_scroll = 0,
        KeyCode::End => state.derivation_scroll = step_count.saturating_sub(1),
        KeyCode::Char('c') => copy_derivation(state),
        _ => {}
    }
    vec![]
}

fn handle_answer_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Char(c) => {
            state.answer.insert_char(c);
            vec![]
        }
        KeyCode::Backspace => {
            state.answer.delete_back();
            vec![]
        }
        KeyCode::Enter => begin_verify(state),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        Coefficients, DerivationSteps, EquationPreview, InitialConditions, Solution,
        SolutionMetrics, VerificationResult,
    };
    use crate::config::AppConfig;
    use crate::export::{ClipboardBackend, ClipboardExporter, CopyFeedback};
    use crate::render::typeset::{TypesetError, Typesetter};
    use crate::render::EquationRenderer;
    use crate::session::Phase;
    use anyhow::Result;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    struct EchoTypesetter;

    impl Typesetter for EchoTypesetter {
        fn is_available(&self) -> bool {
            true
        }

        fn typeset(&self, markup: &str) -> Result<String, TypesetError> {
            Ok(markup.to_string())
        }
    }

    struct RecordingClipboard(Arc<Mutex<Vec<String>>>);

    impl ClipboardBackend for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn test_state() -> (AppState, Arc<Mutex<Vec<String>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let state = AppState::new(
            AppConfig::default(),
            EquationRenderer::new(Box::new(EchoTypesetter)),
            ClipboardExporter::new(Box::new(RecordingClipboard(Arc::clone(&written)))),
        );
        (state, written)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn task(id: i64) -> Task {
        Task {
            task_id: id,
            coefficients: Coefficients {
                linear: [[2.0; 4]; 4],
            },
            initial_conditions: InitialConditions {
                x0: 0.1,
                y0: 0.2,
                z0: 0.3,
                w0: 0.4,
            },
            target_time: 3.0,
            equation_preview: EquationPreview {
                dx_dt: "dx/dt = 2x".to_string(),
                ..EquationPreview::default()
            },
        }
    }

    fn solution(id: i64) -> Solution {
        Solution {
            task_id: Some(id),
            final_values: [1.0, 2.0, 3.0, 4.0],
            recalculated_metrics: SolutionMetrics {
                weighted_sum: 0.0,
                arc_length: 0.0,
                curvature: 0.0,
                final_solution: 17,
            },
            latex_solution: DerivationSteps::Many(vec![
                "step one".to_string(),
                "step two".to_string(),
            ]),
        }
    }

    #[test]
    fn f5_issues_a_generate_action() {
        let (mut state, _) = test_state();
        let actions = handle_event(&mut state, key(KeyCode::F(5)));
        assert_eq!(actions, vec![Action::Generate { generation: 1 }]);
        assert_eq!(state.session.phase(), Phase::Generating);
    }

    #[test]
    fn adopted_task_repopulates_the_form() {
        let (mut state, _) = test_state();
        let actions = handle_event(&mut state, key(KeyCode::F(5)));
        let Action::Generate { generation } = actions[0] else {
            panic!("expected generate")
        };
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation,
                custom: false,
                result: Ok(task(5)),
            },
        );
        assert_eq!(state.form.cells[0][0], "2");
        assert_eq!(state.form.initials[3], "0.4");
        assert_eq!(state.form.target_time, "3");
        assert_eq!(state.renderer.display(Surface::Preview(0)), Some("dx/dt = 2x"));
        assert!(state.pending_log.iter().any(|l| l.contains("generated task 5")));
    }

    #[test]
    fn later_generate_wins_when_responses_cross() {
        let (mut state, _) = test_state();
        let first = match handle_event(&mut state, key(KeyCode::F(5))).remove(0) {
            Action::Generate { generation } => generation,
            other => panic!("unexpected {:?}", other),
        };
        let second = match handle_event(&mut state, key(KeyCode::F(5))).remove(0) {
            Action::Generate { generation } => generation,
            other => panic!("unexpected {:?}", other),
        };

        // Second response arrives first, then the slower first one.
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: second,
                custom: false,
                result: Ok(task(20)),
            },
        );
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: first,
                custom: false,
                result: Ok(task(10)),
            },
        );
        assert_eq!(state.session.task().unwrap().task_id, 20);
    }

    #[test]
    fn run_flow_chains_create_and_fetch() {
        let (mut state, _) = test_state();
        let actions = handle_event(&mut state, ctrl('r'));
        let Action::CreateCustom { generation, ref request } = actions[0] else {
            panic!("expected create")
        };
        assert_eq!(request.coefficients.linear, [[1.0; 4]; 4]);

        let actions = handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation,
                custom: true,
                result: Ok(task(7)),
            },
        );
        assert_eq!(actions, vec![Action::FetchSolution { task_id: 7 }]);

        handle_event(
            &mut state,
            AppEvent::SolutionReady {
                task_id: 7,
                result: Ok(solution(7)),
            },
        );
        assert_eq!(state.session.phase(), Phase::SolutionVisible);
        assert_eq!(state.renderer.display(Surface::Step(0)), Some("step one"));
        assert_eq!(state.renderer.display(Surface::Step(1)), Some("step two"));
    }

    #[test]
    fn repeat_fetch_uses_the_cache() {
        let (mut state, _) = test_state();
        handle_event(&mut state, key(KeyCode::F(5)));
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: 1,
                custom: false,
                result: Ok(task(5)),
            },
        );
        let actions = handle_event(&mut state, ctrl('s'));
        assert_eq!(actions, vec![Action::FetchSolution { task_id: 5 }]);
        handle_event(
            &mut state,
            AppEvent::SolutionReady {
                task_id: 5,
                result: Ok(solution(5)),
            },
        );
        // Second request: no network action.
        let actions = handle_event(&mut state, ctrl('s'));
        assert!(actions.is_empty());
        assert_eq!(state.session.phase(), Phase::SolutionVisible);
    }

    #[test]
    fn verify_submits_the_typed_answer() {
        let (mut state, _) = test_state();
        handle_event(&mut state, key(KeyCode::F(5)));
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: 1,
                custom: false,
                result: Ok(task(5)),
            },
        );
        handle_event(&mut state, ctrl('s'));
        handle_event(
            &mut state,
            AppEvent::SolutionReady {
                task_id: 5,
                result: Ok(solution(5)),
            },
        );

        state.focus = FocusPanel::Answer;
        handle_event(&mut state, key(KeyCode::Char('4')));
        handle_event(&mut state, key(KeyCode::Char('2')));
        let actions = handle_event(&mut state, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Verify {
                task_id: 5,
                solution: 42
            }]
        );

        handle_event(
            &mut state,
            AppEvent::VerifyReady {
                task_id: 5,
                result: Ok(VerificationResult {
                    task_id: 5,
                    submitted_solution: 42,
                    ground_truth: Some(17),
                    is_correct: false,
                    received_at: Utc::now(),
                }),
            },
        );
        assert_eq!(state.session.phase(), Phase::Verified);
        assert!(!state.session.verification().unwrap().is_correct);
        assert!(state
            .pending_log
            .iter()
            .any(|l| l.contains("submitted 42, expected 17, incorrect")));
    }

    #[test]
    fn verify_without_answer_is_a_noop() {
        let (mut state, _) = test_state();
        handle_event(&mut state, key(KeyCode::F(5)));
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: 1,
                custom: false,
                result: Ok(task(5)),
            },
        );
        state.focus = FocusPanel::Answer;
        let actions = handle_event(&mut state, key(KeyCode::Enter));
        assert!(actions.is_empty());
    }

    #[test]
    fn copy_joins_steps_and_sets_feedback() {
        let (mut state, written) = test_state();
        handle_event(&mut state, key(KeyCode::F(5)));
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: 1,
                custom: false,
                result: Ok(task(5)),
            },
        );
        handle_event(&mut state, ctrl('s'));
        handle_event(
            &mut state,
            AppEvent::SolutionReady {
                task_id: 5,
                result: Ok(solution(5)),
            },
        );

        handle_event(&mut state, ctrl('y'));
        assert_eq!(written.lock().unwrap().as_slice(), ["step one\n\nstep two"]);
        assert!(matches!(state.exporter.feedback(), CopyFeedback::Copied { .. }));
    }

    #[test]
    fn copy_without_solution_is_a_noop() {
        let (mut state, written) = test_state();
        handle_event(&mut state, ctrl('y'));
        assert!(written.lock().unwrap().is_empty());
        assert_eq!(state.exporter.feedback(), CopyFeedback::Idle);
    }

    #[test]
    fn failed_generate_keeps_the_error_until_the_next_operation() {
        let (mut state, _) = test_state();
        handle_event(&mut state, key(KeyCode::F(5)));
        handle_event(
            &mut state,
            AppEvent::TaskReady {
                generation: 1,
                custom: false,
                result: Err(crate::api::ApiError::Network("no response".to_string())),
            },
        );
        assert_eq!(state.session.error(), Some("no response"));
        // The next attempted operation clears the banner, whatever its fate.
        handle_event(&mut state, key(KeyCode::F(5)));
        assert_eq!(state.session.error(), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut state, _) = test_state();
        let actions = handle_event(&mut state, ctrl('c'));
        assert_eq!(actions, vec![Action::Quit]);
    }
}
