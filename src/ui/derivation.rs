use crate::app::state::{AppState, FocusPanel};
use crate::export::CopyFeedback;
use crate::render::Surface;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusPanel::Derivation;
    let mut block = Block::default()
        .title(" Derivation ")
        .title_style(if focused { Theme::title() } else { Theme::border() })
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    // Copy feedback lives in the panel title so it never shifts the steps.
    if let Some(label) = state.exporter.label() {
        let style = match state.exporter.feedback() {
            CopyFeedback::Failed { .. } => Theme::copy_failed(),
            _ => Theme::copy_feedback(),
        };
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", label), style)).right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(solution) = state.session.solution() else {
        frame.render_widget(
            Paragraph::new(Span::styled(" No derivation yet.", Theme::label())),
            inner,
        );
        return;
    };

    let steps = solution.latex_solution.steps();
    let mut lines: Vec<Line> = Vec::new();
    for (i, _) in steps.iter().enumerate().skip(state.derivation_scroll) {
        let Some(text) = state.renderer.display(Surface::Step(i)) else {
            continue;
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:>2}. ", i + 1), Theme::step_marker()),
            Span::styled(text.to_string(), Theme::derivation_step()),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " (empty derivation)",
            Theme::label(),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}
