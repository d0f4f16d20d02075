use crate::app::state::{AppState, INITIAL_LABELS};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Results ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(solution) = state.session.solution() else {
        let hint = if state.session.task().is_some() {
            " Ctrl+S computes the solution."
        } else {
            " Nothing computed yet."
        };
        frame.render_widget(Paragraph::new(Span::styled(hint, Theme::label())), inner);
        return;
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, value) in solution.final_values.iter().enumerate() {
        let name = &INITIAL_LABELS[i][..1];
        spans.push(Span::styled(format!("{}(t)=", name), Theme::label()));
        spans.push(Span::styled(format!("{:.6}", value), Theme::state_value(i)));
        spans.push(Span::raw("  "));
    }

    let metrics = &solution.recalculated_metrics;
    let lines = vec![
        Line::from(spans),
        Line::from(vec![
            Span::styled(" score = ", Theme::label()),
            Span::styled(
                metrics.final_solution.to_string(),
                Theme::value().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!(
                    " weighted {:.4}  arc {:.4}  curvature {:.4}",
                    metrics.weighted_sum, metrics.arc_length, metrics.curvature
                ),
                Theme::label(),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}
