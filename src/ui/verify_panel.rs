use crate::app::state::{AppState, FocusPanel};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusPanel::Answer;
    let block = Block::default()
        .title(" Verify ")
        .title_style(if focused { Theme::title() } else { Theme::border() })
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(" answer ❯ ", Style::default().fg(Theme::ACCENT_TEAL)),
        Span::styled(state.answer.text.clone(), Theme::value()),
    ]));

    match state.session.verification() {
        Some(v) => {
            let verdict = if v.is_correct {
                Span::styled(" CORRECT", Theme::correct())
            } else {
                Span::styled(" INCORRECT", Theme::incorrect())
            };
            lines.push(Line::from(verdict));
            lines.push(Line::from(vec![
                Span::styled(" sent ", Theme::label()),
                Span::styled(v.submitted_solution.to_string(), Theme::value()),
                Span::styled("  expected ", Theme::label()),
                Span::styled(
                    v.ground_truth
                        .map_or_else(|| "?".to_string(), |g| g.to_string()),
                    Theme::value(),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    " at {}",
                    v.received_at.format(&state.config.ui.timestamp_format)
                ),
                Theme::label(),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                " Enter submits the answer.",
                Theme::label(),
            )));
        }
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);

    if focused {
        let cursor_x = inner.x + 10 + state.answer.text.chars().count() as u16;
        if inner.width > 0 {
            frame.set_cursor_position((cursor_x.min(inner.right() - 1), inner.y));
        }
    }
}
