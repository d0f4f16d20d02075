use crate::app::state::AppState;
use crate::render::Surface;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.session.task() {
        Some(task) => format!(" Task {} ", task.task_id),
        None => " Task ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.session.task().is_none() {
        let paragraph = Paragraph::new(Span::styled(
            " No active task. Press F5 to generate one.",
            Theme::label(),
        ));
        frame.render_widget(paragraph, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for i in 0..4 {
        if let Some(text) = state.renderer.display(Surface::Preview(i)) {
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled(text.to_string(), Theme::equation()),
            ]));
        }
    }
    if let Some(task) = state.session.task() {
        lines.push(Line::from(vec![
            Span::styled(" t = ", Theme::label()),
            Span::styled(format!("{}", task.target_time), Theme::value()),
        ]));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}
