use crate::app::state::{AppState, FocusPanel};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut parts: Vec<Span> = Vec::new();

    // Auth badge
    match state.authenticated {
        Some(true) => {
            let who = state.username.as_deref().unwrap_or("signed in");
            parts.push(Span::styled(format!(" [{}] ", who), Theme::auth_ok()));
        }
        Some(false) => {
            parts.push(Span::styled(" [anonymous] ", Theme::auth_missing()));
        }
        None => {
            parts.push(Span::styled(" [...] ", Theme::auth_missing()));
        }
    }

    let status_style = if state.session.is_busy() {
        Style::default().fg(Color::Yellow).bg(Color::DarkGray)
    } else {
        Theme::status_bar()
    };
    parts.push(Span::styled(
        format!(" {} ", state.status_line()),
        status_style,
    ));

    if state.renderer.has_pending() {
        parts.push(Span::styled(
            " | typesetting ",
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ));
    }

    // Focus indicator
    let focus_name = match state.focus {
        FocusPanel::Editor => "EDITOR",
        FocusPanel::Derivation => "DERIVATION",
        FocusPanel::Answer => "ANSWER",
    };
    // Pad to fill remaining space
    let used: usize = parts.iter().map(|s| s.content.width()).sum();
    let remaining = (area.width as usize).saturating_sub(used + focus_name.len() + 3);
    parts.push(Span::styled(" ".repeat(remaining), Theme::status_bar()));
    parts.push(Span::styled(
        format!(" [{}] ", focus_name),
        Style::default().fg(Color::Cyan).bg(Color::DarkGray),
    ));

    let line = Line::from(parts);
    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, area);
}
