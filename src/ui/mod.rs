mod derivation;
mod layout;
mod matrix_editor;
mod preview;
mod results;
mod status_bar;
mod theme;
mod verify_panel;

use crate::app::state::AppState;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area, state.session.error().is_some());

    if let (Some(banner), Some(message)) = (app_layout.banner, state.session.error()) {
        render_error_banner(frame, banner, message);
    }

    matrix_editor::render(frame, app_layout.editor, state);
    verify_panel::render(frame, app_layout.verify, state);
    preview::render(frame, app_layout.preview, state);
    results::render(frame, app_layout.results, state);
    derivation::render(frame, app_layout.derivation, state);
    status_bar::render(frame, app_layout.status_bar, state);
}

fn render_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(Span::styled(
        format!(" {} ", message),
        theme::Theme::error_banner(),
    ))
    .style(theme::Theme::error_banner());
    frame.render_widget(paragraph, area);
}
