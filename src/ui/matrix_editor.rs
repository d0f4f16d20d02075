use crate::app::state::{AppState, FocusPanel, FormField, INITIAL_LABELS};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const CELL_WIDTH: usize = 7;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusPanel::Editor;
    let block = Block::default()
        .title(" System ")
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
    lines.push(Line::from(Span::styled(" A =", Theme::label())));
    for row in 0..4 {
        let mut spans: Vec<Span> = vec![Span::raw("  ")];
        for col in 0..4 {
            let field = FormField::Cell(row, col);
            spans.push(cell_span(state, field, &state.form.cells[row][col], focused));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut spans: Vec<Span> = vec![Span::styled(" v0 = ", Theme::label())];
    for (i, value) in state.form.initials.iter().enumerate() {
        spans.push(Span::styled(
            format!("{}:", INITIAL_LABELS[i]),
            Theme::state_value(i),
        ));
        spans.push(cell_span(state, FormField::Initial(i), value, focused));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(spans));

    lines.push(Line::from(vec![
        Span::styled(" t  = ", Theme::label()),
        cell_span(state, FormField::TargetTime, &state.form.target_time, focused),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Ctrl+R runs the system",
        Theme::label(),
    )));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn cell_span(state: &AppState, field: FormField, value: &str, focused: bool) -> Span<'static> {
    let selected = focused && state.form.selected == field;
    let text = format!("{:>width$}", value, width = CELL_WIDTH);
    Span::styled(
        text,
        if selected {
            Theme::cell_selected()
        } else {
            Theme::cell()
        },
    )
}
