use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub banner: Option<Rect>,
    pub editor: Rect,
    pub verify: Rect,
    pub preview: Rect,
    pub results: Rect,
    pub derivation: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, has_banner: bool) -> AppLayout {
    // Main vertical split: banner? | content | status bar
    let constraints: Vec<Constraint> = if has_banner {
        vec![
            Constraint::Length(1), // Error banner
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ]
    } else {
        vec![Constraint::Min(5), Constraint::Length(1)]
    };
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (banner, content, status_bar) = if has_banner {
        (Some(main_chunks[0]), main_chunks[1], main_chunks[2])
    } else {
        (None, main_chunks[0], main_chunks[1])
    };

    // Horizontal: editor column | results column
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints([
            Constraint::Length(38), // Editor column
            Constraint::Min(40),    // Results column
        ])
        .split(content);

    let left_panel = h_chunks[0];
    let right_panel = h_chunks[1];

    // Left column: matrix editor | verify panel
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(12),   // Editor
            Constraint::Length(7), // Verify
        ])
        .split(left_panel);

    let editor = left_chunks[0];
    let verify = left_chunks[1];

    // Right column: preview | results | derivation
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Equation preview
            Constraint::Length(5), // Results
            Constraint::Min(5),    // Derivation
        ])
        .split(right_panel);

    let preview = right_chunks[0];
    let results = right_chunks[1];
    let derivation = right_chunks[2];

    AppLayout {
        banner,
        editor,
        verify,
        preview,
        results,
        derivation,
        status_bar,
    }
}
