use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub const ACCENT_TEAL: Color = Color::Rgb(80, 200, 210);

    // One color per state variable, matched across the editor, the
    // preview and the results table.
    pub const STATE_COLORS: [Color; 4] = [
        Color::Blue,
        Color::Green,
        Color::Magenta,
        Color::Yellow,
    ];

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn title() -> Style {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn value() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn state_value(i: usize) -> Style {
        Style::default().fg(Self::STATE_COLORS[i % 4])
    }

    pub fn cell() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn cell_selected() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn equation() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn derivation_step() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn step_marker() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn correct() -> Style {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    }

    pub fn incorrect() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn copy_feedback() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn copy_failed() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn error_banner() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn auth_ok() -> Style {
        Style::default().fg(Color::Green).bg(Color::DarkGray)
    }

    pub fn auth_missing() -> Style {
        Style::default().fg(Color::Yellow).bg(Color::DarkGray)
    }
}
