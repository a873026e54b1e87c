use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

/// Used for class days whose color token can't be shown in the terminal
pub(crate) const CLASS_STYLE: Style =
    Style::new().fg(Color::LightCyan).add_modifier(Modifier::BOLD);

pub(crate) const FOCUS_MODIFIER: Modifier = Modifier::REVERSED;

pub(crate) const YEAR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

/// Style for a day whose earliest class has the given color token (`#rrggbb`
/// or a color name)
pub(crate) fn class_style(color: &str) -> Style {
    match color.trim().parse::<Color>() {
        Ok(fg) => Style::new().fg(fg).add_modifier(Modifier::BOLD),
        Err(_) => CLASS_STYLE,
    }
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}

pub(crate) mod dayview {
    use super::*;

    pub(crate) const TIME_STYLE: Style = BASE_STYLE.fg(Color::Gray);

    pub(crate) const EMPTY_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);
}
