use ratatui::style::{Color, Modifier, Style};

use crate::constants::THEME;

pub(super) fn text_color_for_bg(bg_color: Color) -> Color {
    if let Color::Rgb(r, g, b) = bg_color {
        let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if brightness > 128 {
            Color::Black
        } else {
            Color::White
        }
    } else {
        Color::White
    }
}

fn highlight(bg_color: Color) -> Style {
    Style::default().bg(bg_color).fg(text_color_for_bg(bg_color))
}

pub(super) fn year_style() -> Style {
    Style::default()
        .fg(THEME.year)
        .add_modifier(Modifier::BOLD)
}

pub(super) fn month_style(active: bool) -> Style {
    if active {
        highlight(THEME.active_bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(THEME.accent)
            .add_modifier(Modifier::BOLD)
    }
}

/// Base style of a session cell: the open session wins over keyboard focus.
pub(super) fn session_style(active: bool, focused: bool) -> Style {
    if active {
        highlight(THEME.active_bg)
    } else if focused {
        highlight(THEME.focus_bg)
    } else {
        Style::default()
    }
}

pub(super) fn mode_style(base: Style, active: bool) -> Style {
    if active {
        base.add_modifier(Modifier::ITALIC)
    } else {
        base.fg(THEME.mode).add_modifier(Modifier::ITALIC)
    }
}

pub(super) fn muted_style() -> Style {
    Style::default().fg(THEME.muted)
}

pub(super) fn detail_time_style() -> Style {
    highlight(THEME.active_bg).add_modifier(Modifier::BOLD)
}

pub(super) fn heading_style() -> Style {
    Style::default()
        .fg(THEME.accent)
        .add_modifier(Modifier::BOLD)
}

pub(super) fn nav_link_style(active: bool) -> Style {
    if active {
        highlight(THEME.accent).add_modifier(Modifier::BOLD)
    } else {
        muted_style()
    }
}
