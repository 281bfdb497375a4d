use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::Paragraph,
};

use super::{App, FOOTER_HEIGHT, NAV_HEIGHT, view_style};

const KEY_HELP: &str = "↑↓ scroll  ←→ session  ⏎ open  1-9 menu  q quit";

impl App {
    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NAV_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(size);

        f.render_widget(Paragraph::new(self.nav_line()), chunks[0]);

        let visible: Vec<Line> = self
            .document
            .lines
            .iter()
            .skip(self.scroll)
            .take(chunks[1].height as usize)
            .cloned()
            .collect();
        f.render_widget(Paragraph::new(visible), chunks[1]);

        f.render_widget(Paragraph::new(self.footer_line()), chunks[2]);
    }

    /// Title followed by the numbered menu entries, each with its start column.
    fn nav_entries(&self) -> (String, Vec<(usize, String, u16)>) {
        let title = format!(" {} ", self.page.title);
        let mut x = title.chars().count();
        let mut entries = Vec::new();

        for (index, link) in self.spy.links().links().iter().enumerate() {
            let label = format!(" {} {} ", index + 1, link.label);
            let width = label.chars().count();
            entries.push((index, label, u16::try_from(x).unwrap_or(u16::MAX)));
            x += width + 1;
        }
        (title, entries)
    }

    fn nav_line(&self) -> Line<'static> {
        let (title, entries) = self.nav_entries();
        let mut spans = vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for (index, label, _) in entries {
            spans.push(Span::styled(
                label,
                view_style::nav_link_style(self.spy.is_active(index)),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    pub(super) fn nav_link_at(&self, column: u16) -> Option<usize> {
        let (_, entries) = self.nav_entries();
        entries.into_iter().find_map(|(index, label, start)| {
            let width = u16::try_from(label.chars().count()).unwrap_or(u16::MAX);
            (column >= start && column < start.saturating_add(width)).then_some(index)
        })
    }

    fn footer_line(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(KEY_HELP, view_style::muted_style())];
        let active = self
            .program
            .active_session()
            .and_then(|id| self.program.view().session_cell(id));
        if let Some(cell) = active {
            spans.push(Span::styled(
                format!("  [{}] {}", cell.id, cell.title),
                view_style::heading_style(),
            ));
        }
        Line::from(spans)
    }
}
