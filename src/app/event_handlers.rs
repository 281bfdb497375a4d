use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::{App, NAV_HEIGHT, ui_helpers};

const WHEEL_STEP: isize = 3;

impl App {
    /// Returns true when the app should quit.
    pub(super) fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                false
            }
            Event::Resize(width, height) => {
                self.on_resize(width, height, now);
                false
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => {
                if self.program.active_session().is_none() {
                    return true;
                }
                self.close_detail();
            }
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-self.page_step()),
            KeyCode::PageDown => self.scroll_by(self.page_step()),
            KeyCode::Home => self.scroll_to(0),
            KeyCode::End => self.scroll_to(self.max_scroll()),
            KeyCode::Right | KeyCode::Tab => self.move_focus(true),
            KeyCode::Left | KeyCode::BackTab => self.move_focus(false),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.focus {
                    self.activate(id);
                }
            }
            KeyCode::Char(c) if ('1'..='9').contains(&c) => {
                let index = c as usize - '1' as usize;
                self.follow_link(index);
            }
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if mouse.row < NAV_HEIGHT {
                    if let Some(index) = self.nav_link_at(mouse.column) {
                        self.follow_link(index);
                    }
                    return;
                }

                let row = mouse.row - NAV_HEIGHT;
                if row >= self.body_height {
                    return;
                }
                let line = self.scroll + row as usize;
                if let Some(id) = self.document.hit_at(line, mouse.column) {
                    self.activate(id);
                }
            }
            MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_STEP),
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_STEP),
            _ => {}
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let ids = self.program.view().session_ids();
        if ids.is_empty() {
            return;
        }

        let next = match self.focus.and_then(|id| ids.iter().position(|known| *known == id)) {
            Some(current) if forward => ui_helpers::wrap_next_index(current, ids.len()),
            Some(current) => ui_helpers::wrap_prev_index(current, ids.len()),
            None => 0,
        };
        self.focus = Some(ids[next]);
        self.rebuild_document();
        self.scroll_focus_into_view();
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;
    use crate::{
        domain::SessionId, page::Page, settings::Settings, storage::MemorySource,
    };

    const PROGRAM: &str = "year;month;day1;title1;time1;day2;title2;time2\n\
        2025;Marzo;Lun 3;Apertura;18:00;Mar 4;Laboratorio;17:00\n";

    fn app() -> App {
        let settings = Settings {
            sessions_per_row: Some("2".to_string()),
            column_width: 8,
            ..Settings::default()
        };
        App::new(
            settings,
            Page::default(),
            &MemorySource::new(PROGRAM),
            100,
            30,
        )
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        let key = KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        app.handle_event(Event::Key(key), Instant::now())
    }

    fn click(app: &mut App, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_event(Event::Mouse(mouse), Instant::now());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_focus_wraps_around_sessions() {
        let mut app = app();
        assert_eq!(app.focus, Some(SessionId::new(0, 0)));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.focus, Some(SessionId::new(0, 1)));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focus, Some(SessionId::new(0, 0)));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.focus, Some(SessionId::new(0, 1)));
    }

    #[test]
    fn test_enter_toggles_focused_session() {
        let mut app = app();

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.program.active_session(), Some(SessionId::new(0, 0)));

        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.program.active_session(), None);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.program.active_session(), None);
    }

    #[test]
    fn test_mouse_click_on_session_cell() {
        let mut app = app();
        let Some(hit) = app.document.hit_for(SessionId::new(0, 1)).copied() else {
            panic!("session not drawn");
        };

        let row = u16::try_from(hit.line - app.scroll).unwrap() + NAV_HEIGHT;
        click(&mut app, hit.x + 1, row + 1);

        assert_eq!(app.program.active_session(), Some(SessionId::new(0, 1)));
        assert_eq!(app.focus, Some(SessionId::new(0, 1)));
    }

    #[test]
    fn test_digit_follows_menu_link() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));

        assert_eq!(app.spy.active_id(), Some("program"));
        assert!(!press(&mut app, KeyCode::Char('9')));
    }

    #[test]
    fn test_resize_event_is_deferred() {
        let mut app = app();
        app.handle_event(Event::Resize(50, 20), Instant::now());

        assert!(app.relayout.is_pending());
        assert_eq!(app.width, 50);
    }
}
