use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{
    constants::TIME_SETTINGS,
    domain::SessionId,
    grid::ProgramGrid,
    page::Page,
    scroll_spy::{NavLinkMap, ScrollSpy, Span as Extent, VisibilityObserver},
    settings::Settings,
    storage::ProgramSource,
};

mod document;
mod event_handlers;
mod frame_scheduler;
pub(crate) mod program_view;
mod render_views;
mod ui_helpers;
mod view_style;

use document::Document;
use frame_scheduler::FrameScheduler;

/// Rows taken by the menu bar above the page and the key help below it.
const NAV_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;

struct App {
    settings: Settings,
    page: Page,
    program: ProgramGrid,
    spy: ScrollSpy,
    observer: VisibilityObserver,
    document: Document,
    scroll: usize,
    width: u16,
    body_height: u16,
    focus: Option<SessionId>,
    relayout: FrameScheduler,
    render_needed: bool,
}

impl App {
    fn new(
        settings: Settings,
        page: Page,
        source: &dyn ProgramSource,
        width: u16,
        height: u16,
    ) -> Self {
        let spy = ScrollSpy::new(
            NavLinkMap::new(page.nav_links()),
            page.section_ids(),
            &settings.excluded_nav_ids,
        );

        let mut program = ProgramGrid::new();
        if page.has_program() {
            program.load(
                source,
                settings.delimiter,
                &settings.layout_hints(width),
                &settings.unavailable_message,
            );
        }

        let mut app = Self {
            settings,
            page,
            program,
            spy,
            observer: VisibilityObserver::default(),
            document: Document::default(),
            scroll: 0,
            width,
            body_height: body_height(height),
            focus: None,
            relayout: FrameScheduler::default(),
            render_needed: true,
        };

        app.sync_focus();
        app.rebuild_document();
        app.measure_visibility();
        app
    }

    fn rebuild_document(&mut self) {
        self.document = Document::build(
            &self.page,
            &self.program,
            self.width,
            self.settings.column_width,
            self.focus,
        );
        self.scroll = self.scroll.min(self.max_scroll());
        self.render_needed = true;
    }

    fn max_scroll(&self) -> usize {
        self.document
            .len()
            .saturating_sub(self.body_height as usize)
    }

    fn viewport(&self) -> Extent {
        Extent::new(self.scroll, self.body_height as usize)
    }

    /// Feeds the current viewport to the observer and hands any threshold
    /// crossings to the scroll spy.
    fn measure_visibility(&mut self) {
        let viewport = self.viewport();
        let entries = self
            .observer
            .measure(self.document.section_extents(), viewport);
        if !entries.is_empty() {
            self.spy.observe(&entries);
            self.render_needed = true;
        }
    }

    fn scroll_to(&mut self, line: usize) {
        let target = line.min(self.max_scroll());
        if target != self.scroll {
            self.scroll = target;
            self.render_needed = true;
        }
        self.measure_visibility();
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.scroll.saturating_add_signed(delta));
    }

    fn page_step(&self) -> isize {
        isize::try_from(self.body_height.saturating_sub(1).max(1)).unwrap_or(1)
    }

    /// Keeps keyboard focus on a session that is still rendered.
    fn sync_focus(&mut self) {
        let ids = self.program.view().session_ids();
        if self.focus.is_some_and(|id| ids.contains(&id)) {
            return;
        }
        self.focus = ids.first().copied();
    }

    fn scroll_focus_into_view(&mut self) {
        let Some(hit) = self.focus.and_then(|id| self.document.hit_for(id)).copied() else {
            return;
        };
        let bottom = hit.line + hit.height;
        let view_bottom = self.scroll + self.body_height as usize;

        if hit.line < self.scroll {
            self.scroll_to(hit.line);
        } else if bottom > view_bottom {
            self.scroll_to(bottom.saturating_sub(self.body_height as usize));
        }
    }

    fn activate(&mut self, id: SessionId) {
        self.program.click(id);
        self.focus = Some(id);
        self.rebuild_document();
        self.measure_visibility();
    }

    fn close_detail(&mut self) {
        self.program.close();
        self.rebuild_document();
        self.measure_visibility();
    }

    /// Follows the n-th menu link: scroll its section to the top, then mark
    /// the link active the way a fragment navigation does.
    fn follow_link(&mut self, index: usize) {
        let Some(link) = self.spy.links().links().get(index).cloned() else {
            return;
        };
        if let Some(top) = link
            .target_id()
            .and_then(|id| self.document.section_top(id))
        {
            self.scroll_to(top);
        }
        self.spy.navigate_hash(&link.href);
        tracing::debug!(href = %link.href, active = ?self.spy.active_id(), "menu link followed");
        self.render_needed = true;
    }

    fn on_resize(&mut self, width: u16, height: u16, now: Instant) {
        self.width = width;
        self.body_height = body_height(height);
        self.relayout.request(now);
    }

    /// Runs the debounced re-render once its frame has come.
    fn apply_pending_layout(&mut self, frame_start: Instant) {
        if !self.relayout.take_due(frame_start) {
            return;
        }
        tracing::debug!(width = self.width, height = self.body_height, "relayout");
        self.program.render(&self.settings.layout_hints(self.width));
        self.sync_focus();
        self.rebuild_document();
        self.measure_visibility();
    }
}

fn body_height(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(NAV_HEIGHT + FOOTER_HEIGHT)
        .max(1)
}

pub fn run_ui(settings: Settings, page: Page, source: &dyn ProgramSource) -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(settings, page, source, size.width, size.height);

    let frame_rate = Duration::from_millis(TIME_SETTINGS.frame_ms);
    let poll_rate = Duration::from_millis(TIME_SETTINGS.poll_ms);
    let mut last_frame = Instant::now();

    loop {
        if last_frame.elapsed() >= frame_rate {
            let frame_start = Instant::now();
            app.apply_pending_layout(frame_start);

            if app.render_needed {
                terminal.draw(|f| {
                    app.draw_frame(f);
                })?;
                app.render_needed = false;
            }
            last_frame = frame_start;
        }

        if event::poll(poll_rate)? && app.handle_event(event::read()?, Instant::now()) {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
