use ratatui::prelude::{Line, Span};

use crate::{
    domain::SessionId,
    grid::{DetailCell, GridCell, GridView, ProgramGrid, ProgramStatus, SessionCell},
};

use super::{ui_helpers, view_style};

/// Lines a group's cells occupy: day and mode, speaker, title.
const CELL_LINES: usize = 3;
const DETAIL_INDENT: usize = 2;

/// Screen area of one session cell, relative to the first program line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitBox {
    pub id: SessionId,
    pub line: usize,
    pub height: usize,
    pub x: u16,
    pub width: u16,
}

impl HitBox {
    pub fn contains(&self, line: usize, x: u16) -> bool {
        (self.line..self.line + self.height).contains(&line)
            && x >= self.x
            && x < self.x.saturating_add(self.width)
    }

    pub fn offset(self, lines: usize) -> Self {
        HitBox {
            line: self.line + lines,
            ..self
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProgramLines {
    pub lines: Vec<Line<'static>>,
    pub hits: Vec<HitBox>,
}

impl ProgramLines {
    pub fn to_plain_text(&self) -> String {
        ui_helpers::plain_text(&self.lines)
    }
}

/// Draws the program section. `column_width` is the number of terminal
/// cells per layout column; sessions take two columns, year and month one.
pub fn program_lines(
    program: &ProgramGrid,
    width: u16,
    column_width: u16,
    focus: Option<SessionId>,
) -> ProgramLines {
    match program.status() {
        ProgramStatus::Loading => ProgramLines {
            lines: vec![Line::styled("…", view_style::muted_style())],
            hits: Vec::new(),
        },
        ProgramStatus::Unavailable(message) => ProgramLines {
            lines: ui_helpers::wrap_text(message, width as usize)
                .into_iter()
                .map(Line::from)
                .collect(),
            hits: Vec::new(),
        },
        ProgramStatus::Ready => grid_lines(program.view(), width, column_width, focus),
    }
}

struct GroupRows {
    rows: [Vec<Span<'static>>; CELL_LINES],
    x: usize,
}

impl GroupRows {
    fn new() -> Self {
        GroupRows {
            rows: Default::default(),
            x: 0,
        }
    }

    /// Appends one fixed-width block; the last character is the gutter.
    fn push_block(&mut self, width: usize, content: [Vec<Span<'static>>; CELL_LINES]) {
        let inner = width.saturating_sub(1);
        for (row, spans) in self.rows.iter_mut().zip(content) {
            let used: usize = spans.iter().map(|span| span.content.chars().count()).sum();
            row.extend(spans);
            row.push(Span::raw(" ".repeat(inner.saturating_sub(used) + 1)));
        }
        self.x += width;
    }

    fn push_header(&mut self, width: usize, text: Option<&str>, style: ratatui::style::Style) {
        let inner = width.saturating_sub(1);
        let first = match text {
            Some(text) => vec![Span::styled(ui_helpers::truncate_label(text, inner), style)],
            None => Vec::new(),
        };
        self.push_block(width, [first, Vec::new(), Vec::new()]);
    }

    fn push_session(&mut self, width: usize, cell: &SessionCell, focused: bool) {
        let inner = width.saturating_sub(1);
        let base = view_style::session_style(cell.active, focused);
        let fill = |text: &str| Span::styled(ui_helpers::fit_to_width(text, inner), base);

        let day = ui_helpers::truncate_label(&cell.day, inner);
        let remaining = inner.saturating_sub(day.chars().count());
        let mut first = vec![Span::styled(day, base)];
        if !cell.mode.trim().is_empty() && remaining > 1 {
            let mode = ui_helpers::truncate_label(&format!(" {}", cell.mode), remaining);
            first.push(Span::styled(
                ui_helpers::fit_to_width(&mode, remaining),
                view_style::mode_style(base, cell.active),
            ));
        } else {
            first.push(Span::styled(" ".repeat(remaining), base));
        }

        self.push_block(width, [first, vec![fill(&cell.speaker)], vec![fill(&cell.title)]]);
    }

    fn push_empty(&mut self, width: usize) {
        self.push_block(
            width,
            [
                vec![Span::styled("·", view_style::muted_style())],
                Vec::new(),
                Vec::new(),
            ],
        );
    }

    fn into_lines(self) -> impl Iterator<Item = Line<'static>> {
        self.rows.into_iter().map(Line::from)
    }
}

fn detail_lines(detail: &DetailCell, width: usize) -> Vec<Line<'static>> {
    let indent = " ".repeat(DETAIL_INDENT);
    let time = detail.time.trim();
    let time_label = if time.is_empty() {
        String::new()
    } else {
        format!(" {} ", time)
    };
    let text_width = width
        .saturating_sub(DETAIL_INDENT + time_label.chars().count() + 1)
        .max(1);

    let mut lines = Vec::new();
    for (index, text) in ui_helpers::wrap_text(&detail.text, text_width)
        .into_iter()
        .enumerate()
    {
        let lead = if index == 0 {
            Span::styled(time_label.clone(), view_style::detail_time_style())
        } else {
            Span::raw(" ".repeat(time_label.chars().count()))
        };
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            lead,
            Span::raw(" "),
            Span::raw(text),
        ]));
    }
    lines
}

fn grid_lines(
    view: &GridView,
    width: u16,
    column_width: u16,
    focus: Option<SessionId>,
) -> ProgramLines {
    let column = column_width.max(2) as usize;
    let mut out = ProgramLines {
        lines: Vec::with_capacity(view.group_count() * (CELL_LINES + 1)),
        hits: Vec::new(),
    };

    for (_, cells) in view.group_cells() {
        let top = out.lines.len();
        let mut rows = GroupRows::new();
        let mut open_detail = None;

        for cell in cells {
            match cell {
                GridCell::Year { text, .. } => {
                    rows.push_header(column, text.as_deref(), view_style::year_style());
                }
                GridCell::Month { text, active, .. } => {
                    rows.push_header(column, text.as_deref(), view_style::month_style(*active));
                }
                GridCell::EmptySlot { .. } => rows.push_empty(column * 2),
                GridCell::Session(session) => {
                    out.hits.push(HitBox {
                        id: session.id,
                        line: top,
                        height: CELL_LINES,
                        x: u16::try_from(rows.x).unwrap_or(u16::MAX),
                        width: u16::try_from(column * 2).unwrap_or(u16::MAX),
                    });
                    rows.push_session(column * 2, session, focus == Some(session.id));
                }
                GridCell::Detail(detail) => {
                    if detail.open {
                        open_detail = Some(detail);
                    }
                }
            }
        }

        out.lines.extend(rows.into_lines());
        if let Some(detail) = open_detail {
            out.lines.extend(detail_lines(detail, width as usize));
        }
        out.lines.push(Line::default());
    }

    out
}
