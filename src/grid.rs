use std::{collections::HashMap, ops::Range};

use crate::{
    domain::{GroupId, Session, SessionId},
    error::FetchError,
    layout::LayoutHints,
    storage::{self, ProgramSource},
    table::Row,
};

mod render;
mod toggle;

pub use render::render;

/// One element of the flat grid surface. A group always contributes a year
/// cell, a month cell, one cell per slot and a detail cell, in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridCell {
    Year {
        group: GroupId,
        text: Option<String>,
    },
    Month {
        group: GroupId,
        text: Option<String>,
        active: bool,
    },
    EmptySlot {
        group: GroupId,
    },
    Session(SessionCell),
    Detail(DetailCell),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCell {
    pub id: SessionId,
    pub group: GroupId,
    pub day: String,
    pub mode: String,
    pub speaker: String,
    pub title: String,
    pub active: bool,
    pub expanded: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailCell {
    pub group: GroupId,
    pub open: bool,
    pub time: String,
    pub text: String,
}

#[derive(Clone, Debug)]
struct IndexedSession {
    session: Session,
    group: GroupId,
    cell: usize,
}

#[derive(Clone, Copy, Debug)]
struct IndexedGroup {
    month_cell: usize,
    detail_cell: usize,
}

/// Rendered program grid together with the lookup index for its sessions
/// and groups.
#[derive(Clone, Debug, Default)]
pub struct GridView {
    cells: Vec<GridCell>,
    groups: Vec<(GroupId, Range<usize>)>,
    session_index: HashMap<SessionId, IndexedSession>,
    group_index: HashMap<GroupId, IndexedGroup>,
    sessions_per_row: usize,
}

impl GridView {
    #[cfg(test)]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cells of each group in render order.
    pub fn group_cells(&self) -> impl Iterator<Item = (GroupId, &[GridCell])> {
        self.groups
            .iter()
            .map(|(id, range)| (*id, &self.cells[range.clone()]))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn sessions_per_row(&self) -> usize {
        self.sessions_per_row
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.session_index.contains_key(&id)
    }

    #[cfg(test)]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.session_index.get(&id).map(|entry| &entry.session)
    }

    /// Interactive sessions in render order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.cells
            .iter()
            .filter_map(|cell| match cell {
                GridCell::Session(session) => Some(session.id),
                _ => None,
            })
            .collect()
    }

    pub fn session_cell(&self, id: SessionId) -> Option<&SessionCell> {
        let entry = self.session_index.get(&id)?;
        match self.cells.get(entry.cell) {
            Some(GridCell::Session(cell)) => Some(cell),
            _ => None,
        }
    }

    pub fn detail(&self, group: GroupId) -> Option<&DetailCell> {
        let entry = self.group_index.get(&group)?;
        match self.cells.get(entry.detail_cell) {
            Some(GridCell::Detail(detail)) => Some(detail),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn month_active(&self, group: GroupId) -> bool {
        self.group_index
            .get(&group)
            .and_then(|entry| self.cells.get(entry.month_cell))
            .is_some_and(|cell| matches!(cell, GridCell::Month { active: true, .. }))
    }

    #[cfg(test)]
    pub fn open_detail_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, GridCell::Detail(DetailCell { open: true, .. })))
            .count()
    }
}

/// Load status of the program section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramStatus {
    Loading,
    Ready,
    Unavailable(String),
}

/// Owns everything the program section mutates: the cached rows, the current
/// view, and the single active session.
#[derive(Debug)]
pub struct ProgramGrid {
    rows: Option<Vec<Row>>,
    view: GridView,
    active: Option<SessionId>,
    status: ProgramStatus,
}

impl Default for ProgramGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramGrid {
    pub fn new() -> Self {
        ProgramGrid {
            rows: None,
            view: GridView::default(),
            active: None,
            status: ProgramStatus::Loading,
        }
    }

    /// Fetches and parses the program once, then renders it. On failure the
    /// section switches to `unavailable_message` for good; there is no retry.
    pub fn load(
        &mut self,
        source: &dyn ProgramSource,
        delimiter: char,
        hints: &LayoutHints,
        unavailable_message: &str,
    ) {
        match storage::load_rows(source, delimiter) {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), source = %source.describe(), "program loaded");
                self.set_rows(rows);
                self.render(hints);
            }
            Err(error) => self.fail(&error, unavailable_message),
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = Some(rows);
        self.status = ProgramStatus::Ready;
    }

    fn fail(&mut self, error: &FetchError, unavailable_message: &str) {
        tracing::warn!(error = %error, "program unavailable");
        self.rows = None;
        self.view = GridView::default();
        self.active = None;
        self.status = ProgramStatus::Unavailable(unavailable_message.to_string());
    }

    /// Rebuilds the view from the cached rows and re-opens the previously
    /// active session when it still exists.
    pub fn render(&mut self, hints: &LayoutHints) {
        let Some(rows) = self.rows.as_deref() else {
            return;
        };

        self.view = render(rows, hints);
        let Some(previous) = self.active.take() else {
            return;
        };

        if self.view.contains(previous) {
            self.open(previous);
        } else {
            tracing::debug!(session = %previous, "active session gone after re-render");
        }
    }

    pub fn view(&self) -> &GridView {
        &self.view
    }

    pub fn status(&self) -> &ProgramStatus {
        &self.status
    }

    #[cfg(test)]
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemorySource, table::parse_table};

    const PROGRAM: &str = "year;month;day1;speaker1;title1;time1;info1;day2;speaker2;title2;time2;day6;title6\n\
        2025;Marzo;Lun 3;Rossi;Apertura;18:00;Aula magna;Mar 4;Bianchi;Laboratorio;17:00;Ven 28;Chiusura\n\
        2025;Aprile;Mer 2;Verdi;Seminario;;;;;;;;\n";

    fn hints(per_row: &str) -> LayoutHints {
        LayoutHints::new(Some(per_row.to_string()), None)
    }

    fn loaded(per_row: &str) -> ProgramGrid {
        let mut grid = ProgramGrid::new();
        grid.set_rows(parse_table(PROGRAM, ';'));
        grid.render(&hints(per_row));
        grid
    }

    #[test]
    fn test_load_renders_rows() {
        let mut grid = ProgramGrid::new();
        let source = MemorySource::new(PROGRAM);
        grid.load(&source, ';', &hints("5"), "n/a");

        assert_eq!(grid.status(), &ProgramStatus::Ready);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.view().group_count(), 3);
    }

    #[test]
    fn test_failed_load_shows_unavailable_message() {
        let mut grid = ProgramGrid::new();
        let source = MemorySource::failing();
        grid.load(&source, ';', &hints("5"), "Programma non disponibile.");

        assert_eq!(
            grid.status(),
            &ProgramStatus::Unavailable("Programma non disponibile.".to_string())
        );
        assert!(grid.view().cells().is_empty());

        grid.render(&hints("3"));
        assert!(grid.view().cells().is_empty());
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut grid = loaded("5");
        let before = grid.view().cells().to_vec();
        grid.render(&hints("5"));
        assert_eq!(grid.view().cells(), before.as_slice());
    }

    #[test]
    fn test_resize_keeps_open_session() {
        let mut grid = loaded("5");
        let id = SessionId::new(0, 1);
        grid.click(id);

        grid.render(&hints("2"));

        assert_eq!(grid.active_session(), Some(id));
        assert!(grid.view().detail(GroupId::new(0, 0)).is_some_and(|d| d.open));
        assert_eq!(grid.view().open_detail_count(), 1);
        assert!(grid.view().month_active(GroupId::new(0, 0)));
    }

    #[test]
    fn test_resize_moves_open_detail_to_new_group() {
        let mut grid = loaded("5");
        let id = SessionId::new(0, 5);
        grid.click(id);
        assert!(grid.view().detail(GroupId::new(0, 5)).is_some_and(|d| d.open));

        grid.render(&hints("3"));

        let detail = grid.view().detail(GroupId::new(0, 3));
        assert!(detail.is_some_and(|d| d.open && d.text == "Chiusura"));
        assert_eq!(grid.view().open_detail_count(), 1);
    }

    #[test]
    fn test_resize_drops_session_that_no_longer_exists() {
        let mut grid = loaded("5");
        let id = SessionId::new(1, 0);
        grid.click(id);
        assert_eq!(grid.active_session(), Some(id));

        grid.set_rows(parse_table("year;month;day1;title1\n2025;Marzo;Lun 3;Apertura\n", ';'));
        grid.render(&hints("5"));

        assert_eq!(grid.active_session(), None);
        assert_eq!(grid.view().open_detail_count(), 0);
    }
}
