use crate::{
    domain::{SessionId, extract_sessions},
    layout::{Group, LayoutHints, compute_sessions_per_row, group_sessions},
    table::Row,
};

use super::{DetailCell, GridCell, GridView, IndexedGroup, IndexedSession, SessionCell};

/// Builds a fresh grid for `rows`. Nothing from an earlier view survives; the
/// caller decides what state to restore.
pub fn render(rows: &[Row], hints: &LayoutHints) -> GridView {
    let mut view = GridView::default();

    for (row_index, row) in rows.iter().enumerate() {
        let sessions = extract_sessions(row);
        let sessions_per_row = compute_sessions_per_row(hints);
        view.sessions_per_row = sessions_per_row;

        for group in group_sessions(row_index, &sessions, sessions_per_row) {
            view.push_group(row, &group);
        }
    }

    tracing::debug!(
        groups = view.groups.len(),
        sessions = view.session_index.len(),
        sessions_per_row = view.sessions_per_row,
        "program grid rendered"
    );
    view
}

fn header_text(row: &Row, column: &str, first_group: bool) -> Option<String> {
    let value = row.get(column);
    (first_group && !value.trim().is_empty()).then(|| value.to_string())
}

impl GridView {
    fn push_group(&mut self, row: &Row, group: &Group<'_>) {
        let first_cell = self.cells.len();
        let first_group = group.id.is_first();

        self.cells.push(GridCell::Year {
            group: group.id,
            text: header_text(row, "year", first_group),
        });

        let month_cell = self.cells.len();
        self.cells.push(GridCell::Month {
            group: group.id,
            text: header_text(row, "month", first_group),
            active: false,
        });

        for entry in &group.slots {
            if entry.session.is_blank() {
                self.cells.push(GridCell::EmptySlot { group: group.id });
                continue;
            }

            let id = SessionId::new(group.id.row, entry.slot);
            self.session_index.insert(
                id,
                IndexedSession {
                    session: entry.session.clone(),
                    group: group.id,
                    cell: self.cells.len(),
                },
            );
            self.cells.push(GridCell::Session(SessionCell {
                id,
                group: group.id,
                day: entry.session.day.clone(),
                mode: entry.session.mode.clone(),
                speaker: entry.session.speaker.clone(),
                title: entry.session.title.clone(),
                active: false,
                expanded: false,
            }));
        }

        let detail_cell = self.cells.len();
        self.cells.push(GridCell::Detail(DetailCell {
            group: group.id,
            ..DetailCell::default()
        }));

        self.group_index.insert(
            group.id,
            IndexedGroup {
                month_cell,
                detail_cell,
            },
        );
        self.groups.push((group.id, first_cell..self.cells.len()));
    }
}
