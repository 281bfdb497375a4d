use crate::domain::SessionId;

use super::{GridCell, ProgramGrid};

impl ProgramGrid {
    /// Click on a session: the open session closes, any other session closes
    /// the previous one and opens itself.
    pub fn click(&mut self, id: SessionId) {
        if self.active == Some(id) {
            self.close();
            return;
        }

        self.close();
        self.open(id);
    }

    /// Expands `id` into its group's detail row. Returns false and records
    /// nothing when the session is unknown or has neither time nor text.
    pub fn open(&mut self, id: SessionId) -> bool {
        let Some(entry) = self.view.session_index.get(&id) else {
            return false;
        };
        let Some(group) = self.view.group_index.get(&entry.group).copied() else {
            return false;
        };
        if !entry.session.has_detail() {
            tracing::debug!(session = %id, "session has no detail to show");
            return false;
        }

        let session_cell = entry.cell;
        let group_id = entry.group;
        let time = entry.session.time.clone();
        let text = entry.session.detail_text().to_string();

        if let Some(GridCell::Detail(detail)) = self.view.cells.get_mut(group.detail_cell) {
            detail.time = time;
            detail.text = text;
            detail.open = true;
        }
        if let Some(GridCell::Session(cell)) = self.view.cells.get_mut(session_cell) {
            cell.active = true;
            cell.expanded = true;
        }
        if let Some(GridCell::Month { active, .. }) = self.view.cells.get_mut(group.month_cell) {
            *active = true;
        }

        self.active = Some(id);
        tracing::debug!(session = %id, group = %group_id, "session opened");
        true
    }

    /// Collapses the active session, if any.
    pub fn close(&mut self) {
        let Some(id) = self.active.take() else {
            return;
        };
        let Some(entry) = self.view.session_index.get(&id) else {
            return;
        };
        let session_cell = entry.cell;
        let group = self.view.group_index.get(&entry.group).copied();

        if let Some(GridCell::Session(cell)) = self.view.cells.get_mut(session_cell) {
            cell.active = false;
            cell.expanded = false;
        }

        let Some(group) = group else {
            return;
        };
        if let Some(GridCell::Month { active, .. }) = self.view.cells.get_mut(group.month_cell) {
            *active = false;
        }
        if let Some(GridCell::Detail(detail)) = self.view.cells.get_mut(group.detail_cell) {
            detail.open = false;
            detail.time.clear();
            detail.text.clear();
        }
        tracing::debug!(session = %id, "session closed");
    }
}
