use std::{fmt, str::FromStr};

use crate::{constants::SLOT_COUNT, table::Row};

/// Composite identity of a session: its row and its 0-based slot in that row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct SessionId {
    pub row: usize,
    pub slot: usize,
}

impl SessionId {
    pub fn new(row: usize, slot: usize) -> Self {
        SessionId { row, slot }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.slot)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, slot) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid session id '{}', expected ROW-SLOT", s))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("Invalid row in session id '{}'", s))?;
        let slot = slot
            .trim()
            .parse()
            .map_err(|_| format!("Invalid slot in session id '{}'", s))?;
        Ok(SessionId { row, slot })
    }
}

/// Identity of a rendered chunk of slots: its row and first slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct GroupId {
    pub row: usize,
    pub start: usize,
}

impl GroupId {
    pub fn new(row: usize, start: usize) -> Self {
        GroupId { row, start }
    }

    pub fn is_first(self) -> bool {
        self.start == 0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.start)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub day: String,
    pub mode: String,
    pub speaker: String,
    pub title: String,
    pub time: String,
    pub info: String,
}

impl Session {
    pub fn from_row(row: &Row, slot: usize) -> Self {
        Session {
            day: row.get(&format!("day{slot}")).to_string(),
            mode: row.get(&format!("mode{slot}")).to_string(),
            speaker: row.get(&format!("speaker{slot}")).to_string(),
            title: row.get(&format!("title{slot}")).to_string(),
            time: row.get(&format!("time{slot}")).to_string(),
            info: row.get(&format!("info{slot}")).to_string(),
        }
    }

    /// No field carries content. Blank sessions render as empty placeholders.
    pub fn is_blank(&self) -> bool {
        [
            &self.day,
            &self.mode,
            &self.speaker,
            &self.title,
            &self.time,
            &self.info,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Day, speaker or title is set. Decides whether a trailing chunk of
    /// slots is worth rendering at all.
    pub fn is_renderable(&self) -> bool {
        [&self.day, &self.speaker, &self.title]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    /// Text shown in the detail row: the info column, or the title when no
    /// info was given.
    pub fn detail_text(&self) -> &str {
        if self.info.trim().is_empty() {
            &self.title
        } else {
            &self.info
        }
    }

    pub fn has_detail(&self) -> bool {
        !self.time.trim().is_empty() || !self.detail_text().trim().is_empty()
    }
}

/// Reads the fixed slots 1..=6 of a row. Missing columns give blank fields.
pub fn extract_sessions(row: &Row) -> [Session; SLOT_COUNT] {
    std::array::from_fn(|index| Session::from_row(row, index + 1))
}
