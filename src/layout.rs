use serde::{Deserialize, Serialize};

use crate::{
    constants::PROGRAM_LAYOUT,
    domain::{GroupId, Session},
};

/// Resolved layout properties of the surface the grid is drawn on. Values are
/// kept as raw strings, the way a style engine hands them out, and are only
/// interpreted by [`compute_sessions_per_row`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutHints {
    /// `--program-sessions-per-row`
    pub sessions_per_row: Option<String>,
    /// `--program-columns`
    pub columns: Option<String>,
}

impl LayoutHints {
    pub fn new(sessions_per_row: Option<String>, columns: Option<String>) -> Self {
        LayoutHints {
            sessions_per_row,
            columns,
        }
    }
}

/// Width breakpoint: from `min_width` terminal cells upwards the surface
/// exposes `columns` layout columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: u16,
    pub columns: u16,
}

pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint {
            min_width: 0,
            columns: 4,
        },
        Breakpoint {
            min_width: 90,
            columns: 8,
        },
        Breakpoint {
            min_width: 140,
            columns: 12,
        },
    ]
}

/// Resolves the column hint for a surface `width` cells wide. The widest
/// matching breakpoint wins; no match leaves the hint unset.
pub fn columns_for_width(width: u16, breakpoints: &[Breakpoint]) -> Option<u16> {
    breakpoints
        .iter()
        .filter(|breakpoint| breakpoint.min_width <= width)
        .max_by_key(|breakpoint| breakpoint.min_width)
        .map(|breakpoint| breakpoint.columns)
}

/// Reads a leading integer the way style values are read: surrounding
/// whitespace and trailing units are ignored, anything else is no value.
fn parse_hint(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|&(index, ch)| !(ch.is_ascii_digit() || (index == 0 && (ch == '-' || ch == '+'))))
        .map_or(trimmed.len(), |(index, _)| index);
    trimmed[..digits_end].parse().ok()
}

fn positive_hint(raw: Option<&str>) -> Option<i64> {
    raw.and_then(parse_hint).filter(|value| *value > 0)
}

/// How many sessions share one visual row of the grid. Always at least 1.
pub fn compute_sessions_per_row(hints: &LayoutHints) -> usize {
    if let Some(per_row) = positive_hint(hints.sessions_per_row.as_deref()) {
        return usize::try_from(per_row).unwrap_or(1);
    }

    let columns =
        positive_hint(hints.columns.as_deref()).unwrap_or(PROGRAM_LAYOUT.default_columns);
    let per_row = (columns - PROGRAM_LAYOUT.header_columns)
        .div_euclid(PROGRAM_LAYOUT.columns_per_session)
        .max(1);
    usize::try_from(per_row).unwrap_or(1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotEntry<'a> {
    pub slot: usize,
    pub session: &'a Session,
}

/// Consecutive slots of one row drawn on the same visual row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<'a> {
    pub id: GroupId,
    pub slots: Vec<SlotEntry<'a>>,
}

/// Splits a row's sessions into chunks of `sessions_per_row`. The first chunk
/// is always kept; later chunks only when something in them is renderable.
pub fn group_sessions(row: usize, sessions: &[Session], sessions_per_row: usize) -> Vec<Group<'_>> {
    let per_row = sessions_per_row.max(1);

    sessions
        .chunks(per_row)
        .enumerate()
        .map(|(chunk_index, chunk)| {
            let start = chunk_index * per_row;
            Group {
                id: GroupId::new(row, start),
                slots: chunk
                    .iter()
                    .enumerate()
                    .map(|(offset, session)| SlotEntry {
                        slot: start + offset,
                        session,
                    })
                    .collect(),
            }
        })
        .filter(|group| {
            group.id.is_first() || group.slots.iter().any(|entry| entry.session.is_renderable())
        })
        .collect()
}
