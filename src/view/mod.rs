//! Derived views over the entry list: substring filtering and column sorts.
//!
//! Views borrow from the store and never reorder or mutate it, with one
//! exception: [`sort_newest_first`] is also the store's canonical ordering
//! and is applied in place after inserts.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::entity::{timestamp, Entry};
use crate::error::TicketError;

/// A sortable column of the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Done,
    Timestamp,
    Caller,
    Title,
    Description,
    AdditionalNotes,
    AssignmentGroup,
    State,
}

impl SortColumn {
    /// Column header text.
    pub fn header(&self) -> &'static str {
        match self {
            SortColumn::Done => "Done",
            SortColumn::Timestamp => "Timestamp",
            SortColumn::Caller => "Caller",
            SortColumn::Title => "Title",
            SortColumn::Description => "Description",
            SortColumn::AdditionalNotes => "Additional Notes",
            SortColumn::AssignmentGroup => "Assignment Group",
            SortColumn::State => "State",
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

impl std::str::FromStr for SortColumn {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "done" => Ok(SortColumn::Done),
            "timestamp" => Ok(SortColumn::Timestamp),
            "caller" => Ok(SortColumn::Caller),
            "title" => Ok(SortColumn::Title),
            "description" => Ok(SortColumn::Description),
            "additional_notes" | "notes" => Ok(SortColumn::AdditionalNotes),
            "assignment_group" | "group" => Ok(SortColumn::AssignmentGroup),
            "state" => Ok(SortColumn::State),
            _ => Err(TicketError::InvalidColumn(s.to_string())),
        }
    }
}

/// Which column the table is currently sorted by, and in which direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub reverse: bool,
}

impl SortState {
    /// Select `column`. Selecting the current column again flips the
    /// direction; any other column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        self.reverse = self.column == Some(column) && !self.reverse;
        self.column = Some(column);
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Flag(bool),
    Time(Option<NaiveDateTime>),
    Text(String),
}

fn sort_key(entry: &Entry, column: SortColumn) -> SortKey {
    match column {
        SortColumn::Done => SortKey::Flag(entry.done),
        SortColumn::Timestamp => SortKey::Time(timestamp::parse_display(&entry.timestamp)),
        SortColumn::Caller => SortKey::Text(entry.caller.to_lowercase()),
        SortColumn::Title => SortKey::Text(entry.title.to_lowercase()),
        SortColumn::Description => SortKey::Text(entry.description.to_lowercase()),
        SortColumn::AdditionalNotes => SortKey::Text(entry.additional_notes.to_lowercase()),
        SortColumn::AssignmentGroup => SortKey::Text(entry.assignment_group.to_lowercase()),
        SortColumn::State => SortKey::Text(entry.state.as_str().to_lowercase()),
    }
}

/// Order `entries` by `column`. The sort is stable in both directions: rows
/// with equal keys keep their relative order.
pub fn sort_entries<'a>(entries: &'a [Entry], column: SortColumn, reverse: bool) -> Vec<&'a Entry> {
    let mut keyed: Vec<(SortKey, &Entry)> = entries
        .iter()
        .map(|entry| (sort_key(entry, column), entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| if reverse { b.cmp(a) } else { a.cmp(b) });
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

// Unparseable timestamps compare as the minimum time, so they end up last.
fn newest_first(a: &Entry, b: &Entry) -> Ordering {
    let a = timestamp::parse_display(&a.timestamp);
    let b = timestamp::parse_display(&b.timestamp);
    b.cmp(&a)
}

/// Canonical store order: descending by parsed timestamp.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(newest_first);
}

/// Case-insensitive substring filter over every rendered field.
///
/// A blank term yields the whole list, newest first. Otherwise matching
/// entries are returned in their current order.
pub fn filter_entries<'a>(entries: &'a [Entry], term: &str) -> Vec<&'a Entry> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        let mut all: Vec<&Entry> = entries.iter().collect();
        all.sort_by(|a, b| newest_first(a, b));
        return all;
    }

    entries
        .iter()
        .filter(|entry| {
            entry
                .rendered_values()
                .iter()
                .any(|value| value.to_lowercase().contains(&term))
        })
        .collect()
}
