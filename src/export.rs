//! CSV export of the entry table.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::entity::Entry;
use crate::Result;

pub const CSV_HEADER: [&str; 8] = [
    "timestamp",
    "caller",
    "title",
    "description",
    "additional_notes",
    "assignment_group",
    "state",
    "done",
];

/// Suggested file name for an export taken at `now`,
/// e.g. `Ticket_Export_2024-01-02_09-15-00_AM.csv`.
pub fn default_file_name(now: &NaiveDateTime) -> String {
    format!("Ticket_Export_{}.csv", now.format("%Y-%m-%d_%I-%M-%S_%p"))
}

/// Write `entries` to `path` as CSV with a header row. Returns the number of
/// rows written.
pub fn write_csv<'a, I>(entries: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for entry in entries {
        writer.write_record([
            entry.timestamp.as_str(),
            entry.caller.as_str(),
            entry.title.as_str(),
            entry.description.as_str(),
            entry.additional_notes.as_str(),
            entry.assignment_group.as_str(),
            entry.state.as_str(),
            if entry.done { "True" } else { "False" },
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
