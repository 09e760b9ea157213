use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::entity::{timestamp, Entry, EntryFields, EntryId, EntryState};
use crate::error::{Result, TicketError};
use crate::view::{self, SortColumn, SortState};

use super::undo::{UndoAction, UndoLog, UndoOutcome};

pub const ENTRIES_FILE: &str = "entries.json";

/// Counts shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub submitted: usize,
    pub not_submitted: usize,
}

// A string field as stored. Numbers and booleans keep their text; null and
// other shapes fall back to empty.
fn text_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn done_field(record: &Map<String, Value>) -> bool {
    match record.get("done") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// Build an entry from one record of the entry file, field by field, so a
/// value of the wrong type only costs that field its value.
fn entry_from_record(index: usize, value: &Value) -> Option<Entry> {
    let Some(record) = value.as_object() else {
        warn!(index, "skipping entry record that is not an object");
        return None;
    };

    let state = match record.get("state") {
        Some(Value::String(raw)) => EntryState::from_stored(raw),
        _ => EntryState::default(),
    };

    Some(Entry {
        timestamp: text_field(record, "timestamp"),
        caller: text_field(record, "caller"),
        title: text_field(record, "title"),
        description: text_field(record, "description"),
        additional_notes: text_field(record, "additional_notes"),
        assignment_group: text_field(record, "assignment_group"),
        state,
        done: done_field(record),
        ..Entry::default()
    })
}

/// Read the entry file.
///
/// A missing file, a file that is not JSON, or a document that is not an
/// array yields an empty list. Inside the array every record is read on its
/// own: missing or mistyped fields take their defaults. Legacy timestamps
/// are rewritten into the display format and the result is ordered newest
/// first.
pub fn load(path: &Path) -> Result<Vec<Entry>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no entry file yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let records = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!(path = %path.display(), "entry file is not a list of records, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "entry file is malformed, starting empty");
            return Ok(Vec::new());
        }
    };

    let mut entries: Vec<Entry> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| entry_from_record(index, record))
        .collect();

    for entry in &mut entries {
        entry.timestamp = timestamp::normalize(&entry.timestamp);
    }
    view::sort_newest_first(&mut entries);

    Ok(entries)
}

/// The authoritative in-memory entry list and its backing file.
///
/// Every mutating operation writes the whole list back before returning.
pub struct EntryStore {
    entries: Vec<Entry>,
    path: PathBuf,
    undo: UndoLog,
    sort: SortState,
    last_saved: Option<String>,
}

impl EntryStore {
    /// Load the store backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load(&path)?;
        info!(path = %path.display(), count = entries.len(), "loaded entries");
        Ok(Self::from_entries(path, entries))
    }

    /// Build a store around an existing list without touching the disk.
    pub fn from_entries(path: impl Into<PathBuf>, entries: Vec<Entry>) -> Self {
        Self {
            entries,
            path: path.into(),
            undo: UndoLog::new(),
            sort: SortState::default(),
            last_saved: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in store order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// First entry in store order with this display timestamp.
    pub fn find_by_timestamp(&self, timestamp: &str) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.timestamp == timestamp)
            .map(|e| e.id)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.done).count()
    }

    pub fn stats(&self) -> StoreStats {
        let submitted = self.entries.iter().filter(|e| e.done).count();
        StoreStats {
            total: self.entries.len(),
            submitted,
            not_submitted: self.entries.len() - submitted,
        }
    }

    /// Completion time of the last successful save, in display format.
    pub fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Overwrite the backing file with the full entry list.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        self.last_saved = Some(timestamp::now_display());
        debug!(path = %self.path.display(), count = self.entries.len(), "saved entries");
        Ok(())
    }

    /// Insert a new entry. The title must not be blank.
    pub fn add(&mut self, entry: Entry) -> Result<EntryId> {
        if entry.title.trim().is_empty() {
            return Err(TicketError::EmptyTitle);
        }

        let id = entry.id;
        self.entries.push(entry);
        view::sort_newest_first(&mut self.entries);
        self.sort = SortState {
            column: Some(SortColumn::Timestamp),
            reverse: true,
        };

        self.save()?;
        Ok(id)
    }

    /// Replace every editable field and the done flag of an entry.
    /// Returns `false` when no entry has this id.
    pub fn edit(&mut self, id: EntryId, fields: EntryFields, done: bool) -> Result<bool> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.apply(fields, done);

        self.save()?;
        Ok(true)
    }

    /// Flip the done flag. Returns the new value, or `None` when no entry
    /// has this id.
    pub fn toggle_done(&mut self, id: EntryId) -> Result<Option<bool>> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        entry.done = !entry.done;
        let done = entry.done;

        self.save()?;
        Ok(Some(done))
    }

    /// Remove every entry whose id is in `ids` and record them as one
    /// undoable batch. Returns how many entries were removed.
    pub fn delete(&mut self, ids: &HashSet<EntryId>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let (removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        self.entries = kept;

        if removed.is_empty() {
            return Ok(0);
        }

        let count = removed.len();
        self.undo.record_delete(removed);

        self.save()?;
        Ok(count)
    }

    /// Revert the most recent delete.
    ///
    /// Restored entries are merged back and the list is ordered by the raw
    /// timestamp string, ascending. This differs from the newest-first order
    /// used everywhere else and is kept that way on purpose.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        match self.undo.pop() {
            None => Ok(UndoOutcome::NothingToUndo),
            Some(UndoAction::Deleted(entries)) => {
                let count = entries.len();
                self.entries.extend(entries);
                self.entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

                self.save()?;
                Ok(UndoOutcome::Restored(count))
            }
        }
    }

    /// Entries matching `term` in any rendered field. A blank term returns
    /// the whole store, newest first.
    pub fn filter(&self, term: &str) -> Vec<&Entry> {
        view::filter_entries(&self.entries, term)
    }

    /// Sort the table by `column`, flipping direction when the same column is
    /// chosen twice in a row.
    pub fn sort_by(&mut self, column: SortColumn) -> Vec<&Entry> {
        self.sort.toggle(column);
        view::sort_entries(&self.entries, column, self.sort.reverse)
    }

    /// The whole store as it should be displayed after a mutation.
    pub fn display_order(&self) -> Vec<&Entry> {
        view::filter_entries(&self.entries, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntryState;
    use tempfile::TempDir;

    const PRINTER_TS: &str = "01/01/2024 10:00:00 AM";
    const VPN_TS: &str = "01/02/2024 09:00:00 AM";

    fn store_in(tmp: &TempDir) -> EntryStore {
        EntryStore::open(tmp.path().join(ENTRIES_FILE)).unwrap()
    }

    fn scenario_store(tmp: &TempDir) -> EntryStore {
        let mut store = store_in(tmp);
        store
            .add(Entry::with_timestamp(PRINTER_TS, "Printer down"))
            .unwrap();
        let mut vpn = Entry::with_timestamp(VPN_TS, "VPN issue");
        vpn.done = true;
        store.add(vpn).unwrap();
        store
    }

    fn titles(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.title.clone()).collect()
    }

    fn sorted_titles(store: &EntryStore) -> Vec<String> {
        let mut titles: Vec<String> = store.entries().iter().map(|e| e.title.clone()).collect();
        titles.sort();
        titles
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(store.is_empty());
        assert!(store.last_saved().is_none());
        assert!(!tmp.path().join(ENTRIES_FILE).exists());
    }

    #[test]
    fn test_open_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(ENTRIES_FILE);
        fs::write(&path, "{ this is not json").unwrap();
        assert!(load(&path).unwrap().is_empty());

        fs::write(&path, r#"{"timestamp": "01/01/2024 10:00:00 AM"}"#).unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_mistyped_field_keeps_every_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(ENTRIES_FILE);
        fs::write(
            &path,
            r#"[
                {"timestamp": "01/03/2024 08:00:00 AM", "title": "Email bounce"},
                {"timestamp": "01/02/2024 09:00:00 AM", "title": "VPN issue", "caller": null, "done": "yes", "state": null},
                {"timestamp": "01/01/2024 10:00:00 AM", "title": 42, "assignment_group": ["Desk"], "done": 0}
            ]"#,
        )
        .unwrap();

        let mut store = EntryStore::open(&path).unwrap();
        assert_eq!(store.len(), 3);
        store.save().unwrap();

        let entries = load(&path).unwrap();
        assert_eq!(entries.len(), 3);
        let vpn = &entries[1];
        assert_eq!(vpn.title, "VPN issue");
        assert_eq!(vpn.caller, "");
        assert_eq!(vpn.state, EntryState::New);
        assert!(vpn.done);
        assert_eq!(entries[2].title, "42");
        assert_eq!(entries[2].assignment_group, "");
        assert!(!entries[2].done);
    }

    #[test]
    fn test_non_object_record_is_skipped_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(ENTRIES_FILE);
        fs::write(
            &path,
            r#"[
                "stray",
                {"timestamp": "01/01/2024 10:00:00 AM", "title": "Printer down", "state": "Escalated"}
            ]"#,
        )
        .unwrap();

        let mut store = EntryStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        store.save().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"state\": \"Escalated\""));
        assert_eq!(load(&path).unwrap()[0].title, "Printer down");
    }

    #[test]
    fn test_load_fills_defaults_and_reformats_legacy_timestamps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(ENTRIES_FILE);
        fs::write(
            &path,
            r#"[
                {"timestamp": "2024-01-01 09:00:00", "title": "Legacy"},
                {"timestamp": "whenever", "title": "Odd"},
                {"timestamp": "01/03/2024 08:00:00 AM", "title": "Current", "state": "On Hold", "done": true}
            ]"#,
        )
        .unwrap();

        let entries = load(&path).unwrap();
        let order: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["Current", "Legacy", "Odd"]);

        assert_eq!(entries[1].timestamp, "01/01/2024 09:00:00 AM");
        assert_eq!(entries[1].caller, "");
        assert_eq!(entries[1].state, EntryState::New);
        assert!(!entries[1].done);

        assert_eq!(entries[2].timestamp, "whenever");
        assert_eq!(entries[0].state, EntryState::OnHold);
        assert!(entries[0].done);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let mut detailed = Entry::with_timestamp("12/31/2023 11:59:59 PM", "Laptop swap");
        detailed.caller = "Sam".to_string();
        detailed.description = "Screen cracked\nNeeds loaner".to_string();
        detailed.additional_notes = "Asset #4411 ☕".to_string();
        detailed.assignment_group = "Hardware".to_string();
        detailed.state = EntryState::Cancelled;
        store.add(detailed).unwrap();

        store.save().unwrap();
        let reloaded = load(store.path()).unwrap();
        assert_eq!(reloaded, store.entries());
    }

    #[test]
    fn test_save_writes_pretty_json_and_records_time() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.save().unwrap();
        assert!(store.last_saved().is_some());

        let mut store = scenario_store(&tmp);
        store.save().unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"timestamp\""));
        assert!(!tmp.path().join("entries.json.tmp").exists());
    }

    #[test]
    fn test_save_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let mut store = EntryStore::from_entries(tmp.path().join("missing/dir/entries.json"), Vec::new());
        assert!(matches!(store.save(), Err(TicketError::Io(_))));
        assert!(store.last_saved().is_none());
    }

    #[test]
    fn test_add_sorts_newest_first_and_persists() {
        let tmp = TempDir::new().unwrap();
        let store = scenario_store(&tmp);

        let order: Vec<&str> = store.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["VPN issue", "Printer down"]);
        assert_eq!(
            store.sort_state(),
            SortState {
                column: Some(SortColumn::Timestamp),
                reverse: true
            }
        );

        let on_disk = load(store.path()).unwrap();
        assert_eq!(on_disk.len(), 2);
    }

    #[test]
    fn test_add_empty_title_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let before = store.entries().to_vec();

        let result = store.add(Entry::with_timestamp(PRINTER_TS, ""));
        assert!(matches!(result, Err(TicketError::EmptyTitle)));
        let result = store.add(Entry::with_timestamp(PRINTER_TS, "   "));
        assert!(matches!(result, Err(TicketError::EmptyTitle)));

        assert_eq!(store.entries(), before.as_slice());
        assert_eq!(load(store.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_edit_overwrites_fields() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let id = store.find_by_timestamp(PRINTER_TS).unwrap();

        let fields = EntryFields {
            caller: "Dana".to_string(),
            title: "Printer fixed".to_string(),
            state: EntryState::Resolved,
            ..EntryFields::default()
        };
        assert!(store.edit(id, fields, true).unwrap());

        let entry = store.get(id).unwrap();
        assert_eq!(entry.title, "Printer fixed");
        assert_eq!(entry.caller, "Dana");
        assert_eq!(entry.state, EntryState::Resolved);
        assert!(entry.done);
        assert_eq!(entry.timestamp, PRINTER_TS);

        let on_disk = load(store.path()).unwrap();
        assert!(on_disk.iter().any(|e| e.title == "Printer fixed"));
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let before = store.entries().to_vec();

        assert!(!store
            .edit(EntryId::new(), EntryFields::titled("Nope"), false)
            .unwrap());
        assert_eq!(store.entries(), before.as_slice());
    }

    #[test]
    fn test_toggle_done() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let id = store.find_by_timestamp(PRINTER_TS).unwrap();

        assert_eq!(store.pending_count(), 1);
        assert_eq!(store.toggle_done(id).unwrap(), Some(true));
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.toggle_done(id).unwrap(), Some(false));
        assert_eq!(store.toggle_done(EntryId::new()).unwrap(), None);
    }

    #[test]
    fn test_duplicate_timestamps_are_distinct_entries() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let first = store.add(Entry::with_timestamp(PRINTER_TS, "first")).unwrap();
        let second = store.add(Entry::with_timestamp(PRINTER_TS, "second")).unwrap();

        assert_eq!(store.find_by_timestamp(PRINTER_TS), Some(first));
        store.toggle_done(second).unwrap();
        assert!(!store.get(first).unwrap().done);
        assert!(store.get(second).unwrap().done);
    }

    #[test]
    fn test_delete_then_undo_restores() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let before = sorted_titles(&store);

        let id = store.find_by_timestamp(PRINTER_TS).unwrap();
        let removed = store.delete(&HashSet::from([id])).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.can_undo());
        assert_eq!(load(store.path()).unwrap().len(), 1);

        assert_eq!(store.undo().unwrap(), UndoOutcome::Restored(1));
        assert_eq!(sorted_titles(&store), before);
        assert_eq!(load(store.path()).unwrap().len(), 2);
        assert!(!store.can_undo());
    }

    #[test]
    fn test_undo_orders_by_raw_timestamp_ascending() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let ids: HashSet<EntryId> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(store.delete(&ids).unwrap(), 2);
        assert!(store.is_empty());

        store.undo().unwrap();
        let order: Vec<&str> = store.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["Printer down", "VPN issue"]);

        let view = store.display_order();
        assert_eq!(titles(&view), vec!["VPN issue", "Printer down"]);
    }

    #[test]
    fn test_undo_is_per_batch() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);
        let printer = store.find_by_timestamp(PRINTER_TS).unwrap();
        let vpn = store.find_by_timestamp(VPN_TS).unwrap();

        store.delete(&HashSet::from([printer])).unwrap();
        store.delete(&HashSet::from([vpn])).unwrap();

        assert_eq!(store.undo().unwrap(), UndoOutcome::Restored(1));
        assert_eq!(titles(&store.filter("")), vec!["VPN issue"]);
        assert_eq!(store.undo().unwrap(), UndoOutcome::Restored(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.undo().unwrap(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_delete_nothing_records_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);

        assert_eq!(store.delete(&HashSet::new()).unwrap(), 0);
        assert_eq!(store.delete(&HashSet::from([EntryId::new()])).unwrap(), 0);
        assert!(!store.can_undo());
        assert_eq!(store.undo().unwrap(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_filter_does_not_mutate() {
        let tmp = TempDir::new().unwrap();
        let store = scenario_store(&tmp);

        assert_eq!(titles(&store.filter("vpn")), vec!["VPN issue"]);
        assert_eq!(titles(&store.filter("")), vec!["VPN issue", "Printer down"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sort_by_toggles() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);

        let view = store.sort_by(SortColumn::Done);
        assert_eq!(titles(&view), vec!["Printer down", "VPN issue"]);
        let view = store.sort_by(SortColumn::Done);
        assert_eq!(titles(&view), vec!["VPN issue", "Printer down"]);

        let view = store.sort_by(SortColumn::Title);
        assert_eq!(titles(&view), vec!["Printer down", "VPN issue"]);
        assert!(!store.sort_state().reverse);
    }

    #[test]
    fn test_sort_after_add_starts_from_timestamp_descending() {
        let tmp = TempDir::new().unwrap();
        let mut store = scenario_store(&tmp);

        // add() leaves the table sorted by timestamp, reversed; choosing the
        // timestamp column again flips it to ascending.
        let view = store.sort_by(SortColumn::Timestamp);
        assert_eq!(titles(&view), vec!["Printer down", "VPN issue"]);
    }

    #[test]
    fn test_stats() {
        let tmp = TempDir::new().unwrap();
        let store = scenario_store(&tmp);
        assert_eq!(
            store.stats(),
            StoreStats {
                total: 2,
                submitted: 1,
                not_submitted: 1
            }
        );
    }
}
