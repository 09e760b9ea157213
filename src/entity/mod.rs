mod state;
pub mod timestamp;

pub use state::EntryState;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Glyph shown for a completed entry.
pub const DONE_GLYPH: &str = "☑";
/// Glyph shown for a pending entry.
pub const PENDING_GLYPH: &str = "☐";

/// Session-local identity of an entry.
///
/// Ids are assigned when an entry is created or loaded and are never written
/// to disk, so they stay stable for the lifetime of one store only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user-editable fields of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub caller: String,
    pub title: String,
    pub description: String,
    pub additional_notes: String,
    pub assignment_group: String,
    pub state: EntryState,
}

impl EntryFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// One ticket record.
///
/// Field order here is the key order of the persisted JSON records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(skip, default = "EntryId::new")]
    pub id: EntryId,
    pub timestamp: String,
    pub caller: String,
    pub title: String,
    pub description: String,
    pub additional_notes: String,
    pub assignment_group: String,
    pub state: EntryState,
    pub done: bool,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: EntryId::new(),
            timestamp: String::new(),
            caller: String::new(),
            title: String::new(),
            description: String::new(),
            additional_notes: String::new(),
            assignment_group: String::new(),
            state: EntryState::default(),
            done: false,
        }
    }
}

// Ids are session-local; two entries are equal when their persisted fields are.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.caller == other.caller
            && self.title == other.title
            && self.description == other.description
            && self.additional_notes == other.additional_notes
            && self.assignment_group == other.assignment_group
            && self.state == other.state
            && self.done == other.done
    }
}

impl Eq for Entry {}

impl Entry {
    /// Create an entry stamped with the current local time.
    pub fn new(fields: EntryFields) -> Self {
        Self::with_fields(timestamp::now_display(), fields)
    }

    pub fn with_fields(timestamp: impl Into<String>, fields: EntryFields) -> Self {
        let mut entry = Self {
            timestamp: timestamp.into(),
            ..Self::default()
        };
        entry.apply(fields, false);
        entry
    }

    pub fn with_timestamp(timestamp: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_fields(timestamp, EntryFields::titled(title))
    }

    pub fn fields(&self) -> EntryFields {
        EntryFields {
            caller: self.caller.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            additional_notes: self.additional_notes.clone(),
            assignment_group: self.assignment_group.clone(),
            state: self.state.clone(),
        }
    }

    /// Overwrite every editable field and the completion flag.
    pub fn apply(&mut self, fields: EntryFields, done: bool) {
        self.caller = fields.caller;
        self.title = fields.title;
        self.description = fields.description;
        self.additional_notes = fields.additional_notes;
        self.assignment_group = fields.assignment_group;
        self.state = fields.state;
        self.done = done;
    }

    pub fn done_glyph(&self) -> &'static str {
        if self.done {
            DONE_GLYPH
        } else {
            PENDING_GLYPH
        }
    }

    /// Every field as it is shown to the user, in column order:
    /// done, timestamp, caller, title, description, additional notes,
    /// assignment group, state.
    pub fn rendered_values(&self) -> [&str; 8] {
        [
            self.done_glyph(),
            self.timestamp.as_str(),
            self.caller.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.additional_notes.as_str(),
            self.assignment_group.as_str(),
            self.state.as_str(),
        ]
    }
}
