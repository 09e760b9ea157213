use std::str::FromStr;

use crate::entity::{Entry, EntryId};
use crate::error::{Result, TicketError};
use crate::storage::EntryStore;

/// How a command names an entry: a 1-based row of the table the user is
/// looking at, or the entry's exact timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Row(usize),
    Timestamp(String),
}

impl FromStr for Selector {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TicketError::InvalidSelector(s.to_string()));
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return match s.parse::<usize>() {
                Ok(row) if row >= 1 => Ok(Selector::Row(row)),
                _ => Err(TicketError::InvalidSelector(s.to_string())),
            };
        }
        Ok(Selector::Timestamp(s.to_string()))
    }
}

impl Selector {
    /// Find the entry this selector names. Rows index into `view`;
    /// timestamps are looked up in the whole store.
    pub fn resolve(&self, store: &EntryStore, view: &[&Entry]) -> Result<EntryId> {
        match self {
            Selector::Row(row) => view
                .get(row - 1)
                .map(|e| e.id)
                .ok_or_else(|| TicketError::EntryNotFound(format!("row {}", row))),
            Selector::Timestamp(ts) => store
                .find_by_timestamp(ts)
                .ok_or_else(|| TicketError::EntryNotFound(ts.clone())),
        }
    }
}
