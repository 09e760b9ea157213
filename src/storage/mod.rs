mod json_store;
mod shared;
mod undo;

pub use json_store::{load, EntryStore, StoreStats, ENTRIES_FILE};
pub use shared::SharedStore;
pub use undo::{UndoAction, UndoLog, UndoOutcome};
