use crate::entity::Entry;

/// A reversible store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Entries removed by one delete, in the order they were removed.
    Deleted(Vec<Entry>),
}

/// What an undo request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// A delete was reverted and this many entries were put back.
    Restored(usize),
    NothingToUndo,
}

impl UndoOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, UndoOutcome::NothingToUndo)
    }
}

/// Stack of undoable actions for the current session. Unbounded.
#[derive(Debug, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delete(&mut self, entries: Vec<Entry>) {
        self.actions.push(UndoAction::Deleted(entries));
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
