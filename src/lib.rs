pub mod cli;
pub mod entity;
pub mod error;
pub mod export;
pub mod presenter;
pub mod settings;
pub mod storage;
pub mod timers;
pub mod view;

pub use entity::{Entry, EntryFields, EntryId, EntryState};
pub use error::{Result, TicketError};
pub use storage::{EntryStore, SharedStore};
