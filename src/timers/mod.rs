//! Background timers.
//!
//! Both timers run as tokio tasks for as long as the runtime lives and only
//! reach the entries through [`SharedStore`](crate::storage::SharedStore).
//! Anything user-visible is sent back to the interactive loop over a channel.

mod autosave;
mod reminder;

pub use autosave::{spawn_autosave, AUTOSAVE_PERIOD};
pub use reminder::{spawn_reminder, Reminder};
