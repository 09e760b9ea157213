use crate::entity::Entry;
use crate::storage::StoreStats;

/// What the core needs from whatever is showing entries to the user.
///
/// Implementations are only ever called from the interactive loop, never
/// from a timer task.
pub trait Presenter {
    /// Show `view` (already filtered and ordered) plus the status line.
    fn render(&mut self, view: &[&Entry], stats: StoreStats, last_saved: Option<&str>);

    /// The reminder timer found `pending` entries that are not done.
    fn notify_pending(&mut self, pending: usize);

    /// One-line feedback after an operation.
    fn status(&mut self, message: &str);
}

/// The status bar text: totals and the last save time.
pub fn status_line(stats: StoreStats, last_saved: Option<&str>) -> String {
    format!(
        "● Total: {}    ● Submitted: {}    ● Not Submitted: {}    ● Last Saved: {}",
        stats.total,
        stats.submitted,
        stats.not_submitted,
        last_saved.unwrap_or("Not saved yet")
    )
}
