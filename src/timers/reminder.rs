use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::settings::{SharedSettings, MIN_REMINDER_INTERVAL};
use crate::storage::SharedStore;

/// Sent to the interactive loop when unresolved entries remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub pending: usize,
}

impl Reminder {
    pub fn message(&self) -> String {
        format!("You have {} pending tickets to submit.", self.pending)
    }
}

/// Start the reminder loop.
///
/// Each cycle reads the interval from `settings`, sleeps that many minutes,
/// then sends a [`Reminder`] if reminders are enabled and at least one entry
/// is not done. A settings change therefore applies from the next cycle.
pub fn spawn_reminder(
    store: SharedStore,
    settings: SharedSettings,
    tx: UnboundedSender<Reminder>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("reminder timer started");
        loop {
            let interval = settings.snapshot().await.reminder_interval;
            let minutes = interval.max(MIN_REMINDER_INTERVAL);
            debug!(minutes, "reminder sleeping");
            tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;

            if !settings.snapshot().await.reminders_enabled {
                continue;
            }

            let pending = store.pending_count().await;
            if pending == 0 {
                continue;
            }

            debug!(pending, "reminder firing");
            if let Err(e) = tx.send(Reminder { pending }) {
                warn!(error = %e, "reminder could not be delivered");
            }
        }
    })
}
