use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::storage::SharedStore;

/// Time between unconditional autosaves.
pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(300);

/// Start the autosave loop. The first save happens one `period` after start,
/// then every `period`, whether or not anything changed. A failed save is
/// logged and retried on the next tick.
pub fn spawn_autosave(store: SharedStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(seconds = period.as_secs(), "autosave timer started");
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.save().await {
                Ok(()) => debug!("autosaved"),
                Err(e) => error!(error = %e, "autosave failed"),
            }
        }
    })
}
