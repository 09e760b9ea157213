use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::Result;

use super::EntryStore;

/// Thread-safe handle to the one [`EntryStore`] of a session.
///
/// The interactive loop and both background timers go through this handle,
/// so mutations and saves never interleave. Timers only use the narrow
/// intent methods ([`pending_count`](Self::pending_count), [`save`](Self::save)).
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<EntryStore>>,
}

impl SharedStore {
    pub fn new(store: EntryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access for interactive operations.
    pub async fn lock(&self) -> MutexGuard<'_, EntryStore> {
        self.inner.lock().await
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.pending_count()
    }

    pub async fn save(&self) -> Result<()> {
        self.inner.lock().await.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entry;
    use crate::storage::{load, ENTRIES_FILE};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_intents_see_interactive_mutations() {
        let tmp = TempDir::new().unwrap();
        let store = EntryStore::open(tmp.path().join(ENTRIES_FILE)).unwrap();
        let shared = SharedStore::new(store);

        {
            let mut store = shared.lock().await;
            store
                .add(Entry::with_timestamp("01/01/2024 10:00:00 AM", "Printer down"))
                .unwrap();
        }
        assert_eq!(shared.pending_count().await, 1);

        shared.save().await.unwrap();
        assert!(shared.lock().await.last_saved().is_some());
        assert_eq!(load(&tmp.path().join(ENTRIES_FILE)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_edits_and_saves_are_serialized() {
        let tmp = TempDir::new().unwrap();
        let store = EntryStore::open(tmp.path().join(ENTRIES_FILE)).unwrap();
        let shared = SharedStore::new(store);

        let mut handles = Vec::new();
        for i in 0..20 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let mut store = shared.lock().await;
                    let ts = format!("01/{:02}/2024 10:00:00 AM", i + 1);
                    store
                        .add(Entry::with_timestamp(ts, format!("ticket {i}")))
                        .unwrap();
                } else {
                    shared.save().await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        shared.save().await.unwrap();
        assert_eq!(load(&tmp.path().join(ENTRIES_FILE)).unwrap().len(), 10);
        assert_eq!(shared.pending_count().await, 10);
    }
}
