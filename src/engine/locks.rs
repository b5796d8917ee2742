use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// ✅ **Per-timesheet keyed mutex**
///
/// The store contract is plain read-modify-write with no optimistic locking,
/// so every engine mutation serializes on the owning timesheet id. Guards are
/// owned, letting callers hold them across await points.
#[derive(Default)]
pub struct TimesheetLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl TimesheetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, timesheet_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("timesheet lock registry poisoned");
            map.entry(timesheet_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn serializes_access_per_timesheet() {
        let locks = Arc::new(TimesheetLocks::new());
        let id = Uuid::new_v4();
        let active = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let active = active.clone();
            let completed = completed.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                assert_eq!(active.fetch_add(1, Ordering::SeqCst), 0);
                tokio::task::yield_now().await;
                active.fetch_sub(1, Ordering::SeqCst);
                completed.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(completed.load(Ordering::SeqCst), 8);
    }
}
