use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::repo_types::MealId;

/// Serialises mutations of the same meal id.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<MealId, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Waits for exclusive access to `id`; released when the guard drops.
    pub async fn acquire(&self, id: MealId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            // Slots only referenced by the map are idle.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(id).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}
