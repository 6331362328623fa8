//! Per-conversation turn serialization.
//!
//! Every turn of a conversation runs under the conversation's lock, so two
//! events for the same [`DialogKey`] never mutate the dialog concurrently.
//! Events for different keys never wait on each other.

use crate::dialog::DialogKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of per-conversation locks.
#[derive(Debug, Default)]
pub struct TurnLocks {
    locks: Mutex<HashMap<DialogKey, Arc<Mutex<()>>>>,
}

/// Held for the duration of one turn. Dropping it releases the
/// conversation.
#[derive(Debug)]
pub struct TurnGuard {
    key: DialogKey,
    _guard: OwnedMutexGuard<()>,
}

impl TurnGuard {
    /// Returns the key of the locked conversation.
    #[must_use]
    pub fn key(&self) -> &DialogKey {
        &self.key
    }
}

impl TurnLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `key`, then locks it.
    ///
    /// Waiters are served in arrival order.
    pub async fn acquire(&self, key: &DialogKey) -> TurnGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only referenced by the map have no holder and no waiter.
            locks.retain(|existing, lock| existing == key || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        let guard = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(dialog_key = %key, "dialog busy, waiting for the running turn");
                lock.lock_owned().await
            }
        };

        TurnGuard {
            key: key.clone(),
            _guard: guard,
        }
    }

    /// Returns the number of tracked conversations.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Returns true if no conversation is tracked.
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
