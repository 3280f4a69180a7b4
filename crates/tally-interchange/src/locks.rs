//! # Tenant Locks
//!
//! One async mutex per company. Imports for the same company run one at a
//! time so find-or-create never races inside this process; imports for
//! different companies proceed in parallel.
//!
//! An entry lives only while someone holds or waits on it; idle entries are
//! swept on the next acquire, so the map tracks active companies only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Per-company import locks. Cheap to clone; clones share the same locks.
#[derive(Debug, Clone, Default)]
pub struct TenantLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and holds the company's lock until the guard drops.
    pub async fn acquire(&self, company_id: &str) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(company_id);
        debug!(company_id = %company_id, "Waiting for tenant lock");
        lock.lock_owned().await
    }

    fn lock_for(&self, company_id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        // Holders and waiters each keep a clone; a count of one means idle.
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        map.entry(company_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_company_is_exclusive() {
        let locks = TenantLocks::new();
        let guard = locks.acquire("acme").await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.acquire("acme").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_idle_entries_are_swept() {
        let locks = TenantLocks::new();
        drop(locks.acquire("acme").await);
        drop(locks.acquire("globex").await);

        let held = locks.acquire("initech").await;
        assert_eq!(locks.tracked(), 1);

        // A held lock survives the sweep and still excludes.
        let _other = locks.acquire("umbrella").await;
        assert_eq!(locks.tracked(), 2);
        let again = tokio::time::timeout(Duration::from_millis(20), locks.acquire("initech")).await;
        assert!(again.is_err());
        drop(held);
    }

    #[tokio::test]
    async fn test_different_companies_do_not_block() {
        let locks = TenantLocks::new();
        let _acme = locks.acquire("acme").await;

        tokio::time::timeout(Duration::from_secs(1), locks.acquire("globex"))
            .await
            .unwrap();
    }
}
