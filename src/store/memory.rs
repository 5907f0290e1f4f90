//! In-memory `TenantStore` — dev-mode backend and test double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::locale::Locale;
use crate::onboarding::flags::TenantFlags;

use super::traits::{ShopInfo, TenantStore};

/// Stores flags in a process-local map, keyed by tenant domain.
///
/// Used when no admin token is configured, and by tests that need to
/// observe or fail writes.
#[derive(Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<String, TenantFlags>>,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with a transport error.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of `set_flag` calls attempted so far (including failed ones).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Seed a flag directly, bypassing the write counter.
    pub async fn seed(&self, tenant: &str, key: &str, value: &str) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant.to_string()).or_default().set(key, value);
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn get_flags(&self, tenant: &str) -> Result<TenantFlags, StoreError> {
        if tenant.is_empty() {
            return Err(StoreError::MissingTenant);
        }
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant).cloned().unwrap_or_default())
    }

    async fn set_flag(&self, tenant: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if tenant.is_empty() {
            return Err(StoreError::MissingTenant);
        }
        if self.fail_writes {
            return Err(StoreError::Transport("simulated write failure".to_string()));
        }
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant.to_string()).or_default().set(key, value);
        Ok(())
    }

    async fn shop_info(&self, tenant: &str) -> Result<ShopInfo, StoreError> {
        if tenant.is_empty() {
            return Err(StoreError::MissingTenant);
        }
        Ok(ShopInfo {
            id: format!("gid://shopify/Shop/{tenant}"),
            name: tenant.to_string(),
            email: format!("owner@{tenant}"),
            domain: format!("https://{tenant}"),
            locale: Locale::En,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::flags::keys;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryTenantStore::new();
        store
            .set_flag("a.myshopify.com", keys::BILLING, "true")
            .await
            .unwrap();

        let flags = store.get_flags("a.myshopify.com").await.unwrap();
        assert!(flags.is_true(keys::BILLING));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let store = MemoryTenantStore::new();
        store
            .set_flag("a.myshopify.com", keys::BILLING, "true")
            .await
            .unwrap();

        let other = store.get_flags("b.myshopify.com").await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn empty_tenant_is_rejected() {
        let store = MemoryTenantStore::new();
        assert!(matches!(
            store.get_flags("").await,
            Err(StoreError::MissingTenant)
        ));
    }

    #[tokio::test]
    async fn failing_store_counts_attempts() {
        let store = MemoryTenantStore::failing();
        let result = store.set_flag("a.myshopify.com", keys::BILLING, "true").await;
        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert_eq!(store.write_count(), 1);

        let flags = store.get_flags("a.myshopify.com").await.unwrap();
        assert!(flags.is_empty(), "failed write must not mutate state");
    }
}
