//! `TenantStore` trait — single async interface to the host platform's
//! per-tenant key/value settings (metafields).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::locale::Locale;
use crate::onboarding::flags::TenantFlags;

/// Basic shop identity, fetched alongside the flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    /// Platform-global shop id (e.g. `gid://shopify/Shop/123`).
    pub id: String,
    pub name: String,
    pub email: String,
    /// Primary storefront domain, e.g. `https://example.myshopify.com`.
    pub domain: String,
    /// UI locale derived from the shop's primary locale.
    pub locale: Locale,
}

/// Backend-agnostic tenant settings store.
///
/// `tenant` is the shop domain the embedded UI passes on every request.
/// Implementations must treat an absent key as an absent entry (never an
/// error) and must distinguish per-field validation failures from
/// transport failures.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Batched read of all recognized flags for one tenant.
    async fn get_flags(&self, tenant: &str) -> Result<TenantFlags, StoreError>;

    /// Idempotent set of a single flag. Last write wins, so retries and
    /// double submissions are safe.
    async fn set_flag(&self, tenant: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Fetch the shop's identity and locale.
    async fn shop_info(&self, tenant: &str) -> Result<ShopInfo, StoreError>;
}
