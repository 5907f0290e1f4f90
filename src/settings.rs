//! Widget configuration writes — thin validated setters over the store.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::onboarding::flags::keys;
use crate::store::TenantStore;

/// Rendered size of the storefront widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSize {
    Monochrome,
    Small,
    Medium,
    Large,
}

impl UiSize {
    /// The string persisted to the `ui_size` metafield.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monochrome => "monochrome",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::str::FromStr for UiSize {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monochrome" => Ok(Self::Monochrome),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(StoreError::Validation {
                field: Some(keys::UI_SIZE.to_string()),
                message: format!("unknown ui_size: {other}"),
            }),
        }
    }
}

/// Mark the widget style as configured for this tenant.
pub async fn set_widget_style(store: &dyn TenantStore, tenant: &str) -> Result<(), StoreError> {
    store.set_flag(tenant, keys::WIDGET_STYLE, "true").await
}

/// Persist the merchant's chosen widget size.
pub async fn set_ui_size(
    store: &dyn TenantStore,
    tenant: &str,
    size: UiSize,
) -> Result<(), StoreError> {
    store.set_flag(tenant, keys::UI_SIZE, size.as_str()).await
}

/// Persist the tenant's partner-account id.
pub async fn save_partner_id(
    store: &dyn TenantStore,
    tenant: &str,
    partner_id: &str,
) -> Result<(), StoreError> {
    if partner_id.trim().is_empty() {
        return Err(StoreError::Validation {
            field: Some(keys::PARTNER_ID.to_string()),
            message: "partner_id must not be empty".to_string(),
        });
    }
    store
        .set_flag(tenant, keys::PARTNER_ID, partner_id.trim())
        .await
}
