//! Per-tenant configuration flags.
//!
//! The host platform only stores string metafields, so every boolean
//! setting is a tri-state in practice: absent, `"false"`, or `"true"`.
//! Absent and anything other than the literal lowercase `"true"` are
//! treated identically as false.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metafield keys this service reads or writes.
pub mod keys {
    pub const WIDGET_INTEGRATION: &str = "widget_integration";
    pub const WIDGET_PLACEMENT: &str = "widget_placement";
    pub const BILLING: &str = "billing";
    pub const WIDGET_STYLE: &str = "widget_style";
    pub const ACCOUNT_CREATED: &str = "accountCreated";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
    pub const UI_SIZE: &str = "ui_size";
    pub const PARTNER_ID: &str = "partner_id";

    /// All keys fetched by the batched read.
    pub const ALL: &[&str] = &[
        WIDGET_INTEGRATION,
        WIDGET_PLACEMENT,
        BILLING,
        WIDGET_STYLE,
        ACCOUNT_CREATED,
        ONBOARDING_COMPLETED,
        UI_SIZE,
        PARTNER_ID,
    ];
}

/// The flag set for one tenant, as returned by a batched store read.
///
/// Keys absent from the map were never written for this tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFlags(HashMap<String, String>);

impl TenantFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw string value for a key, if one was ever written.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Boolean view of a flag: true only for the literal lowercase
    /// `"true"`. Absent, empty, `"TRUE"`, and malformed values are all
    /// false.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for TenantFlags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
