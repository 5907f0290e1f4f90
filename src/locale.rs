//! Shop locale handling.
//!
//! The locale is derived from the shop's primary locale and carried as an
//! explicit value on `ShopInfo` and status payloads. There is no
//! process-wide locale singleton; callers thread it through.

use serde::{Deserialize, Serialize};

/// Languages the embedded UI is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    En,
    Fr,
}

impl Locale {
    /// Derive the UI locale from a shop locale tag (`"fr"`, `"fr-CA"`,
    /// `"en-GB"`, ...). Unknown or empty tags fall back to English.
    pub fn from_shop_locale(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "fr" => Self::Fr,
            _ => Self::En,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Fr => write!(f, "fr"),
        }
    }
}
