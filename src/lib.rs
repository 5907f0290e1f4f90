//! shopfit — merchant onboarding and configuration backend for the
//! storefront sizing widget, embedded in the host platform's admin.

pub mod config;
pub mod error;
pub mod locale;
pub mod onboarding;
pub mod partner;
pub mod routes;
pub mod settings;
pub mod store;
