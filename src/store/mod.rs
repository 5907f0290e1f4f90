//! Persistence layer — per-tenant settings in the host platform's store.

pub mod graphql;
pub mod memory;
pub mod traits;

pub use graphql::GraphqlTenantStore;
pub use memory::MemoryTenantStore;
pub use traits::{ShopInfo, TenantStore};
