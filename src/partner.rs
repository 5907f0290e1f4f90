//! Partner-account backend client.
//!
//! The widget backend keeps its own partner account per shop. This client
//! covers the two calls the onboarding flow needs: a liveness check on an
//! existing partner id, and account creation for shops that have none.

use serde::{Deserialize, Serialize};

use crate::error::{Error, PartnerError};
use crate::onboarding::flags::keys;
use crate::store::{ShopInfo, TenantStore};

/// Request body for `create_shopify_account`.
#[derive(Debug, Clone, Serialize)]
struct CreateAccountRequest<'a> {
    shop_id: &'a str,
    shop_domain: &'a str,
    shop_name: &'a str,
    shop_email: &'a str,
}

#[derive(Debug, Deserialize)]
struct IsReadyResponse {
    is_ready: bool,
}

#[derive(Debug, Deserialize)]
struct CreateAccountResponse {
    partner_id: String,
}

/// REST client for the partner-account backend.
pub struct PartnerClient {
    client: reqwest::Client,
    base_url: String,
}

impl PartnerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check whether the partner account is ready to serve recommendations.
    ///
    /// A 404 means the backend no longer knows this partner id; callers
    /// should recreate the account rather than treat it as a failure.
    pub async fn is_ready(&self, partner_id: &str) -> Result<bool, PartnerError> {
        let response = self
            .client
            .post(format!("{}/partners/is_ready/", self.base_url))
            .json(&serde_json::json!({ "partner_id": partner_id }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PartnerError::UnknownPartner {
                partner_id: partner_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(PartnerError::RequestFailed(format!(
                "is_ready returned {}",
                response.status()
            )));
        }

        let body: IsReadyResponse = response
            .json()
            .await
            .map_err(|e| PartnerError::InvalidResponse(e.to_string()))?;
        Ok(body.is_ready)
    }

    /// Create a partner account for a shop, returning the new partner id.
    pub async fn create_account(&self, shop: &ShopInfo) -> Result<String, PartnerError> {
        // The backend keys accounts on the numeric tail of the global id.
        let short_id = shop.id.rsplit('/').next().unwrap_or(&shop.id);
        let request = CreateAccountRequest {
            shop_id: short_id,
            shop_domain: &shop.domain,
            shop_name: &shop.name,
            shop_email: &shop.email,
        };

        let response = self
            .client
            .post(format!("{}/partners/create_shopify_account/", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PartnerError::RequestFailed(format!(
                "create_shopify_account returned {}",
                response.status()
            )));
        }

        let body: CreateAccountResponse = response
            .json()
            .await
            .map_err(|e| PartnerError::InvalidResponse(e.to_string()))?;
        Ok(body.partner_id)
    }
}

/// Make sure the tenant has a live partner account, creating one if the
/// flags say none exists or the backend answers "unknown partner".
///
/// Returns the (possibly new) partner id. On creation the `partner_id`
/// and `accountCreated` flags are written back so subsequent loads skip
/// straight to the liveness check.
pub async fn ensure_account(
    store: &dyn TenantStore,
    partner: &PartnerClient,
    tenant: &str,
) -> Result<String, Error> {
    let flags = store.get_flags(tenant).await.map_err(Error::Store)?;

    if flags.is_true(keys::ACCOUNT_CREATED) {
        if let Some(partner_id) = flags.get(keys::PARTNER_ID) {
            match partner.is_ready(partner_id).await {
                Ok(_) => return Ok(partner_id.to_string()),
                Err(PartnerError::UnknownPartner { .. }) => {
                    tracing::warn!(tenant, partner_id, "partner unknown upstream; recreating");
                }
                Err(e) => return Err(Error::Partner(e)),
            }
        }
    }

    let shop = store.shop_info(tenant).await.map_err(Error::Store)?;
    let partner_id = partner.create_account(&shop).await.map_err(Error::Partner)?;

    store
        .set_flag(tenant, keys::PARTNER_ID, &partner_id)
        .await
        .map_err(Error::Store)?;
    store
        .set_flag(tenant, keys::ACCOUNT_CREATED, "true")
        .await
        .map_err(Error::Store)?;

    tracing::info!(tenant, %partner_id, "created partner account");
    Ok(partner_id)
}
