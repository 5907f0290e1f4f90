//! GraphQL `TenantStore` backend — talks to the host platform Admin API.
//!
//! Reads are one batched query with an alias per recognized key; writes
//! go through the `metafieldsSet` mutation. `userErrors` from the
//! mutation become [`StoreError::Validation`]; anything that fails before
//! a well-formed response becomes [`StoreError::Transport`].

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::error::StoreError;
use crate::locale::Locale;
use crate::onboarding::flags::{TenantFlags, keys};

use super::traits::{ShopInfo, TenantStore};

/// Metafield type used for every flag; the platform only stores strings.
const METAFIELD_TYPE: &str = "single_line_text_field";

/// Admin-API-backed tenant store.
pub struct GraphqlTenantStore {
    client: reqwest::Client,
    /// URL template containing a `{shop}` placeholder.
    base_url: String,
    token: SecretString,
    namespace: String,
}

impl GraphqlTenantStore {
    pub fn new(base_url: String, token: SecretString, namespace: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
            namespace,
        }
    }

    fn endpoint(&self, tenant: &str) -> String {
        format!("{}/graphql.json", self.base_url.replace("{shop}", tenant))
    }

    /// POST a GraphQL document and return the `data` object.
    async fn execute(
        &self,
        tenant: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value, StoreError> {
        if tenant.is_empty() {
            return Err(StoreError::MissingTenant);
        }

        let response = self
            .client
            .post(self.endpoint(tenant))
            .header("X-Shopify-Access-Token", self.token.expose_secret())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!(
                "admin API returned {status}: {body}"
            )));
        }

        let body: Value = response.json().await?;
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            let message = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::InvalidResponse(format!(
                "GraphQL errors: {message}"
            )));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| StoreError::InvalidResponse("response has no data object".to_string()))
    }

    /// Fetch the shop's global id, required as `ownerId` for writes.
    async fn shop_id(&self, tenant: &str) -> Result<String, StoreError> {
        let data = self
            .execute(tenant, "{ shop { id } }", Value::Null)
            .await?;
        data.pointer("/shop/id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| StoreError::InvalidResponse("shop id missing".to_string()))
    }
}

#[async_trait::async_trait]
impl TenantStore for GraphqlTenantStore {
    async fn get_flags(&self, tenant: &str) -> Result<TenantFlags, StoreError> {
        let data = self
            .execute(
                tenant,
                &flags_query(),
                json!({ "ns": self.namespace }),
            )
            .await?;
        let shop = data
            .get("shop")
            .ok_or_else(|| StoreError::InvalidResponse("shop object missing".to_string()))?;
        Ok(parse_flags(shop))
    }

    async fn set_flag(&self, tenant: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let owner_id = self.shop_id(tenant).await?;
        let data = self
            .execute(
                tenant,
                SET_FLAG_MUTATION,
                json!({
                    "metafields": [{
                        "namespace": self.namespace,
                        "key": key,
                        "type": METAFIELD_TYPE,
                        "value": value,
                        "ownerId": owner_id,
                    }]
                }),
            )
            .await?;

        match parse_user_errors(&data) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn shop_info(&self, tenant: &str) -> Result<ShopInfo, StoreError> {
        let data = self.execute(tenant, SHOP_INFO_QUERY, Value::Null).await?;
        parse_shop_info(&data)
    }
}

const SET_FLAG_MUTATION: &str = "\
mutation SetFlag($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields { id key namespace value }
    userErrors { field message }
  }
}";

const SHOP_INFO_QUERY: &str = "\
{
  shop {
    id
    name
    email
    primaryDomain { url }
    primaryLocale
  }
}";

/// Build the batched read: one aliased `metafield` field per key.
fn flags_query() -> String {
    let fields: String = keys::ALL
        .iter()
        .enumerate()
        .map(|(i, key)| format!("    f{i}: metafield(namespace: $ns, key: \"{key}\") {{ value }}\n"))
        .collect();
    format!("query Flags($ns: String!) {{\n  shop {{\n{fields}  }}\n}}")
}

/// Collect the aliased metafield values back into a flag map.
///
/// A `null` metafield (never written) simply yields no entry, so absent
/// and false stay equivalent downstream.
fn parse_flags(shop: &Value) -> TenantFlags {
    keys::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, key)| {
            let value = shop
                .get(format!("f{i}"))
                .and_then(|mf| mf.get("value"))
                .and_then(Value::as_str)?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// First `userErrors` entry from a `metafieldsSet` payload, if any.
fn parse_user_errors(data: &Value) -> Option<StoreError> {
    let errors = data
        .pointer("/metafieldsSet/userErrors")
        .and_then(Value::as_array)?;
    let first = errors.first()?;
    Some(StoreError::Validation {
        field: first
            .get("field")
            .and_then(|f| match f {
                Value::Array(parts) => Some(
                    parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("."),
                ),
                Value::String(s) => Some(s.clone()),
                _ => None,
            }),
        message: first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown validation error")
            .to_string(),
    })
}

fn parse_shop_info(data: &Value) -> Result<ShopInfo, StoreError> {
    let shop = data
        .get("shop")
        .ok_or_else(|| StoreError::InvalidResponse("shop object missing".to_string()))?;
    let field = |path: &str| {
        shop.pointer(path)
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| StoreError::InvalidResponse(format!("shop{path} missing")))
    };
    Ok(ShopInfo {
        id: field("/id")?,
        name: field("/name")?,
        email: field("/email")?,
        domain: field("/primaryDomain/url")?,
        locale: Locale::from_shop_locale(
            shop.pointer("/primaryLocale")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
    })
}
