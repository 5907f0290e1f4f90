//! REST surface driven by the embedded admin UI.
//!
//! Every route takes the tenant as a `?shop=` query parameter, exactly as
//! the embedded UI sends it. A missing shop is a 400; store validation
//! errors are 422; transport failures toward the platform or the partner
//! backend are 502. Nothing here can take the process down.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::{PartnerError, StoreError};
use crate::onboarding::controller::OnboardingRegistry;
use crate::onboarding::flags::keys;
use crate::onboarding::step::OnboardingStep;
use crate::partner::{PartnerClient, ensure_account};
use crate::settings::{self, UiSize};

/// Shared state for the REST routes.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<OnboardingRegistry>,
    pub partner: Arc<PartnerClient>,
}

#[derive(Debug, Deserialize)]
struct ShopQuery {
    shop: Option<String>,
}

impl ShopQuery {
    fn shop(&self) -> Result<&str, ApiError> {
        require_shop(self.shop.as_deref())
    }
}

fn require_shop(shop: Option<&str>) -> Result<&str, ApiError> {
    match shop {
        Some(shop) if !shop.is_empty() => Ok(shop),
        _ => Err(ApiError::Store(StoreError::MissingTenant)),
    }
}

/// Route-level error: maps the service's error taxonomy onto HTTP statuses.
enum ApiError {
    Store(StoreError),
    Partner(PartnerError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<PartnerError> for ApiError {
    fn from(e: PartnerError) -> Self {
        Self::Partner(e)
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Store(e) => Self::Store(e),
            crate::error::Error::Partner(e) => Self::Partner(e),
            crate::error::Error::Config(e) => {
                Self::Store(StoreError::InvalidResponse(e.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Store(StoreError::MissingTenant) => {
                (StatusCode::BAD_REQUEST, "Missing shop".to_string())
            }
            ApiError::Store(e @ StoreError::Validation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Store(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Partner(e @ PartnerError::UnknownPartner { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Partner(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// GET /api/onboarding/status
///
/// Seeds the tenant's session on first access and returns the current
/// step. This is the only place the resolver runs against fresh flags
/// during normal operation.
async fn get_status(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.registry.session(query.shop()?).await?;
    Ok(Json(session.status().await))
}

#[derive(Debug, Deserialize)]
struct AdvanceQuery {
    shop: Option<String>,
    /// The step the UI was showing when the user clicked continue; stale
    /// submissions are ignored.
    step: Option<OnboardingStep>,
}

/// POST /api/onboarding/advance — persist-then-advance.
async fn advance(
    State(state): State<ApiState>,
    Query(query): Query<AdvanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.registry.session(require_shop(query.shop.as_deref())?).await?;
    session.advance(query.step).await?;
    Ok(Json(session.status().await))
}

/// POST /api/onboarding/back — local retreat, no remote write.
async fn back(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.registry.session(query.shop()?).await?;
    session.back().await;
    Ok(Json(session.status().await))
}

/// GET /api/shop-info
async fn shop_info(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let info = state.registry.store().shop_info(query.shop()?).await?;
    Ok(Json(info))
}

/// POST /api/settings/widget-style
async fn set_widget_style(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    settings::set_widget_style(state.registry.store().as_ref(), query.shop()?).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct UiSizeQuery {
    shop: Option<String>,
    ui_size: Option<String>,
}

/// POST /api/settings/ui-size
async fn set_ui_size(
    State(state): State<ApiState>,
    Query(query): Query<UiSizeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = require_shop(query.shop.as_deref())?;
    let size: UiSize = query
        .ui_size
        .as_deref()
        .ok_or_else(|| {
            ApiError::Store(StoreError::Validation {
                field: Some("ui_size".to_string()),
                message: "Missing ui_size".to_string(),
            })
        })?
        .parse()?;
    settings::set_ui_size(state.registry.store().as_ref(), shop, size).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct PartnerIdRequest {
    partner_id: String,
}

/// POST /api/settings/partner-id
async fn save_partner_id(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
    Json(body): Json<PartnerIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    settings::save_partner_id(
        state.registry.store().as_ref(),
        query.shop()?,
        &body.partner_id,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/partner/status — liveness check on the stored partner id.
async fn partner_status(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = query.shop()?;
    let flags = state.registry.store().get_flags(shop).await?;
    let Some(partner_id) = flags.get(keys::PARTNER_ID) else {
        return Ok(Json(json!({ "partner_id": null, "is_ready": false })));
    };

    match state.partner.is_ready(partner_id).await {
        Ok(is_ready) => Ok(Json(json!({ "partner_id": partner_id, "is_ready": is_ready }))),
        // Unknown partner is a state, not a failure: the UI offers to
        // recreate the account.
        Err(PartnerError::UnknownPartner { .. }) => Ok(Json(
            json!({ "partner_id": partner_id, "is_ready": false, "recreate": true }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/partner/ensure — create the partner account if needed.
async fn partner_ensure(
    State(state): State<ApiState>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let partner_id = ensure_account(
        state.registry.store().as_ref(),
        &state.partner,
        query.shop()?,
    )
    .await?;
    Ok(Json(json!({ "partner_id": partner_id })))
}

/// Build the REST router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/advance", post(advance))
        .route("/api/onboarding/back", post(back))
        .route("/api/shop-info", get(shop_info))
        .route("/api/settings/widget-style", post(set_widget_style))
        .route("/api/settings/ui-size", post(set_ui_size))
        .route("/api/settings/partner-id", post(save_partner_id))
        .route("/api/partner/status", get(partner_status))
        .route("/api/partner/ensure", post(partner_ensure))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
