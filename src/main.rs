use std::sync::Arc;

use shopfit::config::AppConfig;
use shopfit::onboarding::OnboardingRegistry;
use shopfit::partner::PartnerClient;
use shopfit::routes::{ApiState, api_routes};
use shopfit::store::{GraphqlTenantStore, MemoryTenantStore, TenantStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🧵 shopfit v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/onboarding/status", config.port);
    eprintln!("   Partner backend: {}", config.partner_api_url);

    let store: Arc<dyn TenantStore> = match config.admin_token.clone() {
        Some(token) => {
            eprintln!("   Store: admin GraphQL API ({})", config.admin_api_url);
            Arc::new(GraphqlTenantStore::new(
                config.admin_api_url.clone(),
                token,
                config.namespace.clone(),
            ))
        }
        None => {
            tracing::warn!("SHOPFIT_ADMIN_TOKEN not set; using in-memory store (dev mode)");
            Arc::new(MemoryTenantStore::new())
        }
    };

    let registry = Arc::new(OnboardingRegistry::new(store, config.reconcile_delay));
    let partner = Arc::new(PartnerClient::new(config.partner_api_url.clone()));

    let app = api_routes(ApiState { registry, partner });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
