use anyhow::Context;
use storage::Database;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::{AppState, ScanSettings};

#[derive(OpenApi)]
#[openapi(
    paths(
        features::scan::handlers::submit_scan,
        features::profile::handlers::get_profile,
        features::profile::handlers::get_points,
        features::leaderboard::handlers::get_leaderboard,
        features::admin::handlers::generate_qr_strings,
        features::admin::handlers::create_user,
        features::admin::handlers::reconcile,
    ),
    components(
        schemas(
            storage::dto::scan::ScanRequest,
            storage::dto::scan::ScanResponse,
            storage::dto::scan::CooldownDetails,
            storage::dto::scan::ScanHistoryEntry,
            storage::dto::profile::ProfileResponse,
            storage::dto::profile::ProfileStats,
            storage::dto::profile::PointsResponse,
            storage::dto::leaderboard::LeaderboardEntry,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::common::PaginationMeta,
            storage::dto::qr_code::GenerateQrCodesRequest,
            storage::dto::qr_code::GenerateQrCodesResponse,
            storage::dto::qr_code::CreatedQrCode,
            storage::dto::user::CreateUserRequest,
            storage::dto::user::UserResponse,
            storage::dto::reconciliation::ReconciliationReport,
            storage::dto::reconciliation::BalanceMismatch,
        )
    ),
    tags(
        (name = "scan", description = "QR code redemption"),
        (name = "profile", description = "Caller profile and points"),
        (name = "leaderboard", description = "Public leaderboard"),
        (name = "admin", description = "Operator endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting QR scan API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::with_max_connections(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    let admin_api_keys = ApiKeys::from_comma_separated(&config.admin_api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, scan and profile endpoints will reject every request");
    }
    if admin_api_keys.is_empty() {
        tracing::warn!("ADMIN_API_KEYS is empty, admin endpoints are disabled");
    }

    let state = AppState {
        db,
        scan_settings: ScanSettings {
            max_attempts: config.scan_max_attempts,
        },
        api_keys,
        admin_api_keys,
    };

    let app = routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
