//! WHS Admin Backend
//!
//! REST backend for the field-service web admin portal: JSON-file persistence,
//! an ERP (SQL Server) pass-through and host maintenance commands.

mod api;
mod auth;
mod config;
mod erp;
mod errors;
mod models;
mod store;
mod system;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use erp::ErpClient;
use store::DataStore;

/// Upload limit for APK files.
const APK_UPLOAD_LIMIT: usize = 200 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    pub erp: Arc<ErpClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting WHS Admin Backend v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("ERP env file: {:?}", config.env_file);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (WHS_API_PSK). Authentication is disabled!");
    }
    if config.allow_raw_query {
        tracing::warn!("Raw ERP queries are enabled (ERP_ALLOW_RAW_QUERY=true)");
    }

    // Open JSON collections
    let store = Arc::new(DataStore::open(&config.data_dir).await?);
    tracing::info!(
        "Loaded {} users, {} tickets",
        store.users.get().await.len(),
        store.tickets.get().await.len()
    );

    // ERP client connects lazily on first query
    let erp = Arc::new(ErpClient::new(config.env_file.clone()).await?);

    // Create application state
    let state = AppState {
        store,
        erp,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Auth and users
        .route("/auth", post(api::login))
        .route("/users", post(api::create_user))
        .route(
            "/users/{id}",
            patch(api::toggle_user).delete(api::delete_user),
        )
        // Mobile sync
        .route(
            "/sync/users",
            get(api::get_sync_users).post(api::post_sync_users),
        )
        .route(
            "/sync/tickets",
            get(api::get_sync_tickets).post(api::post_sync_tickets),
        )
        .route("/tickets/{id}/reopen", post(api::reopen_ticket))
        // Workday
        .route(
            "/workday/open",
            get(api::workday_logs).post(api::open_workday),
        )
        .route("/workday/close", post(api::close_workday))
        // Master data
        .route(
            "/config/operations",
            get(api::list_operations).post(api::create_operation),
        )
        .route("/config/operations/import", post(api::import_operations))
        .route(
            "/config/operations/{id}",
            put(api::update_operation).delete(api::delete_operation),
        )
        .route(
            "/config/spare-parts",
            get(api::list_spare_parts).post(api::create_spare_part),
        )
        .route("/config/spare-parts/import", post(api::import_spare_parts))
        .route(
            "/config/spare-parts/{id}",
            put(api::update_spare_part).delete(api::delete_spare_part),
        )
        .route(
            "/config/sync",
            get(api::get_config_sync).post(api::post_config_sync),
        )
        // ERP
        .route("/operations", get(api::erp_operations))
        .route("/spare-parts", get(api::erp_spare_parts))
        .route(
            "/database/config",
            get(api::get_database_config).post(api::save_database_config),
        )
        .route(
            "/database/test",
            get(api::test_database).post(api::raw_query),
        )
        // Backups
        .route("/backup", get(api::list_backups).post(api::create_backup))
        .route("/backup/restore", post(api::restore_backup))
        .route("/backup/download", get(api::download_backup))
        // Mobile app
        .route("/mobile-app", get(api::mobile_app_info))
        .route(
            "/mobile-app/upload",
            post(api::upload_apk).layer(DefaultBodyLimit::max(APK_UPLOAD_LIMIT)),
        )
        .route("/mobile-app/build-status", get(api::build_status))
        // Host
        .route("/system/info", get(api::system_info))
        .route("/system/update", post(api::system_update))
        .route("/update", post(api::self_update))
        .route("/version", get(api::version))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/api/health", get(api::health_check));

    // Published APKs
    let apk_files = ServeDir::new(&state.config.apk_dir);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .nest_service("/apk", apk_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
