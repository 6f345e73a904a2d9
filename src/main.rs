use axum::{routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use karst_api::config;
use karst_api::database::manager::DatabaseManager;
use karst_api::handlers;
use karst_api::middleware::jwt_auth_middleware;
use karst_api::services::bootstrap;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Karst API in {:?} mode", config.environment);
    if config.security.jwt_secret == config::DEFAULT_JWT_SECRET {
        tracing::warn!("Using default jwt secret!");
    }

    match DatabaseManager::run_migrations().await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!("Failed to prepare database: {}", e);
            std::process::exit(1);
        }
    }

    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = bootstrap::ensure_default_admin(pool).await {
                tracing::error!("Default admin bootstrap failed: {}", e);
            }
        }
        Err(e) => tracing::error!("Skipping admin bootstrap, no database pool: {}", e),
    }

    let app = app();

    let port = config.server.port;
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Karst API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(handlers::public::auth::login_post))
        // Protected API
        .merge(api_routes());

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router.layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    use karst_api::handlers::protected::{auth, caves};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/caves", post(caves::record_post))
        .route("/api/caves/find", post(caves::find_post))
        .route("/api/caves/import", post(caves::import_post))
        .route("/api/caves/:id", get(caves::record_get))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Karst API",
        "version": version,
        "description": "Cave catalogue REST API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/auth/login (public - token acquisition)",
            "whoami": "/api/auth/whoami (protected)",
            "caves": "/api/caves[/:id] (protected)",
            "find": "/api/caves/find (protected)",
            "import": "/api/caves/import (protected - CSV upload)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
