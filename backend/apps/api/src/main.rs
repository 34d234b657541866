//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Startup failures are reported through `anyhow`; request failures are
//! rendered by the auth crate through `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{AuthAppState, NotificationQueue, PgUserDirectory, auth_router};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use kernel::clock::SystemClock;
use platform::mail::{LogMailer, SmtpMailer};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Outgoing mail
    let notifier = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
            NotificationQueue::spawn(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged");
            NotificationQueue::spawn(LogMailer)
        }
    };

    let codec = config.identity.token_codec(Arc::new(SystemClock))?;

    let state = AuthAppState {
        users: Arc::new(PgUserDirectory::new(pool.clone())),
        codec: Arc::new(codec),
        notifier: Arc::new(notifier),
        config: Arc::new(config.identity.clone()),
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/ping", get(ping))
        .nest("/api/users", auth_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /ping
async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
