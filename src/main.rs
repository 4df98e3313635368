//! ReConectaTec Server - donated equipment tracking
//!
//! REST API server for donations, refurbishment, delivery and support.

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use reconecta_server::{
    api,
    config::{AppConfig, LogFormat, LoggingConfig},
    repository::Repository,
    services::{
        email::{LogMailer, MailTransport, SmtpMailer},
        redis::RedisService,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Must stay alive for the file writer to flush
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting ReConectaTec Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!("Connected to Redis");

    let mailer: Arc<dyn MailTransport> = if config.email.enabled {
        tracing::info!(host = %config.email.smtp_host, "Email notifications sent over SMTP");
        Arc::new(SmtpMailer::new(config.email.clone()))
    } else {
        tracing::info!("Email disabled; notifications are only logged");
        Arc::new(LogMailer)
    };

    let host: IpAddr = config.server.host.parse().context("Invalid host address")?;
    let addr = SocketAddr::new(host, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), mailer, redis_service);

    services
        .users
        .ensure_bootstrap_admin()
        .await
        .context("Failed to create bootstrap administrator")?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Console output (pretty or JSON) plus an optional daily rolling file
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("reconecta_server={},tower_http=info", config.level).into());

    let console = if config.format == LogFormat::Json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "reconecta-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .init();

    guard
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::users::update_my_profile))
        // Dashboard
        .route("/dashboard", get(api::dashboard::landing))
        .route("/dashboard/summary", get(api::dashboard::summary))
        // Users
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        // Institutions
        .route(
            "/institutions",
            get(api::institutions::list_institutions).post(api::institutions::create_institution),
        )
        .route(
            "/institutions/:rut",
            get(api::institutions::get_institution)
                .put(api::institutions::update_institution)
                .delete(api::institutions::delete_institution),
        )
        // Donations
        .route(
            "/donations",
            get(api::donations::list_donations).post(api::donations::create_donation),
        )
        .route(
            "/donations/:id",
            get(api::donations::get_donation)
                .put(api::donations::update_donation)
                .delete(api::donations::delete_donation),
        )
        // Equipment
        .route(
            "/equipment",
            get(api::equipment::list_equipment).post(api::equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(api::equipment::get_equipment)
                .put(api::equipment::update_equipment)
                .delete(api::equipment::delete_equipment),
        )
        // Assignments
        .route(
            "/assignments",
            get(api::assignments::list_assignments).post(api::assignments::create_assignment),
        )
        .route(
            "/assignments/:id",
            get(api::assignments::get_assignment)
                .put(api::assignments::update_assignment)
                .delete(api::assignments::delete_assignment),
        )
        .route(
            "/assignments/:id/details",
            get(api::assignments::list_details).post(api::assignments::create_detail),
        )
        .route(
            "/assignment-details/:id",
            put(api::assignments::update_detail).delete(api::assignments::delete_detail),
        )
        // Refurbishments
        .route(
            "/refurbishments",
            get(api::refurbishments::list_refurbishments).post(api::refurbishments::create_refurbishment),
        )
        .route(
            "/refurbishments/:equipment_id",
            get(api::refurbishments::get_refurbishment)
                .put(api::refurbishments::update_refurbishment)
                .delete(api::refurbishments::delete_refurbishment),
        )
        // Support
        .route(
            "/support",
            get(api::support::list_tickets).post(api::support::create_ticket),
        )
        .route("/support/tickets", post(api::support::submit_ticket))
        .route(
            "/support/:id",
            get(api::support::get_ticket)
                .put(api::support::update_ticket)
                .delete(api::support::delete_ticket),
        )
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
