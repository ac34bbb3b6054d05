// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use estate_core::domains::auth::JwtService;
use estate_core::kernel::{
    HttpPaymentService, HttpProfileService, LocalFileStorage, NominatimGeocoder, PgOfferStore,
    RedisViewCache, ServerDeps,
};
use estate_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,estate_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting offer engine API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let view_cache = RedisViewCache::connect(&config.redis_url)
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!("View cache connected");

    let deps = ServerDeps::new(
        Arc::new(PgOfferStore::new(pool)),
        Arc::new(view_cache),
        Arc::new(NominatimGeocoder::new(config.geocoder_url.clone())?),
        Arc::new(HttpProfileService::new(config.profile_service_url.clone())?),
        Arc::new(HttpPaymentService::new(config.payment_service_url.clone())?),
        Arc::new(LocalFileStorage::new(config.image_dir.clone())),
        config.engine.clone(),
    );

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let app = build_app(
        deps,
        jwt_service,
        &config.allowed_origins,
        config.trust_proxy_headers,
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
