// Main entry point for the phone gate API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use phone_gate::domains::auth::JwtService;
use phone_gate::kernel::{OtpThrottle, ServerDeps, TwilioAdapter};
use phone_gate::server::{build_app, spawn_throttle_cleanup, RateLimitSettings};
use phone_gate::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

fn mask_env(name: &str) {
    match std::env::var(name) {
        Ok(val) if val.is_empty() => tracing::info!("  {}: (empty)", name),
        Ok(val) => {
            let show = val.char_indices().nth(4).map(|(i, _)| i).unwrap_or(val.len());
            tracing::info!(
                "  {}: {}{}  ({} chars)",
                name,
                &val[..show],
                "*".repeat(val.len().saturating_sub(show)),
                val.len()
            );
        }
        Err(_) => tracing::warn!("  {}: NOT SET", name),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,phone_gate=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting phone gate API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Environment variables:");
    for name in &[
        "DATABASE_URL",
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "TWILIO_VERIFY_SERVICE_SID",
        "TWILIO_PHONE_NUMBER",
        "JWT_SECRET",
        "JWT_ISSUER",
        "ADMIN_IDENTIFIERS",
    ] {
        mask_env(name);
    }

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    if config.twilio_phone_number.is_none() {
        tracing::warn!("TWILIO_PHONE_NUMBER not set; card sharing SMS will fail");
    }

    let twilio = Arc::new(TwilioService::new(TwilioOptions {
        account_sid: config.twilio_account_sid.clone(),
        auth_token: config.twilio_auth_token.clone(),
        service_id: config.twilio_verify_service_sid.clone(),
        from_number: config.twilio_phone_number.clone(),
    }));

    let otp_throttle = Arc::new(OtpThrottle::new(
        Duration::from_secs(config.otp_cooldown_secs),
        config.otp_max_per_hour,
    ));

    let deps = Arc::new(ServerDeps::new(
        pool,
        Arc::new(TwilioAdapter::new(twilio)),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        otp_throttle.clone(),
        config.admin_identifiers.clone(),
        config.share_card_country_code.clone(),
    ));

    spawn_throttle_cleanup(otp_throttle);

    let app = build_app(
        deps,
        RateLimitSettings {
            per_second: config.rate_limit_per_second,
            burst_size: config.rate_limit_burst,
        },
    )
    .context("Failed to build application")?;

    // Start server
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
