//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::{OtpThrottle, ServerDeps};
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{
    add_preapproval_handler, check_pin_handler, check_role_handler, health_handler,
    list_preapprovals_handler, remove_preapproval_handler, send_otp_handler, set_pin_handler,
    share_card_handler, verify_otp_handler, verify_pin_handler, verify_shared_card_handler,
};

/// How often stale OTP throttle entries are swept
const THROTTLE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Per-IP request rate limit applied to every route
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    /// Sustained requests per second per client (at most 1000)
    pub per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst_size: 20,
        }
    }
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>, rate_limit: RateLimitSettings) -> Result<Router> {
    let jwt_service_for_middleware = deps.jwt_service.clone();
    let app_state = AppState { deps };

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Governor's quota is one request per interval, replenished continuously
    let replenish_ms = 1000u64
        .checked_div(rate_limit.per_second)
        .ok_or_else(|| anyhow!("rate limit per_second must be non-zero"))?;

    // Keyed on X-Forwarded-For / X-Real-IP, falling back to the peer address
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(rate_limit.burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow!("rate limit must allow at most 1000 per second with a non-zero burst"))?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let app = Router::new()
        // OTP login
        .route("/send-otp", post(send_otp_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/check-role", post(check_role_handler))
        // Transaction PIN
        .route("/set-pin", post(set_pin_handler))
        .route("/check-pin", post(check_pin_handler))
        .route("/verify-pin", post(verify_pin_handler))
        // Card sharing
        .route("/share-card", post(share_card_handler))
        .route("/share-card/verify", post(verify_shared_card_handler))
        // Allow-list administration
        .route(
            "/admin/preapprovals",
            get(list_preapprovals_handler)
                .post(add_preapproval_handler)
                .delete(remove_preapproval_handler),
        )
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(rate_limit_layer)
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Periodically drop throttle entries whose window has fully elapsed
pub fn spawn_throttle_cleanup(throttle: Arc<OtpThrottle>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(THROTTLE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            throttle.cleanup_expired().await;
            let tracked = throttle.tracked_numbers().await;
            tracing::debug!(tracked, "OTP throttle cleanup complete");
        }
    })
}
