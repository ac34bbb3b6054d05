//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domains::auth::JwtService;
use crate::kernel::ServerDeps;
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{health_handler, offers};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        // No list configured: development mode
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
///
/// `trust_proxy_headers` enables client addresses from `X-Forwarded-For`
/// and `X-Real-IP`; leave it off unless a proxy overwrites them.
pub fn build_app(
    deps: ServerDeps,
    jwt_service: Arc<JwtService>,
    allowed_origins: &[String],
    trust_proxy_headers: bool,
) -> Router {
    let app_state = AppState { deps };

    Router::new()
        .route("/health", get(health_handler))
        .route("/offers", get(offers::list_offers).post(offers::create_offer))
        .route(
            "/offers/:id",
            get(offers::get_offer)
                .put(offers::update_offer)
                .delete(offers::delete_offer),
        )
        .route("/offers/:id/publish", post(offers::publish_offer))
        .route("/offers/:id/like", post(offers::toggle_like))
        .route("/offers/:id/favorite", post(offers::toggle_favorite))
        .route("/offers/:id/images", post(offers::add_image))
        .route("/offers/images/:image_id", delete(offers::delete_image))
        .route("/offers/:id/promotion", post(offers::purchase_promotion))
        .route(
            "/offers/:id/promotion/:payment_id/confirm",
            post(offers::confirm_promotion),
        )
        .route("/me/likes", get(offers::my_likes))
        .route("/me/favorites", get(offers::my_favorites))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(middleware::from_fn(move |req, next| {
            extract_client_ip(trust_proxy_headers, req, next)
        }))
        .layer(Extension(app_state))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
