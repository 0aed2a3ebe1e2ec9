//! Route table and the layer stack wrapped around it.

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info_span, warn};

use crate::handlers::{auth, comments, complaints, likes, moderation, posts, system};
use crate::middleware::{limit_auth_attempts, track_requests};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Mount point for the API routes; empty mounts them at the root
    pub base_path: String,
    pub cors_origins: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { base_path: "/api".into(), cors_origins: Vec::new() }
    }
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // only the routes above are rate limited
        .route_layer(from_fn_with_state(state.clone(), limit_auth_attempts))
        .route("/me", get(auth::me));

    Router::new()
        .nest("/auth", auth_routes)
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/{id}", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/comments", get(comments::list).post(comments::create))
        .route("/comments/{id}", put(comments::edit).delete(comments::delete))
        .route("/likes", get(likes::count).post(likes::like_post).delete(likes::unlike_post))
        .route("/comment-likes", post(likes::like_comment).delete(likes::unlike_comment))
        .route("/complaints", get(complaints::list).post(complaints::file))
        .route("/complaints/{id}", delete(complaints::dismiss))
        .route("/moderation/users/{id}/block", put(moderation::block))
        .route("/moderation/users/{id}/unblock", put(moderation::unblock))
        .route("/moderation/comments/{id}", delete(moderation::remove_comment))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Builds the complete application. Unknown paths get the JSON 404 body.
pub fn router(state: AppState, config: &RouterConfig) -> Router {
    let api = api_routes(&state);
    let app = Router::new()
        .route("/", get(system::index))
        .route("/metrics", get(system::metrics));
    let app = if config.base_path.is_empty() {
        app.merge(api)
    } else {
        app.nest(&config.base_path, api)
    };

    app.fallback(system::not_found)
        .layer(from_fn_with_state(state.clone(), track_requests))
        .layer(cors_layer(&config.cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            let request_id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            info_span!("http", method = %req.method(), path = %req.uri().path(), request_id)
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
