use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Builds the full router. Protected groups get the JWT check as a route
/// layer so unmatched paths still fall through to 404 instead of 401.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root::root))
        .route("/health", get(public::root::health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(post_public_routes())
        .merge(comment_public_routes())
        // Protected
        .merge(post_protected_routes(state.clone()))
        .merge(comment_protected_routes(state.clone()))
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(config))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
        .route("/auth/refresh", post(auth::refresh_post))
}

fn user_routes() -> Router<AppState> {
    use public::users;

    Router::new()
        .route("/users", get(users::users_get).post(users::users_post))
        .route(
            "/users/:id",
            get(users::user_get)
                .put(users::user_put)
                .delete(users::user_delete),
        )
}

fn post_public_routes() -> Router<AppState> {
    use public::posts;

    Router::new()
        .route("/posts", get(posts::posts_get))
        .route("/posts/:id", get(posts::post_get))
}

fn post_protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::put;
    use protected::posts;

    Router::new()
        .route("/posts", post(posts::post_create))
        .route("/posts/:id", put(posts::post_update).delete(posts::post_delete))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn comment_public_routes() -> Router<AppState> {
    use public::comments;

    Router::new()
        .route("/comments/post/:postId", get(comments::post_comments_get))
        .route("/comments/:id", get(comments::comment_get))
}

fn comment_protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::put;
    use protected::comments;

    Router::new()
        // `:id` doubles as the post id on create
        .route(
            "/comments/:id",
            post(comments::comment_create)
                .put(comments::comment_update)
                .delete(comments::comment_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
