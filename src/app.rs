use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers;
use crate::services::{AuthService, GroupService, PostService, UserService};

/// Shared by every handler; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub posts: PostService,
    pub groups: GroupService,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            posts: PostService::new(store.clone()),
            groups: GroupService::new(store.clone(), config.api.admin_page_size),
            users: UserService::new(store.clone()),
            store,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(auth_routes())
        .merge(post_routes())
        .merge(group_routes())
        .merge(user_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/register/social", post(auth::register_social))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/user", post(auth::user))
}

fn post_routes() -> Router<AppState> {
    use handlers::post as p;

    Router::new()
        .route("/api/post", get(p::list).post(p::create))
        .route("/api/post/", get(p::list).post(p::create))
        .route("/api/post/tags", get(p::tags))
        .route("/api/post/type/:type", get(p::list_by_type))
        .route("/api/post/:id", get(p::get).patch(p::update).delete(p::delete))
        .route("/api/post/:id/like", post(p::like))
        .route("/api/post/:id/unlike", post(p::unlike))
        .route("/api/post/:id/likes", get(p::likes))
        .route("/api/post/:id/comments", get(p::comments).post(p::comment))
}

fn group_routes() -> Router<AppState> {
    use handlers::group as g;

    Router::new()
        .route("/api/group", get(g::list))
        .route("/api/group/", get(g::list))
        .route("/api/group/create", post(g::create))
        .route("/api/group/:id", get(g::get).patch(g::edit).delete(g::delete))
        .route("/api/group/:id/admins", get(g::admins))
        .route("/api/group/:id/add-admin", patch(g::add_admin))
        .route("/api/group/:id/remove-admin", patch(g::remove_admin))
        .route("/api/group/:id/join", post(g::join))
        .route("/api/group/:id/leave", delete(g::leave))
        .route("/api/group/:id/remove", delete(g::remove_member))
}

fn user_routes() -> Router<AppState> {
    use handlers::user as u;

    Router::new()
        .route("/api/user/:id", get(u::get).delete(u::delete))
        .route("/api/user/:id/profile", patch(u::update_profile))
        .route("/api/user/:id/follow", post(u::follow))
        .route("/api/user/:id/unfollow", post(u::unfollow))
        .route("/api/user/:id/followers", get(u::followers))
        .route("/api/user/:id/following", get(u::following))
}

/// Restrict to `CLIENT_URL` when set, otherwise permissive if allowed
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let Some(client_url) = &config.server.client_url else {
        return if config.security.permissive_cors_fallback {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };
    };

    match HeaderValue::from_str(client_url) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!("CLIENT_URL is not a valid origin header ({}); CORS disabled", e);
            CorsLayer::new()
        }
    }
}
