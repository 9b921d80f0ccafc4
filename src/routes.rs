// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, chat, plans, profile, progress},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Everything lives under `/api/v1`.
/// * Only register and login are public; the rest sits behind `auth_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let chat_routes = Router::new()
        .route("/send", post(chat::send_message))
        .route("/history", get(chat::get_history))
        .route("/message/{id}/mark-plan", put(chat::mark_plan))
        .route("/message/{id}", delete(chat::delete_message));

    let plan_routes = Router::new()
        .route("/", get(plans::list_plans).post(plans::create_plan))
        .route(
            "/{id}",
            get(plans::get_plan)
                .put(plans::update_plan)
                .delete(plans::delete_plan),
        )
        .route("/{id}/analyze", get(plans::analyze_plan));

    let profile_routes = Router::new().route(
        "/me",
        get(profile::get_my_profile)
            .post(profile::create_my_profile)
            .put(profile::update_my_profile)
            .delete(profile::delete_my_profile),
    );

    // Static segments win over `/{id}` in axum's matcher.
    let progress_routes = Router::new()
        .route("/", get(progress::list_progress).post(progress::create_progress))
        .route("/trends/{metric}", get(progress::get_trend))
        .route("/analysis", get(progress::analyze_progress))
        .route("/adaptive-plan", post(progress::create_adaptive_plan))
        .route(
            "/{id}",
            get(progress::get_progress)
                .put(progress::update_progress)
                .delete(progress::delete_progress),
        );

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/chat", chat_routes)
        .nest("/plans", plan_routes)
        .nest("/profiles", profile_routes)
        .nest("/progress", progress_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = public_routes.merge(protected_routes);

    Router::new()
        .nest("/api/v1", api)
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
