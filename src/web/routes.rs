// src/web/routes.rs
use crate::{
    state::AppState,
    web::{admin_handlers, auth_handlers, det_af_handlers, mw_admin, mw_auth, user_handlers},
};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas públicas ---
    let public_auth = Router::new()
        .route("/login", post(auth_handlers::handle_login))
        .route("/register", post(auth_handlers::handle_register));

    let public_detaf = Router::new()
        .route("/categories", get(det_af_handlers::handle_get_categories))
        .route("/stats", get(det_af_handlers::handle_get_stats));

    // --- Rotas de admin ---
    // Exigem token E rol admin (require_auth é aplicado no router pai)
    let admin_routes = Router::new()
        .route("/inscriptions", get(admin_handlers::handle_get_all_inscriptions))
        .route("/categories", post(admin_handlers::handle_create_category))
        .route("/categories/{id}", put(admin_handlers::handle_update_category))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_admin::require_admin,
        ));

    // --- Rotas autenticadas ---
    let protected_auth = Router::new()
        .route("/profile", get(user_handlers::handle_profile))
        .route("/grades", get(user_handlers::handle_grades))
        .route("/academic-summary", get(user_handlers::handle_academic_summary))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    let protected_detaf = Router::new()
        .route("/my-inscriptions", get(det_af_handlers::handle_get_my_inscriptions))
        .route("/my-status", get(det_af_handlers::handle_get_my_status))
        .route("/enroll", post(det_af_handlers::handle_enroll))
        .route("/unenroll", post(det_af_handlers::handle_unenroll))
        .route(
            "/check-eligibility/{category_id}",
            get(det_af_handlers::handle_check_eligibility),
        )
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .route("/api/ping", get(|| async { Json(serde_json::json!({ "message": "pong" })) }))
        .nest("/api/auth", public_auth.merge(protected_auth))
        .nest("/api/detaf", public_detaf.merge(protected_detaf))
        .with_state(app_state)
}

/// Router completo com as camadas de trace e CORS, usado pelo `main` e pelos testes.
pub fn create_app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_origins);
    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Origem CORS inválida ignorada: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
