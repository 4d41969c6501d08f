// src/web/mw_auth.rs
use crate::{error::AppError, services::auth_service, state::AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

// Middleware que exige um token Bearer válido
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autenticación requerido".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Token de autenticación requerido".into()))?;

    let user = auth_service::validate_token(token, &state.config.jwt)?;
    tracing::debug!(
        "Autenticação MW: utilizador {} ({}) autenticado.",
        user.user_id,
        user.role.as_str()
    );

    // Os handlers protegidos leem o AuthUser das extensões
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
