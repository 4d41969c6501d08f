// src/web/mw_admin.rs
use crate::{
    error::AppError,
    models::user::{AuthUser, Role},
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{Extension, Request, State},
    middleware::Next,
    response::Response,
};

/// Middleware que exige o rol "admin".
/// Deve correr *depois* de `require_auth`. O rol é confirmado na base de
/// dados para que um admin desativado perca o acesso antes do token expirar.
pub async fn require_admin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("Admin MW: verificando rol 'admin' para {}", auth_user.user_id);

    let user = user_service::find_user_by_id(&state.db_pool, auth_user.user_id).await?;
    match user {
        Some(user) if user.active && user.role == Role::Admin => {
            tracing::debug!("Admin MW: acesso concedido para {}", user.id);
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!("Admin MW: acesso negado para {}.", auth_user.user_id);
            Err(AppError::Forbidden)
        }
    }
}
