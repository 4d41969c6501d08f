// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginPayload, LoginResponse, RegisterPayload, UserProfile},
    services::user_service,
    state::AppState,
    web::response::{ok_with_message, parse_body, ApiResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let payload = parse_body(payload)?;

    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::ValidationError(
            "Email y contraseña son requeridos".into(),
        ));
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::ValidationError(
            "Email y contraseña son requeridos".into(),
        ));
    }

    let response = user_service::login(&state.db_pool, &state.config.jwt, &email, &password).await?;
    Ok(ok_with_message("Login exitoso", response))
}

// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let new_user = user_service::validate_registration(parse_body(payload)?)?;
    let profile = user_service::create_user(&state.db_pool, &new_user).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message("Usuario creado exitosamente", profile),
    ))
}
